//! Command handlers for the `steem-sign` binary

pub mod commands;

pub use commands::{
    cmd_public_key, cmd_transfer, cmd_vote, expiration_offset, sign_single, CliResult, TxHeader,
};
