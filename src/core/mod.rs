//! Core transaction components
//!
//! This module contains the building blocks of a signed transaction:
//! - Wire encoding primitives
//! - Protocol value types (accounts, authorities, assets)
//! - Operations and their signature requirements
//! - Transactions and their deterministic serialization
//! - Required key resolution
//! - Canonical signing

pub mod encoding;
pub mod operation;
pub mod resolver;
pub mod signer;
pub mod transaction;
pub mod types;

pub use encoding::{varint_len, ByteWriter, EncodeError};
pub use operation::{
    AccountWitnessVoteOperation, ClaimRewardBalanceOperation, CommentOperation,
    CustomJsonOperation, DeleteCommentOperation, Operation, RequiredAccounts,
    SignatureRequirement, TransferOperation, TransferToVestingOperation, VoteOperation,
};
pub use resolver::{required_authorities, KeyResolver};
pub use signer::{
    is_canonical, sign_compact, TransactionSigner, COMPACT_SIGNATURE_SIZE, COMPRESSED_KEY_OFFSET,
    RECOVERY_ID_OFFSET,
};
pub use transaction::{
    FutureExtension, SignedTransaction, SigningError, BLOCK_ID_SIZE, TX_HEADER_SIZE, TX_ID_SIZE,
};
pub use types::{AccountName, Asset, AuthorityType, MAX_SYMBOL_LEN};
