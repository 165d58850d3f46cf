//! Steem Signer CLI Application
//!
//! Builds, signs and prints Steem transactions.

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use steem_signer::cli::{self, TxHeader};
use steem_signer::config::{NetworkConfig, DEFAULT_MAX_EXPIRATION_OFFSET_SECS, STEEM_CHAIN_ID};

#[derive(Parser)]
#[command(name = "steem-sign")]
#[command(author = "Darshan")]
#[command(version = "0.1.0")]
#[command(about = "Build and sign Steem transactions", long_about = None)]
struct Cli {
    /// Hex-encoded chain id of the target network
    #[arg(long, default_value = STEEM_CHAIN_ID)]
    chain_id: String,

    /// Maximum expiration offset accepted by the network, in seconds
    #[arg(long, default_value_t = DEFAULT_MAX_EXPIRATION_OFFSET_SECS)]
    max_expiration: i64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct HeaderArgs {
    /// Lower 16 bits of the reference block number
    #[arg(long)]
    ref_block_num: u16,

    /// Reference block prefix
    #[arg(long)]
    ref_block_prefix: u64,

    /// Expiration (RFC 3339); defaults to the latest accepted time
    #[arg(long)]
    expiration: Option<DateTime<Utc>>,
}

impl From<&HeaderArgs> for TxHeader {
    fn from(args: &HeaderArgs) -> Self {
        TxHeader {
            ref_block_num: args.ref_block_num,
            ref_block_prefix: args.ref_block_prefix,
            expiration: args.expiration,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Sign a transfer
    Transfer {
        #[command(flatten)]
        header: HeaderArgs,

        /// Active private key of the sender (WIF)
        #[arg(long)]
        wif: String,

        /// Sender account
        #[arg(short, long)]
        from: String,

        /// Recipient account
        #[arg(short, long)]
        to: String,

        /// Amount, e.g. "1.000 STEEM"
        #[arg(short, long)]
        amount: String,

        /// Memo
        #[arg(short, long, default_value = "")]
        memo: String,
    },

    /// Sign a vote
    Vote {
        #[command(flatten)]
        header: HeaderArgs,

        /// Posting private key of the voter (WIF)
        #[arg(long)]
        wif: String,

        /// Voting account
        #[arg(long)]
        voter: String,

        /// Author of the post
        #[arg(long)]
        author: String,

        /// Permlink of the post
        #[arg(long)]
        permlink: String,

        /// Weight in basis points (-10000..=10000)
        #[arg(long, default_value = "10000", allow_hyphen_values = true)]
        weight: i16,
    },

    /// Show the public key of a WIF private key
    PublicKey {
        #[arg(long)]
        wif: String,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let config = NetworkConfig::default()
        .with_chain_id(cli.chain_id)
        .with_max_expiration_offset(cli::expiration_offset(cli.max_expiration)?);

    match cli.command {
        Commands::Transfer {
            header,
            wif,
            from,
            to,
            amount,
            memo,
        } => {
            cli::cmd_transfer(
                &config,
                &TxHeader::from(&header),
                &wif,
                &from,
                &to,
                &amount,
                &memo,
            )?;
        }

        Commands::Vote {
            header,
            wif,
            voter,
            author,
            permlink,
            weight,
        } => {
            cli::cmd_vote(
                &config,
                &TxHeader::from(&header),
                &wif,
                &voter,
                &author,
                &permlink,
                weight,
            )?;
        }

        Commands::PublicKey { wif } => {
            cli::cmd_public_key(&wif)?;
        }
    }

    Ok(())
}
