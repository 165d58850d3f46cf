//! CLI commands for building and signing transactions
//!
//! Every signing command builds a single-operation transaction, signs it
//! with the key given in WIF and prints the result.

use chrono::{DateTime, Duration, Utc};

use crate::config::NetworkConfig;
use crate::core::{
    AccountName, Asset, AuthorityType, Operation, SignedTransaction, TransferOperation,
    VoteOperation,
};
use crate::crypto::KeyPair;
use crate::wallet::InMemoryKeyStore;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Reference block and expiration shared by all signing commands
#[derive(Debug, Clone)]
pub struct TxHeader {
    pub ref_block_num: u16,
    pub ref_block_prefix: u64,
    pub expiration: Option<DateTime<Utc>>,
}

impl TxHeader {
    fn transaction(&self) -> SignedTransaction {
        let tx = SignedTransaction::new(self.ref_block_num, self.ref_block_prefix);
        match self.expiration {
            Some(expiration) => tx.with_expiration(expiration),
            None => tx,
        }
    }
}

/// Convert the `--max-expiration` flag into an offset
pub fn expiration_offset(seconds: i64) -> CliResult<Duration> {
    Duration::try_seconds(seconds)
        .ok_or_else(|| format!("--max-expiration out of range: {}", seconds).into())
}

/// Build, sign and print a transaction holding one operation
pub fn sign_single(
    config: &NetworkConfig,
    header: &TxHeader,
    operation: Operation,
    authority: AuthorityType,
    account: AccountName,
    wif: &str,
) -> CliResult<SignedTransaction> {
    let mut key_store = InMemoryKeyStore::new();
    key_store.add_wif(authority, account, wif)?;

    let mut tx = header.transaction().with_operation(operation);
    tx.sign(config, &key_store)?;
    Ok(tx)
}

/// Sign a transfer
pub fn cmd_transfer(
    config: &NetworkConfig,
    header: &TxHeader,
    wif: &str,
    from: &str,
    to: &str,
    amount: &str,
    memo: &str,
) -> CliResult<()> {
    let amount: Asset = amount.parse()?;
    let operation = TransferOperation {
        from: from.into(),
        to: to.into(),
        amount,
        memo: memo.to_string(),
    };

    let tx = sign_single(
        config,
        header,
        operation.into(),
        AuthorityType::Active,
        from.into(),
        wif,
    )?;
    print_signed(&tx)
}

/// Sign a vote
pub fn cmd_vote(
    config: &NetworkConfig,
    header: &TxHeader,
    wif: &str,
    voter: &str,
    author: &str,
    permlink: &str,
    weight: i16,
) -> CliResult<()> {
    let operation = VoteOperation {
        voter: voter.into(),
        author: author.into(),
        permlink: permlink.to_string(),
        weight,
    };

    let tx = sign_single(
        config,
        header,
        operation.into(),
        AuthorityType::Posting,
        voter.into(),
        wif,
    )?;
    print_signed(&tx)
}

/// Show the public key belonging to a WIF private key
pub fn cmd_public_key(wif: &str) -> CliResult<()> {
    let key = KeyPair::from_wif(wif)?;
    println!("🔑 Public Key: {}", key.public_key_string());
    println!("   Hex: {}", key.public_key_hex());
    Ok(())
}

fn print_signed(tx: &SignedTransaction) -> CliResult<()> {
    println!("{}", serde_json::to_string_pretty(tx)?);
    eprintln!("✅ Transaction signed!");
    eprintln!("   ├─ Id: {}", tx.transaction_id()?);
    eprintln!("   ├─ Signatures: {}", tx.signatures().len());
    eprintln!("   └─ Wire bytes: {}", hex::encode(tx.to_bytes(&[])?));
    Ok(())
}
