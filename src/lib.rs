//! Steem Signer: canonical transaction signing for Steem-style chains
//!
//! This crate provides:
//! - Byte-exact serialization of transactions (header, operations, extensions)
//! - Resolution of the keys each operation requires, per authority
//! - ECDSA signing (secp256k1) in compact recoverable form
//! - Canonical-signature search by advancing the expiration
//! - WIF private keys and `STM` public keys
//!
//! # Example
//!
//! ```rust
//! use steem_signer::config::NetworkConfig;
//! use steem_signer::core::{Asset, AuthorityType, SignedTransaction, TransferOperation};
//! use steem_signer::crypto::KeyPair;
//! use steem_signer::wallet::InMemoryKeyStore;
//!
//! // Register the active key of the sender
//! let mut keys = InMemoryKeyStore::new();
//! keys.add_key(AuthorityType::Active, "alice".into(), KeyPair::generate());
//!
//! // Build a transfer
//! let mut tx = SignedTransaction::new(36029, 1164960351).with_operation(TransferOperation {
//!     from: "alice".into(),
//!     to: "bob".into(),
//!     amount: Asset::steem(1000),
//!     memo: "thanks".to_string(),
//! });
//!
//! // Sign it
//! tx.sign(&NetworkConfig::default(), &keys).unwrap();
//! assert_eq!(tx.signatures().len(), 1);
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod crypto;
pub mod wallet;

// Re-export commonly used types
pub use config::{Clock, FixedClock, NetworkConfig, SystemClock};
pub use crate::core::{
    AccountName, Asset, AuthorityType, EncodeError, FutureExtension, KeyResolver, Operation,
    SignedTransaction, SigningError, TransactionSigner,
};
pub use crypto::KeyPair;
pub use wallet::{InMemoryKeyStore, KeyStore, KeyStoreError};
