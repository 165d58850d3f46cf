//! Wallet module for private key storage

pub mod key_store;

pub use key_store::{InMemoryKeyStore, KeyStore, KeyStoreError};
