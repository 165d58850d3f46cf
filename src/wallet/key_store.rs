//! Private key storage
//!
//! The signer only ever asks a `KeyStore` for the key of one
//! `(authority, account)` pair; how keys are kept is up to the store.

use std::collections::HashMap;
use thiserror::Error;

use crate::core::{AccountName, AuthorityType};
use crate::crypto::{KeyError, KeyPair};

/// Key store errors
#[derive(Error, Debug)]
pub enum KeyStoreError {
    #[error("No {authority} key registered for account {account}")]
    NotFound {
        authority: AuthorityType,
        account: AccountName,
    },
    #[error("Key store unavailable: {0}")]
    Unavailable(String),
    #[error("Crypto error: {0}")]
    CryptoError(#[from] KeyError),
}

/// Source of private keys for signing
pub trait KeyStore {
    /// Look up the key an account uses for the given authority
    fn resolve(
        &self,
        authority: AuthorityType,
        account: &AccountName,
    ) -> Result<KeyPair, KeyStoreError>;
}

impl<T: KeyStore + ?Sized> KeyStore for &T {
    fn resolve(
        &self,
        authority: AuthorityType,
        account: &AccountName,
    ) -> Result<KeyPair, KeyStoreError> {
        (**self).resolve(authority, account)
    }
}

/// Process-local key store backed by a map
#[derive(Debug, Default, Clone)]
pub struct InMemoryKeyStore {
    keys: HashMap<(AuthorityType, AccountName), KeyPair>,
}

impl InMemoryKeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a key, replacing any previous key for the same pair
    pub fn add_key(&mut self, authority: AuthorityType, account: AccountName, key: KeyPair) {
        log::debug!(
            "Registered {} key {} for {}",
            authority,
            key.public_key_string(),
            account
        );
        self.keys.insert((authority, account), key);
    }

    /// Register a key given in wallet import format
    pub fn add_wif(
        &mut self,
        authority: AuthorityType,
        account: AccountName,
        wif: &str,
    ) -> Result<(), KeyStoreError> {
        let key = KeyPair::from_wif(wif)?;
        self.add_key(authority, account, key);
        Ok(())
    }

    /// Register several keys of one account at once
    pub fn add_account(
        &mut self,
        account: AccountName,
        keys: impl IntoIterator<Item = (AuthorityType, KeyPair)>,
    ) {
        for (authority, key) in keys {
            self.add_key(authority, account.clone(), key);
        }
    }

    /// Drop every key of an account, returning how many were removed
    pub fn remove_account(&mut self, account: &AccountName) -> usize {
        let before = self.keys.len();
        self.keys.retain(|(_, name), _| name != account);
        before - self.keys.len()
    }

    /// Accounts with at least one key, sorted
    pub fn accounts(&self) -> Vec<AccountName> {
        let mut accounts: Vec<AccountName> =
            self.keys.keys().map(|(_, name)| name.clone()).collect();
        accounts.sort();
        accounts.dedup();
        accounts
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl KeyStore for InMemoryKeyStore {
    fn resolve(
        &self,
        authority: AuthorityType,
        account: &AccountName,
    ) -> Result<KeyPair, KeyStoreError> {
        self.keys
            .get(&(authority, account.clone()))
            .cloned()
            .ok_or_else(|| KeyStoreError::NotFound {
                authority,
                account: account.clone(),
            })
    }
}
