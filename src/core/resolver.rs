//! Required key resolution
//!
//! Walks the operations of a transaction, collects every
//! `(authority, account)` pair that has to sign and looks the keys up in a
//! `KeyStore`.

use super::operation::Operation;
use super::transaction::SigningError;
use super::types::{AccountName, AuthorityType};
use crate::crypto::KeyPair;
use crate::wallet::{KeyStore, KeyStoreError};

/// Every `(authority, account)` pair the operations require, first occurrence first
pub fn required_authorities(operations: &[Operation]) -> Vec<(AuthorityType, AccountName)> {
    let mut required: Vec<(AuthorityType, AccountName)> = Vec::new();

    for operation in operations {
        for requirement in operation.signature_requirements() {
            for account in requirement.accounts.iter() {
                let pair = (requirement.authority, account.clone());
                if !required.contains(&pair) {
                    required.push(pair);
                }
            }
        }
    }

    required
}

/// Resolves the keys a list of operations must be signed with
pub struct KeyResolver<'a, K: KeyStore + ?Sized> {
    key_store: &'a K,
}

impl<'a, K: KeyStore + ?Sized> KeyResolver<'a, K> {
    pub fn new(key_store: &'a K) -> Self {
        Self { key_store }
    }

    /// Resolve the signing keys, deduplicated by key identity
    ///
    /// Keys come out in the order their requirement is first met: operations
    /// in list order, then fields in declaration order, then accounts within
    /// a list field. Fails on the first requirement without a key.
    pub fn resolve(&self, operations: &[Operation]) -> Result<Vec<KeyPair>, SigningError> {
        let mut keys: Vec<KeyPair> = Vec::new();

        for operation in operations {
            for requirement in operation.signature_requirements() {
                for account in requirement.accounts.iter() {
                    let key = self
                        .key_store
                        .resolve(requirement.authority, account)
                        .map_err(|e| match e {
                            KeyStoreError::NotFound { authority, account } => {
                                SigningError::MissingKey {
                                    operation: operation.name(),
                                    authority,
                                    account,
                                }
                            }
                            other => SigningError::KeyStore(other),
                        })?;

                    if !keys.contains(&key) {
                        log::debug!(
                            "Resolved {} key {} for {}",
                            requirement.authority,
                            key.public_key_string(),
                            account
                        );
                        keys.push(key);
                    }
                }
            }
        }

        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::operation::{CustomJsonOperation, TransferOperation, VoteOperation};
    use crate::core::types::Asset;
    use crate::wallet::InMemoryKeyStore;

    fn key(byte: u8) -> KeyPair {
        KeyPair::from_private_key_hex(&format!("{:02x}", byte).repeat(32)).unwrap()
    }

    fn vote(voter: &str) -> Operation {
        VoteOperation {
            voter: voter.into(),
            author: "someone".into(),
            permlink: "post".to_string(),
            weight: 100,
        }
        .into()
    }

    fn transfer(from: &str) -> Operation {
        TransferOperation {
            from: from.into(),
            to: "someone".into(),
            amount: Asset::steem(1),
            memo: String::new(),
        }
        .into()
    }

    fn store() -> InMemoryKeyStore {
        let mut store = InMemoryKeyStore::new();
        store.add_key(AuthorityType::Posting, "alice".into(), key(1));
        store.add_key(AuthorityType::Active, "alice".into(), key(2));
        store.add_key(AuthorityType::Posting, "bob".into(), key(3));
        store.add_key(AuthorityType::Active, "carol".into(), key(4));
        store
    }

    #[test]
    fn test_resolves_in_discovery_order() {
        let store = store();
        let operations = vec![transfer("alice"), vote("bob"), vote("alice")];

        let keys = KeyResolver::new(&store).resolve(&operations).unwrap();
        assert_eq!(keys, vec![key(2), key(3), key(1)]);
    }

    #[test]
    fn test_deduplicates_by_key() {
        let mut store = store();
        // Same key behind two different (authority, account) pairs.
        store.add_key(AuthorityType::Posting, "dave".into(), key(2));

        let operations = vec![transfer("alice"), transfer("alice"), vote("dave")];
        let keys = KeyResolver::new(&store).resolve(&operations).unwrap();
        assert_eq!(keys, vec![key(2)]);
    }

    #[test]
    fn test_list_fields() {
        let store = store();
        let operations = vec![CustomJsonOperation {
            required_auths: vec!["carol".into()],
            required_posting_auths: vec!["bob".into(), "alice".into()],
            id: "follow".to_string(),
            json: "[]".to_string(),
        }
        .into()];

        let keys = KeyResolver::new(&store).resolve(&operations).unwrap();
        assert_eq!(keys, vec![key(4), key(3), key(1)]);
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let store = store();
        let operations = vec![vote("bob"), transfer("carol"), vote("alice")];
        let resolver = KeyResolver::new(&store);

        assert_eq!(
            resolver.resolve(&operations).unwrap(),
            resolver.resolve(&operations).unwrap()
        );
    }

    #[test]
    fn test_missing_key_names_operation_and_account() {
        let store = store();
        let operations = vec![vote("alice"), transfer("bob")];

        let err = KeyResolver::new(&store).resolve(&operations).unwrap_err();
        match err {
            SigningError::MissingKey {
                operation,
                authority,
                account,
            } => {
                assert_eq!(operation, "transfer");
                assert_eq!(authority, AuthorityType::Active);
                assert_eq!(account.as_str(), "bob");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_required_authorities() {
        let operations = vec![vote("alice"), transfer("alice"), vote("alice")];
        assert_eq!(
            required_authorities(&operations),
            vec![
                (AuthorityType::Posting, AccountName::new("alice")),
                (AuthorityType::Active, AccountName::new("alice")),
            ]
        );
    }
}
