//! Canonical transaction signing
//!
//! Signatures go on the wire in compact recoverable form:
//!
//! ```text
//! byte 0      recovery id + 27 (+4 for compressed keys)
//! bytes 1-32  r, big-endian
//! bytes 33-64 s, big-endian
//! ```
//!
//! The network only accepts canonical signatures. When a key produces a
//! non-canonical one, the expiration is pushed forward by a second, which
//! changes the digest, and the pass starts over.

use chrono::Duration;
use secp256k1::ecdsa::{RecoverableSignature, RecoveryId};
use secp256k1::{All, Message, Secp256k1};

use super::resolver::KeyResolver;
use super::transaction::{SignedTransaction, SigningError};
use crate::config::NetworkConfig;
use crate::crypto::KeyPair;
use crate::wallet::KeyStore;

/// Size of a compact recoverable signature
pub const COMPACT_SIGNATURE_SIZE: usize = 65;

/// Offset added to the recovery id in the header byte
pub const RECOVERY_ID_OFFSET: u8 = 27;

/// Extra header offset for compressed public keys
pub const COMPRESSED_KEY_OFFSET: u8 = 4;

/// Whether a compact signature has the canonical form the network requires
///
/// Rejects a set high bit in the header, in the first byte of r or in the
/// first byte of s, and a zero header or zero last byte of r.
pub fn is_canonical(signature: &[u8; COMPACT_SIGNATURE_SIZE]) -> bool {
    signature[0] & 0x80 == 0
        && signature[0] != 0
        && signature[1] & 0x80 == 0
        && signature[32] != 0
        && signature[33] & 0x80 == 0
}

/// Sign a digest and encode the result in compact recoverable form
pub fn sign_compact(
    secp: &Secp256k1<All>,
    key: &KeyPair,
    digest: &[u8; 32],
) -> Result<[u8; COMPACT_SIGNATURE_SIZE], SigningError> {
    let message = Message::from_digest_slice(digest)?;
    // RFC 6979 nonce: same key and digest always give the same (r, s).
    let signature = secp.sign_ecdsa(&message, &key.secret_key);
    let rs = signature.serialize_compact();

    let recovery_id = find_recovery_id(secp, &message, &rs, key)?;

    let mut compact = [0u8; COMPACT_SIGNATURE_SIZE];
    compact[0] = recovery_id
        + RECOVERY_ID_OFFSET
        + if key.compressed {
            COMPRESSED_KEY_OFFSET
        } else {
            0
        };
    compact[1..].copy_from_slice(&rs);
    Ok(compact)
}

/// Find the recovery id that yields the signer's public key
fn find_recovery_id(
    secp: &Secp256k1<All>,
    message: &Message,
    rs: &[u8; 64],
    key: &KeyPair,
) -> Result<u8, SigningError> {
    for id in 0..4 {
        let recovery_id = RecoveryId::from_i32(id)?;
        let Ok(candidate) = RecoverableSignature::from_compact(rs, recovery_id) else {
            continue;
        };
        if let Ok(public_key) = secp.recover_ecdsa(message, &candidate) {
            if public_key == key.public_key {
                return Ok(id as u8);
            }
        }
    }

    Err(SigningError::RecoveryFailed)
}

/// Signs transactions with keys from a `KeyStore`
pub struct TransactionSigner<'a, K: KeyStore + ?Sized> {
    config: &'a NetworkConfig,
    key_store: &'a K,
    secp: Secp256k1<All>,
}

impl<'a, K: KeyStore + ?Sized> TransactionSigner<'a, K> {
    pub fn new(config: &'a NetworkConfig, key_store: &'a K) -> Self {
        Self {
            config,
            key_store,
            secp: Secp256k1::new(),
        }
    }

    /// Append one canonical signature per required key
    ///
    /// Preconditions and key lookup are checked before the transaction is
    /// touched. An unset expiration is set to the latest safe value. The
    /// expiration may move forward while searching for canonical
    /// signatures, also on a later failure; signatures are only appended
    /// once every key has produced a canonical one for the same digest.
    /// The attempt budget grows with the number of keys, see
    /// `NetworkConfig::signing_attempts_for`.
    pub fn sign(&self, tx: &mut SignedTransaction) -> Result<(), SigningError> {
        tx.validate()?;

        let chain_id = self
            .config
            .chain_id_bytes()
            .map_err(|e| SigningError::InvalidChainId(e.to_string()))?;

        let keys = KeyResolver::new(self.key_store).resolve(&tx.operations)?;

        match tx.expiration {
            None => {
                let expiration = self.config.default_expiration().ok_or_else(|| {
                    SigningError::ExpirationOutOfRange(format!(
                        "now + {}",
                        self.config.max_expiration_offset
                    ))
                })?;
                tx.expiration = Some(expiration);
                log::debug!(
                    "No expiration date has been provided so the latest possible time is used"
                );
            }
            Some(expiration) if self.config.is_too_far(expiration) => {
                log::warn!(
                    "Expiration {} is too far in the future and may not be accepted by the node",
                    expiration
                );
            }
            Some(_) => {}
        }

        let attempts = self.config.signing_attempts_for(keys.len());
        for attempt in 1..=attempts {
            match self.sign_pass(tx, &chain_id, &keys)? {
                Some(signatures) => {
                    log::debug!(
                        "Signed transaction with {} signature(s) after {} attempt(s)",
                        signatures.len(),
                        attempt
                    );
                    if let Some(expiration) = tx.expiration {
                        if attempt > 1 && self.config.is_too_far(expiration) {
                            log::warn!(
                                "Canonical search moved expiration to {}, past the accepted window",
                                expiration
                            );
                        }
                    }
                    tx.append_signatures(signatures);
                    return Ok(());
                }
                None => {
                    tx.advance_expiration(Duration::seconds(1))?;
                    log::debug!(
                        "Non-canonical signature on attempt {}, retrying with expiration {:?}",
                        attempt,
                        tx.expiration
                    );
                }
            }
        }

        Err(SigningError::CanonicalRetriesExhausted { attempts })
    }

    /// Sign the current digest with every key; `None` if any result is non-canonical
    fn sign_pass(
        &self,
        tx: &SignedTransaction,
        chain_id: &[u8],
        keys: &[KeyPair],
    ) -> Result<Option<Vec<String>>, SigningError> {
        let digest = tx.digest(chain_id)?;

        let mut signatures = Vec::with_capacity(keys.len());
        for key in keys {
            let compact = sign_compact(&self.secp, key, &digest)?;
            if !is_canonical(&compact) {
                return Ok(None);
            }
            signatures.push(hex::encode(compact));
        }

        Ok(Some(signatures))
    }
}
