//! Signed transaction handling
//!
//! A transaction is a reference block (replay protection), an expiration
//! time, an ordered list of operations and forward-compatible extensions.
//! The same deterministic byte layout serves as the wire form and, prefixed
//! with the chain id, as the message that gets signed.

use chrono::{DateTime, Duration, Utc};
use serde::ser::{SerializeTuple, Serializer};
use serde::Serialize;
use thiserror::Error;

use super::encoding::{ByteWriter, EncodeError};
use super::operation::Operation;
use super::resolver::KeyResolver;
use super::signer::TransactionSigner;
use super::types::{AccountName, AuthorityType};
use crate::config::NetworkConfig;
use crate::crypto::sha256;
use crate::wallet::{KeyStore, KeyStoreError};

// =============================================================================
// Constants
// =============================================================================

/// Encoded size of ref_block_num + ref_block_prefix + expiration
pub const TX_HEADER_SIZE: usize = 2 + 4 + 4;

/// Length of a transaction id in bytes
pub const TX_ID_SIZE: usize = 20;

/// Length of a block id in bytes
pub const BLOCK_ID_SIZE: usize = 20;

// =============================================================================
// Error Types
// =============================================================================

/// Errors raised while preparing or signing a transaction
#[derive(Error, Debug)]
pub enum SigningError {
    #[error("Invalid transaction: {0}")]
    InvalidTransaction(String),
    #[error("Missing {authority} key for account {account} required by '{operation}'")]
    MissingKey {
        operation: &'static str,
        authority: AuthorityType,
        account: AccountName,
    },
    #[error("Key store error: {0}")]
    KeyStore(KeyStoreError),
    #[error("Encoding error: {0}")]
    Encoding(#[from] EncodeError),
    #[error("Invalid chain id: {0}")]
    InvalidChainId(String),
    #[error("Expiration out of range: {0}")]
    ExpirationOutOfRange(String),
    #[error("Could not construct a recoverable key for the signature")]
    RecoveryFailed,
    #[error("No canonical signature found after {attempts} attempts")]
    CanonicalRetriesExhausted { attempts: u32 },
    #[error("Secp256k1 error: {0}")]
    Crypto(#[from] secp256k1::Error),
}

impl SigningError {
    /// Failures that indicate a bug or broken environment rather than bad input
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            SigningError::RecoveryFailed
                | SigningError::CanonicalRetriesExhausted { .. }
                | SigningError::Crypto(_)
        )
    }
}

// =============================================================================
// Extensions
// =============================================================================

/// Forward-compatibility slot; the protocol defines no extensions yet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FutureExtension {
    Void,
}

impl FutureExtension {
    pub fn encode(&self, writer: &mut ByteWriter) {
        match self {
            FutureExtension::Void => writer.write_varint(0),
        }
    }
}

impl Serialize for FutureExtension {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Empty {}

        let mut tuple = serializer.serialize_tuple(2)?;
        match self {
            FutureExtension::Void => {
                tuple.serialize_element(&0u8)?;
                tuple.serialize_element(&Empty {})?;
            }
        }
        tuple.end()
    }
}

// =============================================================================
// Signed Transaction
// =============================================================================

/// A transaction together with the signatures collected for it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignedTransaction {
    /// Lower 16 bits of the reference block number
    pub ref_block_num: u16,
    /// Bytes 4..8 of the reference block id; only the low 32 bits go on the wire
    #[serde(serialize_with = "serialize_ref_block_prefix")]
    pub ref_block_prefix: u64,
    /// Unset until signing chooses one
    #[serde(serialize_with = "serialize_expiration")]
    pub expiration: Option<DateTime<Utc>>,
    pub operations: Vec<Operation>,
    pub extensions: Vec<FutureExtension>,
    signatures: Vec<String>,
}

impl SignedTransaction {
    /// Create an unsigned transaction without operations
    pub fn new(ref_block_num: u16, ref_block_prefix: u64) -> Self {
        Self {
            ref_block_num,
            ref_block_prefix,
            expiration: None,
            operations: Vec::new(),
            extensions: Vec::new(),
            signatures: Vec::new(),
        }
    }

    /// Create a transaction referencing the block with the given hex id
    ///
    /// The block number sits big-endian in the first four bytes of the id;
    /// the prefix is the little-endian word that follows.
    pub fn from_reference_block(block_id: &str) -> Result<Self, SigningError> {
        let bytes = hex::decode(block_id)
            .map_err(|e| SigningError::InvalidTransaction(format!("block id: {}", e)))?;
        if bytes.len() != BLOCK_ID_SIZE {
            return Err(SigningError::InvalidTransaction(format!(
                "block id must be {} bytes, got {}",
                BLOCK_ID_SIZE,
                bytes.len()
            )));
        }

        let block_num = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        let prefix = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
        Ok(Self::new((block_num & 0xFFFF) as u16, prefix as u64))
    }

    pub fn with_expiration(mut self, expiration: DateTime<Utc>) -> Self {
        self.expiration = Some(expiration);
        self
    }

    pub fn with_operation(mut self, operation: impl Into<Operation>) -> Self {
        self.operations.push(operation.into());
        self
    }

    pub fn push_operation(&mut self, operation: impl Into<Operation>) {
        self.operations.push(operation.into());
    }

    /// Hex-encoded compact signatures, in signing order
    pub fn signatures(&self) -> &[String] {
        &self.signatures
    }

    pub fn is_signed(&self) -> bool {
        !self.signatures.is_empty()
    }

    /// Serialize the transaction
    ///
    /// Layout: chain id (if non-empty), ref_block_num (u16 LE),
    /// ref_block_prefix (u32 LE), expiration (u32 LE seconds), varint
    /// operation count, each operation, varint extension count, each
    /// extension. Signatures are not part of the output.
    pub fn to_bytes(&self, chain_id: &[u8]) -> Result<Vec<u8>, EncodeError> {
        let expiration = self
            .expiration
            .as_ref()
            .ok_or(EncodeError::MissingField {
                field: "expiration",
            })?;

        let mut writer = ByteWriter::new();
        writer.write_bytes(chain_id);
        writer.write_u16(self.ref_block_num);
        writer.write_u32(self.ref_block_prefix as u32);
        writer.write_time_point_sec("expiration", expiration)?;

        writer.write_varint(self.operations.len() as u64);
        for operation in &self.operations {
            operation.encode(&mut writer)?;
        }

        writer.write_varint(self.extensions.len() as u64);
        for extension in &self.extensions {
            extension.encode(&mut writer);
        }

        Ok(writer.into_bytes())
    }

    /// Like `to_bytes`, but first checks that every required key is available
    pub fn to_bytes_checked<K: KeyStore + ?Sized>(
        &self,
        chain_id: &[u8],
        key_store: &K,
    ) -> Result<Vec<u8>, SigningError> {
        KeyResolver::new(key_store).resolve(&self.operations)?;
        Ok(self.to_bytes(chain_id)?)
    }

    /// SHA-256 of the chain-prefixed serialization; this is what gets signed
    pub fn digest(&self, chain_id: &[u8]) -> Result<[u8; 32], EncodeError> {
        Ok(sha256(&self.to_bytes(chain_id)?))
    }

    /// Transaction id: first 20 bytes of the SHA-256 of the wire form
    pub fn transaction_id(&self) -> Result<String, EncodeError> {
        let hash = sha256(&self.to_bytes(&[])?);
        Ok(hex::encode(&hash[..TX_ID_SIZE]))
    }

    /// Sign with every key the operations require
    ///
    /// See `TransactionSigner::sign`.
    pub fn sign<K: KeyStore + ?Sized>(
        &mut self,
        config: &NetworkConfig,
        key_store: &K,
    ) -> Result<(), SigningError> {
        TransactionSigner::new(config, key_store).sign(self)
    }

    /// Fail unless the transaction has everything signing needs
    pub fn validate(&self) -> Result<(), SigningError> {
        if self.operations.is_empty() {
            return Err(SigningError::InvalidTransaction(
                "At least one operation is required to sign the transaction".to_string(),
            ));
        }
        if self.ref_block_num == 0 {
            return Err(SigningError::InvalidTransaction(
                "The ref_block_num field needs to be set".to_string(),
            ));
        }
        if self.ref_block_prefix == 0 {
            return Err(SigningError::InvalidTransaction(
                "The ref_block_prefix field needs to be set".to_string(),
            ));
        }
        Ok(())
    }

    pub(crate) fn advance_expiration(&mut self, by: Duration) -> Result<(), SigningError> {
        if let Some(expiration) = self.expiration.as_mut() {
            *expiration = expiration.checked_add_signed(by).ok_or_else(|| {
                SigningError::ExpirationOutOfRange(format!("{} + {}", expiration, by))
            })?;
        }
        Ok(())
    }

    pub(crate) fn append_signatures(&mut self, signatures: Vec<String>) {
        self.signatures.extend(signatures);
    }
}

fn serialize_ref_block_prefix<S: Serializer>(value: &u64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u32(*value as u32)
}

fn serialize_expiration<S: Serializer>(
    value: &Option<DateTime<Utc>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match value {
        Some(time) => serializer.collect_str(&time.format("%Y-%m-%dT%H:%M:%S")),
        None => serializer.serialize_none(),
    }
}
