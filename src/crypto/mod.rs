//! Cryptographic utilities for transaction signing
//!
//! This module provides:
//! - SHA-256 / RIPEMD-160 hashing
//! - ECDSA key management (secp256k1)
//! - WIF and `STM` public key formats

pub mod hash;
pub mod keys;

pub use hash::{double_sha256, ripemd160, sha256, sha256_hex};
pub use keys::{
    public_key_from_hex, public_key_from_string, public_key_to_string, KeyError, KeyPair,
    PUBLIC_KEY_PREFIX, WIF_VERSION,
};
