//! ECDSA key management for Steem accounts
//!
//! Provides key pair generation, WIF import/export and the `STM` public key
//! format, using the secp256k1 elliptic curve.

use rand::rngs::OsRng;
use secp256k1::{PublicKey, Secp256k1, SecretKey};
use std::fmt;
use thiserror::Error;

use super::hash::{double_sha256, ripemd160};

/// Version byte prepended to private keys in wallet import format
pub const WIF_VERSION: u8 = 0x80;

/// Prefix of public keys on the Steem main network
pub const PUBLIC_KEY_PREFIX: &str = "STM";

/// Errors that can occur during key operations
#[derive(Error, Debug)]
pub enum KeyError {
    #[error("Invalid private key")]
    InvalidPrivateKey,
    #[error("Invalid public key")]
    InvalidPublicKey,
    #[error("Invalid WIF: {0}")]
    InvalidWif(String),
    #[error("Checksum mismatch")]
    ChecksumMismatch,
    #[error("Secp256k1 error: {0}")]
    Secp256k1Error(#[from] secp256k1::Error),
}

/// A key pair consisting of a private key and its corresponding public key
///
/// `compressed` records which point encoding the account uses; it changes
/// the header byte of compact signatures but not the point itself.
#[derive(Clone)]
pub struct KeyPair {
    pub secret_key: SecretKey,
    pub public_key: PublicKey,
    pub compressed: bool,
}

impl KeyPair {
    /// Generate a new random key pair
    pub fn generate() -> Self {
        let secp = Secp256k1::new();
        let (secret_key, public_key) = secp.generate_keypair(&mut OsRng);
        Self {
            secret_key,
            public_key,
            compressed: true,
        }
    }

    /// Create a key pair from an existing secret key
    pub fn from_secret_key(secret_key: SecretKey) -> Self {
        let secp = Secp256k1::new();
        let public_key = PublicKey::from_secret_key(&secp, &secret_key);
        Self {
            secret_key,
            public_key,
            compressed: true,
        }
    }

    /// Create a key pair from a hex-encoded private key
    pub fn from_private_key_hex(hex_key: &str) -> Result<Self, KeyError> {
        let bytes = hex::decode(hex_key).map_err(|_| KeyError::InvalidPrivateKey)?;
        let secret_key = SecretKey::from_slice(&bytes).map_err(|_| KeyError::InvalidPrivateKey)?;
        Ok(Self::from_secret_key(secret_key))
    }

    /// Import a private key in wallet import format
    ///
    /// Layout after base58 decoding: `0x80 || key (32) || checksum (4)`,
    /// where the checksum is the first four bytes of the double SHA-256 of
    /// the version byte and key.
    pub fn from_wif(wif: &str) -> Result<Self, KeyError> {
        let bytes = bs58::decode(wif)
            .into_vec()
            .map_err(|e| KeyError::InvalidWif(e.to_string()))?;

        if bytes.len() != 37 {
            return Err(KeyError::InvalidWif(format!(
                "expected 37 bytes, got {}",
                bytes.len()
            )));
        }
        if bytes[0] != WIF_VERSION {
            return Err(KeyError::InvalidWif(format!(
                "unexpected version byte 0x{:02x}",
                bytes[0]
            )));
        }

        let (payload, checksum) = bytes.split_at(33);
        if double_sha256(payload)[..4] != *checksum {
            return Err(KeyError::ChecksumMismatch);
        }

        let secret_key =
            SecretKey::from_slice(&payload[1..]).map_err(|_| KeyError::InvalidPrivateKey)?;
        Ok(Self::from_secret_key(secret_key))
    }

    /// Use the given point encoding for signatures produced with this key
    pub fn with_compression(mut self, compressed: bool) -> Self {
        self.compressed = compressed;
        self
    }

    /// Export the private key in wallet import format
    pub fn to_wif(&self) -> String {
        let mut bytes = Vec::with_capacity(37);
        bytes.push(WIF_VERSION);
        bytes.extend_from_slice(&self.secret_key.secret_bytes());
        let checksum = double_sha256(&bytes);
        bytes.extend_from_slice(&checksum[..4]);
        bs58::encode(bytes).into_string()
    }

    /// Get the private key as a hex string
    pub fn private_key_hex(&self) -> String {
        hex::encode(self.secret_key.secret_bytes())
    }

    /// Get the public key as a hex string (compressed format)
    pub fn public_key_hex(&self) -> String {
        hex::encode(self.public_key.serialize())
    }

    /// Get the public key in `STM...` form
    pub fn public_key_string(&self) -> String {
        public_key_to_string(&self.public_key)
    }
}

/// Two key pairs are the same signing identity when they share the public
/// point and the compression flag.
impl PartialEq for KeyPair {
    fn eq(&self, other: &Self) -> bool {
        self.public_key == other.public_key && self.compressed == other.compressed
    }
}

impl Eq for KeyPair {}

// Never print the secret half.
impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &self.public_key_string())
            .field("compressed", &self.compressed)
            .finish()
    }
}

/// Convert a public key to its `STM` string form
/// Format: STM + Base58(compressed key || RIPEMD160(compressed key)[..4])
pub fn public_key_to_string(public_key: &PublicKey) -> String {
    let key_bytes = public_key.serialize();
    let checksum = ripemd160(&key_bytes);

    let mut bytes = key_bytes.to_vec();
    bytes.extend_from_slice(&checksum[..4]);

    format!("{}{}", PUBLIC_KEY_PREFIX, bs58::encode(bytes).into_string())
}

/// Parse a public key from its `STM` string form
pub fn public_key_from_string(value: &str) -> Result<PublicKey, KeyError> {
    let encoded = value
        .strip_prefix(PUBLIC_KEY_PREFIX)
        .ok_or(KeyError::InvalidPublicKey)?;
    let bytes = bs58::decode(encoded)
        .into_vec()
        .map_err(|_| KeyError::InvalidPublicKey)?;
    if bytes.len() != 37 {
        return Err(KeyError::InvalidPublicKey);
    }

    let (key_bytes, checksum) = bytes.split_at(33);
    if ripemd160(key_bytes)[..4] != *checksum {
        return Err(KeyError::ChecksumMismatch);
    }
    PublicKey::from_slice(key_bytes).map_err(|_| KeyError::InvalidPublicKey)
}

/// Parse a public key from hex string
pub fn public_key_from_hex(hex_key: &str) -> Result<PublicKey, KeyError> {
    let bytes = hex::decode(hex_key).map_err(|_| KeyError::InvalidPublicKey)?;
    PublicKey::from_slice(&bytes).map_err(|_| KeyError::InvalidPublicKey)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_WIF: &str = "5HwoXVkHoRM8sL2KmNRS217n1g8mPPBomrY7yehCuXC1115WWsh";

    #[test]
    fn test_key_pair_generation() {
        let kp = KeyPair::generate();
        assert!(!kp.private_key_hex().is_empty());
        assert!(kp.public_key_string().starts_with(PUBLIC_KEY_PREFIX));
        assert!(kp.compressed);
    }

    #[test]
    fn test_from_wif() {
        let kp = KeyPair::from_wif(TEST_WIF).unwrap();
        assert_eq!(kp.private_key_hex(), "11".repeat(32));
        assert_eq!(kp.to_wif(), TEST_WIF);
    }

    #[test]
    fn test_wif_bad_checksum() {
        let mut wif = TEST_WIF.to_string();
        wif.pop();
        wif.push('j');
        assert!(KeyPair::from_wif(&wif).is_err());
    }

    #[test]
    fn test_wif_wrong_length() {
        let short = bs58::encode([WIF_VERSION; 10]).into_string();
        assert!(matches!(
            KeyPair::from_wif(&short),
            Err(KeyError::InvalidWif(_))
        ));
    }

    #[test]
    fn test_public_key_string_roundtrip() {
        let kp = KeyPair::generate();
        let parsed = public_key_from_string(&kp.public_key_string()).unwrap();
        assert_eq!(parsed, kp.public_key);
        assert!(public_key_from_string("BTS1111").is_err());
    }

    #[test]
    fn test_key_pair_from_hex() {
        let kp1 = KeyPair::generate();
        let kp2 = KeyPair::from_private_key_hex(&kp1.private_key_hex()).unwrap();
        assert_eq!(kp1, kp2);
        assert_eq!(
            public_key_from_hex(&kp1.public_key_hex()).unwrap(),
            kp2.public_key
        );
    }

    #[test]
    fn test_equality_includes_compression() {
        let kp = KeyPair::from_wif(TEST_WIF).unwrap();
        let uncompressed = kp.clone().with_compression(false);
        assert_ne!(kp, uncompressed);
    }

    #[test]
    fn test_debug_hides_secret() {
        let kp = KeyPair::from_wif(TEST_WIF).unwrap();
        let printed = format!("{:?}", kp);
        assert!(!printed.contains(&kp.private_key_hex()));
    }
}
