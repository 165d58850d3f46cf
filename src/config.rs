//! Network configuration consumed by the signer

use chrono::{DateTime, Duration, Utc};
use std::fmt;
use std::sync::Arc;

/// Chain id of the Steem main network
pub const STEEM_CHAIN_ID: &str = "0000000000000000000000000000000000000000000000000000000000000000";

/// Default upper bound on `expiration - now`, in seconds
pub const DEFAULT_MAX_EXPIRATION_OFFSET_SECS: i64 = 3600;

/// Margin subtracted from the maximum offset when defaulting the expiration
pub const EXPIRATION_SAFETY_MARGIN_SECS: i64 = 60;

/// Default bound on signing attempts while searching for canonical signatures
pub const DEFAULT_MAX_SIGNING_ATTEMPTS: u32 = 256;

/// Cap on the per-key doubling of the attempt budget
pub const MAX_ATTEMPT_SCALE_BITS: usize = 16;

/// Source of the current time
pub trait Clock: fmt::Debug + Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock frozen at a given instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Network parameters for signing
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// Hex-encoded chain id, prefixed to the bytes being signed
    pub chain_id: String,
    /// Furthest the expiration may lie in the future
    pub max_expiration_offset: Duration,
    /// Bound on canonicalization attempts for a single key; see `signing_attempts_for`
    pub max_signing_attempts: u32,
    pub clock: Arc<dyn Clock>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            chain_id: STEEM_CHAIN_ID.to_string(),
            max_expiration_offset: Duration::seconds(DEFAULT_MAX_EXPIRATION_OFFSET_SECS),
            max_signing_attempts: DEFAULT_MAX_SIGNING_ATTEMPTS,
            clock: Arc::new(SystemClock),
        }
    }
}

impl NetworkConfig {
    pub fn with_chain_id(mut self, chain_id: impl Into<String>) -> Self {
        self.chain_id = chain_id.into();
        self
    }

    pub fn with_max_expiration_offset(mut self, offset: Duration) -> Self {
        self.max_expiration_offset = offset;
        self
    }

    pub fn with_max_signing_attempts(mut self, attempts: u32) -> Self {
        self.max_signing_attempts = attempts;
        self
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Decode the chain id; an empty id decodes to no bytes
    pub fn chain_id_bytes(&self) -> Result<Vec<u8>, hex::FromHexError> {
        hex::decode(&self.chain_id)
    }

    /// Expiration used when a transaction has none; `None` if out of range
    pub fn default_expiration(&self) -> Option<DateTime<Utc>> {
        self.latest_expiration()?
            .checked_sub_signed(Duration::seconds(EXPIRATION_SAFETY_MARGIN_SECS))
    }

    /// Latest expiration the network accepts right now; `None` if out of range
    pub fn latest_expiration(&self) -> Option<DateTime<Utc>> {
        self.now().checked_add_signed(self.max_expiration_offset)
    }

    /// Whether the network would reject `expiration` as too far ahead
    pub fn is_too_far(&self, expiration: DateTime<Utc>) -> bool {
        self.latest_expiration()
            .map_or(false, |latest| expiration > latest)
    }

    /// Attempt budget for a pass that needs `key_count` canonical signatures
    ///
    /// Every signature of a pass must be canonical over the same digest and
    /// each one is with probability about one half, so the budget doubles
    /// with every key past the first (up to `MAX_ATTEMPT_SCALE_BITS`).
    pub fn signing_attempts_for(&self, key_count: usize) -> u32 {
        let shift = key_count.saturating_sub(1).min(MAX_ATTEMPT_SCALE_BITS);
        self.max_signing_attempts.saturating_mul(1u32 << shift)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_defaults() {
        let config = NetworkConfig::default();
        assert_eq!(config.chain_id_bytes().unwrap(), vec![0u8; 32]);
        assert_eq!(config.max_expiration_offset, Duration::hours(1));
        assert_eq!(config.max_signing_attempts, DEFAULT_MAX_SIGNING_ATTEMPTS);
    }

    #[test]
    fn test_default_expiration() {
        let now = Utc.with_ymd_and_hms(2017, 1, 1, 0, 0, 0).unwrap();
        let config = NetworkConfig::default().with_clock(FixedClock(now));

        assert_eq!(
            config.default_expiration(),
            Some(now + Duration::seconds(3600 - 60))
        );
        assert_eq!(
            config.latest_expiration(),
            Some(now + Duration::seconds(3600))
        );
    }

    #[test]
    fn test_expiration_out_of_range() {
        let config = NetworkConfig::default().with_max_expiration_offset(Duration::MAX);
        assert_eq!(config.latest_expiration(), None);
        assert_eq!(config.default_expiration(), None);
        assert!(!config.is_too_far(DateTime::<Utc>::MAX_UTC));
    }

    #[test]
    fn test_is_too_far() {
        let now = Utc.with_ymd_and_hms(2017, 1, 1, 0, 0, 0).unwrap();
        let config = NetworkConfig::default().with_clock(FixedClock(now));

        assert!(!config.is_too_far(now));
        assert!(!config.is_too_far(now + Duration::seconds(3600)));
        assert!(config.is_too_far(now + Duration::seconds(3601)));
        assert!(config.is_too_far(now + Duration::days(2)));
    }

    #[test]
    fn test_signing_attempts_scale_with_keys() {
        let config = NetworkConfig::default().with_max_signing_attempts(256);
        assert_eq!(config.signing_attempts_for(0), 256);
        assert_eq!(config.signing_attempts_for(1), 256);
        assert_eq!(config.signing_attempts_for(2), 512);
        assert_eq!(config.signing_attempts_for(10), 256 << 9);
        assert_eq!(config.signing_attempts_for(100), 256 << 16);
        assert_eq!(
            NetworkConfig::default()
                .with_max_signing_attempts(u32::MAX)
                .signing_attempts_for(4),
            u32::MAX
        );

        let none = NetworkConfig::default().with_max_signing_attempts(0);
        assert_eq!(none.signing_attempts_for(10), 0);
    }

    #[test]
    fn test_invalid_chain_id() {
        let config = NetworkConfig::default().with_chain_id("zz");
        assert!(config.chain_id_bytes().is_err());

        let empty = NetworkConfig::default().with_chain_id("");
        assert!(empty.chain_id_bytes().unwrap().is_empty());
    }
}
