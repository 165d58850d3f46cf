//! Protocol value types shared by operations and transactions

use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use super::encoding::{ByteWriter, EncodeError};

/// Maximum length of an asset symbol on the wire
pub const MAX_SYMBOL_LEN: usize = 7;

// =============================================================================
// Account Name
// =============================================================================

/// A Steem account name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct AccountName(String);

impl AccountName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn encode(&self, writer: &mut ByteWriter) {
        writer.write_string(&self.0);
    }
}

impl fmt::Display for AccountName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AccountName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for AccountName {
    fn from(name: String) -> Self {
        Self(name)
    }
}

// =============================================================================
// Authority Type
// =============================================================================

/// The role of a key within an account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AuthorityType {
    Owner,
    Active,
    Posting,
    Memo,
}

impl fmt::Display for AuthorityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AuthorityType::Owner => "owner",
            AuthorityType::Active => "active",
            AuthorityType::Posting => "posting",
            AuthorityType::Memo => "memo",
        };
        f.write_str(name)
    }
}

// =============================================================================
// Asset
// =============================================================================

/// An amount of a fixed-precision token, e.g. `1.000 STEEM`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    /// Amount in the smallest unit (`1.000 STEEM` is 1000)
    pub amount: i64,
    pub precision: u8,
    pub symbol: String,
}

impl Asset {
    pub fn new(amount: i64, precision: u8, symbol: impl Into<String>) -> Self {
        Self {
            amount,
            precision,
            symbol: symbol.into(),
        }
    }

    pub fn steem(amount: i64) -> Self {
        Self::new(amount, 3, "STEEM")
    }

    pub fn sbd(amount: i64) -> Self {
        Self::new(amount, 3, "SBD")
    }

    pub fn vests(amount: i64) -> Self {
        Self::new(amount, 6, "VESTS")
    }

    /// Wire form: i64 LE amount, u8 precision, symbol zero-padded to 7 bytes
    pub fn encode(&self, writer: &mut ByteWriter, field: &'static str) -> Result<(), EncodeError> {
        let symbol = self.symbol.as_bytes();
        if symbol.len() > MAX_SYMBOL_LEN {
            return Err(EncodeError::SymbolTooLong {
                field,
                symbol: self.symbol.clone(),
            });
        }

        writer.write_i64(self.amount);
        writer.write_u8(self.precision);
        let mut padded = [0u8; MAX_SYMBOL_LEN];
        padded[..symbol.len()].copy_from_slice(symbol);
        writer.write_bytes(&padded);
        Ok(())
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.amount < 0 { "-" } else { "" };
        let precision = self.precision as usize;
        if precision == 0 {
            return write!(f, "{}{} {}", sign, self.amount.unsigned_abs(), self.symbol);
        }

        // Pad to at least one integer digit, then split off the decimals
        let digits = format!(
            "{:0width$}",
            self.amount.unsigned_abs(),
            width = precision + 1
        );
        let (whole, fraction) = digits.split_at(digits.len() - precision);
        write!(f, "{}{}.{} {}", sign, whole, fraction, self.symbol)
    }
}

impl FromStr for Asset {
    type Err = EncodeError;

    /// Parse `"<amount> <SYMBOL>"`; the number of decimals sets the precision
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || EncodeError::InvalidAsset(s.to_string());

        let (number, symbol) = s.trim().split_once(' ').ok_or_else(invalid)?;
        let symbol = symbol.trim();
        if symbol.is_empty() || symbol.len() > MAX_SYMBOL_LEN {
            return Err(invalid());
        }

        let (negative, number) = match number.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, number),
        };
        let (whole, fraction) = number.split_once('.').unwrap_or((number, ""));
        if whole.is_empty()
            || !whole.chars().all(|c| c.is_ascii_digit())
            || !fraction.chars().all(|c| c.is_ascii_digit())
        {
            return Err(invalid());
        }

        let precision = u8::try_from(fraction.len()).map_err(|_| invalid())?;
        let digits = format!("{}{}", whole, fraction);
        let amount: i64 = digits.parse().map_err(|_| invalid())?;

        Ok(Self {
            amount: if negative { -amount } else { amount },
            precision,
            symbol: symbol.to_string(),
        })
    }
}

impl Serialize for Asset {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_display() {
        assert_eq!(Asset::steem(1000).to_string(), "1.000 STEEM");
        assert_eq!(Asset::sbd(5).to_string(), "0.005 SBD");
        assert_eq!(Asset::vests(-1_500_000).to_string(), "-1.500000 VESTS");
        assert_eq!(Asset::new(42, 0, "TOK").to_string(), "42 TOK");
    }

    #[test]
    fn test_asset_display_wide_precision() {
        assert_eq!(
            Asset::new(5, 20, "TOK").to_string(),
            "0.00000000000000000005 TOK"
        );
        assert_eq!(
            Asset::new(i64::MIN, 19, "TOK").to_string(),
            "-0.9223372036854775808 TOK"
        );

        let json = serde_json::to_value(Asset::new(1, 255, "TOK")).unwrap();
        assert!(json.as_str().unwrap().ends_with("1 TOK"));
    }

    #[test]
    fn test_asset_parse() {
        let asset: Asset = "12.345 STEEM".parse().unwrap();
        assert_eq!(asset, Asset::steem(12345));

        let vests: Asset = "0.000001 VESTS".parse().unwrap();
        assert_eq!(vests, Asset::vests(1));

        assert!("12.3".parse::<Asset>().is_err());
        assert!("abc STEEM".parse::<Asset>().is_err());
        assert!("1.000 TOOLONGSYM".parse::<Asset>().is_err());
    }

    #[test]
    fn test_asset_encoding() {
        let mut writer = ByteWriter::new();
        Asset::steem(1000).encode(&mut writer, "amount").unwrap();
        assert_eq!(
            hex::encode(writer.into_bytes()),
            "e80300000000000003535445454d0000"
        );
    }

    #[test]
    fn test_asset_symbol_too_long() {
        let mut writer = ByteWriter::new();
        let err = Asset::new(1, 3, "LONGSYMBOL")
            .encode(&mut writer, "amount")
            .unwrap_err();
        assert!(matches!(err, EncodeError::SymbolTooLong { field: "amount", .. }));
    }

    #[test]
    fn test_authority_display() {
        assert_eq!(AuthorityType::Active.to_string(), "active");
        assert_eq!(AuthorityType::Posting.to_string(), "posting");
    }
}
