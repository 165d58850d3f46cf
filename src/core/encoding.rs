//! Binary encoding primitives for the Steem wire format
//!
//! Integers are little-endian, lengths and counts are unsigned LEB128
//! varints, strings are a varint byte length followed by UTF-8 bytes and
//! timestamps are 32-bit seconds since the Unix epoch.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors raised while turning a value into bytes
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error("Missing field: {field}")]
    MissingField { field: &'static str },
    #[error("Timestamp out of range for {field}: {seconds}s since epoch")]
    TimestampOutOfRange { field: &'static str, seconds: i64 },
    #[error("Asset symbol too long in {field}: {symbol}")]
    SymbolTooLong { field: &'static str, symbol: String },
    #[error("Invalid asset: {0}")]
    InvalidAsset(String),
}

/// Append-only byte buffer
#[derive(Debug, Default, Clone)]
pub struct ByteWriter {
    buf: Vec<u8>,
}

impl ByteWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    pub fn write_bool(&mut self, value: bool) {
        self.buf.push(value as u8);
    }

    pub fn write_u16(&mut self, value: u16) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_i16(&mut self, value: i16) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_u32(&mut self, value: u32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_i64(&mut self, value: i64) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    /// Unsigned LEB128: 7 data bits per byte, high bit set on all but the last
    pub fn write_varint(&mut self, mut value: u64) {
        loop {
            let byte = (value & 0x7f) as u8;
            value >>= 7;
            if value == 0 {
                self.buf.push(byte);
                return;
            }
            self.buf.push(byte | 0x80);
        }
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    pub fn write_string(&mut self, value: &str) {
        self.write_varint(value.len() as u64);
        self.buf.extend_from_slice(value.as_bytes());
    }

    /// Encode a timestamp as `time_point_sec` (u32 LE seconds)
    pub fn write_time_point_sec(
        &mut self,
        field: &'static str,
        time: &DateTime<Utc>,
    ) -> Result<(), EncodeError> {
        let seconds = time.timestamp();
        let value = u32::try_from(seconds)
            .map_err(|_| EncodeError::TimestampOutOfRange { field, seconds })?;
        self.write_u32(value);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

/// Number of bytes `write_varint` emits for `value`
pub fn varint_len(value: u64) -> usize {
    let bits = 64 - value.leading_zeros() as usize;
    bits.max(1).div_ceil(7)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn varint(value: u64) -> Vec<u8> {
        let mut writer = ByteWriter::new();
        writer.write_varint(value);
        writer.into_bytes()
    }

    #[test]
    fn test_varint() {
        assert_eq!(varint(0), vec![0x00]);
        assert_eq!(varint(1), vec![0x01]);
        assert_eq!(varint(127), vec![0x7f]);
        assert_eq!(varint(128), vec![0x80, 0x01]);
        assert_eq!(varint(300), vec![0xac, 0x02]);
        assert_eq!(varint(u64::MAX).len(), 10);
    }

    #[test]
    fn test_varint_len_matches_encoding() {
        for value in [0u64, 1, 127, 128, 16_383, 16_384, u32::MAX as u64, u64::MAX] {
            assert_eq!(varint_len(value), varint(value).len(), "value {}", value);
        }
    }

    #[test]
    fn test_little_endian_integers() {
        let mut writer = ByteWriter::new();
        writer.write_u16(1234);
        writer.write_u32(0xDEADBEEF);
        writer.write_i16(-1);
        assert_eq!(hex::encode(writer.into_bytes()), "d204efbeaddeffff");
    }

    #[test]
    fn test_string() {
        let mut writer = ByteWriter::new();
        writer.write_string("xeroc");
        assert_eq!(hex::encode(writer.into_bytes()), "057865726f63");
    }

    #[test]
    fn test_time_point_sec() {
        let mut writer = ByteWriter::new();
        let time = Utc.with_ymd_and_hms(2016, 8, 8, 12, 24, 17).unwrap();
        writer.write_time_point_sec("expiration", &time).unwrap();
        assert_eq!(hex::encode(writer.into_bytes()), "f179a857");
    }

    #[test]
    fn test_time_point_sec_out_of_range() {
        let mut writer = ByteWriter::new();
        let time = Utc.with_ymd_and_hms(2200, 1, 1, 0, 0, 0).unwrap();
        let err = writer.write_time_point_sec("expiration", &time).unwrap_err();
        assert!(matches!(
            err,
            EncodeError::TimestampOutOfRange {
                field: "expiration",
                ..
            }
        ));
        assert!(writer.is_empty());
    }
}
