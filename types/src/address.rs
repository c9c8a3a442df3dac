//! Participant address: a 20-byte identity rendered as `0x`-prefixed hex.

use crate::error::TypeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identity of a participant, used only as a lookup key by the ledger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Address([u8; 20]);

impl Address {
    /// Number of raw bytes in an address.
    pub const LEN: usize = 20;

    /// The all-zero address.
    pub const ZERO: Self = Self([0u8; 20]);

    pub fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Derive a deterministic address from a human-readable label.
    ///
    /// Blake2b-512 of the label, truncated to the first 20 bytes. Used by
    /// scenario files and tests to name participants.
    pub fn from_label(label: &str) -> Self {
        use blake2::{Blake2b512, Digest};

        let digest = Blake2b512::digest(label.as_bytes());
        let mut out = [0u8; 20];
        out.copy_from_slice(&digest[..Self::LEN]);
        Self(out)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix("0x")
            .ok_or_else(|| TypeError::InvalidAddress(format!("{s}: missing 0x prefix")))?;
        let bytes =
            hex::decode(digits).map_err(|e| TypeError::InvalidAddress(format!("{s}: {e}")))?;
        let raw: [u8; 20] = bytes.try_into().map_err(|b: Vec<u8>| {
            TypeError::InvalidAddress(format!("{s}: expected 20 bytes, got {}", b.len()))
        })?;
        Ok(Self(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_lowercase_hex_with_prefix() {
        let mut raw = [0u8; 20];
        raw[19] = 0xab;
        let addr = Address::new(raw);
        assert_eq!(addr.to_string(), "0x00000000000000000000000000000000000000ab");
    }

    #[test]
    fn parse_accepts_display_output() {
        let addr = Address::from_label("alice");
        let parsed: Address = addr.to_string().parse().unwrap();
        assert_eq!(parsed, addr);
    }

    #[test]
    fn parse_rejects_missing_prefix() {
        let err = "00".repeat(20).parse::<Address>().unwrap_err();
        assert!(matches!(err, TypeError::InvalidAddress(_)));
    }

    #[test]
    fn parse_rejects_wrong_length() {
        assert!("0xabcd".parse::<Address>().is_err());
        assert!("0xzz".parse::<Address>().is_err());
    }

    #[test]
    fn labels_are_deterministic_and_distinct() {
        assert_eq!(Address::from_label("alice"), Address::from_label("alice"));
        assert_ne!(Address::from_label("alice"), Address::from_label("bob"));
        assert!(!Address::from_label("alice").is_zero());
        assert!(Address::ZERO.is_zero());
    }
}
