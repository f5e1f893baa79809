//! # Account Identity
//!
//! Operators, challengers and non-signers are all named by a 20-byte
//! account address. The text form is `0x` followed by 40 lowercase hex
//! characters; parsing also accepts uppercase digits.
//!
//! Ordering is byte-wise, which is the order non-signer sets are sorted in.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A 20-byte account address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountId([u8; 20]);

impl AccountId {
    /// Wrap raw address bytes.
    pub const fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Access the raw address bytes.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Render as `0x`-prefixed lowercase hex.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl FromStr for AccountId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix("0x")
            .ok_or_else(|| CoreError::InvalidAccount(s.to_string()))?;
        let mut bytes = [0u8; 20];
        hex::decode_to_slice(digits, &mut bytes)
            .map_err(|_| CoreError::InvalidAccount(s.to_string()))?;
        Ok(Self(bytes))
    }
}

impl TryFrom<String> for AccountId {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AccountId> for String {
    fn from(id: AccountId) -> Self {
        id.to_hex()
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display_roundtrip() {
        let s = "0x00000000000000000000000000000000000000aa";
        let id: AccountId = s.parse().unwrap();
        assert_eq!(id.as_bytes()[19], 0xaa);
        assert_eq!(id.to_string(), s);
    }

    #[test]
    fn test_parse_accepts_uppercase_digits() {
        let id: AccountId = "0x00000000000000000000000000000000000000AB".parse().unwrap();
        assert_eq!(id.to_string(), "0x00000000000000000000000000000000000000ab");
    }

    #[test]
    fn test_parse_rejects_missing_prefix() {
        assert!("00000000000000000000000000000000000000aa".parse::<AccountId>().is_err());
    }

    #[test]
    fn test_parse_rejects_wrong_length() {
        assert!("0xaabb".parse::<AccountId>().is_err());
        assert!("0x".parse::<AccountId>().is_err());
    }

    #[test]
    fn test_ordering_is_bytewise() {
        let low = AccountId::from_bytes([0u8; 20]);
        let mut high_bytes = [0u8; 20];
        high_bytes[0] = 1;
        assert!(low < AccountId::from_bytes(high_bytes));
    }

    #[test]
    fn test_serde_uses_hex_string() {
        let id = AccountId::from_bytes([0x11; 20]);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"0x{}\"", "11".repeat(20)));
        let back: AccountId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
