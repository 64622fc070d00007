//! Address and hash types narrowed from provider hex strings.
//!
//! Both wrap `alloy_primitives` values; parsing accepts any hex case, display is lowercase `0x..`.

use alloy_primitives::B256;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind}: {value:?}")]
pub struct ParseHexError {
    kind: &'static str,
    value: String,
}

/// 20-byte account address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "alloy_primitives::Address", into = "String")]
pub struct Address(alloy_primitives::Address);

impl Address {
    pub fn parse(s: &str) -> Result<Self, ParseHexError> {
        alloy_primitives::Address::from_str(s.trim())
            .map(Address)
            .map_err(|_| ParseHexError {
                kind: "address",
                value: s.to_string(),
            })
    }

    /// The null address used as the payload sink.
    pub fn zero() -> Self {
        Address(alloy_primitives::Address::ZERO)
    }

    pub fn inner(&self) -> &alloy_primitives::Address {
        &self.0
    }

    /// `0x1234...abcd` form for tables and prompts.
    pub fn short(&self) -> String {
        let full = self.to_string();
        format!("{}...{}", &full[..6], &full[full.len() - 4..])
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0.as_slice()))
    }
}

impl From<alloy_primitives::Address> for Address {
    fn from(a: alloy_primitives::Address) -> Self {
        Address(a)
    }
}

impl From<Address> for String {
    fn from(a: Address) -> Self {
        a.to_string()
    }
}

/// 32-byte transaction hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "B256", into = "String")]
pub struct TxHash(B256);

impl TxHash {
    pub fn parse(s: &str) -> Result<Self, ParseHexError> {
        B256::from_str(s.trim()).map(TxHash).map_err(|_| ParseHexError {
            kind: "transaction hash",
            value: s.to_string(),
        })
    }

    pub fn inner(&self) -> &B256 {
        &self.0
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0.as_slice()))
    }
}

impl From<B256> for TxHash {
    fn from(h: B256) -> Self {
        TxHash(h)
    }
}

impl From<TxHash> for String {
    fn from(h: TxHash) -> Self {
        h.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_is_displayed_lowercase() {
        let a = Address::parse("0xAbCdEf0123456789abcdef0123456789ABCDEF01").unwrap();
        assert_eq!(a.to_string(), "0xabcdef0123456789abcdef0123456789abcdef01");
        assert_eq!(a.short(), "0xabcd...ef01");
    }

    #[test]
    fn address_rejects_bad_input() {
        assert!(Address::parse("0x1234").is_err());
        assert!(Address::parse("0xzzcdef0123456789abcdef0123456789abcdef01").is_err());
        assert!(Address::parse("not-an-address").is_err());
    }

    #[test]
    fn zero_address_shape() {
        assert_eq!(
            Address::zero().to_string(),
            "0x0000000000000000000000000000000000000000"
        );
        assert_eq!(*Address::zero().inner(), alloy_primitives::Address::ZERO);
    }

    #[test]
    fn serde_goes_through_validation() {
        let h: TxHash =
            serde_json::from_value(serde_json::json!(format!("0x{}", "AB".repeat(32)))).unwrap();
        assert_eq!(h.to_string(), format!("0x{}", "ab".repeat(32)));
        assert!(serde_json::from_value::<TxHash>(serde_json::json!("0x12")).is_err());
        assert_eq!(
            serde_json::to_value(Address::zero()).unwrap(),
            serde_json::json!("0x0000000000000000000000000000000000000000")
        );
    }
}
