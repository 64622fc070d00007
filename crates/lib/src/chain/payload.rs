//! UTF-8 text <-> `0x`-prefixed hex transaction data.

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("malformed payload hex: {0}")]
    Hex(#[from] hex::FromHexError),
    #[error("payload is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// UTF-8 bytes of `text` as `0x`-prefixed lowercase hex. The empty string encodes to `0x`.
pub fn encode_payload(text: &str) -> String {
    format!("0x{}", hex::encode(text.as_bytes()))
}

/// Inverse of [`encode_payload`]. The `0x` prefix is optional.
pub fn decode_payload(data: &str) -> Result<String, DecodeError> {
    let digits = data
        .strip_prefix("0x")
        .or_else(|| data.strip_prefix("0X"))
        .unwrap_or(data);
    let bytes = hex::decode(digits)?;
    Ok(String::from_utf8(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_encodes_to_known_hex() {
        assert_eq!(encode_payload("hi"), "0x6869");
        assert_eq!(encode_payload(""), "0x");
    }

    #[test]
    fn round_trips_multibyte_text() {
        for s in ["", "hello world", "你好，世界", "emoji 🦀 ok", "é\u{0}\n"] {
            assert_eq!(decode_payload(&encode_payload(s)).unwrap(), s);
        }
    }

    #[test]
    fn prefix_is_optional_and_case_insensitive() {
        assert_eq!(decode_payload("6869").unwrap(), "hi");
        assert_eq!(decode_payload("0X4869").unwrap(), "Hi");
        assert_eq!(decode_payload("0x4A").unwrap(), "J");
    }

    #[test]
    fn malformed_input_is_a_decode_error() {
        assert!(matches!(decode_payload("0x123"), Err(DecodeError::Hex(_))));
        assert!(matches!(decode_payload("0xzz"), Err(DecodeError::Hex(_))));
        assert!(matches!(decode_payload("0xff"), Err(DecodeError::Utf8(_))));
    }
}
