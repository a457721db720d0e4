//! Account addresses and hashes.

/// A 20-byte account address.
pub type Address = [u8; 20];

/// A 32-byte block hash.
pub type Hash = [u8; 32];

/// Left-pad an address to a 32-byte word, as used for log topics.
pub fn address_to_word(address: &Address) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[12..].copy_from_slice(address);
    word
}

/// Parse a hex address, with or without a `0x` prefix.
pub fn parse_address(text: &str) -> Result<Address, String> {
    let bytes = hex::decode(text.trim_start_matches("0x")).map_err(|e| format!("invalid hex: {}", e))?;
    bytes
        .as_slice()
        .try_into()
        .map_err(|_| format!("expected 20 bytes, got {}", bytes.len()))
}

/// Serde adapter writing addresses as lowercase hex strings.
pub mod hex_address {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::{parse_address, Address};

    /// Serialize an address as hex.
    pub fn serialize<S: Serializer>(address: &Address, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(address))
    }

    /// Deserialize an address from hex.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Address, D::Error> {
        let text = String::deserialize(deserializer)?;
        parse_address(&text).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_to_word() {
        let word = address_to_word(&[0xAB; 20]);
        assert!(word[..12].iter().all(|b| *b == 0));
        assert!(word[12..].iter().all(|b| *b == 0xAB));
    }

    #[test]
    fn test_parse_address() {
        let addr = parse_address("0x14d3065c8eb89895f4df12450ec6b130049f8034").unwrap();
        assert_eq!(addr[0], 0x14);
        assert_eq!(addr[19], 0x34);
        assert!(parse_address("0x1234").is_err());
        assert!(parse_address("zz").is_err());
    }
}
