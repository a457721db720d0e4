//! 256-bit unsigned integer arithmetic for coin amounts.
//!
//! Every amount REMASC touches (fees, pools, shares, burns) is a `U256`.
//! Division always floors; the remainder is taken explicitly with
//! [`U256::div_mod`] so that no unit of value is ever silently dropped.

// Allow clippy warnings from the uint crate's construct_uint macro
#![allow(clippy::manual_div_ceil)]
#![allow(clippy::assign_op_pattern)]

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uint::construct_uint;

construct_uint! {
    /// 256-bit unsigned integer.
    ///
    /// Used for:
    /// - Paid fees and the minimum gas price of block headers
    /// - The reward, burned and federation pools
    /// - Every payment made by the fee engine
    pub struct U256(4);
}

/// Width of a storage word in bytes.
pub const WORD_BYTES: usize = 32;

impl U256 {
    /// Create a U256 from a u64 value.
    #[inline]
    pub const fn from_u64(value: u64) -> Self {
        U256([value, 0, 0, 0])
    }

    /// Create a U256 from a u128 value.
    #[inline]
    pub fn from_u128(value: u128) -> Self {
        U256([value as u64, (value >> 64) as u64, 0, 0])
    }

    /// Convert to u64, returning None if the value doesn't fit.
    #[inline]
    pub fn to_u64(&self) -> Option<u64> {
        if self.0[1] == 0 && self.0[2] == 0 && self.0[3] == 0 {
            Some(self.0[0])
        } else {
            None
        }
    }

    /// Serialize to big-endian bytes.
    pub fn to_be_bytes(&self) -> [u8; WORD_BYTES] {
        let mut bytes = [0u8; WORD_BYTES];
        for (i, limb) in self.0.iter().rev().enumerate() {
            bytes[i * 8..(i + 1) * 8].copy_from_slice(&limb.to_be_bytes());
        }
        bytes
    }

    /// Deserialize from big-endian bytes.
    pub fn from_be_bytes(bytes: &[u8; WORD_BYTES]) -> Self {
        let mut limbs = [0u64; 4];
        for (i, chunk) in bytes.chunks_exact(8).enumerate() {
            let mut limb = [0u8; 8];
            limb.copy_from_slice(chunk);
            limbs[3 - i] = u64::from_be_bytes(limb);
        }
        U256(limbs)
    }

    /// Decode a big-endian storage word, rejecting anything that is not
    /// exactly [`WORD_BYTES`] long.
    pub fn from_be_slice(bytes: &[u8]) -> Option<Self> {
        let word: &[u8; WORD_BYTES] = bytes.try_into().ok()?;
        Some(Self::from_be_bytes(word))
    }

    /// Serialize to little-endian bytes.
    pub fn to_le_bytes(&self) -> [u8; WORD_BYTES] {
        let mut bytes = [0u8; WORD_BYTES];
        for (i, limb) in self.0.iter().enumerate() {
            bytes[i * 8..(i + 1) * 8].copy_from_slice(&limb.to_le_bytes());
        }
        bytes
    }

    /// Deserialize from little-endian bytes.
    pub fn from_le_bytes(bytes: &[u8; WORD_BYTES]) -> Self {
        let mut limbs = [0u64; 4];
        for (i, chunk) in bytes.chunks_exact(8).enumerate() {
            let mut limb = [0u8; 8];
            limb.copy_from_slice(chunk);
            limbs[i] = u64::from_le_bytes(limb);
        }
        U256(limbs)
    }
}

// Custom serde implementation for deterministic serialization
impl Serialize for U256 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            // Decimal string keeps JSON summaries readable and lossless.
            serializer.serialize_str(&self.to_string())
        } else {
            serializer.serialize_bytes(&self.to_le_bytes())
        }
    }
}

impl<'de> Deserialize<'de> for U256 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct U256Visitor;

        impl<'de> serde::de::Visitor<'de> for U256Visitor {
            type Value = U256;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("32 bytes or a decimal string")
            }

            fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<U256, E> {
                U256::from_dec_str(v).map_err(|_| E::invalid_value(serde::de::Unexpected::Str(v), &self))
            }

            fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<U256, E> {
                Ok(U256::from_u64(v))
            }

            fn visit_bytes<E: serde::de::Error>(self, v: &[u8]) -> Result<U256, E> {
                let bytes: &[u8; WORD_BYTES] = v
                    .try_into()
                    .map_err(|_| E::invalid_length(v.len(), &self))?;
                Ok(U256::from_le_bytes(bytes))
            }

            fn visit_seq<A: serde::de::SeqAccess<'de>>(self, mut seq: A) -> Result<U256, A::Error> {
                let mut bytes = [0u8; WORD_BYTES];
                for (i, byte) in bytes.iter_mut().enumerate() {
                    *byte = seq
                        .next_element()?
                        .ok_or_else(|| serde::de::Error::invalid_length(i, &self))?;
                }
                Ok(U256::from_le_bytes(&bytes))
            }
        }

        if deserializer.is_human_readable() {
            deserializer.deserialize_any(U256Visitor)
        } else {
            deserializer.deserialize_bytes(U256Visitor)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_arithmetic() {
        let a = U256::from(100u64);
        let b = U256::from(50u64);
        assert_eq!(a + b, U256::from(150u64));
        assert_eq!(a - b, U256::from(50u64));
        assert_eq!(a * b, U256::from(5000u64));
        assert_eq!(a / b, U256::from(2u64));
    }

    #[test]
    fn test_div_mod_floors() {
        let (quotient, remainder) = U256::from(100_001u64).div_mod(U256::from(3u64));
        assert_eq!(quotient, U256::from(33_333u64));
        assert_eq!(remainder, U256::from(2u64));
        assert_eq!(quotient * U256::from(3u64) + remainder, U256::from(100_001u64));
    }

    #[test]
    fn test_checked_sub_underflow() {
        assert_eq!(U256::from(1u64).checked_sub(U256::from(2u64)), None);
        assert_eq!(U256::MAX.checked_add(U256::one()), None);
    }

    #[test]
    fn test_big_endian_layout() {
        let value = U256::from(0x0102u64);
        let bytes = value.to_be_bytes();
        assert_eq!(bytes[30], 0x01);
        assert_eq!(bytes[31], 0x02);
        assert!(bytes[..30].iter().all(|b| *b == 0));
        assert_eq!(U256::from_be_bytes(&bytes), value);
    }

    #[test]
    fn test_byte_order_of_high_limbs() {
        let value = U256::from(1u64) << 200;
        assert_eq!(U256::from_be_bytes(&value.to_be_bytes()), value);
        assert_eq!(U256::from_le_bytes(&value.to_le_bytes()), value);
        assert_eq!(value.to_be_bytes()[6], 0x01);
    }

    #[test]
    fn test_from_be_slice_rejects_wrong_width() {
        assert_eq!(U256::from_be_slice(&[0u8; 31]), None);
        assert_eq!(U256::from_be_slice(&[]), None);
        assert_eq!(U256::from_be_slice(&[0u8; 32]), Some(U256::zero()));
    }

    #[test]
    fn test_to_u64() {
        assert_eq!(U256::from_u64(12345).to_u64(), Some(12345));
        assert_eq!((U256::from(1u64) << 128).to_u64(), None);
        assert_eq!(U256::from_u128(u128::MAX) >> 64, U256::from(u64::MAX));
    }

    #[test]
    fn test_json_is_decimal_string() {
        let value = U256::from(18_225u64);
        let json = serde_json::to_string(&value).unwrap();
        assert_eq!(json, "\"18225\"");
        let recovered: U256 = serde_json::from_str(&json).unwrap();
        assert_eq!(recovered, value);
        let from_number: U256 = serde_json::from_str("42").unwrap();
        assert_eq!(from_number, U256::from(42u64));
    }

    #[test]
    fn test_binary_roundtrip() {
        let value = U256::MAX - U256::from(7u64);
        let bytes = crate::serialization::serialize(&value).unwrap();
        let recovered: U256 = crate::serialization::deserialize(&bytes).unwrap();
        assert_eq!(recovered, value);
    }
}
