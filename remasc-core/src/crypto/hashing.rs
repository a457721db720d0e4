//! Hash functions.
//!
//! Block hashes are SHA-256 of the encoded header. Method selectors follow the
//! usual contract ABI convention: the first four bytes of Keccak-256 over the
//! canonical method signature.

use sha2::{Digest, Sha256};
use sha3::Keccak256;

/// Compute SHA-256 hash of the input data.
#[inline]
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Compute Keccak-256 hash of the input data.
#[inline]
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Four-byte method selector for a signature such as `"processMinersFees()"`.
pub fn method_selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_determinism() {
        assert_eq!(sha256(b"hello world"), sha256(b"hello world"));
        assert_ne!(sha256(b"hello world"), sha256(b"hello world!"));
    }

    #[test]
    fn test_keccak_known_value() {
        // keccak256("") = c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470
        let hash = keccak256(b"");
        assert_eq!(hash[..4], [0xc5, 0xd2, 0x46, 0x01]);
        assert_eq!(hash[31], 0x70);
    }

    #[test]
    fn test_selector_known_value() {
        // transfer(address,uint256) -> a9059cbb
        assert_eq!(method_selector("transfer(address,uint256)"), [0xa9, 0x05, 0x9c, 0xbb]);
    }

    #[test]
    fn test_selectors_differ() {
        assert_ne!(
            method_selector("processMinersFees()"),
            method_selector("getStateForDebugging()")
        );
    }
}
