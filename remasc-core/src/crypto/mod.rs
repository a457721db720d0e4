//! Hashing primitives.

mod hashing;

pub use hashing::{keccak256, method_selector, sha256};
