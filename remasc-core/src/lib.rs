//! # REMASC Core
//!
//! Core types, hashing and serialization shared by the REMASC crates.
//!
//! This crate provides the foundation the fee engine is built on:
//! - 256-bit unsigned arithmetic for coin amounts
//! - SHA-256 block hashing and Keccak-256 method selectors
//! - Block headers, uncle lists and the `Sibling` records derived from them
//! - Payment log entries
//! - Per-network REMASC configuration
//! - Deterministic binary serialization

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod block;
pub mod config;
pub mod crypto;
pub mod error;
pub mod serialization;
pub mod types;
pub mod u256;

// Re-export commonly used types at crate root
pub use block::{Block, BlockHeader};
pub use config::{ActivationHeights, Network, RemascConfig};
pub use error::{ConfigError, CoreError, SerializationError};
pub use types::{address_to_word, parse_address, Address, Hash, LogEntry, Sibling, SiblingsByHeight};
pub use u256::U256;
