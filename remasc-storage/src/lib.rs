//! # REMASC Storage
//!
//! Key-value backed implementations of the fee engine's collaborators.
//!
//! This crate provides:
//! - Disk-backed storage via RocksDB, and an in-memory backend for tests
//! - `ContractState`: a transactional `Repository` with commit and rollback
//! - `KvBlockStore`: a `BlockStore` that indexes uncles into sibling records
//!
//! ## Architecture
//!
//! The storage layer implements the `Repository` and `BlockStore` traits from
//! `remasc-state`, so the engine runs unchanged over the in-memory or the
//! persistent implementations. Both share one backend; their keys live under
//! distinct one-byte prefixes.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod block;
pub mod error;
pub mod keys;
pub mod kv;
pub mod state;

pub use block::KvBlockStore;
pub use error::StorageError;
pub use keys::{KeyPrefix, StateKey};
pub use kv::{BatchOp, KvBackend, MemoryBackend, RocksBackend, WriteBatch};
pub use state::{CommitSummary, ContractState, WriteBuffer};
