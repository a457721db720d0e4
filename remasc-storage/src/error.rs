//! Storage error types.

use remasc_state::RemascError;
use thiserror::Error;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// RocksDB error.
    #[error("RocksDB error: {0}")]
    RocksDb(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A stored value has the wrong shape.
    #[error("Corrupt value under {key}: {reason}")]
    Corrupt {
        /// Hex of the offending key.
        key: String,
        /// What was wrong with it.
        reason: String,
    },

    /// Block storage error.
    #[error("Block storage error: {0}")]
    Block(String),

    /// A lock guarding an in-memory backend was poisoned.
    #[error("Lock poisoned: {0}")]
    Poisoned(String),
}

impl From<rocksdb::Error> for StorageError {
    fn from(e: rocksdb::Error) -> Self {
        StorageError::RocksDb(e.to_string())
    }
}

impl From<remasc_core::SerializationError> for StorageError {
    fn from(e: remasc_core::SerializationError) -> Self {
        StorageError::Serialization(e.to_string())
    }
}

impl From<StorageError> for RemascError {
    fn from(e: StorageError) -> Self {
        RemascError::Storage(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_converts_into_engine_error() {
        let err: RemascError = StorageError::Block("height gap".into()).into();
        assert_eq!(err, RemascError::Storage("Block storage error: height gap".into()));
    }
}
