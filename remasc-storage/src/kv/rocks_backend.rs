//! RocksDB key-value backend.

use std::path::Path;
use std::sync::Arc;

use rocksdb::{Direction, IteratorMode, Options, DB};
use tracing::debug;

use super::{BatchOp, KvBackend, PrefixIterator, WriteBatch};
use crate::error::StorageError;

/// RocksDB-backed storage.
///
/// World state and the block index share one database; their keys are
/// separated by the one-byte prefixes in [`crate::keys`].
#[derive(Clone)]
pub struct RocksBackend {
    db: Arc<DB>,
}

impl RocksBackend {
    /// Open or create a database at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.set_compression_type(rocksdb::DBCompressionType::Lz4);

        // State commits are small and frequent; keep memtables modest.
        opts.set_write_buffer_size(16 * 1024 * 1024);
        opts.set_max_write_buffer_number(2);
        opts.set_level_compaction_dynamic_level_bytes(true);

        debug!(path = %path.as_ref().display(), "opening RocksDB");
        let db = DB::open(&opts, path)?;
        Ok(Self { db: Arc::new(db) })
    }

    /// Estimated number of keys, as reported by RocksDB.
    pub fn estimate_num_keys(&self) -> Option<u64> {
        self.db
            .property_int_value("rocksdb.estimate-num-keys")
            .ok()
            .flatten()
    }
}

impl KvBackend for RocksBackend {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.db.get(key)?)
    }

    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), StorageError> {
        self.db.put(key, value)?;
        Ok(())
    }

    fn delete(&self, key: &[u8]) -> Result<(), StorageError> {
        self.db.delete(key)?;
        Ok(())
    }

    fn write_batch(&self, batch: WriteBatch) -> Result<(), StorageError> {
        let mut rocks_batch = rocksdb::WriteBatch::default();
        for op in batch.operations {
            match op {
                BatchOp::Put { key, value } => rocks_batch.put(key, value),
                BatchOp::Delete { key } => rocks_batch.delete(key),
            }
        }
        self.db.write(rocks_batch)?;
        Ok(())
    }

    fn prefix_iterator(&self, prefix: &[u8]) -> Result<PrefixIterator<'_>, StorageError> {
        let mut items = Vec::new();
        for entry in self.db.iterator(IteratorMode::From(prefix, Direction::Forward)) {
            let (key, value) = entry?;
            if !key.starts_with(prefix) {
                break;
            }
            items.push((key.to_vec(), value.to_vec()));
        }
        Ok(Box::new(items.into_iter()))
    }

    fn flush(&self) -> Result<(), StorageError> {
        self.db.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::tests::{check_basic, check_batch, check_prefix_iter};
    use tempfile::TempDir;

    #[test]
    fn test_rocks_backend_basic() {
        let dir = TempDir::new().unwrap();
        check_basic(&RocksBackend::open(dir.path()).unwrap());
    }

    #[test]
    fn test_rocks_backend_batch() {
        let dir = TempDir::new().unwrap();
        check_batch(&RocksBackend::open(dir.path()).unwrap());
    }

    #[test]
    fn test_rocks_backend_prefix_iter() {
        let dir = TempDir::new().unwrap();
        check_prefix_iter(&RocksBackend::open(dir.path()).unwrap());
    }

    #[test]
    fn test_rocks_backend_reopen() {
        let dir = TempDir::new().unwrap();
        {
            let backend = RocksBackend::open(dir.path()).unwrap();
            backend.put(b"reward", b"81000").unwrap();
            backend.flush().unwrap();
        }
        let backend = RocksBackend::open(dir.path()).unwrap();
        assert_eq!(backend.get(b"reward").unwrap(), Some(b"81000".to_vec()));
    }
}
