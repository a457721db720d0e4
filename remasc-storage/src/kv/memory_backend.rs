//! In-memory key-value backend.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use super::{BatchOp, KvBackend, PrefixIterator, WriteBatch};
use crate::error::StorageError;

/// BTreeMap-backed storage.
///
/// Counts every key written or deleted so tests can check how much a
/// commit touched.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    data: RwLock<BTreeMap<Vec<u8>, Vec<u8>>>,
    writes: AtomicU64,
}

impl MemoryBackend {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> Result<usize, StorageError> {
        Ok(self.read()?.len())
    }

    /// Whether nothing is stored.
    pub fn is_empty(&self) -> Result<bool, StorageError> {
        Ok(self.read()?.is_empty())
    }

    /// Total keys written or deleted since creation.
    pub fn writes(&self) -> u64 {
        self.writes.load(Ordering::Relaxed)
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, BTreeMap<Vec<u8>, Vec<u8>>>, StorageError> {
        self.data
            .read()
            .map_err(|e| StorageError::Poisoned(e.to_string()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, BTreeMap<Vec<u8>, Vec<u8>>>, StorageError> {
        self.data
            .write()
            .map_err(|e| StorageError::Poisoned(e.to_string()))
    }
}

impl KvBackend for MemoryBackend {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.read()?.get(key).cloned())
    }

    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), StorageError> {
        self.write()?.insert(key.to_vec(), value.to_vec());
        self.writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn delete(&self, key: &[u8]) -> Result<(), StorageError> {
        self.write()?.remove(key);
        self.writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn write_batch(&self, batch: WriteBatch) -> Result<(), StorageError> {
        let count = batch.len() as u64;
        // One guard for the whole batch keeps it atomic to readers.
        let mut data = self.write()?;
        for op in batch.operations {
            match op {
                BatchOp::Put { key, value } => {
                    data.insert(key, value);
                }
                BatchOp::Delete { key } => {
                    data.remove(&key);
                }
            }
        }
        self.writes.fetch_add(count, Ordering::Relaxed);
        Ok(())
    }

    fn prefix_iterator(&self, prefix: &[u8]) -> Result<PrefixIterator<'_>, StorageError> {
        let items: Vec<(Vec<u8>, Vec<u8>)> = self
            .read()?
            .range(prefix.to_vec()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Ok(Box::new(items.into_iter()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::tests::{check_basic, check_batch, check_prefix_iter};

    #[test]
    fn test_memory_backend_basic() {
        check_basic(&MemoryBackend::new());
    }

    #[test]
    fn test_memory_backend_batch() {
        check_batch(&MemoryBackend::new());
    }

    #[test]
    fn test_memory_backend_prefix_iter() {
        check_prefix_iter(&MemoryBackend::new());
    }

    #[test]
    fn test_write_counter() {
        let backend = MemoryBackend::new();
        backend.put(b"a", b"1").unwrap();
        let mut batch = WriteBatch::new();
        batch.put(b"b".to_vec(), b"2".to_vec());
        batch.delete(b"a".to_vec());
        backend.write_batch(batch).unwrap();

        assert_eq!(backend.writes(), 3);
        assert_eq!(backend.len().unwrap(), 1);
    }
}
