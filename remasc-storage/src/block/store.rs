//! Append-only block storage.
//!
//! Connecting a block stores its header by hash, indexes it by height, and
//! records the `Sibling` entries for the uncles it references under the
//! block's own hash.

use std::sync::Arc;

use remasc_core::{
    serialization::{deserialize, serialize},
    Block, BlockHeader, Hash, Sibling, SiblingsByHeight,
};
use remasc_state::{BlockStore, RemascResult};
use tracing::debug;

use crate::error::StorageError;
use crate::keys::{block_by_hash_key, block_hash_by_height_key, latest_block_height_key, siblings_by_hash_key};
use crate::kv::{KvBackend, WriteBatch};

/// Canonical chain stored in a key-value backend.
pub struct KvBlockStore<B: KvBackend> {
    backend: Arc<B>,
}

impl<B: KvBackend> KvBlockStore<B> {
    /// Create a block store over `backend`.
    pub fn new(backend: Arc<B>) -> Self {
        Self { backend }
    }

    /// Get the backend.
    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    /// Get a header by hash.
    pub fn get_header(&self, hash: &Hash) -> Result<Option<BlockHeader>, StorageError> {
        match self.backend.get(&block_by_hash_key(hash))? {
            Some(bytes) => Ok(Some(deserialize(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Get the sibling records created by the block with `hash`.
    pub fn get_siblings(&self, hash: &Hash) -> Result<SiblingsByHeight, StorageError> {
        match self.backend.get(&siblings_by_hash_key(hash))? {
            Some(bytes) => Ok(deserialize(&bytes)?),
            None => Ok(SiblingsByHeight::new()),
        }
    }

    /// Get a block hash by height.
    pub fn get_hash_by_height(&self, height: u64) -> Result<Option<Hash>, StorageError> {
        match self.backend.get(&block_hash_by_height_key(height))? {
            Some(bytes) => {
                let hash: Hash = bytes
                    .as_slice()
                    .try_into()
                    .map_err(|_| StorageError::Block("Invalid block hash length".into()))?;
                Ok(Some(hash))
            }
            None => Ok(None),
        }
    }

    /// Get a header by height.
    pub fn get_header_by_height(&self, height: u64) -> Result<Option<BlockHeader>, StorageError> {
        match self.get_hash_by_height(height)? {
            Some(hash) => self.get_header(&hash),
            None => Ok(None),
        }
    }

    /// Get the latest block height.
    pub fn get_latest_height(&self) -> Result<Option<u64>, StorageError> {
        match self.backend.get(&latest_block_height_key())? {
            Some(bytes) => {
                let raw: [u8; 8] = bytes
                    .as_slice()
                    .try_into()
                    .map_err(|_| StorageError::Block("Invalid height encoding".into()))?;
                Ok(Some(u64::from_be_bytes(raw)))
            }
            None => Ok(None),
        }
    }

    /// Get the latest header.
    pub fn get_latest_header(&self) -> Result<Option<BlockHeader>, StorageError> {
        match self.get_latest_height()? {
            Some(height) => self.get_header_by_height(height),
            None => Ok(None),
        }
    }

    /// Connect the next block of the chain.
    ///
    /// The block must extend the current tip (or be block 0 on an empty
    /// store) and its header must commit to its uncle list.
    pub fn connect(&self, block: &Block) -> Result<Hash, StorageError> {
        let height = block.number();
        let hash = block.hash();

        let expected_height = match self.get_latest_height()? {
            Some(latest) => latest + 1,
            None => 0,
        };
        if height != expected_height {
            return Err(StorageError::Block(format!(
                "Block height {} does not follow latest height {}",
                height,
                expected_height.saturating_sub(1)
            )));
        }
        if height > 0 {
            let parent = self
                .get_hash_by_height(height - 1)?
                .ok_or_else(|| StorageError::Block("Previous block not found".into()))?;
            if block.header.parent_hash != parent {
                return Err(StorageError::Block("Previous block hash mismatch".into()));
            }
        }
        if !block.verify_uncles() {
            return Err(StorageError::Block("Uncle commitment mismatch".into()));
        }

        let mut batch = WriteBatch::new();
        batch.put(block_by_hash_key(&hash), serialize(&block.header)?);
        let siblings = Sibling::index_uncles(block);
        if !siblings.is_empty() {
            batch.put(siblings_by_hash_key(&hash), serialize(&siblings)?);
        }
        batch.put(block_hash_by_height_key(height), hash.to_vec());
        batch.put(latest_block_height_key(), height.to_be_bytes().to_vec());
        self.backend.write_batch(batch)?;

        debug!(height, uncles = block.uncles.len(), "connected block");
        Ok(hash)
    }
}

impl<B: KvBackend> BlockStore for KvBlockStore<B> {
    fn block_by_hash(&self, hash: &Hash) -> RemascResult<Option<BlockHeader>> {
        Ok(self.get_header(hash)?)
    }

    fn siblings_at_hash(&self, hash: &Hash) -> RemascResult<SiblingsByHeight> {
        Ok(self.get_siblings(hash)?)
    }
}
