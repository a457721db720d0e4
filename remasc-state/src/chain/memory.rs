//! In-memory block store.

use std::collections::HashMap;

use remasc_core::{Block, BlockHeader, Hash, Sibling, SiblingsByHeight};

use super::store::BlockStore;
use crate::error::RemascResult;

/// Block store backed by HashMaps.
#[derive(Clone, Debug, Default)]
pub struct MemoryBlockStore {
    headers: HashMap<Hash, BlockHeader>,
    siblings: HashMap<Hash, SiblingsByHeight>,
}

impl MemoryBlockStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Connect a block, recording a sibling for each uncle it references.
    pub fn connect(&mut self, block: &Block) -> Hash {
        let hash = block.hash();
        let siblings = Sibling::index_uncles(block);
        if !siblings.is_empty() {
            self.siblings.insert(hash, siblings);
        }
        self.headers.insert(hash, block.header.clone());
        hash
    }

    /// Number of connected blocks.
    pub fn len(&self) -> usize {
        self.headers.len()
    }

    /// Whether no block has been connected.
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }
}

impl BlockStore for MemoryBlockStore {
    fn block_by_hash(&self, hash: &Hash) -> RemascResult<Option<BlockHeader>> {
        Ok(self.headers.get(hash).cloned())
    }

    fn siblings_at_hash(&self, hash: &Hash) -> RemascResult<SiblingsByHeight> {
        Ok(self.siblings.get(hash).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RemascError;
    use remasc_core::U256;

    fn chain(length: u64) -> (MemoryBlockStore, Vec<Hash>) {
        let mut store = MemoryBlockStore::new();
        let mut hashes = Vec::new();
        let mut parent_hash = [0u8; 32];
        for number in 0..length {
            let header = BlockHeader {
                number,
                parent_hash,
                paid_fees: U256::from(number),
                ..BlockHeader::default()
            };
            parent_hash = store.connect(&Block::new(header, vec![]));
            hashes.push(parent_hash);
        }
        (store, hashes)
    }

    #[test]
    fn test_ancestor_at_depth() {
        let (store, hashes) = chain(10);
        assert_eq!(store.ancestor_at_depth(&hashes[9], 0).unwrap().number, 9);
        assert_eq!(store.ancestor_at_depth(&hashes[9], 4).unwrap().number, 5);
        assert_eq!(store.ancestor_at_depth(&hashes[9], 9).unwrap().number, 0);
    }

    #[test]
    fn test_walk_past_genesis_fails() {
        let (store, hashes) = chain(3);
        let err = store.ancestor_at_depth(&hashes[2], 3).unwrap_err();
        assert_eq!(err, RemascError::BlockNotFound { hash: [0u8; 32] });
    }

    #[test]
    fn test_connect_indexes_uncles() {
        let (mut store, hashes) = chain(3);
        let uncle = BlockHeader {
            number: 1,
            parent_hash: hashes[0],
            nonce: 77,
            ..BlockHeader::default()
        };
        let block = Block::new(
            BlockHeader {
                number: 3,
                parent_hash: hashes[2],
                coinbase: [5u8; 20],
                ..BlockHeader::default()
            },
            vec![uncle.clone()],
        );
        let hash = store.connect(&block);

        let siblings = store.siblings_at_hash(&hash).unwrap();
        assert_eq!(siblings[&1][0].hash, uncle.hash());
        assert_eq!(siblings[&1][0].included_block_coinbase, [5u8; 20]);
        assert!(store.siblings_at_hash(&hashes[1]).unwrap().is_empty());
        assert_eq!(store.len(), 4);
    }
}
