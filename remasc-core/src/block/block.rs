//! Block structure containing a header and its uncle list.

use serde::{Deserialize, Serialize};

use crate::block::BlockHeader;
use crate::crypto::sha256;
use crate::serialization::serialize;
use crate::types::Hash;

/// A block: header plus the uncle headers it references.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Block header.
    pub header: BlockHeader,

    /// Uncle headers referenced by this block.
    pub uncles: Vec<BlockHeader>,
}

impl Block {
    /// Assemble a block, filling in the header's uncle commitment and count.
    pub fn new(mut header: BlockHeader, uncles: Vec<BlockHeader>) -> Self {
        header.uncle_count = uncles.len() as u32;
        header.uncles_hash = Self::compute_uncles_hash(&uncles);
        Self { header, uncles }
    }

    /// Hash committing to an uncle list.
    pub fn compute_uncles_hash(uncles: &[BlockHeader]) -> Hash {
        if uncles.is_empty() {
            return [0u8; 32];
        }
        let hashes: Vec<Hash> = uncles.iter().map(BlockHeader::hash).collect();
        sha256(&serialize(&hashes).unwrap_or_default())
    }

    /// Verify that the header commits to the uncle list.
    pub fn verify_uncles(&self) -> bool {
        self.header.uncle_count as usize == self.uncles.len()
            && self.header.uncles_hash == Self::compute_uncles_hash(&self.uncles)
    }

    /// Get the block hash (delegates to header).
    #[inline]
    pub fn hash(&self) -> Hash {
        self.header.hash()
    }

    /// Get the block number.
    #[inline]
    pub fn number(&self) -> u64 {
        self.header.number
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::U256;

    fn uncle(number: u64, fees: u64) -> BlockHeader {
        BlockHeader {
            number,
            paid_fees: U256::from(fees),
            coinbase: [fees as u8; 20],
            ..BlockHeader::default()
        }
    }

    #[test]
    fn test_new_commits_to_uncles() {
        let block = Block::new(BlockHeader { number: 5, ..Default::default() }, vec![uncle(4, 1), uncle(4, 2)]);
        assert_eq!(block.header.uncle_count, 2);
        assert!(block.verify_uncles());
    }

    #[test]
    fn test_tampered_uncles_detected() {
        let mut block = Block::new(BlockHeader { number: 5, ..Default::default() }, vec![uncle(4, 1)]);
        block.uncles[0].paid_fees = U256::from(99u64);
        assert!(!block.verify_uncles());
    }

    #[test]
    fn test_no_uncles_hash_is_zero() {
        let block = Block::new(BlockHeader::default(), vec![]);
        assert_eq!(block.header.uncles_hash, [0u8; 32]);
        assert_eq!(block.hash(), block.header.hash());
    }
}
