//! Sibling (uncle) records.
//!
//! When a block referencing uncles is connected, the block store turns each
//! uncle header into a `Sibling` that remembers who mined the uncle and who
//! published it. The records are keyed by the uncle's height so the fee
//! engine can find every competitor of a maturing block.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::block::{Block, BlockHeader};
use crate::error::SerializationError;
use crate::serialization::{deserialize, serialize};
use crate::u256::U256;

use super::{Address, Hash};

/// Sibling records grouped by the height of the uncle they describe.
pub type SiblingsByHeight = BTreeMap<u64, Vec<Sibling>>;

/// A competing block at some height, as seen by the block that included it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sibling {
    /// Hash of the uncle header.
    pub hash: Hash,
    /// Miner of the uncle.
    pub coinbase: Address,
    /// Miner of the block that referenced the uncle (the publisher).
    pub included_block_coinbase: Address,
    /// Fees collected by the uncle.
    pub paid_fees: U256,
    /// Height of the block that referenced the uncle.
    pub included_height: u64,
    /// Number of uncles the uncle itself referenced.
    pub uncle_count: u32,
}

impl Sibling {
    /// Build the record for `uncle` as referenced by a block mined by
    /// `including_coinbase` at `including_height`.
    pub fn from_uncle(uncle: &BlockHeader, including_coinbase: Address, including_height: u64) -> Self {
        Self {
            hash: uncle.hash(),
            coinbase: uncle.coinbase,
            included_block_coinbase: including_coinbase,
            paid_fees: uncle.paid_fees,
            included_height: including_height,
            uncle_count: uncle.uncle_count,
        }
    }

    /// Index every uncle of `block` by the uncle's own height.
    pub fn index_uncles(block: &Block) -> SiblingsByHeight {
        let mut siblings = SiblingsByHeight::new();
        for uncle in &block.uncles {
            siblings
                .entry(uncle.number)
                .or_default()
                .push(Sibling::from_uncle(uncle, block.header.coinbase, block.header.number));
        }
        siblings
    }

    /// Encode the record.
    pub fn to_bytes(&self) -> Result<Vec<u8>, SerializationError> {
        serialize(self)
    }

    /// Decode a record produced by [`Sibling::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SerializationError> {
        deserialize(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(number: u64, coinbase: u8, fees: u64) -> BlockHeader {
        BlockHeader {
            number,
            coinbase: [coinbase; 20],
            paid_fees: U256::from(fees),
            ..BlockHeader::default()
        }
    }

    #[test]
    fn test_from_uncle_copies_uncle_fields() {
        let mut uncle = header(9, 0xAA, 300);
        uncle.uncle_count = 2;
        let sibling = Sibling::from_uncle(&uncle, [0xBB; 20], 11);

        assert_eq!(sibling.hash, uncle.hash());
        assert_eq!(sibling.coinbase, [0xAA; 20]);
        assert_eq!(sibling.included_block_coinbase, [0xBB; 20]);
        assert_eq!(sibling.paid_fees, U256::from(300u64));
        assert_eq!(sibling.included_height, 11);
        assert_eq!(sibling.uncle_count, 2);
    }

    #[test]
    fn test_index_uncles_groups_by_uncle_height() {
        let block = Block::new(
            header(12, 0x01, 0),
            vec![header(10, 0x02, 5), header(11, 0x03, 6), header(10, 0x04, 7)],
        );
        let index = Sibling::index_uncles(&block);

        assert_eq!(index.len(), 2);
        assert_eq!(index[&10].len(), 2);
        assert_eq!(index[&11].len(), 1);
        assert!(index[&10].iter().all(|s| s.included_height == 12));
        assert!(index[&10].iter().all(|s| s.included_block_coinbase == [0x01; 20]));
        assert_eq!(index[&10][1].coinbase, [0x04; 20]);
    }

    #[test]
    fn test_codec_is_deterministic() {
        let sibling = Sibling::from_uncle(&header(3, 0x09, 42), [0x08; 20], 4);
        let bytes = sibling.to_bytes().unwrap();
        assert_eq!(bytes, sibling.to_bytes().unwrap());
        assert_eq!(Sibling::from_bytes(&bytes).unwrap(), sibling);
        assert!(Sibling::from_bytes(&bytes[1..]).is_err());
    }
}
