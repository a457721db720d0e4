//! Block header structure.

use serde::{Deserialize, Serialize};

use crate::crypto::sha256;
use crate::serialization::serialize;
use crate::types::{Address, Hash};
use crate::u256::U256;

/// Block header carrying everything REMASC reads from a block.
///
/// The block hash is computed from the serialized header; uncles are
/// committed through `uncles_hash`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    /// Block number (0 for genesis).
    pub number: u64,

    /// Hash of the parent header. All zeros for genesis.
    pub parent_hash: Hash,

    /// Address credited as the block's miner.
    pub coinbase: Address,

    /// Unix timestamp in seconds.
    pub timestamp: u64,

    /// Total fees paid by the block's transactions.
    pub paid_fees: U256,

    /// Minimum gas price accepted by the block.
    pub minimum_gas_price: U256,

    /// Number of uncles referenced by the block.
    pub uncle_count: u32,

    /// Commitment to the uncle headers.
    pub uncles_hash: Hash,

    /// Proof-of-work nonce.
    pub nonce: u64,
}

impl BlockHeader {
    /// Compute the block hash.
    pub fn hash(&self) -> Hash {
        // A struct of fixed-width fields always encodes.
        let bytes = serialize(self).unwrap_or_default();
        sha256(&bytes)
    }

    /// Check if this is a genesis header.
    #[inline]
    pub fn is_genesis(&self) -> bool {
        self.number == 0 && self.parent_hash == [0u8; 32]
    }
}
