//! Key schema encoding for storage.
//!
//! Every key starts with a one-byte [`KeyPrefix`]; world state sits below
//! `0x10` and the block index from `0x20` up, so one backend can hold both.

use remasc_core::{Address, Hash};

use crate::error::StorageError;

/// Key prefixes for different record types.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyPrefix {
    /// Account balance: `0x01 || address`
    Balance = 0x01,
    /// Contract storage word: `0x02 || contract || key`
    ContractStorage = 0x02,
    /// Block header by hash: `0x20 || block_hash`
    BlockByHash = 0x20,
    /// Sibling records created by a block: `0x21 || block_hash`
    SiblingsByHash = 0x21,
    /// Block hash by height: `0x22 || height`
    BlockHashByHeight = 0x22,
    /// Latest block height: `0x23`
    LatestBlockHeight = 0x23,
}

/// Address of one world-state entry.
///
/// Ordered so that commits write keys in a stable order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StateKey {
    /// Balance of an account.
    Balance(Address),
    /// Storage word `key` of `contract`.
    Storage(Address, [u8; 32]),
}

impl StateKey {
    /// Encode the key for the backend.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            StateKey::Balance(address) => {
                let mut key = Vec::with_capacity(21);
                key.push(KeyPrefix::Balance as u8);
                key.extend_from_slice(address);
                key
            }
            StateKey::Storage(contract, word) => {
                let mut key = Vec::with_capacity(53);
                key.push(KeyPrefix::ContractStorage as u8);
                key.extend_from_slice(contract);
                key.extend_from_slice(word);
                key
            }
        }
    }

    /// Decode a key produced by [`StateKey::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StorageError> {
        let corrupt = |reason: &str| StorageError::Corrupt {
            key: hex_key(bytes),
            reason: reason.to_string(),
        };
        let (prefix, rest) = bytes.split_first().ok_or_else(|| corrupt("empty key"))?;
        match *prefix {
            p if p == KeyPrefix::Balance as u8 => {
                let address: Address = rest.try_into().map_err(|_| corrupt("bad address width"))?;
                Ok(StateKey::Balance(address))
            }
            p if p == KeyPrefix::ContractStorage as u8 => {
                if rest.len() != 52 {
                    return Err(corrupt("bad storage key width"));
                }
                let mut contract = [0u8; 20];
                let mut word = [0u8; 32];
                contract.copy_from_slice(&rest[..20]);
                word.copy_from_slice(&rest[20..]);
                Ok(StateKey::Storage(contract, word))
            }
            _ => Err(corrupt("not a state key")),
        }
    }
}

/// Key for a block header by hash.
pub fn block_by_hash_key(hash: &Hash) -> Vec<u8> {
    prefixed(KeyPrefix::BlockByHash, hash)
}

/// Key for the sibling records a block created.
pub fn siblings_by_hash_key(hash: &Hash) -> Vec<u8> {
    prefixed(KeyPrefix::SiblingsByHash, hash)
}

/// Key for a block hash by height.
pub fn block_hash_by_height_key(height: u64) -> Vec<u8> {
    prefixed(KeyPrefix::BlockHashByHeight, &height.to_be_bytes())
}

/// Key for the latest block height.
pub fn latest_block_height_key() -> Vec<u8> {
    vec![KeyPrefix::LatestBlockHeight as u8]
}

fn prefixed(prefix: KeyPrefix, body: &[u8]) -> Vec<u8> {
    let mut key = Vec::with_capacity(1 + body.len());
    key.push(prefix as u8);
    key.extend_from_slice(body);
    key
}

pub(crate) fn hex_key(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
