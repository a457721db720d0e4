//! Log entries appended to the block receipt.

use serde::{Deserialize, Serialize};

use super::Address;

/// A single log entry emitted by a contract.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Emitting contract.
    pub address: Address,
    /// Indexed topics.
    pub topics: Vec<[u8; 32]>,
    /// Opaque payload.
    pub data: Vec<u8>,
}
