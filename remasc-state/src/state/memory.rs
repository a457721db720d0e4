//! In-memory world state.

use std::collections::HashMap;

use remasc_core::{Address, LogEntry, U256};

use super::store::{checked_debit, Repository};
use crate::error::{RemascError, RemascResult};

/// In-memory repository backed by HashMaps.
///
/// This is the testing and development implementation. It applies every
/// change immediately; callers that need rollback clone it first or use the
/// key-value backed repository from `remasc-storage`.
#[derive(Clone, Debug, Default)]
pub struct MemoryRepository {
    /// Account balances.
    pub balances: HashMap<Address, U256>,

    /// Contract storage per (contract, key).
    pub storage: HashMap<(Address, [u8; 32]), Vec<u8>>,

    /// Receipt logs in emission order.
    pub logs: Vec<LogEntry>,

    /// Number of storage reads served.
    pub storage_reads: u64,

    /// Number of storage writes applied.
    pub storage_writes: u64,
}

impl MemoryRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Balance of an account without going through the trait.
    pub fn balance_of(&self, address: &Address) -> U256 {
        self.balances.get(address).copied().unwrap_or_default()
    }

    /// Raw storage of a contract slot without counting a read.
    pub fn peek_storage(&self, contract: &Address, key: &[u8; 32]) -> Option<&[u8]> {
        self.storage.get(&(*contract, *key)).map(Vec::as_slice)
    }

    /// Drop collected logs, returning them.
    pub fn take_logs(&mut self) -> Vec<LogEntry> {
        std::mem::take(&mut self.logs)
    }

    /// Reset the read and write counters.
    pub fn reset_counters(&mut self) {
        self.storage_reads = 0;
        self.storage_writes = 0;
    }
}

impl Repository for MemoryRepository {
    fn balance(&mut self, address: &Address) -> RemascResult<U256> {
        Ok(self.balance_of(address))
    }

    fn credit(&mut self, address: &Address, amount: U256) -> RemascResult<()> {
        let balance = self.balances.entry(*address).or_default();
        *balance = balance.checked_add(amount).ok_or(RemascError::ArithmeticOverflow)?;
        Ok(())
    }

    fn debit(&mut self, address: &Address, amount: U256) -> RemascResult<()> {
        let remaining = checked_debit(address, self.balance_of(address), amount)?;
        self.balances.insert(*address, remaining);
        Ok(())
    }

    fn storage_bytes(&mut self, contract: &Address, key: &[u8; 32]) -> RemascResult<Option<Vec<u8>>> {
        self.storage_reads += 1;
        Ok(self.storage.get(&(*contract, *key)).cloned())
    }

    fn put_storage_bytes(&mut self, contract: &Address, key: &[u8; 32], value: Vec<u8>) -> RemascResult<()> {
        self.storage_writes += 1;
        self.storage.insert((*contract, *key), value);
        Ok(())
    }

    fn append_log(&mut self, entry: LogEntry) -> RemascResult<()> {
        self.logs.push(entry);
        Ok(())
    }
}
