//! Persistent world state.
//!
//! [`ContractState`] implements the `Repository` trait from `remasc-state`
//! over a [`KvBackend`]. Reads go through per-entry caches; writes stay in
//! the caches until [`ContractState::commit`] flushes every dirty entry as
//! one atomic [`WriteBatch`], or [`ContractState::rollback`] drops them.
//!
//! Payment logs are receipt data, not state. They are handed back by
//! `commit` and never written to the backend.

mod buffer;

use std::collections::HashMap;
use std::sync::Arc;

use remasc_core::{Address, LogEntry, U256};
use remasc_state::{RemascError, RemascResult, Repository};
use tracing::{debug, trace};

use crate::error::StorageError;
use crate::keys::{hex_key, KeyPrefix, StateKey};
use crate::kv::{KvBackend, WriteBatch};

pub use buffer::WriteBuffer;

/// What one commit wrote.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommitSummary {
    /// Keys written or deleted.
    pub keys_written: usize,
    /// Logs appended since the previous commit or rollback.
    pub logs: Vec<LogEntry>,
}

/// Transactional world state over a key-value backend.
///
/// ## Usage
///
/// ```ignore
/// let backend = Arc::new(RocksBackend::open("state.db")?);
/// let mut state = ContractState::new(backend);
///
/// state.credit(&REMASC_ADDRESS, fees)?;
/// contract.execute(&mut state, &header, Invocation::RemascTransaction, &[])?;
///
/// let summary = state.commit()?;
/// ```
pub struct ContractState<B: KvBackend> {
    backend: Arc<B>,
    balances: HashMap<Address, U256>,
    storage: HashMap<(Address, [u8; 32]), Option<Vec<u8>>>,
    dirty: WriteBuffer,
    logs: Vec<LogEntry>,
}

impl<B: KvBackend> ContractState<B> {
    /// Create a state view over `backend`.
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            balances: HashMap::new(),
            storage: HashMap::new(),
            dirty: WriteBuffer::new(),
            logs: Vec::new(),
        }
    }

    /// Get the backend.
    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    /// Number of entries changed since the last commit or rollback.
    pub fn pending_changes(&self) -> usize {
        self.dirty.len()
    }

    /// Logs appended since the last commit or rollback.
    pub fn pending_logs(&self) -> &[LogEntry] {
        &self.logs
    }

    /// Write every dirty entry in one batch.
    ///
    /// Zero balances and empty storage values are deleted rather than
    /// stored; readers treat a missing key the same way.
    pub fn commit(&mut self) -> Result<CommitSummary, StorageError> {
        let mut batch = WriteBatch::new();
        for key in self.dirty.take() {
            let bytes = key.to_bytes();
            match key {
                StateKey::Balance(address) => {
                    let balance = self.balances.get(&address).copied().unwrap_or_default();
                    if balance.is_zero() {
                        batch.delete(bytes);
                    } else {
                        batch.put(bytes, balance.to_be_bytes().to_vec());
                    }
                }
                StateKey::Storage(contract, word) => match self.storage.get(&(contract, word)) {
                    Some(Some(value)) if !value.is_empty() => batch.put(bytes, value.clone()),
                    _ => batch.delete(bytes),
                },
            }
        }

        let keys_written = batch.len();
        if !batch.is_empty() {
            self.backend.write_batch(batch)?;
        }
        let logs = std::mem::take(&mut self.logs);
        debug!(keys_written, logs = logs.len(), "committed state");
        Ok(CommitSummary { keys_written, logs })
    }

    /// Drop every uncommitted change. Returns how many entries were dirty.
    pub fn rollback(&mut self) -> usize {
        let discarded = self.dirty.take().len();
        // Cached values may be uncommitted; reload everything on next read.
        self.balances.clear();
        self.storage.clear();
        self.logs.clear();
        debug!(discarded, "rolled back state");
        discarded
    }

    /// Every committed non-zero balance, ordered by address.
    ///
    /// Uncommitted changes are not included.
    pub fn committed_balances(&self) -> Result<Vec<(Address, U256)>, StorageError> {
        let mut balances = Vec::new();
        for (key, value) in self.backend.prefix_iterator(&[KeyPrefix::Balance as u8])? {
            let StateKey::Balance(address) = StateKey::from_bytes(&key)? else {
                continue;
            };
            balances.push((address, decode_balance(&key, &value)?));
        }
        Ok(balances)
    }

    fn load_balance(&mut self, address: &Address) -> Result<U256, StorageError> {
        if let Some(balance) = self.balances.get(address) {
            return Ok(*balance);
        }
        let key = StateKey::Balance(*address).to_bytes();
        let balance = match self.backend.get(&key)? {
            Some(bytes) => decode_balance(&key, &bytes)?,
            None => U256::zero(),
        };
        self.balances.insert(*address, balance);
        Ok(balance)
    }

    fn store_balance(&mut self, address: &Address, balance: U256) {
        self.balances.insert(*address, balance);
        self.dirty.mark_dirty(StateKey::Balance(*address));
    }
}

fn decode_balance(key: &[u8], bytes: &[u8]) -> Result<U256, StorageError> {
    U256::from_be_slice(bytes).ok_or_else(|| StorageError::Corrupt {
        key: hex_key(key),
        reason: format!("balance is {} bytes", bytes.len()),
    })
}

impl<B: KvBackend> Repository for ContractState<B> {
    fn balance(&mut self, address: &Address) -> RemascResult<U256> {
        Ok(self.load_balance(address)?)
    }

    fn credit(&mut self, address: &Address, amount: U256) -> RemascResult<()> {
        let balance = self.load_balance(address)?;
        let updated = balance.checked_add(amount).ok_or(RemascError::ArithmeticOverflow)?;
        self.store_balance(address, updated);
        Ok(())
    }

    fn debit(&mut self, address: &Address, amount: U256) -> RemascResult<()> {
        let available = self.load_balance(address)?;
        let updated = available
            .checked_sub(amount)
            .ok_or(RemascError::InsufficientBalance {
                address: *address,
                available,
                requested: amount,
            })?;
        self.store_balance(address, updated);
        Ok(())
    }

    fn storage_bytes(&mut self, contract: &Address, key: &[u8; 32]) -> RemascResult<Option<Vec<u8>>> {
        if let Some(value) = self.storage.get(&(*contract, *key)) {
            return Ok(value.clone());
        }
        let value = self.backend.get(&StateKey::Storage(*contract, *key).to_bytes())?;
        trace!(found = value.is_some(), "loaded storage word");
        self.storage.insert((*contract, *key), value.clone());
        Ok(value)
    }

    fn put_storage_bytes(&mut self, contract: &Address, key: &[u8; 32], value: Vec<u8>) -> RemascResult<()> {
        self.storage.insert((*contract, *key), Some(value));
        self.dirty.mark_dirty(StateKey::Storage(*contract, *key));
        Ok(())
    }

    fn append_log(&mut self, entry: LogEntry) -> RemascResult<()> {
        self.logs.push(entry);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryBackend;

    const ALICE: Address = [0xA1; 20];
    const BOB: Address = [0xB0; 20];
    const CONTRACT: Address = [0x08; 20];

    fn state() -> ContractState<MemoryBackend> {
        ContractState::new(Arc::new(MemoryBackend::new()))
    }

    #[test]
    fn test_unknown_account_is_zero() {
        let mut state = state();
        assert_eq!(state.balance(&ALICE).unwrap(), U256::zero());
        assert_eq!(state.pending_changes(), 0);
    }

    #[test]
    fn test_commit_persists_balances() {
        let mut state = state();
        state.credit(&ALICE, U256::from(100u64)).unwrap();
        state.transfer(&ALICE, &BOB, U256::from(30u64)).unwrap();
        assert_eq!(state.pending_changes(), 2);

        let summary = state.commit().unwrap();
        assert_eq!(summary.keys_written, 2);

        let mut reopened = ContractState::new(Arc::clone(state.backend()));
        assert_eq!(reopened.balance(&ALICE).unwrap(), U256::from(70u64));
        assert_eq!(reopened.balance(&BOB).unwrap(), U256::from(30u64));
    }

    #[test]
    fn test_rollback_discards_changes() {
        let mut state = state();
        state.credit(&ALICE, U256::from(5u64)).unwrap();
        state.commit().unwrap();

        state.credit(&ALICE, U256::from(50u64)).unwrap();
        state.put_storage_bytes(&CONTRACT, &[1u8; 32], vec![9]).unwrap();
        state
            .append_log(LogEntry {
                address: CONTRACT,
                topics: vec![],
                data: vec![],
            })
            .unwrap();
        assert_eq!(state.rollback(), 2);

        assert_eq!(state.balance(&ALICE).unwrap(), U256::from(5u64));
        assert_eq!(state.storage_bytes(&CONTRACT, &[1u8; 32]).unwrap(), None);
        assert!(state.pending_logs().is_empty());
    }

    #[test]
    fn test_insufficient_balance() {
        let mut state = state();
        state.credit(&ALICE, U256::from(1u64)).unwrap();
        let err = state.debit(&ALICE, U256::from(2u64)).unwrap_err();
        assert_eq!(
            err,
            RemascError::InsufficientBalance {
                address: ALICE,
                available: U256::from(1u64),
                requested: U256::from(2u64),
            }
        );
    }

    #[test]
    fn test_zero_balance_is_deleted() {
        let backend = Arc::new(MemoryBackend::new());
        let mut state = ContractState::new(Arc::clone(&backend));
        state.credit(&ALICE, U256::from(3u64)).unwrap();
        state.commit().unwrap();
        assert_eq!(backend.len().unwrap(), 1);

        state.debit(&ALICE, U256::from(3u64)).unwrap();
        state.commit().unwrap();
        assert!(backend.is_empty().unwrap());
    }

    #[test]
    fn test_storage_roundtrip_and_logs_returned_once() {
        let mut state = state();
        state.put_storage_bytes(&CONTRACT, &[2u8; 32], vec![0xC0]).unwrap();
        state
            .append_log(LogEntry {
                address: CONTRACT,
                topics: vec![[7u8; 32]],
                data: vec![1, 2],
            })
            .unwrap();

        let summary = state.commit().unwrap();
        assert_eq!(summary.logs.len(), 1);
        assert_eq!(state.commit().unwrap(), CommitSummary::default());

        let mut reopened = ContractState::new(Arc::clone(state.backend()));
        assert_eq!(reopened.storage_bytes(&CONTRACT, &[2u8; 32]).unwrap(), Some(vec![0xC0]));
    }

    #[test]
    fn test_corrupt_balance_is_reported() {
        let backend = Arc::new(MemoryBackend::new());
        backend.put(&StateKey::Balance(ALICE).to_bytes(), &[1, 2, 3]).unwrap();
        let mut state = ContractState::new(backend);
        let err = state.balance(&ALICE).unwrap_err();
        assert!(matches!(err, RemascError::Storage(msg) if msg.contains("balance is 3 bytes")));
    }

    #[test]
    fn test_committed_balances_skip_pending() {
        let mut state = state();
        state.credit(&BOB, U256::from(2u64)).unwrap();
        state.credit(&ALICE, U256::from(1u64)).unwrap();
        state.commit().unwrap();
        state.credit(&CONTRACT, U256::from(9u64)).unwrap();

        let balances = state.committed_balances().unwrap();
        assert_eq!(balances, vec![(ALICE, U256::from(1u64)), (BOB, U256::from(2u64))]);
    }
}
