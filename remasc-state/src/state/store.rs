//! World-state access trait.
//!
//! REMASC runs inside the block's transactional state: every balance move,
//! storage write and log it produces lands in the same pending change set as
//! the block's ordinary transactions, and is discarded with them if the block
//! fails. Implementations decide how that change set is kept.

use remasc_core::{Address, LogEntry, U256};

use crate::error::{RemascError, RemascResult};

/// Balances, contract storage and receipt logs of the executing block.
///
/// Methods take `&mut self` to allow implementations to lazily load data
/// from persistent storage into an internal cache on first access.
pub trait Repository {
    // === Balance Operations ===

    /// Balance of an account. Unknown accounts hold zero.
    fn balance(&mut self, address: &Address) -> RemascResult<U256>;

    /// Add `amount` to an account.
    fn credit(&mut self, address: &Address, amount: U256) -> RemascResult<()>;

    /// Remove `amount` from an account, failing with
    /// [`RemascError::InsufficientBalance`] if it holds less.
    fn debit(&mut self, address: &Address, amount: U256) -> RemascResult<()>;

    /// Move `amount` between two accounts.
    fn transfer(&mut self, from: &Address, to: &Address, amount: U256) -> RemascResult<()> {
        self.debit(from, amount)?;
        self.credit(to, amount)
    }

    // === Contract Storage ===

    /// Raw bytes stored under `key` by `contract`, if any.
    fn storage_bytes(&mut self, contract: &Address, key: &[u8; 32]) -> RemascResult<Option<Vec<u8>>>;

    /// Store raw bytes under `key` for `contract`.
    fn put_storage_bytes(&mut self, contract: &Address, key: &[u8; 32], value: Vec<u8>) -> RemascResult<()>;

    // === Logs ===

    /// Append a log entry to the current transaction's receipt.
    fn append_log(&mut self, entry: LogEntry) -> RemascResult<()>;
}

/// Debit helper shared by implementations that keep plain balances.
pub(crate) fn checked_debit(address: &Address, available: U256, amount: U256) -> RemascResult<U256> {
    available
        .checked_sub(amount)
        .ok_or(RemascError::InsufficientBalance {
            address: *address,
            available,
            requested: amount,
        })
}
