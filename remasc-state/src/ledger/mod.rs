//! The contract's persisted ledger.
//!
//! Four values survive between blocks: the reward pool, the burned total,
//! the federation carry-over pool and the broken selection rule flag. A
//! `Ledger` is created for one cycle. Each value is read from storage the
//! first time it is needed and written back by [`Ledger::save`] only if a
//! setter touched it, so slots nobody modified stay byte-for-byte unchanged.

mod keys;

pub use keys::{
    storage_word, BROKEN_SELECTION_RULE_KEY, BURNED_BALANCE_KEY, EMPTY_SIBLINGS_SENTINEL, FEDERATION_BALANCE_KEY,
    REWARD_BALANCE_KEY, SIBLINGS_KEY,
};

use remasc_core::{serialization, Address, SerializationError, U256};
use serde::{Deserialize, Serialize};

use crate::error::{RemascError, RemascResult};
use crate::math;
use crate::state::Repository;

/// A lazily loaded, dirty-tracked storage slot.
#[derive(Clone, Debug, Default)]
struct Slot<T> {
    value: Option<T>,
    dirty: bool,
}

impl<T: Copy> Slot<T> {
    fn get_or_load<F>(&mut self, load: F) -> RemascResult<T>
    where
        F: FnOnce() -> RemascResult<T>,
    {
        match self.value {
            Some(value) => Ok(value),
            None => {
                let value = load()?;
                self.value = Some(value);
                Ok(value)
            }
        }
    }

    fn set(&mut self, value: T) {
        self.value = Some(value);
        self.dirty = true;
    }

    /// The value to write back, clearing the dirty mark.
    fn take_dirty(&mut self) -> Option<T> {
        if !self.dirty {
            return None;
        }
        self.dirty = false;
        self.value
    }
}

/// Snapshot returned by the debug method.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RemascState {
    /// Fees accumulated and not yet paid out.
    pub reward_balance: U256,
    /// Total value burned.
    pub burned_balance: U256,
    /// Whether the last processed block broke the selection rule.
    pub broken_selection_rule: bool,
}

/// Wire layout of [`RemascState`]: reward, burned, empty sibling list, flag byte.
#[derive(Serialize, Deserialize)]
struct EncodedState(U256, U256, Vec<u8>, u8);

impl RemascState {
    /// Encode as `(rewardBalance, burnedBalance, siblingsSentinel, flagByte)`.
    pub fn to_bytes(&self) -> Result<Vec<u8>, SerializationError> {
        serialization::serialize(&EncodedState(
            self.reward_balance,
            self.burned_balance,
            EMPTY_SIBLINGS_SENTINEL.to_vec(),
            u8::from(self.broken_selection_rule),
        ))
    }

    /// Decode bytes produced by [`RemascState::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SerializationError> {
        let EncodedState(reward_balance, burned_balance, _siblings, flag) = serialization::deserialize(bytes)?;
        Ok(Self {
            reward_balance,
            burned_balance,
            broken_selection_rule: flag != 0,
        })
    }
}

/// Per-cycle read-through, write-back cache over the contract's storage.
#[derive(Clone, Debug)]
pub struct Ledger {
    contract: Address,
    reward_balance: Slot<U256>,
    burned_balance: Slot<U256>,
    federation_balance: Slot<U256>,
    broken_selection_rule: Slot<bool>,
    clear_siblings: bool,
}

impl Ledger {
    /// Ledger of the contract deployed at `contract`. Nothing is read yet.
    pub fn new(contract: Address) -> Self {
        Self {
            contract,
            reward_balance: Slot::default(),
            burned_balance: Slot::default(),
            federation_balance: Slot::default(),
            broken_selection_rule: Slot::default(),
            clear_siblings: false,
        }
    }

    /// Address the ledger belongs to.
    pub fn contract(&self) -> &Address {
        &self.contract
    }

    // === Reward pool ===

    /// Fees accumulated and not yet paid out.
    pub fn reward_balance<R: Repository + ?Sized>(&mut self, repo: &mut R) -> RemascResult<U256> {
        let contract = self.contract;
        self.reward_balance
            .get_or_load(|| load_amount(repo, &contract, &REWARD_BALANCE_KEY, "rewardBalance"))
    }

    /// Replace the reward pool.
    pub fn set_reward_balance(&mut self, value: U256) {
        self.reward_balance.set(value);
    }

    // === Burned total ===

    /// Total value burned.
    pub fn burned_balance<R: Repository + ?Sized>(&mut self, repo: &mut R) -> RemascResult<U256> {
        let contract = self.contract;
        self.burned_balance
            .get_or_load(|| load_amount(repo, &contract, &BURNED_BALANCE_KEY, "burnedBalance"))
    }

    /// Replace the burned total.
    pub fn set_burned_balance(&mut self, value: U256) {
        self.burned_balance.set(value);
    }

    /// Add `amount` to the burned total.
    pub fn add_to_burned_balance<R: Repository + ?Sized>(&mut self, repo: &mut R, amount: U256) -> RemascResult<()> {
        let burned = self.burned_balance(repo)?;
        self.set_burned_balance(math::add(burned, amount)?);
        Ok(())
    }

    // === Federation pool ===

    /// Federation earmarks not yet paid out.
    pub fn federation_balance<R: Repository + ?Sized>(&mut self, repo: &mut R) -> RemascResult<U256> {
        let contract = self.contract;
        self.federation_balance
            .get_or_load(|| load_amount(repo, &contract, &FEDERATION_BALANCE_KEY, "federationBalance"))
    }

    /// Replace the federation pool.
    pub fn set_federation_balance(&mut self, value: U256) {
        self.federation_balance.set(value);
    }

    // === Selection rule flag ===

    /// Whether the last processed block broke the selection rule.
    pub fn broken_selection_rule<R: Repository + ?Sized>(&mut self, repo: &mut R) -> RemascResult<bool> {
        let contract = self.contract;
        self.broken_selection_rule
            .get_or_load(|| load_flag(repo, &contract))
    }

    /// Replace the selection rule flag.
    pub fn set_broken_selection_rule(&mut self, value: bool) {
        self.broken_selection_rule.set(value);
    }

    /// Overwrite the legacy sibling list with the empty-list marker on save.
    pub fn clear_legacy_siblings(&mut self) {
        self.clear_siblings = true;
    }

    /// Write back every touched slot. Returns the number of slots written.
    ///
    /// Calling `save` again without an intervening setter writes nothing.
    pub fn save<R: Repository + ?Sized>(&mut self, repo: &mut R) -> RemascResult<usize> {
        let mut written = 0;
        let amounts = [
            (&mut self.reward_balance, REWARD_BALANCE_KEY),
            (&mut self.burned_balance, BURNED_BALANCE_KEY),
            (&mut self.federation_balance, FEDERATION_BALANCE_KEY),
        ];
        for (slot, key) in amounts {
            if let Some(value) = slot.take_dirty() {
                repo.put_storage_bytes(&self.contract, &key, value.to_be_bytes().to_vec())?;
                written += 1;
            }
        }
        if let Some(flag) = self.broken_selection_rule.take_dirty() {
            repo.put_storage_bytes(&self.contract, &BROKEN_SELECTION_RULE_KEY, vec![u8::from(flag)])?;
            written += 1;
        }
        if std::mem::take(&mut self.clear_siblings) {
            repo.put_storage_bytes(&self.contract, &SIBLINGS_KEY, EMPTY_SIBLINGS_SENTINEL.to_vec())?;
            written += 1;
        }
        Ok(written)
    }

    /// Snapshot for the debug method. Reads but never marks anything dirty.
    pub fn debug_state<R: Repository + ?Sized>(&mut self, repo: &mut R) -> RemascResult<RemascState> {
        Ok(RemascState {
            reward_balance: self.reward_balance(repo)?,
            burned_balance: self.burned_balance(repo)?,
            broken_selection_rule: self.broken_selection_rule(repo)?,
        })
    }
}

fn load_amount<R: Repository + ?Sized>(
    repo: &mut R,
    contract: &Address,
    key: &[u8; 32],
    name: &'static str,
) -> RemascResult<U256> {
    match repo.storage_bytes(contract, key)? {
        None => Ok(U256::zero()),
        Some(bytes) if bytes.is_empty() => Ok(U256::zero()),
        Some(bytes) => U256::from_be_slice(&bytes).ok_or(RemascError::CorruptStorage {
            key: name,
            len: bytes.len(),
        }),
    }
}

fn load_flag<R: Repository + ?Sized>(repo: &mut R, contract: &Address) -> RemascResult<bool> {
    match repo.storage_bytes(contract, &BROKEN_SELECTION_RULE_KEY)?.as_deref() {
        None | Some([]) | Some([0]) => Ok(false),
        Some([1]) => Ok(true),
        Some(other) => Err(RemascError::CorruptStorage {
            key: "brokenSelectionRule",
            len: other.len(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::MemoryRepository;

    const CONTRACT: Address = [0x11; 20];

    #[test]
    fn test_missing_slots_read_as_zero() {
        let mut repo = MemoryRepository::new();
        let mut ledger = Ledger::new(CONTRACT);
        assert_eq!(ledger.reward_balance(&mut repo).unwrap(), U256::zero());
        assert_eq!(ledger.federation_balance(&mut repo).unwrap(), U256::zero());
        assert!(!ledger.broken_selection_rule(&mut repo).unwrap());
    }

    #[test]
    fn test_each_slot_loaded_once() {
        let mut repo = MemoryRepository::new();
        let mut ledger = Ledger::new(CONTRACT);
        for _ in 0..3 {
            ledger.reward_balance(&mut repo).unwrap();
            ledger.burned_balance(&mut repo).unwrap();
        }
        assert_eq!(repo.storage_reads, 2);
    }

    #[test]
    fn test_save_writes_only_touched_slots() {
        let mut repo = MemoryRepository::new();
        let mut ledger = Ledger::new(CONTRACT);
        ledger.burned_balance(&mut repo).unwrap();
        ledger.set_reward_balance(U256::from(0x0102u64));

        assert_eq!(ledger.save(&mut repo).unwrap(), 1);
        assert_eq!(repo.storage_writes, 1);
        let stored = repo.peek_storage(&CONTRACT, &REWARD_BALANCE_KEY).unwrap();
        assert_eq!(stored.len(), 32);
        assert_eq!(&stored[30..], &[0x01, 0x02]);
        assert!(repo.peek_storage(&CONTRACT, &BURNED_BALANCE_KEY).is_none());

        assert_eq!(ledger.save(&mut repo).unwrap(), 0);
        assert_eq!(repo.storage_writes, 1);
    }

    #[test]
    fn test_values_survive_a_new_ledger() {
        let mut repo = MemoryRepository::new();
        let mut ledger = Ledger::new(CONTRACT);
        ledger.set_federation_balance(U256::from(77u64));
        ledger.set_broken_selection_rule(true);
        ledger.add_to_burned_balance(&mut repo, U256::from(5u64)).unwrap();
        ledger.clear_legacy_siblings();
        assert_eq!(ledger.save(&mut repo).unwrap(), 4);
        assert_eq!(repo.peek_storage(&CONTRACT, &SIBLINGS_KEY), Some(&[0xC0][..]));
        assert_eq!(repo.peek_storage(&CONTRACT, &BROKEN_SELECTION_RULE_KEY), Some(&[1u8][..]));

        let mut reloaded = Ledger::new(CONTRACT);
        assert_eq!(reloaded.federation_balance(&mut repo).unwrap(), U256::from(77u64));
        assert_eq!(reloaded.burned_balance(&mut repo).unwrap(), U256::from(5u64));
        assert!(reloaded.broken_selection_rule(&mut repo).unwrap());
    }

    #[test]
    fn test_corrupt_slot_rejected() {
        let mut repo = MemoryRepository::new();
        repo.put_storage_bytes(&CONTRACT, &REWARD_BALANCE_KEY, vec![1, 2, 3]).unwrap();
        repo.put_storage_bytes(&CONTRACT, &BROKEN_SELECTION_RULE_KEY, vec![2]).unwrap();
        let mut ledger = Ledger::new(CONTRACT);
        assert_eq!(
            ledger.reward_balance(&mut repo),
            Err(RemascError::CorruptStorage {
                key: "rewardBalance",
                len: 3
            })
        );
        assert!(ledger.broken_selection_rule(&mut repo).is_err());
    }

    #[test]
    fn test_debug_state_does_not_dirty() {
        let mut repo = MemoryRepository::new();
        let mut writer = Ledger::new(CONTRACT);
        writer.set_reward_balance(U256::from(9u64));
        writer.save(&mut repo).unwrap();
        repo.reset_counters();

        let mut ledger = Ledger::new(CONTRACT);
        let state = ledger.debug_state(&mut repo).unwrap();
        assert_eq!(state.reward_balance, U256::from(9u64));
        assert_eq!(ledger.save(&mut repo).unwrap(), 0);
        assert_eq!(repo.storage_writes, 0);
    }

    #[test]
    fn test_debug_encoding() {
        let state = RemascState {
            reward_balance: U256::from(1u64),
            burned_balance: U256::from(2u64),
            broken_selection_rule: true,
        };
        let bytes = state.to_bytes().unwrap();
        // two amounts (8-byte length + 32 bytes each), sentinel vec (8 + 1), flag
        assert_eq!(bytes.len(), 40 + 40 + 9 + 1);
        assert_eq!(bytes[80..89], [1, 0, 0, 0, 0, 0, 0, 0, 0xC0]);
        assert_eq!(bytes[89], 1);
        assert_eq!(RemascState::from_bytes(&bytes).unwrap(), state);
    }
}
