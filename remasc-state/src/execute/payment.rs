//! Value transfers out of the contract.
//!
//! Every payment debits the contract, credits the recipient and appends one
//! log entry so that payouts can be followed from receipts alone.

use remasc_core::{address_to_word, serialization, Address, Hash, LogEntry, U256};
use tracing::trace;

use crate::error::RemascResult;
use crate::ledger::storage_word;
use crate::math;
use crate::state::Repository;

/// First topic of every payment log.
pub const MINING_FEE_TOPIC: [u8; 32] = storage_word(b"mining_fee_topic");

/// Pays fees out of the contract's balance and keeps a running total.
#[derive(Clone, Debug)]
pub struct FeesPayer {
    contract: Address,
    total_paid: U256,
    payments: usize,
}

impl FeesPayer {
    /// Payer drawing from the contract at `contract`.
    pub fn new(contract: Address) -> Self {
        Self {
            contract,
            total_paid: U256::zero(),
            payments: 0,
        }
    }

    /// Move `amount` to `to`, logging `(block_hash, amount)`.
    ///
    /// Zero amounts are transferred and logged like any other.
    pub fn pay<R: Repository + ?Sized>(
        &mut self,
        repo: &mut R,
        block_hash: &Hash,
        amount: U256,
        to: &Address,
    ) -> RemascResult<()> {
        repo.transfer(&self.contract, to, amount)?;

        let data = serialization::serialize(&(*block_hash, amount))?;
        repo.append_log(LogEntry {
            address: self.contract,
            topics: vec![MINING_FEE_TOPIC, address_to_word(to)],
            data,
        })?;

        self.total_paid = math::add(self.total_paid, amount)?;
        self.payments += 1;
        trace!(to = %hex::encode(to), %amount, "paid mining fee");
        Ok(())
    }

    /// Sum of every payment made so far.
    pub fn total_paid(&self) -> U256 {
        self.total_paid
    }

    /// Number of payments made so far.
    pub fn payments(&self) -> usize {
        self.payments
    }
}

/// Decode the `(block_hash, amount)` data of a payment log.
pub fn decode_payment(entry: &LogEntry) -> RemascResult<(Hash, U256)> {
    Ok(serialization::deserialize(&entry.data)?)
}
