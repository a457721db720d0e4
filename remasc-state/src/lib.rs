// Allow manual assign operations - U256 doesn't implement AddAssign/SubAssign
#![allow(clippy::assign_op_pattern)]
// Allow functions with many parameters - the payout steps need the whole cycle context
#![allow(clippy::too_many_arguments)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

//! Miner-fee redistribution engine.
//!
//! Once per block, as the last transaction, REMASC adds the fees of the block
//! that just matured to a reward pool and, once the pool has been filled for a
//! full synthetic span, pays out an amortized share of it to the treasury, the
//! federation, the matured block's miner and the miners and publishers of its
//! siblings. Remainders and penalties are burned. Every node must reach the
//! same result byte for byte.
//!
//! # Key Components
//!
//! - [`Repository`]: balances, contract storage and logs of the executing block
//! - [`BlockStore`], [`SelectionRule`], [`FederationProvider`]: chain collaborators
//! - [`Ledger`]: the contract's persisted pools, loaded lazily, written if touched
//! - [`Remasc`]: the per-block orchestrator
//! - [`RemascContract`]: call-data dispatch and caller checks
//!
//! # Example
//!
//! ```
//! use remasc_core::{BlockHeader, RemascConfig};
//! use remasc_state::{
//!     Invocation, MemoryBlockStore, MemoryRepository, PaidFeesSelectionRule, ProcessOutcome, RemascContract,
//!     RemascOutput, StaticFederation,
//! };
//!
//! let config = RemascConfig::regtest();
//! let store = MemoryBlockStore::new();
//! let federation = StaticFederation::new(vec![[0xF1; 20]]);
//! // Deployed at REMASC_ADDRESS; `at_address` deploys elsewhere.
//! let contract = RemascContract::new(&config, &store, &PaidFeesSelectionRule, &federation);
//!
//! let mut repo = MemoryRepository::new();
//! let header = BlockHeader { number: 1, ..BlockHeader::default() };
//! let output = contract.execute(&mut repo, &header, Invocation::RemascTransaction, &[])?;
//! assert_eq!(output, RemascOutput::Processed(ProcessOutcome::NotMature));
//! # Ok::<(), remasc_state::RemascError>(())
//! ```

mod chain;
mod contract;
mod error;
mod execute;
mod federation;
mod ledger;
mod math;
mod state;

pub use chain::{BlockStore, MemoryBlockStore, PaidFeesSelectionRule, SelectionRule};
pub use contract::{
    Invocation, RemascContract, RemascMethod, RemascOutput, GET_STATE_FOR_DEBUGGING, PROCESS_MINERS_FEES,
    REMASC_ADDRESS,
};
pub use error::{RemascError, RemascResult};
pub use execute::{
    collect_siblings, decode_payment, late_inclusion_penalty, DistributionSummary, FeesPayer, GenerationWalk,
    ProcessOutcome, Remasc, RewardSplit, MINING_FEE_TOPIC,
};
pub use federation::{FederationPayer, FederationPayout, FederationProvider, StaticFederation};
pub use ledger::{
    storage_word, Ledger, RemascState, BROKEN_SELECTION_RULE_KEY, BURNED_BALANCE_KEY, EMPTY_SIBLINGS_SENTINEL,
    FEDERATION_BALANCE_KEY, REWARD_BALANCE_KEY, SIBLINGS_KEY,
};
pub use state::{MemoryRepository, Repository};
