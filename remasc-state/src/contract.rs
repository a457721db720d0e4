//! Contract entry point.
//!
//! Decodes call-data into one of the two methods, checks who is calling,
//! runs the engine and saves the ledger. Fee processing may only be run by
//! the block's synthetic REMASC transaction; the debug view is open to
//! anyone and never writes.

use remasc_core::{crypto::method_selector, Address, BlockHeader, RemascConfig};
use tracing::{debug, warn};

use crate::chain::{BlockStore, SelectionRule};
use crate::error::{RemascError, RemascResult};
use crate::execute::{ProcessOutcome, Remasc};
use crate::federation::FederationProvider;
use crate::ledger::{Ledger, RemascState};
use crate::state::Repository;

/// Address the contract is deployed at.
pub const REMASC_ADDRESS: Address = [
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00,
    0x00, 0x08,
];

/// Signature of the fee processing method.
pub const PROCESS_MINERS_FEES: &str = "processMinersFees()";

/// Signature of the debug view.
pub const GET_STATE_FOR_DEBUGGING: &str = "getStateForDebugging()";

/// Methods the contract exposes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RemascMethod {
    /// Run the per-block fee cycle.
    ProcessMinersFees,
    /// Return the encoded ledger snapshot.
    GetStateForDebugging,
}

impl RemascMethod {
    /// Canonical signature.
    pub fn signature(&self) -> &'static str {
        match self {
            RemascMethod::ProcessMinersFees => PROCESS_MINERS_FEES,
            RemascMethod::GetStateForDebugging => GET_STATE_FOR_DEBUGGING,
        }
    }

    /// Four-byte selector.
    pub fn selector(&self) -> [u8; 4] {
        method_selector(self.signature())
    }

    /// Decode call-data. Empty call-data selects fee processing.
    pub fn decode(call_data: &[u8]) -> RemascResult<Self> {
        if call_data.is_empty() {
            return Ok(RemascMethod::ProcessMinersFees);
        }
        if call_data.len() != 4 {
            return Err(RemascError::invalid_invocation(format!(
                "call-data must be empty or a 4-byte selector, got {} bytes",
                call_data.len()
            )));
        }
        [RemascMethod::ProcessMinersFees, RemascMethod::GetStateForDebugging]
            .into_iter()
            .find(|method| method.selector()[..] == *call_data)
            .ok_or_else(|| RemascError::invalid_invocation(format!("unknown selector {}", hex::encode(call_data))))
    }
}

/// How the contract was reached.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Invocation {
    /// The unsigned, zero-cost transaction closing every block.
    RemascTransaction,
    /// Any other top-level transaction.
    Transaction,
    /// A call from another contract.
    ContractCall,
}

/// Result of a successful call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RemascOutput {
    /// Fee processing ran.
    Processed(ProcessOutcome),
    /// Ledger snapshot.
    State(RemascState),
}

impl RemascOutput {
    /// Bytes returned to the caller: empty for fee processing, the encoded
    /// snapshot for the debug view.
    pub fn into_bytes(self) -> RemascResult<Vec<u8>> {
        match self {
            RemascOutput::Processed(_) => Ok(Vec::new()),
            RemascOutput::State(state) => Ok(state.to_bytes()?),
        }
    }
}

/// The REMASC contract wired to its chain collaborators.
pub struct RemascContract<'a> {
    engine: Remasc<'a>,
    address: Address,
}

impl<'a> RemascContract<'a> {
    /// Contract deployed at [`REMASC_ADDRESS`].
    pub fn new(
        config: &'a RemascConfig,
        store: &'a dyn BlockStore,
        selection_rule: &'a dyn SelectionRule,
        federation: &'a dyn FederationProvider,
    ) -> Self {
        Self::at_address(config, REMASC_ADDRESS, store, selection_rule, federation)
    }

    /// Contract deployed at `address`.
    pub fn at_address(
        config: &'a RemascConfig,
        address: Address,
        store: &'a dyn BlockStore,
        selection_rule: &'a dyn SelectionRule,
        federation: &'a dyn FederationProvider,
    ) -> Self {
        Self {
            engine: Remasc::new(config, address, store, selection_rule, federation),
            address,
        }
    }

    /// Address the contract is deployed at.
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Handle a call made while executing `execution`.
    ///
    /// Rejects bad call-data and callers before touching anything. If fee
    /// processing fails the ledger is not saved; the caller must still
    /// discard the repository's pending payments.
    pub fn execute<R: Repository + ?Sized>(
        &self,
        repo: &mut R,
        execution: &BlockHeader,
        invocation: Invocation,
        call_data: &[u8],
    ) -> RemascResult<RemascOutput> {
        let method = RemascMethod::decode(call_data)?;
        match method {
            RemascMethod::ProcessMinersFees => {
                if invocation != Invocation::RemascTransaction {
                    warn!(?invocation, block = execution.number, "rejected fee processing call");
                    return Err(RemascError::invalid_invocation(
                        "fee processing must run as the block's remasc transaction",
                    ));
                }
                let mut ledger = Ledger::new(self.address);
                let outcome = self.engine.process_miners_fees(repo, &mut ledger, execution)?;
                let written = ledger.save(repo)?;
                debug!(written, "saved remasc ledger");
                Ok(RemascOutput::Processed(outcome))
            }
            RemascMethod::GetStateForDebugging => {
                let mut ledger = Ledger::new(self.address);
                Ok(RemascOutput::State(ledger.debug_state(repo)?))
            }
        }
    }
}
