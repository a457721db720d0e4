//! Fee processing orchestrator.
//!
//! Runs once per block, as the block's last transaction:
//! 1. accumulate the fees of the block that matures this cycle
//! 2. record whether it broke the selection rule (punished next cycle)
//! 3. release one synthetic-span share of the reward pool
//! 4. pay the treasury, the federation, the miner and any siblings
//!
//! Early returns for immature chains and the gas floor are outcomes, not
//! errors. The caller saves the ledger only when this returns `Ok`.

use remasc_core::{Address, BlockHeader, Hash, RemascConfig, Sibling, U256};
use tracing::{debug, debug_span, info};

use crate::chain::{BlockStore, SelectionRule};
use crate::error::RemascResult;
use crate::federation::{FederationPayer, FederationProvider};
use crate::ledger::Ledger;
use crate::math;
use crate::state::Repository;

use super::payment::FeesPayer;
use super::siblings::GenerationWalk;
use super::split::{late_inclusion_penalty, RewardSplit};

/// How a processing cycle ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// No block has matured yet.
    NotMature,
    /// Fees were accumulated but the first payout is not due yet.
    Accumulating {
        /// Block whose fees were added.
        processing_block: u64,
    },
    /// The payout is worth less than the gas floor and was deferred.
    BelowGasFloor {
        /// Block whose fees were added.
        processing_block: u64,
        /// Payout that would have been released.
        synthetic: U256,
        /// Minimum payable amount at the executing block's gas price.
        floor: U256,
    },
    /// A payout was released.
    Distributed(DistributionSummary),
}

/// What a released payout did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DistributionSummary {
    /// Block whose payout was released.
    pub processing_block: u64,
    /// Hash of that block, carried in every payment log.
    pub processing_hash: Hash,
    /// Amount taken out of the reward pool.
    pub synthetic: U256,
    /// Siblings rewarded alongside the block's miner.
    pub siblings: usize,
    /// Whether a selection rule violation from the previous cycle was punished.
    pub punished: bool,
    /// Whether the federation pool was paid out rather than carried.
    pub federation_paid: bool,
    /// Total value transferred out of the contract.
    pub paid: U256,
    /// Value added to the burned total.
    pub burned: U256,
    /// Number of payments (and logs).
    pub payments: usize,
}

/// The fee processing engine bound to its chain collaborators.
pub struct Remasc<'a> {
    config: &'a RemascConfig,
    contract: Address,
    store: &'a dyn BlockStore,
    selection_rule: &'a dyn SelectionRule,
    federation: &'a dyn FederationProvider,
}

impl<'a> Remasc<'a> {
    /// Engine for the contract deployed at `contract`.
    pub fn new(
        config: &'a RemascConfig,
        contract: Address,
        store: &'a dyn BlockStore,
        selection_rule: &'a dyn SelectionRule,
        federation: &'a dyn FederationProvider,
    ) -> Self {
        Self {
            config,
            contract,
            store,
            selection_rule,
            federation,
        }
    }

    /// Run one cycle for the block being executed.
    ///
    /// Ledger changes stay in `ledger` until the caller saves it; payments and
    /// logs go straight to `repo`.
    pub fn process_miners_fees<R: Repository + ?Sized>(
        &self,
        repo: &mut R,
        ledger: &mut Ledger,
        execution: &BlockHeader,
    ) -> RemascResult<ProcessOutcome> {
        let _span = debug_span!("process_miners_fees", block = execution.number).entered();
        let config = self.config;

        if execution.number <= config.maturity {
            debug!(maturity = config.maturity, "no block has reached maturity yet");
            return Ok(ProcessOutcome::NotMature);
        }
        let candidate = execution.number - config.maturity;

        let walk = GenerationWalk::from_execution_block(self.store, execution, config)?;
        let processing = &walk.processing;

        let reward_balance = math::add(ledger.reward_balance(repo)?, processing.paid_fees)?;
        ledger.set_reward_balance(reward_balance);

        if candidate < config.synthetic_span {
            debug!(candidate, "reward pool still filling its first synthetic span");
            return Ok(ProcessOutcome::Accumulating {
                processing_block: candidate,
            });
        }

        let siblings = walk.siblings();

        // Punishment this cycle follows the flag left by the previous one.
        let previous_rule_broken = ledger.broken_selection_rule(repo)?;
        let rule_broken = !siblings.is_empty() && self.selection_rule.is_broken(processing, &siblings);
        ledger.set_broken_selection_rule(rule_broken);
        ledger.clear_legacy_siblings();

        let full_reward = math::div(reward_balance, config.synthetic_span)?;

        if config.gas_floor_active(execution.number) {
            let floor = math::mul(execution.minimum_gas_price, U256::from(config.minimum_payable_gas))?;
            if full_reward < floor {
                debug!(%full_reward, %floor, "payout below gas floor, deferring");
                return Ok(ProcessOutcome::BelowGasFloor {
                    processing_block: candidate,
                    synthetic: full_reward,
                    floor,
                });
            }
        }

        ledger.set_reward_balance(math::sub(reward_balance, full_reward)?);
        let burned_before = ledger.burned_balance(repo)?;
        let processing_hash = processing.hash();
        let mut payer = FeesPayer::new(self.contract);

        let treasury = math::div(full_reward, config.rsk_labs_divisor)?;
        payer.pay(
            repo,
            &processing_hash,
            treasury,
            &config.treasury_address(execution.number),
        )?;
        let mut synthetic = math::sub(full_reward, treasury)?;

        let federation = FederationPayer::new(config, self.federation).pay(
            repo,
            ledger,
            &mut payer,
            processing,
            execution,
            synthetic,
        )?;
        synthetic = math::sub(synthetic, federation.earmark)?;

        if siblings.is_empty() {
            if previous_rule_broken {
                let punishment = math::div(synthetic, config.punishment_divisor)?;
                synthetic = math::sub(synthetic, punishment)?;
                ledger.add_to_burned_balance(repo, punishment)?;
            }
            payer.pay(repo, &processing_hash, synthetic, &processing.coinbase)?;
        } else {
            self.pay_with_siblings(
                repo,
                ledger,
                &mut payer,
                processing,
                &processing_hash,
                &siblings,
                synthetic,
                previous_rule_broken,
            )?;
        }

        let burned = math::sub(ledger.burned_balance(repo)?, burned_before)?;
        let summary = DistributionSummary {
            processing_block: candidate,
            processing_hash,
            synthetic: full_reward,
            siblings: siblings.len(),
            punished: previous_rule_broken,
            federation_paid: federation.distributed,
            paid: payer.total_paid(),
            burned,
            payments: payer.payments(),
        };
        info!(
            processing_block = candidate,
            synthetic = %full_reward,
            siblings = summary.siblings,
            burned = %burned,
            "released block reward"
        );
        Ok(ProcessOutcome::Distributed(summary))
    }

    /// Pay publishers, sibling miners and the processing block's miner.
    fn pay_with_siblings<R: Repository + ?Sized>(
        &self,
        repo: &mut R,
        ledger: &mut Ledger,
        payer: &mut FeesPayer,
        processing: &BlockHeader,
        processing_hash: &Hash,
        siblings: &[Sibling],
        amount: U256,
        previous_rule_broken: bool,
    ) -> RemascResult<()> {
        let config = self.config;
        let split = RewardSplit::compute(amount, previous_rule_broken, siblings.len(), config)?;

        for sibling in siblings {
            payer.pay(repo, processing_hash, split.publisher_share, &sibling.included_block_coinbase)?;
        }
        ledger.add_to_burned_balance(repo, split.publisher_surplus)?;
        ledger.add_to_burned_balance(repo, split.miner_surplus)?;

        for sibling in siblings {
            let penalty = late_inclusion_penalty(
                split.miner_share,
                sibling.included_height,
                processing.number,
                config.late_uncle_inclusion_punishment_divisor,
            )?;
            payer.pay(
                repo,
                processing_hash,
                math::sub(split.miner_share, penalty)?,
                &sibling.coinbase,
            )?;
            ledger.add_to_burned_balance(repo, penalty)?;
        }

        if let Some(punishment) = split.punishment {
            let participants = U256::from(siblings.len() as u64 + 1);
            ledger.add_to_burned_balance(repo, math::mul(punishment, participants)?)?;
        }

        payer.pay(repo, processing_hash, split.miner_share, &processing.coinbase)
    }
}
