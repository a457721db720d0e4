//! Chain simulation.
//!
//! Each simulated block:
//! 1. draws a miner, fees and (sometimes) uncles from the seeded generator
//! 2. credits its fees to the REMASC contract
//! 3. runs the contract as the block's last transaction
//! 4. commits the state, or rolls the contract's effects back if it failed
//! 5. connects the block and checks that the contract's balance is fully
//!    accounted for by its ledger and the fees still maturing

use std::sync::Arc;

use anyhow::{bail, ensure};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, info, warn};

use remasc_core::{Address, Block, BlockHeader, RemascConfig, U256};
use remasc_state::{
    Invocation, Ledger, PaidFeesSelectionRule, ProcessOutcome, RemascContract, RemascOutput, Repository,
    StaticFederation, REMASC_ADDRESS,
};
use remasc_storage::{ContractState, KvBackend, KvBlockStore};

/// Size of the simulated mining pool.
const MINERS: u8 = 8;

/// Seconds between simulated blocks.
const BLOCK_INTERVAL: u64 = 30;

/// How many of the best-paid accounts the summary lists.
const TOP_RECIPIENTS: usize = 5;

/// What to simulate.
#[derive(Clone, Debug, PartialEq)]
pub struct SimParams {
    /// Blocks to mine in this run.
    pub blocks: u64,
    /// Generator seed.
    pub seed: u64,
    /// Probability that a block references uncles.
    pub uncle_rate: f64,
    /// Federation members.
    pub federators: usize,
}

impl SimParams {
    /// Reject parameters the simulator cannot run with.
    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(
            (0.0..=1.0).contains(&self.uncle_rate),
            "uncle rate {} is not a probability",
            self.uncle_rate
        );
        ensure!(self.federators > 0, "the federation needs at least one member");
        ensure!(self.federators <= 255, "at most 255 federators are supported");
        Ok(())
    }
}

/// An account and what it holds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Recipient {
    /// Hex-encoded address.
    pub address: String,
    /// Committed balance.
    pub balance: U256,
}

/// Totals reported at the end of a run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SimSummary {
    /// Height of the last block.
    pub tip: u64,
    /// Blocks mined in this run.
    pub blocks_mined: u64,
    /// Uncles referenced by those blocks.
    pub uncles_included: u64,
    /// Cycles before the first block matured.
    pub not_mature: u64,
    /// Cycles that only accumulated fees.
    pub accumulating: u64,
    /// Cycles deferred by the gas floor.
    pub below_gas_floor: u64,
    /// Cycles that released a payout.
    pub distributions: u64,
    /// Cycles whose contract call failed and was rolled back.
    pub failed_cycles: u64,
    /// Distributions that punished a selection rule violation.
    pub punished_cycles: u64,
    /// Siblings rewarded across all distributions.
    pub siblings_rewarded: u64,
    /// Payment logs emitted.
    pub payments: u64,
    /// Fees collected by the mined blocks.
    pub total_fees: U256,
    /// Value paid out of the contract.
    pub paid: U256,
    /// Value added to the burned total.
    pub burned: U256,
    /// Contract balance at the tip.
    pub contract_balance: U256,
    /// Reward pool at the tip.
    pub reward_balance: U256,
    /// Federation pool at the tip.
    pub federation_balance: U256,
    /// Burned total at the tip.
    pub burned_balance: U256,
    /// Selection rule flag at the tip.
    pub broken_selection_rule: bool,
    /// State keys written by all commits.
    pub keys_written: u64,
    /// Accounts holding the most, excluding the contract.
    pub top_recipients: Vec<Recipient>,
}

/// Drives the fee contract over a simulated chain stored in one backend.
pub struct Simulator<B: KvBackend> {
    config: RemascConfig,
    params: SimParams,
    state: ContractState<B>,
    store: KvBlockStore<B>,
    federation: StaticFederation,
    rng: StdRng,
    chain: Vec<BlockHeader>,
    /// Fees whose processing cycle failed; held by the contract but by no pool.
    stranded: U256,
    summary: SimSummary,
}

impl<B: KvBackend> Simulator<B> {
    /// Prepare a run over `backend`, resuming from its tip if it already
    /// holds a chain.
    pub fn new(config: RemascConfig, params: SimParams, backend: Arc<B>) -> anyhow::Result<Self> {
        config.validate()?;
        params.validate()?;

        let store = KvBlockStore::new(Arc::clone(&backend));
        let chain = match store.get_latest_height()? {
            Some(tip) => {
                let mut chain = Vec::with_capacity(tip as usize + 1);
                for height in 0..=tip {
                    match store.get_header_by_height(height)? {
                        Some(header) => chain.push(header),
                        None => bail!("stored chain is missing block {}", height),
                    }
                }
                info!(tip, "resuming stored chain");
                chain
            }
            None => {
                let genesis = Block::new(BlockHeader::default(), vec![]);
                store.connect(&genesis)?;
                vec![genesis.header]
            }
        };

        let federation = StaticFederation::new((1..=params.federators).map(|i| federator_address(i as u8)).collect());

        let mut sim = Self {
            rng: StdRng::seed_from_u64(params.seed),
            state: ContractState::new(backend),
            config,
            params,
            store,
            federation,
            chain,
            stranded: U256::zero(),
            summary: SimSummary::default(),
        };

        // Failed cycles of an earlier run left their fees outside every pool.
        let balance = sim.state.balance(&REMASC_ADDRESS)?;
        let accounted = sim.accounted()?;
        match balance.checked_sub(accounted) {
            Some(stranded) => sim.stranded = stranded,
            None => bail!("stored contract holds {} but its ledger accounts for {}", balance, accounted),
        }
        if !sim.stranded.is_zero() {
            info!(stranded = %sim.stranded, "rebuilt stranded fees from stored state");
        }
        Ok(sim)
    }

    /// Mine the configured number of blocks and report the totals.
    pub fn run(mut self) -> anyhow::Result<SimSummary> {
        for _ in 0..self.params.blocks {
            self.mine_block()?;
        }
        self.finish()
    }

    fn tip(&self) -> &BlockHeader {
        // The chain always holds at least genesis.
        &self.chain[self.chain.len() - 1]
    }

    fn mine_block(&mut self) -> anyhow::Result<()> {
        let header = self.next_header();
        let uncles = self.draw_uncles(header.number);
        self.summary.uncles_included += uncles.len() as u64;
        let block = Block::new(header, uncles);
        let number = block.number();
        let fees = block.header.paid_fees;

        self.state.credit(&REMASC_ADDRESS, fees)?;
        let contract = RemascContract::new(&self.config, &self.store, &PaidFeesSelectionRule, &self.federation);
        match contract.execute(&mut self.state, &block.header, Invocation::RemascTransaction, &[]) {
            Ok(RemascOutput::Processed(outcome)) => self.record(outcome),
            Ok(other) => bail!("fee processing returned {:?}", other),
            Err(e) => {
                warn!(block = number, error = %e, "fee processing failed, rolling back");
                self.state.rollback();
                // The block still collected its fees.
                self.state.credit(&REMASC_ADDRESS, fees)?;
                if number > self.config.maturity {
                    let lost = self.chain[(number - self.config.maturity) as usize].paid_fees;
                    self.stranded = self.stranded + lost;
                }
                self.summary.failed_cycles += 1;
            }
        }

        let commit = self.state.commit()?;
        self.summary.keys_written += commit.keys_written as u64;
        self.summary.payments += commit.logs.len() as u64;
        self.summary.total_fees = self.summary.total_fees + fees;
        self.summary.blocks_mined += 1;

        self.store.connect(&block)?;
        self.chain.push(block.header);
        self.check_invariant()
    }

    fn next_header(&mut self) -> BlockHeader {
        let parent = self.tip().clone();
        BlockHeader {
            number: parent.number + 1,
            parent_hash: parent.hash(),
            coinbase: miner_address(self.rng.gen_range(0..MINERS)),
            timestamp: parent.timestamp + BLOCK_INTERVAL,
            paid_fees: U256::from(self.rng.gen_range(10_000u64..=500_000)),
            minimum_gas_price: U256::from(self.rng.gen_range(1u64..=3)),
            nonce: self.rng.gen(),
            ..BlockHeader::default()
        }
    }

    /// Competitors of recent ancestors, referenced by block `number`.
    fn draw_uncles(&mut self, number: u64) -> Vec<BlockHeader> {
        let limit = self.config.uncle_generation_limit;
        if number < 2 || limit == 0 || !self.rng.gen_bool(self.params.uncle_rate) {
            return Vec::new();
        }
        let lowest = number.saturating_sub(limit).max(1);
        let count = self.rng.gen_range(1..=2);
        (0..count)
            .map(|_| {
                let height = self.rng.gen_range(lowest..number);
                let parent = &self.chain[height as usize - 1];
                BlockHeader {
                    number: height,
                    parent_hash: parent.hash(),
                    coinbase: miner_address(self.rng.gen_range(0..MINERS)),
                    timestamp: parent.timestamp + BLOCK_INTERVAL + 1,
                    paid_fees: U256::from(self.rng.gen_range(10_000u64..=500_000)),
                    minimum_gas_price: U256::one(),
                    uncle_count: self.rng.gen_range(0..=2),
                    nonce: self.rng.gen(),
                    ..BlockHeader::default()
                }
            })
            .collect()
    }

    fn record(&mut self, outcome: ProcessOutcome) {
        match outcome {
            ProcessOutcome::NotMature => self.summary.not_mature += 1,
            ProcessOutcome::Accumulating { .. } => self.summary.accumulating += 1,
            ProcessOutcome::BelowGasFloor {
                processing_block,
                synthetic,
                floor,
            } => {
                debug!(processing_block, %synthetic, %floor, "payout below gas floor");
                self.summary.below_gas_floor += 1;
            }
            ProcessOutcome::Distributed(distribution) => {
                self.summary.distributions += 1;
                self.summary.siblings_rewarded += distribution.siblings as u64;
                if distribution.punished {
                    self.summary.punished_cycles += 1;
                }
                self.summary.paid = self.summary.paid + distribution.paid;
                self.summary.burned = self.summary.burned + distribution.burned;
            }
        }
    }

    /// Fees of blocks that have not reached a processing cycle yet.
    fn maturing_fees(&self) -> U256 {
        let tip = self.tip().number;
        let first = tip.saturating_sub(self.config.maturity) + 1;
        self.chain[first as usize..]
            .iter()
            .fold(U256::zero(), |acc, header| acc + header.paid_fees)
    }

    /// Contract value held by the ledger pools and the maturing fees.
    fn accounted(&mut self) -> anyhow::Result<U256> {
        let mut ledger = Ledger::new(REMASC_ADDRESS);
        let pools = ledger.reward_balance(&mut self.state)?
            + ledger.federation_balance(&mut self.state)?
            + ledger.burned_balance(&mut self.state)?;
        Ok(pools + self.maturing_fees())
    }

    fn check_invariant(&mut self) -> anyhow::Result<()> {
        let expected = self.accounted()? + self.stranded;
        let balance = self.state.balance(&REMASC_ADDRESS)?;
        ensure!(
            balance == expected,
            "contract holds {} but its ledger accounts for {} at block {}",
            balance,
            expected,
            self.tip().number
        );
        Ok(())
    }

    fn finish(mut self) -> anyhow::Result<SimSummary> {
        let mut ledger = Ledger::new(REMASC_ADDRESS);
        let state = ledger.debug_state(&mut self.state)?;
        self.summary.tip = self.tip().number;
        self.summary.reward_balance = state.reward_balance;
        self.summary.burned_balance = state.burned_balance;
        self.summary.broken_selection_rule = state.broken_selection_rule;
        self.summary.federation_balance = ledger.federation_balance(&mut self.state)?;
        self.summary.contract_balance = self.state.balance(&REMASC_ADDRESS)?;

        let mut balances: Vec<(Address, U256)> = self
            .state
            .committed_balances()?
            .into_iter()
            .filter(|(address, _)| *address != REMASC_ADDRESS)
            .collect();
        balances.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        self.summary.top_recipients = balances
            .into_iter()
            .take(TOP_RECIPIENTS)
            .map(|(address, balance)| Recipient {
                address: hex::encode(address),
                balance,
            })
            .collect();

        info!(
            tip = self.summary.tip,
            distributions = self.summary.distributions,
            paid = %self.summary.paid,
            burned = %self.summary.burned,
            "simulation finished"
        );
        Ok(self.summary)
    }
}

/// Address of simulated miner `index`.
pub fn miner_address(index: u8) -> Address {
    let mut address = [0u8; 20];
    address[0] = 0x4D;
    address[19] = index;
    address
}

/// Address of federation member `index`.
pub fn federator_address(index: u8) -> Address {
    let mut address = [0u8; 20];
    address[0] = 0xFE;
    address[19] = index;
    address
}
