//! Walking back from the executing block to the block that matures.
//!
//! The maturing ("processing") block is `maturity` blocks behind the
//! executing block. Its siblings can only have been published as uncles by
//! the `uncleGenerationLimit` blocks right after it, so those are the only
//! blocks whose sibling records need reading.

use remasc_core::{BlockHeader, RemascConfig, Sibling, SiblingsByHeight};

use crate::chain::BlockStore;
use crate::error::RemascResult;

/// The processing block and the sibling records of the generations after it.
#[derive(Clone, Debug)]
pub struct GenerationWalk {
    /// Block whose fees mature this cycle.
    pub processing: BlockHeader,
    /// Sibling records of each descendant generation, oldest first.
    pub snapshots: Vec<SiblingsByHeight>,
}

impl GenerationWalk {
    /// Walk back from the block executing at `execution`.
    ///
    /// Starts `maturity - 1 - G` blocks behind the parent of `execution`,
    /// records the sibling set of that block and of each of its next G-1
    /// ancestors, and stops on the block G parent links back, which is the
    /// processing block. The caller checks that `execution.number > maturity`.
    pub fn from_execution_block(
        store: &dyn BlockStore,
        execution: &BlockHeader,
        config: &RemascConfig,
    ) -> RemascResult<Self> {
        let generations = config.uncle_generation_limit;
        let start_depth = config
            .maturity
            .saturating_sub(1)
            .saturating_sub(generations);

        let mut current = store.ancestor_at_depth(&execution.parent_hash, start_depth)?;
        let mut snapshots = Vec::with_capacity(generations as usize);
        for _ in 0..generations {
            snapshots.push(store.siblings_at_hash(&current.hash())?);
            current = store.require_block(&current.parent_hash)?;
        }
        snapshots.reverse();

        Ok(Self {
            processing: current,
            snapshots,
        })
    }

    /// Every sibling of the processing block, oldest generation first.
    pub fn siblings(&self) -> Vec<Sibling> {
        collect_siblings(&self.snapshots, self.processing.number)
    }
}

/// Union of the entries for `height` across `snapshots`, in snapshot order.
pub fn collect_siblings(snapshots: &[SiblingsByHeight], height: u64) -> Vec<Sibling> {
    snapshots
        .iter()
        .filter_map(|snapshot| snapshot.get(&height))
        .flatten()
        .cloned()
        .collect()
}
