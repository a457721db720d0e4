//! Splitting a payout between a block's miner and its siblings.
//!
//! When a maturing block has siblings, part of the payout goes to the miners
//! who published them (as uncles) and the rest is shared between the block's
//! own miner and each sibling miner. Division remainders are never paid:
//! they are returned as surpluses for the caller to burn.

use remasc_core::{RemascConfig, U256};

use crate::error::{RemascError, RemascResult};
use crate::math;

/// Per-participant amounts for a payout with siblings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RewardSplit {
    /// Paid to the publisher of each sibling.
    pub publisher_share: U256,
    /// Left over after splitting the publisher pool.
    pub publisher_surplus: U256,
    /// Paid to the processing block's miner; upper bound for each sibling miner.
    pub miner_share: U256,
    /// Left over after splitting the miner pool.
    pub miner_surplus: U256,
    /// Withheld from each miner share when the selection rule was broken.
    pub punishment: Option<U256>,
}

impl RewardSplit {
    /// Split `amount` between the processing block and `siblings` siblings.
    ///
    /// ```text
    /// publisherPool = amount / publishersDivisor
    /// minerPool     = amount - publisherPool
    /// publisherShare, publisherSurplus = divmod(publisherPool, n)
    /// minerBase, minerSurplus          = divmod(minerPool, n + 1)
    /// punishment    = minerBase / punishmentDivisor   (rule broken only)
    /// minerShare    = minerBase - punishment
    /// ```
    pub fn compute(amount: U256, rule_broken: bool, siblings: usize, config: &RemascConfig) -> RemascResult<Self> {
        if siblings == 0 {
            return Err(RemascError::NoSiblings);
        }
        let n = siblings as u64;

        let publisher_pool = math::div(amount, config.publishers_divisor)?;
        let miner_pool = math::sub(amount, publisher_pool)?;
        let (publisher_share, publisher_surplus) = math::div_mod(publisher_pool, n)?;
        let participants = n.checked_add(1).ok_or(RemascError::ArithmeticOverflow)?;
        let (miner_base, miner_surplus) = math::div_mod(miner_pool, participants)?;

        let (miner_share, punishment) = if rule_broken {
            let punishment = math::div(miner_base, config.punishment_divisor)?;
            (math::sub(miner_base, punishment)?, Some(punishment))
        } else {
            (miner_base, None)
        };

        Ok(Self {
            publisher_share,
            publisher_surplus,
            miner_share,
            miner_surplus,
            punishment,
        })
    }
}

/// Penalty for a sibling published `included_height - candidate - 1` blocks
/// later than the earliest possible height.
///
/// `top * blocksLate / divisor`, floored. Zero for a sibling included right
/// after the block it competed with.
pub fn late_inclusion_penalty(top: U256, included_height: u64, candidate: u64, divisor: u64) -> RemascResult<U256> {
    let blocks_late = included_height
        .checked_sub(candidate)
        .and_then(|d| d.checked_sub(1))
        .ok_or(RemascError::ArithmeticUnderflow)?;
    math::div(math::mul(top, U256::from(blocks_late))?, divisor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn config() -> RemascConfig {
        RemascConfig {
            publishers_divisor: 4,
            rsk_labs_divisor: 10,
            federation_divisor: 10,
            punishment_divisor: 10,
            late_uncle_inclusion_punishment_divisor: 10,
            ..RemascConfig::regtest()
        }
    }

    #[test]
    fn test_split_with_punishment() {
        let split = RewardSplit::compute(U256::from(81_000u64), true, 2, &config()).unwrap();
        assert_eq!(split.publisher_share, U256::from(10_125u64));
        assert_eq!(split.publisher_surplus, U256::zero());
        assert_eq!(split.miner_share, U256::from(18_225u64));
        assert_eq!(split.miner_surplus, U256::zero());
        assert_eq!(split.punishment, Some(U256::from(2_025u64)));
    }

    #[test]
    fn test_split_surpluses() {
        let split = RewardSplit::compute(U256::from(1_001u64), false, 3, &config()).unwrap();
        // publisher pool 250 over 3, miner pool 751 over 4
        assert_eq!(split.publisher_share, U256::from(83u64));
        assert_eq!(split.publisher_surplus, U256::one());
        assert_eq!(split.miner_share, U256::from(187u64));
        assert_eq!(split.miner_surplus, U256::from(3u64));
        assert_eq!(split.punishment, None);
    }

    #[test]
    fn test_zero_siblings_rejected() {
        assert_eq!(
            RewardSplit::compute(U256::from(10u64), false, 0, &config()),
            Err(RemascError::NoSiblings)
        );
    }

    #[test]
    fn test_late_inclusion_penalty() {
        let top = U256::from(18_225u64);
        assert_eq!(late_inclusion_penalty(top, 101, 100, 10).unwrap(), U256::zero());
        assert_eq!(late_inclusion_penalty(top, 102, 100, 10).unwrap(), U256::from(1_822u64));
        assert_eq!(late_inclusion_penalty(top, 107, 100, 10).unwrap(), U256::from(10_935u64));
        assert_eq!(
            late_inclusion_penalty(top, 100, 100, 10),
            Err(RemascError::ArithmeticUnderflow)
        );
    }

    proptest! {
        #[test]
        fn prop_splitter_remainder_law(amount in any::<u64>(), n in 1usize..64, broken in any::<bool>()) {
            let config = config();
            let amount = U256::from(amount);
            let split = RewardSplit::compute(amount, broken, n, &config).unwrap();
            let n = U256::from(n as u64);

            let publisher_pool = amount / U256::from(config.publishers_divisor);
            let miner_pool = amount - publisher_pool;
            prop_assert_eq!(split.publisher_share * n + split.publisher_surplus, publisher_pool);

            let miner_base = split.miner_share + split.punishment.unwrap_or_default();
            prop_assert_eq!(miner_base * (n + U256::one()) + split.miner_surplus, miner_pool);
            prop_assert!(split.publisher_surplus < n);
            prop_assert!(split.miner_surplus < n + U256::one());
        }
    }
}
