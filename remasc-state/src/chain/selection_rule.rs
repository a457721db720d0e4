//! Fork-choice selection rule check.
//!
//! When a block matures, REMASC asks whether the canonical chain picked it
//! over a sibling that should have won. A violation is punished one payout
//! cycle later.

use remasc_core::{BlockHeader, Sibling, U256};

/// Predicate deciding whether the canonical chain broke the selection rule
/// at the processing block.
pub trait SelectionRule {
    /// Whether any of `siblings` should have been chosen over `processing`.
    fn is_broken(&self, processing: &BlockHeader, siblings: &[Sibling]) -> bool;
}

/// Rule comparing paid fees, uncle counts and hashes.
///
/// A sibling should have won if either:
/// - it references more uncles than the processing block (tracking the
///   running maximum over the siblings seen so far) and paid more than twice
///   the processing block's fees, or
/// - the processing block paid less than twice the sibling's fees and the
///   sibling's hash is smaller.
#[derive(Clone, Copy, Debug, Default)]
pub struct PaidFeesSelectionRule;

/// Fee ratio a competitor must exceed.
const PAID_FEES_MULTIPLIER: u64 = 2;

impl SelectionRule for PaidFeesSelectionRule {
    fn is_broken(&self, processing: &BlockHeader, siblings: &[Sibling]) -> bool {
        let multiplier = U256::from(PAID_FEES_MULTIPLIER);
        let processing_hash = processing.hash();
        let mut max_uncle_count = 0u32;

        for sibling in siblings {
            max_uncle_count = max_uncle_count.max(sibling.uncle_count);

            // Saturating: a product that does not fit is larger than any fee.
            let processing_fees_scaled = processing.paid_fees.saturating_mul(multiplier);
            if processing.uncle_count < max_uncle_count && processing_fees_scaled < sibling.paid_fees {
                return true;
            }

            let sibling_fees_scaled = sibling.paid_fees.saturating_mul(multiplier);
            if processing.paid_fees < sibling_fees_scaled && sibling.hash < processing_hash {
                return true;
            }
        }
        false
    }
}
