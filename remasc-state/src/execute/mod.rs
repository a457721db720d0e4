//! The per-block fee processing cycle.
//!
//! - [`Remasc`]: orchestrates one cycle
//! - [`GenerationWalk`]: finds the maturing block and its siblings
//! - [`RewardSplit`]: splits a payout between a block and its siblings
//! - [`FeesPayer`]: moves value and logs each payment

mod payment;
mod remasc;
mod siblings;
mod split;

pub use payment::{decode_payment, FeesPayer, MINING_FEE_TOPIC};
pub use remasc::{DistributionSummary, ProcessOutcome, Remasc};
pub use siblings::{collect_siblings, GenerationWalk};
pub use split::{late_inclusion_penalty, RewardSplit};
