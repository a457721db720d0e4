//! Federation membership and the federation's share of each payout.

mod payer;
mod provider;

pub use payer::{FederationPayer, FederationPayout};
pub use provider::{FederationProvider, StaticFederation};
