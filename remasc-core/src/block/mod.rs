//! Block structure.
//!
//! Only the fields the fee engine reads are modelled: number, parent link,
//! miner, paid fees, minimum gas price and the uncle list.

#[allow(clippy::module_inception)]
mod block;
mod header;

pub use block::Block;
pub use header::BlockHeader;
