//! Chain collaborators: block lookup, sibling records and the fork-choice
//! selection rule.

mod memory;
mod selection_rule;
mod store;

pub use memory::MemoryBlockStore;
pub use selection_rule::{PaidFeesSelectionRule, SelectionRule};
pub use store::BlockStore;
