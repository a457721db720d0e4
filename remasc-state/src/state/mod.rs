//! Account and contract-storage access.
//!
//! This module provides:
//! - [`Repository`]: the transactional world state REMASC reads and writes
//! - [`MemoryRepository`]: In-memory HashMap-backed implementation

mod memory;
mod store;

pub use memory::MemoryRepository;
pub use store::Repository;
