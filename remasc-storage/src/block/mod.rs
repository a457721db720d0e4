//! Block storage and sibling indexing.
//!
//! [`KvBlockStore`] keeps the canonical chain in a [`crate::KvBackend`] and
//! serves it to the fee engine through the `BlockStore` trait.

mod store;

pub use store::KvBlockStore;
