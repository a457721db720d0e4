//! Block store trait.

use remasc_core::{BlockHeader, Hash, SiblingsByHeight};

use crate::error::{RemascError, RemascResult};

/// Read access to connected blocks and the sibling records derived from them.
pub trait BlockStore {
    /// Header of the block with `hash`, if connected.
    fn block_by_hash(&self, hash: &Hash) -> RemascResult<Option<BlockHeader>>;

    /// Sibling records created when the block with `hash` was connected,
    /// keyed by the height of the uncle each one describes.
    fn siblings_at_hash(&self, hash: &Hash) -> RemascResult<SiblingsByHeight>;

    /// Header of the block with `hash`, failing if it is missing.
    fn require_block(&self, hash: &Hash) -> RemascResult<BlockHeader> {
        self.block_by_hash(hash)?
            .ok_or(RemascError::BlockNotFound { hash: *hash })
    }

    /// Walk `depth` parent links back from the block with hash `start`.
    ///
    /// Depth 0 is the starting block itself.
    fn ancestor_at_depth(&self, start: &Hash, depth: u64) -> RemascResult<BlockHeader> {
        let mut current = self.require_block(start)?;
        for _ in 0..depth {
            current = self.require_block(&current.parent_hash)?;
        }
        Ok(current)
    }
}
