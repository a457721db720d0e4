//! Write buffer for tracking dirty state entries.

use std::collections::BTreeSet;

use crate::keys::StateKey;

/// The set of state entries modified since the last commit or rollback.
#[derive(Clone, Debug, Default)]
pub struct WriteBuffer {
    dirty: BTreeSet<StateKey>,
}

impl WriteBuffer {
    /// Create a new empty write buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a key as dirty.
    pub fn mark_dirty(&mut self, key: StateKey) {
        self.dirty.insert(key);
    }

    /// Check if a key is dirty.
    pub fn is_dirty(&self, key: &StateKey) -> bool {
        self.dirty.contains(key)
    }

    /// Number of dirty entries.
    pub fn len(&self) -> usize {
        self.dirty.len()
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.dirty.is_empty()
    }

    /// Remove every dirty key, in key order.
    pub fn take(&mut self) -> Vec<StateKey> {
        std::mem::take(&mut self.dirty).into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marks_are_deduplicated_and_ordered() {
        let mut buffer = WriteBuffer::new();
        buffer.mark_dirty(StateKey::Storage([0u8; 20], [1u8; 32]));
        buffer.mark_dirty(StateKey::Balance([2u8; 20]));
        buffer.mark_dirty(StateKey::Balance([2u8; 20]));
        assert_eq!(buffer.len(), 2);
        assert!(buffer.is_dirty(&StateKey::Balance([2u8; 20])));

        let keys = buffer.take();
        assert_eq!(keys[0], StateKey::Balance([2u8; 20]));
        assert!(buffer.is_empty());
    }
}
