//! Storage layout of the REMASC contract.
//!
//! Each slot is addressed by its UTF-8 name left-padded with zeros to a
//! 32-byte word. Amounts are stored as 32-byte big-endian words and the
//! selection rule flag as a single 0/1 byte.

/// Left-pad a short name to a 32-byte storage word.
pub const fn storage_word(name: &[u8]) -> [u8; 32] {
    assert!(name.len() <= 32);
    let mut word = [0u8; 32];
    let offset = 32 - name.len();
    let mut i = 0;
    while i < name.len() {
        word[offset + i] = name[i];
        i += 1;
    }
    word
}

/// Accumulated fees not yet paid out.
pub const REWARD_BALANCE_KEY: [u8; 32] = storage_word(b"rewardBalance");

/// Total value burned so far.
pub const BURNED_BALANCE_KEY: [u8; 32] = storage_word(b"burnedBalance");

/// Federation earmarks carried over below the gas floor.
pub const FEDERATION_BALANCE_KEY: [u8; 32] = storage_word(b"federationBalance");

/// Whether the last processed block broke the selection rule.
pub const BROKEN_SELECTION_RULE_KEY: [u8; 32] = storage_word(b"brokenSelectionRule");

/// Legacy sibling list, kept only as an empty-list marker.
pub const SIBLINGS_KEY: [u8; 32] = storage_word(b"siblings");

/// Encoded empty list written to [`SIBLINGS_KEY`].
pub const EMPTY_SIBLINGS_SENTINEL: [u8; 1] = [0xC0];
