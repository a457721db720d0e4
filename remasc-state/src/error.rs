//! Error types for the fee engine.

use remasc_core::{Address, Hash, SerializationError, U256};

/// Every failure the fee engine can report.
///
/// `InvalidInvocation` is raised before anything is touched. Any other error
/// aborts the cycle: the ledger is not saved and the embedding executor is
/// expected to discard the repository's pending changes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RemascError {
    // === Invocation Errors ===
    /// Wrong caller, or call-data that does not name a known method.
    InvalidInvocation {
        /// What was wrong with the call.
        reason: String,
    },

    // === Collaborator Errors ===
    /// A block the ancestor walk needs is missing from the block store.
    BlockNotFound {
        /// Hash the walk was looking for.
        hash: Hash,
    },
    /// The federation has no members.
    EmptyFederation,
    /// Federator index past the end of the federation.
    FederatorNotFound {
        /// Requested index.
        index: usize,
        /// Number of federators.
        size: usize,
    },
    /// The sibling splitter was asked to split between zero siblings.
    NoSiblings,

    // === Value Errors ===
    /// Debit larger than the account balance.
    InsufficientBalance {
        /// Account being debited.
        address: Address,
        /// Its balance.
        available: U256,
        /// Amount asked for.
        requested: U256,
    },
    /// Arithmetic overflow in calculation.
    ArithmeticOverflow,
    /// Arithmetic underflow in calculation.
    ArithmeticUnderflow,
    /// Division by a zero divisor.
    DivisionByZero,

    // === Persistence Errors ===
    /// A ledger storage slot holds a value of the wrong shape.
    CorruptStorage {
        /// Name of the slot.
        key: &'static str,
        /// Length of the stored value.
        len: usize,
    },
    /// Encoding or decoding failed.
    Serialization(SerializationError),
    /// The backing store failed.
    Storage(String),
}

impl std::fmt::Display for RemascError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RemascError::InvalidInvocation { reason } => write!(f, "invalid invocation: {}", reason),

            RemascError::BlockNotFound { hash } => {
                write!(f, "block not found: {}", hex::encode(&hash[..4]))
            }
            RemascError::EmptyFederation => write!(f, "federation has no members"),
            RemascError::FederatorNotFound { index, size } => {
                write!(f, "federator {} out of range for federation of {}", index, size)
            }
            RemascError::NoSiblings => write!(f, "cannot split a reward between zero siblings"),

            RemascError::InsufficientBalance {
                address,
                available,
                requested,
            } => write!(
                f,
                "insufficient balance at {}: available {}, requested {}",
                hex::encode(address),
                available,
                requested
            ),
            RemascError::ArithmeticOverflow => write!(f, "arithmetic overflow"),
            RemascError::ArithmeticUnderflow => write!(f, "arithmetic underflow"),
            RemascError::DivisionByZero => write!(f, "division by zero"),

            RemascError::CorruptStorage { key, len } => {
                write!(f, "corrupt storage slot {}: unexpected length {}", key, len)
            }
            RemascError::Serialization(e) => write!(f, "serialization error: {}", e),
            RemascError::Storage(msg) => write!(f, "storage error: {}", msg),
        }
    }
}

impl std::error::Error for RemascError {}

impl From<SerializationError> for RemascError {
    fn from(e: SerializationError) -> Self {
        RemascError::Serialization(e)
    }
}

impl RemascError {
    /// Shorthand for an [`RemascError::InvalidInvocation`].
    pub fn invalid_invocation(reason: impl Into<String>) -> Self {
        RemascError::InvalidInvocation { reason: reason.into() }
    }
}

/// Result type for fee engine operations.
pub type RemascResult<T> = Result<T, RemascError>;
