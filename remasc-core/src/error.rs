//! Error types for the REMASC core crate.

use std::fmt;

/// Top-level error type for remasc-core operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CoreError {
    /// Serialization or deserialization failed.
    Serialization(SerializationError),
    /// Network configuration is missing or inconsistent.
    Config(ConfigError),
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreError::Serialization(e) => write!(f, "serialization error: {}", e),
            CoreError::Config(e) => write!(f, "config error: {}", e),
        }
    }
}

impl std::error::Error for CoreError {}

impl From<SerializationError> for CoreError {
    fn from(e: SerializationError) -> Self {
        CoreError::Serialization(e)
    }
}

impl From<ConfigError> for CoreError {
    fn from(e: ConfigError) -> Self {
        CoreError::Config(e)
    }
}

/// Errors related to serialization and deserialization.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SerializationError {
    /// Failed to encode data to bytes.
    EncodeFailed(String),
    /// Failed to decode data from bytes.
    DecodeFailed(String),
}

impl fmt::Display for SerializationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SerializationError::EncodeFailed(msg) => write!(f, "encode failed: {}", msg),
            SerializationError::DecodeFailed(msg) => write!(f, "decode failed: {}", msg),
        }
    }
}

impl std::error::Error for SerializationError {}

/// Errors raised while loading or validating a [`crate::RemascConfig`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// A divisor or span that must be positive is zero.
    ZeroParameter {
        /// Name of the offending field.
        field: &'static str,
    },
    /// Maturity must leave room for the uncle generation walk.
    MaturityTooSmall {
        /// Configured maturity.
        maturity: u64,
        /// Configured uncle generation limit.
        uncle_generation_limit: u64,
    },
    /// A sibling published at the generation limit would lose more than its share.
    LatePenaltyExceedsShare {
        /// Configured uncle generation limit.
        uncle_generation_limit: u64,
        /// Configured late inclusion punishment divisor.
        late_uncle_inclusion_punishment_divisor: u64,
    },
    /// The configuration file could not be read.
    Io(String),
    /// The configuration document is malformed.
    Parse(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroParameter { field } => write!(f, "{} must be greater than zero", field),
            ConfigError::MaturityTooSmall {
                maturity,
                uncle_generation_limit,
            } => write!(
                f,
                "maturity {} must exceed uncle generation limit {}",
                maturity, uncle_generation_limit
            ),
            ConfigError::LatePenaltyExceedsShare {
                uncle_generation_limit,
                late_uncle_inclusion_punishment_divisor,
            } => write!(
                f,
                "uncle generation limit {} allows late penalties above the share (divisor {})",
                uncle_generation_limit, late_uncle_inclusion_punishment_divisor
            ),
            ConfigError::Io(msg) => write!(f, "cannot read config: {}", msg),
            ConfigError::Parse(msg) => write!(f, "cannot parse config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}
