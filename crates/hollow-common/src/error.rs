//! Error types for Hollow.

use thiserror::Error;

use crate::ids::{BedId, VillagerId};

/// Top-level error type for Hollow operations.
#[derive(Debug, Error)]
pub enum HollowError {
    /// Configuration errors
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Bed assignment errors
    #[error("Bed error: {0}")]
    Bed(#[from] BedError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be parsed
    #[error("Failed to parse config: {0}")]
    Parse(String),

    /// Config could not be serialized
    #[error("Failed to serialize config: {0}")]
    Serialize(String),

    /// A value is outside its allowed range
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue {
        /// Offending field
        field: &'static str,
        /// Why it was rejected
        reason: String,
    },
}

/// Bed assignment errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BedError {
    /// Bed already has a sleeper
    #[error("{bed} is already assigned to {villager}")]
    AlreadyAssigned {
        /// Bed in question
        bed: BedId,
        /// Current sleeper
        villager: VillagerId,
    },
}

/// Result type alias for Hollow operations.
pub type HollowResult<T> = Result<T, HollowError>;
