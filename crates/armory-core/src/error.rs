//! Error types for Armory

use thiserror::Error;

/// Main error type for Armory operations.
///
/// Infeasible combinations and cancelled searches are normal outcomes and are
/// reported through search results, never through this type.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ArmoryError {
    /// Rejected before a search starts (unknown criterion, bad desired set).
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The catalog snapshot is malformed.
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// Invalid operation for the current solver state.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Internal error (should not occur in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ArmoryError {
    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        ArmoryError::InvalidConfiguration(message.into())
    }

    pub fn catalog(message: impl Into<String>) -> Self {
        ArmoryError::Catalog(message.into())
    }
}

/// Result type alias for Armory operations
pub type Result<T> = std::result::Result<T, ArmoryError>;
