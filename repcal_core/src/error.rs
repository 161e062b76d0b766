//! Error types for the repcal_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for repcal_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Routine failed builder or catalog validation
    #[error("Routine validation error: {0}")]
    RoutineValidation(String),

    /// Routine or completion store refused or failed an operation
    #[error("Store error: {0}")]
    Store(String),

    /// A date or month string could not be parsed or is out of range
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// Lookup by identifier found nothing
    #[error("Not found: {0}")]
    NotFound(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}
