//! Error types for the glucosim_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for glucosim_core operations
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

    /// Catalog validation error
    #[error("Catalog validation error: {0}")]
    CatalogValidation(String),

    /// A parameter field is out of its declared range or a dose exceeds
    /// the catalog maximum. Raised when a parameter set enters the engine,
    /// never deep inside a computation.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Metric derivation was called on a trajectory with zero points
    #[error("Cannot derive metrics from an empty trajectory")]
    EmptyTrajectory,

    /// An uploaded CSV is missing required columns or is unparseable
    #[error("Malformed input: {0}")]
    MalformedInput(String),
}
