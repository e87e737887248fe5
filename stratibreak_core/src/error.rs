//! Error types for the Stratibreak core.

use crate::types::ConfidenceError;
use crate::transform::TransformError;
use crate::validation::ValidationErrors;

/// Main error type for core operations.
///
/// The mapper and predicates never fail; errors only arise when loosely-typed
/// input is converted into domain types or when configuration is invalid.
#[derive(thiserror::Error, Debug)]
pub enum CoreError {
    /// A bounded confidence value was rejected.
    #[error("Confidence error: {0}")]
    Confidence(#[from] ConfidenceError),

    /// Raw input could not be converted into a domain value.
    #[error("Transform error: {0}")]
    Transform(#[from] TransformError),

    /// One or more fields failed validation.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    /// Scoring or summary configuration is inconsistent.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Type alias for Result with CoreError.
pub type Result<T> = std::result::Result<T, CoreError>;
