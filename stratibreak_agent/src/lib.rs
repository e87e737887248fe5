//! Stratibreak agent layer - gap detection and analysis orchestration.
//!
//! This crate wraps the pure core with everything an analysis run needs:
//!
//! - Config: YAML configuration for detection, scoring and summary policy
//! - Request: request/response DTOs and project-state snapshots
//! - Detect: rule-based gap identification from current vs. target metrics
//! - Source: where project state comes from (memory, JSON files)
//! - Service: request -> detection -> prioritization -> mapping -> response
//! - CLI: the `stratibreak` command
//!
//! Connectors for Jira, Asana, Trello and the like are expected to implement
//! [`ProjectStateSource`]; none ship with this crate.

pub mod cli;
pub mod config;
pub mod detect;
pub mod request;
pub mod service;
pub mod source;

/// Error types for analysis operations.
#[derive(thiserror::Error, Debug)]
pub enum AnalysisError {
    /// Request or project state failed validation
    #[error("Validation failed: {0}")]
    Validation(#[from] stratibreak_core::ValidationErrors),

    /// No state is known for the requested project
    #[error("Project not found: {0}")]
    ProjectNotFound(String),

    /// Project state source failed
    #[error("Source error: {0}")]
    Source(String),

    /// Configuration could not be loaded or is inconsistent
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),

    /// Raw gap input could not be converted
    #[error("Transform error: {0}")]
    Transform(#[from] stratibreak_core::TransformError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for analysis operations.
pub type Result<T> = std::result::Result<T, AnalysisError>;

pub use config::{ConfigError, DetectionConfig, SeverityThresholds, StratibreakConfig, SummaryConfig};
pub use detect::GapDetector;
pub use request::{GapAnalysisRequest, GapAnalysisResponse, ProjectMetric, ProjectState};
pub use service::GapAnalysisService;
pub use source::{InMemoryStateSource, JsonFileStateSource, ProjectStateSource};

/// Version of the agent crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Logs the crate version; call once after installing a subscriber.
pub fn init() {
    tracing::info!("Stratibreak v{} (core v{})", VERSION, stratibreak_core::VERSION);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AnalysisError::ProjectNotFound("apollo".to_string());
        assert_eq!(err.to_string(), "Project not found: apollo");
    }

    #[test]
    fn test_transform_error_converts() {
        let err: AnalysisError = stratibreak_core::TransformError::UnknownGapType {
            type_value: Some("vibes".to_string()),
            category_value: None,
        }
        .into();
        assert!(matches!(err, AnalysisError::Transform(_)));
    }

    #[test]
    fn test_validation_error_converts() {
        let mut errors = stratibreak_core::ValidationErrors::new();
        errors.push("project_id", "blank", "project id must not be blank");
        let err: AnalysisError = errors.into();
        assert_eq!(
            err.to_string(),
            "Validation failed: project_id: project id must not be blank"
        );
    }
}
