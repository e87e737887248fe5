//! YAML configuration.
//!
//! Every section is optional; missing sections and fields take their
//! defaults. Example:
//!
//! ```yaml
//! detection:
//!   tolerance: 0.05
//!   default_confidence: 0.75
//!   thresholds:
//!     critical: 0.5
//!     high: 0.3
//!     medium: 0.15
//! scoring:
//!   severity_weight: 0.45
//!   impact_weight: 0.25
//!   variance_weight: 0.2
//!   confidence_weight: 0.1
//! summary:
//!   bucket_policy: all_categories
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use stratibreak_core::{BucketPolicy, CoreError, ScoringConfig, SeverityLevel};
use thiserror::Error;

/// Environment variable naming the config file for the CLI.
pub const CONFIG_ENV: &str = "STRATIBREAK_CONFIG";

/// Errors that can occur loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// File could not be read
    #[error("Failed to read config {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// Values parse but are inconsistent
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Relative shortfall at which each severity starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeverityThresholds {
    pub critical: f64,
    pub high: f64,
    pub medium: f64,
}

impl Default for SeverityThresholds {
    fn default() -> Self {
        Self {
            critical: 0.5,
            high: 0.3,
            medium: 0.15,
        }
    }
}

impl SeverityThresholds {
    /// Severity for a relative shortfall above tolerance.
    pub fn classify(&self, ratio: f64) -> SeverityLevel {
        if ratio >= self.critical {
            SeverityLevel::Critical
        } else if ratio >= self.high {
            SeverityLevel::High
        } else if ratio >= self.medium {
            SeverityLevel::Medium
        } else {
            SeverityLevel::Low
        }
    }
}

/// Gap detection rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Relative shortfall at or below which no gap is reported (default: 0.05)
    pub tolerance: f64,
    /// Confidence for metrics that carry none (default: 0.75)
    pub default_confidence: f64,
    pub thresholds: SeverityThresholds,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            tolerance: 0.05,
            default_confidence: 0.75,
            thresholds: SeverityThresholds::default(),
        }
    }
}

/// Summary behaviour.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryConfig {
    pub bucket_policy: BucketPolicy,
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StratibreakConfig {
    pub detection: DetectionConfig,
    pub scoring: ScoringConfig,
    pub summary: SummaryConfig,
}

impl StratibreakConfig {
    /// Parses and validates YAML.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        // An empty document deserialises to unit, not to a mapping.
        let config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(yaml)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml_str(&yaml)?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Loads `path` when given, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Checks cross-field consistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let d = &self.detection;
        let t = &d.thresholds;

        if !(0.0..=1.0).contains(&d.default_confidence) {
            return Err(ConfigError::Invalid(format!(
                "detection.default_confidence must be between 0 and 1, got {}",
                d.default_confidence
            )));
        }
        if !(d.tolerance >= 0.0 && d.tolerance < t.medium && t.medium < t.high && t.high < t.critical) {
            return Err(ConfigError::Invalid(format!(
                "detection thresholds must satisfy 0 <= tolerance < medium < high < critical, got {} / {} / {} / {}",
                d.tolerance, t.medium, t.high, t.critical
            )));
        }

        self.scoring.validate().map_err(|e| match e {
            CoreError::InvalidConfig(msg) => ConfigError::Invalid(msg),
            other => ConfigError::Invalid(other.to_string()),
        })
    }
}
