//! Stratibreak core - gap categorization, metrics and prioritization.
//!
//! This crate holds the pure part of project gap analysis. A gap is a
//! discrepancy between a project's current and target state along one
//! dimension (resource, process, budget, ...).
//!
//! # Overview
//!
//! - **Types**: closed enums for gap type, severity, priority and friends,
//!   plus the [`Gap`] and [`RootCause`] records
//! - **Validation**: total predicates and field-level [`Validate`] checks
//! - **Transform**: normalization helpers and the default policy that turns
//!   loosely-typed [`RawGap`] input into gaps
//! - **Mapper**: ten-bucket categorization, per-category metrics and the
//!   cross-category summary
//! - **Scoring**: multi-factor priority score and a priority queue
//!
//! # Quick Start
//!
//! ```rust
//! use stratibreak_core::{map_result, BucketPolicy, Confidence, Gap, GapType, SeverityLevel};
//!
//! let gaps = vec![
//!     Gap::new("apollo", GapType::Resource, SeverityLevel::High, Confidence::new(0.8).unwrap()),
//!     Gap::new("apollo", GapType::Process, SeverityLevel::Critical, Confidence::new(0.9).unwrap()),
//! ];
//!
//! let result = map_result(gaps, None, BucketPolicy::AllCategories);
//! assert_eq!(result.summary.total_gaps, 2);
//! assert_eq!(result.summary.critical_gaps, 1);
//! ```
//!
//! Nothing here performs I/O or holds shared state; every call is a
//! deterministic function of its input.

pub mod error;
pub mod types;

pub mod mapper;
pub mod scoring;
pub mod transform;
pub mod validation;

pub use error::{CoreError, Result};
pub use types::{
    AffectedArea, Confidence, ConfidenceError, CriticalityLevel, Gap, GapCategory, GapId,
    GapType, ImpactLevel, Priority, RootCause, RootCauseCategory, SeverityLevel, UnknownVariant,
};

pub use mapper::{
    categorize, map_categorized, map_result, summarize, AnalysisSummary, BucketPolicy,
    CategorizedGaps, GapAnalysisResult, GapCategoryMetrics, Trend,
};
pub use scoring::{compute_gap_score, prioritize, PrioritizedGap, PriorityQueue, ScoringConfig};
pub use transform::{RawGap, RawRootCause, TransformError};
pub use validation::{FieldError, Validate, ValidationErrors};

/// Version of the core crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
