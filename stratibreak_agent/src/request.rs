//! Request/response DTOs and project-state snapshots.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stratibreak_core::validation::{is_confidence, is_non_blank};
use stratibreak_core::{
    Gap, GapAnalysisResult, GapCategory, GapType, PrioritizedGap, SeverityLevel, Validate,
    ValidationErrors,
};

fn default_true() -> bool {
    true
}

fn default_category() -> GapCategory {
    GapCategory::Operational
}

/// One measured dimension of a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectMetric {
    /// Metric name (e.g. "sprint velocity")
    pub name: String,
    /// Dimension the metric measures
    pub gap_type: GapType,
    #[serde(default = "default_category")]
    pub category: GapCategory,
    /// Observed value
    pub current: f64,
    /// Desired value
    pub target: f64,
    /// Whether exceeding the target is good (default: true)
    #[serde(default = "default_true")]
    pub higher_is_better: bool,
    /// Certainty of the measurement
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl ProjectMetric {
    pub fn new(name: impl Into<String>, gap_type: GapType, current: f64, target: f64) -> Self {
        Self {
            name: name.into(),
            gap_type,
            category: default_category(),
            current,
            target,
            higher_is_better: true,
            confidence: None,
            unit: None,
        }
    }

    /// Marks the metric as one where lower values are better.
    pub fn lower_is_better(mut self) -> Self {
        self.higher_is_better = false;
        self
    }

    pub fn with_category(mut self, category: GapCategory) -> Self {
        self.category = category;
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }
}

impl Validate for ProjectMetric {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        errors.check(is_non_blank(&self.name), "name", "blank", "name must not be blank");
        errors.check(self.current.is_finite(), "current", "not_finite", "current must be a finite number");
        errors.check(self.target.is_finite(), "target", "not_finite", "target must be a finite number");
        if let Some(confidence) = self.confidence {
            errors.check(
                is_confidence(confidence),
                "confidence",
                "out_of_range",
                "confidence must be between 0 and 1",
            );
        }

        errors.into_result()
    }
}

/// Snapshot of a project as pulled from an external tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectState {
    pub project_id: String,
    /// Tool the snapshot came from ("jira", "asana", ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_tool: Option<String>,
    #[serde(default = "Utc::now")]
    pub captured_at: DateTime<Utc>,
    #[serde(default)]
    pub metrics: Vec<ProjectMetric>,
}

impl ProjectState {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            source_tool: None,
            captured_at: Utc::now(),
            metrics: Vec::new(),
        }
    }

    pub fn with_metric(mut self, metric: ProjectMetric) -> Self {
        self.metrics.push(metric);
        self
    }
}

impl Validate for ProjectState {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        errors.check(
            is_non_blank(&self.project_id),
            "project_id",
            "blank",
            "project id must not be blank",
        );

        let mut seen = HashSet::new();
        for (i, metric) in self.metrics.iter().enumerate() {
            let prefix = format!("metrics[{}]", i);
            errors.nest_result(&prefix, metric);
            if !seen.insert(metric.name.trim().to_lowercase()) {
                errors.push(
                    format!("{}.name", prefix),
                    "duplicate",
                    format!("metric '{}' appears more than once", metric.name),
                );
            }
        }

        errors.into_result()
    }
}

/// What to analyse and how to filter the result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GapAnalysisRequest {
    pub project_id: String,
    /// Gap types to keep; empty keeps all
    #[serde(default)]
    pub include_types: Vec<GapType>,
    /// Drop gaps below this severity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_severity: Option<SeverityLevel>,
    /// Gaps of a previous analysis, for trends
    #[serde(default)]
    pub baseline_gaps: Vec<Gap>,
}

impl GapAnalysisRequest {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            include_types: Vec::new(),
            min_severity: None,
            baseline_gaps: Vec::new(),
        }
    }

    pub fn include_type(mut self, gap_type: GapType) -> Self {
        self.include_types.push(gap_type);
        self
    }

    pub fn min_severity(mut self, severity: SeverityLevel) -> Self {
        self.min_severity = Some(severity);
        self
    }

    pub fn with_baseline(mut self, gaps: Vec<Gap>) -> Self {
        self.baseline_gaps = gaps;
        self
    }

    /// Whether a gap passes the type and severity filters.
    pub fn accepts(&self, gap: &Gap) -> bool {
        let type_ok = self.include_types.is_empty() || self.include_types.contains(&gap.gap_type);
        let severity_ok = self.min_severity.map_or(true, |min| gap.severity >= min);
        type_ok && severity_ok
    }
}

impl Validate for GapAnalysisRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        errors.check(
            is_non_blank(&self.project_id),
            "project_id",
            "blank",
            "project id must not be blank",
        );

        for (i, gap) in self.baseline_gaps.iter().enumerate() {
            let prefix = format!("baseline_gaps[{}]", i);
            errors.nest_result(&prefix, gap);
            errors.check(
                gap.project_id == self.project_id,
                format!("{}.project_id", prefix),
                "project_mismatch",
                format!("baseline gap belongs to '{}', not '{}'", gap.project_id, self.project_id),
            );
        }

        errors.into_result()
    }
}

/// Outcome of one analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GapAnalysisResponse {
    pub project_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_tool: Option<String>,
    pub analyzed_at: DateTime<Utc>,
    /// Gaps highest priority first
    pub prioritized: Vec<PrioritizedGap>,
    pub result: GapAnalysisResult,
}
