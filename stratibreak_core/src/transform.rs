//! String/number normalization and the default policy for raw gap input.
//!
//! Integrations hand over loosely-typed payloads: enum values as free-form
//! strings, numbers that may be missing. [`RawGap::into_gap`] turns such a
//! payload into a [`Gap`] using one explicit default per field:
//!
//! | field               | missing / unusable value                         |
//! |---------------------|--------------------------------------------------|
//! | `type`              | `category` parsed as a gap type, else rejected   |
//! | `category`          | `operational`                                    |
//! | `severity`          | `medium`                                         |
//! | `confidence`        | `0.0` (NaN too); finite values clamped to [0, 1] |
//! | `currentValue`      | `0.0`                                            |
//! | `targetValue`       | `0.0`                                            |
//! | `variance`          | `targetValue - currentValue`                     |
//! | `estimatedImpact`   | derived from severity                            |
//! | `projectId`         | `"unassigned"`                                   |
//! | `id`                | fresh v4 id                                      |
//! | `identifiedAt`      | now                                              |
//! | root cause category | `process`                                        |
//! | root cause text     | `"<category> cause"`                             |
//! | contribution weight | `0.0`; finite values clamped to [0, 1]           |
//! | weight sum above 1  | every weight scaled down so the sum is 1         |
//!
//! A gap produced this way always passes [`Validate`](crate::Validate).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{
    AffectedArea, Confidence, Gap, GapCategory, GapId, GapType, ImpactLevel, Priority,
    RootCause, RootCauseCategory, SeverityLevel,
};

/// Project id used when a raw gap carries none.
pub const UNASSIGNED_PROJECT: &str = "unassigned";

/// Errors converting raw input into domain types.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransformError {
    /// Neither `type` nor `category` named a gap type, so the gap has no bucket.
    #[error("gap has no recognised type (type: {type_value:?}, category: {category_value:?})")]
    UnknownGapType {
        type_value: Option<String>,
        category_value: Option<String>,
    },
}

/// Trims and collapses internal runs of whitespace to single spaces.
pub fn normalize_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Canonical lookup key: trimmed, lowercase, `-` and whitespace mapped to
/// `_`, repeated separators collapsed.
pub fn normalize_key(input: &str) -> String {
    let mut key = String::with_capacity(input.len());
    let mut pending_sep = false;

    for ch in input.trim().chars() {
        if ch == '-' || ch == '_' || ch.is_whitespace() {
            pending_sep = !key.is_empty();
            continue;
        }
        if pending_sep {
            key.push('_');
            pending_sep = false;
        }
        key.extend(ch.to_lowercase());
    }

    key
}

/// Rounds to a fixed number of decimal places.
pub fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}

/// Clamps into [0, 1]; NaN becomes 0.
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Converts a [0, 1] ratio into a percentage with two decimals.
pub fn ratio_to_percentage(ratio: f64) -> f64 {
    round_to(clamp_unit(ratio) * 100.0, 2)
}

pub fn to_gap_type(input: &str) -> Option<GapType> {
    input.parse().ok()
}

pub fn to_gap_category(input: &str) -> Option<GapCategory> {
    input.parse().ok()
}

pub fn to_severity_level(input: &str) -> Option<SeverityLevel> {
    input.parse().ok()
}

pub fn to_priority(input: &str) -> Option<Priority> {
    input.parse().ok()
}

pub fn to_root_cause_category(input: &str) -> Option<RootCauseCategory> {
    input.parse().ok()
}

pub fn to_impact_level(input: &str) -> Option<ImpactLevel> {
    input.parse().ok()
}

/// Scales contribution weights down proportionally when they sum past 1.
pub fn normalize_weights(mut causes: Vec<RootCause>) -> Vec<RootCause> {
    let sum: f64 = causes.iter().map(|c| c.contribution_weight).sum();
    if sum > 1.0 {
        for cause in &mut causes {
            cause.contribution_weight /= sum;
        }
    }
    causes
}

/// Loosely-typed root cause as received from an integration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawRootCause {
    pub category: Option<String>,
    pub description: Option<String>,
    pub confidence: Option<f64>,
    pub evidence: Vec<String>,
    pub contribution_weight: Option<f64>,
}

impl RawRootCause {
    /// Applies the root-cause default policy.
    pub fn into_root_cause(self) -> RootCause {
        let category = self
            .category
            .as_deref()
            .and_then(to_root_cause_category)
            .unwrap_or(RootCauseCategory::Process);

        RootCause {
            category,
            description: self
                .description
                .map(|d| normalize_whitespace(&d))
                .filter(|d| !d.is_empty())
                .unwrap_or_else(|| format!("{} cause", category)),
            confidence: Confidence::coalesce(self.confidence),
            evidence: self.evidence,
            contribution_weight: self.contribution_weight.map(clamp_unit).unwrap_or(0.0),
        }
    }
}

/// Loosely-typed gap as received from an integration or a JSON file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawGap {
    pub id: Option<String>,
    pub project_id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub gap_type: Option<String>,
    pub category: Option<String>,
    pub severity: Option<String>,
    pub current_value: Option<f64>,
    pub target_value: Option<f64>,
    pub variance: Option<f64>,
    pub root_causes: Vec<RawRootCause>,
    pub affected_areas: Vec<String>,
    pub estimated_impact: Option<String>,
    pub confidence: Option<f64>,
    pub identified_at: Option<DateTime<Utc>>,
}

impl RawGap {
    /// Resolves the bucket: the `type` field first, then `category` read as a
    /// gap type.
    pub fn resolve_gap_type(&self) -> Option<GapType> {
        self.gap_type
            .as_deref()
            .and_then(to_gap_type)
            .or_else(|| self.category.as_deref().and_then(to_gap_type))
    }

    /// Applies the default policy described in the module docs.
    ///
    /// # Errors
    /// Returns `TransformError::UnknownGapType` when no bucket can be resolved.
    pub fn into_gap(self) -> Result<Gap, TransformError> {
        let gap_type = self.resolve_gap_type().ok_or_else(|| TransformError::UnknownGapType {
            type_value: self.gap_type.clone(),
            category_value: self.category.clone(),
        })?;

        let category = self
            .category
            .as_deref()
            .and_then(to_gap_category)
            .unwrap_or(GapCategory::Operational);
        let severity = self
            .severity
            .as_deref()
            .and_then(to_severity_level)
            .unwrap_or(SeverityLevel::Medium);
        let estimated_impact = self
            .estimated_impact
            .as_deref()
            .and_then(to_impact_level)
            .unwrap_or_else(|| ImpactLevel::from_severity(severity));

        let current_value = self.current_value.filter(|v| v.is_finite()).unwrap_or(0.0);
        let target_value = self.target_value.filter(|v| v.is_finite()).unwrap_or(0.0);
        let variance = self
            .variance
            .filter(|v| v.is_finite())
            .unwrap_or(target_value - current_value);

        let id = self
            .id
            .as_deref()
            .and_then(|raw| uuid::Uuid::parse_str(raw.trim()).ok())
            .map(GapId::from_uuid)
            .unwrap_or_default();

        let project_id = self
            .project_id
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| UNASSIGNED_PROJECT.to_string());

        let title = self
            .title
            .map(|t| normalize_whitespace(&t))
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| format!("{} gap", gap_type));

        let affected_areas = self
            .affected_areas
            .iter()
            .map(|name| normalize_whitespace(name))
            .filter(|name| !name.is_empty())
            .map(|name| AffectedArea::new(name, estimated_impact))
            .collect();

        Ok(Gap {
            id,
            project_id,
            title,
            description: self.description.map(|d| normalize_whitespace(&d)).unwrap_or_default(),
            gap_type,
            category,
            severity,
            current_value,
            target_value,
            variance,
            root_causes: normalize_weights(
                self.root_causes
                    .into_iter()
                    .map(RawRootCause::into_root_cause)
                    .collect(),
            ),
            affected_areas,
            estimated_impact,
            confidence: Confidence::coalesce(self.confidence),
            identified_at: self.identified_at.unwrap_or_else(Utc::now),
        })
    }
}
