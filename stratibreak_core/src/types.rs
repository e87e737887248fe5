//! Core domain types for gap analysis.
//!
//! Enumerations are closed sets with snake_case wire names. Parsing from
//! strings is lenient about case, surrounding whitespace and `-`/space
//! separators; anything else is rejected with [`UnknownVariant`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A string did not name any variant of a domain enum.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown {kind}: '{value}'")]
pub struct UnknownVariant {
    /// Enum being parsed
    pub kind: &'static str,
    /// Rejected input
    pub value: String,
}

macro_rules! domain_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $wire:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[ $( $name::$variant ),+ ];

            /// Wire name of the variant.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $( $name::$variant => $wire ),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let key = crate::transform::normalize_key(s);
                $name::ALL
                    .iter()
                    .copied()
                    .find(|variant| variant.as_str() == key)
                    .ok_or_else(|| UnknownVariant {
                        kind: stringify!($name),
                        value: s.to_string(),
                    })
            }
        }
    };
}

domain_enum! {
    /// Dimension a gap belongs to.
    ///
    /// The declaration order is the fixed bucket order used by the result
    /// mapper and by every tie-break in the summary.
    pub enum GapType {
        /// Staffing or capacity shortfall
        Resource => "resource",
        /// Workflow or methodology deviation
        Process => "process",
        /// Information flow between people or teams
        Communication => "communication",
        /// Tooling or platform limitation
        Technology => "technology",
        /// Team culture or engagement
        Culture => "culture",
        /// Schedule slippage
        Timeline => "timeline",
        /// Defect rate or acceptance shortfall
        Quality => "quality",
        /// Spend against plan
        Budget => "budget",
        /// Missing competencies
        Skill => "skill",
        /// Decision rights and oversight
        Governance => "governance",
    }
}

domain_enum! {
    /// Organisational level at which a gap manifests.
    pub enum GapCategory {
        Operational => "operational",
        Strategic => "strategic",
        Tactical => "tactical",
        Technical => "technical",
        Organizational => "organizational",
    }
}

domain_enum! {
    /// Ordinal urgency of a gap.
    pub enum SeverityLevel {
        Low => "low",
        Medium => "medium",
        High => "high",
        Critical => "critical",
    }
}

domain_enum! {
    /// Action priority derived from a gap's score.
    pub enum Priority {
        Low => "low",
        Medium => "medium",
        High => "high",
        Urgent => "urgent",
    }
}

domain_enum! {
    /// Class of a hypothesised contributing factor.
    pub enum RootCauseCategory {
        People => "people",
        Process => "process",
        Technology => "technology",
        Resource => "resource",
        Communication => "communication",
        External => "external",
        Governance => "governance",
    }
}

domain_enum! {
    /// Expected effect of a gap on delivery.
    pub enum ImpactLevel {
        Negligible => "negligible",
        Minor => "minor",
        Moderate => "moderate",
        Major => "major",
        Severe => "severe",
    }
}

domain_enum! {
    /// Criticality of an affected area or dependency.
    pub enum CriticalityLevel {
        Low => "low",
        Medium => "medium",
        High => "high",
        Critical => "critical",
    }
}

impl SeverityLevel {
    /// Integer weight (low = 1 .. critical = 4).
    pub fn weight(self) -> u32 {
        match self {
            SeverityLevel::Low => 1,
            SeverityLevel::Medium => 2,
            SeverityLevel::High => 3,
            SeverityLevel::Critical => 4,
        }
    }
}

impl ImpactLevel {
    /// Default impact implied by a severity when none is supplied.
    pub fn from_severity(severity: SeverityLevel) -> Self {
        match severity {
            SeverityLevel::Low => ImpactLevel::Minor,
            SeverityLevel::Medium => ImpactLevel::Moderate,
            SeverityLevel::High => ImpactLevel::Major,
            SeverityLevel::Critical => ImpactLevel::Severe,
        }
    }
}

/// Bounded confidence value [0.0, 1.0]
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Confidence(f64);

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfidenceError {
    #[error("Confidence value cannot be NaN")]
    NaN,

    #[error("Confidence out of bounds: {value} (must be {min} to {max})")]
    OutOfBounds { value: f64, min: f64, max: f64 },
}

impl Confidence {
    const MIN: f64 = 0.0;
    const MAX: f64 = 1.0;

    /// Zero confidence, the default for missing values.
    pub const ZERO: Confidence = Confidence(0.0);

    /// Create a new confidence value with bounds validation
    ///
    /// # Errors
    /// - Returns `ConfidenceError::NaN` if value is NaN
    /// - Returns `ConfidenceError::OutOfBounds` if value < 0.0 or > 1.0
    pub fn new(value: f64) -> Result<Self, ConfidenceError> {
        if value.is_nan() {
            return Err(ConfidenceError::NaN);
        }
        if !(Self::MIN..=Self::MAX).contains(&value) {
            return Err(ConfidenceError::OutOfBounds {
                value,
                min: Self::MIN,
                max: Self::MAX,
            });
        }
        Ok(Self(value))
    }

    /// Coalesce an optional raw value: missing or NaN becomes zero, finite
    /// values are clamped into range.
    pub fn coalesce(value: Option<f64>) -> Self {
        match value {
            Some(v) if v.is_nan() => Self::ZERO,
            Some(v) => Self(v.clamp(Self::MIN, Self::MAX)),
            None => Self::ZERO,
        }
    }

    /// Get the underlying f64 value
    pub fn get(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for Confidence {
    type Error = ConfidenceError;
    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Confidence> for f64 {
    fn from(value: Confidence) -> Self {
        value.0
    }
}

impl Default for Confidence {
    fn default() -> Self {
        Self::ZERO
    }
}

/// Unique identifier for a gap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GapId(uuid::Uuid);

impl GapId {
    /// Create a new random GapId
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Wrap an existing UUID
    pub fn from_uuid(id: uuid::Uuid) -> Self {
        Self(id)
    }

    /// Underlying UUID
    pub fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }
}

impl Default for GapId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for GapId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A hypothesised contributing factor, owned by exactly one gap.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RootCause {
    /// Class of the cause
    pub category: RootCauseCategory,
    /// Human-readable explanation
    pub description: String,
    /// Certainty that this cause applies
    pub confidence: Confidence,
    /// Supporting observations
    #[serde(default)]
    pub evidence: Vec<String>,
    /// Share of the gap explained by this cause, in [0, 1]
    pub contribution_weight: f64,
}

impl RootCause {
    /// Creates a root cause without evidence.
    pub fn new(
        category: RootCauseCategory,
        description: impl Into<String>,
        confidence: Confidence,
        contribution_weight: f64,
    ) -> Self {
        Self {
            category,
            description: description.into(),
            confidence,
            evidence: Vec::new(),
            contribution_weight,
        }
    }

    /// Attaches a piece of evidence (builder pattern).
    pub fn with_evidence(mut self, evidence: impl Into<String>) -> Self {
        self.evidence.push(evidence.into());
        self
    }
}

/// Part of the project touched by a gap.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AffectedArea {
    /// Area name (team, workstream, component)
    pub name: String,
    /// Expected effect on the area
    pub impact: ImpactLevel,
    /// Optional detail
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl AffectedArea {
    pub fn new(name: impl Into<String>, impact: ImpactLevel) -> Self {
        Self {
            name: name.into(),
            impact,
            description: None,
        }
    }
}

/// A detected discrepancy between a project's current and target state.
///
/// Gaps are immutable results of an analysis run: a new analysis produces a
/// new gap set rather than updating an old one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Gap {
    /// Unique identifier
    pub id: GapId,
    /// Owning project
    pub project_id: String,
    /// Short label
    pub title: String,
    /// Human-readable description
    #[serde(default)]
    pub description: String,
    /// Dimension, also the bucket key
    pub gap_type: GapType,
    /// Organisational level
    pub category: GapCategory,
    /// Urgency
    pub severity: SeverityLevel,
    /// Observed value
    pub current_value: f64,
    /// Desired value
    pub target_value: f64,
    /// Signed distance between target and current
    pub variance: f64,
    /// Contributing factors
    #[serde(default)]
    pub root_causes: Vec<RootCause>,
    /// Areas touched by the gap
    #[serde(default)]
    pub affected_areas: Vec<AffectedArea>,
    /// Expected effect on delivery
    pub estimated_impact: ImpactLevel,
    /// Certainty that the gap is real
    pub confidence: Confidence,
    /// When the gap was identified
    pub identified_at: DateTime<Utc>,
}

impl Gap {
    /// Creates a gap with zero variance and defaults derived from severity.
    pub fn new(
        project_id: impl Into<String>,
        gap_type: GapType,
        severity: SeverityLevel,
        confidence: Confidence,
    ) -> Self {
        Self {
            id: GapId::new(),
            project_id: project_id.into(),
            title: format!("{} gap", gap_type),
            description: String::new(),
            gap_type,
            category: GapCategory::Operational,
            severity,
            current_value: 0.0,
            target_value: 0.0,
            variance: 0.0,
            root_causes: Vec::new(),
            affected_areas: Vec::new(),
            estimated_impact: ImpactLevel::from_severity(severity),
            confidence,
            identified_at: Utc::now(),
        }
    }

    /// Sets title and description.
    pub fn with_title(mut self, title: impl Into<String>, description: impl Into<String>) -> Self {
        self.title = title.into();
        self.description = description.into();
        self
    }

    /// Sets current and target values; variance is `target - current`.
    pub fn with_values(mut self, current: f64, target: f64) -> Self {
        self.current_value = current;
        self.target_value = target;
        self.variance = target - current;
        self
    }

    pub fn with_category(mut self, category: GapCategory) -> Self {
        self.category = category;
        self
    }

    pub fn with_impact(mut self, impact: ImpactLevel) -> Self {
        self.estimated_impact = impact;
        self
    }

    pub fn with_root_cause(mut self, cause: RootCause) -> Self {
        self.root_causes.push(cause);
        self
    }

    pub fn with_affected_area(mut self, area: AffectedArea) -> Self {
        self.affected_areas.push(area);
        self
    }

    pub fn identified_at(mut self, at: DateTime<Utc>) -> Self {
        self.identified_at = at;
        self
    }

    /// Bucket this gap is categorized under.
    pub fn bucket(&self) -> GapType {
        self.gap_type
    }
}
