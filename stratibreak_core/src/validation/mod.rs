//! Field-level validation.
//!
//! Validation is explicit: a type implements [`Validate`] and reports every
//! violated field as a [`FieldError`]. Nested values are reported with dotted
//! paths such as `root_causes[1].contribution_weight`.

pub mod predicates;

pub use predicates::*;

use serde::{Deserialize, Serialize};

use crate::types::{AffectedArea, Gap, RootCause};

/// Tolerance when checking that contribution weights sum to at most 1.
const WEIGHT_SUM_EPSILON: f64 = 1e-9;

/// A single violated field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Dotted path of the field
    pub field: String,
    /// Machine-readable code (`blank`, `out_of_range`, ...)
    pub code: String,
    /// Human-readable message
    pub message: String,
}

/// All violations found while validating one value.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a violation.
    pub fn push(&mut self, field: impl Into<String>, code: &str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.into(),
            code: code.to_string(),
            message: message.into(),
        });
    }

    /// Records a violation when `ok` is false.
    pub fn check(&mut self, ok: bool, field: impl Into<String>, code: &str, message: impl Into<String>) {
        if !ok {
            self.push(field, code, message);
        }
    }

    /// Merges errors from a nested value under `prefix`.
    pub fn nest(&mut self, prefix: &str, nested: ValidationErrors) {
        for err in nested.errors {
            self.errors.push(FieldError {
                field: format!("{}.{}", prefix, err.field),
                ..err
            });
        }
    }

    /// Validates `value` and merges its errors under `prefix`.
    pub fn nest_result(&mut self, prefix: &str, value: &impl Validate) {
        if let Err(nested) = value.validate() {
            self.nest(prefix, nested);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Paths of all failed fields, in report order.
    pub fn fields(&self) -> Vec<&str> {
        self.errors.iter().map(|e| e.field.as_str()).collect()
    }

    /// `Ok(())` when nothing was recorded.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self
            .errors
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Explicit validation returning every field-level violation.
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationErrors>;
}

impl Validate for RootCause {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        errors.check(
            is_non_blank(&self.description),
            "description",
            "blank",
            "description must not be blank",
        );
        errors.check(
            is_confidence(self.confidence.get()),
            "confidence",
            "out_of_range",
            "confidence must be between 0 and 1",
        );
        errors.check(
            is_contribution_weight(self.contribution_weight),
            "contribution_weight",
            "out_of_range",
            "contribution weight must be between 0 and 1",
        );
        for (i, evidence) in self.evidence.iter().enumerate() {
            errors.check(
                is_non_blank(evidence),
                format!("evidence[{}]", i),
                "blank",
                "evidence entries must not be blank",
            );
        }

        errors.into_result()
    }
}

impl Validate for AffectedArea {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check(is_non_blank(&self.name), "name", "blank", "name must not be blank");
        errors.into_result()
    }
}

impl Validate for Gap {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        errors.check(
            is_non_blank(&self.project_id),
            "project_id",
            "blank",
            "project id must not be blank",
        );
        errors.check(is_non_blank(&self.title), "title", "blank", "title must not be blank");
        errors.check(
            is_confidence(self.confidence.get()),
            "confidence",
            "out_of_range",
            "confidence must be between 0 and 1",
        );
        for (field, value) in [
            ("current_value", self.current_value),
            ("target_value", self.target_value),
            ("variance", self.variance),
        ] {
            errors.check(value.is_finite(), field, "not_finite", format!("{} must be a finite number", field));
        }

        for (i, cause) in self.root_causes.iter().enumerate() {
            errors.nest_result(&format!("root_causes[{}]", i), cause);
        }
        let weight_sum: f64 = self.root_causes.iter().map(|c| c.contribution_weight).sum();
        errors.check(
            weight_sum <= 1.0 + WEIGHT_SUM_EPSILON,
            "root_causes",
            "weight_sum",
            format!("contribution weights sum to {:.3}, must not exceed 1", weight_sum),
        );

        for (i, area) in self.affected_areas.iter().enumerate() {
            errors.nest_result(&format!("affected_areas[{}]", i), area);
        }

        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Confidence, GapType, ImpactLevel, RootCauseCategory, SeverityLevel};

    fn cause(weight: f64) -> RootCause {
        RootCause::new(
            RootCauseCategory::People,
            "understaffed team",
            Confidence::new(0.7).unwrap(),
            weight,
        )
    }

    #[test]
    fn test_valid_gap_passes() {
        let gap = Gap::new("proj-1", GapType::Resource, SeverityLevel::High, Confidence::new(0.8).unwrap())
            .with_values(3.0, 5.0)
            .with_root_cause(cause(0.6))
            .with_root_cause(cause(0.4))
            .with_affected_area(AffectedArea::new("backend team", ImpactLevel::Major));

        assert!(gap.validate().is_ok());
    }

    #[test]
    fn test_collects_all_errors_with_paths() {
        let mut gap = Gap::new(" ", GapType::Resource, SeverityLevel::High, Confidence::ZERO)
            .with_root_cause(cause(1.5).with_evidence(""))
            .with_affected_area(AffectedArea::new("", ImpactLevel::Minor));
        gap.variance = f64::NAN;

        let errors = gap.validate().unwrap_err();
        let fields = errors.fields();

        assert!(fields.contains(&"project_id"));
        assert!(fields.contains(&"variance"));
        assert!(fields.contains(&"root_causes[0].contribution_weight"));
        assert!(fields.contains(&"root_causes[0].evidence[0]"));
        assert!(fields.contains(&"root_causes"));
        assert!(fields.contains(&"affected_areas[0].name"));
    }

    #[test]
    fn test_weight_sum_over_one_rejected() {
        let gap = Gap::new("p", GapType::Process, SeverityLevel::Low, Confidence::ZERO)
            .with_root_cause(cause(0.7))
            .with_root_cause(cause(0.7));

        let errors = gap.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.errors[0].code, "weight_sum");
    }

    #[test]
    fn test_display_joins_messages() {
        let mut errors = ValidationErrors::new();
        errors.push("a", "blank", "a is blank");
        errors.push("b", "out_of_range", "b too big");
        assert_eq!(errors.to_string(), "a: a is blank; b: b too big");
    }
}
