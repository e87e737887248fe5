//! Pure validation predicates.
//!
//! Every predicate is total: bad input yields `false`, never a panic.

use std::sync::OnceLock;

use regex::Regex;

use crate::types::{
    CriticalityLevel, GapType, ImpactLevel, Priority, RootCauseCategory, SeverityLevel,
};

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}$")
            .expect("email pattern is valid")
    })
}

pub fn is_email(value: &str) -> bool {
    email_regex().is_match(value.trim())
}

/// Hyphenated UUID of any version.
pub fn is_uuid(value: &str) -> bool {
    let value = value.trim();
    value.len() == 36 && uuid::Uuid::parse_str(value).is_ok()
}

/// Inclusive range check; NaN is never in range.
pub fn is_in_range(value: f64, min: f64, max: f64) -> bool {
    !value.is_nan() && value >= min && value <= max
}

pub fn is_confidence(value: f64) -> bool {
    is_in_range(value, 0.0, 1.0)
}

pub fn is_percentage(value: f64) -> bool {
    is_in_range(value, 0.0, 100.0)
}

pub fn is_contribution_weight(value: f64) -> bool {
    is_in_range(value, 0.0, 1.0)
}

pub fn is_non_blank(value: &str) -> bool {
    !value.trim().is_empty()
}

pub fn is_gap_type(value: &str) -> bool {
    value.parse::<GapType>().is_ok()
}

pub fn is_severity_level(value: &str) -> bool {
    value.parse::<SeverityLevel>().is_ok()
}

pub fn is_priority(value: &str) -> bool {
    value.parse::<Priority>().is_ok()
}

pub fn is_root_cause_category(value: &str) -> bool {
    value.parse::<RootCauseCategory>().is_ok()
}

pub fn is_impact_level(value: &str) -> bool {
    value.parse::<ImpactLevel>().is_ok()
}

pub fn is_criticality_level(value: &str) -> bool {
    value.parse::<CriticalityLevel>().is_ok()
}
