//! Per-category metrics.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::CategorizedGaps;
use crate::types::{Gap, GapType, RootCauseCategory, SeverityLevel};

/// Arithmetic mean of gap confidences; 0.0 for an empty slice.
pub fn average_confidence(gaps: &[Gap]) -> f64 {
    if gaps.is_empty() {
        return 0.0;
    }
    let total: f64 = gaps.iter().map(|g| g.confidence.get()).sum();
    total / gaps.len() as f64
}

/// Histogram of severities. Severities that do not occur are absent.
pub fn count_by_severity(gaps: &[Gap]) -> BTreeMap<SeverityLevel, usize> {
    let mut counts = BTreeMap::new();
    for gap in gaps {
        *counts.entry(gap.severity).or_insert(0) += 1;
    }
    counts
}

/// Root cause category with the largest summed contribution weight.
///
/// Only categories that occur compete; ties go to the category declared
/// first in [`RootCauseCategory::ALL`].
pub fn primary_root_cause(gaps: &[Gap]) -> Option<RootCauseCategory> {
    let mut weights: BTreeMap<RootCauseCategory, f64> = BTreeMap::new();
    for cause in gaps.iter().flat_map(|g| g.root_causes.iter()) {
        *weights.entry(cause.category).or_insert(0.0) += cause.contribution_weight;
    }

    let mut best: Option<(RootCauseCategory, f64)> = None;
    for category in RootCauseCategory::ALL {
        let Some(&weight) = weights.get(category) else {
            continue;
        };
        match best {
            Some((_, best_weight)) if weight <= best_weight => {}
            _ => best = Some((*category, weight)),
        }
    }

    best.map(|(category, _)| category)
}

/// Direction of a category compared with a baseline analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Improving,
    Stable,
    Worsening,
}

impl Trend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Improving => "improving",
            Trend::Stable => "stable",
            Trend::Worsening => "worsening",
        }
    }
}

/// Compares a bucket with its baseline.
///
/// More gaps is worse. With equal counts the summed severity weight decides.
/// Without a baseline the trend is stable.
pub fn trend(current: &[Gap], baseline: Option<&[Gap]>) -> Trend {
    let Some(baseline) = baseline else {
        return Trend::Stable;
    };

    let severity_sum = |gaps: &[Gap]| -> u32 { gaps.iter().map(|g| g.severity.weight()).sum() };

    match current.len().cmp(&baseline.len()) {
        std::cmp::Ordering::Greater => Trend::Worsening,
        std::cmp::Ordering::Less => Trend::Improving,
        std::cmp::Ordering::Equal => match severity_sum(current).cmp(&severity_sum(baseline)) {
            std::cmp::Ordering::Greater => Trend::Worsening,
            std::cmp::Ordering::Less => Trend::Improving,
            std::cmp::Ordering::Equal => Trend::Stable,
        },
    }
}

/// Metrics for one category bucket. Derived, never persisted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GapCategoryMetrics {
    pub total_count: usize,
    pub by_severity: BTreeMap<SeverityLevel, usize>,
    pub average_confidence: f64,
    pub primary_root_cause: Option<RootCauseCategory>,
    pub trend: Trend,
}

impl GapCategoryMetrics {
    pub fn compute(gaps: &[Gap], baseline: Option<&[Gap]>) -> Self {
        Self {
            total_count: gaps.len(),
            by_severity: count_by_severity(gaps),
            average_confidence: average_confidence(gaps),
            primary_root_cause: primary_root_cause(gaps),
            trend: trend(gaps, baseline),
        }
    }
}

/// Metrics for every bucket, in fixed key order.
pub fn category_metrics(
    categorized: &CategorizedGaps,
    baseline: Option<&CategorizedGaps>,
) -> IndexMap<GapType, GapCategoryMetrics> {
    categorized
        .iter()
        .map(|(gap_type, gaps)| {
            let base = baseline.map(|b| b.get(gap_type));
            (gap_type, GapCategoryMetrics::compute(gaps, base))
        })
        .collect()
}
