//! Multi-factor gap priority scoring with BinaryHeap
//!
//! Computes priority scores for gaps based on:
//! - Severity (Low/Medium/High/Critical)
//! - Estimated impact (Negligible .. Severe)
//! - Relative variance (distance from target, capped at 100%)
//! - Confidence (more certain gaps rank higher)

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::types::{Gap, ImpactLevel, Priority, SeverityLevel};

const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Scoring configuration for multi-factor gap priority
///
/// All weights must sum to 1.0 for normalized scoring.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Weight for severity factor (default: 0.45)
    pub severity_weight: f64,
    /// Weight for impact factor (default: 0.25)
    pub impact_weight: f64,
    /// Weight for relative variance factor (default: 0.2)
    pub variance_weight: f64,
    /// Weight for confidence factor (default: 0.1)
    pub confidence_weight: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            severity_weight: 0.45,
            impact_weight: 0.25,
            variance_weight: 0.2,
            confidence_weight: 0.1,
        }
    }
}

impl ScoringConfig {
    /// Checks each weight is in [0, 1] and that they sum to 1.
    pub fn validate(&self) -> Result<()> {
        let weights = [
            ("severity_weight", self.severity_weight),
            ("impact_weight", self.impact_weight),
            ("variance_weight", self.variance_weight),
            ("confidence_weight", self.confidence_weight),
        ];

        for (name, weight) in weights {
            if !(0.0..=1.0).contains(&weight) {
                return Err(CoreError::InvalidConfig(format!(
                    "{} must be between 0 and 1, got {}",
                    name, weight
                )));
            }
        }

        let sum: f64 = weights.iter().map(|(_, w)| w).sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(CoreError::InvalidConfig(format!(
                "scoring weights must sum to 1.0, got {:.4}",
                sum
            )));
        }
        Ok(())
    }
}

fn severity_score(severity: SeverityLevel) -> f64 {
    match severity {
        SeverityLevel::Low => 0.25,
        SeverityLevel::Medium => 0.5,
        SeverityLevel::High => 0.75,
        SeverityLevel::Critical => 1.0,
    }
}

fn impact_score(impact: ImpactLevel) -> f64 {
    match impact {
        ImpactLevel::Negligible => 0.0,
        ImpactLevel::Minor => 0.25,
        ImpactLevel::Moderate => 0.5,
        ImpactLevel::Major => 0.75,
        ImpactLevel::Severe => 1.0,
    }
}

/// Distance from target relative to the target, capped at 1.
///
/// With a zero target the absolute variance is used instead.
pub fn relative_variance(gap: &Gap) -> f64 {
    if !gap.variance.is_finite() {
        return 0.0;
    }
    let variance = gap.variance.abs();
    let target = gap.target_value.abs();
    if target > f64::EPSILON {
        (variance / target).min(1.0)
    } else {
        variance.min(1.0)
    }
}

/// Compute multi-factor priority score for a gap
///
/// Returns a score in range [0.0, 1.0] where higher = higher priority.
pub fn compute_gap_score(gap: &Gap, config: &ScoringConfig) -> f64 {
    let score = severity_score(gap.severity) * config.severity_weight
        + impact_score(gap.estimated_impact) * config.impact_weight
        + relative_variance(gap) * config.variance_weight
        + gap.confidence.get() * config.confidence_weight;

    score.clamp(0.0, 1.0)
}

impl Priority {
    /// Maps a [0, 1] score onto a priority band.
    pub fn from_score(score: f64) -> Self {
        if score >= 0.75 {
            Priority::Urgent
        } else if score >= 0.5 {
            Priority::High
        } else if score >= 0.25 {
            Priority::Medium
        } else {
            Priority::Low
        }
    }
}

/// A gap with its computed priority.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PrioritizedGap {
    pub gap: Gap,
    pub score: f64,
    pub priority: Priority,
}

impl PrioritizedGap {
    pub fn new(gap: Gap, config: &ScoringConfig) -> Self {
        let score = compute_gap_score(&gap, config);
        Self {
            gap,
            score,
            priority: Priority::from_score(score),
        }
    }
}

impl Eq for PrioritizedGap {}

impl PartialOrd for PrioritizedGap {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PrioritizedGap {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is max-heap: largest element per Ord comes out first
        match self.score.partial_cmp(&other.score) {
            Some(Ordering::Equal) | None => self
                .gap
                .severity
                .cmp(&other.gap.severity)
                // Tiebreaker: older gaps first
                .then_with(|| other.gap.identified_at.cmp(&self.gap.identified_at)),
            Some(order) => order,
        }
    }
}

/// Priority queue for gaps
///
/// Provides efficient access to highest priority gaps using BinaryHeap.
pub struct PriorityQueue {
    inner: BinaryHeap<PrioritizedGap>,
    config: ScoringConfig,
}

impl PriorityQueue {
    /// Create empty priority queue
    pub fn new(config: ScoringConfig) -> Self {
        Self {
            inner: BinaryHeap::new(),
            config,
        }
    }

    /// Scores a gap and pushes it into the queue
    pub fn push(&mut self, gap: Gap) {
        self.inner.push(PrioritizedGap::new(gap, &self.config));
    }

    /// Pop highest priority gap
    ///
    /// Returns None if queue is empty.
    pub fn pop(&mut self) -> Option<PrioritizedGap> {
        self.inner.pop()
    }

    /// Peek at highest priority gap without removing
    pub fn peek(&self) -> Option<&PrioritizedGap> {
        self.inner.peek()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Drains the queue highest priority first.
    pub fn into_sorted_vec(self) -> Vec<PrioritizedGap> {
        let mut sorted = self.inner.into_sorted_vec();
        sorted.reverse();
        sorted
    }
}

impl Default for PriorityQueue {
    fn default() -> Self {
        Self::new(ScoringConfig::default())
    }
}

impl Extend<Gap> for PriorityQueue {
    fn extend<I: IntoIterator<Item = Gap>>(&mut self, iter: I) {
        for gap in iter {
            self.push(gap);
        }
    }
}

/// Scores gaps and returns them highest priority first.
pub fn prioritize(gaps: impl IntoIterator<Item = Gap>, config: &ScoringConfig) -> Vec<PrioritizedGap> {
    let mut queue = PriorityQueue::new(config.clone());
    queue.extend(gaps);
    queue.into_sorted_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Confidence, GapType};
    use chrono::{Duration, Utc};

    fn make_test_gap(severity: SeverityLevel, current: f64, target: f64, confidence: f64) -> Gap {
        Gap::new("p", GapType::Process, severity, Confidence::new(confidence).unwrap())
            .with_values(current, target)
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(ScoringConfig::default().validate().is_ok());
    }

    #[test]
    fn test_config_rejects_bad_sum() {
        let config = ScoringConfig {
            severity_weight: 0.9,
            ..ScoringConfig::default()
        };
        assert!(matches!(config.validate(), Err(CoreError::InvalidConfig(_))));
    }

    #[test]
    fn test_config_rejects_negative_weight() {
        let config = ScoringConfig {
            severity_weight: 0.55,
            impact_weight: 0.35,
            variance_weight: 0.2,
            confidence_weight: -0.1,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_higher_severity_scores_higher() {
        let config = ScoringConfig::default();
        let critical = make_test_gap(SeverityLevel::Critical, 5.0, 10.0, 0.5);
        let low = make_test_gap(SeverityLevel::Low, 5.0, 10.0, 0.5);

        assert!(compute_gap_score(&critical, &config) > compute_gap_score(&low, &config));
    }

    #[test]
    fn test_larger_variance_scores_higher() {
        let config = ScoringConfig::default();
        let near = make_test_gap(SeverityLevel::Medium, 9.0, 10.0, 0.5);
        let far = make_test_gap(SeverityLevel::Medium, 2.0, 10.0, 0.5);

        assert!(compute_gap_score(&far, &config) > compute_gap_score(&near, &config));
    }

    #[test]
    fn test_relative_variance_capped() {
        let gap = make_test_gap(SeverityLevel::Low, 50.0, 10.0, 0.5);
        assert_eq!(relative_variance(&gap), 1.0);

        let zero_target = make_test_gap(SeverityLevel::Low, 0.3, 0.0, 0.5);
        assert!((relative_variance(&zero_target) - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_weight_changes_affect_score() {
        let config = ScoringConfig {
            severity_weight: 1.0,
            impact_weight: 0.0,
            variance_weight: 0.0,
            confidence_weight: 0.0,
        };
        let gap = make_test_gap(SeverityLevel::Critical, 0.0, 0.0, 0.0);
        assert_eq!(compute_gap_score(&gap, &config), 1.0);
    }

    #[test]
    fn test_score_always_in_range() {
        let config = ScoringConfig::default();
        let max_gap = make_test_gap(SeverityLevel::Critical, -1000.0, 1.0, 1.0);
        let min_gap = make_test_gap(SeverityLevel::Low, 1.0, 1.0, 0.0)
            .with_impact(ImpactLevel::Negligible);

        for gap in [max_gap, min_gap] {
            let score = compute_gap_score(&gap, &config);
            assert!((0.0..=1.0).contains(&score));
        }
    }

    #[test]
    fn test_priority_bands() {
        assert_eq!(Priority::from_score(0.9), Priority::Urgent);
        assert_eq!(Priority::from_score(0.75), Priority::Urgent);
        assert_eq!(Priority::from_score(0.6), Priority::High);
        assert_eq!(Priority::from_score(0.3), Priority::Medium);
        assert_eq!(Priority::from_score(0.1), Priority::Low);
    }

    #[test]
    fn test_priority_queue_returns_highest_priority_first() {
        let mut queue = PriorityQueue::default();
        queue.push(make_test_gap(SeverityLevel::Low, 5.0, 10.0, 0.5));
        queue.push(make_test_gap(SeverityLevel::Critical, 5.0, 10.0, 0.5));
        queue.push(make_test_gap(SeverityLevel::Medium, 5.0, 10.0, 0.5));

        assert_eq!(queue.len(), 3);
        assert_eq!(queue.pop().unwrap().gap.severity, SeverityLevel::Critical);
        assert_eq!(queue.pop().unwrap().gap.severity, SeverityLevel::Medium);
        assert_eq!(queue.pop().unwrap().gap.severity, SeverityLevel::Low);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_priority_queue_tiebreaker_by_age() {
        let now = Utc::now();
        let new_gap = make_test_gap(SeverityLevel::Medium, 5.0, 10.0, 0.5).identified_at(now);
        let old_gap = make_test_gap(SeverityLevel::Medium, 5.0, 10.0, 0.5)
            .identified_at(now - Duration::days(10));
        let old_id = old_gap.id;

        let mut queue = PriorityQueue::default();
        queue.push(new_gap);
        queue.push(old_gap);

        assert_eq!(queue.pop().unwrap().gap.id, old_id);
    }

    #[test]
    fn test_prioritize_sorted_descending() {
        let ranked = prioritize(
            vec![
                make_test_gap(SeverityLevel::Low, 9.0, 10.0, 0.2),
                make_test_gap(SeverityLevel::Critical, 1.0, 10.0, 0.9),
                make_test_gap(SeverityLevel::High, 5.0, 10.0, 0.5),
            ],
            &ScoringConfig::default(),
        );

        assert_eq!(ranked.len(), 3);
        assert!(ranked.windows(2).all(|w| w[0].score >= w[1].score));
        assert_eq!(ranked[0].gap.severity, SeverityLevel::Critical);
        assert_eq!(ranked[0].priority, Priority::Urgent);
    }
}
