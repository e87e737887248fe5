//! Cross-category summary.
//!
//! Most/least affected category are the argmax/argmin over bucket sizes.
//! Ties always resolve to the first candidate in [`GapType::ALL`] order.

use serde::{Deserialize, Serialize};

use super::{metrics::average_confidence, CategorizedGaps};
use crate::types::{GapType, SeverityLevel};

/// Which buckets compete for most/least affected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BucketPolicy {
    /// All ten buckets compete; an empty bucket can be least affected.
    #[default]
    AllCategories,
    /// Only buckets holding gaps compete; no answer when all are empty.
    NonEmptyOnly,
}

/// Aggregate over all categories.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub total_gaps: usize,
    pub critical_gaps: usize,
    /// Gaps whose severity is exactly `high`
    pub high_priority_gaps: usize,
    /// Mean confidence over every gap, not over category means
    pub average_confidence: f64,
    pub most_affected_category: Option<GapType>,
    pub least_affected_category: Option<GapType>,
}

fn candidates(
    categorized: &CategorizedGaps,
    policy: BucketPolicy,
) -> impl Iterator<Item = (GapType, usize)> + '_ {
    categorized
        .iter()
        .filter(move |(_, gaps)| policy == BucketPolicy::AllCategories || !gaps.is_empty())
        .map(|(gap_type, gaps)| (gap_type, gaps.len()))
}

/// Bucket with the most gaps.
pub fn most_affected_category(categorized: &CategorizedGaps, policy: BucketPolicy) -> Option<GapType> {
    let mut best: Option<(GapType, usize)> = None;
    for (gap_type, count) in candidates(categorized, policy) {
        match best {
            Some((_, best_count)) if count <= best_count => {}
            _ => best = Some((gap_type, count)),
        }
    }
    best.map(|(gap_type, _)| gap_type)
}

/// Bucket with the fewest gaps.
pub fn least_affected_category(categorized: &CategorizedGaps, policy: BucketPolicy) -> Option<GapType> {
    let mut best: Option<(GapType, usize)> = None;
    for (gap_type, count) in candidates(categorized, policy) {
        match best {
            Some((_, best_count)) if count >= best_count => {}
            _ => best = Some((gap_type, count)),
        }
    }
    best.map(|(gap_type, _)| gap_type)
}

/// Summarises a bucketed gap set.
pub fn summarize(categorized: &CategorizedGaps, policy: BucketPolicy) -> AnalysisSummary {
    let all = categorized.flatten();
    let count_severity = |severity: SeverityLevel| all.iter().filter(|g| g.severity == severity).count();

    AnalysisSummary {
        total_gaps: all.len(),
        critical_gaps: count_severity(SeverityLevel::Critical),
        high_priority_gaps: count_severity(SeverityLevel::High),
        average_confidence: average_confidence(&all),
        most_affected_category: most_affected_category(categorized, policy),
        least_affected_category: least_affected_category(categorized, policy),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapper::categorize;
    use crate::types::{Confidence, Gap};

    fn gap(gap_type: GapType, severity: SeverityLevel) -> Gap {
        Gap::new("p", gap_type, severity, Confidence::new(0.5).unwrap())
    }

    fn example() -> CategorizedGaps {
        categorize(vec![
            gap(GapType::Resource, SeverityLevel::High),
            gap(GapType::Resource, SeverityLevel::Low),
            gap(GapType::Process, SeverityLevel::Critical),
        ])
    }

    #[test]
    fn test_all_categories_lets_empty_bucket_win_least() {
        let categorized = example();
        assert_eq!(
            least_affected_category(&categorized, BucketPolicy::AllCategories),
            Some(GapType::Communication)
        );
    }

    #[test]
    fn test_non_empty_only_ignores_empty_buckets() {
        let categorized = example();
        assert_eq!(
            least_affected_category(&categorized, BucketPolicy::NonEmptyOnly),
            Some(GapType::Process)
        );
        assert_eq!(
            most_affected_category(&categorized, BucketPolicy::NonEmptyOnly),
            Some(GapType::Resource)
        );
    }

    #[test]
    fn test_equal_buckets_resolve_to_first_key() {
        let empty = CategorizedGaps::empty();
        assert_eq!(most_affected_category(&empty, BucketPolicy::AllCategories), Some(GapType::Resource));
        assert_eq!(least_affected_category(&empty, BucketPolicy::AllCategories), Some(GapType::Resource));
        assert_eq!(most_affected_category(&empty, BucketPolicy::NonEmptyOnly), None);
        assert_eq!(least_affected_category(&empty, BucketPolicy::NonEmptyOnly), None);
    }

    #[test]
    fn test_tie_between_non_empty_buckets() {
        let categorized = categorize(vec![
            gap(GapType::Budget, SeverityLevel::Low),
            gap(GapType::Timeline, SeverityLevel::Low),
        ]);
        assert_eq!(
            most_affected_category(&categorized, BucketPolicy::NonEmptyOnly),
            Some(GapType::Timeline)
        );
    }

    #[test]
    fn test_summary_counts() {
        let summary = summarize(&example(), BucketPolicy::AllCategories);
        assert_eq!(summary.total_gaps, 3);
        assert_eq!(summary.critical_gaps, 1);
        assert_eq!(summary.high_priority_gaps, 1);
        assert!((summary.average_confidence - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_summary_of_nothing() {
        let summary = summarize(&CategorizedGaps::empty(), BucketPolicy::AllCategories);
        assert_eq!(summary.total_gaps, 0);
        assert_eq!(summary.average_confidence, 0.0);
    }
}
