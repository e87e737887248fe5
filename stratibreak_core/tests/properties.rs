//! Property tests for the result mapper.

use proptest::prelude::*;

use stratibreak_core::mapper::{average_confidence, count_by_severity};
use stratibreak_core::{
    categorize, summarize, BucketPolicy, CategorizedGaps, Confidence, Gap, GapType, SeverityLevel,
};

fn arb_gap() -> impl Strategy<Value = Gap> {
    (
        0..GapType::ALL.len(),
        0..SeverityLevel::ALL.len(),
        0.0f64..=1.0,
    )
        .prop_map(|(t, s, c)| {
            Gap::new(
                "prop",
                GapType::ALL[t],
                SeverityLevel::ALL[s],
                Confidence::new(c).unwrap(),
            )
        })
}

proptest! {
    #[test]
    fn prop_severity_histogram_counts_every_gap(gaps in prop::collection::vec(arb_gap(), 0..60)) {
        let total: usize = count_by_severity(&gaps).values().sum();
        prop_assert_eq!(total, gaps.len());
    }

    #[test]
    fn prop_average_confidence_in_unit_range(gaps in prop::collection::vec(arb_gap(), 0..60)) {
        let avg = average_confidence(&gaps);
        prop_assert!((0.0..=1.0).contains(&avg));
    }

    #[test]
    fn prop_categorize_then_flatten_keeps_multiset(gaps in prop::collection::vec(arb_gap(), 0..60)) {
        let categorized = categorize(gaps.clone());

        let mut before: Vec<_> = gaps.iter().map(|g| g.id).collect();
        let mut after: Vec<_> = categorized.flatten().iter().map(|g| g.id).collect();
        before.sort();
        after.sort();
        prop_assert_eq!(before, after);
    }

    #[test]
    fn prop_every_gap_in_matching_bucket(gaps in prop::collection::vec(arb_gap(), 0..60)) {
        let categorized = categorize(gaps);
        for (key, bucket) in categorized.iter() {
            prop_assert!(bucket.iter().all(|g| g.gap_type == key));
        }
    }

    #[test]
    fn prop_summary_total_matches_input(gaps in prop::collection::vec(arb_gap(), 0..60)) {
        let len = gaps.len();
        let summary = summarize(&categorize(gaps), BucketPolicy::AllCategories);
        prop_assert_eq!(summary.total_gaps, len);
        prop_assert!(summary.critical_gaps + summary.high_priority_gaps <= len);
    }
}

#[test]
fn test_equal_buckets_make_most_and_least_equal() {
    let gaps: Vec<Gap> = GapType::ALL
        .iter()
        .map(|t| Gap::new("p", *t, SeverityLevel::Low, Confidence::ZERO))
        .collect();
    let summary = summarize(&categorize(gaps), BucketPolicy::AllCategories);

    assert_eq!(summary.most_affected_category, summary.least_affected_category);
    assert_eq!(summary.most_affected_category, Some(GapType::Resource));
}

#[test]
fn test_empty_set_degenerate_tie() {
    let summary = summarize(&CategorizedGaps::empty(), BucketPolicy::AllCategories);
    assert_eq!(summary.most_affected_category, Some(GapType::Resource));
    assert_eq!(summary.least_affected_category, Some(GapType::Resource));
}
