//! Result mapper: bucketing, per-category metrics and the cross-category
//! summary.
//!
//! Every function here is pure. Output order is always the fixed key order
//! of [`GapType::ALL`], so identical input gives identical output.

pub mod metrics;
pub mod summary;

pub use metrics::{
    average_confidence, category_metrics, count_by_severity, primary_root_cause, trend,
    GapCategoryMetrics, Trend,
};
pub use summary::{
    least_affected_category, most_affected_category, summarize, AnalysisSummary, BucketPolicy,
};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::types::{Gap, GapType};

/// Gaps bucketed by type.
///
/// Always holds all ten keys in [`GapType::ALL`] order; empty buckets are
/// valid. Every gap sits in the bucket named by [`Gap::bucket`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(
    from = "IndexMap<GapType, Vec<Gap>>",
    into = "IndexMap<GapType, Vec<Gap>>"
)]
pub struct CategorizedGaps {
    buckets: IndexMap<GapType, Vec<Gap>>,
}

impl CategorizedGaps {
    /// Ten empty buckets.
    pub fn empty() -> Self {
        Self {
            buckets: GapType::ALL.iter().map(|t| (*t, Vec::new())).collect(),
        }
    }

    /// Buckets gaps by type, keeping their relative order.
    pub fn categorize(gaps: impl IntoIterator<Item = Gap>) -> Self {
        let mut categorized = Self::empty();
        for gap in gaps {
            categorized.insert(gap);
        }
        categorized
    }

    /// Accepts caller-bucketed gaps.
    ///
    /// Keys are normalised to the fixed order. A gap filed under the wrong key
    /// is moved to its own bucket.
    pub fn from_buckets(buckets: impl IntoIterator<Item = (GapType, Vec<Gap>)>) -> Self {
        let mut categorized = Self::empty();
        for (key, gaps) in buckets {
            for gap in gaps {
                if gap.bucket() != key {
                    tracing::warn!(
                        "Gap {} filed under '{}' belongs to '{}', re-bucketing",
                        gap.id,
                        key,
                        gap.bucket()
                    );
                }
                categorized.insert(gap);
            }
        }
        categorized
    }

    fn insert(&mut self, gap: Gap) {
        self.buckets.entry(gap.bucket()).or_default().push(gap);
    }

    /// Gaps in one bucket.
    pub fn get(&self, gap_type: GapType) -> &[Gap] {
        self.buckets.get(&gap_type).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Buckets in fixed key order.
    pub fn iter(&self) -> impl Iterator<Item = (GapType, &[Gap])> + '_ {
        self.buckets.iter().map(|(k, v)| (*k, v.as_slice()))
    }

    /// Buckets holding at least one gap, in fixed key order.
    pub fn non_empty(&self) -> impl Iterator<Item = (GapType, &[Gap])> + '_ {
        self.iter().filter(|(_, gaps)| !gaps.is_empty())
    }

    /// Number of buckets; always the ten keys of [`GapType::ALL`].
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Total number of gaps across all buckets.
    pub fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All gaps, bucket by bucket.
    pub fn flatten(&self) -> Vec<Gap> {
        self.buckets.values().flatten().cloned().collect()
    }

    /// Consumes the buckets, returning all gaps bucket by bucket.
    pub fn into_gaps(self) -> Vec<Gap> {
        self.buckets.into_values().flatten().collect()
    }
}

impl Default for CategorizedGaps {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<IndexMap<GapType, Vec<Gap>>> for CategorizedGaps {
    fn from(buckets: IndexMap<GapType, Vec<Gap>>) -> Self {
        Self::from_buckets(buckets)
    }
}

impl From<CategorizedGaps> for IndexMap<GapType, Vec<Gap>> {
    fn from(categorized: CategorizedGaps) -> Self {
        categorized.buckets
    }
}

impl FromIterator<Gap> for CategorizedGaps {
    fn from_iter<I: IntoIterator<Item = Gap>>(iter: I) -> Self {
        Self::categorize(iter)
    }
}

/// Shorthand for [`CategorizedGaps::categorize`].
pub fn categorize(gaps: impl IntoIterator<Item = Gap>) -> CategorizedGaps {
    CategorizedGaps::categorize(gaps)
}

/// Bucketed view, per-category metrics and summary of one analysis.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GapAnalysisResult {
    pub categorized: CategorizedGaps,
    pub metrics: IndexMap<GapType, GapCategoryMetrics>,
    pub summary: AnalysisSummary,
}

/// Maps an already-bucketed gap set.
pub fn map_categorized(
    categorized: CategorizedGaps,
    baseline: Option<&CategorizedGaps>,
    policy: BucketPolicy,
) -> GapAnalysisResult {
    let metrics = category_metrics(&categorized, baseline);
    let summary = summarize(&categorized, policy);
    GapAnalysisResult {
        categorized,
        metrics,
        summary,
    }
}

/// Buckets then maps a flat gap list.
pub fn map_result(
    gaps: impl IntoIterator<Item = Gap>,
    baseline: Option<&CategorizedGaps>,
    policy: BucketPolicy,
) -> GapAnalysisResult {
    map_categorized(categorize(gaps), baseline, policy)
}
