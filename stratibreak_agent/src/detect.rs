//! Rule-based gap detection.
//!
//! A metric yields a gap when its relative shortfall against the target
//! exceeds the configured tolerance. Severity comes from threshold bands,
//! root causes from a static per-type table.

use chrono::{DateTime, Utc};
use stratibreak_core::transform::round_to;
use stratibreak_core::{
    AffectedArea, Confidence, Gap, GapType, ImpactLevel, RootCause, RootCauseCategory,
};

use crate::config::DetectionConfig;
use crate::request::{ProjectMetric, ProjectState};

/// Share of a gap's confidence carried over to its templated root causes.
const ROOT_CAUSE_CONFIDENCE_FACTOR: f64 = 0.8;

/// Templated root causes per gap type. Weights per type sum to 1.
fn root_cause_templates(gap_type: GapType) -> [(RootCauseCategory, &'static str, f64); 2] {
    use RootCauseCategory::*;

    match gap_type {
        GapType::Resource => [
            (Resource, "Insufficient capacity allocated to the work", 0.6),
            (People, "Unfilled or overloaded roles", 0.4),
        ],
        GapType::Process => [
            (Process, "Workflow steps skipped or applied inconsistently", 0.6),
            (Governance, "No owner enforcing the process", 0.4),
        ],
        GapType::Communication => [
            (Communication, "Status not shared across teams", 0.6),
            (Process, "Missing cadence for syncs and reviews", 0.4),
        ],
        GapType::Technology => [
            (Technology, "Tooling does not support the required workflow", 0.7),
            (Resource, "Insufficient investment in platform work", 0.3),
        ],
        GapType::Culture => [
            (People, "Low engagement or unclear expectations", 0.6),
            (Governance, "Incentives misaligned with goals", 0.4),
        ],
        GapType::Timeline => [
            (Process, "Estimates not grounded in historical throughput", 0.5),
            (External, "Dependencies delivered late", 0.5),
        ],
        GapType::Quality => [
            (Process, "Insufficient review and testing", 0.6),
            (People, "Skill gaps in the affected area", 0.4),
        ],
        GapType::Budget => [
            (Resource, "Spend outpacing the approved plan", 0.6),
            (Governance, "Weak change control over scope", 0.4),
        ],
        GapType::Skill => [
            (People, "Required competencies missing from the team", 0.7),
            (Resource, "No budget or time for training", 0.3),
        ],
        GapType::Governance => [
            (Governance, "Decision rights unclear", 0.6),
            (Communication, "Escalation paths not communicated", 0.4),
        ],
    }
}

/// Detects gaps in project-state snapshots.
#[derive(Clone, Debug, Default)]
pub struct GapDetector {
    config: DetectionConfig,
}

impl GapDetector {
    pub fn new(config: DetectionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    /// Shortfall relative to the target; positive means worse than target.
    ///
    /// With a zero target the absolute shortfall is used.
    pub fn shortfall_ratio(metric: &ProjectMetric) -> f64 {
        let shortfall = if metric.higher_is_better {
            metric.target - metric.current
        } else {
            metric.current - metric.target
        };

        let target = metric.target.abs();
        if target > f64::EPSILON {
            shortfall / target
        } else {
            shortfall
        }
    }

    /// Gaps for every metric that misses its target, in metric order.
    pub fn detect(&self, state: &ProjectState) -> Vec<Gap> {
        let at = Utc::now();
        let gaps: Vec<Gap> = state
            .metrics
            .iter()
            .filter_map(|metric| self.detect_metric(&state.project_id, metric, at))
            .collect();

        tracing::debug!(
            "Detected {} gaps from {} metrics for project {}",
            gaps.len(),
            state.metrics.len(),
            state.project_id
        );
        gaps
    }

    /// Gap for one metric, or None when within tolerance.
    pub fn detect_metric(
        &self,
        project_id: &str,
        metric: &ProjectMetric,
        at: DateTime<Utc>,
    ) -> Option<Gap> {
        let ratio = Self::shortfall_ratio(metric);
        if !ratio.is_finite() || ratio <= self.config.tolerance {
            return None;
        }

        let severity = self.config.thresholds.classify(ratio);
        let confidence =
            Confidence::coalesce(Some(metric.confidence.unwrap_or(self.config.default_confidence)));
        let impact = ImpactLevel::from_severity(severity);

        let direction = if metric.higher_is_better { "below" } else { "above" };
        let unit = metric.unit.as_deref().map(|u| format!(" {}", u)).unwrap_or_default();
        let title = format!("{} {} target", metric.name, direction);
        let description = format!(
            "{} is {}{} against a target of {}{} ({}% off)",
            metric.name,
            metric.current,
            unit,
            metric.target,
            unit,
            round_to(ratio * 100.0, 1)
        );
        let evidence = format!("{}: current {} vs target {}", metric.name, metric.current, metric.target);

        let mut gap = Gap::new(project_id, metric.gap_type, severity, confidence)
            .with_title(title, description)
            .with_values(metric.current, metric.target)
            .with_category(metric.category)
            .with_impact(impact)
            .with_affected_area(AffectedArea::new(metric.gap_type.as_str(), impact))
            .with_affected_area(AffectedArea::new(metric.category.as_str(), impact))
            .identified_at(at);

        let cause_confidence = Confidence::coalesce(Some(confidence.get() * ROOT_CAUSE_CONFIDENCE_FACTOR));
        for (category, text, weight) in root_cause_templates(metric.gap_type) {
            gap = gap.with_root_cause(
                RootCause::new(category, text, cause_confidence, weight).with_evidence(evidence.clone()),
            );
        }

        Some(gap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stratibreak_core::{SeverityLevel, Validate};

    #[test]
    fn test_templates_sum_to_one() {
        for gap_type in GapType::ALL {
            let sum: f64 = root_cause_templates(*gap_type).iter().map(|(_, _, w)| w).sum();
            assert!((sum - 1.0).abs() < 1e-9, "{} sums to {}", gap_type, sum);
        }
    }

    #[test]
    fn test_shortfall_ratio_directions() {
        let velocity = ProjectMetric::new("velocity", GapType::Process, 30.0, 40.0);
        assert!((GapDetector::shortfall_ratio(&velocity) - 0.25).abs() < 1e-12);

        let defects = ProjectMetric::new("defects", GapType::Quality, 15.0, 10.0).lower_is_better();
        assert!((GapDetector::shortfall_ratio(&defects) - 0.5).abs() < 1e-12);

        let zero_target = ProjectMetric::new("blockers", GapType::Process, 3.0, 0.0).lower_is_better();
        assert_eq!(GapDetector::shortfall_ratio(&zero_target), 3.0);
    }

    #[test]
    fn test_within_tolerance_is_not_a_gap() {
        let detector = GapDetector::default();
        let metric = ProjectMetric::new("velocity", GapType::Process, 39.0, 40.0);
        assert!(detector.detect_metric("p", &metric, Utc::now()).is_none());

        let overperforming = ProjectMetric::new("velocity", GapType::Process, 60.0, 40.0);
        assert!(detector.detect_metric("p", &overperforming, Utc::now()).is_none());
    }

    #[test]
    fn test_detected_gap_shape() {
        let detector = GapDetector::default();
        let metric = ProjectMetric::new("headcount", GapType::Resource, 4.0, 10.0).with_unit("FTE");
        let gap = detector.detect_metric("apollo", &metric, Utc::now()).unwrap();

        assert_eq!(gap.severity, SeverityLevel::Critical);
        assert_eq!(gap.gap_type, GapType::Resource);
        assert_eq!(gap.variance, 6.0);
        assert_eq!(gap.confidence.get(), 0.75);
        assert_eq!(gap.title, "headcount below target");
        assert_eq!(gap.description, "headcount is 4 FTE against a target of 10 FTE (60% off)");
        assert_eq!(gap.root_causes.len(), 2);
        assert_eq!(gap.affected_areas.len(), 2);
        assert!(gap.validate().is_ok());
    }

    #[test]
    fn test_metric_confidence_is_used() {
        let detector = GapDetector::default();
        let metric = ProjectMetric::new("spend", GapType::Budget, 130.0, 100.0)
            .lower_is_better()
            .with_confidence(0.5);
        let gap = detector.detect_metric("p", &metric, Utc::now()).unwrap();

        assert_eq!(gap.severity, SeverityLevel::High);
        assert_eq!(gap.confidence.get(), 0.5);
        assert!((gap.root_causes[0].confidence.get() - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_detect_keeps_metric_order() {
        let state = ProjectState::new("apollo")
            .with_metric(ProjectMetric::new("spend", GapType::Budget, 100.0, 100.0))
            .with_metric(ProjectMetric::new("coverage", GapType::Quality, 50.0, 80.0))
            .with_metric(ProjectMetric::new("headcount", GapType::Resource, 8.0, 10.0));

        let gaps = GapDetector::default().detect(&state);
        let types: Vec<GapType> = gaps.iter().map(|g| g.gap_type).collect();
        assert_eq!(types, vec![GapType::Quality, GapType::Resource]);
        assert!(gaps.iter().all(|g| g.project_id == "apollo"));
    }
}
