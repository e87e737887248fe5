//! Shared fixtures for agent integration tests.

#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use stratibreak_agent::{
    GapAnalysisService, InMemoryStateSource, ProjectMetric, ProjectState, StratibreakConfig,
};
use stratibreak_core::GapType;

/// Snapshot producing four gaps: resource (critical), process (medium),
/// quality (high) and communication (low). Spend is within tolerance.
pub fn apollo_state() -> ProjectState {
    let mut state = ProjectState::new("apollo")
        .with_metric(ProjectMetric::new("headcount", GapType::Resource, 4.0, 10.0).with_unit("FTE"))
        .with_metric(ProjectMetric::new("velocity", GapType::Process, 30.0, 40.0))
        .with_metric(ProjectMetric::new("open defects", GapType::Quality, 14.0, 10.0).lower_is_better())
        .with_metric(ProjectMetric::new("spend", GapType::Budget, 104.0, 100.0).lower_is_better())
        .with_metric(ProjectMetric::new("standup attendance", GapType::Communication, 9.0, 10.0));
    state.source_tool = Some("jira".to_string());
    state
}

pub fn memory_service(config: StratibreakConfig) -> GapAnalysisService {
    let source = Arc::new(InMemoryStateSource::with_states([apollo_state()]));
    GapAnalysisService::new(source, config).unwrap()
}

pub fn write_json(path: &Path, value: &impl serde::Serialize) {
    std::fs::write(path, serde_json::to_vec_pretty(value).unwrap()).unwrap();
}
