//! Gap analysis service.
//!
//! One call handles one request start to finish: validate, fetch project
//! state, detect gaps, filter, prioritize, map. The service holds no mutable
//! state, so a single instance can serve concurrent requests.

use std::sync::Arc;

use chrono::Utc;
use stratibreak_core::transform::UNASSIGNED_PROJECT;
use stratibreak_core::{
    categorize, map_result, prioritize, CategorizedGaps, Gap, RawGap, Validate,
};

use crate::config::StratibreakConfig;
use crate::detect::GapDetector;
use crate::request::{GapAnalysisRequest, GapAnalysisResponse};
use crate::source::ProjectStateSource;
use crate::{AnalysisError, Result};

/// Orchestrates gap analysis over a project state source.
#[derive(Clone)]
pub struct GapAnalysisService {
    source: Arc<dyn ProjectStateSource>,
    config: StratibreakConfig,
    detector: GapDetector,
}

impl GapAnalysisService {
    /// Creates a service; fails when the configuration is inconsistent.
    pub fn new(source: Arc<dyn ProjectStateSource>, config: StratibreakConfig) -> Result<Self> {
        config.validate()?;
        let detector = GapDetector::new(config.detection.clone());
        Ok(Self {
            source,
            config,
            detector,
        })
    }

    pub fn config(&self) -> &StratibreakConfig {
        &self.config
    }

    /// Runs a full analysis for one project.
    ///
    /// # Errors
    /// - `AnalysisError::Validation` when the request or fetched state is invalid
    /// - `AnalysisError::ProjectNotFound` when the source knows no such project
    /// - any error the source reports
    #[tracing::instrument(name = "analyze", skip_all, fields(project_id = %request.project_id))]
    pub async fn analyze(&self, request: &GapAnalysisRequest) -> Result<GapAnalysisResponse> {
        request.validate()?;

        tracing::info!(
            "Analyzing project {} via {} source",
            request.project_id,
            self.source.name()
        );

        let state = self
            .source
            .fetch(&request.project_id)
            .await?
            .ok_or_else(|| AnalysisError::ProjectNotFound(request.project_id.clone()))?;
        state.validate()?;

        let detected = self.detector.detect(&state);
        let detected_count = detected.len();
        let gaps: Vec<Gap> = detected.into_iter().filter(|g| request.accepts(g)).collect();
        if gaps.len() < detected_count {
            tracing::debug!(
                "Filters kept {} of {} detected gaps",
                gaps.len(),
                detected_count
            );
        }

        let baseline = (!request.baseline_gaps.is_empty())
            .then(|| categorize(request.baseline_gaps.iter().cloned()));

        let mut response = self.build_response(&request.project_id, gaps, baseline.as_ref());
        response.source_tool = state.source_tool;
        Ok(response)
    }

    /// Maps caller-provided gaps without detection.
    pub fn analyze_gaps(
        &self,
        project_id: &str,
        gaps: Vec<Gap>,
        baseline: Option<&CategorizedGaps>,
    ) -> Result<GapAnalysisResponse> {
        for gap in &gaps {
            gap.validate()?;
        }
        Ok(self.build_response(project_id, gaps, baseline))
    }

    /// Converts exported gaps with the default policy, then maps them.
    ///
    /// The response carries the first gap's project id. Mixed projects are
    /// logged, not rejected.
    ///
    /// # Errors
    /// Returns `AnalysisError::Transform` for a gap without a recognised type.
    pub fn analyze_raw_gaps(&self, raw: Vec<RawGap>) -> Result<GapAnalysisResponse> {
        let mut gaps = Vec::with_capacity(raw.len());
        for (i, raw_gap) in raw.into_iter().enumerate() {
            let gap = raw_gap.into_gap().inspect_err(|e| {
                tracing::warn!("Raw gap #{} rejected: {}", i, e);
            })?;
            gaps.push(gap);
        }

        let project_id = gaps
            .first()
            .map(|g| g.project_id.clone())
            .unwrap_or_else(|| UNASSIGNED_PROJECT.to_string());
        let foreign = gaps.iter().filter(|g| g.project_id != project_id).count();
        if foreign > 0 {
            tracing::warn!(
                "{} of {} gaps belong to other projects than '{}'; summarizing them together",
                foreign,
                gaps.len(),
                project_id
            );
        }

        self.analyze_gaps(&project_id, gaps, None)
    }

    fn build_response(
        &self,
        project_id: &str,
        gaps: Vec<Gap>,
        baseline: Option<&CategorizedGaps>,
    ) -> GapAnalysisResponse {
        let prioritized = prioritize(gaps.iter().cloned(), &self.config.scoring);
        let result = map_result(gaps, baseline, self.config.summary.bucket_policy);

        tracing::info!(
            "Project {}: {} gaps ({} critical, {} high), most affected: {}",
            project_id,
            result.summary.total_gaps,
            result.summary.critical_gaps,
            result.summary.high_priority_gaps,
            result
                .summary
                .most_affected_category
                .map(|c| c.as_str())
                .unwrap_or("none")
        );

        GapAnalysisResponse {
            project_id: project_id.to_string(),
            source_tool: None,
            analyzed_at: Utc::now(),
            prioritized,
            result,
        }
    }
}
