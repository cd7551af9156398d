//! Pipeline orchestration
//!
//! This module provides the public API for scoring survey responses: each
//! bound task field is decoded, the results are merged by key union, and the
//! plan's relabel and delist steps are applied.

use crate::error::ScoreError;
use crate::plan::ScoringPlan;
use crate::schema::{ResponseAdapter, ResponseRecord};
use crate::types::{Metrics, ReportProducer, ScoreReport, ScoredResponse};
use crate::{PRODUCER_NAME, SCORE_VERSION};
use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

/// Score a response export with the default plan (stateless, one-shot).
///
/// Accepts a bare array of response records, the platform's
/// `{"responses": [...]}` wrapper, a single record, or NDJSON.
///
/// # Example
/// ```ignore
/// let report = score_responses_json(&export_json)?;
/// ```
pub fn score_responses_json(json: &str) -> Result<ScoreReport, ScoreError> {
    let records = ResponseAdapter::parse_document(json)?;
    Ok(ResponseScorer::default().score_batch(&records))
}

/// Scores survey responses against a fixed plan.
///
/// Holds no per-response state: scoring the same record twice gives the same
/// metrics, and records may be scored in any order.
#[derive(Debug, Clone)]
pub struct ResponseScorer {
    plan: ScoringPlan,
}

impl Default for ResponseScorer {
    fn default() -> Self {
        Self::new(ScoringPlan::default())
    }
}

impl ResponseScorer {
    pub fn new(plan: ScoringPlan) -> Self {
        Self { plan }
    }

    /// Build a scorer from a plan JSON document
    pub fn from_plan_json(json: &str) -> Result<Self, ScoreError> {
        Ok(Self::new(ScoringPlan::from_json(json)?))
    }

    pub fn plan(&self) -> &ScoringPlan {
        &self.plan
    }

    /// Score one response
    pub fn score(&self, record: &ResponseRecord) -> ScoredResponse {
        let mut metrics = Metrics::new();

        for binding in &self.plan.tasks {
            let data = record.task_data(&binding.field);
            if data.is_sentinel() {
                debug!(
                    response_id = record.response_id.as_deref().unwrap_or("-"),
                    field = %binding.field,
                    "task not completed"
                );
            }
            metrics.merge(binding.task.decode(&data, Some(binding.label())));
        }

        self.finish(&mut metrics);

        ScoredResponse {
            response_id: record.response_id.clone(),
            metrics,
        }
    }

    /// Score every response and stamp the batch with producer metadata
    pub fn score_batch(&self, records: &[ResponseRecord]) -> ScoreReport {
        let responses: Vec<ScoredResponse> = records.iter().map(|r| self.score(r)).collect();

        let report = ScoreReport {
            producer: ReportProducer {
                name: PRODUCER_NAME.to_string(),
                version: SCORE_VERSION.to_string(),
                run_id: Uuid::new_v4().to_string(),
            },
            computed_at: Utc::now(),
            responses,
        };

        info!(
            run_id = %report.producer.run_id,
            responses = report.responses.len(),
            tasks = self.plan.tasks.len(),
            "scored response batch"
        );
        report
    }

    /// Apply the plan's relabel then delist steps
    fn finish(&self, metrics: &mut Metrics) {
        let renames = self
            .plan
            .relabel
            .iter()
            .map(|(from, to)| (from.as_str(), to.as_str()));
        for from in metrics.rename_all(renames) {
            debug!(metric = %from, "relabel source not produced");
        }
        for key in &self.plan.delist {
            metrics.remove(key);
        }
    }
}
