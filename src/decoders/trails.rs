//! Trail-making scoring
//!
//! Visuomotor sequencing task with two conditions (trails A and B). Each
//! `trails` trial reports its condition in `trailsType` and its completion time
//! in `time_elapsed` (milliseconds).

use crate::decoders::TaskDecoder;
use crate::schema::{fields, TaskData};
use crate::types::Metrics;
use tracing::debug;

/// Trial type of completed trails
pub const TRAILS_TRIAL_TYPE: &str = "trails";

/// Conditions included in the fixed key set
pub const TRAILS_CONDITIONS: [&str; 2] = ["A", "B"];

/// Decoder for the trail-making task
pub struct TrailScoreDecoder;

impl TrailScoreDecoder {
    pub const DEFAULT_LABEL: &'static str = "Grid";

    /// Completion time per condition in seconds, and its inverse so that
    /// higher is better.
    ///
    /// A repeated condition overwrites the earlier one. Only the sentinel
    /// case guarantees the full key set; a completed log yields keys for the
    /// conditions it contains.
    pub fn decode(data: &TaskData, label: &str) -> Metrics {
        let Some(events) = data.events() else {
            return Metrics::nulls(Self::keys(label));
        };

        let mut metrics = Metrics::new();
        for event in events {
            if event.trial_type() != Some(TRAILS_TRIAL_TYPE) {
                continue;
            }
            let (Some(condition), Some(elapsed_ms)) = (
                event.str_field(fields::TRAILS_TYPE),
                event.f64_field(fields::TIME_ELAPSED),
            ) else {
                debug!("trails trial without trailsType or time_elapsed, skipping");
                continue;
            };

            let secs = elapsed_ms / 1000.0;
            metrics.insert(secs_key(label, condition), Some(secs));
            metrics.insert(secsinv_key(label, condition), inverse(secs));
        }
        metrics
    }

    /// Fixed key set for a label
    pub fn keys(label: &str) -> Vec<String> {
        let secs = TRAILS_CONDITIONS.iter().map(|c| secs_key(label, c));
        let inv = TRAILS_CONDITIONS.iter().map(|c| secsinv_key(label, c));
        secs.chain(inv).collect()
    }
}

impl TaskDecoder for TrailScoreDecoder {
    fn default_label(&self) -> &'static str {
        Self::DEFAULT_LABEL
    }

    fn metric_keys(&self, label: &str) -> Vec<String> {
        Self::keys(label)
    }

    fn decode(&self, data: &TaskData, label: &str) -> Metrics {
        Self::decode(data, label)
    }
}

fn secs_key(label: &str, condition: &str) -> String {
    format!("{label}{condition}_secs")
}

fn secsinv_key(label: &str, condition: &str) -> String {
    format!("{label}{condition}_secsinv")
}

/// `1 / secs`, null for a zero completion time
fn inverse(secs: f64) -> Option<f64> {
    if secs == 0.0 {
        debug!("zero elapsed time, inverse is undefined");
        return None;
    }
    Some(1.0 / secs)
}
