//! Spatial span scoring
//!
//! Spatial working-memory recall task. Each recall trial reports how many
//! locations were recalled correctly (`accuracy`) for a sequence of length
//! `set_size`. The score per set size is the mean accuracy divided by the set
//! size.

use crate::decoders::TaskDecoder;
use crate::schema::{fields, TaskData};
use crate::types::Metrics;
use tracing::debug;

/// Trial type of recall events
pub const RECALL_TRIAL_TYPE: &str = "spatial-span-recall";

/// Set sizes administered by the task
pub const SET_SIZES: [i64; 3] = [3, 4, 5];

/// Decoder for the spatial span task
pub struct SpanScoreDecoder;

impl SpanScoreDecoder {
    pub const DEFAULT_LABEL: &'static str = "SpatialSpan";

    pub fn decode(data: &TaskData, label: &str) -> Metrics {
        let Some(events) = data.events() else {
            return Metrics::nulls(Self::keys(label));
        };

        let mut bins: [Vec<f64>; 3] = Default::default();

        for event in events {
            if event.trial_type() != Some(RECALL_TRIAL_TYPE) {
                continue;
            }
            let Some(set_size) = event.int_field(fields::SET_SIZE) else {
                debug!("recall trial without set_size, skipping");
                continue;
            };
            let Some(bin) = SET_SIZES.iter().position(|&s| s == set_size) else {
                debug!(set_size, "recall trial with unrecognized set_size, skipping");
                continue;
            };
            match event.f64_field(fields::ACCURACY) {
                Some(accuracy) => bins[bin].push(accuracy),
                None => debug!(set_size, "recall trial without accuracy, skipping"),
            }
        }

        let mut metrics = Metrics::new();
        for (set_size, values) in SET_SIZES.iter().zip(bins.iter()) {
            metrics.insert(
                metric_key(label, *set_size),
                percent_accuracy(values, *set_size),
            );
        }
        metrics
    }

    /// Fixed key set for a label
    pub fn keys(label: &str) -> Vec<String> {
        SET_SIZES.iter().map(|&s| metric_key(label, s)).collect()
    }
}

impl TaskDecoder for SpanScoreDecoder {
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

fn metric_key(label: &str, set_size: i64) -> String {
    format!("{label}{set_size}_perc_accuracy")
}

/// Mean accuracy over set size, `None` for an empty bin.
///
/// Not clamped: accuracy values above the set size give results above 1.0.
fn percent_accuracy(values: &[f64], set_size: i64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    Some(mean / set_size as f64)
}
