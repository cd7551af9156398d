//! Information sampling task (IST) scoring
//!
//! Each trial lets the respondent open boxes before choosing a colour. Trials
//! run under one of two reward conditions: a win that decreases with every box
//! opened, or a fixed win. Per condition we report how much information was
//! sampled, how often the choice was wrong, and how long it took.

use crate::decoders::TaskDecoder;
use crate::schema::{fields, TaskData, TaskEvent};
use crate::types::Metrics;
use tracing::debug;

/// Reward condition of an IST trial
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IstCondition {
    DecreasingWin,
    FixedWin,
}

impl IstCondition {
    pub const ALL: [IstCondition; 2] = [IstCondition::DecreasingWin, IstCondition::FixedWin];

    pub fn as_str(&self) -> &'static str {
        match self {
            IstCondition::DecreasingWin => "DecreasingWin",
            IstCondition::FixedWin => "FixedWin",
        }
    }

    fn from_event(event: &TaskEvent) -> Self {
        if event.bool_field(fields::DECREASING) == Some(true) {
            IstCondition::DecreasingWin
        } else {
            IstCondition::FixedWin
        }
    }
}

const METRIC_SUFFIXES: [&str; 5] = [
    "trials",
    "mean_opens",
    "errors",
    "mean_choice_time",
    "mean_latency",
];

#[derive(Debug, Default)]
struct ConditionSample {
    opens: Vec<f64>,
    errors: u32,
    choice_times: Vec<f64>,
    latencies: Vec<f64>,
}

impl ConditionSample {
    fn add(&mut self, event: &TaskEvent, opens: usize) {
        self.opens.push(opens as f64);
        if event.correct() != Some(true) {
            self.errors += 1;
        }
        if let Some(rt) = event.rt() {
            self.choice_times.push(rt);
            if opens > 0 {
                self.latencies.push(rt / opens as f64);
            }
        }
    }

    fn values(&self) -> [Option<f64>; 5] {
        [
            Some(self.opens.len() as f64),
            mean(&self.opens),
            Some(f64::from(self.errors)),
            mean(&self.choice_times),
            mean(&self.latencies),
        ]
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

fn metric_key(condition: IstCondition, suffix: &str) -> String {
    format!("ist_{}_{}", condition.as_str(), suffix)
}

/// Decoder for the information sampling task.
///
/// Keys carry the fixed `ist_` prefix; the label is not applied.
pub struct IstScoreDecoder;

impl IstScoreDecoder {
    pub const DEFAULT_LABEL: &'static str = "IST";

    pub fn decode(data: &TaskData) -> Metrics {
        let Some(events) = data.events() else {
            return Metrics::nulls(Self::keys());
        };

        let mut decreasing = ConditionSample::default();
        let mut fixed = ConditionSample::default();

        for event in events {
            // Only choice records carry the list of opened boxes.
            let Some(opens) = event.array_len(fields::PRESSED) else {
                continue;
            };
            if opens == 0 {
                debug!("IST choice with no boxes opened, latency undefined");
            }
            match IstCondition::from_event(event) {
                IstCondition::DecreasingWin => decreasing.add(event, opens),
                IstCondition::FixedWin => fixed.add(event, opens),
            }
        }

        let mut metrics = Metrics::new();
        for (condition, sample) in [
            (IstCondition::DecreasingWin, &decreasing),
            (IstCondition::FixedWin, &fixed),
        ] {
            for (suffix, value) in METRIC_SUFFIXES.iter().zip(sample.values()) {
                metrics.insert(metric_key(condition, suffix), value);
            }
        }
        metrics
    }

    pub fn keys() -> Vec<String> {
        IstCondition::ALL
            .iter()
            .flat_map(|&c| METRIC_SUFFIXES.iter().map(move |s| metric_key(c, s)))
            .collect()
    }
}

impl TaskDecoder for IstScoreDecoder {
    fn default_label(&self) -> &'static str {
        Self::DEFAULT_LABEL
    }

    fn metric_keys(&self, _label: &str) -> Vec<String> {
        Self::keys()
    }

    fn decode(&self, data: &TaskData, _label: &str) -> Metrics {
        Self::decode(data)
    }
}
