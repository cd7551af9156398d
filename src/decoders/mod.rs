//! Task decoders
//!
//! Each decoder turns one task's raw event log into a fixed set of summary
//! metrics. Decoders are pure: no shared state, no I/O, and malformed input is
//! a defined degenerate result rather than an error.
//!
//! The set of decoders is closed. Task identifiers resolve to a [`TaskKind`]
//! through a static table, never by name-based lookup at call time.

mod delay_discounting;
mod gostop;
mod ist;
mod spatial_span;
mod trails;

pub use delay_discounting::{delay_hours, DelayDiscountingDecoder, DELAY_LADDER_HOURS};
pub use gostop::{GoStopScoreDecoder, GoStopTally, StimulusKind, GOSTOP_KEYS};
pub use ist::{IstCondition, IstScoreDecoder};
pub use spatial_span::SpanScoreDecoder;
pub use trails::TrailScoreDecoder;

use crate::error::ScoreError;
use crate::schema::TaskData;
use crate::types::Metrics;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Common interface of the task decoders
pub trait TaskDecoder {
    /// Label used when the caller does not supply one
    fn default_label(&self) -> &'static str;

    /// Keys produced for a label when the task was not completed
    fn metric_keys(&self, label: &str) -> Vec<String>;

    /// Score one task administration
    fn decode(&self, data: &TaskData, label: &str) -> Metrics;
}

/// Scorable task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TaskKind {
    SpatialSpan,
    Trails,
    GoStop,
    Ist,
    DelayDiscounting,
}

/// Task identifiers accepted in scoring plans and on the command line
const TASK_TABLE: &[(&str, TaskKind)] = &[
    ("SpatialSpan", TaskKind::SpatialSpan),
    ("TrailsAB", TaskKind::Trails),
    ("Trails", TaskKind::Trails),
    ("Grid", TaskKind::Trails),
    ("GoStop", TaskKind::GoStop),
    ("IST", TaskKind::Ist),
    ("DelayDiscounting", TaskKind::DelayDiscounting),
];

impl TaskKind {
    pub const ALL: [TaskKind; 5] = [
        TaskKind::SpatialSpan,
        TaskKind::Trails,
        TaskKind::GoStop,
        TaskKind::Ist,
        TaskKind::DelayDiscounting,
    ];

    /// Resolve a task identifier (exact, case-sensitive)
    pub fn from_id(id: &str) -> Option<Self> {
        TASK_TABLE
            .iter()
            .find(|(name, _)| *name == id)
            .map(|(_, kind)| *kind)
    }

    /// Canonical identifier, as used for the embedded-data field by default
    pub fn id(&self) -> &'static str {
        match self {
            TaskKind::SpatialSpan => "SpatialSpan",
            TaskKind::Trails => "TrailsAB",
            TaskKind::GoStop => "GoStop",
            TaskKind::Ist => "IST",
            TaskKind::DelayDiscounting => "DelayDiscounting",
        }
    }

    /// All identifiers that resolve to this task
    pub fn aliases(&self) -> impl Iterator<Item = &'static str> + '_ {
        TASK_TABLE
            .iter()
            .filter(move |(_, kind)| kind == self)
            .map(|(name, _)| *name)
    }

    pub fn decoder(&self) -> &'static dyn TaskDecoder {
        match self {
            TaskKind::SpatialSpan => &SpanScoreDecoder,
            TaskKind::Trails => &TrailScoreDecoder,
            TaskKind::GoStop => &GoStopScoreDecoder,
            TaskKind::Ist => &IstScoreDecoder,
            TaskKind::DelayDiscounting => &DelayDiscountingDecoder,
        }
    }

    pub fn default_label(&self) -> &'static str {
        self.decoder().default_label()
    }

    pub fn metric_keys(&self, label: &str) -> Vec<String> {
        self.decoder().metric_keys(label)
    }

    /// Score task data, falling back to the default label
    pub fn decode(&self, data: &TaskData, label: Option<&str>) -> Metrics {
        let decoder = self.decoder();
        decoder.decode(data, label.unwrap_or(decoder.default_label()))
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for TaskKind {
    type Err = ScoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_id(s).ok_or_else(|| ScoreError::UnknownTask(s.to_string()))
    }
}

impl TryFrom<String> for TaskKind {
    type Error = ScoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TaskKind> for String {
    fn from(kind: TaskKind) -> Self {
        kind.id().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case("SpatialSpan", TaskKind::SpatialSpan)]
    #[case("TrailsAB", TaskKind::Trails)]
    #[case("Grid", TaskKind::Trails)]
    #[case("GoStop", TaskKind::GoStop)]
    #[case("IST", TaskKind::Ist)]
    #[case("DelayDiscounting", TaskKind::DelayDiscounting)]
    fn test_from_id(#[case] id: &str, #[case] expected: TaskKind) {
        assert_eq!(TaskKind::from_id(id), Some(expected));
    }

    #[test]
    fn test_unknown_ids_do_not_resolve() {
        assert_eq!(TaskKind::from_id("gostop"), None);
        assert_eq!(TaskKind::from_id(""), None);
        assert!(matches!(
            "Stroop".parse::<TaskKind>(),
            Err(ScoreError::UnknownTask(ref id)) if id == "Stroop"
        ));
    }

    #[test]
    fn test_every_kind_roundtrips_through_its_id() {
        for kind in TaskKind::ALL {
            assert_eq!(TaskKind::from_id(kind.id()), Some(kind));
            assert!(kind.aliases().any(|a| a == kind.id()));
        }
    }

    #[test]
    fn test_serde_uses_ids() {
        let kind: TaskKind = serde_json::from_value(json!("TrailsAB")).unwrap();
        assert_eq!(kind, TaskKind::Trails);
        assert_eq!(serde_json::to_value(TaskKind::Ist).unwrap(), json!("IST"));
        assert!(serde_json::from_value::<TaskKind>(json!("Nope")).is_err());
    }

    #[test]
    fn test_default_labels() {
        assert_eq!(TaskKind::SpatialSpan.default_label(), "SpatialSpan");
        assert_eq!(TaskKind::Trails.default_label(), "Grid");
        assert_eq!(TaskKind::GoStop.default_label(), "GoStop");
    }

    #[test]
    fn test_sentinel_result_matches_declared_keys() {
        for kind in [TaskKind::SpatialSpan, TaskKind::Trails, TaskKind::Ist, TaskKind::DelayDiscounting] {
            let label = kind.default_label();
            let metrics = kind.decode(&TaskData::Sentinel, None);
            let keys: Vec<String> = metrics.keys().map(str::to_string).collect();
            let mut expected = kind.metric_keys(label);
            expected.sort();

            assert_eq!(keys, expected, "{kind}");
            assert!(metrics.iter().all(|(_, v)| v.is_none()));
        }

        // GoStop reports nothing at all for an incomplete task.
        assert!(TaskKind::GoStop.decode(&TaskData::Sentinel, None).is_empty());
    }

    #[test]
    fn test_decode_applies_label() {
        let data = TaskData::from_value(json!([
            { "trial_type": "trails", "trailsType": "B", "time_elapsed": 500 },
        ]));

        let metrics = TaskKind::Trails.decode(&data, Some("TMT"));
        assert_eq!(metrics.value("TMTB_secs"), Some(0.5));
        assert_eq!(metrics.value("TMTB_secsinv"), Some(2.0));

        let metrics = TaskKind::Trails.decode(&data, None);
        assert_eq!(metrics.value("GridB_secs"), Some(0.5));
    }
}
