//! GoStop (response inhibition) scoring
//!
//! Three stimulus conditions are interleaved with fixation records:
//!
//! - `novel`: respond only to the distractor; a correct response that is
//!   followed by an incorrect fixation record was withdrawn and counts as
//!   incorrect.
//! - `target`: respond as fast as possible; a response that lands in the
//!   following fixation record is late, and its reaction time is the
//!   fixation `rt` plus the stimulus presentation time.
//! - `stop`: a target that turns into a stop signal. It spans two records
//!   (the go phase and the stop phase) followed by a fixation record; a
//!   response in any of the three makes the trial incorrect.
//!
//! Classification needs up to two records of lookahead, and the stop phase
//! record is consumed by its `stop` event rather than classified on its own.

use crate::decoders::TaskDecoder;
use crate::schema::{TaskData, TaskEvent};
use crate::types::Metrics;
use tracing::debug;

/// Stimulus presentation time added to responses recorded in the fixation
/// that follows a target (milliseconds)
pub const LATE_RESPONSE_OFFSET_MS: f64 = 500.0;

/// Output keys, in emission order
pub const GOSTOP_KEYS: [&str; 12] = [
    "gs_novel_total",
    "gs_novel_correct",
    "gs_novel_incorrect",
    "gs_target_total",
    "gs_target_correct",
    "gs_target_late",
    "gs_target_incorrect",
    "gs_stop_total",
    "gs_stop_correct",
    "gs_stop_incorrect",
    "gs_mean_reaction_time",
    "gs_stop_incorrect_ratio",
];

/// Stimulus condition of a GoStop record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StimulusKind {
    Novel,
    Target,
    Stop,
}

impl StimulusKind {
    pub fn from_event(event: &TaskEvent) -> Option<Self> {
        match event.kind()? {
            "novel" => Some(StimulusKind::Novel),
            "target" => Some(StimulusKind::Target),
            "stop" => Some(StimulusKind::Stop),
            _ => None,
        }
    }

    /// Number of records this stimulus occupies, itself included
    fn span(self) -> usize {
        match self {
            StimulusKind::Stop => 2,
            StimulusKind::Novel | StimulusKind::Target => 1,
        }
    }
}

/// Trial counts and reaction-time sample accumulated over one log
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GoStopTally {
    pub novel_total: u32,
    pub novel_correct: u32,
    pub novel_incorrect: u32,
    pub target_total: u32,
    pub target_correct: u32,
    pub target_late: u32,
    pub target_incorrect: u32,
    pub stop_total: u32,
    pub stop_correct: u32,
    pub stop_incorrect: u32,
    /// Target reaction times in milliseconds, late responses included
    pub reaction_times: Vec<f64>,
}

impl GoStopTally {
    /// Walk the log once with a cursor.
    ///
    /// The cursor advances by one record, or by two after a `stop` so that its
    /// stop-phase record is never classified independently. Lookahead past
    /// the end reads as "no response".
    pub fn from_events(events: &[TaskEvent]) -> Self {
        let mut tally = Self::default();
        let mut cursor = 0;

        while cursor < events.len() {
            let event = &events[cursor];
            let next = events.get(cursor + 1);
            let next2 = events.get(cursor + 2);

            let Some(kind) = StimulusKind::from_event(event) else {
                cursor += 1;
                continue;
            };

            match kind {
                StimulusKind::Novel => tally.record_novel(event, next),
                StimulusKind::Target => tally.record_target(event, next),
                StimulusKind::Stop => tally.record_stop(event, next, next2),
            }
            cursor += kind.span();
        }

        tally
    }

    fn record_novel(&mut self, event: &TaskEvent, next: Option<&TaskEvent>) {
        self.novel_total += 1;
        match event.correct() {
            Some(true) if responded_in(next) => self.novel_incorrect += 1,
            Some(true) => self.novel_correct += 1,
            Some(false) => self.novel_incorrect += 1,
            None => debug!("novel record without correct flag, counted in total only"),
        }
    }

    fn record_target(&mut self, event: &TaskEvent, next: Option<&TaskEvent>) {
        self.target_total += 1;
        if event.correct() == Some(true) {
            self.target_correct += 1;
            match event.rt() {
                Some(rt) => self.reaction_times.push(rt),
                None => debug!("correct target without rt, no reaction time recorded"),
            }
            return;
        }

        match next {
            Some(fixation) if fixation.is_incorrect() => {
                self.target_late += 1;
                match fixation.rt() {
                    Some(rt) => self.reaction_times.push(rt + LATE_RESPONSE_OFFSET_MS),
                    None => debug!("late target without fixation rt, no reaction time recorded"),
                }
            }
            _ => self.target_incorrect += 1,
        }
    }

    fn record_stop(
        &mut self,
        event: &TaskEvent,
        next: Option<&TaskEvent>,
        next2: Option<&TaskEvent>,
    ) {
        self.stop_total += 1;
        // Go phase, stop phase, then trailing fixation.
        if event.is_incorrect() || responded_in(next) || responded_in(next2) {
            self.stop_incorrect += 1;
        } else {
            self.stop_correct += 1;
        }
    }

    pub fn mean_reaction_time(&self) -> Option<f64> {
        if self.reaction_times.is_empty() {
            return None;
        }
        Some(self.reaction_times.iter().sum::<f64>() / self.reaction_times.len() as f64)
    }

    /// `stop_incorrect / stop_total`, null when no stop trials were seen
    pub fn stop_incorrect_ratio(&self) -> Option<f64> {
        if self.stop_total == 0 {
            return None;
        }
        Some(f64::from(self.stop_incorrect) / f64::from(self.stop_total))
    }

    /// Convert to metrics.
    ///
    /// Without any target reaction time the result is empty: all keys are
    /// present together or none are.
    pub fn to_metrics(&self) -> Metrics {
        let Some(mean_rt) = self.mean_reaction_time() else {
            return Metrics::new();
        };

        let counts = [
            self.novel_total,
            self.novel_correct,
            self.novel_incorrect,
            self.target_total,
            self.target_correct,
            self.target_late,
            self.target_incorrect,
            self.stop_total,
            self.stop_correct,
            self.stop_incorrect,
        ];
        let values = counts
            .into_iter()
            .map(|c| Some(f64::from(c)))
            .chain([Some(mean_rt), self.stop_incorrect_ratio()]);

        GOSTOP_KEYS
            .iter()
            .map(|k| k.to_string())
            .zip(values)
            .collect()
    }
}

/// Whether a lookahead record shows a response (`correct == false`)
fn responded_in(event: Option<&TaskEvent>) -> bool {
    event.is_some_and(TaskEvent::is_incorrect)
}

/// Decoder for the GoStop task.
///
/// Keys carry the fixed `gs_` prefix; the label is not applied.
pub struct GoStopScoreDecoder;

impl GoStopScoreDecoder {
    pub const DEFAULT_LABEL: &'static str = "GoStop";

    pub fn decode(data: &TaskData) -> Metrics {
        match data.events() {
            Some(events) => GoStopTally::from_events(events).to_metrics(),
            None => Metrics::new(),
        }
    }
}

impl TaskDecoder for GoStopScoreDecoder {
    fn default_label(&self) -> &'static str {
        Self::DEFAULT_LABEL
    }

    fn metric_keys(&self, _label: &str) -> Vec<String> {
        GOSTOP_KEYS.iter().map(|k| k.to_string()).collect()
    }

    fn decode(&self, data: &TaskData, _label: &str) -> Metrics {
        Self::decode(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn data(value: serde_json::Value) -> TaskData {
        TaskData::from_value(value)
    }

    fn tally(value: serde_json::Value) -> GoStopTally {
        GoStopTally::from_events(data(value).events().unwrap())
    }

    #[test]
    fn test_single_correct_target() {
        let metrics = GoStopScoreDecoder::decode(&data(json!([
            { "type": "target", "correct": true, "rt": 400 },
        ])));

        assert_eq!(metrics.len(), 12);
        assert_eq!(metrics.value("gs_target_total"), Some(1.0));
        assert_eq!(metrics.value("gs_target_correct"), Some(1.0));
        assert_eq!(metrics.value("gs_mean_reaction_time"), Some(400.0));
        assert_eq!(metrics.value("gs_stop_total"), Some(0.0));
        assert_eq!(metrics.get("gs_stop_incorrect_ratio"), Some(None));
    }

    #[test]
    fn test_no_reaction_times_gives_empty_result() {
        let metrics = GoStopScoreDecoder::decode(&data(json!([
            { "type": "novel", "correct": true },
            { "type": "fixation", "correct": true },
            { "type": "novel", "correct": true },
        ])));

        assert!(metrics.is_empty());
    }

    #[test]
    fn test_sentinel_gives_empty_result() {
        assert!(GoStopScoreDecoder::decode(&data(json!(-1))).is_empty());
        assert!(GoStopScoreDecoder::decode(&data(json!([]))).is_empty());
    }

    #[test]
    fn test_novel_withdrawn_response_is_incorrect() {
        let t = tally(json!([
            { "type": "novel", "correct": true },
            { "type": "fixation", "correct": false },
            { "type": "novel", "correct": true },
            { "type": "fixation", "correct": true },
            { "type": "novel", "correct": false },
            { "type": "novel", "correct": true },
        ]));

        assert_eq!(t.novel_total, 4);
        assert_eq!(t.novel_correct, 2);
        assert_eq!(t.novel_incorrect, 2);
    }

    #[test]
    fn test_novel_without_correct_only_counts_total() {
        let t = tally(json!([{ "type": "novel" }]));

        assert_eq!(t.novel_total, 1);
        assert_eq!(t.novel_correct + t.novel_incorrect, 0);
    }

    #[test]
    fn test_late_target_uses_fixation_rt_plus_offset() {
        let t = tally(json!([
            { "type": "target", "correct": false, "rt": null },
            { "type": "fixation", "correct": false, "rt": 120 },
            { "type": "target", "correct": true, "rt": 380 },
        ]));

        assert_eq!(t.target_total, 2);
        assert_eq!(t.target_late, 1);
        assert_eq!(t.target_correct, 1);
        assert_eq!(t.target_incorrect, 0);
        assert_eq!(t.reaction_times, vec![620.0, 380.0]);
        assert_eq!(t.mean_reaction_time(), Some(500.0));
    }

    #[test]
    fn test_missed_target_records_no_time() {
        let t = tally(json!([
            { "type": "target", "correct": false },
            { "type": "fixation", "correct": true },
            { "type": "target", "correct": false },
        ]));

        assert_eq!(t.target_incorrect, 2);
        assert_eq!(t.target_late, 0);
        assert!(t.reaction_times.is_empty());
    }

    #[test]
    fn test_target_without_correct_flag_takes_lookahead_branch() {
        let t = tally(json!([
            { "type": "target" },
            { "type": "fixation", "correct": false, "rt": 100 },
        ]));

        assert_eq!(t.target_late, 1);
        assert_eq!(t.reaction_times, vec![600.0]);
    }

    #[test]
    fn test_stop_outcomes() {
        let t = tally(json!([
            // responded during go phase
            { "type": "stop", "correct": false },
            { "type": "stop", "correct": true },
            { "type": "fixation", "correct": true },
            // responded during stop signal
            { "type": "stop", "correct": true },
            { "type": "stop", "correct": false },
            { "type": "fixation", "correct": true },
            // responded late during fixation
            { "type": "stop", "correct": true },
            { "type": "stop", "correct": true },
            { "type": "fixation", "correct": false },
            // withheld
            { "type": "stop", "correct": true },
            { "type": "stop", "correct": true },
            { "type": "fixation", "correct": true },
        ]));

        assert_eq!(t.stop_total, 4);
        assert_eq!(t.stop_incorrect, 3);
        assert_eq!(t.stop_correct, 1);
        assert_eq!(t.stop_incorrect_ratio(), Some(0.75));
    }

    #[test]
    fn test_stop_phase_record_is_not_classified() {
        // The record after a stop is skipped even when it looks like a target.
        let t = tally(json!([
            { "type": "stop", "correct": true },
            { "type": "target", "correct": true, "rt": 999 },
            { "type": "fixation", "correct": true },
        ]));

        assert_eq!(t.stop_total, 1);
        assert_eq!(t.stop_correct, 1);
        assert_eq!(t.target_total, 0);
        assert!(t.reaction_times.is_empty());
    }

    #[test]
    fn test_stop_at_end_of_log_does_not_overrun() {
        let t = tally(json!([
            { "type": "target", "correct": true, "rt": 300 },
            { "type": "stop", "correct": true },
        ]));
        assert_eq!(t.stop_correct, 1);

        let t = tally(json!([
            { "type": "target", "correct": true, "rt": 300 },
            { "type": "stop", "correct": false },
        ]));
        assert_eq!(t.stop_incorrect, 1);

        let t = tally(json!([
            { "type": "stop", "correct": true },
            { "type": "stop", "correct": true },
        ]));
        assert_eq!(t.stop_correct, 1);
    }

    #[test]
    fn test_lookahead_at_end_resolves_as_no_response() {
        let t = tally(json!([
            { "type": "novel", "correct": true },
        ]));
        assert_eq!(t.novel_correct, 1);

        let t = tally(json!([
            { "type": "target", "correct": false },
        ]));
        assert_eq!(t.target_incorrect, 1);
    }

    #[test]
    fn test_full_session_metrics() {
        let metrics = GoStopScoreDecoder::decode(&data(json!([
            { "type": "instructions" },
            { "type": "target", "correct": true, "rt": 350 },
            { "type": "fixation", "correct": true },
            { "type": "novel", "correct": true },
            { "type": "fixation", "correct": true },
            { "type": "stop", "correct": true },
            { "type": "stop", "correct": false, "rt": 200 },
            { "type": "fixation", "correct": true },
            { "type": "target", "correct": false },
            { "type": "fixation", "correct": false, "rt": 150 },
            { "type": "novel", "correct": false },
            { "type": "fixation", "correct": true },
            { "type": "stop", "correct": true },
            { "type": "stop", "correct": true },
            { "type": "fixation", "correct": true },
        ])));

        let expected: Metrics = [
            ("gs_novel_total", 2.0),
            ("gs_novel_correct", 1.0),
            ("gs_novel_incorrect", 1.0),
            ("gs_target_total", 2.0),
            ("gs_target_correct", 1.0),
            ("gs_target_late", 1.0),
            ("gs_target_incorrect", 0.0),
            ("gs_stop_total", 2.0),
            ("gs_stop_correct", 1.0),
            ("gs_stop_incorrect", 1.0),
            ("gs_mean_reaction_time", 500.0),
            ("gs_stop_incorrect_ratio", 0.5),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), Some(v)))
        .collect();

        assert_eq!(metrics, expected);
    }

    #[test]
    fn test_decoding_is_idempotent() {
        let input = data(json!([
            { "type": "target", "correct": true, "rt": 333 },
            { "type": "stop", "correct": true },
            { "type": "stop", "correct": true },
            { "type": "fixation", "correct": false },
        ]));

        let first = GoStopScoreDecoder::decode(&input);
        let second = GoStopScoreDecoder::decode(&input);

        assert_eq!(first, second);
        assert_eq!(
            first.value("gs_mean_reaction_time").map(f64::to_bits),
            second.value("gs_mean_reaction_time").map(f64::to_bits)
        );
    }
}
