//! Delay discounting scoring
//!
//! An adjusting-delay procedure (Koffarnus & Bickel, 2014): each choice moves
//! the delay of the larger reward along a fixed ladder. The last choice of the
//! delayed reward marks the effective delay at which the delayed reward is
//! worth half the immediate one (ED50).

use crate::decoders::TaskDecoder;
use crate::schema::{fields, TaskData};
use crate::types::Metrics;
use tracing::debug;

const DAY_HOURS: f64 = 24.0;
const WEEK_HOURS: f64 = 7.0 * DAY_HOURS;
const MONTH_HOURS: f64 = 30.0 * DAY_HOURS;
const YEAR_HOURS: f64 = 365.0 * DAY_HOURS;

/// Delay ladder in hours, indexed by the task's delay index
pub const DELAY_LADDER_HOURS: [f64; 32] = [
    0.0,
    1.0,
    2.0,
    3.0,
    4.0,
    6.0,
    9.0,
    12.0,
    DAY_HOURS,
    1.5 * DAY_HOURS,
    2.0 * DAY_HOURS,
    3.0 * DAY_HOURS,
    4.0 * DAY_HOURS,
    WEEK_HOURS,
    1.5 * WEEK_HOURS,
    2.0 * WEEK_HOURS,
    3.0 * WEEK_HOURS,
    MONTH_HOURS,
    2.0 * MONTH_HOURS,
    3.0 * MONTH_HOURS,
    4.0 * MONTH_HOURS,
    6.0 * MONTH_HOURS,
    8.0 * MONTH_HOURS,
    YEAR_HOURS,
    2.0 * YEAR_HOURS,
    3.0 * YEAR_HOURS,
    4.0 * YEAR_HOURS,
    5.0 * YEAR_HOURS,
    8.0 * YEAR_HOURS,
    12.0 * YEAR_HOURS,
    18.0 * YEAR_HOURS,
    25.0 * YEAR_HOURS,
];

pub const ED50_HOURS_KEY: &str = "dd_ed50_hours";
pub const ED50_LOG_HOURS_KEY: &str = "dd_ed50_log_hours";

/// Hours for a delay index, `None` past the end of the ladder
pub fn delay_hours(index: u64) -> Option<f64> {
    usize::try_from(index)
        .ok()
        .and_then(|i| DELAY_LADDER_HOURS.get(i))
        .copied()
}

/// Decoder for the delay discounting task.
///
/// Keys carry the fixed `dd_` prefix; the label is not applied.
pub struct DelayDiscountingDecoder;

impl DelayDiscountingDecoder {
    pub const DEFAULT_LABEL: &'static str = "DelayDiscounting";

    pub fn decode(data: &TaskData) -> Metrics {
        let Some(events) = data.events() else {
            return Metrics::nulls(Self::keys());
        };

        // Scan backwards for the last delayed choice. The first record is the
        // instruction screen and is never examined.
        let delay_index = events
            .iter()
            .enumerate()
            .skip(1)
            .rev()
            .find(|(_, e)| e.bool_field(fields::DELAY) == Some(true))
            .and_then(|(position, e)| {
                let index = e.first_index(fields::INDEX);
                if index.is_none() {
                    debug!(position, "delayed choice without a delay index");
                }
                index
            });

        let hours = delay_index.and_then(delay_hours);
        if delay_index.is_some() && hours.is_none() {
            debug!(?delay_index, "delay index outside the ladder");
        }

        let log_hours = hours.filter(|h| *h > 0.0).map(f64::ln);

        let mut metrics = Metrics::new();
        metrics.insert(ED50_HOURS_KEY, hours);
        metrics.insert(ED50_LOG_HOURS_KEY, log_hours);
        metrics
    }

    pub fn keys() -> Vec<String> {
        vec![ED50_HOURS_KEY.to_string(), ED50_LOG_HOURS_KEY.to_string()]
    }
}

impl TaskDecoder for DelayDiscountingDecoder {
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

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case::immediate(0, Some(0.0))]
    #[case::one_day(8, Some(24.0))]
    #[case::one_week(13, Some(168.0))]
    #[case::one_month(17, Some(720.0))]
    #[case::one_year(23, Some(8760.0))]
    #[case::longest(31, Some(219_000.0))]
    #[case::past_end(32, None)]
    fn test_delay_hours(#[case] index: u64, #[case] expected: Option<f64>) {
        assert_eq!(delay_hours(index), expected);
    }

    #[test]
    fn test_last_delayed_choice_sets_ed50() {
        let data = TaskData::from_value(json!([
            { "trial_type": "instructions" },
            { "delay": true, "index": [10] },
            { "delay": false, "index": [14] },
            { "delay": true, "index": [13] },
            { "delay": false, "index": [16] },
        ]));

        let metrics = DelayDiscountingDecoder::decode(&data);

        assert_eq!(metrics.value(ED50_HOURS_KEY), Some(168.0));
        assert_eq!(metrics.value(ED50_LOG_HOURS_KEY), Some(168.0_f64.ln()));
    }

    #[test]
    fn test_first_record_is_not_examined() {
        let data = TaskData::from_value(json!([
            { "delay": true, "index": [5] },
            { "delay": false, "index": [6] },
        ]));

        let metrics = DelayDiscountingDecoder::decode(&data);

        assert_eq!(metrics.len(), 2);
        assert!(metrics.iter().all(|(_, v)| v.is_none()));
    }

    #[test]
    fn test_zero_hours_has_null_log() {
        let data = TaskData::from_value(json!([
            {},
            { "delay": true, "index": [0] },
        ]));

        let metrics = DelayDiscountingDecoder::decode(&data);

        assert_eq!(metrics.value(ED50_HOURS_KEY), Some(0.0));
        assert_eq!(metrics.get(ED50_LOG_HOURS_KEY), Some(None));
    }

    #[test]
    fn test_sentinel_gives_null_keys() {
        let metrics = DelayDiscountingDecoder::decode(&TaskData::Sentinel);

        assert_eq!(metrics.get(ED50_HOURS_KEY), Some(None));
        assert_eq!(metrics.get(ED50_LOG_HOURS_KEY), Some(None));
    }
}
