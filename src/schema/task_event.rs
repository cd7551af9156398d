//! Task event log representation
//!
//! Each cognitive task writes a JSON list of loosely-structured records, one per
//! trial. Field sets differ between tasks, so events are kept as raw JSON
//! objects and every read goes through an accessor that returns `Option`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Field names written by the task runtimes
pub mod fields {
    pub const TRIAL_TYPE: &str = "trial_type";
    pub const TYPE: &str = "type";
    pub const SET_SIZE: &str = "set_size";
    pub const ACCURACY: &str = "accuracy";
    pub const TRAILS_TYPE: &str = "trailsType";
    pub const TIME_ELAPSED: &str = "time_elapsed";
    pub const CORRECT: &str = "correct";
    pub const RT: &str = "rt";
    pub const PRESSED: &str = "pressed";
    pub const DECREASING: &str = "decreasing";
    pub const INDEX: &str = "index";
    pub const DELAY: &str = "delay";
}

/// Maximum number of string layers unwrapped from an embedded-data payload
const MAX_STRING_LAYERS: usize = 3;

/// One trial record from a task log. Immutable once parsed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskEvent(Map<String, Value>);

impl TaskEvent {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Raw field access
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.field(name).and_then(Value::as_str)
    }

    pub fn f64_field(&self, name: &str) -> Option<f64> {
        self.field(name).and_then(Value::as_f64)
    }

    pub fn bool_field(&self, name: &str) -> Option<bool> {
        self.field(name).and_then(Value::as_bool)
    }

    /// Integer field, also accepting integral floats and numeric strings
    pub fn int_field(&self, name: &str) -> Option<i64> {
        match self.field(name)? {
            Value::Number(n) => n.as_i64().or_else(|| {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0)
                    .map(|f| f as i64)
            }),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Length of an array field
    pub fn array_len(&self, name: &str) -> Option<usize> {
        self.field(name).and_then(Value::as_array).map(Vec::len)
    }

    /// First element of an array field as a non-negative integer.
    ///
    /// A bare integer is accepted as a one-element array.
    pub fn first_index(&self, name: &str) -> Option<u64> {
        match self.field(name)? {
            Value::Array(items) => items.first().and_then(Value::as_u64),
            other => other.as_u64(),
        }
    }

    /// `trial_type` discriminator (SpatialSpan, Trails)
    pub fn trial_type(&self) -> Option<&str> {
        self.str_field(fields::TRIAL_TYPE)
    }

    /// `type` discriminator (GoStop)
    pub fn kind(&self) -> Option<&str> {
        self.str_field(fields::TYPE)
    }

    pub fn correct(&self) -> Option<bool> {
        self.bool_field(fields::CORRECT)
    }

    /// True only when `correct` is present and literally `false`
    pub fn is_incorrect(&self) -> bool {
        self.correct() == Some(false)
    }

    /// Reaction time in milliseconds
    pub fn rt(&self) -> Option<f64> {
        self.f64_field(fields::RT)
    }
}

impl From<Map<String, Value>> for TaskEvent {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

/// Task data as handed to a decoder.
///
/// Anything other than a list of trials (for example the `-1` a survey writes
/// when the task was never completed) is a `Sentinel`, which is a normal
/// input and not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskData {
    Events(Vec<TaskEvent>),
    Sentinel,
}

impl TaskData {
    /// Interpret a JSON value as task data.
    ///
    /// Survey platforms store task logs as embedded-data strings, sometimes
    /// JSON-encoded twice, so string values are unwrapped until a non-string
    /// value appears. Non-object list items become empty events.
    pub fn from_value(value: Value) -> Self {
        let mut current = value;
        for _ in 0..MAX_STRING_LAYERS {
            let Value::String(text) = &current else {
                break;
            };
            match serde_json::from_str::<Value>(text) {
                Ok(inner) => current = inner,
                Err(e) => {
                    warn!(error = %e, "task payload string is not valid JSON, treating as sentinel");
                    return TaskData::Sentinel;
                }
            }
        }

        match current {
            Value::Array(items) => TaskData::Events(
                items
                    .into_iter()
                    .map(|item| match item {
                        Value::Object(map) => TaskEvent::from(map),
                        _ => TaskEvent::default(),
                    })
                    .collect(),
            ),
            other => {
                debug!(kind = value_kind(&other), "task payload is not a list, treating as sentinel");
                TaskData::Sentinel
            }
        }
    }

    /// Parse a raw JSON document as task data
    pub fn from_json_str(json: &str) -> Self {
        match serde_json::from_str::<Value>(json) {
            Ok(value) => Self::from_value(value),
            Err(e) => {
                warn!(error = %e, "task payload is not valid JSON, treating as sentinel");
                TaskData::Sentinel
            }
        }
    }

    /// Events in original order, or `None` for a sentinel
    pub fn events(&self) -> Option<&[TaskEvent]> {
        match self {
            TaskData::Events(events) => Some(events),
            TaskData::Sentinel => None,
        }
    }

    pub fn is_sentinel(&self) -> bool {
        matches!(self, TaskData::Sentinel)
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
