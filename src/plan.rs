//! Scoring plans
//!
//! A plan says which embedded-data field of a survey response holds which
//! task, what label to namespace its metrics with, and how to relabel or drop
//! metrics in the merged per-response record.

use crate::decoders::TaskKind;
use crate::error::ScoreError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

/// Binding of a response field to a task decoder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskBinding {
    /// Embedded-data field holding the task log
    pub field: String,
    /// Task identifier (see [`TaskKind::from_id`])
    pub task: TaskKind,
    /// Metric label; the task's default label when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl TaskBinding {
    pub fn new(field: impl Into<String>, task: TaskKind) -> Self {
        Self {
            field: field.into(),
            task,
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or(self.task.default_label())
    }
}

/// Full scoring configuration for one survey
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringPlan {
    pub tasks: Vec<TaskBinding>,
    /// Metric renames applied after merging (old key → new key)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub relabel: BTreeMap<String, String>,
    /// Metrics removed after relabeling
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub delist: Vec<String>,
}

impl Default for ScoringPlan {
    /// Every task bound to the field named by its canonical identifier
    fn default() -> Self {
        Self {
            tasks: TaskKind::ALL
                .iter()
                .map(|&kind| TaskBinding::new(kind.id(), kind))
                .collect(),
            relabel: BTreeMap::new(),
            delist: Vec::new(),
        }
    }
}

impl ScoringPlan {
    pub fn new(tasks: Vec<TaskBinding>) -> Self {
        Self {
            tasks,
            relabel: BTreeMap::new(),
            delist: Vec::new(),
        }
    }

    /// Load a plan from JSON and validate it
    pub fn from_json(json: &str) -> Result<Self, ScoreError> {
        let value: Value = serde_json::from_str(json)?;

        // Resolve task ids up front so an unknown one is reported as such
        // rather than as a generic deserialization failure.
        let bindings = value.get("tasks").and_then(Value::as_array);
        for task in bindings.into_iter().flatten().filter_map(|b| b.get("task")) {
            if let Some(id) = task.as_str() {
                id.parse::<TaskKind>()?;
            }
        }

        let plan: ScoringPlan = serde_json::from_value(value)?;
        plan.validate()?;
        Ok(plan)
    }

    pub fn to_json(&self) -> Result<String, ScoreError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject plans whose bindings would read the same field twice, or whose
    /// relabel step would write two metrics to one key
    pub fn validate(&self) -> Result<(), ScoreError> {
        if self.tasks.is_empty() {
            return Err(ScoreError::InvalidPlan("plan binds no tasks".to_string()));
        }

        let mut seen = BTreeSet::new();
        for binding in &self.tasks {
            if binding.field.is_empty() {
                return Err(ScoreError::InvalidPlan(format!(
                    "{} binding has an empty field name",
                    binding.task
                )));
            }
            if !seen.insert(binding.field.as_str()) {
                return Err(ScoreError::InvalidPlan(format!(
                    "field '{}' is bound more than once",
                    binding.field
                )));
            }
        }
        self.validate_relabel()
    }

    /// Relabel targets must be distinct and must not land on a metric the
    /// plan produces and keeps under its own name
    fn validate_relabel(&self) -> Result<(), ScoreError> {
        let kept: BTreeSet<String> = self
            .tasks
            .iter()
            .flat_map(|binding| binding.task.metric_keys(binding.label()))
            .filter(|key| !self.relabel.contains_key(key))
            .collect();

        let mut targets = BTreeSet::new();
        for (from, to) in &self.relabel {
            if !targets.insert(to.as_str()) {
                return Err(ScoreError::InvalidPlan(format!(
                    "relabel target '{}' is used more than once",
                    to
                )));
            }
            if kept.contains(to) {
                return Err(ScoreError::InvalidPlan(format!(
                    "relabel of '{}' would overwrite metric '{}'",
                    from, to
                )));
            }
        }
        Ok(())
    }
}
