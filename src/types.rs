//! Core types for cogscore
//!
//! This module defines the metrics mapping every decoder produces and the
//! per-response and per-batch records built on top of it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::btree_map;
use std::collections::BTreeMap;

/// Mapping from metric name to a value or an explicit null.
///
/// Keys are namespaced by the caller-supplied label (e.g.
/// `SpatialSpan3_perc_accuracy`). `None` serializes as JSON `null`, so a
/// metric that could not be computed is still present as a key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metrics(BTreeMap<String, Option<f64>>);

impl Metrics {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Build a mapping with every key present and null
    pub fn nulls<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(keys.into_iter().map(|k| (k.into(), None)).collect())
    }

    /// Insert or overwrite a metric (last write wins)
    pub fn insert(&mut self, key: impl Into<String>, value: Option<f64>) {
        self.0.insert(key.into(), value);
    }

    /// Look up a metric.
    ///
    /// The outer `Option` is key presence, the inner one is the null marker.
    pub fn get(&self, key: &str) -> Option<Option<f64>> {
        self.0.get(key).copied()
    }

    /// Value of a metric, flattening absence and null together
    pub fn value(&self, key: &str) -> Option<f64> {
        self.get(key).flatten()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Merge another mapping into this one by key union.
    ///
    /// Colliding keys take the incoming value.
    pub fn merge(&mut self, other: Metrics) {
        self.0.extend(other.0);
    }

    /// Move metrics to new keys as one step.
    ///
    /// Every source is taken out before any target is written, so renames
    /// may swap or chain keys. Returns the sources that were absent.
    pub fn rename_all<'a, I>(&mut self, renames: I) -> Vec<&'a str>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut moved = Vec::new();
        let mut missing = Vec::new();
        for (from, to) in renames {
            match self.0.remove(from) {
                Some(value) => moved.push((to, value)),
                None => missing.push(from),
            }
        }
        for (to, value) in moved {
            self.0.insert(to.to_string(), value);
        }
        missing
    }

    /// Drop a metric, returning its value if it was present
    pub fn remove(&mut self, key: &str) -> Option<Option<f64>> {
        self.0.remove(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Option<f64>> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, Option<f64>)> for Metrics {
    fn from_iter<T: IntoIterator<Item = (String, Option<f64>)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Metrics {
    type Item = (String, Option<f64>);
    type IntoIter = btree_map::IntoIter<String, Option<f64>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Metrics {
    type Item = (&'a String, &'a Option<f64>);
    type IntoIter = btree_map::Iter<'a, String, Option<f64>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Scored metrics for a single survey response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredResponse {
    /// Survey platform response identifier, when the export carried one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_id: Option<String>,
    /// Union of all task metrics after relabeling and delisting
    pub metrics: Metrics,
}

/// Producer metadata stamped on each batch report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportProducer {
    pub name: String,
    pub version: String,
    /// Unique per scoring run
    pub run_id: String,
}

/// Output of one batch scoring run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreReport {
    pub producer: ReportProducer,
    pub computed_at: DateTime<Utc>,
    pub responses: Vec<ScoredResponse>,
}
