//! Adapter for reading survey response exports
//!
//! Accepts either a JSON document (a bare array of records, or the platform's
//! `{"responses": [...]}` export wrapper) or NDJSON with one record per line.
//! `parse_document` tells the two apart.

use crate::error::ScoreError;
use crate::schema::response::ResponseRecord;
use serde_json::Value;
use tracing::debug;

/// Adapter for converting response exports to records
pub struct ResponseAdapter;

impl ResponseAdapter {
    /// Parse an export of unknown format.
    ///
    /// Input that is a single JSON value goes through the document path, where
    /// a lone record object is accepted as a one-record export. Anything else
    /// is read as NDJSON.
    pub fn parse_document(input: &str) -> Result<Vec<ResponseRecord>, ScoreError> {
        match serde_json::from_str::<Value>(input) {
            Ok(Value::Object(object))
                if object.contains_key("values") && !object.contains_key("responses") =>
            {
                Ok(vec![ResponseRecord::from_value(Value::Object(object))?])
            }
            Ok(document) => Self::records_from_document(document),
            Err(_) => {
                debug!("input is not a single JSON document, reading as NDJSON");
                Self::parse_ndjson(input)
            }
        }
    }

    /// Parse a JSON document containing response records
    pub fn parse_array(json: &str) -> Result<Vec<ResponseRecord>, ScoreError> {
        Self::records_from_document(serde_json::from_str(json)?)
    }

    fn records_from_document(document: Value) -> Result<Vec<ResponseRecord>, ScoreError> {
        let items = match document {
            Value::Array(items) => items,
            Value::Object(mut object) => match object.remove("responses") {
                Some(Value::Array(items)) => items,
                _ => return Err(ScoreError::MissingField("responses".to_string())),
            },
            _ => {
                return Err(ScoreError::ParseError(
                    "Expected an array of responses or an export object".to_string(),
                ))
            }
        };

        items
            .into_iter()
            .enumerate()
            .map(|(idx, item)| {
                ResponseRecord::from_value(item).map_err(|e| {
                    ScoreError::ParseError(format!("Failed to parse response {}: {}", idx, e))
                })
            })
            .collect()
    }

    /// Parse NDJSON (newline-delimited JSON) containing response records
    pub fn parse_ndjson(ndjson: &str) -> Result<Vec<ResponseRecord>, ScoreError> {
        let mut records = Vec::new();
        for (line_num, line) in ndjson.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let parsed = serde_json::from_str::<Value>(trimmed)
                .map_err(ScoreError::from)
                .and_then(ResponseRecord::from_value);
            match parsed {
                Ok(record) => records.push(record),
                Err(e) => {
                    return Err(ScoreError::ParseError(format!(
                        "Failed to parse line {}: {}",
                        line_num + 1,
                        e
                    )));
                }
            }
        }
        Ok(records)
    }
}
