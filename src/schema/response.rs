//! Survey response records
//!
//! A response export holds one record per respondent. Task logs live in the
//! record's `values` map under the embedded-data field the survey assigned to
//! each task.

use crate::error::ScoreError;
use crate::schema::task_event::TaskData;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One respondent's survey response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseRecord {
    #[serde(default, alias = "responseId")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_id: Option<String>,
    pub values: Map<String, Value>,
}

impl ResponseRecord {
    /// Build a record from an already-parsed JSON value
    pub fn from_value(value: Value) -> Result<Self, ScoreError> {
        serde_json::from_value(value)
            .map_err(|e| ScoreError::ParseError(format!("Invalid response record: {}", e)))
    }

    /// Task data stored under `field`. An absent field is a sentinel.
    pub fn task_data(&self, field: &str) -> TaskData {
        match self.values.get(field) {
            Some(value) => TaskData::from_value(value.clone()),
            None => TaskData::Sentinel,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_value_reads_platform_export_shape() {
        let record = ResponseRecord::from_value(json!({
            "responseId": "R_abc123",
            "values": { "GoStop": "-1", "finished": 1 }
        }))
        .unwrap();

        assert_eq!(record.response_id.as_deref(), Some("R_abc123"));
        assert_eq!(record.values.len(), 2);
        assert!(record.task_data("GoStop").is_sentinel());
        assert!(record.task_data("NotThere").is_sentinel());
    }

    #[test]
    fn test_from_value_requires_values() {
        let err = ResponseRecord::from_value(json!({ "responseId": "R_1" })).unwrap_err();
        assert!(matches!(err, ScoreError::ParseError(ref m) if m.contains("values")));

        let err = ResponseRecord::from_value(json!({ "values": [] })).unwrap_err();
        assert!(matches!(err, ScoreError::ParseError(_)));

        let err = ResponseRecord::from_value(json!({ "responseId": 7, "values": {} })).unwrap_err();
        assert!(matches!(err, ScoreError::ParseError(_)));

        let err = ResponseRecord::from_value(json!(42)).unwrap_err();
        assert!(matches!(err, ScoreError::ParseError(_)));
    }

    #[test]
    fn test_serde_alias_for_response_id() {
        let record: ResponseRecord =
            serde_json::from_str(r#"{"responseId":"R_9","values":{}}"#).unwrap();
        assert_eq!(record.response_id.as_deref(), Some("R_9"));

        let record =
            ResponseRecord::from_value(json!({ "response_id": "R_10", "values": {} })).unwrap();
        assert_eq!(record.response_id.as_deref(), Some("R_10"));
    }
}
