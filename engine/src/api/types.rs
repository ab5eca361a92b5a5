//! REST API types for frontend integration.
//!
//! Import responses carry the parsed table verbatim; the frontend reconciles
//! header labels against its own field mappings. All DTOs are camelCase.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::mapping::FieldMapping;
use crate::parser::ParseWarning;
use crate::pipeline::ImportOutcome;

/// Response sent to the frontend after a CSV import.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResponse {
    /// Unique job identifier.
    pub job_id: String,

    /// Status: "ready" when the parse was clean, "warning" otherwise.
    pub status: String,

    /// Column headers, in file order.
    pub headers: Vec<String>,

    /// Data rows as objects keyed by header.
    pub records: Vec<Value>,

    /// Metadata about the import.
    pub metadata: ImportMetadata,
}

/// Metadata about one import.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportMetadata {
    pub encoding: String,
    pub delimiter: String,
    pub row_count: usize,
    pub warnings: Vec<ParseWarning>,
}

impl From<ImportOutcome> for ImportResponse {
    fn from(outcome: ImportOutcome) -> Self {
        let status = if outcome.warnings.is_empty() { "ready" } else { "warning" };

        ImportResponse {
            job_id: Uuid::new_v4().to_string(),
            status: status.to_string(),
            headers: outcome.headers,
            records: outcome.records,
            metadata: ImportMetadata {
                encoding: outcome.info.encoding,
                delimiter: outcome.info.delimiter.display().to_string(),
                row_count: outcome.info.row_count,
                warnings: outcome.warnings,
            },
        }
    }
}

/// Request body for the export endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRequest {
    /// Records to serialize, one object per row.
    pub records: Vec<Value>,

    /// Optional ordered key-to-label mapping; its key order is the column
    /// order.
    #[serde(default)]
    pub mapping: Option<FieldMapping>,

    /// Download filename; `.csv` is appended when missing.
    #[serde(default)]
    pub filename: Option<String>,
}

/// Create an error response body.
pub fn error_response(error: &str) -> Value {
    json!({
        "jobId": Uuid::new_v4().to_string(),
        "status": "error",
        "error": error,
        "headers": [],
        "records": [],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::import_bytes;

    #[test]
    fn test_clean_import_is_ready() {
        let outcome = import_bytes("a,b\n1,2".as_bytes());
        let response = ImportResponse::from(outcome);

        assert_eq!(response.status, "ready");
        assert_eq!(response.headers, vec!["a", "b"]);
        assert_eq!(response.metadata.row_count, 1);
        assert_eq!(response.metadata.delimiter, ",");
    }

    #[test]
    fn test_ragged_import_is_warning() {
        let outcome = import_bytes("a,b\n1".as_bytes());
        let response = ImportResponse::from(outcome);

        assert_eq!(response.status, "warning");
        assert_eq!(response.metadata.warnings.len(), 1);
    }

    #[test]
    fn test_response_serializes_camel_case() {
        let outcome = import_bytes("a\n1".as_bytes());
        let response = ImportResponse::from(outcome);
        let json = serde_json::to_string(&response).unwrap();

        assert!(json.contains("\"jobId\""));
        assert!(json.contains("\"rowCount\""));
    }

    #[test]
    fn test_export_request_optional_fields() {
        let request: ExportRequest =
            serde_json::from_str(r#"{"records":[{"a":"1"}]}"#).unwrap();
        assert!(request.mapping.is_none());
        assert!(request.filename.is_none());
        assert_eq!(request.records.len(), 1);
    }
}
