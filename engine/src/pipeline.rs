//! High-level import/export API.
//!
//! Thin orchestration over the parse core and the CSV writer: file IO
//! through `tokio::fs`, progress narration through the log broadcaster, and
//! metadata the callers (CLI and HTTP API) report back to users.
//!
//! # Example
//!
//! ```rust,ignore
//! use tableport::pipeline::import_file;
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let outcome = import_file(Path::new("products.csv")).await?;
//!     println!("Imported {} rows", outcome.info.row_count);
//!     Ok(())
//! }
//! ```

use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::api::logs::{log_info, log_success, log_warning};
use crate::error::{ExportResult, ImportResult};
use crate::export::{ensure_csv_extension, to_csv_string};
use crate::mapping::FieldMapping;
use crate::parser::{parse_bytes_auto, Delimiter, ParseWarning};

/// Metadata about one import.
#[derive(Debug, Clone, Serialize)]
pub struct ImportInfo {
    /// Detected encoding.
    pub encoding: String,
    /// Detected delimiter.
    pub delimiter: Delimiter,
    /// Column headers, in file order.
    pub headers: Vec<String>,
    /// Number of data rows.
    pub row_count: usize,
}

/// Result of one import: the assembled table plus metadata and warnings.
#[derive(Debug, Clone, Serialize)]
pub struct ImportOutcome {
    /// Column headers, in file order.
    pub headers: Vec<String>,
    /// Data rows as JSON objects keyed by header.
    pub records: Vec<Value>,
    /// Lenient-recovery diagnostics.
    pub warnings: Vec<ParseWarning>,
    /// Import metadata.
    pub info: ImportInfo,
}

/// Import a CSV file, auto-detecting encoding and delimiter.
pub async fn import_file(path: &Path) -> ImportResult<ImportOutcome> {
    log_info(format!("Reading {}...", path.display()));
    let bytes = tokio::fs::read(path).await?;
    Ok(import_bytes(&bytes))
}

/// Import CSV bytes, auto-detecting encoding and delimiter.
///
/// Never fails: malformed data is recovered leniently and reported in
/// `warnings`.
pub fn import_bytes(bytes: &[u8]) -> ImportOutcome {
    log_info("Detecting encoding and delimiter...");
    let result = parse_bytes_auto(bytes);
    log_success(format!("Encoding: {}", result.encoding));
    log_success(format!("Delimiter: '{}'", result.delimiter.display()));
    log_success(format!(
        "Parsed {} rows, {} columns",
        result.table.records.len(),
        result.table.headers.len()
    ));

    for warning in &result.warnings {
        match warning {
            ParseWarning::UnterminatedQuote => {
                log_warning("Unterminated quote at end of file; trailing record kept");
            }
            ParseWarning::ShortRow { row, expected, found } => {
                log_warning(format!(
                    "Row {}: {} of {} fields, missing ones padded",
                    row, found, expected
                ));
            }
            ParseWarning::LongRow { row, expected, found } => {
                log_warning(format!(
                    "Row {}: {} fields, {} extra dropped",
                    row,
                    found,
                    found - expected
                ));
            }
        }
    }

    let info = ImportInfo {
        encoding: result.encoding,
        delimiter: result.delimiter,
        headers: result.table.headers.clone(),
        row_count: result.table.records.len(),
    };

    ImportOutcome {
        headers: result.table.headers,
        records: result.table.records,
        warnings: result.warnings,
        info,
    }
}

/// Export records to a CSV file.
///
/// `.csv` is appended to the filename when missing. Returns the path
/// written, or `None` (with a logged warning) when there is nothing to
/// export.
pub async fn export_file(
    records: &[Value],
    mapping: Option<&FieldMapping>,
    filename: &str,
) -> ExportResult<Option<PathBuf>> {
    let Some(csv) = to_csv_string(records, mapping) else {
        return Ok(None);
    };

    let path = PathBuf::from(ensure_csv_extension(filename));
    tokio::fs::write(&path, csv).await?;
    log_success(format!(
        "Exported {} records to {}",
        records.len(),
        path.display()
    ));
    Ok(Some(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn test_import_bytes_metadata() {
        let outcome = import_bytes("sku;qty\nA1;3\nB2;5".as_bytes());
        assert_eq!(outcome.info.delimiter, Delimiter::Semicolon);
        assert_eq!(outcome.info.row_count, 2);
        assert_eq!(outcome.info.headers, vec!["sku", "qty"]);
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn test_import_bytes_collects_warnings() {
        let outcome = import_bytes("a,b\n1".as_bytes());
        assert_eq!(outcome.warnings.len(), 1);
        assert_eq!(outcome.records[0]["b"], "");
    }

    #[tokio::test]
    async fn test_import_file_round() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("in.csv");
        tokio::fs::write(&path, "name,qty\nPen,3").await.unwrap();

        let outcome = import_file(&path).await.unwrap();
        assert_eq!(outcome.records[0]["name"], "Pen");
    }

    #[tokio::test]
    async fn test_import_file_missing_is_error() {
        let result = import_file(Path::new("/nonexistent/nope.csv")).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_export_file_appends_extension() {
        let dir = tempdir().unwrap();
        let base = dir.path().join("out");
        let records = vec![json!({"a": "1"})];

        let path = export_file(&records, None, base.to_str().unwrap())
            .await
            .unwrap()
            .unwrap();
        assert!(path.to_string_lossy().ends_with("out.csv"));

        let written = tokio::fs::read_to_string(&path).await.unwrap();
        assert!(written.starts_with('\u{feff}'));
    }

    #[tokio::test]
    async fn test_export_file_empty_is_noop() {
        let result = export_file(&[], None, "never").await.unwrap();
        assert!(result.is_none());
        assert!(!Path::new("never.csv").exists());
    }
}
