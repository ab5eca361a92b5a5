//! Error types for the Tableport import/export engine.
//!
//! Malformed *data* is never an error here: unterminated quotes, ragged rows
//! and unparseable numbers are all recovered leniently by the parse core and
//! reported as [`crate::parser::ParseWarning`]s instead. The types in this
//! module cover the hard failures only:
//!
//! - [`ImportError`] - reading the input file
//! - [`ExportError`] - writing the output file
//! - [`ProfileError`] - the mapping profile registry
//! - [`ServerError`] - top-level HTTP errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use thiserror::Error;

// =============================================================================
// Import Errors
// =============================================================================

/// Errors while importing a CSV file.
#[derive(Debug, Error)]
pub enum ImportError {
    /// Failed to read the input file.
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Export Errors
// =============================================================================

/// Errors while exporting records to CSV.
///
/// An empty record list is deliberately *not* a variant: exporting nothing is
/// a no-op with a warning, not a failure.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Failed to write the output file.
    #[error("Failed to write file: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to serialize records.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// =============================================================================
// Profile Registry Errors
// =============================================================================

/// Errors from the mapping profile registry.
#[derive(Debug, Error)]
pub enum ProfileError {
    /// Profile not found.
    #[error("Profile not found: {0}")]
    NotFound(String),

    /// IO error.
    #[error("Registry IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("Registry JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// =============================================================================
// Server Errors (top-level)
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Import error.
    #[error("Import error: {0}")]
    Import(#[from] ImportError),

    /// Export error.
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// Profile registry error.
    #[error("Profile error: {0}")]
    Profile(#[from] ProfileError),

    /// Invalid request.
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Server internal error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for import operations.
pub type ImportResult<T> = Result<T, ImportError>;

/// Result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

/// Result type for profile registry operations.
pub type ProfileResult<T> = Result<T, ProfileError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        // ImportError -> ServerError
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.csv");
        let import_err: ImportError = io_err.into();
        let server_err: ServerError = import_err.into();
        assert!(server_err.to_string().contains("missing.csv"));

        // ProfileError -> ServerError
        let profile_err = ProfileError::NotFound("orders-vn".into());
        let server_err: ServerError = profile_err.into();
        assert!(server_err.to_string().contains("orders-vn"));
    }

    #[test]
    fn test_bad_request_format() {
        let err = ServerError::BadRequest("no records to export".into());
        assert!(err.to_string().contains("no records to export"));
    }
}
