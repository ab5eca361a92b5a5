//! # Tableport - tolerant CSV import/export for tabular business data
//!
//! Tableport moves product, order and customer tables in and out of the
//! application as CSV. Source files come from heterogeneous tools (Excel,
//! Google Sheets, hand-edited text), so the import side tolerates mixed
//! delimiters, quoted multi-line fields, stray BOM markers and Vietnamese or
//! Western number formatting; the export side writes files Excel opens
//! correctly (UTF-8 BOM, escaped fields, localized headers).
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   CSV File  │────▶│   Parser    │────▶│  Normalize  │────▶│  Table JSON │
//! │ (auto-enc)  │     │ (join/split)│     │ (per column)│     │  (ordered)  │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//!                                                                    │
//! ┌─────────────┐     ┌─────────────┐                                │
//! │ CSV + BOM   │◀────│   Writer    │◀───── FieldMapping ◀───────────┘
//! └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tableport::pipeline::import_file;
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() {
//!     let outcome = import_file(Path::new("products.csv")).await.unwrap();
//!     println!("Imported {} rows", outcome.info.row_count);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`parser`] - Delimiter detection, record joining, tokenizing, assembly
//! - [`normalize`] - Locale-aware numeric/currency normalization
//! - [`mapping`] - Ordered canonical-key to display-label mapping
//! - [`export`] - CSV writer with BOM and escaping
//! - [`registry`] - Persisted mapping profiles
//! - [`pipeline`] - Import/export orchestration
//! - [`api`] - HTTP API server

// Core modules
pub mod error;

// Parsing
pub mod parser;

// Normalization
pub mod normalize;

// Field mapping
pub mod mapping;

// Export
pub mod export;

// Profile registry
pub mod registry;

// Orchestration
pub mod pipeline;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{ExportError, ImportError, ProfileError, ServerError};

// =============================================================================
// Re-exports - CSV Parsing
// =============================================================================

pub use parser::{
    decode_content,
    detect_encoding,
    join_records,
    parse_bytes_auto,
    parse_file_auto,
    parse_table,
    parse_text,
    split_fields,
    Delimiter,
    ParsedTable,
    ParseResult,
    ParseWarning,
};

// =============================================================================
// Re-exports - Normalization
// =============================================================================

pub use normalize::{normalize_columns, normalize_numeric, NormalizedValue};

// =============================================================================
// Re-exports - Mapping
// =============================================================================

pub use mapping::{FieldMapping, MappingEntry};

// =============================================================================
// Re-exports - Export
// =============================================================================

pub use export::{ensure_csv_extension, to_csv_string};

// =============================================================================
// Re-exports - Registry
// =============================================================================

pub use registry::{ProfileRegistry, StoredProfile};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use pipeline::{export_file, import_bytes, import_file, ImportInfo, ImportOutcome};

// =============================================================================
// Re-exports - API
// =============================================================================

pub use api::types::{error_response, ExportRequest, ImportMetadata, ImportResponse};

// Server
pub mod server {
    pub use crate::api::server::start_server;
}
