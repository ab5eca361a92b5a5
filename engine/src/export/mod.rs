//! CSV export: the inverse of the parser.
//!
//! Serializes record objects back into escaped CSV text. The delimiter is a
//! fixed comma on export; the output starts with a UTF-8 BOM so spreadsheet
//! applications detect the encoding correctly.

use serde_json::Value;

use crate::api::logs::log_warning;
use crate::mapping::FieldMapping;
use crate::parser::BOM_CHAR;

/// Serialize records to CSV text with a leading UTF-8 BOM.
///
/// Column order comes from the mapping's key order when a non-empty mapping
/// is given, otherwise from the first record's own key order. The header row
/// uses the mapping's display labels, falling back to the raw key.
///
/// An empty record list (or a first record that is not an object) is a
/// no-op: `None` plus a logged warning, never an error.
pub fn to_csv_string(records: &[Value], mapping: Option<&FieldMapping>) -> Option<String> {
    if records.is_empty() {
        log_warning("Export skipped: no records");
        return None;
    }
    let keys = column_keys(records, mapping)?;

    let mut lines = Vec::with_capacity(records.len() + 1);

    let header: Vec<String> = keys
        .iter()
        .map(|key| {
            let label = mapping.map(|m| m.label_for(key)).unwrap_or(key);
            escape_field(label)
        })
        .collect();
    lines.push(header.join(","));

    for record in records {
        let row: Vec<String> = keys
            .iter()
            .map(|key| {
                let value = record.get(key).map(value_to_field).unwrap_or_default();
                escape_field(&value)
            })
            .collect();
        lines.push(row.join(","));
    }

    Some(format!("{}{}", BOM_CHAR, lines.join("\n")))
}

/// Append `.csv` to a filename that does not already carry it.
pub fn ensure_csv_extension(name: &str) -> String {
    if name.to_lowercase().ends_with(".csv") {
        name.to_string()
    } else {
        format!("{}.csv", name)
    }
}

/// Column keys for the export: mapping key order, else the first record's
/// own key order.
fn column_keys(records: &[Value], mapping: Option<&FieldMapping>) -> Option<Vec<String>> {
    if let Some(mapping) = mapping {
        if !mapping.is_empty() {
            return Some(mapping.keys().map(String::from).collect());
        }
    }

    let Some(obj) = records.first().and_then(Value::as_object) else {
        log_warning("Export skipped: records are not objects");
        return None;
    };
    Some(obj.keys().cloned().collect())
}

fn value_to_field(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn needs_quotes(field: &str) -> bool {
    field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r')
}

fn escape_field(field: &str) -> String {
    if needs_quotes(field) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
