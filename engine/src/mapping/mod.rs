//! Ordered field mapping between canonical keys and display labels.
//!
//! A [`FieldMapping`] is the configuration table a caller supplies per call:
//! canonical data keys (e.g. `unit_price`) paired with human-readable column
//! labels (e.g. `Đơn giá`). Insertion order is significant - it defines the
//! export column order. The mapping is looked up in both directions: key to
//! label when writing headers, label to key when reconciling imported ones.

use serde::{Deserialize, Serialize};

/// One key/label pair of a mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingEntry {
    /// Canonical internal field key.
    pub key: String,
    /// Display label shown as the column header.
    pub label: String,
}

/// Ordered mapping from canonical keys to display labels.
///
/// The JSON form is an array of `{"key": .., "label": ..}` objects, order
/// preserved.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldMapping {
    entries: Vec<MappingEntry>,
}

impl FieldMapping {
    /// Create an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a mapping from ordered key/label pairs.
    pub fn from_pairs<K, L>(pairs: impl IntoIterator<Item = (K, L)>) -> Self
    where
        K: Into<String>,
        L: Into<String>,
    {
        Self {
            entries: pairs
                .into_iter()
                .map(|(key, label)| MappingEntry { key: key.into(), label: label.into() })
                .collect(),
        }
    }

    /// Parse a mapping from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize to a JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Append a key/label pair, keeping insertion order.
    pub fn push(&mut self, key: impl Into<String>, label: impl Into<String>) {
        self.entries.push(MappingEntry { key: key.into(), label: label.into() });
    }

    /// Display label for a canonical key (export direction).
    ///
    /// An unmapped key falls back to the key itself.
    pub fn label_for<'a>(&'a self, key: &'a str) -> &'a str {
        self.entries
            .iter()
            .find(|e| e.key == key)
            .map(|e| e.label.as_str())
            .unwrap_or(key)
    }

    /// Canonical key for a display label (import direction).
    ///
    /// Comparison is trimmed and case-insensitive, since imported headers
    /// come back with whatever casing and padding the spreadsheet left.
    pub fn key_for(&self, label: &str) -> Option<&str> {
        let wanted = label.trim().to_lowercase();
        self.entries
            .iter()
            .find(|e| e.label.trim().to_lowercase() == wanted)
            .map(|e| e.key.as_str())
    }

    /// Canonical keys in insertion order. This order is the export column
    /// order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.key.as_str())
    }

    /// Display labels in insertion order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.label.as_str())
    }

    /// Iterate over the entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &MappingEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product_mapping() -> FieldMapping {
        FieldMapping::from_pairs([
            ("sku", "Mã sản phẩm"),
            ("name", "Tên sản phẩm"),
            ("unit_price", "Đơn giá"),
        ])
    }

    #[test]
    fn test_label_for_mapped_key() {
        let mapping = product_mapping();
        assert_eq!(mapping.label_for("unit_price"), "Đơn giá");
    }

    #[test]
    fn test_label_for_unmapped_key_falls_back() {
        let mapping = product_mapping();
        assert_eq!(mapping.label_for("discount"), "discount");
    }

    #[test]
    fn test_key_for_label_case_insensitive() {
        let mapping = FieldMapping::from_pairs([("sku", "SKU Code")]);
        assert_eq!(mapping.key_for("  sku code "), Some("sku"));
        assert_eq!(mapping.key_for("unknown"), None);
    }

    #[test]
    fn test_keys_preserve_insertion_order() {
        let mapping = product_mapping();
        let keys: Vec<&str> = mapping.keys().collect();
        assert_eq!(keys, vec!["sku", "name", "unit_price"]);
    }

    #[test]
    fn test_json_round_trip_preserves_order() {
        let mapping = product_mapping();
        let json = mapping.to_json().unwrap();
        let parsed = FieldMapping::from_json(&json).unwrap();
        assert_eq!(parsed, mapping);
        let keys: Vec<&str> = parsed.keys().collect();
        assert_eq!(keys, vec!["sku", "name", "unit_price"]);
    }

    #[test]
    fn test_json_form_is_entry_array() {
        let json = r#"[{"key":"sku","label":"Mã"},{"key":"name","label":"Tên"}]"#;
        let mapping = FieldMapping::from_json(json).unwrap();
        assert_eq!(mapping.len(), 2);
        assert_eq!(mapping.label_for("name"), "Tên");
    }
}
