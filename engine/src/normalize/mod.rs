//! Locale-aware numeric and currency normalization.
//!
//! Source data mixes Vietnamese currency formatting (dot thousands, comma
//! decimal) with plain Western decimal notation, plus currency symbols and
//! percent signs. [`normalize_numeric`] reconciles all of it into a canonical
//! number, degrading to the trimmed original text when no numeric
//! interpretation exists. The function is pure and total; it never fails.
//!
//! Known ambiguity: with a single separator, a lone 3-digit trailing group is
//! read as a thousands group, so `"1.234"` normalizes to `1234`, never
//! `1.234`. Changing that would silently alter previously-accepted values.

use serde::Serialize;
use serde_json::Value;

/// Canonical result of normalizing one raw field.
///
/// Serializes untagged: a JSON number for `Int`/`Float`, a JSON string for
/// `Text`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum NormalizedValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl NormalizedValue {
    /// Whether a numeric interpretation was found.
    pub fn is_numeric(&self) -> bool {
        !matches!(self, NormalizedValue::Text(_))
    }

    /// Convert into a JSON value.
    pub fn into_json(self) -> Value {
        match self {
            NormalizedValue::Int(n) => Value::from(n),
            NormalizedValue::Float(f) => Value::from(f),
            NormalizedValue::Text(s) => Value::from(s),
        }
    }
}

impl std::fmt::Display for NormalizedValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NormalizedValue::Int(n) => write!(f, "{}", n),
            NormalizedValue::Float(v) => write!(f, "{}", v),
            NormalizedValue::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Normalize one raw field string into a canonical number, or keep it as
/// trimmed text when no unambiguous numeric interpretation exists.
///
/// Handles `"1.234,56"` and `"1,234.56"` (both 1234.56), `"240.000"`
/// (240000), `"₫ 50,000"` (50000) and `"-34%"` (-34, percent is stripped
/// without rescaling). `"abc"` comes back unchanged as text.
pub fn normalize_numeric(raw: &str) -> NormalizedValue {
    // Step 1-2: strip BOM and control characters, trim. The trimmed original
    // is also the fallback result for non-numeric input.
    let trimmed: String = raw
        .chars()
        .filter(|c| *c != crate::parser::BOM_CHAR && !c.is_control())
        .collect::<String>()
        .trim()
        .to_string();

    if trimmed.is_empty() {
        return NormalizedValue::Text(String::new());
    }

    // Keep digits, separators and minus; drop currency symbols, letters,
    // spaces. A percent sign is stripped here too, without rescaling:
    // "-34%" is -34, not -0.34.
    let candidate: String = trimmed
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, ',' | '.' | '-'))
        .collect();

    if candidate.is_empty() {
        return NormalizedValue::Text(trimmed);
    }

    // Step 5: separator disambiguation.
    let has_dot = candidate.contains('.');
    let has_comma = candidate.contains(',');
    let candidate = match (has_dot, has_comma) {
        (true, true) => {
            // Whichever separator occurs last is the decimal separator.
            if candidate.rfind(',') > candidate.rfind('.') {
                candidate.replace('.', "").replace(',', ".")
            } else {
                candidate.replace(',', "")
            }
        }
        (false, true) => {
            if is_grouped(&candidate, ',') {
                candidate.replace(',', "")
            } else {
                candidate.replace(',', ".")
            }
        }
        (true, false) => {
            if is_grouped(&candidate, '.') {
                candidate.replace('.', "")
            } else {
                candidate
            }
        }
        (false, false) => candidate,
    };

    // Step 6: strip stray separators left over from the heuristic; a single
    // leading minus stays significant.
    let candidate = candidate
        .trim_start_matches('.')
        .trim_end_matches(['.', '-'])
        .to_string();

    // Step 7-8: parse; integral values collapse to Int.
    match candidate.parse::<f64>() {
        Ok(value) => {
            if value.fract() == 0.0 && value >= i64::MIN as f64 && value <= i64::MAX as f64 {
                NormalizedValue::Int(value as i64)
            } else {
                NormalizedValue::Float(value)
            }
        }
        Err(_) => NormalizedValue::Text(trimmed),
    }
}

/// Thousands-separator heuristic: more than one separator-delimited group and
/// every group after the first has exactly 3 digits.
fn is_grouped(candidate: &str, separator: char) -> bool {
    let groups: Vec<&str> = candidate.split(separator).collect();
    groups.len() > 1
        && groups[1..]
            .iter()
            .all(|g| g.len() == 3 && g.chars().all(|c| c.is_ascii_digit()))
}

/// Normalize the named columns of assembled records in place.
///
/// The table assembler never auto-normalizes; callers pick which columns are
/// numeric and apply this after assembly. Missing columns and non-string
/// values are left untouched.
pub fn normalize_columns(records: &mut [Value], columns: &[String]) {
    for record in records.iter_mut() {
        let Some(obj) = record.as_object_mut() else {
            continue;
        };
        for column in columns {
            if let Some(value) = obj.get_mut(column) {
                if let Some(raw) = value.as_str() {
                    *value = normalize_numeric(raw).into_json();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_vietnamese_currency_format() {
        assert_eq!(normalize_numeric("1.234,56"), NormalizedValue::Float(1234.56));
    }

    #[test]
    fn test_western_format() {
        assert_eq!(normalize_numeric("1,234.56"), NormalizedValue::Float(1234.56));
    }

    #[test]
    fn test_dot_thousands() {
        assert_eq!(normalize_numeric("240.000"), NormalizedValue::Int(240000));
    }

    #[test]
    fn test_negative_percent() {
        assert_eq!(normalize_numeric("-34%"), NormalizedValue::Int(-34));
    }

    #[test]
    fn test_currency_symbol_stripped() {
        assert_eq!(normalize_numeric("₫ 50,000"), NormalizedValue::Int(50000));
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(normalize_numeric(""), NormalizedValue::Text(String::new()));
        assert_eq!(normalize_numeric("   "), NormalizedValue::Text(String::new()));
    }

    #[test]
    fn test_plain_text_unchanged() {
        assert_eq!(normalize_numeric("abc"), NormalizedValue::Text("abc".into()));
    }

    #[test]
    fn test_text_with_whitespace_trimmed() {
        assert_eq!(
            normalize_numeric("  Chưa giao  "),
            NormalizedValue::Text("Chưa giao".into())
        );
    }

    #[test]
    fn test_plain_integer() {
        assert_eq!(normalize_numeric("42"), NormalizedValue::Int(42));
    }

    #[test]
    fn test_plain_decimal() {
        assert_eq!(normalize_numeric("3.14"), NormalizedValue::Float(3.14));
    }

    #[test]
    fn test_comma_decimal() {
        assert_eq!(normalize_numeric("3,5"), NormalizedValue::Float(3.5));
    }

    #[test]
    fn test_multiple_thousand_groups() {
        assert_eq!(normalize_numeric("1.234.567"), NormalizedValue::Int(1234567));
        assert_eq!(normalize_numeric("1,234,567"), NormalizedValue::Int(1234567));
    }

    #[test]
    fn test_single_separator_ambiguity_documented() {
        // "1.234" reads as one thousand two hundred thirty-four by the
        // grouping heuristic, never 1.234.
        assert_eq!(normalize_numeric("1.234"), NormalizedValue::Int(1234));
    }

    #[test]
    fn test_uneven_groups_are_decimal() {
        assert_eq!(normalize_numeric("12.3456"), NormalizedValue::Float(12.3456));
    }

    #[test]
    fn test_percent_with_decimal() {
        assert_eq!(normalize_numeric("12,5%"), NormalizedValue::Float(12.5));
    }

    #[test]
    fn test_determinism() {
        for input in ["1.234,56", "₫ 50,000", "abc", ""] {
            assert_eq!(normalize_numeric(input), normalize_numeric(input));
        }
    }

    #[test]
    fn test_bom_and_control_chars_stripped() {
        assert_eq!(normalize_numeric("\u{feff}100"), NormalizedValue::Int(100));
    }

    #[test]
    fn test_normalize_columns_in_place() {
        let mut records = vec![
            json!({"name": "Pen", "price": "₫ 50,000", "stock": "12"}),
            json!({"name": "Book", "price": "240.000", "stock": "n/a"}),
        ];
        let columns = vec!["price".to_string(), "stock".to_string()];
        normalize_columns(&mut records, &columns);

        assert_eq!(records[0]["price"], json!(50000));
        assert_eq!(records[0]["stock"], json!(12));
        assert_eq!(records[0]["name"], json!("Pen"));
        assert_eq!(records[1]["price"], json!(240000));
        assert_eq!(records[1]["stock"], json!("n/a"));
    }

    #[test]
    fn test_untagged_serialization() {
        assert_eq!(serde_json::to_string(&NormalizedValue::Int(5)).unwrap(), "5");
        assert_eq!(
            serde_json::to_string(&NormalizedValue::Text("x".into())).unwrap(),
            "\"x\""
        );
    }
}
