//! Tolerant CSV parser with encoding and delimiter auto-detection.
//!
//! The parse core never fails on malformed data. Unterminated quotes, short
//! rows and long rows are recovered leniently and reported as
//! [`ParseWarning`]s; hard failures are file IO only.
//!
//! Parsing runs in three passes over the decoded text:
//!
//! 1. [`Delimiter::detect`] picks one separator for the whole file.
//! 2. [`join_records`] regroups physical lines into logical records, merging
//!    lines that sit inside an open quoted field (double-quote parity).
//! 3. [`split_fields`] tokenizes each record with an `in_quotes` state
//!    machine that resolves doubled-quote escapes.
//!
//! The first record becomes the header row; every following record becomes a
//! JSON object keyed by header, padded or truncated to the header width.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::path::Path;

use crate::error::{ImportError, ImportResult};

/// Byte-order mark; Excel writes it, the parser strips it.
pub const BOM_CHAR: char = '\u{feff}';

// =============================================================================
// Delimiter Detection
// =============================================================================

/// The field separator used for a whole file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Delimiter {
    Tab,
    Semicolon,
    Comma,
}

impl Delimiter {
    /// Detect the delimiter for the whole file, by presence order:
    /// any tab wins, else any semicolon, else comma.
    ///
    /// This is a single global decision, never re-detected mid-file:
    /// per-row counting is ambiguous when quoted text itself contains
    /// delimiter characters.
    pub fn detect(text: &str) -> Self {
        if text.contains('\t') {
            Delimiter::Tab
        } else if text.contains(';') {
            Delimiter::Semicolon
        } else {
            Delimiter::Comma
        }
    }

    /// The literal separator character.
    pub fn as_char(self) -> char {
        match self {
            Delimiter::Tab => '\t',
            Delimiter::Semicolon => ';',
            Delimiter::Comma => ',',
        }
    }

    /// Printable form for logs and metadata ("TAB", ";", ",").
    pub fn display(self) -> &'static str {
        match self {
            Delimiter::Tab => "TAB",
            Delimiter::Semicolon => ";",
            Delimiter::Comma => ",",
        }
    }
}

// =============================================================================
// Warnings
// =============================================================================

/// Typed diagnostic attached to a lenient recovery during parsing.
///
/// Recovery always happens; the warning only reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ParseWarning {
    /// The file ended inside an open quoted field; the trailing buffer was
    /// still emitted as a record.
    UnterminatedQuote,
    /// A data row had fewer fields than the header; missing trailing fields
    /// were padded with empty strings.
    ShortRow { row: usize, expected: usize, found: usize },
    /// A data row had more fields than the header; the extras were dropped.
    LongRow { row: usize, expected: usize, found: usize },
}

// =============================================================================
// Record Joiner
// =============================================================================

/// Regroup physical lines into logical CSV records.
///
/// Blank lines are discarded. A record is complete when the double-quote
/// count across its accumulated lines is even; an odd count means a quoted
/// field continues onto the next line, which is joined back with a literal
/// `\n`. Doubled-quote escapes come in pairs, so the naive tally keeps the
/// correct parity.
///
/// A non-empty buffer at end of input (unterminated quote) is emitted as a
/// final record anyway, with a warning.
pub fn join_records(text: &str) -> (Vec<String>, Option<ParseWarning>) {
    let text = text.strip_prefix(BOM_CHAR).unwrap_or(text);

    let mut records = Vec::new();
    let mut buffer = String::new();
    let mut quote_count = 0usize;

    for line in text.split('\n') {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if line.trim().is_empty() {
            continue;
        }

        if !buffer.is_empty() {
            buffer.push('\n');
        }
        buffer.push_str(line);
        quote_count += line.matches('"').count();

        if quote_count % 2 == 0 {
            records.push(std::mem::take(&mut buffer));
            quote_count = 0;
        }
    }

    let mut warning = None;
    if !buffer.is_empty() {
        // Unterminated quote at end of file: best-effort recovery.
        records.push(buffer);
        warning = Some(ParseWarning::UnterminatedQuote);
    }

    (records, warning)
}

// =============================================================================
// Field Tokenizer
// =============================================================================

/// Split one logical record into raw fields.
///
/// A record with N-1 unquoted delimiters yields exactly N fields. After
/// splitting, each field is trimmed; a field that still starts *and* ends
/// with a literal quote loses that one symmetric pair (defensive cleanup for
/// malformed input - a field whose content merely ends in a quote is left
/// alone).
pub fn split_fields(record: &str, delimiter: char) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = record.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '"' {
            if in_quotes && chars.peek() == Some(&'"') {
                // Escaped quote: emit one literal quote, consume both.
                current.push('"');
                chars.next();
            } else {
                in_quotes = !in_quotes;
            }
        } else if ch == delimiter && !in_quotes {
            fields.push(std::mem::take(&mut current));
        } else {
            current.push(ch);
        }
    }
    fields.push(current);

    fields.into_iter().map(|f| clean_field(&f)).collect()
}

fn clean_field(field: &str) -> String {
    let trimmed = field.trim();
    if trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"') {
        trimmed[1..trimmed.len() - 1].to_string()
    } else {
        trimmed.to_string()
    }
}

// =============================================================================
// Table Assembly
// =============================================================================

/// A parsed table: ordered headers plus one JSON object per data row.
///
/// Every record holds exactly the header key set, all values strings, in
/// header order (serde_json's `preserve_order` keeps object insertion order).
#[derive(Debug, Clone, Serialize)]
pub struct ParsedTable {
    /// Column headers, in file order.
    pub headers: Vec<String>,
    /// Data rows as JSON objects keyed by header.
    pub records: Vec<Value>,
}

/// Result of parsing with metadata.
#[derive(Debug, Clone, Serialize)]
pub struct ParseResult {
    /// The assembled table.
    pub table: ParsedTable,
    /// Detected or assumed encoding.
    pub encoding: String,
    /// Detected delimiter.
    pub delimiter: Delimiter,
    /// Lenient-recovery diagnostics, in row order.
    pub warnings: Vec<ParseWarning>,
}

/// Parse decoded text with an explicit delimiter.
///
/// The first record is the header row. Data rows are padded with `""` when
/// short and truncated when long, so every record carries exactly the header
/// key set. Warning row numbers count data rows from 1.
pub fn parse_text(text: &str, delimiter: Delimiter) -> (ParsedTable, Vec<ParseWarning>) {
    let (records, join_warning) = join_records(text);
    let mut warnings: Vec<ParseWarning> = join_warning.into_iter().collect();

    let mut records_iter = records.into_iter();
    let headers = match records_iter.next() {
        Some(header_record) => split_fields(&header_record, delimiter.as_char()),
        None => {
            return (ParsedTable { headers: vec![], records: vec![] }, warnings);
        }
    };

    let mut rows = Vec::new();
    for (idx, record) in records_iter.enumerate() {
        let fields = split_fields(&record, delimiter.as_char());

        if fields.len() < headers.len() {
            warnings.push(ParseWarning::ShortRow {
                row: idx + 1,
                expected: headers.len(),
                found: fields.len(),
            });
        } else if fields.len() > headers.len() {
            warnings.push(ParseWarning::LongRow {
                row: idx + 1,
                expected: headers.len(),
                found: fields.len(),
            });
        }

        let mut obj = Map::new();
        for (i, header) in headers.iter().enumerate() {
            let value = fields.get(i).map(String::as_str).unwrap_or("");
            obj.insert(header.clone(), json!(value));
        }
        rows.push(Value::Object(obj));
    }

    (ParsedTable { headers, records: rows }, warnings)
}

/// Parse decoded text with delimiter auto-detection.
pub fn parse_table(text: &str) -> ParseResult {
    let delimiter = Delimiter::detect(text);
    let (table, warnings) = parse_text(text, delimiter);
    ParseResult {
        table,
        encoding: "utf-8".to_string(),
        delimiter,
        warnings,
    }
}

/// Parse raw bytes with auto-detection of encoding and delimiter.
pub fn parse_bytes_auto(bytes: &[u8]) -> ParseResult {
    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding);
    let delimiter = Delimiter::detect(&content);
    let (table, warnings) = parse_text(&content, delimiter);
    ParseResult {
        table,
        encoding,
        delimiter,
        warnings,
    }
}

/// Parse a CSV file with auto-detection of encoding and delimiter.
pub fn parse_file_auto<P: AsRef<Path>>(path: P) -> ImportResult<ParseResult> {
    let bytes = std::fs::read(path.as_ref()).map_err(ImportError::Io)?;
    Ok(parse_bytes_auto(&bytes))
}

// =============================================================================
// Encoding
// =============================================================================

/// Detect the encoding of raw bytes using chardet.
pub fn detect_encoding(bytes: &[u8]) -> String {
    let guess = chardet::detect(bytes).0;

    // Normalize charset names
    match guess.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        other => other.to_string(),
    }
}

/// Decode bytes to text using the detected encoding.
///
/// Unknown encodings fall back to lossy UTF-8, so decoding never fails.
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    match encoding.to_lowercase().as_str() {
        "iso-8859-1" | "latin-1" | "latin1" => {
            encoding_rs::ISO_8859_15.decode(bytes).0.to_string()
        }
        "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.to_string(),
        _ => String::from_utf8_lossy(bytes).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_delimiter_tab_wins() {
        assert_eq!(Delimiter::detect("a\tb;c,d"), Delimiter::Tab);
    }

    #[test]
    fn test_detect_delimiter_semicolon() {
        assert_eq!(Delimiter::detect("a;b,c"), Delimiter::Semicolon);
    }

    #[test]
    fn test_detect_delimiter_comma_default() {
        assert_eq!(Delimiter::detect("a,b,c"), Delimiter::Comma);
        assert_eq!(Delimiter::detect("no separators at all"), Delimiter::Comma);
    }

    #[test]
    fn test_join_simple_lines() {
        let (records, warning) = join_records("a,b\n1,2\n3,4");
        assert_eq!(records, vec!["a,b", "1,2", "3,4"]);
        assert!(warning.is_none());
    }

    #[test]
    fn test_join_blank_lines_discarded() {
        let (records, _) = join_records("a,b\n\n  \n1,2\n");
        assert_eq!(records, vec!["a,b", "1,2"]);
    }

    #[test]
    fn test_join_multiline_quoted_field() {
        let (records, warning) = join_records("a,b\n1,\"line one\nline two\"\n3,4");
        assert_eq!(records, vec!["a,b", "1,\"line one\nline two\"", "3,4"]);
        assert!(warning.is_none());
    }

    #[test]
    fn test_join_escaped_quotes_keep_parity() {
        let (records, warning) = join_records("a\n\"He said \"\"hi\"\"\"");
        assert_eq!(records.len(), 2);
        assert!(warning.is_none());
    }

    #[test]
    fn test_join_unterminated_quote_recovered() {
        let (records, warning) = join_records("a,b\n1,\"open\nstill open");
        assert_eq!(records.len(), 2);
        assert_eq!(records[1], "1,\"open\nstill open");
        assert_eq!(warning, Some(ParseWarning::UnterminatedQuote));
    }

    #[test]
    fn test_join_strips_bom() {
        let (records, _) = join_records("\u{feff}a,b\n1,2");
        assert_eq!(records[0], "a,b");
    }

    #[test]
    fn test_split_plain_fields() {
        assert_eq!(split_fields("a,b,c", ','), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_split_empty_fields() {
        assert_eq!(split_fields("a,,c,", ','), vec!["a", "", "c", ""]);
    }

    #[test]
    fn test_split_quoted_delimiter() {
        assert_eq!(split_fields("\"1,5\",x", ','), vec!["1,5", "x"]);
    }

    #[test]
    fn test_split_escaped_quote() {
        assert_eq!(
            split_fields("\"He said \"\"hi\"\"\",x", ','),
            vec!["He said \"hi\"", "x"]
        );
    }

    #[test]
    fn test_split_trailing_quote_is_content() {
        // Symmetric strip only; a field merely ending in a quote keeps it.
        assert_eq!(split_fields("said \"hi\",x", ','), vec!["said \"hi\"", "x"]);
    }

    #[test]
    fn test_split_stray_symmetric_quotes_stripped() {
        assert_eq!(split_fields("\"a\"b\"c\"", ','), vec!["abc"]);
    }

    #[test]
    fn test_parse_simple_table() {
        let result = parse_table("name,qty\nPen,3\nBook,5");
        assert_eq!(result.delimiter, Delimiter::Comma);
        assert_eq!(result.table.headers, vec!["name", "qty"]);
        assert_eq!(result.table.records.len(), 2);
        assert_eq!(result.table.records[0]["name"], "Pen");
        assert_eq!(result.table.records[1]["qty"], "5");
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_parse_short_row_padded() {
        let result = parse_table("a,b,c\n1,2");
        assert_eq!(result.table.records[0]["c"], "");
        assert_eq!(
            result.warnings,
            vec![ParseWarning::ShortRow { row: 1, expected: 3, found: 2 }]
        );
    }

    #[test]
    fn test_parse_long_row_truncated() {
        let result = parse_table("a,b\n1,2,3,4");
        let obj = result.table.records[0].as_object().unwrap();
        assert_eq!(obj.len(), 2);
        assert_eq!(
            result.warnings,
            vec![ParseWarning::LongRow { row: 1, expected: 2, found: 4 }]
        );
    }

    #[test]
    fn test_parse_record_key_order_matches_headers() {
        let result = parse_table("z,a,m\n1,2,3");
        let keys: Vec<&String> = result.table.records[0]
            .as_object()
            .unwrap()
            .keys()
            .collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_parse_empty_input() {
        let result = parse_table("");
        assert!(result.table.headers.is_empty());
        assert!(result.table.records.is_empty());
    }

    #[test]
    fn test_parse_semicolon_file() {
        let result = parse_table("name;qty\nPen;3");
        assert_eq!(result.delimiter, Delimiter::Semicolon);
        assert_eq!(result.table.records[0]["qty"], "3");
    }

    #[test]
    fn test_parse_tab_file() {
        let result = parse_table("name\tqty\nPen\t3");
        assert_eq!(result.delimiter, Delimiter::Tab);
        assert_eq!(result.table.records[0]["name"], "Pen");
    }

    #[test]
    fn test_parse_multiline_field_preserved() {
        let result = parse_table("note,x\n\"first\nsecond\",1");
        assert_eq!(result.table.records[0]["note"], "first\nsecond");
    }

    #[test]
    fn test_parse_crlf_lines() {
        let result = parse_table("a,b\r\n1,2\r\n");
        assert_eq!(result.table.records.len(), 1);
        assert_eq!(result.table.records[0]["b"], "2");
    }

    #[test]
    fn test_auto_parse_bytes() {
        let result = parse_bytes_auto("name,qty\nPen,3".as_bytes());
        assert_eq!(result.encoding, "utf-8");
        assert_eq!(result.table.records.len(), 1);
    }

    #[test]
    fn test_latin1_decoding() {
        // "Société" in ISO-8859-1
        let bytes: &[u8] = &[0x53, 0x6F, 0x63, 0x69, 0xE9, 0x74, 0xE9];
        let decoded = decode_content(bytes, "iso-8859-1");
        assert!(decoded.contains("Soci"));
    }
}
