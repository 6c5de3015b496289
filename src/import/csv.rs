//! Minimal RFC 4180 CSV reader and writer.
//!
//! The reader is a character scanner that understands quoted fields,
//! doubled quotes, commas and line breaks inside quotes, and LF, CRLF or
//! bare CR record terminators. Every record carries the physical line it
//! starts on so import errors can point at the right place in the file.

use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CsvError {
    #[error("line {line}: unterminated quoted field")]
    UnterminatedQuote { line: usize },

    #[error("line {line}: unexpected character {found:?} after closing quote")]
    AfterQuote { line: usize, found: char },

    #[error("missing header row")]
    MissingHeader,
}

/// One parsed record and the 1-based line it starts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvRecord {
    pub line: usize,
    pub fields: Vec<String>,
}

impl CsvRecord {
    fn is_blank(&self) -> bool {
        self.fields.iter().all(|f| f.trim().is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    FieldStart,
    Unquoted,
    Quoted,
    /// Saw a quote inside a quoted field: either an escaped quote or the end.
    QuoteInQuoted,
}

/// Splits `input` into records. Blank lines are skipped.
pub fn parse_records(input: &str) -> Result<Vec<CsvRecord>, CsvError> {
    let input = input.strip_prefix('\u{feff}').unwrap_or(input);

    let mut records = Vec::new();
    let mut fields: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut state = State::FieldStart;
    let mut line = 1;
    let mut record_line = 1;
    let mut quote_line = 1;
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        match (state, c) {
            (State::Quoted, '"') => state = State::QuoteInQuoted,
            (State::Quoted, c) => {
                if c == '\n' || (c == '\r' && chars.peek() != Some(&'\n')) {
                    line += 1;
                }
                field.push(c);
            }
            (State::QuoteInQuoted, '"') => {
                field.push('"');
                state = State::Quoted;
            }
            (State::FieldStart, '"') => {
                state = State::Quoted;
                quote_line = line;
            }
            (_, ',') => {
                fields.push(std::mem::take(&mut field));
                state = State::FieldStart;
            }
            (_, '\r' | '\n') => {
                if c == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
                fields.push(std::mem::take(&mut field));
                push_record(&mut records, record_line, std::mem::take(&mut fields));
                line += 1;
                record_line = line;
                state = State::FieldStart;
            }
            (State::QuoteInQuoted, found) => {
                return Err(CsvError::AfterQuote { line, found });
            }
            (State::FieldStart | State::Unquoted, c) => {
                field.push(c);
                state = State::Unquoted;
            }
        }
    }

    match state {
        State::Quoted => return Err(CsvError::UnterminatedQuote { line: quote_line }),
        State::FieldStart if fields.is_empty() && field.is_empty() => {}
        _ => {
            fields.push(field);
            push_record(&mut records, record_line, fields);
        }
    }
    Ok(records)
}

fn push_record(records: &mut Vec<CsvRecord>, line: usize, fields: Vec<String>) {
    let record = CsvRecord { line, fields };
    if !record.is_blank() {
        records.push(record);
    }
}

/// Parses a CSV document with a header row into JSON objects keyed by
/// header name, each paired with its starting line.
///
/// Short rows leave trailing columns out; extra cells beyond the header are
/// ignored.
pub fn parse_with_header(input: &str) -> Result<Vec<(usize, Value)>, CsvError> {
    let mut records = parse_records(input)?.into_iter();
    let header = records.next().ok_or(CsvError::MissingHeader)?;
    let columns: Vec<String> = header.fields.iter().map(|h| h.trim().to_string()).collect();

    Ok(records
        .map(|record| {
            let mut object = Map::new();
            for (column, value) in columns.iter().zip(record.fields) {
                if !column.is_empty() {
                    object.insert(column.clone(), Value::String(value));
                }
            }
            (record.line, Value::Object(object))
        })
        .collect())
}

/// Appends one CSV row terminated by CRLF, quoting fields as needed.
pub fn write_row<S: AsRef<str>>(out: &mut String, fields: &[S]) {
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        write_field(out, field.as_ref());
    }
    out.push_str("\r\n");
}

fn write_field(out: &mut String, field: &str) {
    let needs_quotes = field.contains([',', '"', '\n', '\r'])
        || field.starts_with(' ')
        || field.ends_with(' ');
    if !needs_quotes {
        out.push_str(field);
        return;
    }
    out.push('"');
    for c in field.chars() {
        if c == '"' {
            out.push('"');
        }
        out.push(c);
    }
    out.push('"');
}
