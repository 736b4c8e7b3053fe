//! CSV parsing for uploaded constituent files.
//!
//! Only structure is checked here: the file must be a table, carry `name` and
//! `weight` columns, have at least one row, and every weight must be a
//! number or blank. Business rules live in [`crate::validator`].

use crate::constituent::Constituent;
use crate::error::{ParseError, Result};
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Column holding the constituent symbol.
pub const NAME_COLUMN: &str = "name";

/// Column holding the constituent weight.
pub const WEIGHT_COLUMN: &str = "weight";

/// Cell values read as a missing number rather than rejected.
const MISSING_MARKERS: &[&str] = &["NA", "N/A", "n/a", "NaN", "nan", "-NaN", "-nan", "null", "NULL", "None", "#N/A", "<NA>"];

/// Parser for `name,weight` constituent files.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstituentParser;

impl ConstituentParser {
    /// Create a new parser.
    pub const fn new() -> Self {
        Self
    }

    /// Parse raw upload bytes into constituents, preserving row order.
    ///
    /// `filename` is only used for log output.
    ///
    /// # Errors
    /// The first structural problem found, checked in this order: format,
    /// duplicate columns, missing columns, no rows, non-numeric weight.
    pub fn parse(&self, content: &[u8], filename: &str) -> Result<Vec<Constituent>> {
        info!("Parsing ETF file: {} ({} bytes)", filename, content.len());

        let text = std::str::from_utf8(content).map_err(|e| {
            warn!("Upload {} is not valid UTF-8: {}", filename, e);
            ParseError::FormatInvalid(e.to_string())
        })?;

        let constituents = self.parse_str(text)?;
        info!("Successfully parsed {} constituents", constituents.len());
        Ok(constituents)
    }

    /// Parse CSV text into constituents.
    pub fn parse_str(&self, text: &str) -> Result<Vec<Constituent>> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let (headers, rows) = read_table(text)?;
        debug!("CSV parsed: {} rows, {} columns", rows.len(), headers.len());

        let duplicates = duplicate_headers(&headers);
        if !duplicates.is_empty() {
            warn!("Duplicate columns in upload: {:?}", duplicates);
            return Err(ParseError::DuplicateColumns(duplicates));
        }

        let (Some(name_idx), Some(weight_idx)) = (
            headers.iter().position(|h| h == NAME_COLUMN),
            headers.iter().position(|h| h == WEIGHT_COLUMN),
        ) else {
            warn!("Missing required columns. Found: {:?}", headers);
            return Err(ParseError::MissingColumns(headers));
        };

        if rows.is_empty() {
            warn!("CSV file contains no data rows");
            return Err(ParseError::Empty);
        }

        rows.iter()
            .enumerate()
            .map(|(i, row)| {
                let symbol = row.get(name_idx).cloned().unwrap_or_default();
                let raw = row.get(weight_idx).map(String::as_str).unwrap_or_default();
                let weight = parse_weight(raw).ok_or_else(|| {
                    warn!("Invalid weight value '{}' on row {}", raw, i + 1);
                    ParseError::NonNumericWeight {
                        row: i + 1,
                        value: raw.to_string(),
                    }
                })?;
                Ok(Constituent::new(symbol, weight))
            })
            .collect()
    }
}

/// Split CSV text into a header and data rows.
///
/// Short rows are padded with blanks; rows longer than the header are a
/// format error.
fn read_table(text: &str) -> Result<(Vec<String>, Vec<Vec<String>>)> {
    if let Some(line) = unterminated_quote_line(text) {
        return Err(ParseError::FormatInvalid(format!(
            "EOF inside string starting at line {}",
            line
        )));
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| ParseError::FormatInvalid(e.to_string()))?
        .iter()
        .map(str::to_string)
        .collect();

    if headers.is_empty() || headers.iter().all(|h| h.trim().is_empty()) {
        return Err(ParseError::FormatInvalid(
            "No columns to parse from file".to_string(),
        ));
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| ParseError::FormatInvalid(e.to_string()))?;
        if record.len() > headers.len() {
            let line = record.position().map_or(0, |p| p.line());
            return Err(ParseError::FormatInvalid(format!(
                "Expected {} fields in line {}, saw {}",
                headers.len(),
                line,
                record.len()
            )));
        }

        let mut row: Vec<String> = record.iter().map(str::to_string).collect();
        row.resize(headers.len(), String::new());
        rows.push(row);
    }

    Ok((headers, rows))
}

/// Line (1-based) of a quoted field that is still open at the end of `text`.
///
/// A quote opens a field only at the start of the field; `""` inside a quoted
/// field is an escaped quote. Quotes anywhere else are literal.
fn unterminated_quote_line(text: &str) -> Option<usize> {
    let mut chars = text.chars().peekable();
    let mut line = 1;
    let mut field_start = true;
    let mut opened_at: Option<usize> = None;

    while let Some(c) = chars.next() {
        if opened_at.is_some() {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                }
                '"' => opened_at = None,
                '\n' => line += 1,
                _ => {}
            }
            continue;
        }

        match c {
            '"' if field_start => {
                opened_at = Some(line);
                field_start = false;
            }
            ',' | '\r' => field_start = true,
            '\n' => {
                line += 1;
                field_start = true;
            }
            _ => field_start = false,
        }
    }

    opened_at
}

/// Header names occurring more than once, in order of first appearance.
fn duplicate_headers(headers: &[String]) -> Vec<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for header in headers {
        *counts.entry(header.as_str()).or_insert(0) += 1;
    }

    let mut duplicates: Vec<String> = Vec::new();
    for header in headers {
        if counts[header.as_str()] > 1 && !duplicates.contains(header) {
            duplicates.push(header.clone());
        }
    }
    duplicates
}

/// Blank and missing-value cells become NaN; anything else must parse.
fn parse_weight(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || MISSING_MARKERS.contains(&trimmed) {
        return Some(f64::NAN);
    }
    trimmed.parse::<f64>().ok()
}
