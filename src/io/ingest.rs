//! CSV ingest for `(date, close)` series.
//!
//! This module turns a daily-close CSV (our own cache files, Stooq downloads,
//! or hand-made files) into `(date, value)` rows in file order. Sorting and
//! de-duplication happen later in the loader.
//!
//! Design goals:
//! - **Strict values**: a row that is neither a positive number nor a
//!   missing-value marker is a hard `MalformedData` error with its line number
//! - **Gap tolerant**: missing-value markers (`.`, `na`, `NaN`, ...) are
//!   skipped and counted, they mark non-trading days
//! - **Header tolerant**: columns are found by name, otherwise by position

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use csv::StringRecord;

use crate::error::{AppError, ErrorKind};

const MISSING_MARKERS: [&str; 5] = ["", ".", "na", "nan", "null"];

/// Rows parsed from a CSV, in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedRows {
    pub rows: Vec<(NaiveDate, f64)>,
    /// Rows skipped because the value was a missing-value marker.
    pub gaps_skipped: usize,
}

/// Read a local close-price CSV.
pub fn read_close_csv(path: &Path) -> Result<ParsedRows, AppError> {
    if !path.exists() {
        return Err(AppError::new(
            ErrorKind::MissingFile,
            format!("Series file '{}' does not exist.", path.display()),
        ));
    }
    let file = File::open(path).map_err(|e| {
        AppError::new(
            ErrorKind::MissingFile,
            format!("Failed to open series file '{}': {e}", path.display()),
        )
    })?;
    parse_close_csv(file, &path.display().to_string())
}

/// Parse a close-price CSV from any reader.
///
/// `origin` only appears in error messages.
pub fn parse_close_csv<R: Read>(reader: R, origin: &str) -> Result<ParsedRows, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| malformed(origin, 1, format!("unreadable header: {e}")))?
        .clone();
    let (date_idx, close_idx) = resolve_columns(&headers);

    let mut out = ParsedRows::default();

    for (idx, result) in reader.records().enumerate() {
        // +2: records() starts after the header and CSV lines are 1-based.
        let line = idx + 2;
        let record = result.map_err(|e| malformed(origin, line, format!("CSV parse error: {e}")))?;

        let raw_date = record.get(date_idx).unwrap_or("");
        let date = parse_date(raw_date).map_err(|e| malformed(origin, line, e))?;

        let raw_value = record.get(close_idx).unwrap_or("");
        if is_missing(raw_value) {
            out.gaps_skipped += 1;
            continue;
        }
        let value = parse_positive(raw_value).map_err(|e| malformed(origin, line, e))?;
        out.rows.push((date, value));
    }

    Ok(out)
}

fn malformed(origin: &str, line: usize, message: String) -> AppError {
    AppError::new(ErrorKind::MalformedData, format!("{origin}:{line}: {message}"))
}

fn resolve_columns(headers: &StringRecord) -> (usize, usize) {
    let mut date_idx = None;
    let mut close_idx = None;
    for (idx, name) in headers.iter().enumerate() {
        match normalize_header_name(name).as_str() {
            "date" if date_idx.is_none() => date_idx = Some(idx),
            "close" if close_idx.is_none() => close_idx = Some(idx),
            _ => {}
        }
    }
    match (date_idx, close_idx) {
        (Some(d), Some(c)) => (d, c),
        // Unnamed columns: date first, value second.
        _ => (0, 1),
    }
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn is_missing(raw: &str) -> bool {
    let trimmed = raw.trim();
    MISSING_MARKERS.iter().any(|m| trimmed.eq_ignore_ascii_case(m))
}

fn parse_positive(raw: &str) -> Result<f64, String> {
    let v: f64 = raw
        .trim()
        .parse()
        .map_err(|_| format!("invalid value '{raw}' (expected a positive number)"))?;
    if v.is_finite() && v > 0.0 {
        Ok(v)
    } else {
        Err(format!("value '{raw}' must be finite and > 0"))
    }
}

/// Parse a calendar date in one of the accepted formats.
pub fn parse_date(s: &str) -> Result<NaiveDate, String> {
    const FMTS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%Y%m%d", "%m/%d/%Y"];
    let s = s.trim();
    for fmt in FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    // pandas writes timestamps when the index was a DatetimeIndex.
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Ok(dt.date());
    }
    Err(format!(
        "invalid date '{s}' (expected YYYY-MM-DD, YYYY/MM/DD, YYYYMMDD or MM/DD/YYYY)"
    ))
}
