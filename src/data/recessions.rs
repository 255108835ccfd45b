//! Recession reference table.
//!
//! The built-in table is `config/recessions.toml`, compiled into the binary.
//! `--recessions <file>` swaps in a user-maintained table with the same schema.

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;

use crate::domain::RecessionWindow;
use crate::error::{AppError, ErrorKind};

const DEFAULT_TABLE: &str = include_str!("../../config/recessions.toml");

#[derive(Debug, Deserialize)]
struct TableFile {
    recession: Vec<RecessionWindow>,
}

/// The 15 NBER recessions from the Great Depression to the 2020 recession.
pub fn default_table() -> Result<Vec<RecessionWindow>, AppError> {
    parse_table(DEFAULT_TABLE)
}

/// Load a recession table from a TOML file.
pub fn load_table(path: &Path) -> Result<Vec<RecessionWindow>, AppError> {
    if !path.exists() {
        return Err(AppError::new(
            ErrorKind::MissingFile,
            format!("Recession table '{}' does not exist.", path.display()),
        ));
    }
    let text = std::fs::read_to_string(path).map_err(|e| {
        AppError::new(
            ErrorKind::Io,
            format!("Failed to read recession table '{}': {e}", path.display()),
        )
    })?;
    parse_table(&text)
}

pub fn parse_table(text: &str) -> Result<Vec<RecessionWindow>, AppError> {
    let file: TableFile = toml::from_str(text)
        .map_err(|e| AppError::new(ErrorKind::MalformedData, format!("Invalid recession table: {e}")))?;
    validate_table(&file.recession)?;
    Ok(file.recession)
}

fn validate_table(windows: &[RecessionWindow]) -> Result<(), AppError> {
    if windows.is_empty() {
        return Err(AppError::new(
            ErrorKind::InvalidParameters,
            "Recession table has no entries.",
        ));
    }

    let mut seen = HashSet::new();
    for w in windows {
        if w.label.trim().is_empty() {
            return Err(AppError::new(
                ErrorKind::InvalidParameters,
                format!("Recession starting {} has an empty label.", w.nber_start),
            ));
        }
        if !seen.insert(w.label.as_str()) {
            return Err(AppError::new(
                ErrorKind::InvalidParameters,
                format!("Duplicate recession label '{}'.", w.label),
            ));
        }
        if let Some(end) = w.nber_end {
            if end < w.nber_start {
                return Err(AppError::new(
                    ErrorKind::InvalidParameters,
                    format!("Recession '{}' ends ({end}) before it starts ({}).", w.label, w.nber_start),
                ));
            }
        }
        if let Some(range) = w.peak_range {
            if range.to < range.from {
                return Err(AppError::new(
                    ErrorKind::InvalidParameters,
                    format!("Recession '{}' has an inverted peak_range.", w.label),
                ));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn default_table_has_fifteen_recessions_in_order() {
        let table = default_table().unwrap();
        assert_eq!(table.len(), 15);
        assert_eq!(table[0].label, "Aug 1929 - Mar 1933");
        assert!(table.windows(2).all(|w| w[0].nber_start < w[1].nber_start));

        let current = table.last().unwrap();
        assert_eq!(current.nber_start, NaiveDate::from_ymd_opt(2020, 2, 1).unwrap());
        assert_eq!(current.nber_end, None);
        assert!(table.iter().all(|w| w.peak_range.is_some()));
    }

    #[test]
    fn optional_fields_may_be_omitted() {
        let table = parse_table(
            r#"
            [[recession]]
            label = "COVID"
            nber_start = "2020-02-01"
            "#,
        )
        .unwrap();
        assert_eq!(table[0].nber_end, None);
        assert_eq!(table[0].peak_range, None);
    }

    #[test]
    fn rejects_duplicate_labels() {
        let err = parse_table(
            r#"
            [[recession]]
            label = "A"
            nber_start = "2001-03-01"
            [[recession]]
            label = "A"
            nber_start = "2007-12-01"
            "#,
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameters);
    }

    #[test]
    fn rejects_end_before_start() {
        let err = parse_table(
            r#"
            [[recession]]
            label = "A"
            nber_start = "2001-03-01"
            nber_end = "2000-03-01"
            "#,
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameters);
    }

    #[test]
    fn syntax_errors_are_malformed_data() {
        let err = parse_table("[[recession]\nlabel = ").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedData);
    }

    #[test]
    fn missing_table_file() {
        let err = load_table(Path::new("does/not/exist.toml")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingFile);
    }
}
