//! Stooq.com daily history download.
//!
//! Stooq serves plain CSV (`Date,Open,High,Low,Close,Volume`) and answers
//! `No data` when the symbol or window has no rows.

use chrono::NaiveDate;
use reqwest::blocking::Client;

use crate::config::Settings;
use crate::data::provider::QuoteProvider;
use crate::error::{AppError, ErrorKind};
use crate::io::ingest::{parse_close_csv, ParsedRows};

pub const DEFAULT_SYMBOL: &str = "^dji";

pub struct StooqClient {
    client: Client,
    base_url: String,
    symbol: String,
    name: String,
}

impl StooqClient {
    pub fn new(settings: &Settings, symbol: &str) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(settings.http_timeout)
            .user_agent(concat!("npp/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::new(ErrorKind::DataUnavailable, format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: settings.stooq_url.clone(),
            symbol: symbol.to_string(),
            name: format!("stooq:{symbol}"),
        })
    }
}

impl QuoteProvider for StooqClient {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch_closes(&self, start: NaiveDate, end: Option<NaiveDate>) -> Result<ParsedRows, AppError> {
        let mut query = vec![
            ("s", self.symbol.clone()),
            ("i", "d".to_string()),
            ("d1", start.format("%Y%m%d").to_string()),
        ];
        if let Some(end) = end {
            query.push(("d2", end.format("%Y%m%d").to_string()));
        }

        tracing::info!(symbol = %self.symbol, %start, end = ?end, "fetching daily closes from Stooq");

        let resp = self
            .client
            .get(&self.base_url)
            .query(&query)
            .send()
            .map_err(|e| AppError::new(ErrorKind::DataUnavailable, format!("Stooq request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::new(
                ErrorKind::DataUnavailable,
                format!("Stooq request failed with status {}.", resp.status()),
            ));
        }

        let body = resp
            .text()
            .map_err(|e| AppError::new(ErrorKind::DataUnavailable, format!("Failed to read Stooq response: {e}")))?;

        parse_stooq_body(&body, &self.symbol)
    }
}

/// Parse a Stooq CSV body. Anything that is not a daily-history table is
/// reported as `DataUnavailable`.
pub fn parse_stooq_body(body: &str, symbol: &str) -> Result<ParsedRows, AppError> {
    let first_line = body.lines().next().unwrap_or("").trim();
    if first_line.is_empty() || first_line.eq_ignore_ascii_case("no data") {
        return Err(AppError::new(
            ErrorKind::DataUnavailable,
            format!("Stooq returned no data for '{symbol}'."),
        ));
    }
    if !first_line.to_ascii_lowercase().contains("date") {
        // Rate-limit notices and HTML error pages end up here.
        return Err(AppError::new(
            ErrorKind::DataUnavailable,
            format!("Unexpected Stooq response for '{symbol}': {}", truncate(first_line, 80)),
        ));
    }

    let parsed = parse_close_csv(body.as_bytes(), "stooq").map_err(|e| {
        AppError::new(
            ErrorKind::DataUnavailable,
            format!("Stooq response for '{symbol}' could not be parsed: {e}"),
        )
    })?;

    if parsed.rows.is_empty() {
        return Err(AppError::new(
            ErrorKind::DataUnavailable,
            format!("Stooq returned no rows for '{symbol}'."),
        ));
    }
    Ok(parsed)
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_daily_history() {
        let body = "Date,Open,High,Low,Close,Volume\n\
                    2020-02-12,29300.1,29568.57,29300.1,29551.42,317421963\n\
                    2020-02-13,29482.34,29500.9,29373.02,29423.31,287905541\n";
        let parsed = parse_stooq_body(body, "^dji").unwrap();
        assert_eq!(parsed.rows.len(), 2);
        assert_eq!(parsed.rows[0].0, NaiveDate::from_ymd_opt(2020, 2, 12).unwrap());
        assert!((parsed.rows[0].1 - 29551.42).abs() < 1e-9);
    }

    #[test]
    fn no_data_is_unavailable() {
        let err = parse_stooq_body("No data", "^dji").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DataUnavailable);

        let err = parse_stooq_body("", "^dji").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DataUnavailable);
    }

    #[test]
    fn header_only_is_unavailable() {
        let err = parse_stooq_body("Date,Open,High,Low,Close,Volume\n", "^dji").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DataUnavailable);
    }

    #[test]
    fn non_csv_body_is_unavailable() {
        let err = parse_stooq_body("Exceeded the daily hits limit", "^dji").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DataUnavailable);
        assert!(err.to_string().contains("Exceeded"));
    }
}
