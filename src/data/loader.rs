//! Series loader: remote fetch or local file, then canonicalization.
//!
//! Whatever the source, the caller gets a strictly increasing, date-unique
//! sequence of positive closes restricted to `[start, end]`.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::data::provider::QuoteProvider;
use crate::domain::RawObservation;
use crate::error::{AppError, ErrorKind};
use crate::io::ingest::read_close_csv;

pub enum SeriesSource<'a> {
    Remote(&'a dyn QuoteProvider),
    Local(&'a Path),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesOrigin {
    Remote,
    Local,
}

#[derive(Debug, Clone)]
pub struct LoadedSeries {
    pub observations: Vec<RawObservation>,
    pub origin: SeriesOrigin,
    /// Provider name or file path.
    pub source_name: String,
    /// Dates that appeared more than once (the later value was kept).
    pub duplicates_replaced: usize,
    /// Rows dropped as missing-value markers.
    pub gaps_skipped: usize,
}

impl LoadedSeries {
    pub fn first_date(&self) -> Option<NaiveDate> {
        self.observations.first().map(|o| o.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.observations.last().map(|o| o.date)
    }
}

/// Load the raw series for `[start, end]`.
///
/// No retries: a failed remote fetch is returned to the caller as-is.
pub fn load(source: SeriesSource<'_>, start: NaiveDate, end: Option<NaiveDate>) -> Result<LoadedSeries, AppError> {
    if let Some(end) = end {
        if start > end {
            return Err(AppError::new(
                ErrorKind::InvalidParameters,
                format!("Start date {start} is after end date {end}."),
            ));
        }
    }

    let (parsed, origin, source_name) = match source {
        SeriesSource::Remote(provider) => (
            provider.fetch_closes(start, end)?,
            SeriesOrigin::Remote,
            provider.name().to_string(),
        ),
        SeriesSource::Local(path) => (
            read_close_csv(path)?,
            SeriesOrigin::Local,
            path.display().to_string(),
        ),
    };

    let (observations, duplicates_replaced) = canonicalize(parsed.rows, start, end);

    if duplicates_replaced > 0 {
        tracing::warn!(
            source = %source_name,
            duplicates = duplicates_replaced,
            "duplicate dates in series; kept the later value for each"
        );
    }

    if observations.is_empty() {
        let window = match end {
            Some(end) => format!("{start}..={end}"),
            None => format!("{start}.."),
        };
        return Err(AppError::new(
            ErrorKind::DataUnavailable,
            format!("No observations in {window} from {source_name}."),
        ));
    }

    tracing::info!(
        source = %source_name,
        rows = observations.len(),
        first = %observations[0].date,
        last = %observations[observations.len() - 1].date,
        "series loaded"
    );

    Ok(LoadedSeries {
        observations,
        origin,
        source_name,
        duplicates_replaced,
        gaps_skipped: parsed.gaps_skipped,
    })
}

/// Restrict to `[start, end]`, sort by date and drop duplicate dates.
///
/// Among rows sharing a date the one appearing later in `rows` wins.
/// Returns the clean sequence and the number of replaced duplicates.
pub fn canonicalize(
    rows: Vec<(NaiveDate, f64)>,
    start: NaiveDate,
    end: Option<NaiveDate>,
) -> (Vec<RawObservation>, usize) {
    let mut rows: Vec<(NaiveDate, f64)> = rows
        .into_iter()
        .filter(|(d, _)| *d >= start && end.is_none_or(|e| *d <= e))
        .collect();

    // Stable sort keeps source order within a date, so "last" means "later".
    rows.sort_by_key(|(d, _)| *d);

    let mut out: Vec<RawObservation> = Vec::with_capacity(rows.len());
    let mut duplicates = 0usize;
    for (date, close) in rows {
        match out.last_mut() {
            Some(prev) if prev.date == date => {
                prev.close = close;
                duplicates += 1;
            }
            _ => out.push(RawObservation::new(date, close)),
        }
    }

    (out, duplicates)
}

/// File name of the cached raw series for a given last date.
pub fn cache_file_name(prefix: &str, date: NaiveDate) -> String {
    format!("{prefix}_close_{}.csv", date.format("%Y-%m-%d"))
}

/// Find the cached raw series file in `dir`.
///
/// Picks the file with the latest embedded date, not after `end` when given.
/// Downloads are stamped with their last trading day, so `--end` on a
/// market holiday still finds the file of the preceding trading day.
pub fn find_cached_series(dir: &Path, prefix: &str, end: Option<NaiveDate>) -> Result<PathBuf, AppError> {
    let entries = std::fs::read_dir(dir).map_err(|e| {
        AppError::new(
            ErrorKind::MissingFile,
            format!("Cannot read data directory '{}': {e}", dir.display()),
        )
    })?;

    let head = format!("{prefix}_close_");
    let mut best: Option<(NaiveDate, PathBuf)> = None;
    for entry in entries.flatten() {
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        let Some(date_part) = name.strip_prefix(&head).and_then(|s| s.strip_suffix(".csv")) else {
            continue;
        };
        let Ok(date) = NaiveDate::parse_from_str(date_part, "%Y-%m-%d") else {
            continue;
        };
        if end.is_some_and(|end| date > end) {
            continue;
        }
        if best.as_ref().is_none_or(|(d, _)| date > *d) {
            best = Some((date, entry.path()));
        }
    }

    best.map(|(_, path)| path).ok_or_else(|| {
        AppError::new(
            ErrorKind::MissingFile,
            format!(
                "No cached '{head}<date>.csv' files{} in '{}'. Run once without --offline to download it.",
                end.map(|e| format!(" up to {e}")).unwrap_or_default(),
                dir.display()
            ),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::ingest::ParsedRows;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    struct FixedProvider(Vec<(NaiveDate, f64)>);

    impl QuoteProvider for FixedProvider {
        fn name(&self) -> &str {
            "fixed"
        }

        fn fetch_closes(&self, _start: NaiveDate, _end: Option<NaiveDate>) -> Result<ParsedRows, AppError> {
            Ok(ParsedRows {
                rows: self.0.clone(),
                gaps_skipped: 1,
            })
        }
    }

    struct DownProvider;

    impl QuoteProvider for DownProvider {
        fn name(&self) -> &str {
            "down"
        }

        fn fetch_closes(&self, _start: NaiveDate, _end: Option<NaiveDate>) -> Result<ParsedRows, AppError> {
            Err(AppError::new(ErrorKind::DataUnavailable, "connection refused"))
        }
    }

    #[test]
    fn canonicalize_sorts_filters_and_keeps_later_duplicate() {
        let rows = vec![
            (d(2020, 1, 3), 3.0),
            (d(2019, 12, 31), 0.5),
            (d(2020, 1, 2), 2.0),
            (d(2020, 1, 3), 33.0),
            (d(2020, 1, 10), 10.0),
        ];
        let (out, dups) = canonicalize(rows, d(2020, 1, 1), Some(d(2020, 1, 5)));
        assert_eq!(
            out,
            vec![RawObservation::new(d(2020, 1, 2), 2.0), RawObservation::new(d(2020, 1, 3), 33.0)]
        );
        assert_eq!(dups, 1);
        assert!(out.windows(2).all(|w| w[0].date < w[1].date));
    }

    #[test]
    fn open_end_keeps_everything_after_start() {
        let rows = vec![(d(2020, 1, 2), 2.0), (d(2030, 1, 2), 4.0)];
        let (out, dups) = canonicalize(rows, d(2020, 1, 1), None);
        assert_eq!(out.len(), 2);
        assert_eq!(dups, 0);
    }

    #[test]
    fn remote_load_reports_counts() {
        let provider = FixedProvider(vec![(d(2020, 1, 2), 2.0), (d(2020, 1, 2), 2.5), (d(2020, 1, 3), 3.0)]);
        let loaded = load(SeriesSource::Remote(&provider), d(2020, 1, 1), None).unwrap();
        assert_eq!(loaded.origin, SeriesOrigin::Remote);
        assert_eq!(loaded.source_name, "fixed");
        assert_eq!(loaded.duplicates_replaced, 1);
        assert_eq!(loaded.gaps_skipped, 1);
        assert_eq!(loaded.observations[0].close, 2.5);
        assert_eq!(loaded.last_date(), Some(d(2020, 1, 3)));
    }

    #[test]
    fn remote_failure_is_not_retried() {
        let err = load(SeriesSource::Remote(&DownProvider), d(2020, 1, 1), None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DataUnavailable);
    }

    #[test]
    fn empty_window_is_unavailable() {
        let provider = FixedProvider(vec![(d(2020, 1, 2), 2.0)]);
        let err = load(SeriesSource::Remote(&provider), d(2021, 1, 1), Some(d(2021, 6, 1))).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DataUnavailable);
    }

    #[test]
    fn start_after_end_is_invalid() {
        let provider = FixedProvider(vec![]);
        let err = load(SeriesSource::Remote(&provider), d(2021, 1, 1), Some(d(2020, 1, 1))).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameters);
    }

    #[test]
    fn cache_names_embed_the_date() {
        assert_eq!(cache_file_name("djia", d(2020, 4, 9)), "djia_close_2020-04-09.csv");
    }

    #[test]
    fn cached_series_lookup_respects_end() {
        let dir = tempfile::tempdir().unwrap();
        for name in [
            "djia_close_2020-04-03.csv",
            "djia_close_2020-04-09.csv",
            "djia_close_pk_2020-04-30.csv",
            "spx_close_2020-04-10.csv",
        ] {
            std::fs::write(dir.path().join(name), "Date,Close\n").unwrap();
        }

        let latest = find_cached_series(dir.path(), "djia", None).unwrap();
        assert!(latest.ends_with("djia_close_2020-04-09.csv"));

        // Saturday 04-11: the download ending Thursday 04-09.
        let weekend = find_cached_series(dir.path(), "djia", Some(d(2020, 4, 11))).unwrap();
        assert!(weekend.ends_with("djia_close_2020-04-09.csv"));

        let earlier = find_cached_series(dir.path(), "djia", Some(d(2020, 4, 8))).unwrap();
        assert!(earlier.ends_with("djia_close_2020-04-03.csv"));

        let err = find_cached_series(dir.path(), "djia", Some(d(2020, 4, 1))).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingFile);
    }
}
