//! Peak normalization.
//!
//! For each recession window:
//!
//! - pick the peak-search interval (calendar months around the declared start,
//!   or the table's own range)
//! - locate the peak (maximum close, earliest on ties)
//! - rebase the series to the peak at whole-month offsets
//!
//! Everything here is a pure function of its inputs.

pub mod paths;
pub mod peak;

pub use paths::*;
pub use peak::*;

use crate::domain::{NormalizedPoint, PeakRecord, PeakSearchMode, RawObservation, RecessionWindow};
use crate::error::{AppError, ErrorKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizeParams {
    pub peak_search_months: i32,
    pub horizon_months: i32,
    pub peak_search: PeakSearchMode,
    /// End each path at the recession's declared end.
    pub clip_to_end: bool,
}

impl Default for NormalizeParams {
    fn default() -> Self {
        Self {
            peak_search_months: 2,
            horizon_months: 12,
            peak_search: PeakSearchMode::Window,
            clip_to_end: false,
        }
    }
}

impl NormalizeParams {
    /// Validated `(peak_search_months, horizon_months)`.
    fn months(&self) -> Result<(u32, u32), AppError> {
        let search = u32::try_from(self.peak_search_months).map_err(|_| {
            AppError::new(
                ErrorKind::InvalidParameters,
                format!("peak_search_months must be >= 0 (got {}).", self.peak_search_months),
            )
        })?;
        let horizon = u32::try_from(self.horizon_months).map_err(|_| {
            AppError::new(
                ErrorKind::InvalidParameters,
                format!("horizon_months must be >= 0 (got {}).", self.horizon_months),
            )
        })?;
        Ok((search, horizon))
    }
}

/// Normalized path of one recession.
#[derive(Debug, Clone, PartialEq)]
pub struct RecessionPath {
    pub peak: PeakRecord,
    pub points: Vec<NormalizedPoint>,
}

impl RecessionPath {
    pub fn label(&self) -> &str {
        &self.peak.label
    }
}

/// Result of [`normalize`]: paths in table order plus the recessions that
/// could not be normalized and why.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalization {
    pub paths: Vec<RecessionPath>,
    pub skipped: Vec<(String, AppError)>,
}

impl Normalization {
    pub fn get(&self, label: &str) -> Option<&RecessionPath> {
        self.paths.iter().find(|p| p.label() == label)
    }

    pub fn peaks(&self) -> Vec<PeakRecord> {
        self.paths.iter().map(|p| p.peak.clone()).collect()
    }
}

/// Normalize `series` (sorted, date-unique) against every recession window.
///
/// A window without observations in its search interval is skipped with a
/// warning; the others still proceed.
pub fn normalize(
    series: &[RawObservation],
    windows: &[RecessionWindow],
    params: &NormalizeParams,
) -> Result<Normalization, AppError> {
    let (search_months, horizon) = params.months()?;

    let mut paths = Vec::with_capacity(windows.len());
    let mut skipped = Vec::new();

    for window in windows {
        let range = search_range(window, params.peak_search, search_months)?;
        let peak = match find_peak(series, window, range) {
            Ok(peak) => peak,
            Err(err) if err.kind() == ErrorKind::NoObservationsInWindow => {
                tracing::warn!(label = %window.label, "{err}");
                skipped.push((window.label.clone(), err));
                continue;
            }
            Err(err) => return Err(err),
        };

        let clip_after = if params.clip_to_end { window.nber_end } else { None };
        let points = monthly_path(series, &peak, horizon, clip_after);
        tracing::debug!(
            label = %peak.label,
            peak_date = %peak.peak_date,
            peak_value = peak.peak_value,
            months = points.len(),
            "recession normalized"
        );
        paths.push(RecessionPath { peak, points });
    }

    Ok(Normalization { paths, skipped })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PeakRange;
    use chrono::{Datelike, NaiveDate};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn obs(y: i32, m: u32, day: u32, close: f64) -> RawObservation {
        RawObservation::new(d(y, m, day), close)
    }

    fn covid() -> RecessionWindow {
        RecessionWindow::new("Feb 2020 - present", d(2020, 2, 1), None)
    }

    #[test]
    fn covid_scenario() {
        let series = [
            obs(2020, 1, 1, 100.0),
            obs(2020, 2, 1, 110.0),
            obs(2020, 3, 1, 90.0),
            obs(2020, 4, 1, 80.0),
        ];
        let windows = [RecessionWindow::new("COVID", d(2020, 2, 1), None)];
        let params = NormalizeParams {
            peak_search_months: 1,
            horizon_months: 2,
            ..NormalizeParams::default()
        };
        let out = normalize(&series, &windows, &params).unwrap();

        let path = out.get("COVID").unwrap();
        assert_eq!(path.peak.search, PeakRange { from: d(2020, 1, 1), to: d(2020, 3, 1) });
        assert_eq!(path.peak.peak_date, d(2020, 2, 1));
        assert_eq!(path.peak.peak_value, 110.0);

        let got: Vec<(u32, f64)> = path.points.iter().map(|p| (p.months_from_peak, p.ratio)).collect();
        assert_eq!(got, vec![(0, 1.0), (1, 90.0 / 110.0), (2, 80.0 / 110.0)]);
        assert!(out.skipped.is_empty());
    }

    #[test]
    fn ratio_at_peak_is_exactly_one() {
        let series: Vec<_> = (1..=28).map(|day| obs(2008, 2, day, 12000.0 + 37.3 * f64::from(day % 7))).collect();
        let windows = [RecessionWindow::new("Dec 2007 - Jun 2009", d(2007, 12, 1), Some(d(2009, 6, 30)))];
        let out = normalize(&series, &windows, &NormalizeParams::default()).unwrap();
        for path in &out.paths {
            assert_eq!(path.points[0].months_from_peak, 0);
            assert_eq!(path.points[0].ratio, 1.0);
        }
    }

    #[test]
    fn window_before_series_is_skipped_alone() {
        let series = [obs(2020, 2, 1, 110.0), obs(2020, 3, 1, 90.0)];
        let windows = [
            RecessionWindow::new("Aug 1929 - Mar 1933", d(1929, 8, 1), Some(d(1933, 3, 31))),
            covid(),
        ];
        let out = normalize(&series, &windows, &NormalizeParams::default()).unwrap();
        assert_eq!(out.paths.len(), 1);
        assert_eq!(out.paths[0].label(), "Feb 2020 - present");
        assert_eq!(out.skipped.len(), 1);
        assert_eq!(out.skipped[0].0, "Aug 1929 - Mar 1933");
        assert_eq!(out.skipped[0].1.kind(), ErrorKind::NoObservationsInWindow);
    }

    #[test]
    fn table_order_is_preserved() {
        let series = [obs(2001, 3, 1, 10.0), obs(2008, 1, 2, 13.0), obs(2020, 2, 3, 29.0)];
        let windows = [
            covid(),
            RecessionWindow::new("Mar 2001 - Nov 2001", d(2001, 3, 1), Some(d(2001, 11, 30))),
            RecessionWindow::new("Dec 2007 - Jun 2009", d(2007, 12, 1), Some(d(2009, 6, 30))),
        ];
        let out = normalize(&series, &windows, &NormalizeParams::default()).unwrap();
        let labels: Vec<&str> = out.paths.iter().map(|p| p.label()).collect();
        assert_eq!(labels, vec!["Feb 2020 - present", "Mar 2001 - Nov 2001", "Dec 2007 - Jun 2009"]);
    }

    #[test]
    fn normalize_is_deterministic() {
        let series: Vec<_> = (0..400)
            .filter_map(|i| d(2019, 6, 1).checked_add_days(chrono::Days::new(i)))
            .map(|date| RawObservation::new(date, 100.0 + (date.ordinal() as f64).sin() * 10.0))
            .collect();
        let params = NormalizeParams::default();
        let a = normalize(&series, &[covid()], &params).unwrap();
        let b = normalize(&series, &[covid()], &params).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn negative_parameters_are_rejected() {
        let series = [obs(2020, 2, 1, 110.0)];
        let params = NormalizeParams { peak_search_months: -1, ..NormalizeParams::default() };
        let err = normalize(&series, &[covid()], &params).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameters);

        let params = NormalizeParams { horizon_months: -3, ..NormalizeParams::default() };
        let err = normalize(&series, &[covid()], &params).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameters);
    }

    #[test]
    fn zero_horizon_yields_only_the_peak() {
        let series = [obs(2020, 2, 1, 110.0), obs(2020, 3, 1, 90.0)];
        let params = NormalizeParams { horizon_months: 0, ..NormalizeParams::default() };
        let out = normalize(&series, &[covid()], &params).unwrap();
        assert_eq!(out.paths[0].points.len(), 1);
    }
}
