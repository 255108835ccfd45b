//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during normalization
//! - exported to CSV/JSON
//! - loaded from the recession table configuration

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// One trading day of the raw series.
///
/// `close` is always finite and `> 0` once the loader hands it out.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawObservation {
    pub date: NaiveDate,
    pub close: f64,
}

impl RawObservation {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Self { date, close }
    }
}

/// Inclusive date range used for peak search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeakRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl PeakRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }
}

/// A recession as declared by the NBER business-cycle table.
///
/// This is reference data supplied as configuration, never derived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecessionWindow {
    pub label: String,
    pub nber_start: NaiveDate,
    /// `None` for a recession that has not been declared over.
    #[serde(default)]
    pub nber_end: Option<NaiveDate>,
    /// Hand-picked peak search range, used with [`PeakSearchMode::Table`].
    #[serde(default)]
    pub peak_range: Option<PeakRange>,
}

impl RecessionWindow {
    pub fn new(label: impl Into<String>, nber_start: NaiveDate, nber_end: Option<NaiveDate>) -> Self {
        Self {
            label: label.into(),
            nber_start,
            nber_end,
            peak_range: None,
        }
    }

    pub fn with_peak_range(mut self, from: NaiveDate, to: NaiveDate) -> Self {
        self.peak_range = Some(PeakRange { from, to });
        self
    }
}

/// The pre-recession peak located for one window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeakRecord {
    pub label: String,
    pub nber_start: NaiveDate,
    pub nber_end: Option<NaiveDate>,
    pub search: PeakRange,
    pub peak_date: NaiveDate,
    pub peak_value: f64,
}

/// One point of a recession's monthly normalized path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedPoint {
    pub months_from_peak: u32,
    /// Date of the observation actually used for this offset.
    pub date: NaiveDate,
    pub close: f64,
    pub ratio: f64,
}

/// One point of a recession's daily normalized path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyPoint {
    /// Calendar days from the peak date (negative before the peak).
    pub days_from_peak: i64,
    pub date: NaiveDate,
    pub close: f64,
    pub ratio: f64,
}

/// Lowest point of a monthly path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Trough {
    pub months_from_peak: u32,
    pub date: NaiveDate,
    pub ratio: f64,
}

/// How the peak-search interval of a recession is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PeakSearchMode {
    /// `nber_start ± peak_search_months`.
    Window,
    /// The table's hand-picked `peak_range`, falling back to `Window` when absent.
    Table,
}

/// Where the raw series comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSpec {
    /// Fetch from the remote provider.
    Remote,
    /// Read an explicit local CSV.
    File(PathBuf),
    /// Read the cached CSV from the data directory.
    Cached,
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct NppConfig {
    pub source: SourceSpec,
    pub symbol: String,
    /// Prefix for every output file name (`djia` → `djia_close_<date>.csv`).
    pub prefix: String,
    pub start: NaiveDate,
    /// `None` means "most recent available".
    pub end: Option<NaiveDate>,
    pub write_cache: bool,

    pub recessions: Option<PathBuf>,
    pub peak_search: PeakSearchMode,
    pub peak_search_months: i32,
    pub horizon_months: i32,
    pub clip_to_end: bool,

    /// Main (default) chart window, months before/after the peak.
    pub main_back_months: i32,
    pub main_forward_months: i32,
    /// Months before the peak kept in the daily paths.
    pub max_back_months: i32,

    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,
    pub html: bool,
    pub show: bool,
    pub export_json: Option<PathBuf>,
    pub tui: bool,
}
