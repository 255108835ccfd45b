//! Flat-file exports: the raw series, the peaks, the monthly and daily
//! normalized paths, and an optional JSON summary.
//!
//! Floats are written with `{}` (shortest round-trip form) so a raw export
//! read back through `ingest` yields the same observations bit for bit.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::{PeakRecord, RawObservation, Trough};
use crate::error::{AppError, ErrorKind};
use crate::normalize::{DailyPath, Normalization, trough};

/// File names of one run's outputs, all keyed by the series' last date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputNames {
    pub prefix: String,
    pub end: NaiveDate,
}

impl OutputNames {
    pub fn new(prefix: impl Into<String>, end: NaiveDate) -> Self {
        Self {
            prefix: prefix.into(),
            end,
        }
    }

    fn stamp(&self) -> String {
        self.end.format("%Y-%m-%d").to_string()
    }

    pub fn raw_csv(&self, dir: &Path) -> PathBuf {
        dir.join(format!("{}_close_{}.csv", self.prefix, self.stamp()))
    }

    pub fn peaks_csv(&self, dir: &Path) -> PathBuf {
        dir.join(format!("{}_close_pk_{}.csv", self.prefix, self.stamp()))
    }

    pub fn monthly_csv(&self, dir: &Path) -> PathBuf {
        dir.join(format!("{}_npp_mth_{}.csv", self.prefix, self.stamp()))
    }

    pub fn daily_csv(&self, dir: &Path) -> PathBuf {
        dir.join(format!("{}_npp_day_{}.csv", self.prefix, self.stamp()))
    }

    pub fn html(&self, dir: &Path) -> PathBuf {
        dir.join(format!("{}_NPP_mth_{}.html", self.prefix.to_uppercase(), self.stamp()))
    }
}

/// Create `path` (and its parent directory) for buffered writing.
pub fn create_output(path: &Path) -> Result<BufWriter<File>, AppError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| {
            AppError::new(
                ErrorKind::Io,
                format!("Failed to create directory '{}': {e}", parent.display()),
            )
        })?;
    }
    let file = File::create(path)
        .map_err(|e| AppError::new(ErrorKind::Io, format!("Failed to create '{}': {e}", path.display())))?;
    Ok(BufWriter::new(file))
}

fn csv_err(path: &Path, e: csv::Error) -> AppError {
    AppError::new(ErrorKind::Io, format!("Failed to write '{}': {e}", path.display()))
}

fn opt_date(d: Option<NaiveDate>) -> String {
    d.map(|d| d.to_string()).unwrap_or_default()
}

pub fn write_raw_rows<W: Write>(out: W, series: &[RawObservation]) -> csv::Result<()> {
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record(["Date", "Close"])?;
    for o in series {
        wtr.write_record([o.date.to_string(), o.close.to_string()])?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_peak_rows<W: Write>(out: W, peaks: &[PeakRecord]) -> csv::Result<()> {
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record([
        "label",
        "nber_start",
        "nber_end",
        "search_from",
        "search_to",
        "peak_date",
        "peak_value",
    ])?;
    for p in peaks {
        wtr.write_record([
            p.label.clone(),
            p.nber_start.to_string(),
            opt_date(p.nber_end),
            p.search.from.to_string(),
            p.search.to.to_string(),
            p.peak_date.to_string(),
            p.peak_value.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_monthly_rows<W: Write>(out: W, normalization: &Normalization) -> csv::Result<()> {
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record(["label", "months_from_peak", "date", "close", "ratio"])?;
    for path in &normalization.paths {
        for p in &path.points {
            wtr.write_record([
                path.label().to_string(),
                p.months_from_peak.to_string(),
                p.date.to_string(),
                p.close.to_string(),
                p.ratio.to_string(),
            ])?;
        }
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_daily_rows<W: Write>(out: W, paths: &[DailyPath]) -> csv::Result<()> {
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record(["label", "days_from_peak", "date", "close", "ratio"])?;
    for path in paths {
        for p in &path.points {
            wtr.write_record([
                path.label.clone(),
                p.days_from_peak.to_string(),
                p.date.to_string(),
                p.close.to_string(),
                p.ratio.to_string(),
            ])?;
        }
    }
    wtr.flush()?;
    Ok(())
}

/// Write the raw series as `Date,Close`.
pub fn write_raw_csv(path: &Path, series: &[RawObservation]) -> Result<(), AppError> {
    write_raw_rows(create_output(path)?, series).map_err(|e| csv_err(path, e))
}

pub fn write_peaks_csv(path: &Path, peaks: &[PeakRecord]) -> Result<(), AppError> {
    write_peak_rows(create_output(path)?, peaks).map_err(|e| csv_err(path, e))
}

pub fn write_monthly_csv(path: &Path, normalization: &Normalization) -> Result<(), AppError> {
    write_monthly_rows(create_output(path)?, normalization).map_err(|e| csv_err(path, e))
}

pub fn write_daily_csv(path: &Path, paths: &[DailyPath]) -> Result<(), AppError> {
    write_daily_rows(create_output(path)?, paths).map_err(|e| csv_err(path, e))
}

/// JSON summary schema.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryFile {
    pub tool: String,
    pub source: String,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub observations: usize,
    pub recessions: Vec<SummaryRecession>,
    pub skipped: Vec<SummarySkipped>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryRecession {
    #[serde(flatten)]
    pub peak: PeakRecord,
    pub trough: Option<Trough>,
    pub points: Vec<crate::domain::NormalizedPoint>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SummarySkipped {
    pub label: String,
    pub reason: String,
}

pub fn build_summary(source: &str, series: &[RawObservation], normalization: &Normalization) -> SummaryFile {
    SummaryFile {
        tool: "npp".to_string(),
        source: source.to_string(),
        first_date: series.first().map(|o| o.date),
        last_date: series.last().map(|o| o.date),
        observations: series.len(),
        recessions: normalization
            .paths
            .iter()
            .map(|p| SummaryRecession {
                peak: p.peak.clone(),
                trough: trough(&p.points),
                points: p.points.clone(),
            })
            .collect(),
        skipped: normalization
            .skipped
            .iter()
            .map(|(label, err)| SummarySkipped {
                label: label.clone(),
                reason: err.to_string(),
            })
            .collect(),
    }
}

/// Write the JSON summary of a run.
pub fn write_summary_json(path: &Path, summary: &SummaryFile) -> Result<(), AppError> {
    let out = create_output(path)?;
    serde_json::to_writer_pretty(out, summary)
        .map_err(|e| AppError::new(ErrorKind::Io, format!("Failed to write summary JSON '{}': {e}", path.display())))
}
