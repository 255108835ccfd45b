//! Shared "normalize pipeline" logic used by both the CLI output and the TUI.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! load series -> (cache) -> recession table -> normalize -> daily paths
//!
//! The front-ends can then focus on presentation (printing, files, widgets).

use std::path::PathBuf;

use crate::chart::ViewWindow;
use crate::config::Settings;
use crate::data::loader::find_cached_series;
use crate::data::{LoadedSeries, QuoteProvider, SeriesOrigin, SeriesSource, StooqClient, load, recessions};
use crate::domain::{NppConfig, RecessionWindow, SourceSpec};
use crate::error::{AppError, ErrorKind};
use crate::io::export::{
    OutputNames, build_summary, write_daily_csv, write_monthly_csv, write_peaks_csv, write_raw_csv,
    write_summary_json,
};
use crate::normalize::{DailyPath, NormalizeParams, Normalization, daily_paths, months_to_days, normalize};

/// All computed outputs of a single run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub series: LoadedSeries,
    pub windows: Vec<RecessionWindow>,
    pub normalization: Normalization,
    pub daily: Vec<DailyPath>,
    pub names: OutputNames,
    pub main_window: ViewWindow,
    pub full_window: ViewWindow,
}

/// Execute the full pipeline against the configured source.
pub fn run_npp(config: &NppConfig, settings: &Settings) -> Result<RunOutput, AppError> {
    match &config.source {
        SourceSpec::Remote => {
            let client = StooqClient::new(settings, &config.symbol)?;
            run_npp_with_provider(config, settings, &client)
        }
        SourceSpec::File(path) => {
            let series = load(SeriesSource::Local(path.as_path()), config.start, config.end)?;
            run_npp_with_series(config, series)
        }
        SourceSpec::Cached => {
            let path = find_cached_series(&settings.data_dir, &config.prefix, config.end)?;
            tracing::info!(path = %path.display(), "using cached series");
            let series = load(SeriesSource::Local(path.as_path()), config.start, config.end)?;
            run_npp_with_series(config, series)
        }
    }
}

/// Fetch through `provider`, cache the raw series if enabled, then normalize.
pub fn run_npp_with_provider(
    config: &NppConfig,
    settings: &Settings,
    provider: &dyn QuoteProvider,
) -> Result<RunOutput, AppError> {
    let series = load(SeriesSource::Remote(provider), config.start, config.end)?;
    let run = run_npp_with_series(config, series)?;

    if config.write_cache {
        let path = run.names.raw_csv(&settings.data_dir);
        write_raw_csv(&path, &run.series.observations)?;
        tracing::info!(path = %path.display(), rows = run.series.observations.len(), "cached raw series");
    }
    Ok(run)
}

/// Normalize an already loaded series.
pub fn run_npp_with_series(config: &NppConfig, series: LoadedSeries) -> Result<RunOutput, AppError> {
    let main_window = ViewWindow::new(
        non_negative("main_back_months", config.main_back_months)?,
        non_negative("main_forward_months", config.main_forward_months)?,
    );
    let max_back = non_negative("max_back_months", config.max_back_months)?;

    let windows = match &config.recessions {
        Some(path) => recessions::load_table(path)?,
        None => recessions::default_table()?,
    };

    let params = NormalizeParams {
        peak_search_months: config.peak_search_months,
        horizon_months: config.horizon_months,
        peak_search: config.peak_search,
        clip_to_end: config.clip_to_end,
    };
    let normalization = normalize(&series.observations, &windows, &params)?;

    // `normalize` has validated the horizon by now.
    let horizon = non_negative("horizon_months", config.horizon_months)?;
    let full_window = ViewWindow::new(max_back, horizon);
    let forward = horizon.max(main_window.forward_months);
    let back = max_back.max(main_window.back_months);
    let daily = daily_paths(
        &series.observations,
        &normalization.peaks(),
        months_to_days(back),
        months_to_days(forward),
    );

    let Some(last) = series.last_date() else {
        return Err(AppError::new(ErrorKind::DataUnavailable, "Loaded series is empty."));
    };
    // Downloads are stamped with the last day actually returned; local
    // inputs keep the requested end so offline lookups find them again.
    let stamp = match series.origin {
        SeriesOrigin::Remote => last,
        SeriesOrigin::Local => config.end.unwrap_or(last),
    };
    let names = OutputNames::new(config.prefix.clone(), stamp);

    tracing::info!(
        normalized = normalization.paths.len(),
        skipped = normalization.skipped.len(),
        "normalization complete"
    );

    Ok(RunOutput {
        series,
        windows,
        normalization,
        daily,
        names,
        main_window,
        full_window,
    })
}

fn non_negative(name: &str, value: i32) -> Result<u32, AppError> {
    u32::try_from(value)
        .map_err(|_| AppError::new(ErrorKind::InvalidParameters, format!("{name} must be >= 0 (got {value}).")))
}

/// Write the peak, monthly and daily CSVs (and the JSON summary when asked).
///
/// Returns the written paths in order.
pub fn write_exports(run: &RunOutput, config: &NppConfig, settings: &Settings) -> Result<Vec<PathBuf>, AppError> {
    let dir = &settings.data_dir;
    let mut written = Vec::new();

    let peaks = run.names.peaks_csv(dir);
    write_peaks_csv(&peaks, &run.normalization.peaks())?;
    written.push(peaks);

    let monthly = run.names.monthly_csv(dir);
    write_monthly_csv(&monthly, &run.normalization)?;
    written.push(monthly);

    let daily = run.names.daily_csv(dir);
    write_daily_csv(&daily, &run.daily)?;
    written.push(daily);

    if let Some(path) = &config.export_json {
        let summary = build_summary(&run.series.source_name, &run.series.observations, &run.normalization);
        write_summary_json(path, &summary)?;
        written.push(path.clone());
    }

    for path in &written {
        tracing::info!(path = %path.display(), "wrote export");
    }
    Ok(written)
}

/// Human-readable origin for chart captions.
pub fn source_note(run: &RunOutput, series_name: &str) -> String {
    match run.series.origin {
        SeriesOrigin::Remote => format!("historical {series_name} data from Stooq.com"),
        SeriesOrigin::Local => format!("historical {series_name} data from {}", run.series.source_name),
    }
}
