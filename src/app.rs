//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and settings
//! - loads and normalizes the series
//! - prints the report and the ASCII plot
//! - writes exports and the HTML chart
//! - optionally hands over to the terminal viewer

use std::time::Duration;

use chrono::NaiveDate;
use clap::Parser;

use crate::chart::html::{ChartOptions, open_in_browser, render_html, write_html};
use crate::chart::chart_series;
use crate::cli::Cli;
use crate::config::Settings;
use crate::domain::{NppConfig, SourceSpec};
use crate::error::{AppError, ErrorKind};
use crate::io::ingest::parse_date;

pub mod pipeline;

const HTML_SIZE: (u32, u32) = (900, 500);

/// Entry point for the `npp` binary.
pub fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    crate::logging::init(cli.verbose);

    let mut settings = Settings::from_env()?;
    if let Some(secs) = cli.timeout_secs {
        if secs == 0 {
            return Err(AppError::new(ErrorKind::InvalidParameters, "--timeout-secs must be > 0."));
        }
        settings.http_timeout = Duration::from_secs(secs);
    }

    let config = npp_config_from_args(&cli)?;
    let run = pipeline::run_npp(&config, &settings)?;

    let series_name = config.prefix.to_uppercase();
    println!(
        "{}",
        crate::report::format_run_summary(&run.series, &run.normalization, &format!("{series_name} normalized peak plot"))
    );

    if config.plot {
        let horizon = run.full_window.forward_months;
        let plot = crate::plot::render_ascii_plot(&run.normalization, horizon, config.plot_width, config.plot_height);
        println!("{plot}");
    }

    for path in pipeline::write_exports(&run, &config, &settings)? {
        println!("Wrote {}", path.display());
    }

    if config.html {
        let opts = ChartOptions {
            series_name: series_name.clone(),
            main: run.main_window,
            full: run.full_window,
            updated: run.names.end,
            source_note: pipeline::source_note(&run, &series_name),
            size: HTML_SIZE,
        };
        let html = render_html(&chart_series(&run.daily), &opts)?;
        let path = run.names.html(&settings.image_dir);
        write_html(&path, &html)?;
        tracing::info!(path = %path.display(), "wrote chart");
        println!("Wrote {}", path.display());

        if config.show {
            open_in_browser(&path)?;
        }
    }

    if config.tui {
        crate::tui::run(&run, &series_name)?;
    }

    Ok(())
}

pub fn npp_config_from_args(args: &Cli) -> Result<NppConfig, AppError> {
    let start = parse_cli_date("--start", &args.start)?;
    let end = if args.end.trim().eq_ignore_ascii_case("today") {
        None
    } else {
        Some(parse_cli_date("--end", &args.end)?)
    };
    if let Some(end) = end {
        if start > end {
            return Err(AppError::new(
                ErrorKind::InvalidParameters,
                format!("--start {start} is after --end {end}."),
            ));
        }
    }

    if args.prefix.trim().is_empty() || args.prefix.contains(['/', '\\']) {
        return Err(AppError::new(
            ErrorKind::InvalidParameters,
            format!("--prefix '{}' must be a plain, non-empty file name prefix.", args.prefix),
        ));
    }

    let source = match (&args.input, args.offline) {
        (Some(path), _) => SourceSpec::File(path.clone()),
        (None, true) => SourceSpec::Cached,
        (None, false) => SourceSpec::Remote,
    };

    Ok(NppConfig {
        source,
        symbol: args.symbol.clone(),
        prefix: args.prefix.clone(),
        start,
        end,
        write_cache: !args.no_cache,

        recessions: args.recessions.clone(),
        peak_search: args.peak_search,
        peak_search_months: args.peak_search_months,
        horizon_months: args.horizon_months,
        clip_to_end: args.clip_to_end,

        main_back_months: args.main_back_months,
        main_forward_months: args.main_forward_months,
        max_back_months: args.max_back_months,

        plot: args.plot && !args.no_plot,
        plot_width: args.width,
        plot_height: args.height,
        html: !args.no_html,
        show: args.show,
        export_json: args.export_json.clone(),
        tui: args.tui,
    })
}

fn parse_cli_date(flag: &str, raw: &str) -> Result<NaiveDate, AppError> {
    parse_date(raw).map_err(|e| AppError::new(ErrorKind::InvalidParameters, format!("{flag}: {e}")))
}
