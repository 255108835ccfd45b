//! Command-line parsing for the recession normalized peak plot.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! loading/normalizing code. There are no subcommands: one invocation is one
//! run.

use std::path::PathBuf;

use clap::{ArgAction, Parser};

use crate::domain::PeakSearchMode;

/// Top-level CLI.
#[derive(Debug, Parser, Clone)]
#[command(
    name = "npp",
    version,
    about = "Normalized peak plot of a daily index across U.S. recessions",
    allow_negative_numbers = true
)]
pub struct Cli {
    /// Months either side of the recession start searched for the peak.
    #[arg(long, default_value_t = 2)]
    pub peak_search_months: i32,

    /// Months after the peak covered by the normalized paths.
    #[arg(long, default_value_t = 12)]
    pub horizon_months: i32,

    /// Months after the peak shown in the main chart window.
    #[arg(long, default_value_t = 6)]
    pub main_forward_months: i32,

    /// Months before the peak shown in the main chart window.
    #[arg(long, default_value_t = 1)]
    pub main_back_months: i32,

    /// Months before the peak kept in the daily paths and the full chart.
    #[arg(long, default_value_t = 3)]
    pub max_back_months: i32,

    /// First date of the series to load (YYYY-MM-DD).
    #[arg(long, default_value = "1896-05-27")]
    pub start: String,

    /// Last date of the series to load (YYYY-MM-DD or `today`).
    #[arg(long, default_value = "today")]
    pub end: String,

    /// Stooq symbol to download.
    #[arg(long, default_value = crate::data::stooq::DEFAULT_SYMBOL)]
    pub symbol: String,

    /// Prefix of every output file name.
    #[arg(long, default_value = "djia")]
    pub prefix: String,

    /// Read the series from this CSV instead of downloading it.
    #[arg(long, value_name = "CSV")]
    pub input: Option<PathBuf>,

    /// Use the cached series in the data directory instead of downloading.
    #[arg(long, conflicts_with = "input")]
    pub offline: bool,

    /// Do not write the downloaded series to the data directory.
    #[arg(long)]
    pub no_cache: bool,

    /// Recession table (TOML) replacing the built-in one.
    #[arg(long, value_name = "TOML")]
    pub recessions: Option<PathBuf>,

    /// How each recession's peak-search interval is chosen.
    #[arg(long, value_enum, default_value_t = PeakSearchMode::Window)]
    pub peak_search: PeakSearchMode,

    /// End each monthly path at the recession's declared end.
    #[arg(long)]
    pub clip_to_end: bool,

    /// Render an ASCII plot in the terminal (enabled by default).
    #[arg(long, default_value_t = true)]
    pub plot: bool,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Skip the HTML chart.
    #[arg(long)]
    pub no_html: bool,

    /// Open the HTML chart in the default browser.
    #[arg(long, conflicts_with = "no_html")]
    pub show: bool,

    /// Export peaks and monthly paths to JSON.
    #[arg(long, value_name = "JSON")]
    pub export_json: Option<PathBuf>,

    /// Explore the daily paths in an interactive terminal viewer.
    #[arg(long)]
    pub tui: bool,

    /// HTTP timeout in seconds (overrides NPP_HTTP_TIMEOUT_SECS).
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// More log output (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}
