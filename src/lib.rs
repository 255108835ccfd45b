//! `recession-npp` library crate.
//!
//! The binary (`npp`) is a thin wrapper around this library so that:
//!
//! - the loader and the normalizer are testable without spawning processes
//! - the same run can feed the report, the exports, the HTML chart and the TUI

pub mod app;
pub mod chart;
pub mod cli;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod logging;
pub mod normalize;
pub mod plot;
pub mod report;
pub mod tui;
