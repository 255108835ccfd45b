//! Run report for the terminal.

pub mod format;

pub use format::*;
