//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - raw series observations (`RawObservation`)
//! - recession reference data (`RecessionWindow`, `PeakRange`)
//! - normalization outputs (`PeakRecord`, `NormalizedPoint`, `DailyPoint`)
//! - the run configuration (`NppConfig`)

pub mod types;

pub use types::*;
