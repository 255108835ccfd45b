//! Input/output helpers.
//!
//! - close-price CSV ingest (`ingest`)
//! - CSV/JSON exports of the raw series and the normalized paths (`export`)

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;
