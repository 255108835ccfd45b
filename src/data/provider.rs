//! Remote quote provider seam.
//!
//! The loader only needs "daily closes between two dates"; the trait keeps the
//! HTTP client swappable and lets tests run the pipeline without a network.

use chrono::NaiveDate;

use crate::error::AppError;
use crate::io::ingest::ParsedRows;

pub trait QuoteProvider {
    /// Human-readable name used in logs and the run report.
    fn name(&self) -> &str;

    /// Fetch daily closes for `[start, end]`; `end = None` means "through the
    /// latest available day".
    ///
    /// Implementations return rows in the provider's order and fail with
    /// `ErrorKind::DataUnavailable` when the source is unreachable or empty.
    fn fetch_closes(&self, start: NaiveDate, end: Option<NaiveDate>) -> Result<ParsedRows, AppError>;
}
