//! Pre-recession peak search.

use chrono::{Months, NaiveDate};

use crate::domain::{PeakRange, PeakRecord, PeakSearchMode, RawObservation, RecessionWindow};
use crate::error::{AppError, ErrorKind};

/// Interval searched for the peak of `window`.
///
/// `Window` mode uses `nber_start ± months` with calendar-month arithmetic
/// (day clamped to the month's end). `Table` mode prefers the window's own
/// `peak_range` and falls back to the same interval when it has none.
pub fn search_range(window: &RecessionWindow, mode: PeakSearchMode, months: u32) -> Result<PeakRange, AppError> {
    if let (PeakSearchMode::Table, Some(range)) = (mode, window.peak_range) {
        return Ok(range);
    }

    let span = Months::new(months);
    let from = window.nber_start.checked_sub_months(span);
    let to = window.nber_start.checked_add_months(span);
    match (from, to) {
        (Some(from), Some(to)) => Ok(PeakRange { from, to }),
        _ => Err(AppError::new(
            ErrorKind::InvalidParameters,
            format!("Peak search of ±{months} months around {} is out of the calendar range.", window.nber_start),
        )),
    }
}

/// Observations of `series` (sorted by date) falling inside `range`.
pub fn observations_in(series: &[RawObservation], range: PeakRange) -> &[RawObservation] {
    let lo = series.partition_point(|o| o.date < range.from);
    let hi = series.partition_point(|o| o.date <= range.to);
    if lo >= hi { &[] } else { &series[lo..hi] }
}

/// Locate the maximum close within `range`.
///
/// On equal maxima the earliest date wins.
pub fn find_peak(series: &[RawObservation], window: &RecessionWindow, range: PeakRange) -> Result<PeakRecord, AppError> {
    let candidates = observations_in(series, range);

    let mut best: Option<&RawObservation> = None;
    for obs in candidates {
        // Strict `>` keeps the first of equal values.
        if best.is_none_or(|b| obs.close > b.close) {
            best = Some(obs);
        }
    }

    let Some(best) = best else {
        return Err(AppError::new(
            ErrorKind::NoObservationsInWindow,
            format!(
                "{}: no observations between {} and {}.",
                window.label, range.from, range.to
            ),
        ));
    };

    Ok(PeakRecord {
        label: window.label.clone(),
        nber_start: window.nber_start,
        nber_end: window.nber_end,
        search: range,
        peak_date: best.date,
        peak_value: best.close,
    })
}

/// Calendar date `months` after `date`, clamped to the end of the month.
pub(crate) fn add_months(date: NaiveDate, months: u32) -> Option<NaiveDate> {
    date.checked_add_months(Months::new(months))
}
