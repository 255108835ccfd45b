//! Peak-relative paths: monthly offsets and the daily view.

use chrono::{NaiveDate, TimeDelta};
use serde::Serialize;

use crate::domain::{DailyPoint, NormalizedPoint, PeakRecord, RawObservation, Trough};
use crate::normalize::peak::add_months;

/// A monthly offset whose nearest observation is further away than this
/// ends the path (exchange closures, e.g. Aug-Dec 1914).
pub const MAX_OFFSET_GAP_DAYS: i64 = 15;

/// Day-count year used to turn month windows into day windows.
pub const DAYS_PER_YEAR: f64 = 364.25;

pub fn months_to_days(months: u32) -> i64 {
    (f64::from(months) * DAYS_PER_YEAR / 12.0).round() as i64
}

/// Observation closest to `target`; the earlier one on equal distance.
pub fn nearest_observation(series: &[RawObservation], target: NaiveDate) -> Option<&RawObservation> {
    let idx = series.partition_point(|o| o.date < target);
    let after = series.get(idx);
    let before = idx.checked_sub(1).and_then(|i| series.get(i));
    match (before, after) {
        (Some(b), Some(a)) => {
            let db = (target - b.date).num_days();
            let da = (a.date - target).num_days();
            if da < db { Some(a) } else { Some(b) }
        }
        (Some(b), None) => Some(b),
        (None, a) => a,
    }
}

/// Monthly path from the peak out to `horizon_months`.
///
/// Stops early when the target date passes the last observation, when the
/// nearest observation is more than [`MAX_OFFSET_GAP_DAYS`] away, or when the
/// target passes `clip_after`.
pub fn monthly_path(
    series: &[RawObservation],
    peak: &PeakRecord,
    horizon_months: u32,
    clip_after: Option<NaiveDate>,
) -> Vec<NormalizedPoint> {
    let Some(last) = series.last().map(|o| o.date) else {
        return Vec::new();
    };

    let mut points = Vec::new();
    for m in 0..=horizon_months {
        let Some(target) = add_months(peak.peak_date, m) else { break };
        if target > last {
            break;
        }
        if clip_after.is_some_and(|end| target > end) {
            break;
        }
        let Some(obs) = nearest_observation(series, target) else { break };
        if (obs.date - target).num_days().abs() > MAX_OFFSET_GAP_DAYS {
            tracing::debug!(
                label = %peak.label,
                months_from_peak = m,
                %target,
                nearest = %obs.date,
                "no observation close to target month; path ends"
            );
            break;
        }
        points.push(NormalizedPoint {
            months_from_peak: m,
            date: obs.date,
            close: obs.close,
            ratio: obs.close / peak.peak_value,
        });
    }
    points
}

/// Daily path of one recession.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyPath {
    pub label: String,
    pub peak_date: NaiveDate,
    pub points: Vec<DailyPoint>,
}

/// Every observation between `back_days` before and `forward_days` after
/// each peak, rebased to the peak value.
///
/// A window reaching past the calendar range is open on that side.
pub fn daily_paths(
    series: &[RawObservation],
    peaks: &[PeakRecord],
    back_days: i64,
    forward_days: i64,
) -> Vec<DailyPath> {
    peaks
        .iter()
        .map(|peak| {
            let lo = TimeDelta::try_days(back_days)
                .and_then(|d| peak.peak_date.checked_sub_signed(d))
                .unwrap_or(NaiveDate::MIN);
            let hi = TimeDelta::try_days(forward_days)
                .and_then(|d| peak.peak_date.checked_add_signed(d))
                .unwrap_or(NaiveDate::MAX);
            let start = series.partition_point(|o| o.date < lo);
            let points = series[start..]
                .iter()
                .take_while(|o| o.date <= hi)
                .map(|o| DailyPoint {
                    days_from_peak: (o.date - peak.peak_date).num_days(),
                    date: o.date,
                    close: o.close,
                    ratio: o.close / peak.peak_value,
                })
                .collect();
            DailyPath {
                label: peak.label.clone(),
                peak_date: peak.peak_date,
                points,
            }
        })
        .collect()
}

/// Lowest ratio of a monthly path, earliest on ties.
pub fn trough(points: &[NormalizedPoint]) -> Option<Trough> {
    let mut best: Option<&NormalizedPoint> = None;
    for p in points {
        if best.is_none_or(|b| p.ratio < b.ratio) {
            best = Some(p);
        }
    }
    best.map(|p| Trough {
        months_from_peak: p.months_from_peak,
        date: p.date,
        ratio: p.ratio,
    })
}
