//! Chart model shared by the HTML export and the terminal viewer.
//!
//! The x axis is calendar days from the peak; ticks sit on whole months and
//! are labelled `-1mth`, `peak`, `+3mth`. Series styling follows a fixed
//! scheme: the oldest recession in blue, the newest in black (both thick),
//! the rest from the Category20 palette.

pub mod html;

use crate::normalize::{DAYS_PER_YEAR, DailyPath};

/// Share of the data range added on each side of a view.
pub const PADDING_FRAC: f64 = 0.07;

/// d3/bokeh Category20.
pub const CATEGORY20: [(u8, u8, u8); 20] = [
    (0x1f, 0x77, 0xb4),
    (0xae, 0xc7, 0xe8),
    (0xff, 0x7f, 0x0e),
    (0xff, 0xbb, 0x78),
    (0x2c, 0xa0, 0x2c),
    (0x98, 0xdf, 0x8a),
    (0xd6, 0x27, 0x28),
    (0xff, 0x98, 0x96),
    (0x94, 0x67, 0xbd),
    (0xc5, 0xb0, 0xd5),
    (0x8c, 0x56, 0x4b),
    (0xc4, 0x9c, 0x94),
    (0xe3, 0x77, 0xc2),
    (0xf7, 0xb6, 0xd2),
    (0x7f, 0x7f, 0x7f),
    (0xc7, 0xc7, 0xc7),
    (0xbc, 0xbd, 0x22),
    (0xdb, 0xdb, 0x8d),
    (0x17, 0xbe, 0xcf),
    (0x9e, 0xda, 0xe5),
];

const OLDEST_COLOR: (u8, u8, u8) = (0, 0, 255);
const NEWEST_COLOR: (u8, u8, u8) = (0, 0, 0);
const THICK: u32 = 5;
const THIN: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesStyle {
    pub color: (u8, u8, u8),
    pub width: u32,
}

/// Style of series `index` out of `count`, in table order (oldest first).
pub fn series_style(index: usize, count: usize) -> SeriesStyle {
    if index == 0 {
        SeriesStyle { color: OLDEST_COLOR, width: THICK }
    } else if index + 1 == count {
        SeriesStyle { color: NEWEST_COLOR, width: THICK }
    } else {
        SeriesStyle {
            color: CATEGORY20[(index - 1) % CATEGORY20.len()],
            width: THIN,
        }
    }
}

/// One drawable line: `(days_from_peak, ratio)` points.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub label: String,
    pub points: Vec<(f64, f64)>,
    pub style: SeriesStyle,
}

pub fn chart_series(paths: &[DailyPath]) -> Vec<ChartSeries> {
    let count = paths.len();
    paths
        .iter()
        .enumerate()
        .map(|(i, path)| ChartSeries {
            label: path.label.clone(),
            points: path
                .points
                .iter()
                .map(|p| (p.days_from_peak as f64, p.ratio))
                .collect(),
            style: series_style(i, count),
        })
        .collect()
}

/// Signed month offset to days (same rounding as the daily window).
pub fn month_offset_days(months: i32) -> f64 {
    (f64::from(months) * DAYS_PER_YEAR / 12.0).round()
}

pub fn month_label(months: i32) -> String {
    match months {
        0 => "peak".to_string(),
        m if m > 0 => format!("+{m}mth"),
        m => format!("{m}mth"),
    }
}

/// Label for a day position: the month label when it sits on a month tick.
pub fn day_axis_label(days: f64) -> String {
    let months = (days * 12.0 / DAYS_PER_YEAR).round() as i32;
    if (month_offset_days(months) - days).abs() < 0.5 {
        month_label(months)
    } else {
        format!("{days:.0}d")
    }
}

/// Plot window in months around the peak.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewWindow {
    pub back_months: u32,
    pub forward_months: u32,
}

impl ViewWindow {
    pub fn new(back_months: u32, forward_months: u32) -> Self {
        Self { back_months, forward_months }
    }

    /// Unpadded `(from, to)` in days from the peak.
    pub fn day_range(&self) -> (f64, f64) {
        (
            -month_offset_days(i32::try_from(self.back_months).unwrap_or(i32::MAX)),
            month_offset_days(i32::try_from(self.forward_months).unwrap_or(i32::MAX)),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewBounds {
    pub x: [f64; 2],
    pub y: [f64; 2],
}

/// Padded bounds for `window`: the y range covers the visible points of the
/// series not in `muted`.
pub fn view_bounds(series: &[ChartSeries], window: ViewWindow, muted: &[bool]) -> ViewBounds {
    view_bounds_days(series, window.day_range(), muted)
}

/// Same as [`view_bounds`] for an arbitrary `(from, to)` day range.
pub fn view_bounds_days(series: &[ChartSeries], (x0, x1): (f64, f64), muted: &[bool]) -> ViewBounds {
    let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for (i, s) in series.iter().enumerate() {
        if muted.get(i).copied().unwrap_or(false) {
            continue;
        }
        for &(x, y) in &s.points {
            if x >= x0 && x <= x1 {
                y_min = y_min.min(y);
                y_max = y_max.max(y);
            }
        }
    }
    if !(y_min.is_finite() && y_max.is_finite()) {
        y_min = 0.5;
        y_max = 1.5;
    }
    if y_max - y_min < 1e-9 {
        // A single visible value.
        y_min -= 0.05;
        y_max += 0.05;
    }

    let y_pad = (y_max - y_min) * PADDING_FRAC;
    let x_pad = (x1 - x0).max(1.0) * PADDING_FRAC;
    ViewBounds {
        x: [x0 - x_pad, x1 + x_pad],
        y: [y_min - y_pad, y_max + y_pad],
    }
}

/// Points of `s` inside `[x0, x1]`.
pub fn clip_points(s: &ChartSeries, x0: f64, x1: f64) -> Vec<(f64, f64)> {
    s.points.iter().copied().filter(|&(x, _)| x >= x0 && x <= x1).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DailyPoint;
    use chrono::NaiveDate;

    fn line(label: &str, pts: &[(f64, f64)]) -> ChartSeries {
        ChartSeries {
            label: label.to_string(),
            points: pts.to_vec(),
            style: series_style(1, 3),
        }
    }

    #[test]
    fn styling_highlights_oldest_and_newest() {
        assert_eq!(series_style(0, 15), SeriesStyle { color: (0, 0, 255), width: 5 });
        assert_eq!(series_style(14, 15), SeriesStyle { color: (0, 0, 0), width: 5 });
        assert_eq!(series_style(1, 15).color, CATEGORY20[0]);
        assert_eq!(series_style(13, 15).color, CATEGORY20[12]);
        assert_eq!(series_style(5, 15).width, 2);
    }

    #[test]
    fn month_labels_and_ticks() {
        assert_eq!(month_label(0), "peak");
        assert_eq!(month_label(3), "+3mth");
        assert_eq!(month_label(-1), "-1mth");

        assert_eq!(month_offset_days(-1), -30.0);
        assert_eq!(month_offset_days(2), 61.0);

        assert_eq!(day_axis_label(91.0), "+3mth");
        assert_eq!(day_axis_label(45.0), "45d");
    }

    #[test]
    fn bounds_use_visible_points_with_padding() {
        let series = vec![
            line("a", &[(-400.0, 0.1), (0.0, 1.0), (30.0, 0.8)]),
            line("b", &[(0.0, 1.0), (150.0, 1.2), (300.0, 5.0)]),
        ];
        let b = view_bounds(&series, ViewWindow::new(1, 6), &[false, false]);
        // Visible y range is 0.8..1.2.
        assert!((b.y[0] - (0.8 - 0.4 * 0.07)).abs() < 1e-12);
        assert!((b.y[1] - (1.2 + 0.4 * 0.07)).abs() < 1e-12);
        let span = 182.0 + 30.0;
        assert!((b.x[0] - (-30.0 - span * 0.07)).abs() < 1e-9);
        assert!((b.x[1] - (182.0 + span * 0.07)).abs() < 1e-9);

        // Muting "b" drops its 1.2.
        let b = view_bounds(&series, ViewWindow::new(1, 6), &[false, true]);
        assert!((b.y[1] - (1.0 + 0.2 * 0.07)).abs() < 1e-12);

        // A window entirely after the peak.
        let b = view_bounds_days(&series, (100.0, 200.0), &[false, false]);
        // Only 1.2 is visible, widened to 1.15..1.25 before padding.
        assert!((b.y[0] - (1.15 - 0.1 * 0.07)).abs() < 1e-9);
        assert!((b.y[1] - (1.25 + 0.1 * 0.07)).abs() < 1e-9);
    }

    #[test]
    fn series_from_daily_paths() {
        let d = NaiveDate::from_ymd_opt(2020, 2, 12).unwrap();
        let paths = vec![DailyPath {
            label: "Feb 2020 - present".to_string(),
            peak_date: d,
            points: vec![DailyPoint { days_from_peak: 0, date: d, close: 29551.42, ratio: 1.0 }],
        }];
        let s = chart_series(&paths);
        assert_eq!(s[0].points, vec![(0.0, 1.0)]);
        assert_eq!(s[0].style.color, (0, 0, 255));
        assert!(clip_points(&s[0], 1.0, 10.0).is_empty());
    }
}
