//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - one letter per recession (`A`, `B`, ...), legend below the grid
//! - reference row `-` at ratio 1.0 and column `|` at the peak

use crate::normalize::Normalization;

const GLYPHS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const OVERFLOW_GLYPH: char = '*';

fn glyph(index: usize) -> char {
    GLYPHS.get(index).map(|&b| b as char).unwrap_or(OVERFLOW_GLYPH)
}

/// Render the monthly paths of `normalization` on a `width` x `height` grid.
pub fn render_ascii_plot(normalization: &Normalization, horizon_months: u32, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let x_min = 0.0;
    let x_max = f64::from(horizon_months.max(1));

    let (y_min, y_max) = y_range(normalization).unwrap_or((0.5, 1.5));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Reference lines first so the paths draw over them.
    if (y_min..=y_max).contains(&1.0) {
        let row = map_y(1.0, y_min, y_max, height);
        for cell in grid[row].iter_mut() {
            *cell = '-';
        }
    }
    let peak_col = map_x(0.0, x_min, x_max, width);
    for row in grid.iter_mut() {
        row[peak_col] = if row[peak_col] == '-' { '+' } else { '|' };
    }

    for (i, path) in normalization.paths.iter().enumerate() {
        let ch = glyph(i);
        let cells: Vec<(usize, usize)> = path
            .points
            .iter()
            .filter(|p| p.months_from_peak <= horizon_months)
            .map(|p| {
                (
                    map_x(f64::from(p.months_from_peak), x_min, x_max, width),
                    map_y(p.ratio, y_min, y_max, height),
                )
            })
            .collect();
        for pair in cells.windows(2) {
            draw_line(&mut grid, pair[0], pair[1], ch);
        }
        for &(x, y) in &cells {
            grid[y][x] = ch;
        }
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: months=[0, {horizon_months}] | ratio=[{y_min:.3}, {y_max:.3}]\n"
    ));
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
    for (i, path) in normalization.paths.iter().enumerate() {
        out.push_str(&format!("{} {}\n", glyph(i), path.label()));
    }

    out
}

fn y_range(normalization: &Normalization) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for p in normalization.paths.iter().flat_map(|path| &path.points) {
        min_y = min_y.min(p.ratio);
        max_y = max_y.max(p.ratio);
    }
    if min_y.is_finite() && max_y.is_finite() && max_y > min_y {
        Some((min_y, max_y))
    } else if min_y.is_finite() {
        // Only peaks: center the view on 1.0.
        Some((min_y - 0.1, max_y + 0.1))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(t: f64, t_min: f64, t_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((t - t_min) / (t_max - t_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn is_background(c: char) -> bool {
    matches!(c, ' ' | '-' | '|' | '+')
}

/// Integer line drawing (Bresenham-ish). Only background cells are overwritten.
fn draw_line(grid: &mut [Vec<char>], from: (usize, usize), to: (usize, usize), ch: char) {
    let mut x0 = from.0 as isize;
    let mut y0 = from.1 as isize;
    let x1 = to.0 as isize;
    let y1 = to.1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && is_background(grid[y0 as usize][x0 as usize])
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::domain::{RawObservation, RecessionWindow};
    use crate::normalize::{NormalizeParams, normalize};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn plot_golden_snapshot_small() {
        let series = [RawObservation::new(d(2020, 2, 1), 100.0), RawObservation::new(d(2020, 3, 2), 50.0)];
        let windows = [RecessionWindow::new("Feb 2020 - present", d(2020, 2, 1), None)];
        let n = normalize(&series, &windows, &NormalizeParams::default()).unwrap();

        let txt = render_ascii_plot(&n, 1, 10, 5);
        let expected = concat!(
            "Plot: months=[0, 1] | ratio=[0.475, 1.025]\n",
            "AA--------\n",
            "| AA      \n",
            "|   AA    \n",
            "|     AA  \n",
            "|       AA\n",
            "A Feb 2020 - present\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn glyphs_run_out_gracefully() {
        assert_eq!(glyph(0), 'A');
        assert_eq!(glyph(25), 'Z');
        assert_eq!(glyph(26), '*');
    }

    #[test]
    fn empty_normalization_still_renders_grid() {
        let n = Normalization { paths: Vec::new(), skipped: Vec::new() };
        let txt = render_ascii_plot(&n, 12, 20, 6);
        assert_eq!(txt.lines().count(), 7);
    }
}
