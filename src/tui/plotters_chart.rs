//! Plotters-powered normalized peak chart widget for Ratatui.
//!
//! We render Plotters output into the Ratatui buffer using
//! `plotters-ratatui-backend`. Axis tick labels are drawn by the caller with
//! plain Ratatui paragraphs, which read better than Plotters' text at
//! terminal resolution.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

use crate::chart::{ChartSeries, clip_points};

/// A lightweight, render-only chart description.
///
/// All series and bounds are computed outside the render call.
pub struct NppPlottersChart<'a> {
    pub series: &'a [ChartSeries],
    /// Parallel to `series`; muted lines are drawn dimmed.
    pub muted: &'a [bool],
    /// Index of the highlighted series, drawn last.
    pub selected: Option<usize>,
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
}

/// Terminal color of a series: black does not show on dark terminals.
pub fn terminal_color(rgb: (u8, u8, u8)) -> RGBColor {
    match rgb {
        (0, 0, 0) => RGBColor(255, 255, 255),
        (0, 0, 255) => RGBColor(80, 140, 255),
        (r, g, b) => RGBColor(r, g, b),
    }
}

const MUTED: RGBColor = RGBColor(70, 70, 70);
const REFERENCE: RGBColor = RGBColor(120, 120, 120);

impl<'a> Widget for NppPlottersChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Plotters may fail to build a chart in a tiny area; show a hint instead.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let [x0, x1] = self.x_bounds;
        let [y0, y1] = self.y_bounds;
        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) || x1 <= x0 || y1 <= y0 {
            return;
        }

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root).margin(1).build_cartesian_2d(x0..x1, y0..y1)?;

            // Reference lines: the peak column and the 1.0 row.
            chart.draw_series(LineSeries::new(vec![(0.0, y0), (0.0, y1)], &REFERENCE))?;
            chart.draw_series(LineSeries::new(vec![(x0, 1.0), (x1, 1.0)], &REFERENCE))?;

            // Muted first, then the rest, then the selection on top.
            let order = self
                .series
                .iter()
                .enumerate()
                .filter(|(i, _)| self.muted.get(*i).copied().unwrap_or(false))
                .chain(
                    self.series
                        .iter()
                        .enumerate()
                        .filter(|(i, _)| !self.muted.get(*i).copied().unwrap_or(false) && Some(*i) != self.selected),
                )
                .chain(
                    self.selected
                        .and_then(|i| self.series.get(i).map(|s| (i, s)))
                        .filter(|(i, _)| !self.muted.get(*i).copied().unwrap_or(false)),
                );

            for (i, s) in order {
                let color = if self.muted.get(i).copied().unwrap_or(false) {
                    MUTED
                } else {
                    terminal_color(s.style.color)
                };
                chart.draw_series(LineSeries::new(clip_points(s, x0, x1), &color))?;
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}
