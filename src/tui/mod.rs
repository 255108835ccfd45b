//! Ratatui-based terminal viewer for the daily normalized paths.
//!
//! Left: the chart (days from peak vs ratio to peak). Right: the legend, one
//! row per recession. Muting a recession dims its line and drops it from the
//! y-range, like clicking a legend entry in the HTML chart would.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
};

use crate::app::pipeline::RunOutput;
use crate::chart::{ChartSeries, ViewBounds, ViewWindow, chart_series, day_axis_label, month_offset_days, view_bounds_days};
use crate::error::{AppError, ErrorKind};

mod plotters_chart;

use plotters_chart::{NppPlottersChart, terminal_color};

/// Start the viewer on a finished run.
pub fn run(run: &RunOutput, series_name: &str) -> Result<(), AppError> {
    let mut app = App::new(run, series_name);
    if app.series.is_empty() {
        return Err(AppError::new(ErrorKind::Render, "No normalized recessions to display."));
    }

    let _guard = TerminalGuard::new()?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(ErrorKind::Render, format!("Failed to initialize terminal: {e}")))?;

    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(ErrorKind::Render, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(ErrorKind::Render, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

/// Visible x range in whole months around the peak.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct View {
    from_months: i32,
    to_months: i32,
}

impl View {
    fn from_window(w: ViewWindow) -> Self {
        Self {
            from_months: -i32::try_from(w.back_months).unwrap_or(i32::MAX),
            to_months: i32::try_from(w.forward_months).unwrap_or(i32::MAX),
        }
    }

    fn days(&self) -> (f64, f64) {
        (month_offset_days(self.from_months), month_offset_days(self.to_months))
    }
}

struct App {
    title: String,
    series: Vec<ChartSeries>,
    muted: Vec<bool>,
    selected: usize,
    view: View,
    home: View,
    limits: View,
    status: String,
}

impl App {
    fn new(run: &RunOutput, series_name: &str) -> Self {
        let series = chart_series(&run.daily);
        let home = View::from_window(run.main_window);
        let full = View::from_window(run.full_window);
        let limits = View {
            from_months: full.from_months.min(home.from_months),
            to_months: full.to_months.max(home.to_months),
        };
        Self {
            title: format!(
                "Progression of {series_name} in last {} recessions (data through {})",
                series.len(),
                run.names.end
            ),
            muted: vec![false; series.len()],
            series,
            selected: 0,
            view: home,
            home,
            limits,
            status: "Ready.".to_string(),
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(ErrorKind::Render, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(ErrorKind::Render, format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::new(ErrorKind::Render, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Apply a key press. Returns `true` to quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Up => {
                self.selected = self.selected.saturating_sub(1);
            }
            KeyCode::Down => {
                if self.selected + 1 < self.series.len() {
                    self.selected += 1;
                }
            }
            KeyCode::Char(' ') => {
                if let Some(m) = self.muted.get_mut(self.selected) {
                    *m = !*m;
                    let state = if *m { "muted" } else { "unmuted" };
                    self.status = format!("{state} {}", self.series[self.selected].label);
                }
            }
            KeyCode::Char('+') | KeyCode::Char('=') => {
                // Zoom in: show fewer months after the peak.
                if self.view.to_months - 1 > self.view.from_months {
                    self.view.to_months -= 1;
                }
                self.status = self.view_status();
            }
            KeyCode::Char('-') => {
                if self.view.to_months < self.limits.to_months {
                    self.view.to_months += 1;
                }
                self.status = self.view_status();
            }
            KeyCode::Left => {
                if self.view.from_months > self.limits.from_months {
                    self.view.from_months -= 1;
                    self.view.to_months -= 1;
                }
                self.status = self.view_status();
            }
            KeyCode::Right => {
                if self.view.to_months < self.limits.to_months {
                    self.view.from_months += 1;
                    self.view.to_months += 1;
                }
                self.status = self.view_status();
            }
            KeyCode::Char('r') => {
                self.view = self.home;
                self.muted.iter_mut().for_each(|m| *m = false);
                self.status = "Reset view.".to_string();
            }
            _ => {}
        }
        false
    }

    fn view_status(&self) -> String {
        format!(
            "view: {} .. {}",
            crate::chart::month_label(self.view.from_months),
            crate::chart::month_label(self.view.to_months)
        )
    }

    fn bounds(&self) -> ViewBounds {
        view_bounds_days(&self.series, self.view.days(), &self.muted)
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let line = Line::from(vec![
            Span::styled("npp", Style::default().fg(Color::Cyan)),
            Span::raw("  "),
            Span::raw(self.title.as_str()),
        ]);
        let p = Paragraph::new(Text::from(line)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(30)])
            .split(area);

        self.draw_chart(frame, chunks[0]);
        self.draw_legend(frame, chunks[1]);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Ratio to peak").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let bounds = self.bounds();
        let (chart_rect, insets) = chart_layout(inner);
        let widget = NppPlottersChart {
            series: &self.series,
            muted: &self.muted,
            selected: Some(self.selected),
            x_bounds: bounds.x,
            y_bounds: bounds.y,
        };

        frame.render_widget(widget, chart_rect);
        if let Some(insets) = insets {
            draw_axis_ticks(frame, inner, chart_rect, insets, self.view, bounds);
        }
    }

    fn draw_legend(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let items: Vec<ListItem> = self
            .series
            .iter()
            .zip(&self.muted)
            .map(|(s, &muted)| {
                let plotters::style::RGBColor(r, g, b) = terminal_color(s.style.color);
                let swatch = if muted {
                    Span::styled("─ ", Style::default().fg(Color::DarkGray))
                } else {
                    Span::styled("━ ", Style::default().fg(Color::Rgb(r, g, b)))
                };
                let label_style = if muted {
                    Style::default().fg(Color::DarkGray)
                } else {
                    Style::default()
                };
                ListItem::new(Line::from(vec![swatch, Span::styled(s.label.clone(), label_style)]))
            })
            .collect();

        let list = List::new(items)
            .block(Block::default().title("Recessions").borders(Borders::ALL))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("» ");

        let mut state = ListState::default();
        state.select(Some(self.selected));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ select  space mute  +/- zoom  ←/→ pan  r reset  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

#[derive(Debug, Clone, Copy)]
struct AxisInsets {
    left: u16,
    right: u16,
    top: u16,
    bottom: u16,
}

fn chart_layout(inner: Rect) -> (Rect, Option<AxisInsets>) {
    let insets = AxisInsets {
        left: 7,
        right: 2,
        top: 1,
        bottom: 2,
    };

    if inner.width <= insets.left + insets.right + 10 || inner.height <= insets.top + insets.bottom + 5 {
        return (inner, None);
    }

    let rect = Rect {
        x: inner.x + insets.left,
        y: inner.y + insets.top,
        width: inner.width - insets.left - insets.right,
        height: inner.height - insets.top - insets.bottom,
    };

    (rect, Some(insets))
}

/// Month ticks along the bottom, five ratio ticks on the left.
fn draw_axis_ticks(
    frame: &mut ratatui::Frame<'_>,
    inner: Rect,
    chart: Rect,
    insets: AxisInsets,
    view: View,
    bounds: ViewBounds,
) {
    let style = Style::default().fg(Color::Gray);
    let [x0, x1] = bounds.x;
    let [y0, y1] = bounds.y;

    let y = chart.y + chart.height;
    if y < inner.y + inner.height - 1 {
        // Skip every other month when ticks would collide.
        let months = (view.to_months - view.from_months).max(1);
        let step = if i32::from(chart.width) / months < 7 { 2 } else { 1 };
        let mut m = view.from_months;
        while m <= view.to_months {
            let days = month_offset_days(m);
            let u = (days - x0) / (x1 - x0);
            let x = chart.x + ((chart.width - 1) as f64 * u).round() as u16;
            let label = day_axis_label(days);
            let label_len = label.chars().count() as u16;
            let start = x.saturating_sub(label_len / 2).max(inner.x);
            if start + label_len <= inner.x + inner.width {
                frame.render_widget(
                    Paragraph::new(label).style(style),
                    Rect {
                        x: start,
                        y,
                        width: label_len,
                        height: 1,
                    },
                );
            }
            m += step;
        }
    }

    let ticks = 5usize;
    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let y_val = y0 + u * (y1 - y0);
        let y = chart.y + (chart.height - 1) - ((chart.height - 1) as f64 * u).round() as u16;
        let label = format!("{y_val:.2}");
        let label_len = label.len() as u16;
        let x = inner.x + insets.left.saturating_sub(1);
        let start = x.saturating_sub(label_len);
        if start < inner.x {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: label_len,
                height: 1,
            },
        );
    }

    let x_label = Paragraph::new("months from peak")
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Gray));
    let x_rect = Rect {
        x: chart.x,
        y: chart.y + chart.height + 1,
        width: chart.width,
        height: 1,
    };
    if x_rect.y < inner.y + inner.height {
        frame.render_widget(x_label, x_rect);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::data::{LoadedSeries, SeriesOrigin};
    use crate::domain::{DailyPoint, RawObservation};
    use crate::io::export::OutputNames;
    use crate::normalize::{DailyPath, Normalization};

    fn run_with(labels: &[&str]) -> RunOutput {
        let d = NaiveDate::from_ymd_opt(2020, 2, 12).unwrap();
        let daily = labels
            .iter()
            .map(|l| DailyPath {
                label: l.to_string(),
                peak_date: d,
                points: vec![DailyPoint { days_from_peak: 0, date: d, close: 1.0, ratio: 1.0 }],
            })
            .collect();
        RunOutput {
            series: LoadedSeries {
                observations: vec![RawObservation::new(d, 1.0)],
                origin: SeriesOrigin::Local,
                source_name: "fixture".to_string(),
                duplicates_replaced: 0,
                gaps_skipped: 0,
            },
            windows: Vec::new(),
            normalization: Normalization { paths: Vec::new(), skipped: Vec::new() },
            daily,
            names: OutputNames::new("djia", d),
            main_window: ViewWindow::new(1, 6),
            full_window: ViewWindow::new(3, 12),
        }
    }

    #[test]
    fn selection_and_mute() {
        let mut app = App::new(&run_with(&["a", "b"]), "DJIA");
        assert!(!app.handle_key(KeyCode::Down));
        assert!(!app.handle_key(KeyCode::Down));
        assert_eq!(app.selected, 1);
        app.handle_key(KeyCode::Char(' '));
        assert_eq!(app.muted, vec![false, true]);
        app.handle_key(KeyCode::Up);
        app.handle_key(KeyCode::Up);
        assert_eq!(app.selected, 0);
        assert!(app.handle_key(KeyCode::Char('q')));
    }

    #[test]
    fn zoom_and_pan_stay_within_limits() {
        let mut app = App::new(&run_with(&["a"]), "DJIA");
        assert_eq!(app.view, View { from_months: -1, to_months: 6 });

        for _ in 0..20 {
            app.handle_key(KeyCode::Char('+'));
        }
        assert_eq!(app.view, View { from_months: -1, to_months: 0 });

        for _ in 0..20 {
            app.handle_key(KeyCode::Char('-'));
        }
        assert_eq!(app.view.to_months, 12);

        for _ in 0..20 {
            app.handle_key(KeyCode::Left);
        }
        assert_eq!(app.view.from_months, -3);

        app.handle_key(KeyCode::Char('r'));
        assert_eq!(app.view, app.home);
    }

    #[test]
    fn title_mentions_recession_count() {
        let app = App::new(&run_with(&["a", "b", "c"]), "DJIA");
        assert!(app.title.starts_with("Progression of DJIA in last 3 recessions"));
    }

    #[test]
    fn layout_reserves_axis_space() {
        let (rect, insets) = chart_layout(Rect::new(0, 0, 80, 30));
        assert!(insets.is_some());
        assert_eq!(rect, Rect::new(7, 1, 71, 27));
        let (_, insets) = chart_layout(Rect::new(0, 0, 15, 6));
        assert!(insets.is_none());
    }
}
