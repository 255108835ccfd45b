//! HTML export of the normalized peak plot.
//!
//! Two SVG charts rendered with Plotters' SVG backend are embedded in a
//! single static HTML page: the main window and the full window.

use std::ops::Range;
use std::path::Path;

use chrono::NaiveDate;
use plotters::coord::ranged1d::{DefaultFormatting, KeyPointHint, Ranged};
use plotters::coord::types::RangedCoordf64;
use plotters::prelude::*;

use crate::chart::{ChartSeries, ViewWindow, clip_points, day_axis_label, month_offset_days, view_bounds};
use crate::error::{AppError, ErrorKind};

#[derive(Debug, Clone)]
pub struct ChartOptions {
    /// Series name shown in titles and axis labels (e.g. `DJIA`).
    pub series_name: String,
    pub main: ViewWindow,
    pub full: ViewWindow,
    /// Last date of the underlying data.
    pub updated: NaiveDate,
    pub source_note: String,
    pub size: (u32, u32),
}

impl ChartOptions {
    pub fn title(&self, recessions: usize) -> String {
        format!("Progression of {} in last {recessions} recessions", self.series_name)
    }

    pub fn caption(&self) -> String {
        format!(
            "Source: {}, updated {}.",
            self.source_note,
            self.updated.format("%B %-d, %Y")
        )
    }
}

/// Render one window of the chart as an SVG document.
pub fn render_svg(series: &[ChartSeries], window: ViewWindow, opts: &ChartOptions) -> Result<String, AppError> {
    let mut svg = String::new();
    draw_chart(&mut svg, series, window, opts)
        .map_err(|e| AppError::new(ErrorKind::Render, format!("Failed to render chart: {e}")))?;
    Ok(svg)
}

fn draw_chart(
    svg: &mut String,
    series: &[ChartSeries],
    window: ViewWindow,
    opts: &ChartOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let (width, height) = opts.size;
    let root = SVGBackend::with_string(svg, (width, height)).into_drawing_area();
    root.fill(&WHITE)?;

    let plot_height = i32::try_from(height.saturating_sub(24)).unwrap_or(i32::MAX);
    let (plot_area, caption_area) = root.split_vertically(plot_height);

    let muted = vec![false; series.len()];
    let bounds = view_bounds(series, window, &muted);
    let [x0, x1] = bounds.x;
    let [y0, y1] = bounds.y;

    let x_axis = MonthAxis {
        days: (x0..x1).into(),
        ticks: axis_months(window, MAX_X_TICKS)
            .into_iter()
            .map(month_offset_days)
            .collect(),
    };

    let mut chart = ChartBuilder::on(&plot_area)
        .caption(opts.title(series.len()), ("sans-serif", 22).into_font().style(FontStyle::Bold))
        .margin(12)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_axis, y0..y1)?;

    chart
        .configure_mesh()
        .light_line_style(WHITE)
        .bold_line_style(BLACK.mix(0.1))
        .x_desc("Months from Peak")
        .y_desc(format!("{} as fraction of Peak", opts.series_name))
        .x_label_formatter(&|v| day_axis_label(*v))
        .y_label_formatter(&|v| format!("{v:.2}"))
        .draw()?;

    let (day0, day1) = window.day_range();
    for s in series {
        let (r, g, b) = s.style.color;
        let style = RGBColor(r, g, b).mix(0.7).stroke_width(s.style.width);
        chart
            .draw_series(LineSeries::new(clip_points(s, day0, day1), style))?
            .label(s.label.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], style));
    }

    // Reference lines at the peak and at ratio 1.0.
    let reference = BLACK.mix(0.5).stroke_width(2);
    chart.draw_series(dashes((0.0, y0), (0.0, y1), 40).map(|seg| PathElement::new(seg, reference)))?;
    chart.draw_series(dashes((x0, 1.0), (x1, 1.0), 60).map(|seg| PathElement::new(seg, reference)))?;

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::LowerLeft)
        .background_style(WHITE.mix(0.85))
        .border_style(BLACK.mix(0.4))
        .label_font(("sans-serif", 11))
        .draw()?;

    caption_area.draw(&Text::new(
        opts.caption(),
        (12, 4),
        ("sans-serif", 12).into_font().style(FontStyle::Italic),
    ))?;

    root.present()?;
    Ok(())
}

const MAX_X_TICKS: usize = 25;

/// Day axis whose key points sit on whole months from the peak.
struct MonthAxis {
    days: RangedCoordf64,
    ticks: Vec<f64>,
}

impl Ranged for MonthAxis {
    type FormatOption = DefaultFormatting;
    type ValueType = f64;

    fn map(&self, value: &f64, limit: (i32, i32)) -> i32 {
        self.days.map(value, limit)
    }

    fn key_points<Hint: KeyPointHint>(&self, _hint: Hint) -> Vec<f64> {
        self.ticks.clone()
    }

    fn range(&self) -> Range<f64> {
        self.days.range()
    }
}

/// Tick months from `-back` to `+forward`, thinned to at most `max` ticks.
fn axis_months(window: ViewWindow, max: usize) -> Vec<i32> {
    let back = i64::from(window.back_months);
    let forward = i64::from(window.forward_months);
    let span = back + forward + 1;
    let max = i64::try_from(max.max(1)).unwrap_or(i64::MAX);
    let step = (span + max - 1) / max;
    (0..span)
        .step_by(usize::try_from(step).unwrap_or(usize::MAX))
        .filter_map(|i| i32::try_from(i - back).ok())
        .collect()
}

/// Split the segment `from..to` into `n` dashes with equal gaps.
fn dashes(from: (f64, f64), to: (f64, f64), n: usize) -> impl Iterator<Item = Vec<(f64, f64)>> {
    let n = n.max(1);
    let steps = (2 * n - 1) as f64;
    (0..n).map(move |i| {
        let a = (2 * i) as f64 / steps;
        let b = (2 * i + 1) as f64 / steps;
        let lerp = |u: f64| (from.0 + u * (to.0 - from.0), from.1 + u * (to.1 - from.1));
        vec![lerp(a), lerp(b)]
    })
}

/// Full HTML page with the main and full-window charts.
pub fn render_html(series: &[ChartSeries], opts: &ChartOptions) -> Result<String, AppError> {
    let main = render_svg(series, opts.main, opts)?;
    let full = render_svg(series, opts.full, opts)?;
    let title = escape(&opts.title(series.len()));

    let mut out = String::new();
    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    out.push_str(&format!("<title>{title}</title>\n"));
    out.push_str(
        "<style>body{font-family:sans-serif;margin:2em auto;max-width:900px}\
         figure{margin:0 0 2em 0}figcaption{color:#555;font-size:0.9em}</style>\n",
    );
    out.push_str("</head>\n<body>\n");
    out.push_str(&format!("<h1>{title}</h1>\n"));
    out.push_str(&format!(
        "<figure>\n{main}\n<figcaption>{} to {} months around the peak</figcaption>\n</figure>\n",
        opts.main.back_months, opts.main.forward_months
    ));
    out.push_str(&format!(
        "<figure>\n{full}\n<figcaption>{} to {} months around the peak</figcaption>\n</figure>\n",
        opts.full.back_months, opts.full.forward_months
    ));
    out.push_str("</body>\n</html>\n");
    Ok(out)
}

pub fn write_html(path: &Path, html: &str) -> Result<(), AppError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| {
            AppError::new(
                ErrorKind::Io,
                format!("Failed to create directory '{}': {e}", parent.display()),
            )
        })?;
    }
    std::fs::write(path, html)
        .map_err(|e| AppError::new(ErrorKind::Io, format!("Failed to write '{}': {e}", path.display())))
}

/// Open `path` with the platform's default browser.
pub fn open_in_browser(path: &Path) -> Result<(), AppError> {
    let mut cmd = if cfg!(target_os = "windows") {
        let mut c = std::process::Command::new("cmd");
        c.args(["/C", "start", ""]);
        c
    } else if cfg!(target_os = "macos") {
        std::process::Command::new("open")
    } else {
        std::process::Command::new("xdg-open")
    };
    cmd.arg(path)
        .spawn()
        .map(|_| ())
        .map_err(|e| AppError::new(ErrorKind::Render, format!("Failed to open '{}': {e}", path.display())))
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}
