//! Formatted terminal output.
//!
//! Formatting lives in one place so the loader and normalizer stay free of
//! presentation concerns and output changes stay localized.

use crate::data::LoadedSeries;
use crate::normalize::{Normalization, RecessionPath, trough};

/// Format the run summary: series stats, then the per-recession table.
pub fn format_run_summary(series: &LoadedSeries, normalization: &Normalization, title: &str) -> String {
    let mut out = String::new();

    out.push_str(&format!("=== npp - {title} ===\n"));
    out.push_str(&format!("Source: {}\n", series.source_name));
    match (series.first_date(), series.last_date()) {
        (Some(first), Some(last)) => {
            out.push_str(&format!("Series: {first} .. {last} | n={}\n", series.observations.len()));
        }
        _ => out.push_str("Series: empty\n"),
    }
    if series.duplicates_replaced > 0 || series.gaps_skipped > 0 {
        out.push_str(&format!(
            "Cleaning: {} duplicate dates replaced, {} missing values skipped\n",
            series.duplicates_replaced, series.gaps_skipped
        ));
    }

    out.push_str(&format!(
        "\nRecessions: {} normalized, {} skipped\n",
        normalization.paths.len(),
        normalization.skipped.len()
    ));
    out.push_str(&format_table(&normalization.paths));

    if !normalization.skipped.is_empty() {
        out.push('\n');
        for (label, reason) in &normalization.skipped {
            out.push_str(&format!("  (skipped {label}) {reason}\n"));
        }
    }

    out
}

fn format_table(paths: &[RecessionPath]) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:<22} {:<23} {:<10} {:>10} {:>6} {:>7} {:>6}\n",
            "recession", "peak search", "peak", "value", "months", "trough", "at"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(
        format!(
            "{:-<22} {:-<23} {:-<10} {:-<10} {:-<6} {:-<7} {:-<6}\n",
            "", "", "", "", "", "", ""
        )
        .trim_end(),
    );
    out.push('\n');

    for path in paths {
        let peak = &path.peak;
        // The path includes month 0, so "months available" is len - 1.
        let months = path.points.len().saturating_sub(1);
        let (trough_ratio, trough_at) = match trough(&path.points) {
            Some(t) => (format!("{:.1}%", t.ratio * 100.0), format!("+{}m", t.months_from_peak)),
            None => ("-".to_string(), "-".to_string()),
        };
        out.push_str(
            format!(
                "{:<22} {:<23} {:<10} {:>10.2} {:>6} {:>7} {:>6}\n",
                truncate(&peak.label, 22),
                format!("{}..{}", peak.search.from, peak.search.to),
                peak.peak_date,
                peak.peak_value,
                months,
                trough_ratio,
                trough_at,
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::data::SeriesOrigin;
    use crate::domain::{RawObservation, RecessionWindow};
    use crate::normalize::{NormalizeParams, normalize};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn summary_lists_peaks_and_skips() {
        let observations = vec![
            RawObservation::new(d(2020, 2, 1), 110.0),
            RawObservation::new(d(2020, 3, 1), 90.0),
            RawObservation::new(d(2020, 4, 1), 80.0),
        ];
        let windows = [
            RecessionWindow::new("Aug 1929 - Mar 1933", d(1929, 8, 1), Some(d(1933, 3, 31))),
            RecessionWindow::new("Feb 2020 - present", d(2020, 2, 1), None),
        ];
        let n = normalize(&observations, &windows, &NormalizeParams::default()).unwrap();
        let series = LoadedSeries {
            observations,
            origin: SeriesOrigin::Local,
            source_name: "fixture.csv".to_string(),
            duplicates_replaced: 1,
            gaps_skipped: 0,
        };

        let txt = format_run_summary(&series, &n, "DJIA normalized peak plot");
        assert!(txt.starts_with("=== npp - DJIA normalized peak plot ===\n"));
        assert!(txt.contains("Series: 2020-02-01 .. 2020-04-01 | n=3\n"));
        assert!(txt.contains("1 duplicate dates replaced"));
        assert!(txt.contains("Recessions: 1 normalized, 1 skipped\n"));

        let row = txt.lines().find(|l| l.starts_with("Feb 2020 - present")).unwrap();
        assert!(row.contains("2019-12-01..2020-04-01"));
        assert!(row.contains("110.00"));
        assert!(row.contains("72.7%"));
        assert!(row.ends_with("+2m"));
        assert!(txt.contains("(skipped Aug 1929 - Mar 1933)"));
    }

    #[test]
    fn truncate_marks_cut() {
        assert_eq!(truncate("Feb 2020 - present", 30), "Feb 2020 - present");
        assert_eq!(truncate("abcdef", 4), "abc.");
    }
}
