//! Terminal rendering: colored result lines and the history trend chart.

use bmi_core::{HistoryPoint, TrendSummary};
use owo_colors::{OwoColorize, Stream};
use std::fmt::Write;

/// Tint `text` with a `#rrggbb` color when stdout supports it.
///
/// Returns the text unchanged if the token is not a valid hex color.
pub fn paint(text: &str, hex: &str) -> String {
    match parse_hex(hex) {
        Some((r, g, b)) => text
            .if_supports_color(Stream::Stdout, |t| t.truecolor(r, g, b))
            .to_string(),
        None => text.to_string(),
    }
}

fn parse_hex(hex: &str) -> Option<(u8, u8, u8)> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(digits.get(i..i + 2)?, 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

/// Horizontal bar chart of BMI over time, one row per record.
///
/// Bars are scaled so the highest value spans `width` cells.
pub fn trend_chart(username: &str, points: &[HistoryPoint], width: usize) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "╭─────────────────────────────────────────╮");
    let _ = writeln!(out, "│  BMI Trend Over Time: {}", username);
    let _ = writeln!(out, "╰─────────────────────────────────────────╯");
    let _ = writeln!(out);

    let summary = match TrendSummary::of(points) {
        Some(summary) => summary,
        None => return out,
    };

    for point in points {
        let cells = ((point.bmi / summary.max) * width as f64).round() as usize;
        let _ = writeln!(
            out,
            "  {}  {:<width$}  {:.2}",
            point.date_label(),
            "█".repeat(cells.clamp(1, width)),
            point.bmi,
            width = width
        );
    }

    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "  Records: {}   Range: {:.2} to {:.2}   Change: {:+.2}",
        points.len(),
        summary.min,
        summary.max,
        summary.change()
    );

    out
}
