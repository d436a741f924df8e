//! BMI history hand-off.
//!
//! History points go either to the built-in trend chart or, as `date,bmi` CSV
//! rows, to an external plotting tool.

use crate::{HistoryPoint, Result};
use std::io::Write;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow {
    date: String,
    bmi: f64,
}

impl From<&HistoryPoint> for CsvRow {
    fn from(point: &HistoryPoint) -> Self {
        CsvRow {
            date: point.date_label(),
            bmi: point.bmi,
        }
    }
}

/// Write history as CSV with a `date,bmi` header
pub fn write_history_csv<W: Write>(out: W, points: &[HistoryPoint]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new().has_headers(true).from_writer(out);

    if points.is_empty() {
        // serialize() only emits the header alongside the first row
        writer.write_record(["date", "bmi"])?;
    }
    for point in points {
        writer.serialize(CsvRow::from(point))?;
    }

    writer.flush()?;
    tracing::debug!("Wrote {} history rows as CSV", points.len());
    Ok(())
}

/// Range and net change across a history
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrendSummary {
    pub first: f64,
    pub last: f64,
    pub min: f64,
    pub max: f64,
}

impl TrendSummary {
    /// None for an empty history
    pub fn of(points: &[HistoryPoint]) -> Option<Self> {
        let first = points.first()?.bmi;
        let last = points.last()?.bmi;
        let (min, max) = points
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
                (lo.min(p.bmi), hi.max(p.bmi))
            });
        Some(TrendSummary {
            first,
            last,
            min,
            max,
        })
    }

    pub fn change(&self) -> f64 {
        self.last - self.first
    }
}
