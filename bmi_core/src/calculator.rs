//! The two user actions: calculate-and-record and view history.

use crate::input::{validate_username, RawMeasurement};
use crate::store::{JsonlStore, RecordSink};
use crate::{engine, BmiRecord, HistoryPoint, Result};
use chrono::NaiveDateTime;

/// Outcome of a successful calculation
#[derive(Clone, Debug)]
pub struct Calculation {
    pub id: u64,
    pub record: BmiRecord,
}

impl Calculation {
    /// `BMI: 22.86  |  Category: Normal`
    pub fn summary(&self) -> String {
        engine::format_result(self.record.bmi(), self.record.category())
    }

    pub fn color(&self) -> &'static str {
        engine::display_color(self.record.category())
    }
}

/// Validate `raw`, compute BMI and category, and append the record to `sink`.
///
/// Nothing is written unless validation succeeds.
pub fn calculate_and_record<S: RecordSink>(
    sink: &mut S,
    raw: &RawMeasurement,
    now: NaiveDateTime,
) -> Result<Calculation> {
    let measurement = raw.validate()?;
    let height_m = measurement.height_m();

    let record = BmiRecord::new(measurement.username, measurement.weight_kg, height_m, now);
    let id = sink.append(&record)?;

    tracing::info!(
        "Recorded BMI {:.2} ({}) for {:?}",
        record.bmi(),
        record.category(),
        record.username()
    );

    Ok(Calculation { id, record })
}

/// BMI history for a user, oldest first
pub fn load_history(store: &JsonlStore, username: &str) -> Result<Vec<HistoryPoint>> {
    let username = validate_username(username)?;
    store.query_by_user(&username)
}
