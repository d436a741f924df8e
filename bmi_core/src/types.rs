//! Core domain types for BMI tracking.
//!
//! This module defines:
//! - Health categories and their labels
//! - Height units and the tagged height input
//! - Measurement records as written to and read from the store

use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// Timestamp layout used for persisted records and history labels
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const METERS_PER_INCH: f64 = 0.0254;

// ============================================================================
// Category
// ============================================================================

/// BMI health category
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Category {
    Underweight,
    Normal,
    Overweight,
    Obesity,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Underweight,
        Category::Normal,
        Category::Overweight,
        Category::Obesity,
    ];

    /// Label as persisted and displayed
    pub fn label(self) -> &'static str {
        match self {
            Category::Underweight => "Underweight",
            Category::Normal => "Normal",
            Category::Overweight => "Overweight",
            Category::Obesity => "Obesity",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// Height Input
// ============================================================================

/// Unit selector for height input
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum HeightUnit {
    #[default]
    Meters,
    Centimeters,
    FeetInches,
}

impl HeightUnit {
    pub fn label(self) -> &'static str {
        match self {
            HeightUnit::Meters => "Meters",
            HeightUnit::Centimeters => "Centimeters",
            HeightUnit::FeetInches => "Feet & Inches",
        }
    }
}

impl fmt::Display for HeightUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for HeightUnit {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "meters" | "metres" | "m" => Ok(HeightUnit::Meters),
            "centimeters" | "centimetres" | "cm" => Ok(HeightUnit::Centimeters),
            "feet & inches" | "feet-inches" | "feet_inches" | "ft" | "ft-in" => {
                Ok(HeightUnit::FeetInches)
            }
            _ => Err(ValidationError::UnknownUnit(s.to_string())),
        }
    }
}

/// Height as entered, tagged with its unit
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HeightInput {
    Meters(f64),
    Centimeters(f64),
    FeetInches { feet: f64, inches: f64 },
}

impl HeightInput {
    /// Normalize to meters, the only unit the engine accepts
    pub fn to_meters(self) -> f64 {
        match self {
            HeightInput::Meters(m) => m,
            HeightInput::Centimeters(cm) => cm / 100.0,
            HeightInput::FeetInches { feet, inches } => (feet * 12.0 + inches) * METERS_PER_INCH,
        }
    }
}

// ============================================================================
// Records
// ============================================================================

/// One BMI measurement.
///
/// `bmi` and `category` are derived when the record is built and never accepted
/// from outside, so a record can only hold values consistent with its inputs at
/// the time it was written.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct BmiRecord {
    username: String,
    weight: f64,
    height: f64,
    bmi: f64,
    category: Category,
    #[serde(rename = "date", with = "date_format")]
    timestamp: NaiveDateTime,
}

impl BmiRecord {
    /// Build a record from a weight in kilograms and a height in meters.
    ///
    /// The timestamp is truncated to whole seconds.
    pub fn new(username: impl Into<String>, weight: f64, height: f64, at: NaiveDateTime) -> Self {
        let bmi = crate::engine::compute(weight, height);
        Self {
            username: username.into(),
            weight,
            height,
            bmi,
            category: crate::engine::classify(bmi),
            timestamp: at.with_nanosecond(0).unwrap_or(at),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn bmi(&self) -> f64 {
        self.bmi
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }
}

/// A record together with the id the store assigned to it
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct StoredRecord {
    pub id: u64,
    #[serde(flatten)]
    pub record: BmiRecord,
}

/// A single point of a user's BMI trend
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HistoryPoint {
    pub date: NaiveDateTime,
    pub bmi: f64,
}

impl HistoryPoint {
    pub fn date_label(&self) -> String {
        self.date.format(DATE_FORMAT).to_string()
    }
}

impl From<&StoredRecord> for HistoryPoint {
    fn from(stored: &StoredRecord) -> Self {
        HistoryPoint {
            date: stored.record.timestamp,
            bmi: stored.record.bmi,
        }
    }
}

/// Serde adapter for `YYYY-MM-DD HH:MM:SS` timestamps
mod date_format {
    use super::DATE_FORMAT;
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(dt: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(&dt.format(DATE_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(d)?;
        NaiveDateTime::parse_from_str(&raw, DATE_FORMAT).map_err(serde::de::Error::custom)
    }
}
