//! Validation of raw form input.
//!
//! Raw fields arrive as text exactly as the user typed them. Validation runs to
//! completion before anything touches the store, so a rejected action never
//! leaves a partial record behind.

use crate::error::ValidationError;
use crate::{HeightInput, HeightUnit};

/// Unvalidated input for one "calculate" action
#[derive(Clone, Debug, Default)]
pub struct RawMeasurement {
    pub username: String,
    pub weight: String,
    pub unit: HeightUnit,
    /// Used for `Meters` and `Centimeters`
    pub height: Option<String>,
    /// Used for `FeetInches`
    pub feet: Option<String>,
    pub inches: Option<String>,
}

/// Input that passed validation
#[derive(Clone, Debug, PartialEq)]
pub struct Measurement {
    pub username: String,
    pub weight_kg: f64,
    pub height: HeightInput,
}

impl Measurement {
    pub fn height_m(&self) -> f64 {
        self.height.to_meters()
    }
}

impl RawMeasurement {
    /// Validate every field, returning the first problem found.
    ///
    /// Check order: username, presence of the fields the unit needs, numeric
    /// parsing, weight sign, feet/inches sign, normalized height sign, and
    /// finally that the resulting BMI is a finite number.
    pub fn validate(&self) -> Result<Measurement, ValidationError> {
        let username = validate_username(&self.username)?;

        let weight_raw = required(Some(self.weight.as_str()), "Weight")?;
        let height_raw = match self.unit {
            HeightUnit::Meters | HeightUnit::Centimeters => {
                RawHeight::Linear(required(self.height.as_deref(), "Height")?)
            }
            HeightUnit::FeetInches => RawHeight::FeetInches(
                required(self.feet.as_deref(), "Feet")?,
                required(self.inches.as_deref(), "Inches")?,
            ),
        };

        let weight_kg = parse_number(weight_raw, "Weight")?;
        let height = match height_raw {
            RawHeight::Linear(raw) => {
                let value = parse_number(raw, "Height")?;
                if self.unit == HeightUnit::Centimeters {
                    HeightInput::Centimeters(value)
                } else {
                    HeightInput::Meters(value)
                }
            }
            RawHeight::FeetInches(feet, inches) => HeightInput::FeetInches {
                feet: parse_number(feet, "Feet")?,
                inches: parse_number(inches, "Inches")?,
            },
        };

        if weight_kg <= 0.0 {
            return Err(ValidationError::NonPositiveWeight);
        }
        if let HeightInput::FeetInches { feet, inches } = height {
            if feet < 0.0 {
                return Err(ValidationError::NegativeComponent("Feet"));
            }
            if inches < 0.0 {
                return Err(ValidationError::NegativeComponent("Inches"));
            }
        }
        let height_m = height.to_meters();
        if height_m <= 0.0 {
            return Err(ValidationError::NonPositiveHeight);
        }
        // The store can only round-trip finite numbers
        let bmi = crate::engine::compute(weight_kg, height_m);
        if !(height_m * height_m).is_finite() || !bmi.is_finite() {
            return Err(ValidationError::BmiOutOfRange);
        }

        Ok(Measurement {
            username,
            weight_kg,
            height,
        })
    }
}

enum RawHeight<'a> {
    Linear(&'a str),
    FeetInches(&'a str, &'a str),
}

/// Trim and reject an empty username
pub fn validate_username(raw: &str) -> Result<String, ValidationError> {
    let username = raw.trim();
    if username.is_empty() {
        return Err(ValidationError::EmptyUsername);
    }
    Ok(username.to_string())
}

fn required<'a>(value: Option<&'a str>, field: &'static str) -> Result<&'a str, ValidationError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ValidationError::MissingField(field)),
    }
}

fn parse_number(raw: &str, field: &'static str) -> Result<f64, ValidationError> {
    let invalid = || ValidationError::InvalidNumber {
        field,
        value: raw.to_string(),
    };
    let value: f64 = raw.trim().parse().map_err(|_| invalid())?;
    // "inf" and "NaN" parse as f64 but are not measurements
    if !value.is_finite() {
        return Err(invalid());
    }
    Ok(value)
}
