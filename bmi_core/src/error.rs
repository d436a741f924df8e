//! Error types for the bmi_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Rejected user input.
///
/// Each variant renders a distinct message suitable for showing directly to the user.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Username cannot be empty")]
    EmptyUsername,

    #[error("Missing value for {0}")]
    MissingField(&'static str),

    #[error("{field} must be a number, got {value:?}")]
    InvalidNumber { field: &'static str, value: String },

    #[error("Weight must be a positive number")]
    NonPositiveWeight,

    #[error("{0} cannot be negative")]
    NegativeComponent(&'static str),

    #[error("Height must be a positive number")]
    NonPositiveHeight,

    #[error("Weight and height give a BMI outside the representable range")]
    BmiOutOfRange,

    #[error("Unknown height unit {0:?} (expected Meters, Centimeters or Feet & Inches)")]
    UnknownUnit(String),
}

/// Core error type for bmi_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// User input was rejected before anything was written
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Record store error
    #[error("Store error: {0}")]
    Store(String),
}

impl Error {
    /// True when the error came from user input rather than the persistence layer
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }
}
