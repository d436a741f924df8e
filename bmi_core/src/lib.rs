#![forbid(unsafe_code)]

//! Core domain model and business logic for the BMI tracker.
//!
//! This crate provides:
//! - Domain types (categories, height input, records)
//! - The BMI engine (formula, category bands, display colors)
//! - Input validation
//! - Persistence (append-only JSONL record store)
//! - History hand-off (CSV, trend summary)

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod engine;
pub mod input;
pub mod store;
pub mod calculator;
pub mod history;

// Re-export commonly used types
pub use error::{Error, Result, ValidationError};
pub use types::*;
pub use config::Config;
pub use input::{Measurement, RawMeasurement};
pub use store::{JsonlStore, RecordSink};
pub use calculator::{calculate_and_record, load_history, Calculation};
pub use history::{write_history_csv, TrendSummary};
