use chrono::NaiveDate;
use thiserror::Error;

use crate::schema::Period;

#[derive(Error, Debug)]
pub enum ComparisonError {
    #[error("Row #{row} of period {period} has no customer id")]
    MissingCustomerId { period: Period, row: usize },

    #[error("Row #{row} of period {period} is malformed: {details}")]
    MalformedRow {
        period: Period,
        row: usize,
        details: String,
    },

    #[error("Invalid column mapping: {0}")]
    InvalidColumnMapping(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Date calculation error: {0}")]
    DateError(String),

    #[error("Invalid position dates {date_a} and {date_b}: {details}")]
    InvalidDateRange {
        date_a: NaiveDate,
        date_b: NaiveDate,
        details: String,
    },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ComparisonError>;
