use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum CoreError {
    #[error("{field} must be between 0 and 1 (got {value})")]
    RateOutOfRange { field: &'static str, value: f64 },

    #[error("end date {end} is before start date {start}")]
    InvertedDateRange { start: NaiveDate, end: NaiveDate },

    #[error("{field} must fall within years 1 to 9999 (got {value})")]
    TimestampOutOfRange { field: &'static str, value: String },

    #[error("unknown {kind}: {value}")]
    UnknownVariant { kind: &'static str, value: String },
}
