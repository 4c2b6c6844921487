pub mod analytics;
pub mod campaigns;
pub mod content;
pub mod drafts;
pub mod health;
pub mod models;
pub mod quality_check;
pub mod templates;

use chrono::NaiveDate;

use coldreach_core::analytics::DateRange;

use crate::error::AppError;

/// Parse a `YYYY-MM-DD` query or body value.
pub(crate) fn parse_date(field: &'static str, raw: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| AppError::InvalidField {
        field,
        message: format!("{field} must be a YYYY-MM-DD date"),
    })
}

/// Both bounds or neither; a single bound is rejected.
pub(crate) fn optional_range(
    date_from: Option<&str>,
    date_to: Option<&str>,
) -> Result<Option<DateRange>, AppError> {
    match (date_from, date_to) {
        (None, None) => Ok(None),
        (Some(from), Some(to)) => Ok(Some(required_range(from, to)?)),
        (Some(_), None) => Err(AppError::InvalidField {
            field: "date_to",
            message: "date_to is required when date_from is set".to_string(),
        }),
        (None, Some(_)) => Err(AppError::InvalidField {
            field: "date_from",
            message: "date_from is required when date_to is set".to_string(),
        }),
    }
}

pub(crate) fn required_range(date_from: &str, date_to: &str) -> Result<DateRange, AppError> {
    let start = parse_date("date_from", date_from)?;
    let end = parse_date("date_to", date_to)?;
    Ok(DateRange::new(start, end)?)
}
