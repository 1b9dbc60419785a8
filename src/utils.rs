use crate::error::{ComparisonError, Result};
use chrono::NaiveDate;

/// Longest allowed distance between the two position dates.
pub const MAX_POSITION_DATE_SPAN_DAYS: i64 = 365;

/// Returns the first candidate that is present, in order.
pub fn coalesce<T>(candidates: impl IntoIterator<Item = Option<T>>) -> Option<T> {
    candidates.into_iter().flatten().next()
}

/// Returns the first candidate that is present and not blank, or an empty string.
pub fn coalesce_text<'a>(candidates: impl IntoIterator<Item = Option<&'a str>>) -> String {
    coalesce(
        candidates
            .into_iter()
            .map(|c| c.filter(|value| !value.trim().is_empty())),
    )
    .unwrap_or_default()
    .to_string()
}

/// Sorts the values lexicographically and joins them with `separator`.
/// Duplicates are kept.
pub fn join_sorted<'a>(values: impl IntoIterator<Item = &'a str>, separator: &str) -> String {
    let mut values: Vec<&str> = values.into_iter().collect();
    values.sort_unstable();
    values.join(separator)
}

/// Parses a position date in `YYYY-MM-DD` form.
pub fn parse_position_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        ComparisonError::DateError(format!(
            "Invalid position date: {}. Expected YYYY-MM-DD",
            value
        ))
    })
}

/// Checks the contract callers must honour before requesting a comparison:
/// two distinct dates, neither after `today`, at most a year apart.
///
/// The comparison pipeline itself never calls this.
pub fn validate_position_dates(date_a: NaiveDate, date_b: NaiveDate, today: NaiveDate) -> Result<()> {
    let invalid = |details: &str| ComparisonError::InvalidDateRange {
        date_a,
        date_b,
        details: details.to_string(),
    };

    if date_a == date_b {
        return Err(invalid("position dates must be different"));
    }
    if date_a > today || date_b > today {
        return Err(invalid("position dates cannot be in the future"));
    }
    if (date_a - date_b).num_days().abs() > MAX_POSITION_DATE_SPAN_DAYS {
        return Err(invalid("position dates cannot be more than one year apart"));
    }

    Ok(())
}
