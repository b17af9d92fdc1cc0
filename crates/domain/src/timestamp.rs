// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Timestamp helpers.
//!
//! All timestamps are stored as UTC text in the form `YYYY-MM-DD HH:MM:SS`.
//! The format sorts lexicographically in chronological order, which the
//! history date filters rely on.

use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};

use crate::error::DomainError;

/// Formats a UTC instant as a stored timestamp.
///
/// # Errors
///
/// Returns an error if the instant cannot be formatted.
pub fn format_timestamp(instant: OffsetDateTime) -> Result<String, DomainError> {
    instant
        .to_offset(time::UtcOffset::UTC)
        .format(format_description!(
            "[year]-[month]-[day] [hour]:[minute]:[second]"
        ))
        .map_err(|e| DomainError::TimestampFormatError(e.to_string()))
}

/// Returns the current instant as a stored timestamp.
///
/// # Errors
///
/// Returns an error if the current time cannot be formatted.
pub fn now_timestamp() -> Result<String, DomainError> {
    format_timestamp(OffsetDateTime::now_utc())
}

/// Parses a stored timestamp back into a UTC instant.
///
/// # Errors
///
/// Returns an error if the string is not in the stored format.
pub fn parse_timestamp(value: &str) -> Result<OffsetDateTime, DomainError> {
    PrimitiveDateTime::parse(
        value.trim(),
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
    )
    .map(PrimitiveDateTime::assume_utc)
    .map_err(|e| DomainError::TimestampParseError {
        value: value.to_string(),
        error: e.to_string(),
    })
}

/// Returns the number of whole seconds from `start` to `end`.
///
/// Negative when `end` precedes `start`.
///
/// # Errors
///
/// Returns an error if either timestamp cannot be parsed.
pub fn seconds_between(start: &str, end: &str) -> Result<i64, DomainError> {
    let start: OffsetDateTime = parse_timestamp(start)?;
    let end: OffsetDateTime = parse_timestamp(end)?;
    Ok((end - start).whole_seconds())
}

/// Renders a duration in seconds as `"2h 05m"` or `"12m"`.
///
/// Negative durations render as `"0m"`.
#[must_use]
pub fn format_duration(seconds: i64) -> String {
    let seconds: i64 = seconds.max(0);
    let hours: i64 = seconds / 3600;
    let minutes: i64 = (seconds % 3600) / 60;
    if hours > 0 {
        format!("{hours}h {minutes:02}m")
    } else {
        format!("{minutes}m")
    }
}
