// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Prison wall-clock time.
//!
//! Sessions, booking windows and cancellation limits are all expressed in
//! the prison's local time. Instants arrive as UTC and are converted here.

use crate::error::DomainError;
use chrono::{DateTime, Datelike, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use time::{Date, Month, OffsetDateTime, PrimitiveDateTime, Time};

/// Default IANA timezone for prisons.
pub const DEFAULT_TIMEZONE: &str = "Europe/London";

/// Validates an IANA timezone identifier.
///
/// # Errors
///
/// Returns `DomainError::InvalidTimezone` if the zone is unknown.
pub fn validate_timezone(timezone: &str) -> Result<(), DomainError> {
    parse_timezone(timezone).map(|_| ())
}

fn parse_timezone(timezone: &str) -> Result<Tz, DomainError> {
    timezone
        .parse()
        .map_err(|_| DomainError::InvalidTimezone(timezone.to_string()))
}

/// Converts a UTC instant into wall-clock time in `timezone`.
///
/// # Errors
///
/// Returns an error if the timezone is invalid or the instant cannot be
/// represented.
pub fn prison_local_now(
    utc: OffsetDateTime,
    timezone: &str,
) -> Result<PrimitiveDateTime, DomainError> {
    let tz = parse_timezone(timezone)?;

    let instant: DateTime<Utc> = Utc
        .timestamp_opt(utc.unix_timestamp(), utc.nanosecond())
        .single()
        .ok_or_else(|| DomainError::DateArithmeticOverflow {
            operation: format!("convert {utc} to chrono"),
        })?;
    let local = instant.with_timezone(&tz).naive_local();

    let month_number = u8::try_from(local.month()).map_err(|e| conversion_error(&local, e))?;
    let month = Month::try_from(month_number).map_err(|e| conversion_error(&local, e))?;
    let day = u8::try_from(local.day()).map_err(|e| conversion_error(&local, e))?;
    let date = Date::from_calendar_date(local.year(), month, day)
        .map_err(|e| conversion_error(&local, e))?;

    let hour = u8::try_from(local.hour()).map_err(|e| conversion_error(&local, e))?;
    let minute = u8::try_from(local.minute()).map_err(|e| conversion_error(&local, e))?;
    let second = u8::try_from(local.second()).map_err(|e| conversion_error(&local, e))?;
    let time = Time::from_hms(hour, minute, second).map_err(|e| conversion_error(&local, e))?;

    Ok(PrimitiveDateTime::new(date, time))
}

fn conversion_error(local: &impl std::fmt::Display, error: impl std::fmt::Display) -> DomainError {
    DomainError::DateParseError {
        date_string: local.to_string(),
        error: error.to_string(),
    }
}
