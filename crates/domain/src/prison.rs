// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use time::{Date, Duration};

/// A prison that accepts visit bookings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prison {
    /// Upper-case prison code (e.g. `HEI`).
    pub code: String,
    /// Whether the prison is accepting bookings.
    pub active: bool,
    /// Earliest bookable day, as an offset from today.
    pub policy_notice_days_min: u32,
    /// Latest bookable day, as an offset from today.
    pub policy_notice_days_max: u32,
    /// Maximum number of visitors on a single visit.
    pub max_total_visitors: u32,
    /// Dates on which no sessions run.
    pub exclude_dates: Vec<Date>,
}

impl Prison {
    /// Creates and validates a new prison.
    ///
    /// The code is trimmed and upper-cased.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The code is empty or not alphanumeric
    /// - `policy_notice_days_min` exceeds `policy_notice_days_max`
    /// - `max_total_visitors` is zero
    pub fn new(
        code: &str,
        active: bool,
        policy_notice_days_min: u32,
        policy_notice_days_max: u32,
        max_total_visitors: u32,
        mut exclude_dates: Vec<Date>,
    ) -> Result<Self, DomainError> {
        let code = validate_prison_code(code)?;

        if policy_notice_days_min > policy_notice_days_max {
            return Err(DomainError::InvalidPrison {
                reason: format!(
                    "policy notice days min ({policy_notice_days_min}) exceeds max ({policy_notice_days_max})"
                ),
            });
        }
        if max_total_visitors == 0 {
            return Err(DomainError::InvalidPrison {
                reason: "max total visitors must be at least 1".to_string(),
            });
        }

        exclude_dates.sort_unstable();
        exclude_dates.dedup();

        Ok(Self {
            code,
            active,
            policy_notice_days_min,
            policy_notice_days_max,
            max_total_visitors,
            exclude_dates,
        })
    }

    /// Returns true if no sessions run on `date`.
    #[must_use]
    pub fn is_excluded(&self, date: Date) -> bool {
        self.exclude_dates.binary_search(&date).is_ok()
    }
}

/// Normalizes and validates a prison code.
///
/// # Errors
///
/// Returns `DomainError::InvalidPrisonCode` if the code is empty, longer than
/// six characters, or contains anything other than ASCII letters and digits.
pub fn validate_prison_code(code: &str) -> Result<String, DomainError> {
    let normalized = code.trim().to_ascii_uppercase();
    if normalized.is_empty()
        || normalized.len() > 6
        || !normalized.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return Err(DomainError::InvalidPrisonCode(code.to_string()));
    }
    Ok(normalized)
}

/// The inclusive range of dates open for booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingWindow {
    pub earliest: Date,
    pub latest: Date,
}

impl BookingWindow {
    /// Computes the public booking window `[today + min, today + max]`.
    ///
    /// # Errors
    ///
    /// Returns an error if the offsets overflow the calendar.
    pub fn for_prison(prison: &Prison, today: Date) -> Result<Self, DomainError> {
        Ok(Self {
            earliest: add_days(today, prison.policy_notice_days_min)?,
            latest: add_days(today, prison.policy_notice_days_max)?,
        })
    }

    /// Computes the staff booking window, which opens today.
    ///
    /// # Errors
    ///
    /// Returns an error if the offset overflows the calendar.
    pub fn for_staff(prison: &Prison, today: Date) -> Result<Self, DomainError> {
        Ok(Self {
            earliest: today,
            latest: add_days(today, prison.policy_notice_days_max)?,
        })
    }

    /// Returns true if `date` falls inside the window.
    #[must_use]
    pub fn contains(&self, date: Date) -> bool {
        date >= self.earliest && date <= self.latest
    }

    /// Validates that `date` falls inside the window.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::OutsideBookingWindow` otherwise.
    pub fn ensure_contains(&self, date: Date) -> Result<(), DomainError> {
        if self.contains(date) {
            Ok(())
        } else {
            Err(DomainError::OutsideBookingWindow {
                date,
                earliest: self.earliest,
                latest: self.latest,
            })
        }
    }
}

fn add_days(date: Date, days: u32) -> Result<Date, DomainError> {
    date.checked_add(Duration::days(i64::from(days)))
        .ok_or_else(|| DomainError::DateArithmeticOverflow {
            operation: format!("{date} + {days} days"),
        })
}
