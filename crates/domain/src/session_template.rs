// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Recurring visit sessions and the eligibility rules attached to them.
//!
//! A session template describes a weekly (or every-N-weeks) time slot in a
//! visit room together with its capacity. Eligibility groups narrow a
//! template to prisoners in particular housing locations, security
//! categories or incentive levels. An empty group places no restriction.
//!
//! ## Invariants
//!
//! - `start_time` is strictly before `end_time`
//! - `weekly_frequency` is at least 1
//! - `valid_to_date`, when present, is not before `valid_from_date`
//! - Unknown prisoner attributes never exclude a prisoner

use crate::error::DomainError;
use crate::prisoner::{HousingLocation, PrisonerProfile};
use crate::types::{IncentiveLevel, PrisonerCategory, VisitRestriction, VisitType};
use crate::visit::SessionSlot;
use serde::{Deserialize, Serialize};
use time::{Date, Duration, Time, Weekday};

/// A housing-location prefix, from wing down to cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermittedLocation {
    pub level_one: String,
    #[serde(default)]
    pub level_two: Option<String>,
    #[serde(default)]
    pub level_three: Option<String>,
    #[serde(default)]
    pub level_four: Option<String>,
}

impl PermittedLocation {
    /// Creates a prefix that matches an entire wing.
    #[must_use]
    pub const fn wing(level_one: String) -> Self {
        Self {
            level_one,
            level_two: None,
            level_three: None,
            level_four: None,
        }
    }

    fn prefix(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.level_one.as_str())
            .chain(self.level_two.as_deref())
            .chain(self.level_three.as_deref())
            .chain(self.level_four.as_deref())
    }

    /// Number of levels this prefix pins down (1..=4).
    #[must_use]
    pub fn specificity(&self) -> u8 {
        u8::try_from(self.prefix().count()).unwrap_or(u8::MAX)
    }

    /// Returns true if `location` lies under this prefix.
    #[must_use]
    pub fn matches(&self, location: &HousingLocation) -> bool {
        self.prefix().enumerate().all(|(index, expected)| {
            location
                .level(index)
                .is_some_and(|actual| actual.eq_ignore_ascii_case(expected.trim()))
        })
    }
}

/// Parses an upper-case day name such as `MONDAY`.
///
/// # Errors
///
/// Returns `DomainError::InvalidEnumValue` for anything else.
pub fn parse_day_of_week(value: &str) -> Result<Weekday, DomainError> {
    match value.trim().to_ascii_uppercase().as_str() {
        "MONDAY" => Ok(Weekday::Monday),
        "TUESDAY" => Ok(Weekday::Tuesday),
        "WEDNESDAY" => Ok(Weekday::Wednesday),
        "THURSDAY" => Ok(Weekday::Thursday),
        "FRIDAY" => Ok(Weekday::Friday),
        "SATURDAY" => Ok(Weekday::Saturday),
        "SUNDAY" => Ok(Weekday::Sunday),
        _ => Err(DomainError::InvalidEnumValue {
            kind: "day of week",
            value: value.to_string(),
        }),
    }
}

/// Returns the upper-case day name used in storage and on the wire.
#[must_use]
pub const fn day_of_week_str(day: Weekday) -> &'static str {
    match day {
        Weekday::Monday => "MONDAY",
        Weekday::Tuesday => "TUESDAY",
        Weekday::Wednesday => "WEDNESDAY",
        Weekday::Thursday => "THURSDAY",
        Weekday::Friday => "FRIDAY",
        Weekday::Saturday => "SATURDAY",
        Weekday::Sunday => "SUNDAY",
    }
}

/// Eligibility groups attached to a template.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EligibilityGroups {
    #[serde(default)]
    pub permitted_locations: Vec<PermittedLocation>,
    /// When false the locations form an exclude-list.
    #[serde(default = "default_include_location_groups")]
    pub include_location_groups: bool,
    #[serde(default)]
    pub permitted_categories: Vec<PrisonerCategory>,
    #[serde(default)]
    pub permitted_incentive_levels: Vec<IncentiveLevel>,
}

const fn default_include_location_groups() -> bool {
    true
}

/// Outcome of evaluating a prisoner against a template's groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Eligibility {
    pub eligible: bool,
    /// Deepest housing level matched by an include-group (0 when unrestricted).
    pub location_specificity: u8,
    /// The template restricts categories and the prisoner's is listed.
    pub category_match: bool,
    /// The template restricts incentive levels and the prisoner's is listed.
    pub incentive_match: bool,
}

/// A recurring visit session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTemplate {
    pub reference: String,
    pub name: String,
    pub prison_code: String,
    pub visit_room: String,
    pub visit_type: VisitType,
    pub open_capacity: u32,
    pub closed_capacity: u32,
    pub start_time: Time,
    pub end_time: Time,
    pub valid_from_date: Date,
    pub valid_to_date: Option<Date>,
    pub day_of_week: Weekday,
    pub weekly_frequency: u32,
    pub active: bool,
    pub allow_over_booking: bool,
    pub eligibility: EligibilityGroups,
}

impl SessionTemplate {
    /// Validates the template configuration.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidSessionTemplate` if:
    /// - The reference, name or visit room is empty
    /// - The start time is not before the end time
    /// - The validity range is inverted
    /// - The weekly frequency is zero
    pub fn validate(&self) -> Result<(), DomainError> {
        let invalid = |reason: &str| DomainError::InvalidSessionTemplate {
            reason: format!("{}: {reason}", self.reference),
        };

        if self.reference.trim().is_empty() {
            return Err(DomainError::InvalidSessionTemplate {
                reason: "reference must not be empty".to_string(),
            });
        }
        if self.name.trim().is_empty() {
            return Err(invalid("name must not be empty"));
        }
        if self.visit_room.trim().is_empty() {
            return Err(invalid("visit room must not be empty"));
        }
        if self.start_time >= self.end_time {
            return Err(invalid("start time must be before end time"));
        }
        if self
            .valid_to_date
            .is_some_and(|to| to < self.valid_from_date)
        {
            return Err(invalid("valid to date is before valid from date"));
        }
        if self.weekly_frequency == 0 {
            return Err(invalid("weekly frequency must be at least 1"));
        }
        if self
            .eligibility
            .permitted_locations
            .iter()
            .any(|location| location.level_one.trim().is_empty())
        {
            return Err(invalid("location groups need a level one value"));
        }
        Ok(())
    }

    /// Returns true if the session runs on `date`.
    ///
    /// The template must be active, `date` must lie in the validity range,
    /// fall on `day_of_week`, and be a whole multiple of `weekly_frequency`
    /// weeks after the first occurrence on or after `valid_from_date`.
    #[must_use]
    pub fn occurs_on(&self, date: Date) -> bool {
        if !self.active || date < self.valid_from_date || date.weekday() != self.day_of_week {
            return false;
        }
        if self.valid_to_date.is_some_and(|to| date > to) {
            return false;
        }

        let Some(first) = self.first_occurrence() else {
            return false;
        };
        let frequency = i64::from(self.weekly_frequency.max(1));
        (date - first).whole_weeks() % frequency == 0
    }

    fn first_occurrence(&self) -> Option<Date> {
        let from = self.valid_from_date.weekday().number_days_from_monday();
        let target = self.day_of_week.number_days_from_monday();
        let offset = (i64::from(target) - i64::from(from)).rem_euclid(7);
        self.valid_from_date.checked_add(Duration::days(offset))
    }

    /// Returns the capacity for a restriction.
    #[must_use]
    pub const fn capacity_for(&self, restriction: VisitRestriction) -> u32 {
        match restriction {
            VisitRestriction::Open => self.open_capacity,
            VisitRestriction::Closed => self.closed_capacity,
        }
    }

    /// Returns the slot this template offers on `date`.
    #[must_use]
    pub fn slot_on(&self, date: Date) -> SessionSlot {
        SessionSlot {
            session_template_reference: Some(self.reference.clone()),
            date,
            start_time: self.start_time,
            end_time: self.end_time,
        }
    }

    /// Evaluates the prisoner against every eligibility group.
    #[must_use]
    pub fn eligibility(&self, prisoner: &PrisonerProfile) -> Eligibility {
        let groups = &self.eligibility;
        let (location_eligible, location_specificity) =
            evaluate_location(groups, prisoner.housing_location.as_ref());
        let (category_eligible, category_match) =
            evaluate_listed(&groups.permitted_categories, prisoner.category.as_ref());
        let (incentive_eligible, incentive_match) = evaluate_listed(
            &groups.permitted_incentive_levels,
            prisoner.incentive_level.as_ref(),
        );

        Eligibility {
            eligible: location_eligible && category_eligible && incentive_eligible,
            location_specificity,
            category_match,
            incentive_match,
        }
    }
}

fn evaluate_location(groups: &EligibilityGroups, location: Option<&HousingLocation>) -> (bool, u8) {
    let Some(location) = location else {
        return (true, 0);
    };
    if groups.permitted_locations.is_empty() {
        return (true, 0);
    }

    let deepest = groups
        .permitted_locations
        .iter()
        .filter(|permitted| permitted.matches(location))
        .map(PermittedLocation::specificity)
        .max();

    if groups.include_location_groups {
        deepest.map_or((false, 0), |specificity| (true, specificity))
    } else {
        (deepest.is_none(), 0)
    }
}

fn evaluate_listed<T: PartialEq>(permitted: &[T], value: Option<&T>) -> (bool, bool) {
    match value {
        _ if permitted.is_empty() => (true, false),
        None => (true, false),
        Some(value) => {
            let listed = permitted.contains(value);
            (listed, listed)
        }
    }
}
