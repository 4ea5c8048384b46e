// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use crate::types::{IncentiveLevel, PrisonerCategory};
use serde::{Deserialize, Serialize};

/// Maximum number of housing levels a location can carry.
pub const MAX_HOUSING_LEVELS: usize = 4;

/// A prisoner's cell location, split into up to four levels.
///
/// `A-1-002` is wing `A`, landing `1`, cell `002`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HousingLocation {
    levels: Vec<String>,
}

impl HousingLocation {
    /// Parses a hyphen-separated location.
    ///
    /// # Errors
    ///
    /// Returns an error if the location is empty, has an empty level, or has
    /// more than four levels.
    pub fn parse(value: &str) -> Result<Self, DomainError> {
        let levels: Vec<String> = value
            .trim()
            .split('-')
            .map(|level| level.trim().to_string())
            .collect();

        if levels.is_empty()
            || levels.len() > MAX_HOUSING_LEVELS
            || levels.iter().any(String::is_empty)
        {
            return Err(DomainError::InvalidEnumValue {
                kind: "housing location",
                value: value.to_string(),
            });
        }

        Ok(Self { levels })
    }

    /// Returns the level at `index` (0-based).
    #[must_use]
    pub fn level(&self, index: usize) -> Option<&str> {
        self.levels.get(index).map(String::as_str)
    }

    /// Returns all levels.
    #[must_use]
    pub fn levels(&self) -> &[String] {
        &self.levels
    }
}

impl TryFrom<String> for HousingLocation {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<HousingLocation> for String {
    fn from(location: HousingLocation) -> Self {
        location.levels.join("-")
    }
}

impl std::fmt::Display for HousingLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.levels.join("-"))
    }
}

/// What the directory knows about a prisoner.
///
/// Any attribute may be unknown; unknown attributes never exclude a
/// prisoner from a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrisonerProfile {
    pub prisoner_id: String,
    pub prison_code: String,
    #[serde(default)]
    pub housing_location: Option<HousingLocation>,
    #[serde(default)]
    pub category: Option<PrisonerCategory>,
    #[serde(default)]
    pub incentive_level: Option<IncentiveLevel>,
}

impl PrisonerProfile {
    /// Creates a profile with no known attributes.
    #[must_use]
    pub const fn new(prisoner_id: String, prison_code: String) -> Self {
        Self {
            prisoner_id,
            prison_code,
            housing_location: None,
            category: None,
            incentive_level: None,
        }
    }
}

/// Remaining visiting orders for a prisoner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitBalance {
    /// Remaining visiting orders.
    pub remaining_vo: i32,
    /// Remaining privileged visiting orders.
    pub remaining_pvo: i32,
}

impl VisitBalance {
    /// Returns true if at least one visit can be booked.
    #[must_use]
    pub const fn has_available(&self) -> bool {
        self.remaining_vo.saturating_add(self.remaining_pvo) > 0
    }
}

/// Validates a prisoner identifier (e.g. `A1234BC`).
///
/// # Errors
///
/// Returns `DomainError::InvalidPrisonerId` if the id is empty or contains
/// characters other than ASCII letters and digits.
pub fn validate_prisoner_id(prisoner_id: &str) -> Result<String, DomainError> {
    let normalized = prisoner_id.trim().to_ascii_uppercase();
    if normalized.is_empty() || !normalized.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(DomainError::InvalidPrisonerId(prisoner_id.to_string()));
    }
    Ok(normalized)
}
