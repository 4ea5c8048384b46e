// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Visit status tracking and transition logic.
//!
//! Applications move through `Reserved`/`Changing` into `Booked`; visits
//! move from `Booked` to `Cancelled`. The sub-status records how a booked
//! visit was approved and why it was closed.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Lifecycle status shared by applications and visits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VisitStatus {
    /// A new application holding a slot.
    Reserved,
    /// An application changing an existing booked visit.
    Changing,
    /// A confirmed visit (or an application that produced one).
    Booked,
    /// A visit that will not take place.
    Cancelled,
}

impl VisitStatus {
    /// Returns the string representation of the status.
    ///
    /// This is used for persistence and API serialization.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Reserved => "RESERVED",
            Self::Changing => "CHANGING",
            Self::Booked => "BOOKED",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Parses a status from its string representation.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidVisitStatus` if the string is not a valid status.
    fn parse_str(s: &str) -> Result<Self, DomainError> {
        match s {
            "RESERVED" => Ok(Self::Reserved),
            "CHANGING" => Ok(Self::Changing),
            "BOOKED" => Ok(Self::Booked),
            "CANCELLED" => Ok(Self::Cancelled),
            _ => Err(DomainError::InvalidVisitStatus {
                status: s.to_string(),
            }),
        }
    }

    /// Returns true if this status is terminal.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Returns true for the in-progress application statuses.
    #[must_use]
    pub const fn is_application_in_progress(&self) -> bool {
        matches!(self, Self::Reserved | Self::Changing)
    }

    /// Validates if a transition from this status to another is permitted.
    ///
    /// # Errors
    ///
    /// Returns an error if the transition is not allowed.
    pub fn validate_transition(&self, new_status: Self) -> Result<(), DomainError> {
        if self.is_terminal() {
            return Err(DomainError::InvalidStatusTransition {
                from: self.as_str().to_string(),
                to: new_status.as_str().to_string(),
                reason: "cannot transition from terminal state".to_string(),
            });
        }

        let valid = match self {
            Self::Reserved => matches!(new_status, Self::Reserved | Self::Booked),
            Self::Changing => matches!(new_status, Self::Changing | Self::Booked),
            Self::Booked => matches!(new_status, Self::Changing | Self::Cancelled),
            Self::Cancelled => false,
        };

        if valid {
            Ok(())
        } else {
            Err(DomainError::InvalidStatusTransition {
                from: self.as_str().to_string(),
                to: new_status.as_str().to_string(),
                reason: "transition not permitted by visit lifecycle rules".to_string(),
            })
        }
    }
}

impl FromStr for VisitStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_str(s)
    }
}

impl std::fmt::Display for VisitStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Approval state of a booked visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VisitSubStatus {
    /// Booked without needing staff review.
    AutoApproved,
    /// Awaiting a staff decision.
    Requested,
    /// Approved by staff.
    Approved,
    /// Rejected by staff.
    Rejected,
    /// Withdrawn by the booker before a decision.
    Withdrawn,
    /// Cancelled after booking.
    Cancelled,
}

impl VisitSubStatus {
    /// Returns the string representation of the sub-status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AutoApproved => "AUTO_APPROVED",
            Self::Requested => "REQUESTED",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
            Self::Withdrawn => "WITHDRAWN",
            Self::Cancelled => "CANCELLED",
        }
    }

    fn parse_str(s: &str) -> Result<Self, DomainError> {
        match s {
            "AUTO_APPROVED" => Ok(Self::AutoApproved),
            "REQUESTED" => Ok(Self::Requested),
            "APPROVED" => Ok(Self::Approved),
            "REJECTED" => Ok(Self::Rejected),
            "WITHDRAWN" => Ok(Self::Withdrawn),
            "CANCELLED" => Ok(Self::Cancelled),
            _ => Err(DomainError::InvalidVisitSubStatus {
                status: s.to_string(),
            }),
        }
    }

    /// Returns true if this sub-status is terminal.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Rejected | Self::Withdrawn | Self::Cancelled)
    }

    /// Returns true if a visit with this sub-status occupies capacity.
    #[must_use]
    pub const fn holds_capacity(&self) -> bool {
        matches!(self, Self::AutoApproved | Self::Requested | Self::Approved)
    }

    /// Validates if a transition from this sub-status to another is permitted.
    ///
    /// # Errors
    ///
    /// Returns an error if the transition is not allowed.
    pub fn validate_transition(&self, new_status: Self) -> Result<(), DomainError> {
        if self.is_terminal() {
            return Err(DomainError::InvalidStatusTransition {
                from: self.as_str().to_string(),
                to: new_status.as_str().to_string(),
                reason: "cannot transition from terminal state".to_string(),
            });
        }

        let valid = match self {
            Self::Requested => matches!(
                new_status,
                Self::Approved | Self::Rejected | Self::Withdrawn | Self::Cancelled
            ),
            Self::AutoApproved | Self::Approved => matches!(new_status, Self::Cancelled),
            Self::Rejected | Self::Withdrawn | Self::Cancelled => false,
        };

        if valid {
            Ok(())
        } else {
            Err(DomainError::InvalidStatusTransition {
                from: self.as_str().to_string(),
                to: new_status.as_str().to_string(),
                reason: "transition not permitted by request lifecycle rules".to_string(),
            })
        }
    }
}

impl FromStr for VisitSubStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_str(s)
    }
}

impl std::fmt::Display for VisitSubStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
