// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use time::Date;

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A booking or application reference is malformed.
    InvalidReference(String),
    /// A prison code is empty or malformed.
    InvalidPrisonCode(String),
    /// A prisoner identifier is empty or malformed.
    InvalidPrisonerId(String),
    /// A visit status string could not be parsed.
    InvalidVisitStatus {
        /// The unrecognised status.
        status: String,
    },
    /// A visit sub-status string could not be parsed.
    InvalidVisitSubStatus {
        /// The unrecognised sub-status.
        status: String,
    },
    /// A status transition is not permitted.
    InvalidStatusTransition {
        /// The current status.
        from: String,
        /// The requested status.
        to: String,
        /// Why the transition was refused.
        reason: String,
    },
    /// An enumerated value could not be parsed.
    InvalidEnumValue {
        /// The kind of value being parsed (e.g. "restriction").
        kind: &'static str,
        /// The unrecognised value.
        value: String,
    },
    /// Prison configuration is invalid.
    InvalidPrison {
        /// Description of the problem.
        reason: String,
    },
    /// Session template configuration is invalid.
    InvalidSessionTemplate {
        /// Description of the problem.
        reason: String,
    },
    /// Timezone identifier is not a known IANA zone.
    InvalidTimezone(String),
    /// Date arithmetic overflowed.
    DateArithmeticOverflow {
        /// Description of the operation that failed.
        operation: String,
    },
    /// Failed to parse a date, time or timestamp string.
    DateParseError {
        /// The invalid input.
        date_string: String,
        /// The parser error message.
        error: String,
    },
    /// A date range is empty or too long.
    InvalidDateRange {
        /// Range start.
        from: Date,
        /// Range end.
        to: Date,
    },
    /// Prison does not exist.
    PrisonNotFound(String),
    /// Session template does not exist.
    SessionTemplateNotFound(String),
    /// Application does not exist.
    ApplicationNotFound(String),
    /// Visit does not exist.
    VisitNotFound(String),
    /// Prison is not accepting bookings.
    PrisonInactive(String),
    /// A record belongs to a different prison than the one requested.
    PrisonMismatch {
        /// The expected prison code.
        expected: String,
        /// The prison code found.
        actual: String,
    },
    /// The template does not run on the requested date.
    SessionNotAvailable {
        /// The session template reference.
        template_reference: String,
        /// The requested date.
        date: Date,
    },
    /// The date lies outside the bookable window.
    OutsideBookingWindow {
        /// The requested date.
        date: Date,
        /// The earliest bookable date.
        earliest: Date,
        /// The latest bookable date.
        latest: Date,
    },
    /// The prisoner is not in any eligibility group of the template.
    PrisonerNotEligible {
        /// The prisoner.
        prisoner_id: String,
        /// The session template reference.
        template_reference: String,
    },
    /// The visitor list is invalid for the prison.
    InvalidVisitors {
        /// Description of the problem.
        reason: String,
    },
    /// Visit contact details are invalid.
    InvalidVisitContact {
        /// Description of the problem.
        reason: String,
    },
    /// No capacity remains in the session for the restriction.
    SessionFull {
        /// The session template reference.
        template_reference: String,
        /// The session date.
        date: Date,
        /// The restriction that is full.
        restriction: String,
    },
    /// The prisoner already holds a visit or reservation in the slot.
    DoubleBooking {
        /// The prisoner.
        prisoner_id: String,
        /// Reference of the existing visit or application.
        existing_reference: String,
    },
    /// A non-associated prisoner has a visit on the same day.
    NonAssociationConflict {
        /// The prisoner.
        prisoner_id: String,
        /// The conflicting date.
        date: Date,
    },
    /// The prisoner has no visiting orders remaining.
    InsufficientVisitBalance {
        /// The prisoner.
        prisoner_id: String,
    },
    /// The application was not booked before it expired.
    ApplicationExpired(String),
    /// The application has already been booked.
    ApplicationAlreadyBooked(String),
    /// The visit has already been cancelled.
    VisitAlreadyCancelled(String),
    /// The visit has already started and can no longer be changed.
    VisitAlreadyStarted(String),
    /// The visit is too far in the past to be cancelled.
    CancellationWindowPassed {
        /// The visit reference.
        reference: String,
        /// The configured limit in days.
        limit_days: u32,
    },
    /// The visit is not awaiting a staff decision.
    NotARequestedVisit {
        /// The visit reference.
        reference: String,
        /// The current sub-status.
        sub_status: String,
    },
    /// No session template matches a future legacy visit.
    NoMatchingSessionTemplate {
        /// The prison code.
        prison_code: String,
        /// The visit date.
        date: Date,
    },
}

impl std::fmt::Display for DomainError {
    #[allow(clippy::too_many_lines)]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidReference(msg) => write!(f, "Invalid reference: {msg}"),
            Self::InvalidPrisonCode(msg) => write!(f, "Invalid prison code: {msg}"),
            Self::InvalidPrisonerId(msg) => write!(f, "Invalid prisoner id: {msg}"),
            Self::InvalidVisitStatus { status } => write!(f, "Invalid visit status: {status}"),
            Self::InvalidVisitSubStatus { status } => {
                write!(f, "Invalid visit sub-status: {status}")
            }
            Self::InvalidStatusTransition { from, to, reason } => {
                write!(f, "Invalid status transition from {from} to {to}: {reason}")
            }
            Self::InvalidEnumValue { kind, value } => write!(f, "Invalid {kind}: {value}"),
            Self::InvalidPrison { reason } => write!(f, "Invalid prison: {reason}"),
            Self::InvalidSessionTemplate { reason } => {
                write!(f, "Invalid session template: {reason}")
            }
            Self::InvalidTimezone(tz) => write!(f, "Invalid timezone: {tz}"),
            Self::DateArithmeticOverflow { operation } => {
                write!(f, "Date arithmetic overflow: {operation}")
            }
            Self::DateParseError { date_string, error } => {
                write!(f, "Failed to parse '{date_string}': {error}")
            }
            Self::InvalidDateRange { from, to } => {
                write!(f, "Invalid date range: {from} to {to}")
            }
            Self::PrisonNotFound(code) => write!(f, "Prison {code} not found"),
            Self::SessionTemplateNotFound(reference) => {
                write!(f, "Session template {reference} not found")
            }
            Self::ApplicationNotFound(reference) => {
                write!(f, "Application {reference} not found")
            }
            Self::VisitNotFound(reference) => write!(f, "Visit {reference} not found"),
            Self::PrisonInactive(code) => write!(f, "Prison {code} is not active"),
            Self::PrisonMismatch { expected, actual } => {
                write!(f, "Expected prison {expected} but found {actual}")
            }
            Self::SessionNotAvailable {
                template_reference,
                date,
            } => write!(
                f,
                "Session template {template_reference} does not run on {date}"
            ),
            Self::OutsideBookingWindow {
                date,
                earliest,
                latest,
            } => write!(
                f,
                "Date {date} is outside the booking window {earliest} to {latest}"
            ),
            Self::PrisonerNotEligible {
                prisoner_id,
                template_reference,
            } => write!(
                f,
                "Prisoner {prisoner_id} is not eligible for session template {template_reference}"
            ),
            Self::InvalidVisitors { reason } => write!(f, "Invalid visitors: {reason}"),
            Self::InvalidVisitContact { reason } => write!(f, "Invalid visit contact: {reason}"),
            Self::SessionFull {
                template_reference,
                date,
                restriction,
            } => write!(
                f,
                "No {restriction} capacity left in session {template_reference} on {date}"
            ),
            Self::DoubleBooking {
                prisoner_id,
                existing_reference,
            } => write!(
                f,
                "Prisoner {prisoner_id} already has a booking or reservation in this slot ({existing_reference})"
            ),
            Self::NonAssociationConflict { prisoner_id, date } => write!(
                f,
                "Prisoner {prisoner_id} has a non-association with a prisoner visiting on {date}"
            ),
            Self::InsufficientVisitBalance { prisoner_id } => {
                write!(f, "Prisoner {prisoner_id} has no visiting orders remaining")
            }
            Self::ApplicationExpired(reference) => {
                write!(f, "Application {reference} has expired")
            }
            Self::ApplicationAlreadyBooked(reference) => {
                write!(f, "Application {reference} has already been booked")
            }
            Self::VisitAlreadyCancelled(reference) => {
                write!(f, "Visit {reference} has already been cancelled")
            }
            Self::VisitAlreadyStarted(reference) => {
                write!(f, "Visit {reference} has already started")
            }
            Self::CancellationWindowPassed {
                reference,
                limit_days,
            } => write!(
                f,
                "Visit {reference} started more than {limit_days} days ago and cannot be cancelled"
            ),
            Self::NotARequestedVisit {
                reference,
                sub_status,
            } => write!(
                f,
                "Visit {reference} is not awaiting a decision (sub-status {sub_status})"
            ),
            Self::NoMatchingSessionTemplate { prison_code, date } => write!(
                f,
                "No session template in {prison_code} matches a visit on {date}"
            ),
        }
    }
}

impl std::error::Error for DomainError {}
