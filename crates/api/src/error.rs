// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use visit_scheduler::CoreError;
use visit_scheduler_domain::DomainError;
use visit_scheduler_persistence::PersistenceError;

/// Authentication and authorization errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Authentication failed.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// Authorization failed.
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// The role required for this action.
        required_role: String,
    },
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Unauthorized {
                action,
                required_role,
            } => {
                write!(f, "Unauthorized: '{action}' requires {required_role} role")
            }
        }
    }
}

impl std::error::Error for AuthError {}

/// A prisoner or non-association directory could not answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryError(pub String);

impl std::fmt::Display for DirectoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Directory lookup failed: {}", self.0)
    }
}

impl std::error::Error for DirectoryError {}

/// API-level errors.
///
/// These are distinct from domain/core errors and represent the API contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Authentication failed.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// Authorization failed - the actor does not have permission.
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// The role required for this action.
        required_role: String,
    },
    /// A booking rule was violated.
    DomainRuleViolation {
        /// The rule that was violated.
        rule: String,
        /// A human-readable description of the violation.
        message: String,
    },
    /// Invalid input was provided.
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// A requested resource was not found.
    ResourceNotFound {
        /// The type of resource that was not found.
        resource_type: String,
        /// A human-readable description of what was not found.
        message: String,
    },
    /// The request conflicts with the current state of a booking.
    Conflict {
        /// A human-readable description of the conflict.
        message: String,
    },
    /// An internal error occurred.
    Internal {
        /// A description of the internal error.
        message: String,
    },
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Unauthorized {
                action,
                required_role,
            } => {
                write!(f, "Unauthorized: '{action}' requires {required_role} role")
            }
            Self::DomainRuleViolation { rule, message } => {
                write!(f, "Domain rule violation ({rule}): {message}")
            }
            Self::InvalidInput { field, message } => {
                write!(f, "Invalid input for field '{field}': {message}")
            }
            Self::ResourceNotFound {
                resource_type,
                message,
            } => {
                write!(f, "{resource_type} not found: {message}")
            }
            Self::Conflict { message } => write!(f, "Conflict: {message}"),
            Self::Internal { message } => {
                write!(f, "Internal error: {message}")
            }
        }
    }
}

impl std::error::Error for ApiError {}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::AuthenticationFailed { reason } => Self::AuthenticationFailed { reason },
            AuthError::Unauthorized {
                action,
                required_role,
            } => Self::Unauthorized {
                action,
                required_role,
            },
        }
    }
}

impl From<DirectoryError> for ApiError {
    fn from(err: DirectoryError) -> Self {
        Self::Internal {
            message: err.to_string(),
        }
    }
}

fn invalid(field: &str, message: String) -> ApiError {
    ApiError::InvalidInput {
        field: field.to_string(),
        message,
    }
}

fn not_found(resource_type: &str, reference: String) -> ApiError {
    ApiError::ResourceNotFound {
        resource_type: resource_type.to_string(),
        message: format!("{resource_type} '{reference}' does not exist"),
    }
}

fn rule(rule: &str, message: String) -> ApiError {
    ApiError::DomainRuleViolation {
        rule: rule.to_string(),
        message,
    }
}

/// Translates a domain error into an API error.
///
/// Every variant is matched explicitly so that a new domain error cannot
/// reach a client without a deliberate mapping.
#[must_use]
#[allow(clippy::too_many_lines)]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    let message = err.to_string();
    match err {
        DomainError::InvalidReference(_) => invalid("reference", message),
        DomainError::InvalidPrisonCode(_) => invalid("prison_code", message),
        DomainError::InvalidPrisonerId(_) => invalid("prisoner_id", message),
        DomainError::InvalidVisitStatus { .. } => invalid("visit_status", message),
        DomainError::InvalidVisitSubStatus { .. } => invalid("visit_sub_status", message),
        DomainError::InvalidEnumValue { kind, .. } => invalid(&kind.replace(' ', "_"), message),
        DomainError::InvalidPrison { .. } => invalid("prison", message),
        DomainError::InvalidSessionTemplate { .. } => invalid("session_template", message),
        DomainError::InvalidTimezone(_) => invalid("timezone", message),
        DomainError::DateParseError { .. } => invalid("date", message),
        DomainError::InvalidDateRange { .. } => invalid("date_range", message),
        DomainError::InvalidVisitors { .. } => invalid("visitors", message),
        DomainError::InvalidVisitContact { .. } => invalid("visit_contact", message),
        DomainError::DateArithmeticOverflow { operation } => ApiError::Internal {
            message: format!("Date arithmetic overflow: {operation}"),
        },
        DomainError::PrisonNotFound(code) => not_found("Prison", code),
        DomainError::SessionTemplateNotFound(reference) => {
            not_found("SessionTemplate", reference)
        }
        DomainError::ApplicationNotFound(reference) => not_found("Application", reference),
        DomainError::VisitNotFound(reference) => not_found("Visit", reference),
        DomainError::InvalidStatusTransition { .. } => rule("status_transition", message),
        DomainError::PrisonInactive(_) => rule("prison_active", message),
        DomainError::PrisonMismatch { .. } => rule("prison_match", message),
        DomainError::SessionNotAvailable { .. } => rule("session_available", message),
        DomainError::OutsideBookingWindow { .. } => rule("booking_window", message),
        DomainError::PrisonerNotEligible { .. } => rule("prisoner_eligibility", message),
        DomainError::SessionFull { .. } => rule("session_capacity", message),
        DomainError::NonAssociationConflict { .. } => rule("non_association", message),
        DomainError::InsufficientVisitBalance { .. } => rule("visit_balance", message),
        DomainError::ApplicationExpired(_) => rule("application_expiry", message),
        DomainError::VisitAlreadyStarted(_) => rule("visit_not_started", message),
        DomainError::CancellationWindowPassed { .. } => rule("cancellation_window", message),
        DomainError::NotARequestedVisit { .. } => rule("requested_visit", message),
        DomainError::NoMatchingSessionTemplate { .. } => rule("session_template_match", message),
        DomainError::DoubleBooking { .. }
        | DomainError::ApplicationAlreadyBooked(_)
        | DomainError::VisitAlreadyCancelled(_) => ApiError::Conflict { message },
    }
}

/// Translates a core error into an API error.
#[must_use]
pub fn translate_core_error(err: CoreError) -> ApiError {
    match err {
        CoreError::DomainViolation(domain_err) => translate_domain_error(domain_err),
    }
}

/// Translates a persistence error into an API error.
#[must_use]
pub fn translate_persistence_error(err: PersistenceError) -> ApiError {
    match err {
        PersistenceError::ApplicationAlreadyBooked {
            application_reference,
            ..
        } => ApiError::Conflict {
            message: format!("Application '{application_reference}' has already been booked"),
        },
        PersistenceError::NotFound(message) => ApiError::ResourceNotFound {
            resource_type: String::from("Record"),
            message,
        },
        PersistenceError::EventNotFound(event_id) => ApiError::ResourceNotFound {
            resource_type: String::from("AuditEvent"),
            message: format!("Audit event {event_id} does not exist"),
        },
        other => ApiError::Internal {
            message: other.to_string(),
        },
    }
}
