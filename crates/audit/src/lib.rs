// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]

use std::str::FromStr;
use visit_scheduler_domain::{ApplicationMethod, DomainError, UserType};

#[cfg(test)]
mod tests;

/// Represents the entity performing an action.
///
/// An actor is a staff user, a public booker, or an automated process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    /// The unique identifier for this actor.
    pub id: String,
    /// Which kind of user the actor is.
    pub user_type: UserType,
}

impl Actor {
    /// Creates a new Actor.
    ///
    /// # Arguments
    ///
    /// * `id` - The unique identifier for this actor
    /// * `user_type` - The kind of user
    #[must_use]
    pub const fn new(id: String, user_type: UserType) -> Self {
        Self { id, user_type }
    }
}

/// Represents the reason or trigger for an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cause {
    /// A unique identifier for this cause (e.g., request ID).
    pub id: String,
    /// A description of the cause.
    pub description: String,
}

impl Cause {
    /// Creates a new Cause.
    ///
    /// # Arguments
    ///
    /// * `id` - The unique identifier for this cause
    /// * `description` - A description of what triggered this action
    #[must_use]
    pub const fn new(id: String, description: String) -> Self {
        Self { id, description }
    }
}

/// The kind of event recorded in the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventAuditType {
    ReservedVisit,
    ChangingVisit,
    MigratedVisit,
    BookedVisit,
    UpdatedVisit,
    CancelledVisit,
    RequestedVisit,
    RequestedVisitApproved,
    RequestedVisitRejected,
    RequestedVisitWithdrawn,
}

impl EventAuditType {
    /// Returns the persisted string form.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ReservedVisit => "RESERVED_VISIT",
            Self::ChangingVisit => "CHANGING_VISIT",
            Self::MigratedVisit => "MIGRATED_VISIT",
            Self::BookedVisit => "BOOKED_VISIT",
            Self::UpdatedVisit => "UPDATED_VISIT",
            Self::CancelledVisit => "CANCELLED_VISIT",
            Self::RequestedVisit => "REQUESTED_VISIT",
            Self::RequestedVisitApproved => "REQUESTED_VISIT_APPROVED",
            Self::RequestedVisitRejected => "REQUESTED_VISIT_REJECTED",
            Self::RequestedVisitWithdrawn => "REQUESTED_VISIT_WITHDRAWN",
        }
    }
}

impl FromStr for EventAuditType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "RESERVED_VISIT" => Ok(Self::ReservedVisit),
            "CHANGING_VISIT" => Ok(Self::ChangingVisit),
            "MIGRATED_VISIT" => Ok(Self::MigratedVisit),
            "BOOKED_VISIT" => Ok(Self::BookedVisit),
            "UPDATED_VISIT" => Ok(Self::UpdatedVisit),
            "CANCELLED_VISIT" => Ok(Self::CancelledVisit),
            "REQUESTED_VISIT" => Ok(Self::RequestedVisit),
            "REQUESTED_VISIT_APPROVED" => Ok(Self::RequestedVisitApproved),
            "REQUESTED_VISIT_REJECTED" => Ok(Self::RequestedVisitRejected),
            "REQUESTED_VISIT_WITHDRAWN" => Ok(Self::RequestedVisitWithdrawn),
            _ => Err(DomainError::InvalidEnumValue {
                kind: "event audit type",
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for EventAuditType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Represents the specific action performed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    /// The kind of event.
    pub event_type: EventAuditType,
    /// Optional free-text details (e.g. a cancellation reason).
    pub details: Option<String>,
}

impl Action {
    /// Creates a new Action.
    ///
    /// # Arguments
    ///
    /// * `event_type` - The kind of event
    /// * `details` - Optional additional details
    #[must_use]
    pub const fn new(event_type: EventAuditType, details: Option<String>) -> Self {
        Self {
            event_type,
            details,
        }
    }
}

/// A snapshot of an application or visit at a point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateSnapshot {
    /// A string representation of the state.
    pub data: String,
}

impl StateSnapshot {
    /// Creates a new `StateSnapshot`.
    ///
    /// # Arguments
    ///
    /// * `data` - A string representation of the state
    #[must_use]
    pub const fn new(data: String) -> Self {
        Self { data }
    }
}

/// Which records an audit event concerns.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AuditScope {
    /// The visit reference, once one exists.
    pub booking_reference: Option<String>,
    /// The application reference, if the event came from an application.
    pub application_reference: Option<String>,
    /// The session template the visit or application is in.
    pub session_template_reference: Option<String>,
}

/// An immutable audit event representing a state transition.
///
/// Every successful state change produces exactly one audit event,
/// capturing:
/// - Who performed the action (actor)
/// - Why it was performed (cause)
/// - What action was performed (action)
/// - Which visit, application and session it concerns (scope)
/// - The state before and after the transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    /// Identifier assigned on persistence.
    pub event_id: Option<i64>,
    /// The actor who initiated this state change.
    pub actor: Actor,
    /// The cause or reason for this state change.
    pub cause: Cause,
    /// The action that was performed.
    pub action: Action,
    /// How the booker contacted the prison.
    pub application_method: ApplicationMethod,
    /// The records this event concerns.
    pub scope: AuditScope,
    /// The state before the transition.
    pub before: StateSnapshot,
    /// The state after the transition.
    pub after: StateSnapshot,
}

impl AuditEvent {
    /// Creates a new, not yet persisted, `AuditEvent`.
    ///
    /// # Arguments
    ///
    /// * `actor` - The actor who initiated the change
    /// * `cause` - The reason for the change
    /// * `action` - The action that was performed
    /// * `application_method` - How the booker contacted the prison
    /// * `scope` - The records the event concerns
    /// * `before` - The state before the transition
    /// * `after` - The state after the transition
    #[must_use]
    pub const fn new(
        actor: Actor,
        cause: Cause,
        action: Action,
        application_method: ApplicationMethod,
        scope: AuditScope,
        before: StateSnapshot,
        after: StateSnapshot,
    ) -> Self {
        Self {
            event_id: None,
            actor,
            cause,
            action,
            application_method,
            scope,
            before,
            after,
        }
    }

    /// Returns a copy of this event carrying its persisted identifier.
    #[must_use]
    pub fn with_event_id(mut self, event_id: i64) -> Self {
        self.event_id = Some(event_id);
        self
    }

    /// Returns the booking reference, if any.
    #[must_use]
    pub fn booking_reference(&self) -> Option<&str> {
        self.scope.booking_reference.as_deref()
    }
}
