// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use time::{Duration, PrimitiveDateTime};
use visit_scheduler_audit::{AuditEvent, AuditScope, StateSnapshot};
use visit_scheduler_domain::{
    Application, DomainError, ExistingBooking, Prison, PrisonerProfile, SessionTemplate,
    SlotOccupancy, Visit, VisitBalance,
};

/// Tunable booking rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingPolicy {
    /// Minutes after its last change that an unbooked application expires.
    pub application_expiry_minutes: u32,
    /// Visits that started more than this many days ago cannot be
    /// cancelled. Zero disables the check.
    pub cancel_day_limit: u32,
}

impl BookingPolicy {
    /// Creates a new policy.
    #[must_use]
    pub const fn new(application_expiry_minutes: u32, cancel_day_limit: u32) -> Self {
        Self {
            application_expiry_minutes,
            cancel_day_limit,
        }
    }
}

impl Default for BookingPolicy {
    fn default() -> Self {
        Self::new(20, 28)
    }
}

/// Everything `apply` needs to know beyond the records being changed.
///
/// Loaded by the caller from persistence and the prisoner directories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingContext {
    /// Current prison wall-clock time.
    pub now: PrimitiveDateTime,
    pub policy: BookingPolicy,
    pub prison: Option<Prison>,
    /// The template of the requested (or booked) slot.
    pub session_template: Option<SessionTemplate>,
    pub prisoner: Option<PrisonerProfile>,
    /// Occupancy of the requested slot, excluding the records being changed.
    pub occupancy: SlotOccupancy,
    /// The prisoner's active visits and applications on the slot date.
    pub prisoner_bookings: Vec<ExistingBooking>,
    /// Active bookings of non-associated prisoners on the slot date.
    pub non_association_bookings: Vec<ExistingBooking>,
    pub visit_balance: Option<VisitBalance>,
    /// Templates considered when migrating a legacy visit.
    pub migration_candidates: Vec<SessionTemplate>,
}

impl BookingContext {
    /// Creates a context with nothing loaded.
    #[must_use]
    pub const fn new(now: PrimitiveDateTime, policy: BookingPolicy) -> Self {
        Self {
            now,
            policy,
            prison: None,
            session_template: None,
            prisoner: None,
            occupancy: SlotOccupancy {
                booked_open: 0,
                booked_closed: 0,
                reserved_open: 0,
                reserved_closed: 0,
            },
            prisoner_bookings: Vec::new(),
            non_association_bookings: Vec::new(),
            visit_balance: None,
            migration_candidates: Vec::new(),
        }
    }

    /// Applications last modified before this instant have expired.
    ///
    /// # Errors
    ///
    /// Returns an error if the subtraction overflows.
    pub fn expiry_cutoff(&self) -> Result<PrimitiveDateTime, DomainError> {
        application_expiry_cutoff(self.now, self.policy.application_expiry_minutes)
    }

    pub(crate) fn require_prison(&self) -> Result<&Prison, DomainError> {
        self.prison
            .as_ref()
            .ok_or_else(|| DomainError::PrisonNotFound(String::new()))
    }

    pub(crate) fn require_template(
        &self,
        reference: &str,
    ) -> Result<&SessionTemplate, DomainError> {
        self.session_template
            .as_ref()
            .filter(|template| template.reference == reference)
            .ok_or_else(|| DomainError::SessionTemplateNotFound(reference.to_string()))
    }
}

/// Computes the cut-off before which unbooked applications have expired.
///
/// # Errors
///
/// Returns an error if the subtraction overflows.
pub fn application_expiry_cutoff(
    now: PrimitiveDateTime,
    expiry_minutes: u32,
) -> Result<PrimitiveDateTime, DomainError> {
    now.checked_sub(Duration::minutes(i64::from(expiry_minutes)))
        .ok_or_else(|| DomainError::DateArithmeticOverflow {
            operation: format!("{now} - {expiry_minutes} minutes"),
        })
}

/// The records a command reads and writes.
///
/// Each field is the application or visit named by the command, if it
/// exists. A booking of a change application carries both.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct State {
    pub application: Option<Application>,
    pub visit: Option<Visit>,
}

impl State {
    /// Creates a new state.
    #[must_use]
    pub const fn new(application: Option<Application>, visit: Option<Visit>) -> Self {
        Self { application, visit }
    }

    /// Converts the state to a snapshot for audit purposes.
    #[must_use]
    pub fn to_snapshot(&self) -> StateSnapshot {
        let application = self.application.as_ref().map_or_else(
            || String::from("none"),
            |a| {
                format!(
                    "{}:{}:{}@{} {}-{}:{}",
                    a.reference,
                    a.status,
                    a.slot.session_template_reference.as_deref().unwrap_or("-"),
                    a.slot.date,
                    a.slot.start_time,
                    a.slot.end_time,
                    a.restriction
                )
            },
        );
        let visit = self.visit.as_ref().map_or_else(
            || String::from("none"),
            |v| {
                format!(
                    "{}:{}/{}:{}@{} {}-{}:{}",
                    v.reference,
                    v.status,
                    v.sub_status,
                    v.slot.session_template_reference.as_deref().unwrap_or("-"),
                    v.slot.date,
                    v.slot.start_time,
                    v.slot.end_time,
                    v.restriction
                )
            },
        );
        StateSnapshot::new(format!("application={application},visit={visit}"))
    }

    /// Returns the audit scope of this state.
    #[must_use]
    pub fn to_scope(&self) -> AuditScope {
        let booking_reference = self
            .visit
            .as_ref()
            .map(|v| v.reference.to_string())
            .or_else(|| {
                self.application
                    .as_ref()
                    .and_then(|a| a.visit_reference.as_ref().map(ToString::to_string))
            });
        let session_template_reference = self
            .application
            .as_ref()
            .and_then(|a| a.slot.session_template_reference.clone())
            .or_else(|| {
                self.visit
                    .as_ref()
                    .and_then(|v| v.slot.session_template_reference.clone())
            });

        AuditScope {
            booking_reference,
            application_reference: self.application.as_ref().map(|a| a.reference.to_string()),
            session_template_reference,
        }
    }
}

/// The result of a successful state transition.
///
/// Transitions are atomic: they either succeed completely or fail without side effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionResult {
    /// The new state after the transition.
    pub new_state: State,
    /// The audit event recording this transition.
    pub audit_event: AuditEvent,
}
