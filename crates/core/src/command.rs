// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use time::Date;
use visit_scheduler_domain::{
    ApplicationMethod, LegacyVisit, OutcomeStatus, Reference, VisitContact, VisitRestriction,
    Visitor, VisitorSupport,
};

/// The slot and party requested by a reservation or change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotRequest {
    pub session_template_reference: String,
    pub session_date: Date,
    pub restriction: VisitRestriction,
    pub visitors: Vec<Visitor>,
    pub visitor_support: Option<VisitorSupport>,
    pub visit_contact: Option<VisitContact>,
}

/// A command represents user or system intent as data only.
///
/// Commands are the only way to request state changes. New references are
/// generated by the caller and carried in the command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Reserve a slot for a new visit.
    ReserveSlot {
        /// Reference for the new application.
        application_reference: Reference,
        /// The prisoner being visited.
        prisoner_id: String,
        /// The requested slot.
        request: SlotRequest,
    },
    /// Move an in-progress application to another slot or party.
    ChangeApplicationSlot {
        /// The application to change.
        application_reference: Reference,
        /// The requested slot.
        request: SlotRequest,
    },
    /// Start changing a booked visit.
    ChangeBookedVisit {
        /// Reference for the new change application.
        application_reference: Reference,
        /// The visit being changed.
        booking_reference: Reference,
        /// The requested slot.
        request: SlotRequest,
    },
    /// Book an application, creating or updating a visit.
    BookVisit {
        /// The application to book.
        application_reference: Reference,
        /// Reference to use if a new visit is created.
        visit_reference: Reference,
        /// Whether a public booking must be approved by staff.
        is_request_booking: bool,
        /// How the booker contacted the prison.
        application_method: ApplicationMethod,
    },
    /// Cancel a booked visit.
    CancelVisit {
        /// The visit to cancel.
        booking_reference: Reference,
        /// Why the visit was cancelled.
        outcome_status: OutcomeStatus,
        /// Free-text reason.
        text: Option<String>,
        /// How the cancellation was requested.
        application_method: ApplicationMethod,
    },
    /// Approve a requested visit.
    ApproveVisitRequest {
        /// The requested visit.
        booking_reference: Reference,
    },
    /// Reject a requested visit.
    RejectVisitRequest {
        /// The requested visit.
        booking_reference: Reference,
    },
    /// Withdraw a requested visit on behalf of the booker.
    WithdrawVisitRequest {
        /// The requested visit.
        booking_reference: Reference,
    },
    /// Import a visit from the legacy system.
    MigrateVisit {
        /// Reference for the new visit.
        visit_reference: Reference,
        /// The legacy record.
        legacy: LegacyVisit,
    },
    /// Cancel a previously migrated visit.
    MigrateCancellation {
        /// The migrated visit.
        booking_reference: Reference,
        /// The legacy outcome.
        outcome_status: OutcomeStatus,
        /// Free-text reason.
        text: Option<String>,
    },
}

impl Command {
    /// Returns a short name for logging.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ReserveSlot { .. } => "ReserveSlot",
            Self::ChangeApplicationSlot { .. } => "ChangeApplicationSlot",
            Self::ChangeBookedVisit { .. } => "ChangeBookedVisit",
            Self::BookVisit { .. } => "BookVisit",
            Self::CancelVisit { .. } => "CancelVisit",
            Self::ApproveVisitRequest { .. } => "ApproveVisitRequest",
            Self::RejectVisitRequest { .. } => "RejectVisitRequest",
            Self::WithdrawVisitRequest { .. } => "WithdrawVisitRequest",
            Self::MigrateVisit { .. } => "MigrateVisit",
            Self::MigrateCancellation { .. } => "MigrateCancellation",
        }
    }
}
