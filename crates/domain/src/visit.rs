// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::reference::Reference;
use crate::status::{VisitStatus, VisitSubStatus};
use crate::types::{
    OutcomeStatus, UserType, VisitContact, VisitNote, VisitRestriction, VisitType, Visitor,
    VisitorSupport,
};
use time::{Date, PrimitiveDateTime, Time};

/// A dated occurrence of a session.
///
/// Migrated history may have no template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSlot {
    pub session_template_reference: Option<String>,
    pub date: Date,
    pub start_time: Time,
    pub end_time: Time,
}

impl SessionSlot {
    /// Returns the wall-clock start of the slot.
    #[must_use]
    pub const fn start(&self) -> PrimitiveDateTime {
        PrimitiveDateTime::new(self.date, self.start_time)
    }

    /// Returns the wall-clock end of the slot.
    #[must_use]
    pub const fn end(&self) -> PrimitiveDateTime {
        PrimitiveDateTime::new(self.date, self.end_time)
    }

    /// Returns true if both slots are on the same day and their times overlap.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.date == other.date
            && self.start_time < other.end_time
            && other.start_time < self.end_time
    }
}

/// An in-progress reservation or change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Application {
    pub reference: Reference,
    pub prison_code: String,
    pub prisoner_id: String,
    pub slot: SessionSlot,
    pub visit_type: VisitType,
    pub restriction: VisitRestriction,
    pub status: VisitStatus,
    /// Whether this application holds session capacity.
    pub reserved_slot: bool,
    /// The visit being changed, or the visit created on booking.
    pub visit_reference: Option<Reference>,
    pub visitors: Vec<Visitor>,
    pub visitor_support: Option<VisitorSupport>,
    pub visit_contact: Option<VisitContact>,
    pub user_type: UserType,
    pub created_by: String,
    pub created_at: PrimitiveDateTime,
    pub modified_at: PrimitiveDateTime,
}

impl Application {
    /// Returns true if the application was last touched before `cutoff`.
    ///
    /// Booked applications never expire.
    #[must_use]
    pub fn is_expired(&self, cutoff: PrimitiveDateTime) -> bool {
        self.status.is_application_in_progress() && self.modified_at < cutoff
    }
}

/// Details carried over from the legacy system for migrated visits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyData {
    pub lead_visitor_id: Option<i64>,
    pub migrated_at: PrimitiveDateTime,
}

/// A booked or cancelled visit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Visit {
    pub reference: Reference,
    pub prison_code: String,
    pub prisoner_id: String,
    pub slot: SessionSlot,
    pub visit_room: String,
    pub visit_type: VisitType,
    pub restriction: VisitRestriction,
    pub status: VisitStatus,
    pub sub_status: VisitSubStatus,
    pub outcome_status: Option<OutcomeStatus>,
    pub visitors: Vec<Visitor>,
    pub visit_contact: Option<VisitContact>,
    pub visitor_support: Option<VisitorSupport>,
    pub visit_notes: Vec<VisitNote>,
    pub user_type: UserType,
    pub created_at: PrimitiveDateTime,
    pub modified_at: PrimitiveDateTime,
    pub legacy: Option<LegacyData>,
}

impl Visit {
    /// Returns true if the visit is booked and still holds capacity.
    #[must_use]
    pub const fn holds_capacity(&self) -> bool {
        matches!(self.status, VisitStatus::Booked) && self.sub_status.holds_capacity()
    }

    /// Returns true if the visit has started at `now`.
    #[must_use]
    pub fn has_started(&self, now: PrimitiveDateTime) -> bool {
        self.slot.start() <= now
    }
}

/// Contact details as recorded by the legacy system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyContact {
    pub name: Option<String>,
    pub telephone: Option<String>,
}

/// A visit record imported from the legacy system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyVisit {
    pub prison_code: String,
    pub prisoner_id: String,
    pub visit_room: String,
    pub visit_type: VisitType,
    pub restriction: VisitRestriction,
    pub start: PrimitiveDateTime,
    pub end: PrimitiveDateTime,
    pub status: VisitStatus,
    pub outcome_status: Option<OutcomeStatus>,
    pub visitors: Vec<Visitor>,
    pub visit_contact: Option<LegacyContact>,
    pub visit_notes: Vec<VisitNote>,
    pub lead_visitor_id: Option<i64>,
    pub created_at: Option<PrimitiveDateTime>,
    pub modified_at: Option<PrimitiveDateTime>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, time};

    fn slot(start: Time, end: Time) -> SessionSlot {
        SessionSlot {
            session_template_reference: None,
            date: date!(2026 - 03 - 02),
            start_time: start,
            end_time: end,
        }
    }

    #[test]
    fn test_overlapping_slots() {
        let a = slot(time!(09:00), time!(10:00));
        let b = slot(time!(09:30), time!(11:00));
        let c = slot(time!(10:00), time!(11:00));

        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn test_slots_on_different_days_do_not_overlap() {
        let a = slot(time!(09:00), time!(10:00));
        let mut b = a.clone();
        b.date = date!(2026 - 03 - 03);

        assert!(!a.overlaps(&b));
    }
}
