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
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod capacity;
mod clock;
mod conflicts;
mod error;
mod prison;
mod prisoner;
mod reference;
mod session_template;
mod sessions;
mod status;
mod template_matching;
mod types;
mod validation;
mod visit;

#[cfg(test)]
mod tests;

pub use capacity::{SlotCapacity, SlotOccupancy, ensure_capacity, evaluate_capacity};
pub use clock::{DEFAULT_TIMEZONE, prison_local_now, validate_timezone};
pub use conflicts::{
    BookingConflict, BookingKind, ConflictKind, ExistingBooking, detect_conflicts,
    ensure_no_conflicts,
};
pub use error::DomainError;
pub use prison::{BookingWindow, Prison, validate_prison_code};
pub use prisoner::{
    HousingLocation, MAX_HOUSING_LEVELS, PrisonerProfile, VisitBalance, validate_prisoner_id,
};
pub use reference::Reference;
pub use session_template::{
    Eligibility, EligibilityGroups, PermittedLocation, SessionTemplate, day_of_week_str,
    parse_day_of_week,
};
pub use sessions::{MAX_SESSION_RANGE_DAYS, VisitSession, generate_visit_sessions};
pub use status::{VisitStatus, VisitSubStatus};
pub use template_matching::{
    MatchCriteria, TemplateScore, score_template, select_session_template,
};
pub use types::{
    ApplicationMethod, IncentiveLevel, OutcomeStatus, PrisonerCategory, UserType, VisitContact,
    VisitNote, VisitNoteType, VisitRestriction, VisitType, Visitor, VisitorSupport,
};
pub use validation::{validate_visit_contact, validate_visitors};
pub use visit::{Application, LegacyContact, LegacyData, LegacyVisit, SessionSlot, Visit};
