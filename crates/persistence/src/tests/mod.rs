// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod initialization_tests;

use crate::Persistence;
use time::macros::{date, datetime, time};
use time::{Date, PrimitiveDateTime, Weekday};
use visit_scheduler::{
    BookingContext, BookingPolicy, Command, SlotRequest, State, TransitionResult, apply,
};
use visit_scheduler_audit::{Actor, Cause};
use visit_scheduler_domain::{
    ApplicationMethod, EligibilityGroups, Prison, Reference, SessionTemplate, UserType,
    VisitContact, VisitRestriction, VisitType, Visitor,
};

pub const PRISONER: &str = "A1234BC";
pub const TEMPLATE: &str = "tpl-monday";
pub const SESSION_DATE: Date = date!(2026 - 03 - 02);

pub const fn now() -> PrimitiveDateTime {
    datetime!(2026 - 02 - 20 10:00)
}

pub fn reference(value: &str) -> Reference {
    Reference::parse(value).unwrap()
}

pub fn create_test_prison() -> Prison {
    Prison::new("HEI", true, 2, 28, 3, Vec::new()).unwrap()
}

pub fn create_test_template(reference: &str) -> SessionTemplate {
    SessionTemplate {
        reference: reference.to_string(),
        name: format!("Session {reference}"),
        prison_code: "HEI".to_string(),
        visit_room: "Main Hall".to_string(),
        visit_type: VisitType::Social,
        open_capacity: 2,
        closed_capacity: 1,
        start_time: time!(09:00),
        end_time: time!(10:00),
        valid_from_date: date!(2026 - 01 - 01),
        valid_to_date: None,
        day_of_week: Weekday::Monday,
        weekly_frequency: 1,
        active: true,
        allow_over_booking: false,
        eligibility: EligibilityGroups::default(),
    }
}

pub fn create_test_actor() -> Actor {
    Actor::new(String::from("staff-1"), UserType::Staff)
}

pub fn create_test_cause() -> Cause {
    Cause::new(String::from("req-1"), String::from("test request"))
}

/// In-memory persistence holding prison `HEI` and template `tpl-monday`.
pub fn create_seeded_persistence() -> Persistence {
    let mut persistence = Persistence::new_in_memory().unwrap();
    persistence.upsert_prison(&create_test_prison()).unwrap();
    persistence
        .upsert_session_template(&create_test_template(TEMPLATE))
        .unwrap();
    persistence
}

pub fn create_test_context() -> BookingContext {
    let mut context = BookingContext::new(now(), BookingPolicy::default());
    context.prison = Some(create_test_prison());
    context.session_template = Some(create_test_template(TEMPLATE));
    context
}

pub fn slot_request(restriction: VisitRestriction) -> SlotRequest {
    SlotRequest {
        session_template_reference: TEMPLATE.to_string(),
        session_date: SESSION_DATE,
        restriction,
        visitors: vec![Visitor::new(4321, true)],
        visitor_support: None,
        visit_contact: Some(VisitContact {
            name: "Jane Smith".to_string(),
            telephone: Some("01234 567890".to_string()),
            email: None,
        }),
    }
}

pub fn reserve(
    context: &BookingContext,
    application_reference: &str,
    prisoner_id: &str,
) -> TransitionResult {
    apply(
        context,
        &State::default(),
        Command::ReserveSlot {
            application_reference: reference(application_reference),
            prisoner_id: prisoner_id.to_string(),
            request: slot_request(VisitRestriction::Open),
        },
        create_test_actor(),
        create_test_cause(),
    )
    .unwrap()
}

pub fn book(
    context: &BookingContext,
    reserved: &State,
    application_reference: &str,
    visit_reference: &str,
) -> TransitionResult {
    apply(
        context,
        reserved,
        Command::BookVisit {
            application_reference: reference(application_reference),
            visit_reference: reference(visit_reference),
            is_request_booking: false,
            application_method: ApplicationMethod::Phone,
        },
        create_test_actor(),
        create_test_cause(),
    )
    .unwrap()
}
