// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{BookingContext, BookingPolicy, Command, SlotRequest, State, apply};
use time::macros::{date, datetime, time};
use time::{Date, PrimitiveDateTime, Weekday};
use visit_scheduler_audit::{Actor, Cause};
use visit_scheduler_domain::{
    ApplicationMethod, BookingKind, EligibilityGroups, ExistingBooking, HousingLocation,
    IncentiveLevel, Prison, PrisonerCategory, PrisonerProfile, Reference, SessionTemplate,
    UserType, VisitBalance, VisitContact, VisitRestriction, VisitType, Visitor,
};

pub const PRISONER: &str = "A1234BC";
pub const TEMPLATE: &str = "tpl-monday";
/// A Monday inside the public booking window of `now()`.
pub const SESSION_DATE: Date = date!(2026 - 03 - 02);

/// Friday 2026-02-20 10:00.
pub const fn now() -> PrimitiveDateTime {
    datetime!(2026 - 02 - 20 10:00)
}

pub fn reference(value: &str) -> Reference {
    Reference::parse(value).unwrap()
}

pub fn create_test_prison() -> Prison {
    Prison::new("HEI", true, 2, 28, 3, vec![date!(2026 - 03 - 09)]).unwrap()
}

/// Monday 09:00-10:00 in the main hall.
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

pub fn create_test_prisoner() -> PrisonerProfile {
    PrisonerProfile {
        prisoner_id: PRISONER.to_string(),
        prison_code: "HEI".to_string(),
        housing_location: Some(HousingLocation::parse("A-1-002").unwrap()),
        category: Some(PrisonerCategory::C),
        incentive_level: Some(IncentiveLevel::Standard),
    }
}

pub fn create_test_context() -> BookingContext {
    let mut context = BookingContext::new(now(), BookingPolicy::default());
    context.prison = Some(create_test_prison());
    context.session_template = Some(create_test_template(TEMPLATE));
    context.prisoner = Some(create_test_prisoner());
    context.visit_balance = Some(VisitBalance {
        remaining_vo: 2,
        remaining_pvo: 1,
    });
    context
}

pub fn staff_actor() -> Actor {
    Actor::new(String::from("staff-1"), UserType::Staff)
}

pub fn public_actor() -> Actor {
    Actor::new(String::from("booker-1"), UserType::Public)
}

pub fn create_test_cause() -> Cause {
    Cause::new(String::from("req-1"), String::from("test request"))
}

pub fn slot_request(date: Date, restriction: VisitRestriction) -> SlotRequest {
    SlotRequest {
        session_template_reference: TEMPLATE.to_string(),
        session_date: date,
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

pub fn booking(
    reference: &str,
    kind: BookingKind,
    prisoner_id: &str,
    date: Date,
) -> ExistingBooking {
    let mut slot = create_test_template(TEMPLATE).slot_on(date);
    slot.session_template_reference = Some(TEMPLATE.to_string());
    ExistingBooking {
        reference: reference.to_string(),
        kind,
        prisoner_id: prisoner_id.to_string(),
        prison_code: "HEI".to_string(),
        slot,
    }
}

/// Reserves `SESSION_DATE` as application `aa-aa-aa-aa`.
pub fn reserved_state(context: &BookingContext, actor: &Actor) -> State {
    apply(
        context,
        &State::default(),
        Command::ReserveSlot {
            application_reference: reference("aa-aa-aa-aa"),
            prisoner_id: PRISONER.to_string(),
            request: slot_request(SESSION_DATE, VisitRestriction::Open),
        },
        actor.clone(),
        create_test_cause(),
    )
    .unwrap()
    .new_state
}

/// Books the reserved application as visit `vv-vv-vv-vv`.
pub fn booked_state(context: &BookingContext, actor: &Actor, is_request_booking: bool) -> State {
    let reserved = reserved_state(context, actor);
    apply(
        context,
        &reserved,
        Command::BookVisit {
            application_reference: reference("aa-aa-aa-aa"),
            visit_reference: reference("vv-vv-vv-vv"),
            is_request_booking,
            application_method: ApplicationMethod::Phone,
        },
        actor.clone(),
        create_test_cause(),
    )
    .unwrap()
    .new_state
}

/// The visit of a booked state on its own.
pub fn visit_only(state: State) -> State {
    State::new(None, state.visit)
}
