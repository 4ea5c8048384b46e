// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use time::{Duration, OffsetDateTime};
use visit_scheduler_domain::{VisitRestriction, VisitStatus, VisitSubStatus};

use super::{
    Harness, OTHER_PRISONER, PRISONER, SESSION_DATE, TEMPLATE, create_test_admin,
    create_test_cause, create_test_public, create_test_staff, create_test_system, now,
    slot_body, template_request,
};
use crate::{
    ApiError, ApplicationResponse, ReserveSlotRequest, VisitEventType, create_session_template,
    expire_stale_applications, get_visit, reserve_slot,
};

const THIRD_PRISONER: &str = "C3456DE";

fn reserve_on(
    harness: &mut Harness,
    template: &str,
    prisoner_id: &str,
    at: OffsetDateTime,
) -> Result<ApplicationResponse, ApiError> {
    reserve_slot(
        &mut harness.persistence,
        &harness.services,
        at,
        ReserveSlotRequest {
            prisoner_id: prisoner_id.to_string(),
            slot: slot_body(template, SESSION_DATE, VisitRestriction::Open),
        },
        &create_test_staff(),
        create_test_cause(),
    )
}

fn rule_of(result: Result<impl std::fmt::Debug, ApiError>) -> String {
    match result {
        Err(ApiError::DomainRuleViolation { rule, .. }) => rule,
        other => panic!("Expected a domain rule violation, got {other:?}"),
    }
}

#[test]
fn test_reserve_holds_slot() {
    let mut harness = Harness::new();

    let application = harness
        .reserve(PRISONER, VisitRestriction::Open, &create_test_staff())
        .unwrap();

    assert_eq!(application.application_status, VisitStatus::Reserved);
    assert!(application.reserved_slot);
    assert_eq!(application.prison_code, "HEI");
    assert_eq!(application.session_date, SESSION_DATE);
    assert_eq!(application.start_time, "09:00");
    assert_eq!(application.visit_reference, None);
    assert!(harness.publisher.events().is_empty());
}

#[test]
fn test_staff_booking_is_auto_approved_and_published() {
    let mut harness = Harness::new();

    let visit = harness.booked_visit(PRISONER);

    assert_eq!(visit.visit_status, VisitStatus::Booked);
    assert_eq!(visit.visit_sub_status, VisitSubStatus::AutoApproved);
    assert_eq!(visit.session_template_reference.as_deref(), Some(TEMPLATE));
    assert_eq!(visit.visit_room, "Main Hall");

    let events = harness.publisher.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event_type, VisitEventType::Booked);
    assert_eq!(events[0].reference, visit.reference);
    assert_eq!(events[0].prisoner_id, PRISONER);
    assert_eq!(events[0].occurred_at, "2026-02-20T10:00:00");
}

#[test]
fn test_booking_twice_returns_the_same_visit() {
    let mut harness = Harness::new();
    let staff = create_test_staff();
    let application = harness
        .reserve(PRISONER, VisitRestriction::Open, &staff)
        .unwrap();

    let first = harness.book(&application.reference, false, &staff).unwrap();
    let second = harness.book(&application.reference, false, &staff).unwrap();

    assert_eq!(first.reference, second.reference);
    assert_eq!(harness.audit_count(&first.reference), 2);
    assert_eq!(harness.publisher.events().len(), 1);

    let stored = get_visit(&mut harness.persistence, &first.reference, &staff).unwrap();
    assert_eq!(stored, first);
}

#[test]
fn test_unknown_application_cannot_be_booked() {
    let mut harness = Harness::new();

    let result = harness.book("aa-bb-cc-dd", false, &create_test_staff());

    assert!(matches!(result, Err(ApiError::ResourceNotFound { .. })));
}

#[test]
fn test_same_prisoner_cannot_hold_two_reservations() {
    let mut harness = Harness::new();
    let staff = create_test_staff();
    harness
        .reserve(PRISONER, VisitRestriction::Open, &staff)
        .unwrap();

    let result = harness.reserve(PRISONER, VisitRestriction::Closed, &staff);

    assert!(matches!(result, Err(ApiError::Conflict { .. })));
}

#[test]
fn test_full_session_rejects_further_reservations() {
    let mut harness = Harness::new();
    reserve_on(&mut harness, TEMPLATE, PRISONER, now()).unwrap();
    reserve_on(&mut harness, TEMPLATE, OTHER_PRISONER, now()).unwrap();

    let result = reserve_on(&mut harness, TEMPLATE, THIRD_PRISONER, now());

    assert_eq!(rule_of(result), "session_capacity");
}

#[test]
fn test_over_booking_template_accepts_beyond_capacity() {
    let mut harness = Harness::new();
    let mut request = template_request("tpl-overbook");
    request.open_capacity = 1;
    request.allow_over_booking = true;
    create_session_template(&mut harness.persistence, request, &create_test_admin()).unwrap();

    reserve_on(&mut harness, "tpl-overbook", PRISONER, now()).unwrap();
    let second = reserve_on(&mut harness, "tpl-overbook", OTHER_PRISONER, now());

    assert!(second.is_ok());
}

#[test]
fn test_expired_application_frees_capacity_and_is_swept() {
    let mut harness = Harness::new();
    reserve_on(&mut harness, TEMPLATE, PRISONER, now()).unwrap();
    reserve_on(&mut harness, TEMPLATE, OTHER_PRISONER, now()).unwrap();

    let later = now() + Duration::minutes(21);
    let third = reserve_on(&mut harness, TEMPLATE, THIRD_PRISONER, later);
    assert!(third.is_ok());

    let swept = expire_stale_applications(
        &mut harness.persistence,
        &harness.services,
        later,
        &create_test_system(),
    )
    .unwrap();
    assert_eq!(swept.deleted, 2);
    assert_eq!(swept.cutoff, "2026-02-20T10:01:00");
}

#[test]
fn test_expired_application_cannot_be_booked() {
    let mut harness = Harness::new();
    let application = reserve_on(&mut harness, TEMPLATE, PRISONER, now()).unwrap();

    let result = crate::book_visit(
        &mut harness.persistence,
        &harness.services,
        now() + Duration::minutes(30),
        &application.reference,
        crate::BookVisitRequest {
            application_method: visit_scheduler_domain::ApplicationMethod::Phone,
            is_request_booking: false,
        },
        &create_test_staff(),
        create_test_cause(),
    );

    assert_eq!(rule_of(result), "application_expiry");
}

#[test]
fn test_public_booking_needs_visiting_orders() {
    let mut harness = Harness::new().with_balance(PRISONER, 0, 0);
    let public = create_test_public();
    let application = harness
        .reserve(PRISONER, VisitRestriction::Open, &public)
        .unwrap();

    let result = harness.book(&application.reference, false, &public);

    assert_eq!(rule_of(result), "visit_balance");
    assert!(harness.publisher.events().is_empty());
}

#[test]
fn test_public_booking_without_known_balance_is_refused() {
    let mut harness = Harness::new();
    let public = create_test_public();
    let application = harness
        .reserve(PRISONER, VisitRestriction::Open, &public)
        .unwrap();

    let result = harness.book(&application.reference, true, &public);

    assert_eq!(rule_of(result), "visit_balance");
    assert!(harness.publisher.events().is_empty());
}

#[test]
fn test_staff_booking_ignores_visiting_orders() {
    let mut harness = Harness::new().with_balance(PRISONER, 0, 0);

    let visit = harness.booked_visit(PRISONER);

    assert_eq!(visit.visit_sub_status, VisitSubStatus::AutoApproved);
}

#[test]
fn test_public_request_booking_awaits_review() {
    let mut harness = Harness::new().with_balance(PRISONER, 1, 0);

    let visit = harness.requested_visit(PRISONER);

    assert_eq!(visit.visit_status, VisitStatus::Booked);
    assert_eq!(visit.visit_sub_status, VisitSubStatus::Requested);
    assert_eq!(harness.publisher.events()[0].event_type, VisitEventType::Booked);
}

#[test]
fn test_non_association_blocks_public_but_not_staff() {
    let mut harness = Harness::new();
    harness
        .directory
        .add_non_association(OTHER_PRISONER, PRISONER)
        .unwrap();
    harness.booked_visit(OTHER_PRISONER);

    let public = harness.reserve(PRISONER, VisitRestriction::Closed, &create_test_public());
    assert_eq!(rule_of(public), "non_association");

    let staff = harness.reserve(PRISONER, VisitRestriction::Closed, &create_test_staff());
    assert!(staff.is_ok());
}

#[test]
fn test_public_cannot_book_outside_window() {
    let mut harness = Harness::new();

    let result = reserve_slot(
        &mut harness.persistence,
        &harness.services,
        now(),
        ReserveSlotRequest {
            prisoner_id: PRISONER.to_string(),
            slot: slot_body(TEMPLATE, "2026-03-30", VisitRestriction::Open),
        },
        &create_test_public(),
        create_test_cause(),
    );

    assert_eq!(rule_of(result), "booking_window");
}

#[test]
fn test_session_must_run_on_requested_date() {
    let mut harness = Harness::new();

    let result = reserve_slot(
        &mut harness.persistence,
        &harness.services,
        now(),
        ReserveSlotRequest {
            prisoner_id: PRISONER.to_string(),
            slot: slot_body(TEMPLATE, "2026-03-03", VisitRestriction::Open),
        },
        &create_test_staff(),
        create_test_cause(),
    );

    assert_eq!(rule_of(result), "session_available");
}

#[test]
fn test_malformed_session_date_is_invalid_input() {
    let mut harness = Harness::new();

    let result = reserve_slot(
        &mut harness.persistence,
        &harness.services,
        now(),
        ReserveSlotRequest {
            prisoner_id: PRISONER.to_string(),
            slot: slot_body(TEMPLATE, "02/03/2026", VisitRestriction::Open),
        },
        &create_test_staff(),
        create_test_cause(),
    );

    assert!(matches!(
        result,
        Err(ApiError::InvalidInput { field, .. }) if field == "session_date"
    ));
}

#[test]
fn test_change_application_slot_moves_reservation() {
    let mut harness = Harness::new();
    let staff = create_test_staff();
    let application = harness
        .reserve(PRISONER, VisitRestriction::Open, &staff)
        .unwrap();

    let changed = crate::change_application_slot(
        &mut harness.persistence,
        &harness.services,
        now(),
        &application.reference,
        slot_body(TEMPLATE, "2026-03-09", VisitRestriction::Closed),
        &staff,
        create_test_cause(),
    )
    .unwrap();

    assert_eq!(changed.reference, application.reference);
    assert_eq!(changed.session_date, "2026-03-09");
    assert_eq!(changed.visit_restriction, VisitRestriction::Closed);
    assert_eq!(changed.application_status, VisitStatus::Reserved);
}
