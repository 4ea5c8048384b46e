// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::tests::helpers::{
    PRISONER, SESSION_DATE, booked_state, booking, create_test_cause, create_test_context,
    public_actor, reference, reserved_state, slot_request, staff_actor, visit_only,
};
use crate::{BookingContext, Command, CoreError, State, TransitionResult, apply};
use time::Duration;
use time::macros::date;
use visit_scheduler_audit::{Actor, EventAuditType};
use visit_scheduler_domain::{
    ApplicationMethod, BookingKind, DomainError, VisitBalance, VisitRestriction, VisitStatus,
    VisitSubStatus,
};

fn book(
    context: &BookingContext,
    state: &State,
    application_reference: &str,
    actor: Actor,
    is_request_booking: bool,
) -> Result<TransitionResult, CoreError> {
    apply(
        context,
        state,
        Command::BookVisit {
            application_reference: reference(application_reference),
            visit_reference: reference("vv-vv-vv-vv"),
            is_request_booking,
            application_method: ApplicationMethod::Website,
        },
        actor,
        create_test_cause(),
    )
}

#[test]
fn test_book_creates_auto_approved_visit() {
    let context = create_test_context();
    let reserved = reserved_state(&context, &staff_actor());

    let result = book(&context, &reserved, "aa-aa-aa-aa", staff_actor(), false).unwrap();

    let application = result.new_state.application.unwrap();
    assert_eq!(application.status, VisitStatus::Booked);
    assert_eq!(application.visit_reference, Some(reference("vv-vv-vv-vv")));

    let visit = result.new_state.visit.unwrap();
    assert_eq!(visit.status, VisitStatus::Booked);
    assert_eq!(visit.sub_status, VisitSubStatus::AutoApproved);
    assert_eq!(visit.visit_room, "Main Hall");
    assert_eq!(visit.prisoner_id, PRISONER);
    assert_eq!(visit.slot.date, SESSION_DATE);
    assert_eq!(visit.visitors.len(), 1);
    assert!(visit.holds_capacity());

    assert_eq!(
        result.audit_event.action.event_type,
        EventAuditType::BookedVisit
    );
    assert_eq!(
        result.audit_event.application_method,
        ApplicationMethod::Website
    );
    assert_eq!(result.audit_event.booking_reference(), Some("vv-vv-vv-vv"));
}

#[test]
fn test_public_request_booking_is_requested() {
    let context = create_test_context();
    let reserved = reserved_state(&context, &public_actor());

    let result = book(&context, &reserved, "aa-aa-aa-aa", public_actor(), true).unwrap();

    assert_eq!(
        result.new_state.visit.unwrap().sub_status,
        VisitSubStatus::Requested
    );
    assert_eq!(
        result.audit_event.action.event_type,
        EventAuditType::RequestedVisit
    );
}

#[test]
fn test_staff_request_booking_flag_is_ignored() {
    let context = create_test_context();
    let reserved = reserved_state(&context, &staff_actor());

    let visit = book(&context, &reserved, "aa-aa-aa-aa", staff_actor(), true)
        .unwrap()
        .new_state
        .visit
        .unwrap();
    assert_eq!(visit.sub_status, VisitSubStatus::AutoApproved);
}

#[test]
fn test_book_twice_fails_with_already_booked() {
    let context = create_test_context();
    let booked = booked_state(&context, &staff_actor(), false);

    let err = book(&context, &booked, "aa-aa-aa-aa", staff_actor(), false).unwrap_err();
    assert_eq!(
        err,
        CoreError::DomainViolation(DomainError::ApplicationAlreadyBooked(
            "aa-aa-aa-aa".to_string()
        ))
    );
}

#[test]
fn test_book_expired_application_fails() {
    let mut context = create_test_context();
    let reserved = reserved_state(&context, &staff_actor());
    context.now += Duration::minutes(30);

    let err = book(&context, &reserved, "aa-aa-aa-aa", staff_actor(), false).unwrap_err();
    assert_eq!(
        err,
        CoreError::DomainViolation(DomainError::ApplicationExpired("aa-aa-aa-aa".to_string()))
    );
}

#[test]
fn test_public_booking_requires_visit_balance() {
    let mut context = create_test_context();
    let reserved = reserved_state(&context, &public_actor());
    context.visit_balance = Some(VisitBalance {
        remaining_vo: 0,
        remaining_pvo: 0,
    });

    let err = book(&context, &reserved, "aa-aa-aa-aa", public_actor(), false).unwrap_err();
    assert_eq!(
        err,
        CoreError::DomainViolation(DomainError::InsufficientVisitBalance {
            prisoner_id: PRISONER.to_string(),
        })
    );

    // Staff bookings are not limited by the balance.
    let staff_reserved = reserved_state(&context, &staff_actor());
    assert!(book(&context, &staff_reserved, "aa-aa-aa-aa", staff_actor(), false).is_ok());
}

#[test]
fn test_public_booking_with_unknown_balance_fails() {
    let mut context = create_test_context();
    context.visit_balance = None;
    let reserved = reserved_state(&context, &public_actor());

    let err = book(&context, &reserved, "aa-aa-aa-aa", public_actor(), false).unwrap_err();
    assert_eq!(
        err,
        CoreError::DomainViolation(DomainError::InsufficientVisitBalance {
            prisoner_id: PRISONER.to_string(),
        })
    );

    let staff_reserved = reserved_state(&context, &staff_actor());
    assert!(book(&context, &staff_reserved, "aa-aa-aa-aa", staff_actor(), false).is_ok());
}

#[test]
fn test_book_rechecks_double_booking() {
    let mut context = create_test_context();
    let reserved = reserved_state(&context, &staff_actor());
    context.prisoner_bookings = vec![
        booking("aa-aa-aa-aa", BookingKind::Application, PRISONER, SESSION_DATE),
        booking("zz-zz-zz-zz", BookingKind::Visit, PRISONER, SESSION_DATE),
    ];

    let err = book(&context, &reserved, "aa-aa-aa-aa", staff_actor(), false).unwrap_err();
    assert!(matches!(
        err,
        CoreError::DomainViolation(DomainError::DoubleBooking { .. })
    ));
}

#[test]
fn test_book_change_application_updates_existing_visit() {
    let context = create_test_context();
    let booked = visit_only(booked_state(&context, &staff_actor(), false));
    let new_date = date!(2026 - 03 - 16);

    let changing = apply(
        &context,
        &booked,
        Command::ChangeBookedVisit {
            application_reference: reference("cc-cc-cc-cc"),
            booking_reference: reference("vv-vv-vv-vv"),
            request: slot_request(new_date, VisitRestriction::Closed),
        },
        staff_actor(),
        create_test_cause(),
    )
    .unwrap()
    .new_state;

    let result = apply(
        &context,
        &changing,
        Command::BookVisit {
            application_reference: reference("cc-cc-cc-cc"),
            visit_reference: reference("xx-xx-xx-xx"),
            is_request_booking: false,
            application_method: ApplicationMethod::Phone,
        },
        staff_actor(),
        create_test_cause(),
    )
    .unwrap();

    let visit = result.new_state.visit.unwrap();
    assert_eq!(visit.reference, reference("vv-vv-vv-vv"));
    assert_eq!(visit.slot.date, new_date);
    assert_eq!(visit.restriction, VisitRestriction::Closed);
    assert_eq!(visit.sub_status, VisitSubStatus::AutoApproved);

    let application = result.new_state.application.unwrap();
    assert_eq!(application.status, VisitStatus::Booked);
    assert_eq!(application.visit_reference, Some(reference("vv-vv-vv-vv")));

    assert_eq!(
        result.audit_event.action.event_type,
        EventAuditType::UpdatedVisit
    );
}

#[test]
fn test_book_change_of_cancelled_visit_fails() {
    let context = create_test_context();
    let booked = visit_only(booked_state(&context, &staff_actor(), false));
    let mut changing = apply(
        &context,
        &booked,
        Command::ChangeBookedVisit {
            application_reference: reference("cc-cc-cc-cc"),
            booking_reference: reference("vv-vv-vv-vv"),
            request: slot_request(SESSION_DATE, VisitRestriction::Open),
        },
        staff_actor(),
        create_test_cause(),
    )
    .unwrap()
    .new_state;
    if let Some(visit) = changing.visit.as_mut() {
        visit.status = VisitStatus::Cancelled;
        visit.sub_status = VisitSubStatus::Cancelled;
    }

    let err = book(&context, &changing, "cc-cc-cc-cc", staff_actor(), false).unwrap_err();
    assert_eq!(
        err,
        CoreError::DomainViolation(DomainError::VisitAlreadyCancelled(
            "vv-vv-vv-vv".to_string()
        ))
    );
}
