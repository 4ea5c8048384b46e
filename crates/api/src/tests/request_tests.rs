// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use visit_scheduler_domain::{OutcomeStatus, VisitStatus, VisitSubStatus};

use super::{Harness, PRISONER, create_test_cause, create_test_public, create_test_staff, now};
use crate::{
    ApiError, VisitEventType, approve_visit_request, get_visit_history, reject_visit_request,
    withdraw_visit_request,
};

#[test]
fn test_approve_visit_request() {
    let mut harness = Harness::new();
    let visit = harness.requested_visit(PRISONER);

    let approved = approve_visit_request(
        &mut harness.persistence,
        &harness.services,
        now(),
        &visit.reference,
        &create_test_staff(),
        create_test_cause(),
    )
    .unwrap();

    assert_eq!(approved.visit_status, VisitStatus::Booked);
    assert_eq!(approved.visit_sub_status, VisitSubStatus::Approved);
    assert_eq!(approved.outcome_status, None);

    let events = harness.publisher.events();
    assert_eq!(events.last().unwrap().event_type, VisitEventType::RequestApproved);

    let history =
        get_visit_history(&mut harness.persistence, &visit.reference, &create_test_staff())
            .unwrap();
    let types: Vec<&str> = history
        .events
        .iter()
        .map(|event| event.event_type.as_str())
        .collect();
    assert_eq!(
        types,
        vec!["RESERVED_VISIT", "REQUESTED_VISIT", "REQUESTED_VISIT_APPROVED"]
    );
}

#[test]
fn test_reject_visit_request_cancels_it() {
    let mut harness = Harness::new();
    let visit = harness.requested_visit(PRISONER);

    let rejected = reject_visit_request(
        &mut harness.persistence,
        &harness.services,
        now(),
        &visit.reference,
        &create_test_staff(),
        create_test_cause(),
    )
    .unwrap();

    assert_eq!(rejected.visit_status, VisitStatus::Cancelled);
    assert_eq!(rejected.visit_sub_status, VisitSubStatus::Rejected);
    assert_eq!(rejected.outcome_status, Some(OutcomeStatus::RequestRejected));
    assert_eq!(
        harness.publisher.events().last().unwrap().event_type,
        VisitEventType::RequestRejected
    );
}

#[test]
fn test_public_may_withdraw_request() {
    let mut harness = Harness::new();
    let visit = harness.requested_visit(PRISONER);

    let withdrawn = withdraw_visit_request(
        &mut harness.persistence,
        &harness.services,
        now(),
        &visit.reference,
        &create_test_public(),
        create_test_cause(),
    )
    .unwrap();

    assert_eq!(withdrawn.visit_status, VisitStatus::Cancelled);
    assert_eq!(withdrawn.visit_sub_status, VisitSubStatus::Withdrawn);
    assert_eq!(withdrawn.outcome_status, Some(OutcomeStatus::RequestWithdrawn));
    assert_eq!(
        harness.publisher.events().last().unwrap().event_type,
        VisitEventType::RequestWithdrawn
    );
}

#[test]
fn test_auto_approved_visit_is_not_a_request() {
    let mut harness = Harness::new();
    let visit = harness.booked_visit(PRISONER);

    let result = approve_visit_request(
        &mut harness.persistence,
        &harness.services,
        now(),
        &visit.reference,
        &create_test_staff(),
        create_test_cause(),
    );

    assert!(matches!(
        result,
        Err(ApiError::DomainRuleViolation { rule, .. }) if rule == "requested_visit"
    ));
    assert_eq!(harness.audit_count(&visit.reference), 2);
}

#[test]
fn test_request_cannot_be_decided_twice() {
    let mut harness = Harness::new();
    let visit = harness.requested_visit(PRISONER);
    approve_visit_request(
        &mut harness.persistence,
        &harness.services,
        now(),
        &visit.reference,
        &create_test_staff(),
        create_test_cause(),
    )
    .unwrap();

    let result = reject_visit_request(
        &mut harness.persistence,
        &harness.services,
        now(),
        &visit.reference,
        &create_test_staff(),
        create_test_cause(),
    );

    assert!(matches!(result, Err(ApiError::DomainRuleViolation { .. })));
}

#[test]
fn test_withdrawn_request_cannot_be_approved() {
    let mut harness = Harness::new();
    let visit = harness.requested_visit(PRISONER);
    withdraw_visit_request(
        &mut harness.persistence,
        &harness.services,
        now(),
        &visit.reference,
        &create_test_public(),
        create_test_cause(),
    )
    .unwrap();

    let result = approve_visit_request(
        &mut harness.persistence,
        &harness.services,
        now(),
        &visit.reference,
        &create_test_staff(),
        create_test_cause(),
    );

    assert!(matches!(result, Err(ApiError::Conflict { .. })));
}
