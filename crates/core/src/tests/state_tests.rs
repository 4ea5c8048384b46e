// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::tests::helpers::{
    booked_state, create_test_context, now, reserved_state, staff_actor,
};
use crate::{BookingPolicy, State, application_expiry_cutoff};
use time::macros::datetime;
use visit_scheduler_audit::AuditScope;

#[test]
fn test_default_policy() {
    let policy = BookingPolicy::default();
    assert_eq!(policy.application_expiry_minutes, 20);
    assert_eq!(policy.cancel_day_limit, 28);
}

#[test]
fn test_expiry_cutoff() {
    assert_eq!(
        application_expiry_cutoff(now(), 20).unwrap(),
        datetime!(2026 - 02 - 20 09:40)
    );
    assert_eq!(
        create_test_context().expiry_cutoff().unwrap(),
        datetime!(2026 - 02 - 20 09:40)
    );
}

#[test]
fn test_empty_state_snapshot() {
    assert_eq!(
        State::default().to_snapshot().data,
        "application=none,visit=none"
    );
    assert_eq!(State::default().to_scope(), AuditScope::default());
}

#[test]
fn test_reserved_state_snapshot_and_scope() {
    let context = create_test_context();
    let state = reserved_state(&context, &staff_actor());

    let snapshot = state.to_snapshot().data;
    assert!(snapshot.starts_with("application=aa-aa-aa-aa:RESERVED:tpl-monday@2026-03-02 "));
    assert!(snapshot.ends_with(":OPEN,visit=none"));
    let scope = state.to_scope();
    assert_eq!(scope.application_reference.as_deref(), Some("aa-aa-aa-aa"));
    assert_eq!(scope.booking_reference, None);
    assert_eq!(scope.session_template_reference.as_deref(), Some("tpl-monday"));
}

#[test]
fn test_booked_state_scope_carries_visit_reference() {
    let context = create_test_context();
    let scope = booked_state(&context, &staff_actor(), false).to_scope();
    assert_eq!(scope.booking_reference.as_deref(), Some("vv-vv-vv-vv"));
    assert_eq!(scope.application_reference.as_deref(), Some("aa-aa-aa-aa"));
}

#[test]
fn test_audit_snapshots_bracket_transition() {
    let context = create_test_context();
    let reserved = reserved_state(&context, &staff_actor());
    let result = crate::apply(
        &context,
        &reserved,
        crate::Command::BookVisit {
            application_reference: crate::tests::helpers::reference("aa-aa-aa-aa"),
            visit_reference: crate::tests::helpers::reference("vv-vv-vv-vv"),
            is_request_booking: false,
            application_method: visit_scheduler_domain::ApplicationMethod::Phone,
        },
        staff_actor(),
        crate::tests::helpers::create_test_cause(),
    )
    .unwrap();

    assert_eq!(result.audit_event.before, reserved.to_snapshot());
    assert_eq!(result.audit_event.after, result.new_state.to_snapshot());
    assert!(result.audit_event.after.data.contains("BOOKED/AUTO_APPROVED"));
    assert_eq!(result.audit_event.event_id, None);
}
