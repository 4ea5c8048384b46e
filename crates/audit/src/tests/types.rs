// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{Action, Actor, AuditEvent, AuditScope, Cause, EventAuditType, StateSnapshot};
use std::str::FromStr;
use visit_scheduler_domain::{ApplicationMethod, UserType};

fn create_test_event() -> AuditEvent {
    AuditEvent::new(
        Actor::new(String::from("staff-1"), UserType::Staff),
        Cause::new(String::from("req-456"), String::from("Phone booking")),
        Action::new(EventAuditType::BookedVisit, None),
        ApplicationMethod::Phone,
        AuditScope {
            booking_reference: Some(String::from("ab-cd-ef-gh")),
            application_reference: Some(String::from("zz-yy-xx-ww")),
            session_template_reference: Some(String::from("tpl-mon-am")),
        },
        StateSnapshot::new(String::from("before-state")),
        StateSnapshot::new(String::from("after-state")),
    )
}

#[test]
fn test_actor_creation_requires_all_fields() {
    let actor: Actor = Actor::new(String::from("staff-1"), UserType::Staff);

    assert_eq!(actor.id, "staff-1");
    assert_eq!(actor.user_type, UserType::Staff);
}

#[test]
fn test_cause_creation_requires_all_fields() {
    let cause: Cause = Cause::new(String::from("req-456"), String::from("User request"));

    assert_eq!(cause.id, "req-456");
    assert_eq!(cause.description, "User request");
}

#[test]
fn test_action_creation_with_details() {
    let action: Action = Action::new(
        EventAuditType::CancelledVisit,
        Some(String::from("Prisoner unwell")),
    );

    assert_eq!(action.event_type, EventAuditType::CancelledVisit);
    assert_eq!(action.details.as_deref(), Some("Prisoner unwell"));
}

#[test]
fn test_new_event_has_no_id_until_persisted() {
    let event = create_test_event();
    assert_eq!(event.event_id, None);

    let persisted = event.clone().with_event_id(42);
    assert_eq!(persisted.event_id, Some(42));
    assert_eq!(persisted.action, event.action);
    assert_eq!(persisted.booking_reference(), Some("ab-cd-ef-gh"));
}

#[test]
fn test_event_audit_type_strings() {
    for event_type in [
        EventAuditType::ReservedVisit,
        EventAuditType::ChangingVisit,
        EventAuditType::MigratedVisit,
        EventAuditType::BookedVisit,
        EventAuditType::UpdatedVisit,
        EventAuditType::CancelledVisit,
        EventAuditType::RequestedVisit,
        EventAuditType::RequestedVisitApproved,
        EventAuditType::RequestedVisitRejected,
        EventAuditType::RequestedVisitWithdrawn,
    ] {
        assert_eq!(EventAuditType::from_str(event_type.as_str()), Ok(event_type));
    }
    assert!(EventAuditType::from_str("DELETED_VISIT").is_err());
}

#[test]
fn test_audit_event_equality() {
    assert_eq!(create_test_event(), create_test_event());

    let mut other = create_test_event();
    other.scope.booking_reference = None;
    assert_ne!(create_test_event(), other);
}
