// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::tests::helpers::{
    PRISONER, create_test_cause, create_test_context, create_test_template, reference,
    staff_actor,
};
use crate::{
    BookingContext, Command, CoreError, State, TransitionResult, UNKNOWN_CONTACT_NAME, apply,
};
use time::macros::datetime;
use visit_scheduler_audit::EventAuditType;
use visit_scheduler_domain::{
    DomainError, LegacyContact, LegacyVisit, OutcomeStatus, UserType, VisitRestriction,
    VisitStatus, VisitSubStatus, VisitType, Visitor,
};

fn legacy_visit() -> LegacyVisit {
    LegacyVisit {
        prison_code: "hei".to_string(),
        prisoner_id: PRISONER.to_string(),
        visit_room: "Main Hall".to_string(),
        visit_type: VisitType::Social,
        restriction: VisitRestriction::Open,
        start: datetime!(2026 - 03 - 02 09:00),
        end: datetime!(2026 - 03 - 02 10:00),
        status: VisitStatus::Booked,
        outcome_status: None,
        visitors: vec![Visitor::new(4321, true)],
        visit_contact: Some(LegacyContact {
            name: Some("Jane Smith".to_string()),
            telephone: None,
        }),
        visit_notes: Vec::new(),
        lead_visitor_id: Some(4321),
        created_at: Some(datetime!(2026 - 01 - 10 08:00)),
        modified_at: None,
    }
}

fn migration_context() -> BookingContext {
    let mut context = create_test_context();
    context.session_template = None;
    let mut afternoon = create_test_template("tpl-afternoon");
    afternoon.start_time = time::macros::time!(14:00);
    afternoon.end_time = time::macros::time!(15:00);
    context.migration_candidates = vec![afternoon, create_test_template("tpl-morning")];
    context
}

fn migrate(context: &BookingContext, legacy: LegacyVisit) -> Result<TransitionResult, CoreError> {
    apply(
        context,
        &State::default(),
        Command::MigrateVisit {
            visit_reference: reference("mm-mm-mm-mm"),
            legacy,
        },
        staff_actor(),
        create_test_cause(),
    )
}

#[test]
fn test_migrate_matches_closest_template() {
    let context = migration_context();
    let result = migrate(&context, legacy_visit()).unwrap();

    let visit = result.new_state.visit.unwrap();
    assert_eq!(visit.reference, reference("mm-mm-mm-mm"));
    assert_eq!(visit.prison_code, "HEI");
    assert_eq!(
        visit.slot.session_template_reference.as_deref(),
        Some("tpl-morning")
    );
    assert_eq!(visit.status, VisitStatus::Booked);
    assert_eq!(visit.sub_status, VisitSubStatus::AutoApproved);
    assert_eq!(visit.created_at, datetime!(2026 - 01 - 10 08:00));
    assert_eq!(visit.modified_at, datetime!(2026 - 01 - 10 08:00));

    let legacy = visit.legacy.unwrap();
    assert_eq!(legacy.lead_visitor_id, Some(4321));
    assert_eq!(legacy.migrated_at, context.now);

    assert_eq!(
        result.audit_event.action.event_type,
        EventAuditType::MigratedVisit
    );
    assert!(result.new_state.application.is_none());
}

#[test]
fn test_migrated_visit_is_a_system_booking() {
    let context = migration_context();

    let result = migrate(&context, legacy_visit()).unwrap();

    assert_eq!(result.new_state.visit.unwrap().user_type, UserType::System);
    assert_eq!(result.audit_event.actor.user_type, UserType::Staff);
}

#[test]
fn test_migrate_keeps_legacy_times() {
    let context = migration_context();
    let mut legacy = legacy_visit();
    legacy.start = datetime!(2026 - 03 - 02 09:15);
    legacy.end = datetime!(2026 - 03 - 02 10:15);

    let visit = migrate(&context, legacy).unwrap().new_state.visit.unwrap();
    assert_eq!(visit.slot.start_time, time::macros::time!(09:15));
    assert_eq!(
        visit.slot.session_template_reference.as_deref(),
        Some("tpl-morning")
    );
}

#[test]
fn test_migrate_defaults_missing_contact_name() {
    let context = migration_context();
    let mut legacy = legacy_visit();
    legacy.visit_contact = Some(LegacyContact {
        name: Some("  ".to_string()),
        telephone: Some("0123".to_string()),
    });

    let contact = migrate(&context, legacy)
        .unwrap()
        .new_state
        .visit
        .unwrap()
        .visit_contact
        .unwrap();
    assert_eq!(contact.name, UNKNOWN_CONTACT_NAME);
    assert_eq!(contact.telephone.as_deref(), Some("0123"));
}

#[test]
fn test_migrate_future_visit_without_template_fails() {
    let mut context = migration_context();
    context.migration_candidates.clear();

    let err = migrate(&context, legacy_visit()).unwrap_err();
    assert!(matches!(
        err,
        CoreError::DomainViolation(DomainError::NoMatchingSessionTemplate { .. })
    ));
}

#[test]
fn test_migrate_past_visit_without_template_keeps_room() {
    let mut context = migration_context();
    context.migration_candidates.clear();
    let mut legacy = legacy_visit();
    legacy.start = datetime!(2025 - 06 - 02 09:00);
    legacy.end = datetime!(2025 - 06 - 02 10:00);
    legacy.visit_room = "Old Visits Hall".to_string();

    let visit = migrate(&context, legacy).unwrap().new_state.visit.unwrap();
    assert_eq!(visit.slot.session_template_reference, None);
    assert_eq!(visit.visit_room, "Old Visits Hall");
}

#[test]
fn test_migrate_cancelled_visit_without_outcome() {
    let context = migration_context();
    let mut legacy = legacy_visit();
    legacy.status = VisitStatus::Cancelled;

    let visit = migrate(&context, legacy).unwrap().new_state.visit.unwrap();
    assert_eq!(visit.status, VisitStatus::Cancelled);
    assert_eq!(visit.sub_status, VisitSubStatus::Cancelled);
    assert_eq!(visit.outcome_status, Some(OutcomeStatus::NotRecorded));
}

#[test]
fn test_migrate_rejects_reserved_status() {
    let context = migration_context();
    let mut legacy = legacy_visit();
    legacy.status = VisitStatus::Reserved;

    let err = migrate(&context, legacy).unwrap_err();
    assert!(matches!(
        err,
        CoreError::DomainViolation(DomainError::InvalidVisitStatus { .. })
    ));
}

#[test]
fn test_migrate_rejects_other_prison() {
    let context = migration_context();
    let mut legacy = legacy_visit();
    legacy.prison_code = "MDI".to_string();

    let err = migrate(&context, legacy).unwrap_err();
    assert!(matches!(
        err,
        CoreError::DomainViolation(DomainError::PrisonMismatch { .. })
    ));
}

#[test]
fn test_migrate_rejects_end_before_start() {
    let context = migration_context();
    let mut legacy = legacy_visit();
    legacy.end = datetime!(2026 - 03 - 02 08:00);

    let err = migrate(&context, legacy).unwrap_err();
    assert!(matches!(
        err,
        CoreError::DomainViolation(DomainError::InvalidDateRange { .. })
    ));
}
