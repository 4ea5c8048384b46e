// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use visit_scheduler_domain::{UserType, VisitRestriction};

use super::{
    Harness, PRISONER, create_test_admin, create_test_cause, create_test_public,
    create_test_staff, create_test_system, now, prison_request, template_request,
};
use crate::{
    ApiError, AuthError, AuthenticatedActor, AuthorizationService, Role, approve_visit_request,
    authenticate, create_prison, create_session_template, expire_stale_applications,
    get_visit_history,
};

#[test]
fn test_authenticate_parses_role_case_insensitively() {
    let actor = authenticate("staff-9", "STAFF").unwrap();
    assert_eq!(actor, AuthenticatedActor::new(String::from("staff-9"), Role::Staff));

    let actor = authenticate("  booker  ", "public").unwrap();
    assert_eq!(actor.id, "booker");
    assert_eq!(actor.role, Role::Public);
}

#[test]
fn test_authenticate_rejects_empty_id_and_unknown_role() {
    assert!(matches!(
        authenticate("", "admin"),
        Err(AuthError::AuthenticationFailed { .. })
    ));
    assert!(matches!(
        authenticate("someone", "governor"),
        Err(AuthError::AuthenticationFailed { .. })
    ));
}

#[test]
fn test_roles_map_to_audit_user_types() {
    assert_eq!(create_test_admin().to_audit_actor().user_type, UserType::Staff);
    assert_eq!(create_test_staff().to_audit_actor().user_type, UserType::Staff);
    assert_eq!(create_test_public().to_audit_actor().user_type, UserType::Public);
    assert_eq!(create_test_system().to_audit_actor().user_type, UserType::System);
    assert_eq!(create_test_staff().to_audit_actor().id, "staff-1");
}

#[test]
fn test_only_admin_manages_reference_data() {
    let mut harness = Harness::new();

    for actor in [create_test_staff(), create_test_public(), create_test_system()] {
        let prison = create_prison(&mut harness.persistence, &prison_request(), &actor);
        assert!(matches!(prison, Err(ApiError::Unauthorized { .. })));

        let template =
            create_session_template(&mut harness.persistence, template_request("tpl-x"), &actor);
        assert!(matches!(template, Err(ApiError::Unauthorized { .. })));
    }

    assert!(
        create_prison(
            &mut harness.persistence,
            &prison_request(),
            &create_test_admin()
        )
        .is_ok()
    );
}

#[test]
fn test_system_actor_cannot_reserve() {
    let mut harness = Harness::new();

    let result = harness.reserve(PRISONER, VisitRestriction::Open, &create_test_system());

    assert_eq!(
        result,
        Err(ApiError::Unauthorized {
            action: String::from("book_visit"),
            required_role: String::from("Admin or Staff or Public"),
        })
    );
}

#[test]
fn test_public_cannot_approve_requests() {
    let mut harness = Harness::new();
    let visit = harness.requested_visit(PRISONER);

    let result = approve_visit_request(
        &mut harness.persistence,
        &harness.services,
        now(),
        &visit.reference,
        &create_test_public(),
        create_test_cause(),
    );

    assert!(matches!(result, Err(ApiError::Unauthorized { .. })));
    assert_eq!(harness.audit_count(&visit.reference), 2);
}

#[test]
fn test_history_is_restricted_to_staff() {
    let mut harness = Harness::new();
    let visit = harness.booked_visit(PRISONER);

    let result = get_visit_history(
        &mut harness.persistence,
        &visit.reference,
        &create_test_public(),
    );
    assert!(matches!(result, Err(ApiError::Unauthorized { .. })));

    let history = get_visit_history(
        &mut harness.persistence,
        &visit.reference,
        &create_test_staff(),
    )
    .unwrap();
    assert_eq!(history.events.len(), 2);
}

#[test]
fn test_expiry_sweep_requires_system_or_admin() {
    let mut harness = Harness::new();

    let result = expire_stale_applications(
        &mut harness.persistence,
        &harness.services,
        now(),
        &create_test_staff(),
    );
    assert!(matches!(result, Err(ApiError::Unauthorized { .. })));

    assert!(
        expire_stale_applications(
            &mut harness.persistence,
            &harness.services,
            now(),
            &create_test_system(),
        )
        .is_ok()
    );
}

#[test]
fn test_migration_requires_system_or_admin() {
    assert!(AuthorizationService::authorize_migrate(&create_test_system()).is_ok());
    assert!(AuthorizationService::authorize_migrate(&create_test_admin()).is_ok());
    assert_eq!(
        AuthorizationService::authorize_migrate(&create_test_staff()),
        Err(AuthError::Unauthorized {
            action: String::from("migrate"),
            required_role: String::from("Admin or System"),
        })
    );
}
