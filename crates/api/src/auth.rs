// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Authentication and authorization types and services.

use std::str::FromStr;
use visit_scheduler_audit::Actor;
use visit_scheduler_domain::UserType;

use crate::error::AuthError;

/// Actor roles for authorization.
///
/// Roles determine what actions an authenticated actor may perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Admin role: operators who maintain reference data.
    ///
    /// Admins may perform:
    /// - creation and modification of prisons and session templates
    /// - any staff action
    /// - migration and expiry sweeps
    Admin,
    /// Staff role: prison staff using the booking tool.
    ///
    /// Staff may:
    /// - reserve, book, change and cancel visits for any prisoner
    /// - approve or reject visit requests
    /// - read visit history
    Staff,
    /// Public role: members of the public booking online.
    ///
    /// Public bookings are subject to the booking window, the prisoner's
    /// visiting-order balance and non-association rules.
    Public,
    /// System role: automated processes such as legacy migration.
    System,
}

impl Role {
    /// Returns the role name used in authorization errors.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::Staff => "Staff",
            Self::Public => "Public",
            Self::System => "System",
        }
    }
}

impl FromStr for Role {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "staff" => Ok(Self::Staff),
            "public" => Ok(Self::Public),
            "system" => Ok(Self::System),
            _ => Err(AuthError::AuthenticationFailed {
                reason: format!("Unknown role '{s}'"),
            }),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An authenticated actor with an associated role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedActor {
    /// The unique identifier for this actor.
    pub id: String,
    /// The role assigned to this actor.
    pub role: Role,
}

impl AuthenticatedActor {
    /// Creates a new authenticated actor.
    ///
    /// # Arguments
    ///
    /// * `id` - The unique identifier for this actor
    /// * `role` - The role assigned to this actor
    #[must_use]
    pub const fn new(id: String, role: Role) -> Self {
        Self { id, role }
    }

    /// Returns the booking user type this actor acts as.
    #[must_use]
    pub const fn user_type(&self) -> UserType {
        match self.role {
            Role::Admin | Role::Staff => UserType::Staff,
            Role::Public => UserType::Public,
            Role::System => UserType::System,
        }
    }

    /// Converts this authenticated actor into an audit Actor.
    #[must_use]
    pub fn to_audit_actor(&self) -> Actor {
        Actor::new(self.id.clone(), self.user_type())
    }
}

/// Authenticates an actor from the identity headers of a request.
///
/// Identity is taken at face value; a real deployment replaces this with
/// token validation against an identity provider.
///
/// # Errors
///
/// Returns an error if the actor id is empty or the role is unknown.
pub fn authenticate(actor_id: &str, role: &str) -> Result<AuthenticatedActor, AuthError> {
    let actor_id = actor_id.trim();
    if actor_id.is_empty() {
        return Err(AuthError::AuthenticationFailed {
            reason: String::from("Actor ID cannot be empty"),
        });
    }
    Ok(AuthenticatedActor::new(actor_id.to_string(), role.parse()?))
}

fn require(
    actor: &AuthenticatedActor,
    allowed: &[Role],
    action: &str,
) -> Result<(), AuthError> {
    if allowed.contains(&actor.role) {
        return Ok(());
    }
    Err(AuthError::Unauthorized {
        action: action.to_string(),
        required_role: allowed
            .iter()
            .map(Role::as_str)
            .collect::<Vec<_>>()
            .join(" or "),
    })
}

/// Authorization service for enforcing role-based access control.
pub struct AuthorizationService;

impl AuthorizationService {
    /// Checks if an actor may create or update a prison.
    ///
    /// # Errors
    ///
    /// Returns an error unless the actor is an Admin.
    pub fn authorize_manage_prison(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        require(actor, &[Role::Admin], "manage_prison")
    }

    /// Checks if an actor may create or update a session template.
    ///
    /// # Errors
    ///
    /// Returns an error unless the actor is an Admin.
    pub fn authorize_manage_session_template(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        require(actor, &[Role::Admin], "manage_session_template")
    }

    /// Checks if an actor may reserve, change or book a visit.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor is a System actor.
    pub fn authorize_book_visit(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        require(
            actor,
            &[Role::Admin, Role::Staff, Role::Public],
            "book_visit",
        )
    }

    /// Checks if an actor may cancel a visit.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor is a System actor.
    pub fn authorize_cancel_visit(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        require(
            actor,
            &[Role::Admin, Role::Staff, Role::Public],
            "cancel_visit",
        )
    }

    /// Checks if an actor may approve or reject a visit request.
    ///
    /// # Errors
    ///
    /// Returns an error unless the actor is Staff or Admin.
    pub fn authorize_decide_visit_request(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        require(actor, &[Role::Admin, Role::Staff], "decide_visit_request")
    }

    /// Checks if an actor may withdraw a visit request.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor is a System actor.
    pub fn authorize_withdraw_visit_request(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        require(
            actor,
            &[Role::Admin, Role::Staff, Role::Public],
            "withdraw_visit_request",
        )
    }

    /// Checks if an actor may import legacy visits.
    ///
    /// # Errors
    ///
    /// Returns an error unless the actor is System or Admin.
    pub fn authorize_migrate(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        require(actor, &[Role::Admin, Role::System], "migrate")
    }

    /// Checks if an actor may run the expired-application sweep.
    ///
    /// # Errors
    ///
    /// Returns an error unless the actor is System or Admin.
    pub fn authorize_expire_applications(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        require(actor, &[Role::Admin, Role::System], "expire_applications")
    }

    /// Checks if an actor may read the audit history of a visit.
    ///
    /// # Errors
    ///
    /// Returns an error unless the actor is Staff or Admin.
    pub fn authorize_view_history(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        require(actor, &[Role::Admin, Role::Staff], "view_history")
    }

    /// Reading visits and sessions is open to every authenticated actor.
    ///
    /// # Errors
    ///
    /// Never returns an error.
    pub const fn authorize_read(_actor: &AuthenticatedActor) -> Result<(), AuthError> {
        Ok(())
    }
}
