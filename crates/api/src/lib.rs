// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API boundary of the prison visit scheduler.
//!
//! Handlers authenticate and authorize the caller, gather what a command
//! needs from persistence and the collaborator directories, run the pure
//! core transition, persist it and publish the resulting visit event.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

mod auth;
mod collaborators;
mod error;
mod handlers;
mod request_response;
mod services;

#[cfg(test)]
mod tests;

pub use auth::{AuthenticatedActor, AuthorizationService, Role, authenticate};
pub use collaborators::{
    DirectorySeed, InMemoryDirectory, NonAssociationDirectory, PrisonerDirectory, VisitEvent,
    VisitEventPublisher, VisitEventType,
};
pub use error::{
    ApiError, AuthError, DirectoryError, translate_core_error, translate_domain_error,
    translate_persistence_error,
};
pub use handlers::{
    approve_visit_request, book_visit, cancel_visit, change_application_slot,
    change_booked_visit, create_prison, create_session_template, expire_stale_applications,
    get_session_capacity, get_visit, get_visit_history, get_visit_sessions,
    list_visits_for_prisoner, migrate_cancellation, migrate_visit, reject_visit_request,
    reserve_slot, withdraw_visit_request,
};
pub use request_response::{
    ApplicationResponse, BookVisitRequest, CancelVisitRequest, CapacityResponse,
    CreatePrisonRequest, CreateSessionTemplateRequest, ExpireApplicationsResponse,
    LegacyContactBody, MigrateCancellationRequest, MigrateVisitRequest, PrisonResponse,
    ReserveSlotRequest, SessionCapacityRequest, SessionCapacityResponse,
    SessionTemplateResponse, SlotRequestBody, VisitHistoryEntry, VisitHistoryResponse,
    VisitResponse, VisitSessionResponse, VisitSessionsRequest, format_date, format_time,
    format_timestamp, parse_date, parse_time, parse_timestamp,
};
pub use services::{SchedulerSettings, Services};
