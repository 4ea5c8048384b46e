// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API handler functions.
//!
//! Each state-changing handler authorizes the actor, loads the state and
//! booking context from persistence and the directories, applies the
//! command, persists the transition and publishes the resulting event.
//! Callers must hold exclusive access to `persistence` for the whole call.

use time::{Date, OffsetDateTime, PrimitiveDateTime};
use tracing::{info, warn};
use visit_scheduler::{
    BookingContext, Command, SlotRequest, State, TransitionResult, apply,
};
use visit_scheduler_audit::{Cause, EventAuditType};
use visit_scheduler_domain::{
    Application, BookingWindow, LegacyContact, LegacyVisit, Prison, Reference, SessionTemplate,
    Visit, VisitRestriction, VisitStatus, day_of_week_str, evaluate_capacity,
    generate_visit_sessions, parse_day_of_week, validate_prison_code,
};
use visit_scheduler_persistence::{Persistence, PersistenceError};

use crate::auth::{AuthenticatedActor, AuthorizationService};
use crate::collaborators::VisitEventType;
use crate::error::{
    ApiError, translate_core_error, translate_domain_error, translate_persistence_error,
};
use crate::request_response::{
    ApplicationResponse, BookVisitRequest, CancelVisitRequest, CreatePrisonRequest,
    CreateSessionTemplateRequest, ExpireApplicationsResponse, MigrateCancellationRequest,
    MigrateVisitRequest, PrisonResponse, ReserveSlotRequest, SessionCapacityRequest,
    SessionCapacityResponse, SessionTemplateResponse, SlotRequestBody, VisitHistoryEntry,
    VisitHistoryResponse, VisitResponse, VisitSessionResponse, VisitSessionsRequest, format_date,
    format_time, format_timestamp, parse_date, parse_time, parse_timestamp,
};
use crate::services::Services;

/// Attempts at drawing an unused reference before giving up.
const REFERENCE_ATTEMPTS: usize = 8;

fn parse_reference(value: &str) -> Result<Reference, ApiError> {
    Reference::parse(value).map_err(translate_domain_error)
}

/// Draws a random reference not used by any application or visit.
fn fresh_reference(persistence: &mut Persistence) -> Result<Reference, ApiError> {
    for _ in 0..REFERENCE_ATTEMPTS {
        let candidate = Reference::from_entropy(rand::random::<u64>());
        let in_use = persistence
            .get_application(candidate.value())
            .map_err(translate_persistence_error)?
            .is_some()
            || persistence
                .get_visit(candidate.value())
                .map_err(translate_persistence_error)?
                .is_some();
        if !in_use {
            return Ok(candidate);
        }
    }
    Err(ApiError::Internal {
        message: String::from("Could not generate an unused reference"),
    })
}

fn require_prison(persistence: &mut Persistence, code: &str) -> Result<Prison, ApiError> {
    persistence
        .get_prison(code)
        .map_err(translate_persistence_error)?
        .ok_or_else(|| not_found("Prison", code))
}

fn require_template(
    persistence: &mut Persistence,
    reference: &str,
) -> Result<SessionTemplate, ApiError> {
    persistence
        .get_session_template(reference)
        .map_err(translate_persistence_error)?
        .ok_or_else(|| not_found("SessionTemplate", reference))
}

fn require_application(
    persistence: &mut Persistence,
    reference: &Reference,
) -> Result<Application, ApiError> {
    persistence
        .get_application(reference.value())
        .map_err(translate_persistence_error)?
        .ok_or_else(|| not_found("Application", reference.value()))
}

fn require_visit(persistence: &mut Persistence, reference: &Reference) -> Result<Visit, ApiError> {
    persistence
        .get_visit(reference.value())
        .map_err(translate_persistence_error)?
        .ok_or_else(|| not_found("Visit", reference.value()))
}

fn not_found(resource_type: &str, reference: &str) -> ApiError {
    ApiError::ResourceNotFound {
        resource_type: resource_type.to_string(),
        message: format!("{resource_type} '{reference}' does not exist"),
    }
}

fn missing(what: &str) -> ApiError {
    ApiError::Internal {
        message: format!("Transition produced no {what}"),
    }
}

fn slot_request(body: SlotRequestBody) -> Result<SlotRequest, ApiError> {
    Ok(SlotRequest {
        session_date: parse_date("session_date", &body.session_date)?,
        session_template_reference: body.session_template_reference,
        restriction: body.visit_restriction,
        visitors: body.visitors,
        visitor_support: body.visitor_support,
        visit_contact: body.visit_contact,
    })
}

/// Loads the prisoner's own bookings and those of non-associated prisoners
/// on `date`.
fn load_bookings(
    persistence: &mut Persistence,
    services: &Services,
    context: &mut BookingContext,
    prisoner_id: &str,
    date: Date,
) -> Result<(), ApiError> {
    let cutoff = context.expiry_cutoff().map_err(translate_domain_error)?;
    context.prisoner_bookings = persistence
        .get_bookings_on_date(&[prisoner_id.to_string()], date, cutoff)
        .map_err(translate_persistence_error)?;

    let non_associated = services.non_associations.non_associations(prisoner_id)?;
    context.non_association_bookings = persistence
        .get_bookings_on_date(&non_associated, date, cutoff)
        .map_err(translate_persistence_error)?;
    Ok(())
}

/// Builds the context for taking `request`.
///
/// The prison is `prison_code` when the booking already belongs to one,
/// otherwise the template's prison.
fn load_slot_context(
    persistence: &mut Persistence,
    services: &Services,
    now: PrimitiveDateTime,
    prison_code: Option<&str>,
    prisoner_id: &str,
    request: &SlotRequest,
    exclude: &[String],
) -> Result<BookingContext, ApiError> {
    let template = require_template(persistence, &request.session_template_reference)?;
    let prison = require_prison(persistence, prison_code.unwrap_or(&template.prison_code))?;

    let mut context = BookingContext::new(now, services.settings.policy);
    let cutoff = context.expiry_cutoff().map_err(translate_domain_error)?;
    context.occupancy = persistence
        .get_slot_occupancy(&template.reference, request.session_date, cutoff, exclude)
        .map_err(translate_persistence_error)?;
    load_bookings(
        persistence,
        services,
        &mut context,
        prisoner_id,
        request.session_date,
    )?;
    context.prisoner = services.prisoners.profile(prisoner_id)?;
    context.prison = Some(prison);
    context.session_template = Some(template);
    Ok(context)
}

fn apply_command(
    context: &BookingContext,
    state: &State,
    command: Command,
    actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<TransitionResult, ApiError> {
    let name = command.name();
    apply(context, state, command, actor.to_audit_actor(), cause).map_err(|e| {
        warn!(command = name, actor = %actor.id, error = %e, "Command rejected");
        translate_core_error(e)
    })
}

fn persist(persistence: &mut Persistence, result: &TransitionResult) -> Result<i64, ApiError> {
    persistence
        .persist_transition(result)
        .map_err(translate_persistence_error)
}

fn new_application(result: &TransitionResult) -> Result<ApplicationResponse, ApiError> {
    result
        .new_state
        .application
        .as_ref()
        .map(ApplicationResponse::from)
        .ok_or_else(|| missing("application"))
}

fn new_visit(result: &TransitionResult) -> Result<&Visit, ApiError> {
    result
        .new_state
        .visit
        .as_ref()
        .ok_or_else(|| missing("visit"))
}

/// Creates or replaces a prison.
///
/// # Errors
///
/// Returns an error if:
/// - The actor is not an Admin
/// - The prison configuration is invalid
/// - The database operation fails
pub fn create_prison(
    persistence: &mut Persistence,
    request: &CreatePrisonRequest,
    actor: &AuthenticatedActor,
) -> Result<PrisonResponse, ApiError> {
    AuthorizationService::authorize_manage_prison(actor)?;

    let exclude_dates = request
        .exclude_dates
        .iter()
        .map(|date| parse_date("exclude_dates", date))
        .collect::<Result<Vec<_>, _>>()?;
    let prison = Prison::new(
        &request.code,
        request.active,
        request.policy_notice_days_min,
        request.policy_notice_days_max,
        request.max_total_visitors,
        exclude_dates,
    )
    .map_err(translate_domain_error)?;

    let updated = persistence
        .upsert_prison(&prison)
        .map_err(translate_persistence_error)?;
    info!(prison_code = %prison.code, updated, actor = %actor.id, "Saved prison");

    Ok(PrisonResponse {
        exclude_dates: prison.exclude_dates.iter().copied().map(format_date).collect(),
        code: prison.code,
        active: prison.active,
        policy_notice_days_min: prison.policy_notice_days_min,
        policy_notice_days_max: prison.policy_notice_days_max,
        max_total_visitors: prison.max_total_visitors,
        updated,
    })
}

/// Creates or replaces a session template.
///
/// # Errors
///
/// Returns an error if:
/// - The actor is not an Admin
/// - The prison does not exist
/// - The template configuration is invalid
pub fn create_session_template(
    persistence: &mut Persistence,
    request: CreateSessionTemplateRequest,
    actor: &AuthenticatedActor,
) -> Result<SessionTemplateResponse, ApiError> {
    AuthorizationService::authorize_manage_session_template(actor)?;

    let prison_code = validate_prison_code(&request.prison_code).map_err(translate_domain_error)?;
    let prison = require_prison(persistence, &prison_code)?;

    let template = SessionTemplate {
        reference: request.reference.trim().to_string(),
        name: request.name,
        prison_code: prison.code,
        visit_room: request.visit_room,
        visit_type: request.visit_type,
        open_capacity: request.open_capacity,
        closed_capacity: request.closed_capacity,
        start_time: parse_time("start_time", &request.start_time)?,
        end_time: parse_time("end_time", &request.end_time)?,
        valid_from_date: parse_date("valid_from_date", &request.valid_from_date)?,
        valid_to_date: request
            .valid_to_date
            .as_deref()
            .map(|date| parse_date("valid_to_date", date))
            .transpose()?,
        day_of_week: parse_day_of_week(&request.day_of_week).map_err(translate_domain_error)?,
        weekly_frequency: request.weekly_frequency,
        active: request.active,
        allow_over_booking: request.allow_over_booking,
        eligibility: request.eligibility,
    };
    template.validate().map_err(translate_domain_error)?;

    let updated = persistence
        .upsert_session_template(&template)
        .map_err(translate_persistence_error)?;
    info!(
        reference = %template.reference,
        prison_code = %template.prison_code,
        updated,
        actor = %actor.id,
        "Saved session template"
    );

    Ok(SessionTemplateResponse {
        day_of_week: day_of_week_str(template.day_of_week).to_string(),
        start_time: format_time(template.start_time),
        end_time: format_time(template.end_time),
        open_capacity: template.open_capacity,
        closed_capacity: template.closed_capacity,
        reference: template.reference,
        prison_code: template.prison_code,
        name: template.name,
        updated,
    })
}

/// Reserves a slot for a new visit.
///
/// # Errors
///
/// Returns an error if:
/// - The actor may not book visits
/// - The template or its prison does not exist
/// - The slot cannot be taken (window, eligibility, capacity, conflicts)
pub fn reserve_slot(
    persistence: &mut Persistence,
    services: &Services,
    now: OffsetDateTime,
    request: ReserveSlotRequest,
    actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<ApplicationResponse, ApiError> {
    AuthorizationService::authorize_book_visit(actor)?;
    let now = services.local_now(now)?;

    let prisoner_id = request.prisoner_id.trim().to_string();
    let slot = slot_request(request.slot)?;
    let context = load_slot_context(persistence, services, now, None, &prisoner_id, &slot, &[])?;

    let application_reference = fresh_reference(persistence)?;
    let command = Command::ReserveSlot {
        application_reference,
        prisoner_id,
        request: slot,
    };
    let result = apply_command(&context, &State::default(), command, actor, cause)?;
    let event_id = persist(persistence, &result)?;

    let response = new_application(&result)?;
    info!(
        reference = %response.reference,
        prisoner_id = %response.prisoner_id,
        event_id,
        "Reserved slot"
    );
    Ok(response)
}

/// Moves an in-progress application to another slot or party.
///
/// # Errors
///
/// Returns an error if:
/// - The actor may not book visits
/// - The application does not exist, is booked or has expired
/// - The new slot cannot be taken
pub fn change_application_slot(
    persistence: &mut Persistence,
    services: &Services,
    now: OffsetDateTime,
    application_reference: &str,
    request: SlotRequestBody,
    actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<ApplicationResponse, ApiError> {
    AuthorizationService::authorize_book_visit(actor)?;
    let now = services.local_now(now)?;

    let reference = parse_reference(application_reference)?;
    let application = require_application(persistence, &reference)?;
    let visit = match &application.visit_reference {
        Some(visit_reference) => Some(require_visit(persistence, visit_reference)?),
        None => None,
    };

    let mut exclude = vec![application.reference.to_string()];
    if let Some(visit_reference) = &application.visit_reference {
        exclude.push(visit_reference.to_string());
    }

    let slot = slot_request(request)?;
    let context = load_slot_context(
        persistence,
        services,
        now,
        Some(&application.prison_code),
        &application.prisoner_id,
        &slot,
        &exclude,
    )?;

    let command = Command::ChangeApplicationSlot {
        application_reference: reference,
        request: slot,
    };
    let state = State::new(Some(application), visit);
    let result = apply_command(&context, &state, command, actor, cause)?;
    let event_id = persist(persistence, &result)?;

    let response = new_application(&result)?;
    info!(reference = %response.reference, event_id, "Changed application slot");
    Ok(response)
}

/// Starts changing a booked visit by creating a change application.
///
/// # Errors
///
/// Returns an error if:
/// - The actor may not book visits
/// - The visit does not exist, is cancelled or has started
/// - The new slot cannot be taken
pub fn change_booked_visit(
    persistence: &mut Persistence,
    services: &Services,
    now: OffsetDateTime,
    booking_reference: &str,
    request: SlotRequestBody,
    actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<ApplicationResponse, ApiError> {
    AuthorizationService::authorize_book_visit(actor)?;
    let now = services.local_now(now)?;

    let booking_reference = parse_reference(booking_reference)?;
    let visit = require_visit(persistence, &booking_reference)?;

    let slot = slot_request(request)?;
    let context = load_slot_context(
        persistence,
        services,
        now,
        Some(&visit.prison_code),
        &visit.prisoner_id,
        &slot,
        &[visit.reference.to_string()],
    )?;

    let application_reference = fresh_reference(persistence)?;
    let command = Command::ChangeBookedVisit {
        application_reference,
        booking_reference,
        request: slot,
    };
    let state = State::new(None, Some(visit));
    let result = apply_command(&context, &state, command, actor, cause)?;
    let event_id = persist(persistence, &result)?;

    let response = new_application(&result)?;
    info!(
        reference = %response.reference,
        visit_reference = ?response.visit_reference,
        event_id,
        "Started visit change"
    );
    Ok(response)
}

/// Returns the visit an already booked application created.
fn existing_booking(
    persistence: &mut Persistence,
    application: &Application,
) -> Result<VisitResponse, ApiError> {
    let visit_reference = application.visit_reference.as_ref().ok_or_else(|| {
        ApiError::Conflict {
            message: format!(
                "Application '{}' is booked but has no visit",
                application.reference
            ),
        }
    })?;
    let visit = require_visit(persistence, visit_reference)?;
    Ok(VisitResponse::from(&visit))
}

/// Books an application, creating a new visit or updating the visit being
/// changed.
///
/// Booking an application that is already booked returns the visit it
/// created and records nothing.
///
/// # Errors
///
/// Returns an error if:
/// - The actor may not book visits
/// - The application does not exist or has expired
/// - A public booking has no visiting orders left or a non-association
///   conflict
pub fn book_visit(
    persistence: &mut Persistence,
    services: &Services,
    now: OffsetDateTime,
    application_reference: &str,
    request: BookVisitRequest,
    actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<VisitResponse, ApiError> {
    AuthorizationService::authorize_book_visit(actor)?;
    let now = services.local_now(now)?;

    let reference = parse_reference(application_reference)?;
    let application = require_application(persistence, &reference)?;
    if application.status == VisitStatus::Booked {
        info!(reference = %reference, "Application already booked");
        return existing_booking(persistence, &application);
    }

    let visit = match &application.visit_reference {
        Some(visit_reference) => Some(require_visit(persistence, visit_reference)?),
        None => None,
    };
    let template_reference = application
        .slot
        .session_template_reference
        .clone()
        .ok_or_else(|| not_found("SessionTemplate", "none"))?;

    let mut context = BookingContext::new(now, services.settings.policy);
    context.prison = Some(require_prison(persistence, &application.prison_code)?);
    context.session_template = Some(require_template(persistence, &template_reference)?);
    load_bookings(
        persistence,
        services,
        &mut context,
        &application.prisoner_id,
        application.slot.date,
    )?;
    context.prisoner = services.prisoners.profile(&application.prisoner_id)?;
    context.visit_balance = services
        .prisoners
        .visit_balance(&application.prisoner_id)?;

    let visit_reference = match &application.visit_reference {
        Some(existing) => existing.clone(),
        None => fresh_reference(persistence)?,
    };
    let command = Command::BookVisit {
        application_reference: reference.clone(),
        visit_reference,
        is_request_booking: request.is_request_booking,
        application_method: request.application_method,
    };
    let state = State::new(Some(application), visit);
    let result = apply_command(&context, &state, command, actor, cause)?;

    let event_id = match persistence.persist_transition(&result) {
        Ok(event_id) => event_id,
        Err(PersistenceError::ApplicationAlreadyBooked {
            visit_reference: Some(existing),
            ..
        }) => {
            warn!(
                reference = %reference,
                visit_reference = %existing,
                "Application booked concurrently"
            );
            let existing = parse_reference(&existing)?;
            let visit = require_visit(persistence, &existing)?;
            return Ok(VisitResponse::from(&visit));
        }
        Err(e) => return Err(translate_persistence_error(e)),
    };

    let visit = new_visit(&result)?;
    let event_type = match result.audit_event.action.event_type {
        EventAuditType::UpdatedVisit => VisitEventType::Changed,
        _ => VisitEventType::Booked,
    };
    services.publish(event_type, visit, now, event_id);
    info!(
        reference = %visit.reference,
        application_reference = %reference,
        sub_status = visit.sub_status.as_str(),
        event_id,
        "Booked visit"
    );
    Ok(VisitResponse::from(visit))
}

/// Applies a command against a single existing visit, then persists and
/// publishes the result.
#[allow(clippy::too_many_arguments)]
fn apply_to_visit(
    persistence: &mut Persistence,
    services: &Services,
    now: PrimitiveDateTime,
    visit: Visit,
    command: Command,
    event_type: VisitEventType,
    actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<VisitResponse, ApiError> {
    let context = BookingContext::new(now, services.settings.policy);
    let state = State::new(None, Some(visit));
    let result = apply_command(&context, &state, command, actor, cause)?;
    let event_id = persist(persistence, &result)?;

    let visit = new_visit(&result)?;
    services.publish(event_type, visit, now, event_id);
    info!(
        reference = %visit.reference,
        event_type = %event_type,
        event_id,
        "Updated visit"
    );
    Ok(VisitResponse::from(visit))
}

/// Cancels a booked visit.
///
/// Cancelling a visit that is already cancelled returns it unchanged and
/// records nothing.
///
/// # Errors
///
/// Returns an error if:
/// - The actor may not cancel visits
/// - The visit does not exist
/// - The visit started longer ago than the cancellation limit
pub fn cancel_visit(
    persistence: &mut Persistence,
    services: &Services,
    now: OffsetDateTime,
    booking_reference: &str,
    request: CancelVisitRequest,
    actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<VisitResponse, ApiError> {
    AuthorizationService::authorize_cancel_visit(actor)?;
    let now = services.local_now(now)?;

    let reference = parse_reference(booking_reference)?;
    let visit = require_visit(persistence, &reference)?;
    if visit.status == VisitStatus::Cancelled {
        info!(reference = %reference, "Visit already cancelled");
        return Ok(VisitResponse::from(&visit));
    }

    let command = Command::CancelVisit {
        booking_reference: reference,
        outcome_status: request.outcome_status,
        text: request.text,
        application_method: request.application_method,
    };
    apply_to_visit(
        persistence,
        services,
        now,
        visit,
        command,
        VisitEventType::Cancelled,
        actor,
        cause,
    )
}

/// Approves a requested visit.
///
/// # Errors
///
/// Returns an error if the actor is not Staff or Admin, or the visit is not
/// awaiting a decision.
pub fn approve_visit_request(
    persistence: &mut Persistence,
    services: &Services,
    now: OffsetDateTime,
    booking_reference: &str,
    actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<VisitResponse, ApiError> {
    AuthorizationService::authorize_decide_visit_request(actor)?;
    let now = services.local_now(now)?;

    let reference = parse_reference(booking_reference)?;
    let visit = require_visit(persistence, &reference)?;
    let command = Command::ApproveVisitRequest {
        booking_reference: reference,
    };
    apply_to_visit(
        persistence,
        services,
        now,
        visit,
        command,
        VisitEventType::RequestApproved,
        actor,
        cause,
    )
}

/// Rejects a requested visit, cancelling it.
///
/// # Errors
///
/// Returns an error if the actor is not Staff or Admin, or the visit is not
/// awaiting a decision.
pub fn reject_visit_request(
    persistence: &mut Persistence,
    services: &Services,
    now: OffsetDateTime,
    booking_reference: &str,
    actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<VisitResponse, ApiError> {
    AuthorizationService::authorize_decide_visit_request(actor)?;
    let now = services.local_now(now)?;

    let reference = parse_reference(booking_reference)?;
    let visit = require_visit(persistence, &reference)?;
    let command = Command::RejectVisitRequest {
        booking_reference: reference,
    };
    apply_to_visit(
        persistence,
        services,
        now,
        visit,
        command,
        VisitEventType::RequestRejected,
        actor,
        cause,
    )
}

/// Withdraws a requested visit on behalf of the booker.
///
/// # Errors
///
/// Returns an error if the actor may not withdraw requests, or the visit
/// is not awaiting a decision.
pub fn withdraw_visit_request(
    persistence: &mut Persistence,
    services: &Services,
    now: OffsetDateTime,
    booking_reference: &str,
    actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<VisitResponse, ApiError> {
    AuthorizationService::authorize_withdraw_visit_request(actor)?;
    let now = services.local_now(now)?;

    let reference = parse_reference(booking_reference)?;
    let visit = require_visit(persistence, &reference)?;
    let command = Command::WithdrawVisitRequest {
        booking_reference: reference,
    };
    apply_to_visit(
        persistence,
        services,
        now,
        visit,
        command,
        VisitEventType::RequestWithdrawn,
        actor,
        cause,
    )
}

fn legacy_visit(
    request: MigrateVisitRequest,
    prison_code: String,
) -> Result<LegacyVisit, ApiError> {
    Ok(LegacyVisit {
        start: parse_timestamp("start_timestamp", &request.start_timestamp)?,
        end: parse_timestamp("end_timestamp", &request.end_timestamp)?,
        created_at: request
            .create_timestamp
            .as_deref()
            .map(|value| parse_timestamp("create_timestamp", value))
            .transpose()?,
        modified_at: request
            .modify_timestamp
            .as_deref()
            .map(|value| parse_timestamp("modify_timestamp", value))
            .transpose()?,
        prison_code,
        prisoner_id: request.prisoner_id,
        visit_room: request.visit_room,
        visit_type: request.visit_type,
        restriction: request.visit_restriction,
        status: request.visit_status,
        outcome_status: request.outcome_status,
        visitors: request.visitors,
        visit_contact: request.visit_contact.map(|contact| LegacyContact {
            name: contact.name,
            telephone: contact.telephone,
        }),
        visit_notes: request.visit_notes,
        lead_visitor_id: request.lead_visitor_id,
    })
}

/// Imports a visit from the legacy system.
///
/// The best-fitting session template of the prison is attached to the
/// visit; future visits without a matching template are refused.
///
/// # Errors
///
/// Returns an error if:
/// - The actor is not System or Admin
/// - The prison does not exist
/// - The legacy record is invalid or a future visit matches no template
pub fn migrate_visit(
    persistence: &mut Persistence,
    services: &Services,
    now: OffsetDateTime,
    request: MigrateVisitRequest,
    actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<VisitResponse, ApiError> {
    AuthorizationService::authorize_migrate(actor)?;
    let now = services.local_now(now)?;

    let prison_code = validate_prison_code(&request.prison_code).map_err(translate_domain_error)?;
    let prison = require_prison(persistence, &prison_code)?;
    let legacy = legacy_visit(request, prison_code)?;

    let mut context = BookingContext::new(now, services.settings.policy);
    context.migration_candidates = persistence
        .list_session_templates(&prison.code)
        .map_err(translate_persistence_error)?;
    context.prisoner = services.prisoners.profile(&legacy.prisoner_id)?;
    context.prison = Some(prison);

    let command = Command::MigrateVisit {
        visit_reference: fresh_reference(persistence)?,
        legacy,
    };
    let result = apply_command(&context, &State::default(), command, actor, cause)?;
    let event_id = persist(persistence, &result)?;

    let visit = new_visit(&result)?;
    services.publish(VisitEventType::Migrated, visit, now, event_id);
    info!(
        reference = %visit.reference,
        prison_code = %visit.prison_code,
        session_template_reference = ?visit.slot.session_template_reference,
        event_id,
        "Migrated visit"
    );
    Ok(VisitResponse::from(visit))
}

/// Cancels a migrated visit with its legacy outcome.
///
/// Cancelling a visit that is already cancelled returns it unchanged.
///
/// # Errors
///
/// Returns an error if:
/// - The actor is not System or Admin
/// - The visit does not exist or was not migrated
pub fn migrate_cancellation(
    persistence: &mut Persistence,
    services: &Services,
    now: OffsetDateTime,
    booking_reference: &str,
    request: MigrateCancellationRequest,
    actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<VisitResponse, ApiError> {
    AuthorizationService::authorize_migrate(actor)?;
    let now = services.local_now(now)?;

    let reference = parse_reference(booking_reference)?;
    let visit = require_visit(persistence, &reference)?;
    if visit.legacy.is_none() {
        return Err(ApiError::DomainRuleViolation {
            rule: String::from("migrated_visit"),
            message: format!("Visit '{reference}' was not migrated"),
        });
    }
    if visit.status == VisitStatus::Cancelled {
        info!(reference = %reference, "Migrated visit already cancelled");
        return Ok(VisitResponse::from(&visit));
    }

    let command = Command::MigrateCancellation {
        booking_reference: reference,
        outcome_status: request.outcome_status,
        text: request.text,
    };
    apply_to_visit(
        persistence,
        services,
        now,
        visit,
        command,
        VisitEventType::Cancelled,
        actor,
        cause,
    )
}

/// Retrieves a visit.
///
/// # Errors
///
/// Returns an error if the reference is malformed or the visit does not exist.
pub fn get_visit(
    persistence: &mut Persistence,
    booking_reference: &str,
    actor: &AuthenticatedActor,
) -> Result<VisitResponse, ApiError> {
    AuthorizationService::authorize_read(actor)?;
    let reference = parse_reference(booking_reference)?;
    let visit = require_visit(persistence, &reference)?;
    Ok(VisitResponse::from(&visit))
}

/// Lists every visit of a prisoner.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_visits_for_prisoner(
    persistence: &mut Persistence,
    prisoner_id: &str,
    actor: &AuthenticatedActor,
) -> Result<Vec<VisitResponse>, ApiError> {
    AuthorizationService::authorize_read(actor)?;
    let visits = persistence
        .list_visits_for_prisoner(prisoner_id.trim())
        .map_err(translate_persistence_error)?;
    Ok(visits.iter().map(VisitResponse::from).collect())
}

/// Retrieves the audit history of a visit.
///
/// # Errors
///
/// Returns an error if the actor is not Staff or Admin, or the visit does
/// not exist.
pub fn get_visit_history(
    persistence: &mut Persistence,
    booking_reference: &str,
    actor: &AuthenticatedActor,
) -> Result<VisitHistoryResponse, ApiError> {
    AuthorizationService::authorize_view_history(actor)?;
    let reference = parse_reference(booking_reference)?;
    require_visit(persistence, &reference)?;

    let events = persistence
        .get_audit_events_for_booking(reference.value())
        .map_err(translate_persistence_error)?;
    Ok(VisitHistoryResponse {
        reference: reference.to_string(),
        events: events.iter().map(VisitHistoryEntry::from).collect(),
    })
}

/// Lists the sessions of a prison with their current occupancy.
///
/// When a prisoner is given, sessions they are not eligible for are left
/// out. Without dates the prison's public booking window is used.
///
/// # Errors
///
/// Returns an error if the prison does not exist or the date range is
/// invalid.
pub fn get_visit_sessions(
    persistence: &mut Persistence,
    services: &Services,
    now: OffsetDateTime,
    request: &VisitSessionsRequest,
    actor: &AuthenticatedActor,
) -> Result<Vec<VisitSessionResponse>, ApiError> {
    AuthorizationService::authorize_read(actor)?;
    let now = services.local_now(now)?;

    let prison_code = validate_prison_code(&request.prison_code).map_err(translate_domain_error)?;
    let prison = require_prison(persistence, &prison_code)?;
    let window = BookingWindow::for_prison(&prison, now.date()).map_err(translate_domain_error)?;
    let from = match &request.from_date {
        Some(date) => parse_date("from_date", date)?,
        None => window.earliest,
    };
    let to = match &request.to_date {
        Some(date) => parse_date("to_date", date)?,
        None => window.latest,
    };

    let prisoner = match &request.prisoner_id {
        Some(prisoner_id) => services.prisoners.profile(prisoner_id.trim())?,
        None => None,
    };
    let templates = persistence
        .list_session_templates(&prison.code)
        .map_err(translate_persistence_error)?;
    let sessions = generate_visit_sessions(&prison, &templates, prisoner.as_ref(), from, to)
        .map_err(translate_domain_error)?;

    let cutoff = BookingContext::new(now, services.settings.policy)
        .expiry_cutoff()
        .map_err(translate_domain_error)?;
    let mut responses = Vec::with_capacity(sessions.len());
    for session in sessions {
        let occupancy = persistence
            .get_slot_occupancy(&session.session_template_reference, session.date, cutoff, &[])
            .map_err(translate_persistence_error)?;
        responses.push(VisitSessionResponse {
            session_date: format_date(session.date),
            start_time: format_time(session.start_time),
            end_time: format_time(session.end_time),
            open_taken: occupancy.taken(VisitRestriction::Open),
            closed_taken: occupancy.taken(VisitRestriction::Closed),
            session_template_reference: session.session_template_reference,
            prison_code: session.prison_code,
            visit_room: session.visit_room,
            visit_type: session.visit_type,
            open_capacity: session.open_capacity,
            closed_capacity: session.closed_capacity,
        });
    }
    Ok(responses)
}

/// Reports the open and closed capacity of one session.
///
/// # Errors
///
/// Returns an error if the template does not exist or does not run on the
/// requested date.
pub fn get_session_capacity(
    persistence: &mut Persistence,
    services: &Services,
    now: OffsetDateTime,
    request: &SessionCapacityRequest,
    actor: &AuthenticatedActor,
) -> Result<SessionCapacityResponse, ApiError> {
    AuthorizationService::authorize_read(actor)?;
    let now = services.local_now(now)?;

    let date = parse_date("session_date", &request.session_date)?;
    let template = require_template(persistence, &request.session_template_reference)?;
    if !template.occurs_on(date) {
        return Err(ApiError::DomainRuleViolation {
            rule: String::from("session_available"),
            message: format!(
                "Session template '{}' does not run on {date}",
                template.reference
            ),
        });
    }

    let cutoff = BookingContext::new(now, services.settings.policy)
        .expiry_cutoff()
        .map_err(translate_domain_error)?;
    let occupancy = persistence
        .get_slot_occupancy(&template.reference, date, cutoff, &[])
        .map_err(translate_persistence_error)?;

    Ok(SessionCapacityResponse {
        session_date: format_date(date),
        allow_over_booking: template.allow_over_booking,
        open: evaluate_capacity(&template, VisitRestriction::Open, &occupancy).into(),
        closed: evaluate_capacity(&template, VisitRestriction::Closed, &occupancy).into(),
        session_template_reference: template.reference,
    })
}

/// Deletes unbooked applications that have expired.
///
/// Expired applications already stop counting towards capacity; the sweep
/// only removes the rows. Nothing is audited.
///
/// # Errors
///
/// Returns an error if the actor is not System or Admin, or the database
/// operation fails.
pub fn expire_stale_applications(
    persistence: &mut Persistence,
    services: &Services,
    now: OffsetDateTime,
    actor: &AuthenticatedActor,
) -> Result<ExpireApplicationsResponse, ApiError> {
    AuthorizationService::authorize_expire_applications(actor)?;
    let now = services.local_now(now)?;

    let cutoff = BookingContext::new(now, services.settings.policy)
        .expiry_cutoff()
        .map_err(translate_domain_error)?;
    let deleted = persistence
        .delete_expired_applications(cutoff)
        .map_err(translate_persistence_error)?;
    if deleted > 0 {
        info!(deleted, cutoff = %format_timestamp(cutoff), "Removed expired applications");
    }

    Ok(ExpireApplicationsResponse {
        cutoff: format_timestamp(cutoff),
        deleted,
    })
}
