// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::command::{Command, SlotRequest};
use crate::error::CoreError;
use crate::state::{BookingContext, State, TransitionResult};
use time::Duration;
use visit_scheduler_audit::{Action, Actor, AuditEvent, Cause, EventAuditType};
use visit_scheduler_domain::{
    Application, ApplicationMethod, BookingWindow, DomainError, LegacyData, LegacyVisit,
    MatchCriteria, OutcomeStatus, Prison, Reference, SessionSlot, SessionTemplate, UserType,
    Visit, VisitContact, VisitNote, VisitNoteType, VisitRestriction, VisitStatus,
    VisitSubStatus, detect_conflicts, ensure_capacity, ensure_no_conflicts,
    select_session_template, validate_prisoner_id, validate_visit_contact, validate_visitors,
};

/// Contact name used when a legacy record has none.
pub const UNKNOWN_CONTACT_NAME: &str = "UNKNOWN";

/// What a command handler produces before the audit event is assembled.
struct Outcome {
    new_state: State,
    action: Action,
    application_method: ApplicationMethod,
}

/// Applies a command to the current state, producing a new state and audit event.
///
/// `apply` is pure: it never reads the clock or storage. Everything it needs
/// arrives through `context` and `state`.
///
/// # Arguments
///
/// * `context` - Current time, policy, and the reference data the command needs
/// * `state` - The application and/or visit named by the command
/// * `command` - The command to apply
/// * `actor` - The actor performing this action
/// * `cause` - The cause or reason for this action
///
/// # Errors
///
/// Returns an error if the command violates a booking rule.
pub fn apply(
    context: &BookingContext,
    state: &State,
    command: Command,
    actor: Actor,
    cause: Cause,
) -> Result<TransitionResult, CoreError> {
    let outcome = match command {
        Command::ReserveSlot {
            application_reference,
            prisoner_id,
            request,
        } => reserve_slot(context, &actor, application_reference, &prisoner_id, request)?,
        Command::ChangeApplicationSlot {
            application_reference,
            request,
        } => change_application_slot(context, state, &actor, &application_reference, request)?,
        Command::ChangeBookedVisit {
            application_reference,
            booking_reference,
            request,
        } => change_booked_visit(
            context,
            state,
            &actor,
            application_reference,
            &booking_reference,
            request,
        )?,
        Command::BookVisit {
            application_reference,
            visit_reference,
            is_request_booking,
            application_method,
        } => book_visit(
            context,
            state,
            &application_reference,
            visit_reference,
            is_request_booking,
            application_method,
        )?,
        Command::CancelVisit {
            booking_reference,
            outcome_status,
            text,
            application_method,
        } => {
            let visit = require_booked_visit(state, &booking_reference)?;
            ensure_within_cancel_limit(context, visit)?;
            cancel(
                context,
                state,
                visit,
                VisitSubStatus::Cancelled,
                outcome_status,
                text,
                EventAuditType::CancelledVisit,
                application_method,
            )?
        }
        Command::ApproveVisitRequest { booking_reference } => {
            approve_visit_request(context, state, &booking_reference)?
        }
        Command::RejectVisitRequest { booking_reference } => {
            let visit = require_requested_visit(state, &booking_reference)?;
            cancel(
                context,
                state,
                visit,
                VisitSubStatus::Rejected,
                OutcomeStatus::RequestRejected,
                None,
                EventAuditType::RequestedVisitRejected,
                ApplicationMethod::NotApplicable,
            )?
        }
        Command::WithdrawVisitRequest { booking_reference } => {
            let visit = require_requested_visit(state, &booking_reference)?;
            cancel(
                context,
                state,
                visit,
                VisitSubStatus::Withdrawn,
                OutcomeStatus::RequestWithdrawn,
                None,
                EventAuditType::RequestedVisitWithdrawn,
                ApplicationMethod::NotApplicable,
            )?
        }
        Command::MigrateVisit {
            visit_reference,
            legacy,
        } => migrate_visit(context, visit_reference, legacy)?,
        Command::MigrateCancellation {
            booking_reference,
            outcome_status,
            text,
        } => {
            let visit = require_booked_visit(state, &booking_reference)?;
            cancel(
                context,
                state,
                visit,
                VisitSubStatus::Cancelled,
                outcome_status,
                text,
                EventAuditType::CancelledVisit,
                ApplicationMethod::NotApplicable,
            )?
        }
    };

    let audit_event = AuditEvent::new(
        actor,
        cause,
        outcome.action,
        outcome.application_method,
        outcome.new_state.to_scope(),
        state.to_snapshot(),
        outcome.new_state.to_snapshot(),
    );

    Ok(TransitionResult {
        new_state: outcome.new_state,
        audit_event,
    })
}

/// How a slot request should be checked.
struct SlotCheck<'a> {
    prisoner_id: &'a str,
    user_type: UserType,
    require_capacity: bool,
    exclude: Vec<&'a str>,
}

/// Validates a requested slot and returns its template and dated slot.
fn check_slot<'c>(
    context: &'c BookingContext,
    request: &SlotRequest,
    check: &SlotCheck<'_>,
) -> Result<(&'c Prison, &'c SessionTemplate, SessionSlot), DomainError> {
    let prison = context.require_prison()?;
    if !prison.active {
        return Err(DomainError::PrisonInactive(prison.code.clone()));
    }

    let template = context.require_template(&request.session_template_reference)?;
    if template.prison_code != prison.code {
        return Err(DomainError::PrisonMismatch {
            expected: prison.code.clone(),
            actual: template.prison_code.clone(),
        });
    }

    let date = request.session_date;
    let slot = template.slot_on(date);
    if !template.occurs_on(date) || prison.is_excluded(date) || slot.start() <= context.now {
        return Err(DomainError::SessionNotAvailable {
            template_reference: template.reference.clone(),
            date,
        });
    }

    let today = context.now.date();
    let window = if check.user_type.is_staff() {
        BookingWindow::for_staff(prison, today)?
    } else {
        BookingWindow::for_prison(prison, today)?
    };
    window.ensure_contains(date)?;

    if context
        .prisoner
        .as_ref()
        .is_some_and(|prisoner| !template.eligibility(prisoner).eligible)
    {
        return Err(DomainError::PrisonerNotEligible {
            prisoner_id: check.prisoner_id.to_string(),
            template_reference: template.reference.clone(),
        });
    }

    validate_visitors(prison, &request.visitors)?;
    if let Some(contact) = &request.visit_contact {
        validate_visit_contact(contact)?;
    }

    if check.require_capacity {
        ensure_capacity(template, date, request.restriction, &context.occupancy)?;
    }

    let conflicts = detect_conflicts(
        &prison.code,
        &slot,
        &context.prisoner_bookings,
        &context.non_association_bookings,
        &check.exclude,
    );
    ensure_no_conflicts(
        check.prisoner_id,
        &slot,
        &conflicts,
        check.user_type == UserType::Public,
    )?;

    Ok((prison, template, slot))
}

fn same_slot(
    slot: &SessionSlot,
    restriction: VisitRestriction,
    other: &SessionSlot,
    other_restriction: VisitRestriction,
) -> bool {
    slot == other && restriction == other_restriction
}

fn reserve_slot(
    context: &BookingContext,
    actor: &Actor,
    application_reference: Reference,
    prisoner_id: &str,
    request: SlotRequest,
) -> Result<Outcome, DomainError> {
    let prisoner_id = validate_prisoner_id(prisoner_id)?;
    let (prison, template, slot) = check_slot(
        context,
        &request,
        &SlotCheck {
            prisoner_id: &prisoner_id,
            user_type: actor.user_type,
            require_capacity: true,
            exclude: Vec::new(),
        },
    )?;

    let application = Application {
        reference: application_reference,
        prison_code: prison.code.clone(),
        prisoner_id,
        slot,
        visit_type: template.visit_type,
        restriction: request.restriction,
        status: VisitStatus::Reserved,
        reserved_slot: true,
        visit_reference: None,
        visitors: request.visitors,
        visitor_support: request.visitor_support,
        visit_contact: request.visit_contact,
        user_type: actor.user_type,
        created_by: actor.id.clone(),
        created_at: context.now,
        modified_at: context.now,
    };

    Ok(Outcome {
        new_state: State::new(Some(application), None),
        action: Action::new(EventAuditType::ReservedVisit, None),
        application_method: ApplicationMethod::NotKnown,
    })
}

fn require_application<'s>(
    state: &'s State,
    reference: &Reference,
) -> Result<&'s Application, DomainError> {
    state
        .application
        .as_ref()
        .filter(|a| &a.reference == reference)
        .ok_or_else(|| DomainError::ApplicationNotFound(reference.to_string()))
}

fn require_in_progress_application<'s>(
    context: &BookingContext,
    state: &'s State,
    reference: &Reference,
) -> Result<&'s Application, DomainError> {
    let application = require_application(state, reference)?;
    if application.status == VisitStatus::Booked {
        return Err(DomainError::ApplicationAlreadyBooked(reference.to_string()));
    }
    if application.is_expired(context.expiry_cutoff()?) {
        return Err(DomainError::ApplicationExpired(reference.to_string()));
    }
    Ok(application)
}

fn require_visit<'s>(state: &'s State, reference: &Reference) -> Result<&'s Visit, DomainError> {
    state
        .visit
        .as_ref()
        .filter(|v| &v.reference == reference)
        .ok_or_else(|| DomainError::VisitNotFound(reference.to_string()))
}

fn require_booked_visit<'s>(
    state: &'s State,
    reference: &Reference,
) -> Result<&'s Visit, DomainError> {
    let visit = require_visit(state, reference)?;
    if visit.status == VisitStatus::Cancelled {
        return Err(DomainError::VisitAlreadyCancelled(reference.to_string()));
    }
    Ok(visit)
}

fn require_requested_visit<'s>(
    state: &'s State,
    reference: &Reference,
) -> Result<&'s Visit, DomainError> {
    let visit = require_booked_visit(state, reference)?;
    if visit.sub_status != VisitSubStatus::Requested {
        return Err(DomainError::NotARequestedVisit {
            reference: reference.to_string(),
            sub_status: visit.sub_status.as_str().to_string(),
        });
    }
    Ok(visit)
}

fn change_application_slot(
    context: &BookingContext,
    state: &State,
    actor: &Actor,
    application_reference: &Reference,
    request: SlotRequest,
) -> Result<Outcome, DomainError> {
    let application = require_in_progress_application(context, state, application_reference)?;
    application
        .status
        .validate_transition(application.status)?;

    // A change application moved back onto its visit's own slot needs no capacity.
    let template = context.require_template(&request.session_template_reference)?;
    let requested = template.slot_on(request.session_date);
    let original_visit = match application.status {
        VisitStatus::Changing => application
            .visit_reference
            .as_ref()
            .map(|reference| require_visit(state, reference))
            .transpose()?,
        _ => None,
    };
    let reserved_slot = original_visit.is_none_or(|visit| {
        !same_slot(&visit.slot, visit.restriction, &requested, request.restriction)
    });

    let mut exclude = vec![application.reference.value()];
    if let Some(visit_reference) = &application.visit_reference {
        exclude.push(visit_reference.value());
    }

    let (_, _, slot) = check_slot(
        context,
        &request,
        &SlotCheck {
            prisoner_id: &application.prisoner_id,
            user_type: actor.user_type,
            require_capacity: reserved_slot,
            exclude,
        },
    )?;

    let mut updated = application.clone();
    updated.slot = slot;
    updated.restriction = request.restriction;
    updated.visitors = request.visitors;
    updated.visitor_support = request.visitor_support;
    updated.visit_contact = request.visit_contact;
    updated.reserved_slot = reserved_slot;
    updated.modified_at = context.now;

    let event_type = match updated.status {
        VisitStatus::Changing => EventAuditType::ChangingVisit,
        _ => EventAuditType::ReservedVisit,
    };

    Ok(Outcome {
        new_state: State::new(Some(updated), state.visit.clone()),
        action: Action::new(event_type, None),
        application_method: ApplicationMethod::NotKnown,
    })
}

fn change_booked_visit(
    context: &BookingContext,
    state: &State,
    actor: &Actor,
    application_reference: Reference,
    booking_reference: &Reference,
    request: SlotRequest,
) -> Result<Outcome, DomainError> {
    let visit = require_booked_visit(state, booking_reference)?;
    visit.status.validate_transition(VisitStatus::Changing)?;
    if visit.has_started(context.now) {
        return Err(DomainError::VisitAlreadyStarted(
            booking_reference.to_string(),
        ));
    }

    let template = context.require_template(&request.session_template_reference)?;
    let requested = template.slot_on(request.session_date);
    let reserved_slot = !same_slot(
        &visit.slot,
        visit.restriction,
        &requested,
        request.restriction,
    );

    let (_, template, slot) = check_slot(
        context,
        &request,
        &SlotCheck {
            prisoner_id: &visit.prisoner_id,
            user_type: actor.user_type,
            require_capacity: reserved_slot,
            exclude: vec![visit.reference.value()],
        },
    )?;

    let application = Application {
        reference: application_reference,
        prison_code: visit.prison_code.clone(),
        prisoner_id: visit.prisoner_id.clone(),
        slot,
        visit_type: template.visit_type,
        restriction: request.restriction,
        status: VisitStatus::Changing,
        reserved_slot,
        visit_reference: Some(visit.reference.clone()),
        visitors: request.visitors,
        visitor_support: request.visitor_support,
        visit_contact: request.visit_contact,
        user_type: actor.user_type,
        created_by: actor.id.clone(),
        created_at: context.now,
        modified_at: context.now,
    };

    Ok(Outcome {
        new_state: State::new(Some(application), Some(visit.clone())),
        action: Action::new(EventAuditType::ChangingVisit, None),
        application_method: ApplicationMethod::NotKnown,
    })
}

fn book_visit(
    context: &BookingContext,
    state: &State,
    application_reference: &Reference,
    visit_reference: Reference,
    is_request_booking: bool,
    application_method: ApplicationMethod,
) -> Result<Outcome, DomainError> {
    let application = require_in_progress_application(context, state, application_reference)?;
    application
        .status
        .validate_transition(VisitStatus::Booked)?;

    let prison = context.require_prison()?;
    let template_reference = application
        .slot
        .session_template_reference
        .as_deref()
        .unwrap_or_default();
    let template = context.require_template(template_reference)?;

    let existing = match &application.visit_reference {
        Some(reference) => Some(require_booked_visit(state, reference)?),
        None => None,
    };
    let is_public = application.user_type == UserType::Public;
    let is_new_public_booking = is_public && existing.is_none();

    // An unknown balance counts as none left.
    if is_new_public_booking
        && !context
            .visit_balance
            .is_some_and(|balance| balance.has_available())
    {
        return Err(DomainError::InsufficientVisitBalance {
            prisoner_id: application.prisoner_id.clone(),
        });
    }

    let mut exclude = vec![application.reference.value()];
    if let Some(visit) = existing {
        exclude.push(visit.reference.value());
    }
    let conflicts = detect_conflicts(
        &prison.code,
        &application.slot,
        &context.prisoner_bookings,
        &context.non_association_bookings,
        &exclude,
    );
    ensure_no_conflicts(
        &application.prisoner_id,
        &application.slot,
        &conflicts,
        is_new_public_booking,
    )?;

    let (visit, event_type) = match existing {
        Some(visit) => {
            let mut updated = visit.clone();
            updated.slot = application.slot.clone();
            updated.visit_room = template.visit_room.clone();
            updated.visit_type = application.visit_type;
            updated.restriction = application.restriction;
            updated.visitors = application.visitors.clone();
            updated.visitor_support = application.visitor_support.clone();
            updated.visit_contact = application.visit_contact.clone();
            updated.modified_at = context.now;
            (updated, EventAuditType::UpdatedVisit)
        }
        None => {
            let (sub_status, event_type) = if is_public && is_request_booking {
                (VisitSubStatus::Requested, EventAuditType::RequestedVisit)
            } else {
                (VisitSubStatus::AutoApproved, EventAuditType::BookedVisit)
            };
            let visit = Visit {
                reference: visit_reference,
                prison_code: application.prison_code.clone(),
                prisoner_id: application.prisoner_id.clone(),
                slot: application.slot.clone(),
                visit_room: template.visit_room.clone(),
                visit_type: application.visit_type,
                restriction: application.restriction,
                status: VisitStatus::Booked,
                sub_status,
                outcome_status: None,
                visitors: application.visitors.clone(),
                visit_contact: application.visit_contact.clone(),
                visitor_support: application.visitor_support.clone(),
                visit_notes: Vec::new(),
                user_type: application.user_type,
                created_at: context.now,
                modified_at: context.now,
                legacy: None,
            };
            (visit, event_type)
        }
    };

    let mut booked = application.clone();
    booked.status = VisitStatus::Booked;
    booked.visit_reference = Some(visit.reference.clone());
    booked.modified_at = context.now;

    Ok(Outcome {
        new_state: State::new(Some(booked), Some(visit)),
        action: Action::new(event_type, None),
        application_method,
    })
}

fn ensure_within_cancel_limit(context: &BookingContext, visit: &Visit) -> Result<(), DomainError> {
    let limit_days = context.policy.cancel_day_limit;
    if limit_days == 0 {
        return Ok(());
    }

    let earliest = context
        .now
        .checked_sub(Duration::days(i64::from(limit_days)))
        .ok_or_else(|| DomainError::DateArithmeticOverflow {
            operation: format!("{} - {limit_days} days", context.now),
        })?;
    if visit.slot.start() < earliest {
        return Err(DomainError::CancellationWindowPassed {
            reference: visit.reference.to_string(),
            limit_days,
        });
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn cancel(
    context: &BookingContext,
    state: &State,
    visit: &Visit,
    sub_status: VisitSubStatus,
    outcome_status: OutcomeStatus,
    text: Option<String>,
    event_type: EventAuditType,
    application_method: ApplicationMethod,
) -> Result<Outcome, DomainError> {
    visit.status.validate_transition(VisitStatus::Cancelled)?;
    visit.sub_status.validate_transition(sub_status)?;

    let mut cancelled = visit.clone();
    cancelled.status = VisitStatus::Cancelled;
    cancelled.sub_status = sub_status;
    cancelled.outcome_status = Some(outcome_status);
    cancelled.modified_at = context.now;
    if let Some(text) = text.as_ref().filter(|t| !t.trim().is_empty()) {
        cancelled
            .visit_notes
            .push(VisitNote::new(VisitNoteType::VisitOutcomes, text.clone()));
    }

    Ok(Outcome {
        new_state: State::new(state.application.clone(), Some(cancelled)),
        action: Action::new(event_type, text),
        application_method,
    })
}

fn approve_visit_request(
    context: &BookingContext,
    state: &State,
    booking_reference: &Reference,
) -> Result<Outcome, DomainError> {
    let visit = require_requested_visit(state, booking_reference)?;
    visit
        .sub_status
        .validate_transition(VisitSubStatus::Approved)?;

    let mut approved = visit.clone();
    approved.sub_status = VisitSubStatus::Approved;
    approved.modified_at = context.now;

    Ok(Outcome {
        new_state: State::new(state.application.clone(), Some(approved)),
        action: Action::new(EventAuditType::RequestedVisitApproved, None),
        application_method: ApplicationMethod::NotApplicable,
    })
}

/// Migrated visits are always recorded as system bookings, whoever runs
/// the import.
fn migrate_visit(
    context: &BookingContext,
    visit_reference: Reference,
    legacy: LegacyVisit,
) -> Result<Outcome, DomainError> {
    let prison = context.require_prison()?;
    if !legacy.prison_code.eq_ignore_ascii_case(&prison.code) {
        return Err(DomainError::PrisonMismatch {
            expected: prison.code.clone(),
            actual: legacy.prison_code,
        });
    }
    let prisoner_id = validate_prisoner_id(&legacy.prisoner_id)?;

    if legacy.end <= legacy.start || legacy.end.date() != legacy.start.date() {
        return Err(DomainError::InvalidDateRange {
            from: legacy.start.date(),
            to: legacy.end.date(),
        });
    }

    let sub_status = match legacy.status {
        VisitStatus::Booked => VisitSubStatus::AutoApproved,
        VisitStatus::Cancelled => VisitSubStatus::Cancelled,
        other => {
            return Err(DomainError::InvalidVisitStatus {
                status: other.as_str().to_string(),
            });
        }
    };
    let outcome_status = match legacy.status {
        VisitStatus::Cancelled => Some(legacy.outcome_status.unwrap_or(OutcomeStatus::NotRecorded)),
        _ => legacy.outcome_status,
    };

    let criteria = MatchCriteria {
        prison_code: prison.code.clone(),
        date: legacy.start.date(),
        start_time: legacy.start.time(),
        end_time: legacy.end.time(),
        visit_room: Some(legacy.visit_room.clone()),
        prisoner: context.prisoner.clone(),
    };
    let template = select_session_template(&context.migration_candidates, &criteria);
    if template.is_none() && legacy.start >= context.now {
        return Err(DomainError::NoMatchingSessionTemplate {
            prison_code: prison.code.clone(),
            date: legacy.start.date(),
        });
    }

    let contact = legacy.visit_contact.as_ref();
    let visit_contact = VisitContact {
        name: contact
            .and_then(|c| c.name.as_deref())
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(UNKNOWN_CONTACT_NAME)
            .to_string(),
        telephone: contact.and_then(|c| c.telephone.clone()),
        email: None,
    };

    let created_at = legacy.created_at.unwrap_or(context.now);
    let visit = Visit {
        reference: visit_reference,
        prison_code: prison.code.clone(),
        prisoner_id,
        slot: SessionSlot {
            session_template_reference: template.map(|t| t.reference.clone()),
            date: legacy.start.date(),
            start_time: legacy.start.time(),
            end_time: legacy.end.time(),
        },
        visit_room: template.map_or(legacy.visit_room, |t| t.visit_room.clone()),
        visit_type: legacy.visit_type,
        restriction: legacy.restriction,
        status: legacy.status,
        sub_status,
        outcome_status,
        visitors: legacy.visitors,
        visit_contact: Some(visit_contact),
        visitor_support: None,
        visit_notes: legacy.visit_notes,
        user_type: UserType::System,
        created_at,
        modified_at: legacy.modified_at.unwrap_or(created_at),
        legacy: Some(LegacyData {
            lead_visitor_id: legacy.lead_visitor_id,
            migrated_at: context.now,
        }),
    };

    Ok(Outcome {
        new_state: State::new(None, Some(visit)),
        action: Action::new(EventAuditType::MigratedVisit, None),
        application_method: ApplicationMethod::NotApplicable,
    })
}
