// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API request and response data transfer objects.
//!
//! Dates travel as `YYYY-MM-DD`, times as `HH:MM` (seconds optional on
//! input) and timestamps as `YYYY-MM-DDTHH:MM:SS`, all in prison local
//! time. Coded values use their upper-case tokens.

use serde::{Deserialize, Serialize};
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, PrimitiveDateTime, Time};
use visit_scheduler_audit::AuditEvent;
use visit_scheduler_domain::{
    Application, ApplicationMethod, EligibilityGroups, OutcomeStatus, SlotCapacity, UserType,
    VisitContact, VisitNote, VisitRestriction, VisitStatus, VisitSubStatus, VisitType, Visitor,
    VisitorSupport, Visit,
};

use crate::error::ApiError;

const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");
const TIME_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[hour]:[minute]");
const TIME_WITH_SECONDS_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[hour]:[minute]:[second]");
const TIMESTAMP_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");

/// Parses a `YYYY-MM-DD` request field.
///
/// # Errors
///
/// Returns `ApiError::InvalidInput` naming `field` if the value is malformed.
pub fn parse_date(field: &str, value: &str) -> Result<Date, ApiError> {
    Date::parse(value.trim(), DATE_FORMAT).map_err(|e| ApiError::InvalidInput {
        field: field.to_string(),
        message: format!("'{value}' is not a date (YYYY-MM-DD): {e}"),
    })
}

/// Parses an `HH:MM` or `HH:MM:SS` request field.
///
/// # Errors
///
/// Returns `ApiError::InvalidInput` naming `field` if the value is malformed.
pub fn parse_time(field: &str, value: &str) -> Result<Time, ApiError> {
    let value = value.trim();
    Time::parse(value, TIME_WITH_SECONDS_FORMAT)
        .or_else(|_| Time::parse(value, TIME_FORMAT))
        .map_err(|e| ApiError::InvalidInput {
            field: field.to_string(),
            message: format!("'{value}' is not a time (HH:MM): {e}"),
        })
}

/// Parses a `YYYY-MM-DDTHH:MM:SS` request field.
///
/// # Errors
///
/// Returns `ApiError::InvalidInput` naming `field` if the value is malformed.
pub fn parse_timestamp(field: &str, value: &str) -> Result<PrimitiveDateTime, ApiError> {
    PrimitiveDateTime::parse(value.trim(), TIMESTAMP_FORMAT).map_err(|e| ApiError::InvalidInput {
        field: field.to_string(),
        message: format!("'{value}' is not a timestamp (YYYY-MM-DDTHH:MM:SS): {e}"),
    })
}

/// Formats a date for a response.
#[must_use]
pub fn format_date(date: Date) -> String {
    date.format(DATE_FORMAT)
        .unwrap_or_else(|_| date.to_string())
}

/// Formats a time for a response.
#[must_use]
pub fn format_time(time: Time) -> String {
    time.format(TIME_FORMAT)
        .unwrap_or_else(|_| time.to_string())
}

/// Formats a timestamp for a response.
#[must_use]
pub fn format_timestamp(timestamp: PrimitiveDateTime) -> String {
    timestamp
        .format(TIMESTAMP_FORMAT)
        .unwrap_or_else(|_| timestamp.to_string())
}

const fn default_true() -> bool {
    true
}

const fn default_weekly_frequency() -> u32 {
    1
}

/// API request to create or update a prison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatePrisonRequest {
    pub code: String,
    #[serde(default = "default_true")]
    pub active: bool,
    /// Earliest bookable day, counted from today.
    pub policy_notice_days_min: u32,
    /// Latest bookable day, counted from today.
    pub policy_notice_days_max: u32,
    pub max_total_visitors: u32,
    /// Dates on which no sessions run.
    #[serde(default)]
    pub exclude_dates: Vec<String>,
}

/// API response for a prison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrisonResponse {
    pub code: String,
    pub active: bool,
    pub policy_notice_days_min: u32,
    pub policy_notice_days_max: u32,
    pub max_total_visitors: u32,
    pub exclude_dates: Vec<String>,
    /// Whether an existing prison was replaced.
    pub updated: bool,
}

/// API request to create or update a session template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateSessionTemplateRequest {
    pub reference: String,
    pub name: String,
    pub prison_code: String,
    pub visit_room: String,
    pub visit_type: VisitType,
    pub open_capacity: u32,
    pub closed_capacity: u32,
    pub start_time: String,
    pub end_time: String,
    pub valid_from_date: String,
    #[serde(default)]
    pub valid_to_date: Option<String>,
    /// Upper-case weekday name, e.g. `MONDAY`.
    pub day_of_week: String,
    #[serde(default = "default_weekly_frequency")]
    pub weekly_frequency: u32,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub allow_over_booking: bool,
    #[serde(default)]
    pub eligibility: EligibilityGroups,
}

/// API response for a session template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionTemplateResponse {
    pub reference: String,
    pub prison_code: String,
    pub name: String,
    pub day_of_week: String,
    pub start_time: String,
    pub end_time: String,
    pub open_capacity: u32,
    pub closed_capacity: u32,
    /// Whether an existing template was replaced.
    pub updated: bool,
}

/// The slot and party of a reservation or change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotRequestBody {
    pub session_template_reference: String,
    pub session_date: String,
    pub visit_restriction: VisitRestriction,
    pub visitors: Vec<Visitor>,
    #[serde(default)]
    pub visitor_support: Option<VisitorSupport>,
    #[serde(default)]
    pub visit_contact: Option<VisitContact>,
}

/// API request to reserve a slot for a new visit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReserveSlotRequest {
    pub prisoner_id: String,
    #[serde(flatten)]
    pub slot: SlotRequestBody,
}

/// API request to book an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookVisitRequest {
    pub application_method: ApplicationMethod,
    /// Public bookings that need staff approval.
    #[serde(default)]
    pub is_request_booking: bool,
}

/// API request to cancel a visit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelVisitRequest {
    pub outcome_status: OutcomeStatus,
    #[serde(default)]
    pub text: Option<String>,
    pub application_method: ApplicationMethod,
}

/// Contact details as recorded by the legacy system.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LegacyContactBody {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub telephone: Option<String>,
}

/// API request to import a legacy visit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrateVisitRequest {
    pub prison_code: String,
    pub prisoner_id: String,
    pub visit_room: String,
    pub visit_type: VisitType,
    pub visit_restriction: VisitRestriction,
    pub start_timestamp: String,
    pub end_timestamp: String,
    pub visit_status: VisitStatus,
    #[serde(default)]
    pub outcome_status: Option<OutcomeStatus>,
    #[serde(default)]
    pub visitors: Vec<Visitor>,
    #[serde(default)]
    pub visit_contact: Option<LegacyContactBody>,
    #[serde(default)]
    pub visit_notes: Vec<VisitNote>,
    #[serde(default)]
    pub lead_visitor_id: Option<i64>,
    #[serde(default)]
    pub create_timestamp: Option<String>,
    #[serde(default)]
    pub modify_timestamp: Option<String>,
}

/// API request to cancel a migrated visit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrateCancellationRequest {
    pub outcome_status: OutcomeStatus,
    #[serde(default)]
    pub text: Option<String>,
}

/// API request listing bookable sessions.
///
/// Without dates the prison's public booking window is used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitSessionsRequest {
    pub prison_code: String,
    #[serde(default)]
    pub prisoner_id: Option<String>,
    #[serde(default)]
    pub from_date: Option<String>,
    #[serde(default)]
    pub to_date: Option<String>,
}

/// API request for the capacity of one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCapacityRequest {
    pub session_template_reference: String,
    pub session_date: String,
}

/// API response for an application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationResponse {
    pub reference: String,
    pub prison_code: String,
    pub prisoner_id: String,
    pub session_template_reference: Option<String>,
    pub session_date: String,
    pub start_time: String,
    pub end_time: String,
    pub visit_restriction: VisitRestriction,
    pub application_status: VisitStatus,
    pub reserved_slot: bool,
    pub visit_reference: Option<String>,
    pub visitors: Vec<Visitor>,
    pub user_type: UserType,
    pub created_by: String,
    pub created_at: String,
    pub modified_at: String,
}

impl From<&Application> for ApplicationResponse {
    fn from(application: &Application) -> Self {
        Self {
            reference: application.reference.to_string(),
            prison_code: application.prison_code.clone(),
            prisoner_id: application.prisoner_id.clone(),
            session_template_reference: application.slot.session_template_reference.clone(),
            session_date: format_date(application.slot.date),
            start_time: format_time(application.slot.start_time),
            end_time: format_time(application.slot.end_time),
            visit_restriction: application.restriction,
            application_status: application.status,
            reserved_slot: application.reserved_slot,
            visit_reference: application.visit_reference.as_ref().map(ToString::to_string),
            visitors: application.visitors.clone(),
            user_type: application.user_type,
            created_by: application.created_by.clone(),
            created_at: format_timestamp(application.created_at),
            modified_at: format_timestamp(application.modified_at),
        }
    }
}

/// API response for a visit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitResponse {
    pub reference: String,
    pub prison_code: String,
    pub prisoner_id: String,
    pub session_template_reference: Option<String>,
    pub visit_room: String,
    pub visit_type: VisitType,
    pub visit_restriction: VisitRestriction,
    pub session_date: String,
    pub start_time: String,
    pub end_time: String,
    pub visit_status: VisitStatus,
    pub visit_sub_status: VisitSubStatus,
    pub outcome_status: Option<OutcomeStatus>,
    pub visitors: Vec<Visitor>,
    pub visit_contact: Option<VisitContact>,
    pub visitor_support: Option<VisitorSupport>,
    pub visit_notes: Vec<VisitNote>,
    pub user_type: UserType,
    pub created_at: String,
    pub modified_at: String,
    /// Set for visits imported from the legacy system.
    pub migrated_at: Option<String>,
}

impl From<&Visit> for VisitResponse {
    fn from(visit: &Visit) -> Self {
        Self {
            reference: visit.reference.to_string(),
            prison_code: visit.prison_code.clone(),
            prisoner_id: visit.prisoner_id.clone(),
            session_template_reference: visit.slot.session_template_reference.clone(),
            visit_room: visit.visit_room.clone(),
            visit_type: visit.visit_type,
            visit_restriction: visit.restriction,
            session_date: format_date(visit.slot.date),
            start_time: format_time(visit.slot.start_time),
            end_time: format_time(visit.slot.end_time),
            visit_status: visit.status,
            visit_sub_status: visit.sub_status,
            outcome_status: visit.outcome_status,
            visitors: visit.visitors.clone(),
            visit_contact: visit.visit_contact.clone(),
            visitor_support: visit.visitor_support.clone(),
            visit_notes: visit.visit_notes.clone(),
            user_type: visit.user_type,
            created_at: format_timestamp(visit.created_at),
            modified_at: format_timestamp(visit.modified_at),
            migrated_at: visit
                .legacy
                .as_ref()
                .map(|legacy| format_timestamp(legacy.migrated_at)),
        }
    }
}

/// One entry of a visit's audit history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitHistoryEntry {
    pub event_id: Option<i64>,
    pub event_type: String,
    pub actor_id: String,
    pub user_type: UserType,
    pub application_method: ApplicationMethod,
    pub application_reference: Option<String>,
    pub session_template_reference: Option<String>,
    pub text: Option<String>,
    pub cause: String,
}

impl From<&AuditEvent> for VisitHistoryEntry {
    fn from(event: &AuditEvent) -> Self {
        Self {
            event_id: event.event_id,
            event_type: event.action.event_type.as_str().to_string(),
            actor_id: event.actor.id.clone(),
            user_type: event.actor.user_type,
            application_method: event.application_method,
            application_reference: event.scope.application_reference.clone(),
            session_template_reference: event.scope.session_template_reference.clone(),
            text: event.action.details.clone(),
            cause: event.cause.description.clone(),
        }
    }
}

/// API response for the audit history of a visit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitHistoryResponse {
    pub reference: String,
    pub events: Vec<VisitHistoryEntry>,
}

/// A bookable session with its current occupancy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitSessionResponse {
    pub session_template_reference: String,
    pub prison_code: String,
    pub visit_room: String,
    pub visit_type: VisitType,
    pub session_date: String,
    pub start_time: String,
    pub end_time: String,
    pub open_capacity: u32,
    pub closed_capacity: u32,
    pub open_taken: u32,
    pub closed_taken: u32,
}

/// Capacity of one restriction of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacityResponse {
    pub capacity: u32,
    pub taken: u32,
    pub remaining: u32,
    pub full: bool,
}

impl From<SlotCapacity> for CapacityResponse {
    fn from(capacity: SlotCapacity) -> Self {
        Self {
            capacity: capacity.capacity,
            taken: capacity.taken,
            remaining: capacity.remaining(),
            full: capacity.is_full(),
        }
    }
}

/// API response for the capacity of one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCapacityResponse {
    pub session_template_reference: String,
    pub session_date: String,
    pub allow_over_booking: bool,
    pub open: CapacityResponse,
    pub closed: CapacityResponse,
}

/// API response for an expiry sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpireApplicationsResponse {
    /// Applications last modified before this time were removed.
    pub cutoff: String,
    pub deleted: usize,
}
