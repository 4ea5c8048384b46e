// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Row types and their conversions to and from domain values.
//!
//! Dates, times and timestamps are stored as zero-padded text so that
//! string comparison orders them chronologically. Nested values
//! (visitors, contacts, notes, eligibility groups) are stored as JSON.

use diesel::prelude::*;
use num_traits::ToPrimitive;
use serde::{Deserialize, Serialize};
use time::macros::format_description;
use time::{Date, PrimitiveDateTime, Time};
use visit_scheduler_domain::{
    Application, EligibilityGroups, LegacyData, Prison, Reference, SessionSlot, SessionTemplate,
    Visit, day_of_week_str, parse_day_of_week,
};

use crate::diesel_schema::{applications, event_audit, prisons, session_templates, visits};
use crate::error::PersistenceError;

/// Serializable representation of an Actor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorData {
    pub id: String,
    pub user_type: String,
}

/// Serializable representation of a Cause.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CauseData {
    pub id: String,
    pub description: String,
}

/// Serializable representation of an Action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionData {
    pub event_type: String,
    pub details: Option<String>,
}

/// Serializable representation of a `StateSnapshot`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateSnapshotData {
    pub data: String,
}

pub fn format_date(date: Date) -> Result<String, PersistenceError> {
    date.format(format_description!("[year]-[month]-[day]"))
        .map_err(|e| PersistenceError::SerializationError(e.to_string()))
}

pub fn parse_date(value: &str) -> Result<Date, PersistenceError> {
    Date::parse(value, format_description!("[year]-[month]-[day]"))
        .map_err(|e| PersistenceError::ReconstructionError(format!("date '{value}': {e}")))
}

pub fn format_time(time: Time) -> Result<String, PersistenceError> {
    time.format(format_description!("[hour]:[minute]:[second]"))
        .map_err(|e| PersistenceError::SerializationError(e.to_string()))
}

pub fn parse_time(value: &str) -> Result<Time, PersistenceError> {
    Time::parse(value, format_description!("[hour]:[minute]:[second]"))
        .map_err(|e| PersistenceError::ReconstructionError(format!("time '{value}': {e}")))
}

pub fn format_datetime(datetime: PrimitiveDateTime) -> Result<String, PersistenceError> {
    datetime
        .format(format_description!(
            "[year]-[month]-[day] [hour]:[minute]:[second]"
        ))
        .map_err(|e| PersistenceError::SerializationError(e.to_string()))
}

pub fn parse_datetime(value: &str) -> Result<PrimitiveDateTime, PersistenceError> {
    PrimitiveDateTime::parse(
        value,
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
    )
    .map_err(|e| PersistenceError::ReconstructionError(format!("timestamp '{value}': {e}")))
}

fn to_i32(value: u32, field: &str) -> Result<i32, PersistenceError> {
    value
        .to_i32()
        .ok_or_else(|| PersistenceError::Other(format!("{field} out of range: {value}")))
}

fn to_u32(value: i32, field: &str) -> Result<u32, PersistenceError> {
    value
        .to_u32()
        .ok_or_else(|| {
            PersistenceError::ReconstructionError(format!("{field} out of range: {value}"))
        })
}

fn optional_json<T: Serialize>(value: Option<&T>) -> Result<Option<String>, PersistenceError> {
    value
        .map(serde_json::to_string)
        .transpose()
        .map_err(Into::into)
}

fn parse_optional_json<T: for<'de> Deserialize<'de>>(
    value: Option<&str>,
) -> Result<Option<T>, PersistenceError> {
    value
        .map(serde_json::from_str)
        .transpose()
        .map_err(Into::into)
}

/// A stored prison.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = prisons)]
pub struct PrisonRecord {
    pub code: String,
    pub active: i32,
    pub policy_notice_days_min: i32,
    pub policy_notice_days_max: i32,
    pub max_total_visitors: i32,
    pub exclude_dates_json: String,
}

impl PrisonRecord {
    pub fn from_prison(prison: &Prison) -> Result<Self, PersistenceError> {
        let exclude_dates: Vec<String> = prison
            .exclude_dates
            .iter()
            .map(|date| format_date(*date))
            .collect::<Result<_, _>>()?;

        Ok(Self {
            code: prison.code.clone(),
            active: i32::from(prison.active),
            policy_notice_days_min: to_i32(
                prison.policy_notice_days_min,
                "policy_notice_days_min",
            )?,
            policy_notice_days_max: to_i32(
                prison.policy_notice_days_max,
                "policy_notice_days_max",
            )?,
            max_total_visitors: to_i32(prison.max_total_visitors, "max_total_visitors")?,
            exclude_dates_json: serde_json::to_string(&exclude_dates)?,
        })
    }

    pub fn into_prison(self) -> Result<Prison, PersistenceError> {
        let exclude_dates: Vec<String> = serde_json::from_str(&self.exclude_dates_json)?;
        let exclude_dates: Vec<Date> = exclude_dates
            .iter()
            .map(String::as_str)
            .map(parse_date)
            .collect::<Result<_, _>>()?;

        Ok(Prison::new(
            &self.code,
            self.active != 0,
            to_u32(self.policy_notice_days_min, "policy_notice_days_min")?,
            to_u32(self.policy_notice_days_max, "policy_notice_days_max")?,
            to_u32(self.max_total_visitors, "max_total_visitors")?,
            exclude_dates,
        )?)
    }
}

/// A stored session template.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = session_templates)]
#[diesel(treat_none_as_null = true)]
pub struct SessionTemplateRecord {
    pub reference: String,
    pub prison_code: String,
    pub name: String,
    pub visit_room: String,
    pub visit_type: String,
    pub open_capacity: i32,
    pub closed_capacity: i32,
    pub start_time: String,
    pub end_time: String,
    pub valid_from_date: String,
    pub valid_to_date: Option<String>,
    pub day_of_week: String,
    pub weekly_frequency: i32,
    pub active: i32,
    pub allow_over_booking: i32,
    pub eligibility_json: String,
}

impl SessionTemplateRecord {
    pub fn from_template(template: &SessionTemplate) -> Result<Self, PersistenceError> {
        Ok(Self {
            reference: template.reference.clone(),
            prison_code: template.prison_code.clone(),
            name: template.name.clone(),
            visit_room: template.visit_room.clone(),
            visit_type: template.visit_type.as_str().to_string(),
            open_capacity: to_i32(template.open_capacity, "open_capacity")?,
            closed_capacity: to_i32(template.closed_capacity, "closed_capacity")?,
            start_time: format_time(template.start_time)?,
            end_time: format_time(template.end_time)?,
            valid_from_date: format_date(template.valid_from_date)?,
            valid_to_date: template.valid_to_date.map(format_date).transpose()?,
            day_of_week: day_of_week_str(template.day_of_week).to_string(),
            weekly_frequency: to_i32(template.weekly_frequency, "weekly_frequency")?,
            active: i32::from(template.active),
            allow_over_booking: i32::from(template.allow_over_booking),
            eligibility_json: serde_json::to_string(&template.eligibility)?,
        })
    }

    pub fn into_template(self) -> Result<SessionTemplate, PersistenceError> {
        let eligibility: EligibilityGroups = serde_json::from_str(&self.eligibility_json)?;
        Ok(SessionTemplate {
            visit_type: self.visit_type.parse()?,
            open_capacity: to_u32(self.open_capacity, "open_capacity")?,
            closed_capacity: to_u32(self.closed_capacity, "closed_capacity")?,
            start_time: parse_time(&self.start_time)?,
            end_time: parse_time(&self.end_time)?,
            valid_from_date: parse_date(&self.valid_from_date)?,
            valid_to_date: self.valid_to_date.as_deref().map(parse_date).transpose()?,
            day_of_week: parse_day_of_week(&self.day_of_week)?,
            weekly_frequency: to_u32(self.weekly_frequency, "weekly_frequency")?,
            active: self.active != 0,
            allow_over_booking: self.allow_over_booking != 0,
            eligibility,
            reference: self.reference,
            name: self.name,
            prison_code: self.prison_code,
            visit_room: self.visit_room,
        })
    }
}

fn parse_slot(
    session_template_reference: Option<String>,
    visit_date: &str,
    start_time: &str,
    end_time: &str,
) -> Result<SessionSlot, PersistenceError> {
    Ok(SessionSlot {
        session_template_reference,
        date: parse_date(visit_date)?,
        start_time: parse_time(start_time)?,
        end_time: parse_time(end_time)?,
    })
}

/// A stored application.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = applications)]
#[diesel(treat_none_as_null = true)]
pub struct ApplicationRecord {
    pub reference: String,
    pub prison_code: String,
    pub prisoner_id: String,
    pub session_template_reference: Option<String>,
    pub visit_date: String,
    pub start_time: String,
    pub end_time: String,
    pub visit_type: String,
    pub restriction: String,
    pub status: String,
    pub reserved_slot: i32,
    pub visit_reference: Option<String>,
    pub visitors_json: String,
    pub visit_contact_json: Option<String>,
    pub visitor_support_json: Option<String>,
    pub user_type: String,
    pub created_by: String,
    pub created_at: String,
    pub modified_at: String,
}

impl ApplicationRecord {
    pub fn from_application(application: &Application) -> Result<Self, PersistenceError> {
        Ok(Self {
            reference: application.reference.to_string(),
            prison_code: application.prison_code.clone(),
            prisoner_id: application.prisoner_id.clone(),
            session_template_reference: application.slot.session_template_reference.clone(),
            visit_date: format_date(application.slot.date)?,
            start_time: format_time(application.slot.start_time)?,
            end_time: format_time(application.slot.end_time)?,
            visit_type: application.visit_type.as_str().to_string(),
            restriction: application.restriction.as_str().to_string(),
            status: application.status.as_str().to_string(),
            reserved_slot: i32::from(application.reserved_slot),
            visit_reference: application.visit_reference.as_ref().map(ToString::to_string),
            visitors_json: serde_json::to_string(&application.visitors)?,
            visit_contact_json: optional_json(application.visit_contact.as_ref())?,
            visitor_support_json: optional_json(application.visitor_support.as_ref())?,
            user_type: application.user_type.as_str().to_string(),
            created_by: application.created_by.clone(),
            created_at: format_datetime(application.created_at)?,
            modified_at: format_datetime(application.modified_at)?,
        })
    }

    pub fn into_application(self) -> Result<Application, PersistenceError> {
        Ok(Application {
            reference: Reference::parse(&self.reference)?,
            slot: parse_slot(
                self.session_template_reference,
                &self.visit_date,
                &self.start_time,
                &self.end_time,
            )?,
            visit_type: self.visit_type.parse()?,
            restriction: self.restriction.parse()?,
            status: self.status.parse()?,
            reserved_slot: self.reserved_slot != 0,
            visit_reference: self
                .visit_reference
                .as_deref()
                .map(Reference::parse)
                .transpose()?,
            visitors: serde_json::from_str(&self.visitors_json)?,
            visit_contact: parse_optional_json(self.visit_contact_json.as_deref())?,
            visitor_support: parse_optional_json(self.visitor_support_json.as_deref())?,
            user_type: self.user_type.parse()?,
            created_at: parse_datetime(&self.created_at)?,
            modified_at: parse_datetime(&self.modified_at)?,
            prison_code: self.prison_code,
            prisoner_id: self.prisoner_id,
            created_by: self.created_by,
        })
    }
}

/// A stored visit.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = visits)]
#[diesel(treat_none_as_null = true)]
pub struct VisitRecord {
    pub reference: String,
    pub prison_code: String,
    pub prisoner_id: String,
    pub session_template_reference: Option<String>,
    pub visit_date: String,
    pub start_time: String,
    pub end_time: String,
    pub visit_room: String,
    pub visit_type: String,
    pub restriction: String,
    pub status: String,
    pub sub_status: String,
    pub outcome_status: Option<String>,
    pub visitors_json: String,
    pub visit_contact_json: Option<String>,
    pub visitor_support_json: Option<String>,
    pub visit_notes_json: String,
    pub user_type: String,
    pub created_at: String,
    pub modified_at: String,
    pub lead_visitor_id: Option<i64>,
    pub migrated_at: Option<String>,
}

impl VisitRecord {
    pub fn from_visit(visit: &Visit) -> Result<Self, PersistenceError> {
        Ok(Self {
            reference: visit.reference.to_string(),
            prison_code: visit.prison_code.clone(),
            prisoner_id: visit.prisoner_id.clone(),
            session_template_reference: visit.slot.session_template_reference.clone(),
            visit_date: format_date(visit.slot.date)?,
            start_time: format_time(visit.slot.start_time)?,
            end_time: format_time(visit.slot.end_time)?,
            visit_room: visit.visit_room.clone(),
            visit_type: visit.visit_type.as_str().to_string(),
            restriction: visit.restriction.as_str().to_string(),
            status: visit.status.as_str().to_string(),
            sub_status: visit.sub_status.as_str().to_string(),
            outcome_status: visit.outcome_status.map(|s| s.as_str().to_string()),
            visitors_json: serde_json::to_string(&visit.visitors)?,
            visit_contact_json: optional_json(visit.visit_contact.as_ref())?,
            visitor_support_json: optional_json(visit.visitor_support.as_ref())?,
            visit_notes_json: serde_json::to_string(&visit.visit_notes)?,
            user_type: visit.user_type.as_str().to_string(),
            created_at: format_datetime(visit.created_at)?,
            modified_at: format_datetime(visit.modified_at)?,
            lead_visitor_id: visit.legacy.as_ref().and_then(|l| l.lead_visitor_id),
            migrated_at: visit
                .legacy
                .as_ref()
                .map(|l| format_datetime(l.migrated_at))
                .transpose()?,
        })
    }

    pub fn into_visit(self) -> Result<Visit, PersistenceError> {
        let legacy = self
            .migrated_at
            .as_deref()
            .map(parse_datetime)
            .transpose()?
            .map(|migrated_at| LegacyData {
                lead_visitor_id: self.lead_visitor_id,
                migrated_at,
            });

        Ok(Visit {
            reference: Reference::parse(&self.reference)?,
            slot: parse_slot(
                self.session_template_reference,
                &self.visit_date,
                &self.start_time,
                &self.end_time,
            )?,
            visit_type: self.visit_type.parse()?,
            restriction: self.restriction.parse()?,
            status: self.status.parse()?,
            sub_status: self.sub_status.parse()?,
            outcome_status: self.outcome_status.as_deref().map(str::parse).transpose()?,
            visitors: serde_json::from_str(&self.visitors_json)?,
            visit_contact: parse_optional_json(self.visit_contact_json.as_deref())?,
            visitor_support: parse_optional_json(self.visitor_support_json.as_deref())?,
            visit_notes: serde_json::from_str(&self.visit_notes_json)?,
            user_type: self.user_type.parse()?,
            created_at: parse_datetime(&self.created_at)?,
            modified_at: parse_datetime(&self.modified_at)?,
            legacy,
            prison_code: self.prison_code,
            prisoner_id: self.prisoner_id,
            visit_room: self.visit_room,
        })
    }
}

/// A new audit event row.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = event_audit)]
pub struct NewAuditEvent {
    pub event_type: String,
    pub booking_reference: Option<String>,
    pub application_reference: Option<String>,
    pub session_template_reference: Option<String>,
    pub application_method: String,
    pub actor_json: String,
    pub cause_json: String,
    pub action_json: String,
    pub before_snapshot_json: String,
    pub after_snapshot_json: String,
}

/// A stored audit event row.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = event_audit)]
pub struct AuditEventRow {
    pub event_id: i64,
    pub event_type: String,
    pub booking_reference: Option<String>,
    pub application_reference: Option<String>,
    pub session_template_reference: Option<String>,
    pub application_method: String,
    pub actor_json: String,
    pub cause_json: String,
    pub action_json: String,
    pub before_snapshot_json: String,
    pub after_snapshot_json: String,
}
