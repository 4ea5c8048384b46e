// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Audit event retrieval.

use diesel::prelude::*;
use diesel::{MysqlConnection, SqliteConnection};
use visit_scheduler_audit::{
    Action, Actor, AuditEvent, AuditScope, Cause, EventAuditType, StateSnapshot,
};

use crate::data_models::{ActionData, ActorData, AuditEventRow, CauseData, StateSnapshotData};
use crate::diesel_schema::{applications, event_audit};
use crate::error::PersistenceError;

fn into_audit_event(row: AuditEventRow) -> Result<AuditEvent, PersistenceError> {
    let actor: ActorData = serde_json::from_str(&row.actor_json)?;
    let cause: CauseData = serde_json::from_str(&row.cause_json)?;
    let action: ActionData = serde_json::from_str(&row.action_json)?;
    let before: StateSnapshotData = serde_json::from_str(&row.before_snapshot_json)?;
    let after: StateSnapshotData = serde_json::from_str(&row.after_snapshot_json)?;

    let event_type: EventAuditType = action.event_type.parse()?;
    if event_type.as_str() != row.event_type {
        return Err(PersistenceError::ReconstructionError(format!(
            "event {} has type column '{}' but action '{}'",
            row.event_id, row.event_type, action.event_type
        )));
    }

    let event = AuditEvent::new(
        Actor::new(actor.id, actor.user_type.parse()?),
        Cause::new(cause.id, cause.description),
        Action::new(event_type, action.details),
        row.application_method.parse()?,
        AuditScope {
            booking_reference: row.booking_reference,
            application_reference: row.application_reference,
            session_template_reference: row.session_template_reference,
        },
        StateSnapshot::new(before.data),
        StateSnapshot::new(after.data),
    );
    Ok(event.with_event_id(row.event_id))
}

backend_fn! {
/// Retrieves a single audit event by id.
///
/// # Errors
///
/// Returns `EventNotFound` if no event has this id.
pub fn get_audit_event(conn: &mut _, event_id: i64) -> Result<AuditEvent, PersistenceError> {
    let row = event_audit::table
        .filter(event_audit::event_id.eq(event_id))
        .select(AuditEventRow::as_select())
        .first::<AuditEventRow>(conn)
        .optional()?
        .ok_or(PersistenceError::EventNotFound(event_id))?;
    into_audit_event(row)
}
}

backend_fn! {
/// Retrieves the history of a booking in the order it happened.
///
/// Includes events recorded against the visit itself and against any
/// application that booked or changed it.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be reconstructed.
pub fn get_audit_events_for_booking(
    conn: &mut _,
    booking_reference: &str,
) -> Result<Vec<AuditEvent>, PersistenceError> {
    let application_references: Vec<String> = applications::table
        .filter(applications::visit_reference.eq(booking_reference))
        .select(applications::reference)
        .load(conn)?;

    event_audit::table
        .filter(
            event_audit::booking_reference
                .eq(booking_reference)
                .or(event_audit::application_reference.eq_any(&application_references)),
        )
        .order(event_audit::event_id.asc())
        .select(AuditEventRow::as_select())
        .load::<AuditEventRow>(conn)?
        .into_iter()
        .map(into_audit_event)
        .collect()
}
}
