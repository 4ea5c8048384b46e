// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Audit event persistence.

use diesel::prelude::*;
use diesel::{MysqlConnection, SqliteConnection};
use tracing::debug;
use visit_scheduler_audit::AuditEvent;

use crate::backend::PersistenceBackend;
use crate::data_models::{ActionData, ActorData, CauseData, NewAuditEvent, StateSnapshotData};
use crate::diesel_schema::event_audit;
use crate::error::PersistenceError;

fn to_row(event: &AuditEvent) -> Result<NewAuditEvent, PersistenceError> {
    let actor = ActorData {
        id: event.actor.id.clone(),
        user_type: event.actor.user_type.as_str().to_string(),
    };
    let cause = CauseData {
        id: event.cause.id.clone(),
        description: event.cause.description.clone(),
    };
    let action = ActionData {
        event_type: event.action.event_type.as_str().to_string(),
        details: event.action.details.clone(),
    };
    let before = StateSnapshotData {
        data: event.before.data.clone(),
    };
    let after = StateSnapshotData {
        data: event.after.data.clone(),
    };

    Ok(NewAuditEvent {
        event_type: event.action.event_type.as_str().to_string(),
        booking_reference: event.scope.booking_reference.clone(),
        application_reference: event.scope.application_reference.clone(),
        session_template_reference: event.scope.session_template_reference.clone(),
        application_method: event.application_method.as_str().to_string(),
        actor_json: serde_json::to_string(&actor)?,
        cause_json: serde_json::to_string(&cause)?,
        action_json: serde_json::to_string(&action)?,
        before_snapshot_json: serde_json::to_string(&before)?,
        after_snapshot_json: serde_json::to_string(&after)?,
    })
}

backend_fn! {
/// Appends an audit event.
///
/// # Returns
///
/// The event ID assigned by the database.
///
/// # Errors
///
/// Returns an error if serialization or the insert fails.
pub fn persist_audit_event(conn: &mut _, event: &AuditEvent) -> Result<i64, PersistenceError> {
    let row = to_row(event)?;

    diesel::insert_into(event_audit::table)
        .values(&row)
        .execute(conn)?;

    let event_id = conn.get_last_insert_rowid()?;
    debug!(event_id, event_type = %row.event_type, "Persisted audit event");
    Ok(event_id)
}
}
