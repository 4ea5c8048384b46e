// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Atomic persistence of a transition result.
//!
//! The visit, the application and the audit event of one transition are
//! written in a single database transaction. Booking transitions first
//! re-read the application's stored status so that two concurrent bookings
//! of the same application cannot both commit.

use diesel::{Connection, MysqlConnection, SqliteConnection};
use tracing::info;
use visit_scheduler::TransitionResult;
use visit_scheduler_audit::EventAuditType;
use visit_scheduler_domain::VisitStatus;

use crate::error::PersistenceError;
use crate::mutations::audit::{persist_audit_event_mysql, persist_audit_event_sqlite};
use crate::mutations::bookings::{
    upsert_application_mysql, upsert_application_sqlite, upsert_visit_mysql, upsert_visit_sqlite,
};
use crate::queries::bookings::{get_application_status_mysql, get_application_status_sqlite};

const fn books_application(event_type: EventAuditType) -> bool {
    matches!(
        event_type,
        EventAuditType::BookedVisit | EventAuditType::RequestedVisit | EventAuditType::UpdatedVisit
    )
}

fn reject_if_booked(
    application_reference: &str,
    stored: Option<(String, Option<String>)>,
) -> Result<(), PersistenceError> {
    match stored {
        Some((status, visit_reference)) if status == VisitStatus::Booked.as_str() => {
            Err(PersistenceError::ApplicationAlreadyBooked {
                application_reference: application_reference.to_string(),
                visit_reference,
            })
        }
        _ => Ok(()),
    }
}

/// Persists a transition result (`SQLite` version).
///
/// # Returns
///
/// The event ID assigned to the persisted audit event.
///
/// # Errors
///
/// Returns `ApplicationAlreadyBooked` if a booking transition lost a race,
/// or any database error. Nothing is written on error.
pub fn persist_transition_sqlite(
    conn: &mut SqliteConnection,
    result: &TransitionResult,
) -> Result<i64, PersistenceError> {
    conn.transaction(|conn| {
        let event_type = result.audit_event.action.event_type;

        let booking = result
            .new_state
            .application
            .as_ref()
            .filter(|_| books_application(event_type));
        if let Some(application) = booking {
            let reference = application.reference.to_string();
            let stored = get_application_status_sqlite(conn, &reference)?;
            reject_if_booked(&reference, stored)?;
        }

        if let Some(visit) = &result.new_state.visit {
            upsert_visit_sqlite(conn, visit)?;
        }
        if let Some(application) = &result.new_state.application {
            upsert_application_sqlite(conn, application)?;
        }

        let event_id = persist_audit_event_sqlite(conn, &result.audit_event)?;
        info!(event_id, event_type = %event_type, "Persisted transition");
        Ok(event_id)
    })
}

/// Persists a transition result (`MySQL` version).
///
/// # Returns
///
/// The event ID assigned to the persisted audit event.
///
/// # Errors
///
/// Returns `ApplicationAlreadyBooked` if a booking transition lost a race,
/// or any database error. Nothing is written on error.
pub fn persist_transition_mysql(
    conn: &mut MysqlConnection,
    result: &TransitionResult,
) -> Result<i64, PersistenceError> {
    conn.transaction(|conn| {
        let event_type = result.audit_event.action.event_type;

        let booking = result
            .new_state
            .application
            .as_ref()
            .filter(|_| books_application(event_type));
        if let Some(application) = booking {
            let reference = application.reference.to_string();
            let stored = get_application_status_mysql(conn, &reference)?;
            reject_if_booked(&reference, stored)?;
        }

        if let Some(visit) = &result.new_state.visit {
            upsert_visit_mysql(conn, visit)?;
        }
        if let Some(application) = &result.new_state.application {
            upsert_application_mysql(conn, application)?;
        }

        let event_id = persist_audit_event_mysql(conn, &result.audit_event)?;
        info!(event_id, event_type = %event_type, "Persisted transition");
        Ok(event_id)
    })
}
