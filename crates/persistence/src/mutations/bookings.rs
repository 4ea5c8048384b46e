// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Application and visit writes.

use diesel::prelude::*;
use diesel::{MysqlConnection, SqliteConnection};
use tracing::debug;
use visit_scheduler_domain::{Application, Visit};

use crate::data_models::{ApplicationRecord, VisitRecord};
use crate::diesel_schema::{applications, visits};
use crate::error::PersistenceError;
use crate::queries::IN_PROGRESS_STATUSES;

backend_fn! {
/// Inserts or replaces an application, keyed by reference.
///
/// # Errors
///
/// Returns an error if the application cannot be serialized or written.
pub fn upsert_application(
    conn: &mut _,
    application: &Application,
) -> Result<(), PersistenceError> {
    let record = ApplicationRecord::from_application(application)?;

    let existing: i64 = applications::table
        .filter(applications::reference.eq(&record.reference))
        .count()
        .get_result(conn)?;

    if existing > 0 {
        diesel::update(applications::table.filter(applications::reference.eq(&record.reference)))
            .set(&record)
            .execute(conn)?;
    } else {
        diesel::insert_into(applications::table)
            .values(&record)
            .execute(conn)?;
    }

    debug!(
        reference = %record.reference,
        status = %record.status,
        inserted = existing == 0,
        "Stored application"
    );
    Ok(())
}
}

backend_fn! {
/// Inserts or replaces a visit, keyed by reference.
///
/// # Errors
///
/// Returns an error if the visit cannot be serialized or written.
pub fn upsert_visit(conn: &mut _, visit: &Visit) -> Result<(), PersistenceError> {
    let record = VisitRecord::from_visit(visit)?;

    let existing: i64 = visits::table
        .filter(visits::reference.eq(&record.reference))
        .count()
        .get_result(conn)?;

    if existing > 0 {
        diesel::update(visits::table.filter(visits::reference.eq(&record.reference)))
            .set(&record)
            .execute(conn)?;
    } else {
        diesel::insert_into(visits::table)
            .values(&record)
            .execute(conn)?;
    }

    debug!(
        reference = %record.reference,
        status = %record.status,
        sub_status = %record.sub_status,
        inserted = existing == 0,
        "Stored visit"
    );
    Ok(())
}
}

backend_fn! {
/// Deletes in-progress applications last modified before `cutoff`.
///
/// Booked applications are kept as the history of their visit.
///
/// # Errors
///
/// Returns an error if the delete fails.
pub fn delete_expired_applications(conn: &mut _, cutoff: &str) -> Result<usize, PersistenceError> {
    let deleted = diesel::delete(
        applications::table
            .filter(applications::status.eq_any(IN_PROGRESS_STATUSES))
            .filter(applications::modified_at.lt(cutoff)),
    )
    .execute(conn)?;

    debug!(deleted, cutoff, "Deleted expired applications");
    Ok(deleted)
}
}
