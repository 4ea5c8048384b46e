// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Prison and session template upserts.

use diesel::prelude::*;
use diesel::{MysqlConnection, SqliteConnection};
use tracing::debug;
use visit_scheduler_domain::{Prison, SessionTemplate};

use crate::data_models::{PrisonRecord, SessionTemplateRecord};
use crate::diesel_schema::{prisons, session_templates};
use crate::error::PersistenceError;

backend_fn! {
/// Inserts or replaces a prison, keyed by code.
///
/// Returns `true` if a new row was inserted.
///
/// # Errors
///
/// Returns an error if the prison cannot be serialized or written.
pub fn upsert_prison(conn: &mut _, prison: &Prison) -> Result<bool, PersistenceError> {
    let record = PrisonRecord::from_prison(prison)?;

    let existing: i64 = prisons::table
        .filter(prisons::code.eq(&record.code))
        .count()
        .get_result(conn)?;

    if existing > 0 {
        diesel::update(prisons::table.filter(prisons::code.eq(&record.code)))
            .set(&record)
            .execute(conn)?;
        debug!(code = %record.code, "Updated prison");
        Ok(false)
    } else {
        diesel::insert_into(prisons::table)
            .values(&record)
            .execute(conn)?;
        debug!(code = %record.code, "Inserted prison");
        Ok(true)
    }
}
}

backend_fn! {
/// Inserts or replaces a session template, keyed by reference.
///
/// The owning prison must already exist.
///
/// Returns `true` if a new row was inserted.
///
/// # Errors
///
/// Returns an error if the template cannot be serialized or written.
pub fn upsert_session_template(
    conn: &mut _,
    template: &SessionTemplate,
) -> Result<bool, PersistenceError> {
    let record = SessionTemplateRecord::from_template(template)?;

    let existing: i64 = session_templates::table
        .filter(session_templates::reference.eq(&record.reference))
        .count()
        .get_result(conn)?;

    if existing > 0 {
        diesel::update(
            session_templates::table.filter(session_templates::reference.eq(&record.reference)),
        )
        .set(&record)
        .execute(conn)?;
        debug!(reference = %record.reference, "Updated session template");
        Ok(false)
    } else {
        diesel::insert_into(session_templates::table)
            .values(&record)
            .execute(conn)?;
        debug!(reference = %record.reference, "Inserted session template");
        Ok(true)
    }
}
}
