// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Prison and session template queries.

use diesel::prelude::*;
use diesel::{MysqlConnection, SqliteConnection};
use visit_scheduler_domain::{Prison, SessionTemplate};

use crate::data_models::{PrisonRecord, SessionTemplateRecord};
use crate::diesel_schema::{prisons, session_templates};
use crate::error::PersistenceError;

backend_fn! {
/// Retrieves a prison by code.
///
/// # Errors
///
/// Returns an error if the query fails or the row cannot be reconstructed.
pub fn get_prison(conn: &mut _, code: &str) -> Result<Option<Prison>, PersistenceError> {
    prisons::table
        .filter(prisons::code.eq(code))
        .select(PrisonRecord::as_select())
        .first::<PrisonRecord>(conn)
        .optional()?
        .map(PrisonRecord::into_prison)
        .transpose()
}
}

backend_fn! {
/// Retrieves a session template by reference.
///
/// # Errors
///
/// Returns an error if the query fails or the row cannot be reconstructed.
pub fn get_session_template(
    conn: &mut _,
    reference: &str,
) -> Result<Option<SessionTemplate>, PersistenceError> {
    session_templates::table
        .filter(session_templates::reference.eq(reference))
        .select(SessionTemplateRecord::as_select())
        .first::<SessionTemplateRecord>(conn)
        .optional()?
        .map(SessionTemplateRecord::into_template)
        .transpose()
}
}

backend_fn! {
/// Lists every session template of a prison, ordered by reference.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be reconstructed.
pub fn list_session_templates(
    conn: &mut _,
    prison_code: &str,
) -> Result<Vec<SessionTemplate>, PersistenceError> {
    session_templates::table
        .filter(session_templates::prison_code.eq(prison_code))
        .order(session_templates::reference.asc())
        .select(SessionTemplateRecord::as_select())
        .load::<SessionTemplateRecord>(conn)?
        .into_iter()
        .map(SessionTemplateRecord::into_template)
        .collect()
}
}
