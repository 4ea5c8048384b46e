// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Application and visit queries.
//!
//! Capacity and conflict queries only count records that still hold a
//! place: booked visits whose sub-status takes capacity, and in-progress
//! applications last modified on or after the expiry cut-off.

use diesel::prelude::*;
use diesel::{MysqlConnection, SqliteConnection};
use visit_scheduler_domain::{
    Application, BookingKind, ExistingBooking, SlotOccupancy, Visit, VisitRestriction,
    VisitStatus,
};

use crate::data_models::{ApplicationRecord, VisitRecord};
use crate::diesel_schema::{applications, visits};
use crate::error::PersistenceError;
use crate::queries::{CAPACITY_SUB_STATUSES, IN_PROGRESS_STATUSES};

backend_fn! {
/// Retrieves an application by reference.
///
/// # Errors
///
/// Returns an error if the query fails or the row cannot be reconstructed.
pub fn get_application(
    conn: &mut _,
    reference: &str,
) -> Result<Option<Application>, PersistenceError> {
    applications::table
        .filter(applications::reference.eq(reference))
        .select(ApplicationRecord::as_select())
        .first::<ApplicationRecord>(conn)
        .optional()?
        .map(ApplicationRecord::into_application)
        .transpose()
}
}

backend_fn! {
/// Retrieves the stored status and visit reference of an application.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn get_application_status(
    conn: &mut _,
    reference: &str,
) -> Result<Option<(String, Option<String>)>, PersistenceError> {
    Ok(applications::table
        .filter(applications::reference.eq(reference))
        .select((applications::status, applications::visit_reference))
        .first::<(String, Option<String>)>(conn)
        .optional()?)
}
}

backend_fn! {
/// Retrieves a visit by reference.
///
/// # Errors
///
/// Returns an error if the query fails or the row cannot be reconstructed.
pub fn get_visit(conn: &mut _, reference: &str) -> Result<Option<Visit>, PersistenceError> {
    visits::table
        .filter(visits::reference.eq(reference))
        .select(VisitRecord::as_select())
        .first::<VisitRecord>(conn)
        .optional()?
        .map(VisitRecord::into_visit)
        .transpose()
}
}

backend_fn! {
/// Lists all visits of a prisoner in slot order.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be reconstructed.
pub fn list_visits_for_prisoner(
    conn: &mut _,
    prisoner_id: &str,
) -> Result<Vec<Visit>, PersistenceError> {
    visits::table
        .filter(visits::prisoner_id.eq(prisoner_id))
        .order((visits::visit_date.asc(), visits::start_time.asc(), visits::reference.asc()))
        .select(VisitRecord::as_select())
        .load::<VisitRecord>(conn)?
        .into_iter()
        .map(VisitRecord::into_visit)
        .collect()
}
}

backend_fn! {
/// Lists all visits at a prison on a date in slot order.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be reconstructed.
pub fn list_visits_for_prison_on(
    conn: &mut _,
    prison_code: &str,
    visit_date: &str,
) -> Result<Vec<Visit>, PersistenceError> {
    visits::table
        .filter(visits::prison_code.eq(prison_code))
        .filter(visits::visit_date.eq(visit_date))
        .order((visits::start_time.asc(), visits::reference.asc()))
        .select(VisitRecord::as_select())
        .load::<VisitRecord>(conn)?
        .into_iter()
        .map(VisitRecord::into_visit)
        .collect()
}
}

fn tally(occupancy: &mut SlotOccupancy, restrictions: &[String], booked: bool) {
    for restriction in restrictions {
        let open = restriction == VisitRestriction::Open.as_str();
        let counter = match (booked, open) {
            (true, true) => &mut occupancy.booked_open,
            (true, false) => &mut occupancy.booked_closed,
            (false, true) => &mut occupancy.reserved_open,
            (false, false) => &mut occupancy.reserved_closed,
        };
        *counter = counter.saturating_add(1);
    }
}

backend_fn! {
/// Counts the places taken in one session slot.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `session_template_reference` - The session template
/// * `visit_date` - The slot date
/// * `cutoff` - Applications modified before this timestamp have expired
/// * `exclude` - Application and visit references to leave out
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn get_slot_occupancy(
    conn: &mut _,
    session_template_reference: &str,
    visit_date: &str,
    cutoff: &str,
    exclude: &[String],
) -> Result<SlotOccupancy, PersistenceError> {
    let booked: Vec<String> = visits::table
        .filter(visits::session_template_reference.eq(session_template_reference))
        .filter(visits::visit_date.eq(visit_date))
        .filter(visits::status.eq(VisitStatus::Booked.as_str()))
        .filter(visits::sub_status.eq_any(CAPACITY_SUB_STATUSES))
        .filter(visits::reference.ne_all(exclude))
        .select(visits::restriction)
        .load(conn)?;

    let reserved: Vec<String> = applications::table
        .filter(applications::session_template_reference.eq(session_template_reference))
        .filter(applications::visit_date.eq(visit_date))
        .filter(applications::status.eq_any(IN_PROGRESS_STATUSES))
        .filter(applications::reserved_slot.eq(1))
        .filter(applications::modified_at.ge(cutoff))
        .filter(applications::reference.ne_all(exclude))
        .select(applications::restriction)
        .load(conn)?;

    let mut occupancy = SlotOccupancy::default();
    tally(&mut occupancy, &booked, true);
    tally(&mut occupancy, &reserved, false);
    Ok(occupancy)
}
}

backend_fn! {
/// Lists the active visits and unexpired applications of the given
/// prisoners on a date.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be reconstructed.
pub fn get_bookings_on_date(
    conn: &mut _,
    prisoner_ids: &[String],
    visit_date: &str,
    cutoff: &str,
) -> Result<Vec<ExistingBooking>, PersistenceError> {
    if prisoner_ids.is_empty() {
        return Ok(Vec::new());
    }

    let visit_rows = visits::table
        .filter(visits::prisoner_id.eq_any(prisoner_ids))
        .filter(visits::visit_date.eq(visit_date))
        .filter(visits::status.eq(VisitStatus::Booked.as_str()))
        .filter(visits::sub_status.eq_any(CAPACITY_SUB_STATUSES))
        .select(VisitRecord::as_select())
        .load::<VisitRecord>(conn)?;

    let application_rows = applications::table
        .filter(applications::prisoner_id.eq_any(prisoner_ids))
        .filter(applications::visit_date.eq(visit_date))
        .filter(applications::status.eq_any(IN_PROGRESS_STATUSES))
        .filter(applications::modified_at.ge(cutoff))
        .select(ApplicationRecord::as_select())
        .load::<ApplicationRecord>(conn)?;

    let mut bookings = Vec::with_capacity(visit_rows.len() + application_rows.len());
    for row in visit_rows {
        let visit = row.into_visit()?;
        bookings.push(ExistingBooking {
            reference: visit.reference.to_string(),
            kind: BookingKind::Visit,
            prisoner_id: visit.prisoner_id,
            prison_code: visit.prison_code,
            slot: visit.slot,
        });
    }
    for row in application_rows {
        let application = row.into_application()?;
        bookings.push(ExistingBooking {
            reference: application.reference.to_string(),
            kind: BookingKind::Application,
            prisoner_id: application.prisoner_id,
            prison_code: application.prison_code,
            slot: application.slot,
        });
    }
    Ok(bookings)
}
}
