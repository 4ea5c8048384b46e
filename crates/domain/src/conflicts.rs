// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Booking conflict detection.
//!
//! A prisoner cannot hold two visits or reservations in overlapping slots,
//! and cannot be visited on the same day, in the same prison, as a prisoner
//! they have a non-association with.

use crate::error::DomainError;
use crate::visit::SessionSlot;
use serde::{Deserialize, Serialize};

/// Whether an existing booking is a visit or an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingKind {
    Visit,
    Application,
}

/// A booking that may conflict with a new slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExistingBooking {
    pub reference: String,
    pub kind: BookingKind,
    pub prisoner_id: String,
    pub prison_code: String,
    pub slot: SessionSlot,
}

/// Kind of conflict found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConflictKind {
    DoubleBookingOrReservation,
    NonAssociation,
}

/// A conflict against an existing booking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingConflict {
    pub kind: ConflictKind,
    pub reference: String,
    pub prisoner_id: String,
}

/// Finds every conflict for `prisoner_id` taking `slot` at `prison_code`.
///
/// # Arguments
///
/// * `prisoner_bookings` - Active visits and applications of the prisoner
/// * `non_association_bookings` - Active bookings of non-associated prisoners
/// * `exclude` - References to ignore (the application itself and the
///   visit being changed)
#[must_use]
pub fn detect_conflicts(
    prison_code: &str,
    slot: &SessionSlot,
    prisoner_bookings: &[ExistingBooking],
    non_association_bookings: &[ExistingBooking],
    exclude: &[&str],
) -> Vec<BookingConflict> {
    let excluded = |booking: &ExistingBooking| exclude.contains(&booking.reference.as_str());

    let double_bookings = prisoner_bookings
        .iter()
        .filter(|booking| !excluded(booking) && booking.slot.overlaps(slot))
        .map(|booking| BookingConflict {
            kind: ConflictKind::DoubleBookingOrReservation,
            reference: booking.reference.clone(),
            prisoner_id: booking.prisoner_id.clone(),
        });

    let non_associations = non_association_bookings
        .iter()
        .filter(|booking| {
            !excluded(booking)
                && booking.kind == BookingKind::Visit
                && booking.prison_code == prison_code
                && booking.slot.date == slot.date
        })
        .map(|booking| BookingConflict {
            kind: ConflictKind::NonAssociation,
            reference: booking.reference.clone(),
            prisoner_id: booking.prisoner_id.clone(),
        });

    double_bookings.chain(non_associations).collect()
}

/// Converts the first blocking conflict into an error.
///
/// Double bookings always block; non-associations block only when
/// `enforce_non_association` is set.
///
/// # Errors
///
/// Returns `DomainError::DoubleBooking` or `DomainError::NonAssociationConflict`.
pub fn ensure_no_conflicts(
    prisoner_id: &str,
    slot: &SessionSlot,
    conflicts: &[BookingConflict],
    enforce_non_association: bool,
) -> Result<(), DomainError> {
    if let Some(conflict) = conflicts
        .iter()
        .find(|c| c.kind == ConflictKind::DoubleBookingOrReservation)
    {
        return Err(DomainError::DoubleBooking {
            prisoner_id: prisoner_id.to_string(),
            existing_reference: conflict.reference.clone(),
        });
    }

    if enforce_non_association
        && conflicts
            .iter()
            .any(|c| c.kind == ConflictKind::NonAssociation)
    {
        return Err(DomainError::NonAssociationConflict {
            prisoner_id: prisoner_id.to_string(),
            date: slot.date,
        });
    }

    Ok(())
}
