// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use crate::session_template::SessionTemplate;
use crate::types::VisitRestriction;
use time::Date;

/// How much of a session is already taken, split by restriction.
///
/// `booked_*` counts booked visits; `reserved_*` counts unexpired
/// applications that hold a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SlotOccupancy {
    pub booked_open: u32,
    pub booked_closed: u32,
    pub reserved_open: u32,
    pub reserved_closed: u32,
}

impl SlotOccupancy {
    /// Total booked and reserved for a restriction.
    #[must_use]
    pub const fn taken(&self, restriction: VisitRestriction) -> u32 {
        match restriction {
            VisitRestriction::Open => self.booked_open.saturating_add(self.reserved_open),
            VisitRestriction::Closed => self.booked_closed.saturating_add(self.reserved_closed),
        }
    }
}

/// The capacity position of one restriction within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotCapacity {
    pub restriction: VisitRestriction,
    pub capacity: u32,
    pub taken: u32,
    pub allow_over_booking: bool,
}

impl SlotCapacity {
    /// Places still free (zero when over-booked).
    #[must_use]
    pub const fn remaining(&self) -> u32 {
        self.capacity.saturating_sub(self.taken)
    }

    /// Returns true if another booking would exceed capacity.
    #[must_use]
    pub const fn is_full(&self) -> bool {
        !self.allow_over_booking && self.taken >= self.capacity
    }
}

/// Evaluates the capacity of `template` for `restriction`.
#[must_use]
pub const fn evaluate_capacity(
    template: &SessionTemplate,
    restriction: VisitRestriction,
    occupancy: &SlotOccupancy,
) -> SlotCapacity {
    SlotCapacity {
        restriction,
        capacity: template.capacity_for(restriction),
        taken: occupancy.taken(restriction),
        allow_over_booking: template.allow_over_booking,
    }
}

/// Validates that one more booking fits.
///
/// # Errors
///
/// Returns `DomainError::SessionFull` when the session is full and the
/// template does not allow over-booking.
pub fn ensure_capacity(
    template: &SessionTemplate,
    date: Date,
    restriction: VisitRestriction,
    occupancy: &SlotOccupancy,
) -> Result<SlotCapacity, DomainError> {
    let capacity = evaluate_capacity(template, restriction, occupancy);
    if capacity.is_full() {
        return Err(DomainError::SessionFull {
            template_reference: template.reference.clone(),
            date,
            restriction: restriction.as_str().to_string(),
        });
    }
    Ok(capacity)
}
