// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use crate::prison::Prison;
use crate::types::{VisitContact, Visitor};

/// Validates the visitor list for a booking at `prison`.
///
/// # Errors
///
/// Returns `DomainError::InvalidVisitors` if:
/// - There are no visitors
/// - There are more than the prison's maximum
/// - More than one visitor is flagged as the contact
/// - A visitor appears twice
pub fn validate_visitors(prison: &Prison, visitors: &[Visitor]) -> Result<(), DomainError> {
    if visitors.is_empty() {
        return Err(DomainError::InvalidVisitors {
            reason: "at least one visitor is required".to_string(),
        });
    }

    let max = usize::try_from(prison.max_total_visitors).unwrap_or(usize::MAX);
    if visitors.len() > max {
        return Err(DomainError::InvalidVisitors {
            reason: format!(
                "{} visitors exceeds the maximum of {} for {}",
                visitors.len(),
                prison.max_total_visitors,
                prison.code
            ),
        });
    }

    if visitors.iter().filter(|v| v.visit_contact).count() > 1 {
        return Err(DomainError::InvalidVisitors {
            reason: "only one visitor can be the visit contact".to_string(),
        });
    }

    for (index, visitor) in visitors.iter().enumerate() {
        if visitors[..index]
            .iter()
            .any(|earlier| earlier.nomis_person_id == visitor.nomis_person_id)
        {
            return Err(DomainError::InvalidVisitors {
                reason: format!("visitor {} is listed twice", visitor.nomis_person_id),
            });
        }
    }

    Ok(())
}

/// Validates the visit contact.
///
/// # Errors
///
/// Returns `DomainError::InvalidVisitContact` if the name is blank.
pub fn validate_visit_contact(contact: &VisitContact) -> Result<(), DomainError> {
    if contact.name.trim().is_empty() {
        return Err(DomainError::InvalidVisitContact {
            reason: "contact name must not be empty".to_string(),
        });
    }
    Ok(())
}
