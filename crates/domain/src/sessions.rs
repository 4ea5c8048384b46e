// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use crate::prison::Prison;
use crate::prisoner::PrisonerProfile;
use crate::session_template::SessionTemplate;
use crate::types::VisitType;
use time::{Date, Duration, Time};

/// Longest range `generate_visit_sessions` will expand, in days.
pub const MAX_SESSION_RANGE_DAYS: i64 = 366;

/// A bookable session on a specific date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitSession {
    pub session_template_reference: String,
    pub prison_code: String,
    pub visit_room: String,
    pub visit_type: VisitType,
    pub date: Date,
    pub start_time: Time,
    pub end_time: Time,
    pub open_capacity: u32,
    pub closed_capacity: u32,
}

/// Expands templates into dated sessions between `from` and `to` inclusive.
///
/// Sessions on the prison's exclude dates are skipped, as are templates the
/// prisoner is not eligible for (when a profile is supplied). Results are
/// ordered by date, start time and template reference.
///
/// # Errors
///
/// Returns `DomainError::InvalidDateRange` if `from` is after `to` or the
/// range is longer than [`MAX_SESSION_RANGE_DAYS`].
pub fn generate_visit_sessions(
    prison: &Prison,
    templates: &[SessionTemplate],
    prisoner: Option<&PrisonerProfile>,
    from: Date,
    to: Date,
) -> Result<Vec<VisitSession>, DomainError> {
    if from > to || (to - from).whole_days() > MAX_SESSION_RANGE_DAYS {
        return Err(DomainError::InvalidDateRange { from, to });
    }

    let candidates: Vec<&SessionTemplate> = templates
        .iter()
        .filter(|template| template.prison_code == prison.code)
        .filter(|template| prisoner.is_none_or(|p| template.eligibility(p).eligible))
        .collect();

    let mut sessions = Vec::new();
    let mut date = from;
    loop {
        if !prison.is_excluded(date) {
            sessions.extend(
                candidates
                    .iter()
                    .filter(|template| template.occurs_on(date))
                    .map(|template| VisitSession {
                        session_template_reference: template.reference.clone(),
                        prison_code: template.prison_code.clone(),
                        visit_room: template.visit_room.clone(),
                        visit_type: template.visit_type,
                        date,
                        start_time: template.start_time,
                        end_time: template.end_time,
                        open_capacity: template.open_capacity,
                        closed_capacity: template.closed_capacity,
                    }),
            );
        }

        if date >= to {
            break;
        }
        date = date
            .checked_add(Duration::DAY)
            .ok_or_else(|| DomainError::DateArithmeticOverflow {
                operation: format!("{date} + 1 day"),
            })?;
    }

    sessions.sort_by(|a, b| {
        a.date
            .cmp(&b.date)
            .then(a.start_time.cmp(&b.start_time))
            .then_with(|| {
                a.session_template_reference
                    .cmp(&b.session_template_reference)
            })
    });
    Ok(sessions)
}
