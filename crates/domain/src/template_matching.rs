// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Best-fit session template selection for migrated visits.
//!
//! Legacy visits carry a room name and times but no template. Candidates
//! are filtered to templates in the same prison that run on the visit date
//! and accept the prisoner, then ranked by [`TemplateScore`]:
//!
//! 1. Room name match
//! 2. Incentive level match
//! 3. Category match
//! 4. Housing location specificity
//! 5. Time proximity (smaller total start/end distance wins)
//! 6. Lexicographically smallest reference

use crate::prisoner::PrisonerProfile;
use crate::session_template::{Eligibility, SessionTemplate};
use std::cmp::Ordering;
use time::{Date, Time};

/// What is known about the visit being matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchCriteria {
    pub prison_code: String,
    pub date: Date,
    pub start_time: Time,
    pub end_time: Time,
    pub visit_room: Option<String>,
    pub prisoner: Option<PrisonerProfile>,
}

/// Ranking key for a candidate template. Greater is better.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemplateScore {
    pub room_match: bool,
    pub incentive_match: bool,
    pub category_match: bool,
    pub location_specificity: u8,
    /// `|Δstart| + |Δend|` in minutes.
    pub time_distance_minutes: i64,
}

impl Ord for TemplateScore {
    fn cmp(&self, other: &Self) -> Ordering {
        self.room_match
            .cmp(&other.room_match)
            .then(self.incentive_match.cmp(&other.incentive_match))
            .then(self.category_match.cmp(&other.category_match))
            .then(self.location_specificity.cmp(&other.location_specificity))
            .then(other.time_distance_minutes.cmp(&self.time_distance_minutes))
    }
}

impl PartialOrd for TemplateScore {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Scores a candidate, or returns `None` if it is filtered out.
#[must_use]
pub fn score_template(
    template: &SessionTemplate,
    criteria: &MatchCriteria,
) -> Option<TemplateScore> {
    if !template
        .prison_code
        .eq_ignore_ascii_case(&criteria.prison_code)
        || !template.occurs_on(criteria.date)
    {
        return None;
    }

    let eligibility = match &criteria.prisoner {
        Some(prisoner) => {
            let eligibility = template.eligibility(prisoner);
            if !eligibility.eligible {
                return None;
            }
            eligibility
        }
        None => Eligibility {
            eligible: true,
            ..Default::default()
        },
    };

    let room_match = criteria
        .visit_room
        .as_deref()
        .is_some_and(|room| room.trim().eq_ignore_ascii_case(template.visit_room.trim()));

    Some(TemplateScore {
        room_match,
        incentive_match: eligibility.incentive_match,
        category_match: eligibility.category_match,
        location_specificity: eligibility.location_specificity,
        time_distance_minutes: minutes_between(template.start_time, criteria.start_time)
            + minutes_between(template.end_time, criteria.end_time),
    })
}

/// Selects the best-fit template for a legacy visit.
#[must_use]
pub fn select_session_template<'a>(
    candidates: &'a [SessionTemplate],
    criteria: &MatchCriteria,
) -> Option<&'a SessionTemplate> {
    candidates
        .iter()
        .filter_map(|template| score_template(template, criteria).map(|score| (score, template)))
        .max_by(|(a_score, a), (b_score, b)| {
            a_score
                .cmp(b_score)
                .then_with(|| b.reference.cmp(&a.reference))
        })
        .map(|(_, template)| template)
}

fn minutes_between(a: Time, b: Time) -> i64 {
    (a - b).whole_minutes().abs()
}
