// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{
    EligibilityGroups, HousingLocation, IncentiveLevel, Prison, PrisonerCategory, PrisonerProfile,
    SessionTemplate, VisitType,
};
use time::Weekday;
use time::macros::{date, time};

pub fn create_test_prison() -> Prison {
    Prison::new("HEI", true, 2, 28, 3, vec![date!(2026 - 12 - 25)]).unwrap()
}

/// Monday 09:00-10:00 in the main hall, weekly from 2026-01-01.
pub fn create_test_template(reference: &str) -> SessionTemplate {
    SessionTemplate {
        reference: reference.to_string(),
        name: format!("Session {reference}"),
        prison_code: "HEI".to_string(),
        visit_room: "Main Hall".to_string(),
        visit_type: VisitType::Social,
        open_capacity: 10,
        closed_capacity: 2,
        start_time: time!(09:00),
        end_time: time!(10:00),
        valid_from_date: date!(2026 - 01 - 01),
        valid_to_date: None,
        day_of_week: Weekday::Monday,
        weekly_frequency: 1,
        active: true,
        allow_over_booking: false,
        eligibility: EligibilityGroups::default(),
    }
}

pub fn create_test_prisoner() -> PrisonerProfile {
    PrisonerProfile {
        prisoner_id: "A1234BC".to_string(),
        prison_code: "HEI".to_string(),
        housing_location: Some(HousingLocation::parse("A-1-002").unwrap()),
        category: Some(PrisonerCategory::C),
        incentive_level: Some(IncentiveLevel::Enhanced),
    }
}
