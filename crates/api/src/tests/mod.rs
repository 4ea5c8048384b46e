// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Test module for the API crate.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod authorization_tests;
mod booking_tests;
mod request_tests;

use std::sync::{Arc, Mutex};
use time::OffsetDateTime;
use time::macros::datetime;
use visit_scheduler_audit::Cause;
use visit_scheduler_domain::{
    ApplicationMethod, EligibilityGroups, VisitBalance, VisitContact, VisitRestriction,
    VisitType, Visitor,
};
use visit_scheduler_persistence::Persistence;

use crate::{
    ApplicationResponse, AuthenticatedActor, BookVisitRequest, CreatePrisonRequest,
    CreateSessionTemplateRequest, InMemoryDirectory, PrisonerDirectory, ReserveSlotRequest, Role,
    SchedulerSettings, Services, SlotRequestBody, VisitEvent, VisitEventPublisher, VisitResponse,
    book_visit, create_prison, create_session_template, reserve_slot,
};

pub const PRISON: &str = "HEI";
pub const PRISONER: &str = "A1234BC";
pub const OTHER_PRISONER: &str = "B2345CD";
pub const TEMPLATE: &str = "tpl-monday";
/// A Monday ten days after [`now`].
pub const SESSION_DATE: &str = "2026-03-02";

/// Friday 20 February 2026, 10:00 in London (GMT).
pub const fn now() -> OffsetDateTime {
    datetime!(2026 - 02 - 20 10:00 UTC)
}

pub fn create_test_admin() -> AuthenticatedActor {
    AuthenticatedActor::new(String::from("admin-1"), Role::Admin)
}

pub fn create_test_staff() -> AuthenticatedActor {
    AuthenticatedActor::new(String::from("staff-1"), Role::Staff)
}

pub fn create_test_public() -> AuthenticatedActor {
    AuthenticatedActor::new(String::from("booker-1"), Role::Public)
}

pub fn create_test_system() -> AuthenticatedActor {
    AuthenticatedActor::new(String::from("migration"), Role::System)
}

pub fn create_test_cause() -> Cause {
    Cause::new(String::from("api-req-1"), String::from("API request"))
}

pub fn prison_request() -> CreatePrisonRequest {
    CreatePrisonRequest {
        code: PRISON.to_string(),
        active: true,
        policy_notice_days_min: 2,
        policy_notice_days_max: 28,
        max_total_visitors: 3,
        exclude_dates: Vec::new(),
    }
}

pub fn template_request(reference: &str) -> CreateSessionTemplateRequest {
    CreateSessionTemplateRequest {
        reference: reference.to_string(),
        name: format!("Session {reference}"),
        prison_code: PRISON.to_string(),
        visit_room: String::from("Main Hall"),
        visit_type: VisitType::Social,
        open_capacity: 2,
        closed_capacity: 1,
        start_time: String::from("09:00"),
        end_time: String::from("10:00"),
        valid_from_date: String::from("2026-01-05"),
        valid_to_date: None,
        day_of_week: String::from("MONDAY"),
        weekly_frequency: 1,
        active: true,
        allow_over_booking: false,
        eligibility: EligibilityGroups::default(),
    }
}

/// A publisher that keeps every event it is given.
#[derive(Debug, Default)]
pub struct RecordingPublisher {
    events: Mutex<Vec<VisitEvent>>,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<VisitEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl VisitEventPublisher for RecordingPublisher {
    fn publish(&self, event: &VisitEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

/// Persistence with prison `HEI` and template `tpl-monday`, plus the
/// in-memory collaborators behind `services`.
pub struct Harness {
    pub persistence: Persistence,
    pub services: Services,
    pub directory: Arc<InMemoryDirectory>,
    pub publisher: Arc<RecordingPublisher>,
}

impl Harness {
    pub fn new() -> Self {
        let directory = Arc::new(InMemoryDirectory::new());
        let publisher = Arc::new(RecordingPublisher::new());
        let services = Services::new(
            SchedulerSettings::default(),
            directory.clone(),
            directory.clone(),
            publisher.clone(),
        );
        let mut persistence = Persistence::new_in_memory().unwrap();
        create_prison(&mut persistence, &prison_request(), &create_test_admin()).unwrap();
        create_session_template(
            &mut persistence,
            template_request(TEMPLATE),
            &create_test_admin(),
        )
        .unwrap();

        Self {
            persistence,
            services,
            directory,
            publisher,
        }
    }

    pub fn with_balance(self, prisoner_id: &str, remaining_vo: i32, remaining_pvo: i32) -> Self {
        self.directory
            .set_visit_balance(
                prisoner_id,
                VisitBalance {
                    remaining_vo,
                    remaining_pvo,
                },
            )
            .unwrap();
        self
    }

    pub fn reserve(
        &mut self,
        prisoner_id: &str,
        restriction: VisitRestriction,
        actor: &AuthenticatedActor,
    ) -> Result<ApplicationResponse, crate::ApiError> {
        reserve_slot(
            &mut self.persistence,
            &self.services,
            now(),
            ReserveSlotRequest {
                prisoner_id: prisoner_id.to_string(),
                slot: slot_body(TEMPLATE, SESSION_DATE, restriction),
            },
            actor,
            create_test_cause(),
        )
    }

    pub fn book(
        &mut self,
        application_reference: &str,
        is_request_booking: bool,
        actor: &AuthenticatedActor,
    ) -> Result<VisitResponse, crate::ApiError> {
        book_visit(
            &mut self.persistence,
            &self.services,
            now(),
            application_reference,
            BookVisitRequest {
                application_method: ApplicationMethod::Phone,
                is_request_booking,
            },
            actor,
            create_test_cause(),
        )
    }

    /// Reserves and books an open visit for `prisoner_id` as staff.
    pub fn booked_visit(&mut self, prisoner_id: &str) -> VisitResponse {
        let staff = create_test_staff();
        let application = self
            .reserve(prisoner_id, VisitRestriction::Open, &staff)
            .unwrap();
        self.book(&application.reference, false, &staff).unwrap()
    }

    /// Reserves and books a public visit request for `prisoner_id`,
    /// giving the prisoner one visiting order if no balance is set.
    pub fn requested_visit(&mut self, prisoner_id: &str) -> VisitResponse {
        if self.directory.visit_balance(prisoner_id).unwrap().is_none() {
            self.directory
                .set_visit_balance(
                    prisoner_id,
                    VisitBalance {
                        remaining_vo: 1,
                        remaining_pvo: 0,
                    },
                )
                .unwrap();
        }
        let public = create_test_public();
        let application = self
            .reserve(prisoner_id, VisitRestriction::Open, &public)
            .unwrap();
        self.book(&application.reference, true, &public).unwrap()
    }

    pub fn audit_count(&mut self, booking_reference: &str) -> usize {
        self.persistence
            .get_audit_events_for_booking(booking_reference)
            .unwrap()
            .len()
    }
}

pub fn slot_body(template: &str, date: &str, restriction: VisitRestriction) -> SlotRequestBody {
    SlotRequestBody {
        session_template_reference: template.to_string(),
        session_date: date.to_string(),
        visit_restriction: restriction,
        visitors: vec![Visitor::new(4321, true)],
        visitor_support: None,
        visit_contact: Some(VisitContact {
            name: String::from("Jane Smith"),
            telephone: Some(String::from("01234 567890")),
            email: None,
        }),
    }
}
