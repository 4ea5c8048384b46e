// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Settings and collaborators shared by every handler.

use std::sync::Arc;
use time::{OffsetDateTime, PrimitiveDateTime};
use tracing::debug;
use visit_scheduler::BookingPolicy;
use visit_scheduler_domain::{DEFAULT_TIMEZONE, Visit, prison_local_now};

use crate::collaborators::{
    NonAssociationDirectory, PrisonerDirectory, VisitEvent, VisitEventPublisher, VisitEventType,
};
use crate::error::{ApiError, translate_domain_error};
use crate::request_response::format_timestamp;

/// Scheduler-wide settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerSettings {
    /// IANA timezone of the prisons served.
    pub timezone: String,
    pub policy: BookingPolicy,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            timezone: DEFAULT_TIMEZONE.to_string(),
            policy: BookingPolicy::default(),
        }
    }
}

/// Everything a handler needs besides persistence.
#[derive(Clone)]
pub struct Services {
    pub settings: SchedulerSettings,
    pub prisoners: Arc<dyn PrisonerDirectory>,
    pub non_associations: Arc<dyn NonAssociationDirectory>,
    pub publisher: Arc<dyn VisitEventPublisher>,
}

impl Services {
    /// Creates a new set of services.
    #[must_use]
    pub fn new(
        settings: SchedulerSettings,
        prisoners: Arc<dyn PrisonerDirectory>,
        non_associations: Arc<dyn NonAssociationDirectory>,
        publisher: Arc<dyn VisitEventPublisher>,
    ) -> Self {
        Self {
            settings,
            prisoners,
            non_associations,
            publisher,
        }
    }

    /// Converts a UTC instant into prison wall-clock time.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured timezone is invalid.
    pub fn local_now(&self, utc: OffsetDateTime) -> Result<PrimitiveDateTime, ApiError> {
        prison_local_now(utc, &self.settings.timezone).map_err(translate_domain_error)
    }

    pub(crate) fn publish(
        &self,
        event_type: VisitEventType,
        visit: &Visit,
        now: PrimitiveDateTime,
        event_id: i64,
    ) {
        let event = VisitEvent {
            event_type,
            reference: visit.reference.to_string(),
            prison_code: visit.prison_code.clone(),
            prisoner_id: visit.prisoner_id.clone(),
            occurred_at: format_timestamp(now),
            event_id,
        };
        debug!(event_type = %event_type, reference = %event.reference, "Publishing visit event");
        self.publisher.publish(&event);
    }
}
