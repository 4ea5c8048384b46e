// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Backend-agnostic query modules.
//!
//! All queries use Diesel DSL and are generated for every supported backend
//! through `backend_fn!`.
//!
//! ## Module Organization
//!
//! - `reference_data`: Prisons and session templates
//! - `bookings`: Applications, visits, occupancy and conflicts
//! - `audit`: Audit event retrieval

pub mod audit;
pub mod bookings;
pub mod reference_data;

use visit_scheduler_domain::{VisitStatus, VisitSubStatus};

/// Application statuses that still hold a reservation.
pub const IN_PROGRESS_STATUSES: [&str; 2] = [
    VisitStatus::Reserved.as_str(),
    VisitStatus::Changing.as_str(),
];

/// Visit sub-statuses that take up capacity.
pub const CAPACITY_SUB_STATUSES: [&str; 3] = [
    VisitSubStatus::AutoApproved.as_str(),
    VisitSubStatus::Requested.as_str(),
    VisitSubStatus::Approved.as_str(),
];
