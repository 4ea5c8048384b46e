// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Backend-agnostic mutation modules.
//!
//! ## Module Organization
//!
//! - `reference_data`: Prison and session template upserts
//! - `bookings`: Application and visit upserts, expiry sweep
//! - `audit`: Audit event inserts
//! - `transition`: Atomic persistence of a `TransitionResult`
//!
//! Upserts check for an existing row by natural reference and then update
//! or insert, which works the same on every backend.

pub mod audit;
pub mod bookings;
pub mod reference_data;
pub mod transition;

pub use transition::{persist_transition_mysql, persist_transition_sqlite};
