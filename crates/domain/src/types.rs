// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Generates `as_str`, `FromStr` and `Display` for a fieldless enum whose
/// persisted form is a fixed upper-case token.
macro_rules! coded_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $($(#[$vmeta:meta])* $variant:ident => $code:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $code)]
                $variant,
            )+
        }

        impl $name {
            /// Returns the persisted string form.
            #[must_use]
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $code,)+
                }
            }
        }

        impl FromStr for $name {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($code => Ok(Self::$variant),)+
                    _ => Err(DomainError::InvalidEnumValue {
                        kind: $kind,
                        value: s.to_string(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }
    };
}

coded_enum! {
    /// Who created or owns a booking.
    UserType, "user type" {
        /// Prison staff using the staff booking tool.
        Staff => "STAFF",
        /// A member of the public booking online.
        Public => "PUBLIC",
        /// An automated process such as migration.
        System => "SYSTEM",
    }
}

coded_enum! {
    /// Kind of visit a session offers.
    VisitType, "visit type" {
        /// A standard social visit.
        Social => "SOCIAL",
        /// A family visit day.
        Family => "FAMILY",
    }
}

coded_enum! {
    /// Whether visitors and prisoner share the room or are separated.
    VisitRestriction, "visit restriction" {
        /// Open visit.
        Open => "OPEN",
        /// Closed visit behind a screen.
        Closed => "CLOSED",
    }
}

coded_enum! {
    /// Prisoner incentive level.
    IncentiveLevel, "incentive level" {
        /// Basic.
        Basic => "BASIC",
        /// Standard.
        Standard => "STANDARD",
        /// Enhanced.
        Enhanced => "ENHANCED",
        /// Enhanced 2.
        Enhanced2 => "ENHANCED_2",
        /// Enhanced 3.
        Enhanced3 => "ENHANCED_3",
    }
}

coded_enum! {
    /// Prisoner security category.
    PrisonerCategory, "prisoner category" {
        /// Category A, exceptional risk.
        AExceptional => "A_EXCEPTIONAL",
        /// Category A, high risk.
        AHigh => "A_HIGH",
        /// Category A, provisional.
        AProvisional => "A_PROVISIONAL",
        /// Category A, standard risk.
        AStandard => "A_STANDARD",
        /// Category B.
        B => "B",
        /// Category C.
        C => "C",
        /// Category D (open conditions).
        D => "D",
        /// Young offender, closed.
        YoiClosed => "YOI_CLOSED",
        /// Young offender, open.
        YoiOpen => "YOI_OPEN",
        /// Young offender, restricted.
        YoiRestricted => "YOI_RESTRICTED",
        /// Female, restricted.
        FemaleRestricted => "FEMALE_RESTRICTED",
        /// Female, closed.
        FemaleClosed => "FEMALE_CLOSED",
        /// Female, semi-open.
        FemaleSemi => "FEMALE_SEMI",
        /// Female, open.
        FemaleOpen => "FEMALE_OPEN",
    }
}

coded_enum! {
    /// How the booker contacted the prison.
    ApplicationMethod, "application method" {
        /// Telephone.
        Phone => "PHONE",
        /// Online booking.
        Website => "WEBSITE",
        /// Email.
        Email => "EMAIL",
        /// At the prison.
        InPerson => "IN_PERSON",
        /// Requested by the prisoner.
        ByPrisoner => "BY_PRISONER",
        /// Not recorded.
        NotKnown => "NOT_KNOWN",
        /// Not applicable (automated processes).
        NotApplicable => "NOT_APPLICABLE",
    }
}

coded_enum! {
    /// Why a visit ended.
    OutcomeStatus, "outcome status" {
        /// Cancelled for administrative reasons.
        AdministrativeCancellation => "ADMINISTRATIVE_CANCELLATION",
        /// Cancelled by the online booker.
        BookerCancelled => "BOOKER_CANCELLED",
        /// Cancelled by the establishment.
        EstablishmentCancelled => "ESTABLISHMENT_CANCELLED",
        /// Cancelled by the prisoner.
        PrisonerCancelled => "PRISONER_CANCELLED",
        /// Cancelled by a visitor.
        VisitorCancelled => "VISITOR_CANCELLED",
        /// Replaced by another visit.
        SupersededCancellation => "SUPERSEDED_CANCELLATION",
        /// Visit took place.
        CompletedNormally => "COMPLETED_NORMALLY",
        /// Request rejected by staff.
        RequestRejected => "REQUEST_REJECTED",
        /// Request withdrawn by the booker.
        RequestWithdrawn => "REQUEST_WITHDRAWN",
        /// Outcome was not recorded in the legacy system.
        NotRecorded => "NOT_RECORDED",
    }
}

coded_enum! {
    /// Category of a free-text visit note.
    VisitNoteType, "visit note type" {
        /// Concern raised about a visitor.
        VisitorConcern => "VISITOR_CONCERN",
        /// Outcome narrative.
        VisitOutcomes => "VISIT_OUTCOMES",
        /// General comment.
        VisitComment => "VISIT_COMMENT",
        /// Reason recorded with a status change.
        StatusChangedReason => "STATUS_CHANGED_REASON",
    }
}

impl UserType {
    /// Staff may book from today and are not blocked by non-associations.
    #[must_use]
    pub const fn is_staff(&self) -> bool {
        matches!(self, Self::Staff)
    }
}

impl IncentiveLevel {
    /// Returns true for any of the enhanced levels.
    #[must_use]
    pub const fn is_enhanced(&self) -> bool {
        matches!(self, Self::Enhanced | Self::Enhanced2 | Self::Enhanced3)
    }
}

/// A visitor on a booking, identified by their contact id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Visitor {
    /// Legacy contact person id.
    pub nomis_person_id: i64,
    /// Whether this visitor is the main contact.
    #[serde(default)]
    pub visit_contact: bool,
}

impl Visitor {
    /// Creates a new `Visitor`.
    #[must_use]
    pub const fn new(nomis_person_id: i64, visit_contact: bool) -> Self {
        Self {
            nomis_person_id,
            visit_contact,
        }
    }
}

/// Contact details for the lead visitor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitContact {
    pub name: String,
    #[serde(default)]
    pub telephone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Free-text support requirements (e.g. wheelchair access).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitorSupport {
    pub description: String,
}

/// A note attached to a visit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitNote {
    #[serde(rename = "type")]
    pub note_type: VisitNoteType,
    pub text: String,
}

impl VisitNote {
    /// Creates a new `VisitNote`.
    #[must_use]
    pub const fn new(note_type: VisitNoteType, text: String) -> Self {
        Self { note_type, text }
    }
}
