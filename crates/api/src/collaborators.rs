// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Collaborators the booking handlers call out to.
//!
//! Prisoner details, non-association rules and event delivery belong to
//! other systems. Handlers only see these traits; the workspace ships an
//! in-memory directory.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::RwLock;
use tracing::debug;
use visit_scheduler_domain::{PrisonerProfile, VisitBalance};

use crate::error::DirectoryError;

/// Looks up prisoner details.
pub trait PrisonerDirectory: Send + Sync {
    /// Returns the prisoner's profile, if known.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be queried.
    fn profile(&self, prisoner_id: &str) -> Result<Option<PrisonerProfile>, DirectoryError>;

    /// Returns the prisoner's remaining visiting orders, if known.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be queried.
    fn visit_balance(&self, prisoner_id: &str) -> Result<Option<VisitBalance>, DirectoryError>;
}

/// Looks up prisoners who must be kept apart.
pub trait NonAssociationDirectory: Send + Sync {
    /// Returns the ids of prisoners non-associated with `prisoner_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be queried.
    fn non_associations(&self, prisoner_id: &str) -> Result<Vec<String>, DirectoryError>;
}

/// Kind of domain event published after a successful transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VisitEventType {
    #[serde(rename = "prison-visit.booked")]
    Booked,
    #[serde(rename = "prison-visit.changed")]
    Changed,
    #[serde(rename = "prison-visit.cancelled")]
    Cancelled,
    #[serde(rename = "prison-visit.request-approved")]
    RequestApproved,
    #[serde(rename = "prison-visit.request-rejected")]
    RequestRejected,
    #[serde(rename = "prison-visit.request-withdrawn")]
    RequestWithdrawn,
    #[serde(rename = "prison-visit.migrated")]
    Migrated,
}

impl VisitEventType {
    /// Returns the published event name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Booked => "prison-visit.booked",
            Self::Changed => "prison-visit.changed",
            Self::Cancelled => "prison-visit.cancelled",
            Self::RequestApproved => "prison-visit.request-approved",
            Self::RequestRejected => "prison-visit.request-rejected",
            Self::RequestWithdrawn => "prison-visit.request-withdrawn",
            Self::Migrated => "prison-visit.migrated",
        }
    }
}

impl std::fmt::Display for VisitEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A domain event about a visit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitEvent {
    pub event_type: VisitEventType,
    pub reference: String,
    pub prison_code: String,
    pub prisoner_id: String,
    /// Prison wall-clock time of the transition.
    pub occurred_at: String,
    /// Audit event that recorded the transition.
    pub event_id: i64,
}

/// Delivers visit events to interested parties.
///
/// Publishing happens after the transition has been committed and must not
/// fail the request, so implementations swallow their own errors.
pub trait VisitEventPublisher: Send + Sync {
    /// Publishes an event.
    fn publish(&self, event: &VisitEvent);
}

/// Seed data for [`InMemoryDirectory`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectorySeed {
    #[serde(default)]
    pub prisoners: Vec<PrisonerProfile>,
    #[serde(default)]
    pub visit_balances: HashMap<String, VisitBalance>,
    /// Pairs of prisoner ids that must be kept apart.
    #[serde(default)]
    pub non_associations: Vec<(String, String)>,
}

#[derive(Debug, Default)]
struct DirectoryData {
    profiles: HashMap<String, PrisonerProfile>,
    balances: HashMap<String, VisitBalance>,
    non_associations: HashMap<String, HashSet<String>>,
}

/// A prisoner and non-association directory held in memory.
///
/// Unknown prisoners have no profile and no balance, so no rule that
/// depends on them excludes a booking.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    data: RwLock<DirectoryData>,
}

fn poisoned() -> DirectoryError {
    DirectoryError(String::from("directory lock poisoned"))
}

impl InMemoryDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a directory from seed data.
    #[must_use]
    pub fn from_seed(seed: DirectorySeed) -> Self {
        let mut data = DirectoryData::default();
        for profile in seed.prisoners {
            data.profiles.insert(profile.prisoner_id.clone(), profile);
        }
        data.balances = seed.visit_balances;
        for (first, second) in seed.non_associations {
            link(&mut data.non_associations, first, second);
        }
        Self {
            data: RwLock::new(data),
        }
    }

    /// Loads a directory from a JSON seed file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_json_file(path: &Path) -> Result<Self, DirectoryError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| DirectoryError(format!("cannot read {}: {e}", path.display())))?;
        let seed: DirectorySeed = serde_json::from_str(&content)
            .map_err(|e| DirectoryError(format!("cannot parse {}: {e}", path.display())))?;
        debug!(
            prisoners = seed.prisoners.len(),
            non_associations = seed.non_associations.len(),
            "Loaded directory seed"
        );
        Ok(Self::from_seed(seed))
    }

    /// Adds or replaces a prisoner profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory lock is poisoned.
    pub fn set_profile(&self, profile: PrisonerProfile) -> Result<(), DirectoryError> {
        let mut data = self.data.write().map_err(|_| poisoned())?;
        data.profiles.insert(profile.prisoner_id.clone(), profile);
        Ok(())
    }

    /// Sets a prisoner's visiting-order balance.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory lock is poisoned.
    pub fn set_visit_balance(
        &self,
        prisoner_id: &str,
        balance: VisitBalance,
    ) -> Result<(), DirectoryError> {
        let mut data = self.data.write().map_err(|_| poisoned())?;
        data.balances.insert(prisoner_id.to_string(), balance);
        Ok(())
    }

    /// Records that two prisoners must be kept apart.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory lock is poisoned.
    pub fn add_non_association(&self, first: &str, second: &str) -> Result<(), DirectoryError> {
        let mut data = self.data.write().map_err(|_| poisoned())?;
        link(
            &mut data.non_associations,
            first.to_string(),
            second.to_string(),
        );
        Ok(())
    }
}

fn link(pairs: &mut HashMap<String, HashSet<String>>, first: String, second: String) {
    pairs
        .entry(first.clone())
        .or_default()
        .insert(second.clone());
    pairs.entry(second).or_default().insert(first);
}

impl PrisonerDirectory for InMemoryDirectory {
    fn profile(&self, prisoner_id: &str) -> Result<Option<PrisonerProfile>, DirectoryError> {
        let data = self.data.read().map_err(|_| poisoned())?;
        Ok(data.profiles.get(prisoner_id).cloned())
    }

    fn visit_balance(&self, prisoner_id: &str) -> Result<Option<VisitBalance>, DirectoryError> {
        let data = self.data.read().map_err(|_| poisoned())?;
        Ok(data.balances.get(prisoner_id).copied())
    }
}

impl NonAssociationDirectory for InMemoryDirectory {
    fn non_associations(&self, prisoner_id: &str) -> Result<Vec<String>, DirectoryError> {
        let data = self.data.read().map_err(|_| poisoned())?;
        let mut ids: Vec<String> = data
            .non_associations
            .get(prisoner_id)
            .map(|ids| ids.iter().cloned().collect())
            .unwrap_or_default();
        ids.sort();
        Ok(ids)
    }
}
