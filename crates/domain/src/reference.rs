// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Booking and application references.
//!
//! References are four groups of two lower-case letters joined by hyphens,
//! for example `ab-cd-ef-gh`.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

const GROUPS: usize = 4;
const LETTERS_PER_GROUP: usize = 2;
const ALPHABET: &[u8; 26] = b"abcdefghijklmnopqrstuvwxyz";

/// A validated visit or application reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Reference(String);

impl Reference {
    /// Parses and validates a reference.
    ///
    /// Surrounding whitespace is trimmed and letters are lower-cased.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidReference` if the value is not of the
    /// form `xx-xx-xx-xx`.
    pub fn parse(value: &str) -> Result<Self, DomainError> {
        let normalized = value.trim().to_ascii_lowercase();
        let groups: Vec<&str> = normalized.split('-').collect();

        let well_formed = groups.len() == GROUPS
            && groups.iter().all(|group| {
                group.len() == LETTERS_PER_GROUP && group.bytes().all(|b| b.is_ascii_lowercase())
            });

        if !well_formed {
            return Err(DomainError::InvalidReference(value.to_string()));
        }

        Ok(Self(normalized))
    }

    /// Builds a reference from 64 bits of entropy.
    ///
    /// The caller supplies the randomness so this stays deterministic.
    #[must_use]
    pub fn from_entropy(mut entropy: u64) -> Self {
        let mut value = String::with_capacity(GROUPS * (LETTERS_PER_GROUP + 1));
        for group in 0..GROUPS {
            if group > 0 {
                value.push('-');
            }
            for _ in 0..LETTERS_PER_GROUP {
                let index = usize::try_from(entropy % 26).unwrap_or_default();
                value.push(char::from(ALPHABET[index]));
                entropy /= 26;
            }
        }
        Self(value)
    }

    /// Returns the reference as a string slice.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.0
    }
}

impl FromStr for Reference {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Reference {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Reference> for String {
    fn from(reference: Reference) -> Self {
        reference.0
    }
}

impl std::fmt::Display for Reference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_well_formed_reference() {
        let reference = Reference::parse("ab-cd-ef-gh").unwrap();
        assert_eq!(reference.value(), "ab-cd-ef-gh");
    }

    #[test]
    fn test_parse_normalizes_case_and_whitespace() {
        let reference = Reference::parse("  AB-cd-EF-gh ").unwrap();
        assert_eq!(reference.value(), "ab-cd-ef-gh");
    }

    #[test]
    fn test_parse_rejects_malformed_references() {
        for bad in ["", "abcdefgh", "ab-cd-ef", "ab-cd-ef-g1", "ab-cd-ef-ghi", "ab-cd-ef-gh-ij"] {
            assert!(Reference::parse(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_from_entropy_is_deterministic_and_valid() {
        let a = Reference::from_entropy(123_456_789);
        let b = Reference::from_entropy(123_456_789);
        assert_eq!(a, b);
        assert!(Reference::parse(a.value()).is_ok());
        assert_eq!(Reference::from_entropy(0).value(), "aa-aa-aa-aa");
    }

    #[test]
    fn test_different_entropy_gives_different_references() {
        assert_ne!(Reference::from_entropy(1), Reference::from_entropy(2));
    }
}
