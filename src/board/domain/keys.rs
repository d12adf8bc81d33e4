//! Lane keys, local task identifiers and human-readable task keys.

use super::BoardDomainError;
use crate::tenancy::domain::slugify;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum lane key length, matching `VARCHAR(64)`.
const MAX_LANE_KEY_LENGTH: usize = 64;

/// Maximum number of letters in a project acronym.
const MAX_ACRONYM_LENGTH: usize = 3;

/// Acronym used when a project name has no significant words.
const FALLBACK_ACRONYM: &str = "TSK";

/// Words skipped when deriving a project acronym.
const STOP_WORDS: &[&str] = &["a", "an", "and", "for", "in", "of", "on", "the", "to"];

/// Machine key of a lane, unique within its project. Task status values
/// reference lanes by this key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LaneKey(pub(super) String);

impl LaneKey {
    /// Validates an explicit lane key.
    ///
    /// # Errors
    ///
    /// Returns [`BoardDomainError::InvalidLaneKey`] unless the value is a
    /// non-empty slug of at most 64 characters.
    pub fn new(value: impl Into<String>) -> Result<Self, BoardDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        let is_valid = !trimmed.is_empty()
            && trimmed.len() <= MAX_LANE_KEY_LENGTH
            && slugify(trimmed) == trimmed;
        if !is_valid {
            return Err(BoardDomainError::InvalidLaneKey(raw));
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Derives a key from a lane name: `"My New Lane"` becomes
    /// `"my-new-lane"`.
    ///
    /// # Errors
    ///
    /// Returns [`BoardDomainError::InvalidLaneKey`] when the name has no
    /// ASCII alphanumeric characters.
    pub fn derive(name: &str) -> Result<Self, BoardDomainError> {
        let slug: String = slugify(name).chars().take(MAX_LANE_KEY_LENGTH).collect();
        Self::new(slug.trim_end_matches('-').to_owned())
            .map_err(|_| BoardDomainError::InvalidLaneKey(name.to_owned()))
    }

    /// Returns the key as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for LaneKey {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for LaneKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Per-project task number, starting at one and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocalId(u64);

impl LocalId {
    /// Largest value representable in the `PostgreSQL` schema.
    const MAX_PERSISTED_VALUE: u64 = i64::MAX.unsigned_abs();

    /// Creates a validated local identifier.
    ///
    /// # Errors
    ///
    /// Returns [`BoardDomainError::InvalidLocalId`] for zero or values beyond
    /// `i64::MAX`.
    pub const fn new(value: u64) -> Result<Self, BoardDomainError> {
        if value == 0 || value > Self::MAX_PERSISTED_VALUE {
            return Err(BoardDomainError::InvalidLocalId(value));
        }
        Ok(Self(value))
    }

    /// Returns the numeric value.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for LocalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Uppercased initials of up to three significant words of a project name.
///
/// `"Apollo Booster Campaign"` becomes `"ABC"`; stop words such as "the"
/// are skipped and a name without significant words yields `"TSK"`.
#[must_use]
pub fn project_acronym(project_name: &str) -> String {
    let acronym: String = project_name
        .split(|ch: char| !ch.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .filter(|word| !STOP_WORDS.contains(&word.to_lowercase().as_str()))
        .filter_map(|word| word.chars().next())
        .flat_map(char::to_uppercase)
        .take(MAX_ACRONYM_LENGTH)
        .collect();
    if acronym.is_empty() {
        FALLBACK_ACRONYM.to_owned()
    } else {
        acronym
    }
}

/// Human-readable task key such as `"ABC-07"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskKey {
    acronym: String,
    local_id: LocalId,
}

impl TaskKey {
    /// Builds the key for a task of the named project.
    #[must_use]
    pub fn new(project_name: &str, local_id: LocalId) -> Self {
        Self {
            acronym: project_acronym(project_name),
            local_id,
        }
    }

    /// Returns the project acronym part.
    #[must_use]
    pub fn acronym(&self) -> &str {
        &self.acronym
    }

    /// Returns the local identifier part.
    #[must_use]
    pub const fn local_id(&self) -> LocalId {
        self.local_id
    }
}

impl fmt::Display for TaskKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.acronym, self.local_id.value())
    }
}
