//! Project aggregate owned by a team.

use super::{ProjectId, Slug, TeamId, TenancyDomainError, team::MAX_NAME_LENGTH};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Validated project display name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectName(String);

impl ProjectName {
    /// Creates a validated project name.
    ///
    /// # Errors
    ///
    /// Returns [`TenancyDomainError::EmptyProjectName`] for blank input and
    /// [`TenancyDomainError::NameTooLong`] beyond 200 characters.
    pub fn new(value: impl Into<String>) -> Result<Self, TenancyDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(TenancyDomainError::EmptyProjectName);
        }
        if trimmed.chars().count() > MAX_NAME_LENGTH {
            return Err(TenancyDomainError::NameTooLong {
                max: MAX_NAME_LENGTH,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the name as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// First value handed out by a project's task sequence.
pub const FIRST_TASK_SEQUENCE: u64 = 1;

/// Project aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    id: ProjectId,
    team_id: TeamId,
    name: ProjectName,
    slug: Slug,
    task_sequence: u64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedProjectData {
    /// Persisted project identifier.
    pub id: ProjectId,
    /// Owning team.
    pub team_id: TeamId,
    /// Persisted display name.
    pub name: ProjectName,
    /// Persisted slug, unique per team.
    pub slug: Slug,
    /// Next local task identifier to hand out.
    pub task_sequence: u64,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Creates a new project within a team.
    ///
    /// # Errors
    ///
    /// Returns [`TenancyDomainError::InvalidSlug`] when no slug is supplied
    /// and none can be derived from the name.
    pub fn new(
        team_id: TeamId,
        name: ProjectName,
        slug: Option<Slug>,
        clock: &impl Clock,
    ) -> Result<Self, TenancyDomainError> {
        let resolved_slug = match slug {
            Some(explicit) => explicit,
            None => Slug::derive(name.as_str())?,
        };
        let timestamp = clock.utc();
        Ok(Self {
            id: ProjectId::new(),
            team_id,
            name,
            slug: resolved_slug,
            task_sequence: FIRST_TASK_SEQUENCE,
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Reconstructs a project from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedProjectData) -> Self {
        Self {
            id: data.id,
            team_id: data.team_id,
            name: data.name,
            slug: data.slug,
            task_sequence: data.task_sequence,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the project identifier.
    #[must_use]
    pub const fn id(&self) -> ProjectId {
        self.id
    }

    /// Returns the owning team.
    #[must_use]
    pub const fn team_id(&self) -> TeamId {
        self.team_id
    }

    /// Returns the display name.
    #[must_use]
    pub const fn name(&self) -> &ProjectName {
        &self.name
    }

    /// Returns the slug.
    #[must_use]
    pub const fn slug(&self) -> &Slug {
        &self.slug
    }

    /// Returns the next local task identifier the project will hand out.
    #[must_use]
    pub const fn task_sequence(&self) -> u64 {
        self.task_sequence
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Renames the project, optionally replacing its slug.
    pub fn rename(&mut self, name: ProjectName, slug: Option<Slug>, clock: &impl Clock) {
        self.name = name;
        if let Some(new_slug) = slug {
            self.slug = new_slug;
        }
        self.updated_at = clock.utc();
    }

    /// Returns the current task sequence value and advances the counter.
    pub(crate) const fn take_task_sequence(&mut self) -> u64 {
        let current = self.task_sequence;
        self.task_sequence = current.saturating_add(1);
        current
    }
}
