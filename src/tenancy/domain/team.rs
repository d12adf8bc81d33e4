//! Team aggregate and membership types.

use super::{ParseTeamRoleError, Slug, TeamId, TenancyDomainError, UserId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum team and project name length, matching `VARCHAR(200)`.
pub(crate) const MAX_NAME_LENGTH: usize = 200;

/// Validated team display name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamName(String);

impl TeamName {
    /// Creates a validated team name.
    ///
    /// # Errors
    ///
    /// Returns [`TenancyDomainError::EmptyTeamName`] for blank input and
    /// [`TenancyDomainError::NameTooLong`] beyond 200 characters.
    pub fn new(value: impl Into<String>) -> Result<Self, TenancyDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(TenancyDomainError::EmptyTeamName);
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

impl fmt::Display for TeamName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Role a principal holds within a team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeamRole {
    /// Designated team owner.
    Owner,
    /// Member allowed to manage memberships and projects.
    Admin,
    /// Regular member.
    Member,
}

impl TeamRole {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Admin => "admin",
            Self::Member => "member",
        }
    }

    const fn rank(self) -> u8 {
        match self {
            Self::Owner => 2,
            Self::Admin => 1,
            Self::Member => 0,
        }
    }

    /// Returns `true` when this role grants at least the privileges of
    /// `minimum`.
    #[must_use]
    pub const fn at_least(self, minimum: Self) -> bool {
        self.rank() >= minimum.rank()
    }
}

impl TryFrom<&str> for TeamRole {
    type Error = ParseTeamRoleError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "owner" => Ok(Self::Owner),
            "admin" => Ok(Self::Admin),
            "member" => Ok(Self::Member),
            _ => Err(ParseTeamRoleError(value.to_owned())),
        }
    }
}

impl fmt::Display for TeamRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Team aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    id: TeamId,
    name: TeamName,
    owner_id: UserId,
    slug: Slug,
    created_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted team.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTeamData {
    /// Persisted team identifier.
    pub id: TeamId,
    /// Persisted display name.
    pub name: TeamName,
    /// Persisted owner.
    pub owner_id: UserId,
    /// Persisted slug.
    pub slug: Slug,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Team {
    /// Creates a new team owned by `owner_id`.
    ///
    /// The slug is derived from the name unless one is supplied.
    ///
    /// # Errors
    ///
    /// Returns [`TenancyDomainError::InvalidSlug`] when no slug can be derived.
    pub fn new(
        name: TeamName,
        owner_id: UserId,
        slug: Option<Slug>,
        clock: &impl Clock,
    ) -> Result<Self, TenancyDomainError> {
        let resolved_slug = match slug {
            Some(explicit) => explicit,
            None => Slug::derive(name.as_str())?,
        };
        Ok(Self {
            id: TeamId::new(),
            name,
            owner_id,
            slug: resolved_slug,
            created_at: clock.utc(),
        })
    }

    /// Reconstructs a team from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTeamData) -> Self {
        Self {
            id: data.id,
            name: data.name,
            owner_id: data.owner_id,
            slug: data.slug,
            created_at: data.created_at,
        }
    }

    /// Returns the team identifier.
    #[must_use]
    pub const fn id(&self) -> TeamId {
        self.id
    }

    /// Returns the display name.
    #[must_use]
    pub const fn name(&self) -> &TeamName {
        &self.name
    }

    /// Returns the designated owner.
    #[must_use]
    pub const fn owner_id(&self) -> UserId {
        self.owner_id
    }

    /// Returns the slug.
    #[must_use]
    pub const fn slug(&self) -> &Slug {
        &self.slug
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the implicit membership of the designated owner.
    #[must_use]
    pub const fn owner_membership(&self) -> TeamMembership {
        TeamMembership {
            team_id: self.id,
            user_id: self.owner_id,
            role: TeamRole::Owner,
            created_at: self.created_at,
        }
    }
}

/// Membership of a principal in a team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMembership {
    team_id: TeamId,
    user_id: UserId,
    role: TeamRole,
    created_at: DateTime<Utc>,
}

impl TeamMembership {
    /// Creates a membership granted by an administrator.
    ///
    /// # Errors
    ///
    /// Returns [`TenancyDomainError::OwnerRoleReserved`] when `role` is
    /// [`TeamRole::Owner`]; ownership only comes from the team record.
    pub fn grant(
        team_id: TeamId,
        user_id: UserId,
        role: TeamRole,
        clock: &impl Clock,
    ) -> Result<Self, TenancyDomainError> {
        if role == TeamRole::Owner {
            return Err(TenancyDomainError::OwnerRoleReserved);
        }
        Ok(Self {
            team_id,
            user_id,
            role,
            created_at: clock.utc(),
        })
    }

    /// Reconstructs a membership from persisted storage.
    #[must_use]
    pub const fn from_persisted(
        team_id: TeamId,
        user_id: UserId,
        role: TeamRole,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            team_id,
            user_id,
            role,
            created_at,
        }
    }

    /// Returns the team identifier.
    #[must_use]
    pub const fn team_id(&self) -> TeamId {
        self.team_id
    }

    /// Returns the member's user identifier.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the member's role.
    #[must_use]
    pub const fn role(&self) -> TeamRole {
        self.role
    }

    /// Returns when the membership was granted.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
