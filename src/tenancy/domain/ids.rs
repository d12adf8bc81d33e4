//! Identifier types for the tenancy domain.

use crate::ids::uuid_identifier;

uuid_identifier!(
    /// Unique identifier for a principal supplied by the identity provider.
    UserId,
    "user"
);

uuid_identifier!(
    /// Unique identifier for a team.
    TeamId,
    "team"
);

uuid_identifier!(
    /// Unique identifier for a project owned by a team.
    ProjectId,
    "project"
);

/// Address of a project nested under its owning team.
///
/// Every board operation is addressed this way so that a project reached
/// through the wrong team resolves to "not found".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProjectPath {
    /// Owning team.
    pub team_id: TeamId,
    /// Project within the team.
    pub project_id: ProjectId,
}

impl ProjectPath {
    /// Creates a project path.
    #[must_use]
    pub const fn new(team_id: TeamId, project_id: ProjectId) -> Self {
        Self {
            team_id,
            project_id,
        }
    }
}
