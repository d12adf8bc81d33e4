//! Keys of observed collections.

use crate::tenancy::domain::{ProjectPath, TeamId};
use std::fmt;

/// Identifies one shared, observed collection on the client.
///
/// Every consumer of a collection reads through the same key, so a write to
/// the key is visible to all of them at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionKey {
    /// Tasks of one project.
    ProjectTasks(ProjectPath),
    /// Lanes of one project.
    ProjectLanes(ProjectPath),
    /// Projects of one team.
    TeamProjects(TeamId),
}

impl fmt::Display for CollectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ProjectTasks(path) => write!(f, "tasks:{}", path.project_id),
            Self::ProjectLanes(path) => write!(f, "lanes:{}", path.project_id),
            Self::TeamProjects(team_id) => write!(f, "projects:{team_id}"),
        }
    }
}
