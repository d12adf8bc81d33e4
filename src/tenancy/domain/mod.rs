//! Domain model for teams, memberships and projects.
//!
//! Tenancy types are validated at construction so that repository adapters
//! only ever hand strongly typed aggregates to the services.

mod error;
mod ids;
mod principal;
mod project;
mod slug;
mod team;

pub use error::{ParseTeamRoleError, TenancyDomainError};
pub use ids::{ProjectId, ProjectPath, TeamId, UserId};
pub use principal::{AuthMethod, Principal};
pub use project::{FIRST_TASK_SEQUENCE, PersistedProjectData, Project, ProjectName};
pub use slug::{Slug, slugify};
pub use team::{PersistedTeamData, Team, TeamMembership, TeamName, TeamRole};
