//! Application services for tenancy: scope resolution, teams and projects.

mod error;
mod projects;
mod scope;
mod teams;

pub use error::{TenancyServiceError, TenancyServiceResult};
pub use projects::{CreateProjectRequest, ProjectService, UpdateProjectRequest};
pub use scope::{AccessScopeResolver, ProjectScope, TeamScope};
pub use teams::{AddMemberRequest, CreateTeamRequest, TeamService};
