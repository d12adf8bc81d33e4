//! Shared test helpers for in-memory store integration tests.

use mockable::DefaultClock;
use rstest::fixture;
use std::io;
use std::sync::Arc;
use taskboard::{
    board::services::{LaneService, TaskService},
    storage::InMemoryStore,
    tenancy::{
        domain::{Principal, ProjectPath, TeamId, UserId},
        services::{
            AccessScopeResolver, AddMemberRequest, CreateProjectRequest, CreateTeamRequest,
            ProjectService, TeamService,
        },
    },
};
use tokio::runtime::Runtime;

/// Boxed error returned by test bodies.
pub type TestResult<T = ()> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Task service over the in-memory store.
pub type Tasks = TaskService<InMemoryStore, InMemoryStore, DefaultClock>;

/// Lane service over the in-memory store.
pub type Lanes = LaneService<InMemoryStore, InMemoryStore, DefaultClock>;

/// Every service wired to one shared in-memory store.
pub struct Board {
    pub teams: TeamService<InMemoryStore, DefaultClock>,
    pub projects: ProjectService<InMemoryStore, DefaultClock>,
    pub lanes: Lanes,
    pub tasks: Tasks,
}

/// Provides a multi-threaded tokio runtime so spawned work runs in
/// parallel.
///
/// # Errors
///
/// Returns an error if the runtime cannot be created.
#[fixture]
pub fn runtime() -> io::Result<Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(4)
        .enable_all()
        .build()
}

/// Provides services over a fresh store for each test.
#[fixture]
pub fn board() -> Board {
    let store = Arc::new(InMemoryStore::new());
    let clock = Arc::new(DefaultClock);
    Board {
        teams: TeamService::new(Arc::clone(&store), Arc::clone(&clock)),
        projects: ProjectService::new(Arc::clone(&store), Arc::clone(&clock)),
        lanes: LaneService::new(
            AccessScopeResolver::new(Arc::clone(&store)),
            Arc::clone(&store),
            Arc::clone(&clock),
        ),
        tasks: TaskService::new(Arc::clone(&store), store, clock),
    }
}

/// Provides a fresh session principal.
#[fixture]
pub fn owner() -> Principal {
    Principal::session(UserId::new())
}

/// Creates a team owned by `owner`.
///
/// # Errors
///
/// Returns an error if the team cannot be stored.
pub fn team_for(rt: &Runtime, board: &Board, owner: &Principal, name: &str) -> TestResult<TeamId> {
    let team = rt.block_on(board.teams.create_team(owner, CreateTeamRequest::new(name)))?;
    Ok(team.id())
}

/// Creates a project inside `team_id`.
///
/// # Errors
///
/// Returns an error if the project cannot be stored.
pub fn project_in(
    rt: &Runtime,
    board: &Board,
    principal: &Principal,
    team_id: TeamId,
    name: &str,
) -> TestResult<ProjectPath> {
    let project = rt.block_on(board.projects.create_project(
        principal,
        team_id,
        CreateProjectRequest::new(name),
    ))?;
    Ok(ProjectPath::new(team_id, project.id()))
}

/// Adds `member` to `team_id` with the given role.
///
/// # Errors
///
/// Returns an error if the membership cannot be stored.
pub fn join(
    rt: &Runtime,
    board: &Board,
    admin: &Principal,
    team_id: TeamId,
    member: &Principal,
    role: &str,
) -> TestResult {
    rt.block_on(board.teams.add_member(
        admin,
        team_id,
        AddMemberRequest::new(member.user_id(), role),
    ))?;
    Ok(())
}
