//! Shared world state for lane management BDD scenarios.

use std::sync::Arc;

use eyre::{WrapErr, eyre};
use mockable::DefaultClock;
use rstest::fixture;
use taskboard::{
    board::{
        domain::{Lane, LaneId},
        services::{BoardServiceError, LaneDeletion, LaneService, TaskService},
    },
    storage::InMemoryStore,
    tenancy::{
        domain::{Principal, ProjectPath, UserId},
        services::{AccessScopeResolver, ProjectService, TeamService},
    },
};

/// Lane service used by the BDD world.
pub type TestLaneService = LaneService<InMemoryStore, InMemoryStore, DefaultClock>;

/// Task service used by the BDD world.
pub type TestTaskService = TaskService<InMemoryStore, InMemoryStore, DefaultClock>;

/// Scenario world for lane behaviour tests.
pub struct LaneWorld {
    pub teams: TeamService<InMemoryStore, DefaultClock>,
    pub projects: ProjectService<InMemoryStore, DefaultClock>,
    pub lanes: TestLaneService,
    pub tasks: TestTaskService,
    pub owner: Principal,
    pub path: Option<ProjectPath>,
    pub last_error: Option<BoardServiceError>,
    pub last_deletion: Option<LaneDeletion>,
}

impl LaneWorld {
    /// Creates a world over an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        let store = Arc::new(InMemoryStore::new());
        let clock = Arc::new(DefaultClock);
        Self {
            teams: TeamService::new(Arc::clone(&store), Arc::clone(&clock)),
            projects: ProjectService::new(Arc::clone(&store), Arc::clone(&clock)),
            lanes: LaneService::new(
                AccessScopeResolver::new(Arc::clone(&store)),
                Arc::clone(&store),
                Arc::clone(&clock),
            ),
            tasks: TaskService::new(Arc::clone(&store), store, clock),
            owner: Principal::session(UserId::new()),
            path: None,
            last_error: None,
            last_deletion: None,
        }
    }

    /// Returns the project the scenario works in.
    pub fn path(&self) -> Result<ProjectPath, eyre::Report> {
        self.path.ok_or_else(|| eyre!("missing project in scenario world"))
    }

    /// Lists the project's lanes in board order.
    pub fn current_lanes(&self) -> Result<Vec<Lane>, eyre::Report> {
        let path = self.path()?;
        run_async(self.lanes.list_lanes(&self.owner, path)).wrap_err("list lanes")
    }

    /// Looks up a lane by key.
    pub fn lane_id(&self, key: &str) -> Result<LaneId, eyre::Report> {
        self.current_lanes()?
            .iter()
            .find(|lane| lane.key().as_str() == key)
            .map(Lane::id)
            .ok_or_else(|| eyre!("no lane keyed {key}"))
    }
}

impl Default for LaneWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> LaneWorld {
    LaneWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
