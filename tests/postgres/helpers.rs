//! Shared helpers for `PostgreSQL` integration tests.

use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use mockable::DefaultClock;
use pg_embedded_setup_unpriv::TestCluster;
use std::sync::Arc;
use taskboard::{
    board::services::{LaneService, TaskService},
    storage::PostgresStore,
    tenancy::{
        domain::{Principal, ProjectPath, UserId},
        services::{
            AccessScopeResolver, CreateProjectRequest, CreateTeamRequest, ProjectService,
            TeamService,
        },
    },
};
use tokio::runtime::Runtime;

/// Boxed error returned by test bodies.
pub type TestResult<T = ()> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Schema applied to the template database.
const CREATE_BOARD_SQL: &str =
    include_str!("../../migrations/2026-01-05-120000_create_board/up.sql");

/// Template database name for the pre-migrated schema.
const TEMPLATE_DB: &str = "taskboard_test_template";

/// Connections per store; enough for concurrent writers to overlap.
const POOL_SIZE: u32 = 8;

/// Creates a multi-threaded runtime so spawned writers run in parallel.
///
/// # Errors
///
/// Returns an error if the runtime cannot be created.
pub fn test_runtime() -> TestResult<Runtime> {
    Ok(tokio::runtime::Builder::new_multi_thread()
        .worker_threads(4)
        .enable_all()
        .build()?)
}

fn ensure_template(cluster: &TestCluster) -> TestResult {
    cluster
        .ensure_template_exists(TEMPLATE_DB, |db_name| {
            let url = cluster.connection().database_url(db_name);
            let mut conn = PgConnection::establish(&url).map_err(|e| eyre::eyre!("{e}"))?;
            conn.batch_execute(CREATE_BOARD_SQL)
                .map_err(|e| eyre::eyre!("schema setup failed: {e}"))?;
            Ok(())
        })
        .map_err(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>)?;
    Ok(())
}

/// Drops the test database even when the test panics.
pub struct CleanupGuard<'a> {
    cluster: &'a TestCluster,
    db_name: String,
}

impl Drop for CleanupGuard<'_> {
    fn drop(&mut self) {
        if let Err(err) = self.cluster.drop_database(self.db_name.as_str()) {
            tracing::warn!(db = %self.db_name, error = %err, "failed to drop test database");
        }
    }
}

/// Every service wired to one store over a fresh database.
pub struct PgBoard<'a> {
    pub store: Arc<PostgresStore>,
    pub teams: TeamService<PostgresStore, DefaultClock>,
    pub projects: ProjectService<PostgresStore, DefaultClock>,
    pub lanes: LaneService<PostgresStore, PostgresStore, DefaultClock>,
    pub tasks: TaskService<PostgresStore, PostgresStore, DefaultClock>,
    _guard: CleanupGuard<'a>,
}

/// Creates a database from the template and wires the services over it.
///
/// # Errors
///
/// Returns an error if template setup, database creation or pooling fails.
pub fn pg_board<'a>(cluster: &'a TestCluster, label: &str) -> TestResult<PgBoard<'a>> {
    ensure_template(cluster)?;
    let db_name = format!("test_{label}_{}", uuid::Uuid::new_v4().simple());
    cluster
        .create_database_from_template(db_name.as_str(), TEMPLATE_DB)
        .map_err(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>)?;
    let guard = CleanupGuard {
        cluster,
        db_name: db_name.clone(),
    };
    let url = cluster.connection().database_url(&db_name);
    let store = Arc::new(PostgresStore::connect(&url, POOL_SIZE)?);
    let clock = Arc::new(DefaultClock);
    Ok(PgBoard {
        teams: TeamService::new(Arc::clone(&store), Arc::clone(&clock)),
        projects: ProjectService::new(Arc::clone(&store), Arc::clone(&clock)),
        lanes: LaneService::new(
            AccessScopeResolver::new(Arc::clone(&store)),
            Arc::clone(&store),
            Arc::clone(&clock),
        ),
        tasks: TaskService::new(Arc::clone(&store), Arc::clone(&store), clock),
        store,
        _guard: guard,
    })
}

/// Creates a team and a project owned by a fresh user.
///
/// # Errors
///
/// Returns an error if either cannot be stored.
pub fn owned_project(
    rt: &Runtime,
    board: &PgBoard<'_>,
    name: &str,
) -> TestResult<(Principal, ProjectPath)> {
    let owner = Principal::session(UserId::new());
    let team = rt.block_on(board.teams.create_team(&owner, CreateTeamRequest::new("Launch")))?;
    let project = rt.block_on(board.projects.create_project(
        &owner,
        team.id(),
        CreateProjectRequest::new(name),
    ))?;
    Ok((owner, ProjectPath::new(team.id(), project.id())))
}
