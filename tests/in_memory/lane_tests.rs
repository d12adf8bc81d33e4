//! Lane lifecycle tests for the in-memory store.

use crate::in_memory::helpers::{
    Board, Lanes, TestResult, board, owner, project_in, runtime, team_for,
};
use async_trait::async_trait;
use mockable::DefaultClock;
use rstest::rstest;
use std::io;
use std::sync::{Arc, Mutex};
use taskboard::{
    board::{
        domain::{
            Lane, LaneId, LaneKey, LocalId, SortOrder, Task, TaskDraft, TaskId, TaskPriority,
            TaskTitle,
        },
        ports::{BoardRepository, BoardRepositoryError, BoardRepositoryResult},
        services::{
            BoardServiceError, CreateTaskRequest, LaneService, MoveTaskRequest, TaskService,
            UpdateLaneRequest,
        },
    },
    storage::InMemoryStore,
    tenancy::{
        domain::{Principal, ProjectId, ProjectPath, UserId},
        services::{
            AccessScopeResolver, CreateProjectRequest, CreateTeamRequest, ProjectService,
            TeamService,
        },
    },
};
use tokio::runtime::Runtime;

/// Concurrent first reads seed the default lanes exactly once.
#[rstest]
fn concurrent_first_reads_seed_once(
    runtime: io::Result<Runtime>,
    board: Board,
    owner: Principal,
) -> TestResult {
    let rt = runtime?;
    let team_id = team_for(&rt, &board, &owner, "Launch")?;
    let path = project_in(&rt, &board, &owner, team_id, "Apollo")?;

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let lanes = board.lanes.clone();
            rt.spawn(async move { lanes.list_lanes(&owner, path).await })
        })
        .collect();
    for handle in handles {
        rt.block_on(handle)??;
    }

    let lanes = rt.block_on(board.lanes.list_lanes(&owner, path))?;
    let keys: Vec<_> = lanes.iter().map(|lane| lane.key().as_str()).collect();
    assert_eq!(keys, vec!["todo", "doing", "done"]);
    Ok(())
}

/// Without another default lane, tasks fall back to the first remaining
/// lane.
#[rstest]
fn deleting_the_default_lane_falls_back_to_first_remaining(
    runtime: io::Result<Runtime>,
    board: Board,
    owner: Principal,
) -> TestResult {
    let rt = runtime?;
    let team_id = team_for(&rt, &board, &owner, "Launch")?;
    let path = project_in(&rt, &board, &owner, team_id, "Apollo")?;
    let created = rt.block_on(board.tasks.create_task(&owner, path, CreateTaskRequest::new("Stage")))?;
    let todo = rt
        .block_on(board.lanes.list_lanes(&owner, path))?
        .into_iter()
        .find(|lane| lane.is_default())
        .ok_or("seeded lanes have a default")?;

    let deletion = rt.block_on(board.lanes.delete_lane(&owner, path, todo.id()))?;
    let moved = rt.block_on(board.tasks.get_task(&owner, path, created.task.id()))?;

    assert_eq!(deletion.fallback.as_str(), "doing");
    assert_eq!(deletion.reassigned, 1);
    assert_eq!(moved.task.status().as_str(), "doing");
    Ok(())
}

/// Renaming a lane leaves its key and tasks untouched.
#[rstest]
fn renaming_keeps_the_key(
    runtime: io::Result<Runtime>,
    board: Board,
    owner: Principal,
) -> TestResult {
    let rt = runtime?;
    let team_id = team_for(&rt, &board, &owner, "Launch")?;
    let path = project_in(&rt, &board, &owner, team_id, "Apollo")?;
    let doing = rt
        .block_on(board.lanes.list_lanes(&owner, path))?
        .into_iter()
        .find(|lane| lane.key().as_str() == "doing")
        .ok_or("seeded lanes include doing")?;

    let renamed = rt.block_on(board.lanes.update_lane(
        &owner,
        path,
        doing.id(),
        UpdateLaneRequest {
            name: Some("In Progress".to_owned()),
            ..UpdateLaneRequest::default()
        },
    ))?;

    assert_eq!(renamed.name().as_str(), "In Progress");
    assert_eq!(renamed.key().as_str(), "doing");
    Ok(())
}

/// Board store that deletes one lane just before it writes a task, the way a
/// concurrent lane deletion would interleave with a task write.
struct LaneDroppedMidWrite {
    inner: Arc<InMemoryStore>,
    doomed: Mutex<Option<(LaneId, LaneKey)>>,
}

impl LaneDroppedMidWrite {
    async fn drop_doomed_lane(&self) -> BoardRepositoryResult<()> {
        let doomed = self
            .doomed
            .lock()
            .map_err(|err| BoardRepositoryError::persistence(io::Error::other(err.to_string())))?
            .take();
        if let Some((lane_id, fallback)) = doomed {
            self.inner.delete_lane_reassigning(lane_id, &fallback).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl BoardRepository for LaneDroppedMidWrite {
    async fn list_lanes(&self, project_id: ProjectId) -> BoardRepositoryResult<Vec<Lane>> {
        self.inner.list_lanes(project_id).await
    }

    async fn insert_lanes_if_absent(
        &self,
        project_id: ProjectId,
        seeds: &[Lane],
    ) -> BoardRepositoryResult<Vec<Lane>> {
        self.inner.insert_lanes_if_absent(project_id, seeds).await
    }

    async fn store_lane(&self, lane: &Lane) -> BoardRepositoryResult<()> {
        self.inner.store_lane(lane).await
    }

    async fn update_lane(&self, lane: &Lane) -> BoardRepositoryResult<()> {
        self.inner.update_lane(lane).await
    }

    async fn find_lane(&self, id: LaneId) -> BoardRepositoryResult<Option<Lane>> {
        self.inner.find_lane(id).await
    }

    async fn reorder_lanes(&self, positions: &[(LaneId, SortOrder)]) -> BoardRepositoryResult<()> {
        self.inner.reorder_lanes(positions).await
    }

    async fn delete_lane_reassigning(
        &self,
        id: LaneId,
        fallback: &LaneKey,
    ) -> BoardRepositoryResult<u64> {
        self.inner.delete_lane_reassigning(id, fallback).await
    }

    async fn store_task(&self, task: &Task) -> BoardRepositoryResult<()> {
        self.drop_doomed_lane().await?;
        self.inner.store_task(task).await
    }

    async fn update_task(&self, task: &Task) -> BoardRepositoryResult<()> {
        self.drop_doomed_lane().await?;
        self.inner.update_task(task).await
    }

    async fn find_task(&self, id: TaskId) -> BoardRepositoryResult<Option<Task>> {
        self.inner.find_task(id).await
    }

    async fn delete_task(&self, id: TaskId) -> BoardRepositoryResult<()> {
        self.inner.delete_task(id).await
    }

    async fn list_tasks<'a>(
        &self,
        project_id: ProjectId,
        status: Option<&'a LaneKey>,
    ) -> BoardRepositoryResult<Vec<Task>> {
        self.inner.list_tasks(project_id, status).await
    }

    async fn reorder_tasks(&self, positions: &[(TaskId, SortOrder)]) -> BoardRepositoryResult<()> {
        self.inner.reorder_tasks(positions).await
    }
}

/// Services whose task writes race with a lane deletion.
struct RacingBoard {
    racing: Arc<LaneDroppedMidWrite>,
    teams: TeamService<InMemoryStore, DefaultClock>,
    projects: ProjectService<InMemoryStore, DefaultClock>,
    lanes: Lanes,
    tasks: TaskService<InMemoryStore, LaneDroppedMidWrite, DefaultClock>,
}

fn racing_board() -> RacingBoard {
    let store = Arc::new(InMemoryStore::new());
    let clock = Arc::new(DefaultClock);
    let racing = Arc::new(LaneDroppedMidWrite {
        inner: Arc::clone(&store),
        doomed: Mutex::new(None),
    });
    RacingBoard {
        racing: Arc::clone(&racing),
        teams: TeamService::new(Arc::clone(&store), Arc::clone(&clock)),
        projects: ProjectService::new(Arc::clone(&store), Arc::clone(&clock)),
        lanes: LaneService::new(
            AccessScopeResolver::new(Arc::clone(&store)),
            Arc::clone(&store),
            Arc::clone(&clock),
        ),
        tasks: TaskService::new(store, racing, clock),
    }
}

/// A lane deleted between the status check and the write never ends up
/// referenced by a task.
#[rstest]
#[case::create(false)]
#[case::move_between_lanes(true)]
fn task_write_into_a_lane_deleted_meanwhile_is_refused(
    runtime: io::Result<Runtime>,
    owner: Principal,
    #[case] existing_task: bool,
) -> TestResult {
    let rt = runtime?;
    let RacingBoard {
        racing,
        teams,
        projects,
        lanes,
        tasks,
    } = racing_board();
    let team = rt.block_on(teams.create_team(&owner, CreateTeamRequest::new("Launch")))?;
    let project = rt.block_on(projects.create_project(
        &owner,
        team.id(),
        CreateProjectRequest::new("Apollo"),
    ))?;
    let path = ProjectPath::new(team.id(), project.id());
    let seeded = rt.block_on(lanes.list_lanes(&owner, path))?;
    let doing = seeded
        .iter()
        .find(|lane| lane.key().as_str() == "doing")
        .ok_or("seeded lanes include doing")?;
    let existing = if existing_task {
        Some(rt.block_on(tasks.create_task(&owner, path, CreateTaskRequest::new("Stage")))?)
    } else {
        None
    };
    *racing.doomed.lock().map_err(|err| err.to_string())? =
        Some((doing.id(), LaneKey::new("todo")?));

    let outcome = match &existing {
        Some(created) => rt.block_on(tasks.move_task(
            &owner,
            path,
            created.task.id(),
            MoveTaskRequest {
                status: Some("doing".to_owned()),
                before: None,
            },
        )),
        None => rt.block_on(tasks.create_task(
            &owner,
            path,
            CreateTaskRequest::new("Fuel check").with_status("doing"),
        )),
    };

    assert!(
        matches!(&outcome, Err(BoardServiceError::UnknownStatus(key)) if key.as_str() == "doing"),
        "unexpected outcome: {outcome:?}"
    );
    let keys: Vec<String> = rt
        .block_on(lanes.list_lanes(&owner, path))?
        .iter()
        .map(|lane| lane.key().as_str().to_owned())
        .collect();
    for task in rt.block_on(tasks.list_tasks(&owner, path, None))? {
        assert!(keys.iter().any(|key| key == task.task.status().as_str()));
    }
    Ok(())
}

/// The store itself refuses a task whose status names no lane.
#[rstest]
fn store_refuses_tasks_in_missing_lanes(runtime: io::Result<Runtime>) -> TestResult {
    let rt = runtime?;
    let store = InMemoryStore::new();
    let project_id = ProjectId::new();
    let task = Task::new(
        TaskDraft {
            project_id,
            creator_id: UserId::new(),
            local_id: LocalId::new(1)?,
            title: TaskTitle::new("Orphan")?,
            description: None,
            status: LaneKey::new("nowhere")?,
            priority: TaskPriority::default(),
            due_date: None,
            assignee_id: None,
            order: SortOrder::new(1000.0)?,
        },
        &DefaultClock,
    );

    let stored = rt.block_on(store.store_task(&task));

    assert!(matches!(
        stored,
        Err(BoardRepositoryError::UnknownLane { project_id: missing, ref key })
            if missing == project_id && key.as_str() == "nowhere"
    ));
    Ok(())
}
