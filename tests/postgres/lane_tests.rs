//! Lane lifecycle tests against `PostgreSQL`.

use crate::postgres::helpers::{TestResult, owned_project, pg_board, test_runtime};
use mockable::DefaultClock;
use pg_embedded_setup_unpriv::{TestCluster, test_support::shared_test_cluster};
use rstest::rstest;
use taskboard::{
    board::{
        domain::{LaneKey, LocalId, SortOrder, Task, TaskDraft, TaskPriority, TaskTitle},
        ports::{BoardRepository, BoardRepositoryError},
        services::{BoardServiceError, CreateLaneRequest, CreateTaskRequest, UpdateLaneRequest},
    },
    error::{Classify, ErrorKind},
    tenancy::domain::UserId,
};

/// Deleting a lane moves its tasks to the default lane in the same
/// transaction.
#[rstest]
fn deleting_a_lane_reassigns_its_tasks(shared_test_cluster: &'static TestCluster) -> TestResult {
    let rt = test_runtime()?;
    let board = pg_board(shared_test_cluster, "lane_delete")?;
    let (owner, path) = owned_project(&rt, &board, "Apollo")?;
    for title in ["Fuel check", "Ignition"] {
        rt.block_on(board.tasks.create_task(
            &owner,
            path,
            CreateTaskRequest::new(title).with_status("doing"),
        ))?;
    }
    let doing = rt
        .block_on(board.lanes.list_lanes(&owner, path))?
        .into_iter()
        .find(|lane| lane.key().as_str() == "doing")
        .ok_or("seeded lanes include doing")?;

    let deletion = rt.block_on(board.lanes.delete_lane(&owner, path, doing.id()))?;

    assert_eq!(deletion.fallback.as_str(), "todo");
    assert_eq!(deletion.reassigned, 2);
    let statuses: Vec<String> = rt
        .block_on(board.tasks.list_tasks(&owner, path, None))?
        .iter()
        .map(|details| details.task.status().as_str().to_owned())
        .collect();
    assert_eq!(statuses, ["todo", "todo"]);
    Ok(())
}

/// The only remaining lane cannot be deleted.
#[rstest]
fn last_lane_is_kept(shared_test_cluster: &'static TestCluster) -> TestResult {
    let rt = test_runtime()?;
    let board = pg_board(shared_test_cluster, "lane_last")?;
    let (owner, path) = owned_project(&rt, &board, "Apollo")?;
    let mut lanes = rt.block_on(board.lanes.list_lanes(&owner, path))?;
    let last = lanes.pop().ok_or("seeded lanes exist")?;
    for lane in lanes {
        rt.block_on(board.lanes.delete_lane(&owner, path, lane.id()))?;
    }

    let refused = rt.block_on(board.lanes.delete_lane(&owner, path, last.id()));

    assert!(refused.is_err_and(|err| err.kind() == ErrorKind::Conflict));
    assert_eq!(rt.block_on(board.lanes.list_lanes(&owner, path))?.len(), 1);
    Ok(())
}

/// Changing a lane key carries its tasks to the new key.
#[rstest]
fn rekeying_a_lane_carries_its_tasks(shared_test_cluster: &'static TestCluster) -> TestResult {
    let rt = test_runtime()?;
    let board = pg_board(shared_test_cluster, "lane_rekey")?;
    let (owner, path) = owned_project(&rt, &board, "Apollo")?;
    let created = rt.block_on(board.tasks.create_task(
        &owner,
        path,
        CreateTaskRequest::new("Stage").with_status("doing"),
    ))?;
    let doing = rt
        .block_on(board.lanes.list_lanes(&owner, path))?
        .into_iter()
        .find(|lane| lane.key().as_str() == "doing")
        .ok_or("seeded lanes include doing")?;

    let rekeyed = rt.block_on(board.lanes.update_lane(
        &owner,
        path,
        doing.id(),
        UpdateLaneRequest {
            key: Some("in-progress".to_owned()),
            ..UpdateLaneRequest::default()
        },
    ))?;
    let moved = rt.block_on(board.tasks.get_task(&owner, path, created.task.id()))?;

    assert_eq!(rekeyed.key().as_str(), "in-progress");
    assert_eq!(moved.task.status().as_str(), "in-progress");
    Ok(())
}

/// A new default lane takes the flag from the previous one, leaving
/// exactly one default under the partial unique index.
#[rstest]
fn new_default_lane_takes_over_the_flag(shared_test_cluster: &'static TestCluster) -> TestResult {
    let rt = test_runtime()?;
    let board = pg_board(shared_test_cluster, "lane_default")?;
    let (owner, path) = owned_project(&rt, &board, "Apollo")?;
    rt.block_on(board.lanes.list_lanes(&owner, path))?;

    rt.block_on(board.lanes.create_lane(
        &owner,
        path,
        CreateLaneRequest::new("Backlog").with_default(true),
    ))?;

    let defaults: Vec<String> = rt
        .block_on(board.lanes.list_lanes(&owner, path))?
        .iter()
        .filter(|lane| lane.is_default())
        .map(|lane| lane.key().as_str().to_owned())
        .collect();
    assert_eq!(defaults, ["backlog"]);
    Ok(())
}

/// A second lane with an existing key maps to a conflict.
#[rstest]
fn duplicate_lane_key_is_a_conflict(shared_test_cluster: &'static TestCluster) -> TestResult {
    let rt = test_runtime()?;
    let board = pg_board(shared_test_cluster, "lane_duplicate")?;
    let (owner, path) = owned_project(&rt, &board, "Apollo")?;

    let duplicate = rt.block_on(board.lanes.create_lane(
        &owner,
        path,
        CreateLaneRequest::new("Doing"),
    ));

    assert!(matches!(
        duplicate,
        Err(BoardServiceError::Repository(
            BoardRepositoryError::DuplicateLaneKey { .. }
        ))
    ));
    Ok(())
}

/// The store refuses a task whose status names no lane of its project.
#[rstest]
fn task_in_missing_lane_is_refused(shared_test_cluster: &'static TestCluster) -> TestResult {
    let rt = test_runtime()?;
    let board = pg_board(shared_test_cluster, "lane_missing")?;
    let (owner, path) = owned_project(&rt, &board, "Apollo")?;
    rt.block_on(board.lanes.list_lanes(&owner, path))?;
    let orphan = Task::new(
        TaskDraft {
            project_id: path.project_id,
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

    let stored = rt.block_on(board.store.store_task(&orphan));

    assert!(matches!(
        stored,
        Err(BoardRepositoryError::UnknownLane { ref key, .. }) if key.as_str() == "nowhere"
    ));
    assert!(rt.block_on(board.store.find_task(orphan.id()))?.is_none());
    Ok(())
}
