//! Task numbering tests for the in-memory store.
//!
//! Local identifiers are allocated atomically per project and never reused.

use crate::in_memory::helpers::{
    Board, TestResult, board, owner, project_in, runtime, team_for,
};
use rstest::rstest;
use std::collections::BTreeSet;
use std::io;
use taskboard::{board::services::CreateTaskRequest, tenancy::domain::Principal};
use tokio::runtime::Runtime;

const CONCURRENT_CREATES: u64 = 32;

/// Concurrent creates in one project receive distinct, gapless numbers.
#[rstest]
fn concurrent_creates_get_distinct_local_ids(
    runtime: io::Result<Runtime>,
    board: Board,
    owner: Principal,
) -> TestResult {
    let rt = runtime?;
    let team_id = team_for(&rt, &board, &owner, "Launch")?;
    let path = project_in(&rt, &board, &owner, team_id, "Apollo Booster Campaign")?;

    let handles: Vec<_> = (0..CONCURRENT_CREATES)
        .map(|index| {
            let tasks = board.tasks.clone();
            rt.spawn(async move {
                tasks
                    .create_task(&owner, path, CreateTaskRequest::new(format!("Task {index}")))
                    .await
            })
        })
        .collect();
    let mut local_ids = BTreeSet::new();
    for handle in handles {
        let details = rt.block_on(handle)??;
        local_ids.insert(details.task.local_id().value());
    }

    let expected: BTreeSet<u64> = (1..=CONCURRENT_CREATES).collect();
    assert_eq!(local_ids, expected);
    Ok(())
}

/// Each project numbers its tasks independently.
#[rstest]
fn sequences_are_per_project(
    runtime: io::Result<Runtime>,
    board: Board,
    owner: Principal,
) -> TestResult {
    let rt = runtime?;
    let team_id = team_for(&rt, &board, &owner, "Launch")?;
    let first = project_in(&rt, &board, &owner, team_id, "Apollo")?;
    let second = project_in(&rt, &board, &owner, team_id, "Gemini")?;

    rt.block_on(board.tasks.create_task(&owner, first, CreateTaskRequest::new("One")))?;
    rt.block_on(board.tasks.create_task(&owner, first, CreateTaskRequest::new("Two")))?;
    let other = rt.block_on(board.tasks.create_task(
        &owner,
        second,
        CreateTaskRequest::new("Elsewhere"),
    ))?;

    assert_eq!(other.task.local_id().value(), 1);
    assert_eq!(other.key.to_string(), "G-01");
    Ok(())
}

/// Deleting the newest task does not free its number.
#[rstest]
fn deleted_numbers_are_not_reused(
    runtime: io::Result<Runtime>,
    board: Board,
    owner: Principal,
) -> TestResult {
    let rt = runtime?;
    let team_id = team_for(&rt, &board, &owner, "Launch")?;
    let path = project_in(&rt, &board, &owner, team_id, "Apollo")?;

    let created = rt.block_on(board.tasks.create_task(&owner, path, CreateTaskRequest::new("One")))?;
    rt.block_on(board.tasks.delete_task(&owner, path, created.task.id()))?;
    let next = rt.block_on(board.tasks.create_task(&owner, path, CreateTaskRequest::new("Two")))?;

    assert_eq!(next.task.local_id().value(), 2);
    assert_eq!(next.key.to_string(), "A-02");
    Ok(())
}
