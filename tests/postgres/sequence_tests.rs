//! Task numbering tests against `PostgreSQL`.

use crate::postgres::helpers::{TestResult, owned_project, pg_board, test_runtime};
use pg_embedded_setup_unpriv::{TestCluster, test_support::shared_test_cluster};
use rstest::rstest;
use std::collections::BTreeSet;
use taskboard::{board::services::CreateTaskRequest, tenancy::ports::TenancyRepository};

const CONCURRENT_CREATES: u64 = 24;

/// Concurrent creates in one project receive distinct, gapless numbers.
#[rstest]
fn concurrent_creates_get_distinct_local_ids(
    shared_test_cluster: &'static TestCluster,
) -> TestResult {
    let rt = test_runtime()?;
    let board = pg_board(shared_test_cluster, "seq_concurrent")?;
    let (owner, path) = owned_project(&rt, &board, "Apollo Booster Campaign")?;

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

/// The counter hands out 1, 2, ... and keeps counting past deletions.
#[rstest]
fn sequence_starts_at_one_and_is_never_reused(
    shared_test_cluster: &'static TestCluster,
) -> TestResult {
    let rt = test_runtime()?;
    let board = pg_board(shared_test_cluster, "seq_reuse")?;
    let (owner, path) = owned_project(&rt, &board, "Apollo")?;

    assert_eq!(rt.block_on(board.store.allocate_task_sequence(path.project_id))?, 1);
    assert_eq!(rt.block_on(board.store.allocate_task_sequence(path.project_id))?, 2);
    let third = rt.block_on(board.tasks.create_task(&owner, path, CreateTaskRequest::new("Stage")))?;
    rt.block_on(board.tasks.delete_task(&owner, path, third.task.id()))?;
    let fourth = rt.block_on(board.tasks.create_task(&owner, path, CreateTaskRequest::new("Ignite")))?;

    assert_eq!(third.task.local_id().value(), 3);
    assert_eq!(fourth.task.local_id().value(), 4);
    assert_eq!(fourth.key.to_string(), "A-04");
    Ok(())
}
