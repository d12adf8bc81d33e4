//! Tenant isolation tests for the in-memory store.
//!
//! Resources outside the caller's teams are indistinguishable from missing
//! ones.

use crate::in_memory::helpers::{
    Board, TestResult, board, join, owner, project_in, runtime, team_for,
};
use rstest::rstest;
use std::io;
use taskboard::{
    board::services::CreateTaskRequest,
    error::{Classify, ErrorKind},
    tenancy::domain::{Principal, ProjectPath, UserId},
};
use tokio::runtime::Runtime;

/// Outsiders see neither the team nor anything inside it.
#[rstest]
fn outsiders_get_not_found_everywhere(
    runtime: io::Result<Runtime>,
    board: Board,
    owner: Principal,
) -> TestResult {
    let rt = runtime?;
    let outsider = Principal::session(UserId::new());
    let team_id = team_for(&rt, &board, &owner, "Launch")?;
    let path = project_in(&rt, &board, &owner, team_id, "Apollo")?;
    let created = rt.block_on(board.tasks.create_task(&owner, path, CreateTaskRequest::new("Secret")))?;

    let team = rt.block_on(board.teams.get_team(&outsider, team_id));
    let projects = rt.block_on(board.projects.list_projects(&outsider, team_id));
    let lanes = rt.block_on(board.lanes.list_lanes(&outsider, path));
    let task = rt.block_on(board.tasks.get_task(&outsider, path, created.task.id()));

    assert_eq!(team.err().map(|err| err.kind()), Some(ErrorKind::NotFound));
    assert_eq!(projects.err().map(|err| err.kind()), Some(ErrorKind::NotFound));
    assert_eq!(lanes.err().map(|err| err.kind()), Some(ErrorKind::NotFound));
    assert_eq!(task.err().map(|err| err.kind()), Some(ErrorKind::NotFound));
    assert!(rt.block_on(board.teams.list_teams(&outsider))?.is_empty());
    Ok(())
}

/// A task is only reachable through the path of the project it belongs to.
#[rstest]
fn tasks_are_scoped_to_their_project_path(
    runtime: io::Result<Runtime>,
    board: Board,
    owner: Principal,
) -> TestResult {
    let rt = runtime?;
    let team_id = team_for(&rt, &board, &owner, "Launch")?;
    let apollo = project_in(&rt, &board, &owner, team_id, "Apollo")?;
    let gemini = project_in(&rt, &board, &owner, team_id, "Gemini")?;
    let created = rt.block_on(board.tasks.create_task(&owner, apollo, CreateTaskRequest::new("Burn")))?;

    let result = rt.block_on(board.tasks.get_task(&owner, gemini, created.task.id()));
    let listed = rt.block_on(board.tasks.list_tasks(&owner, gemini, None))?;

    assert_eq!(result.err().map(|err| err.kind()), Some(ErrorKind::NotFound));
    assert!(listed.is_empty());
    Ok(())
}

/// A project addressed through a team it does not belong to is missing.
#[rstest]
fn project_under_foreign_team_is_missing(
    runtime: io::Result<Runtime>,
    board: Board,
    owner: Principal,
) -> TestResult {
    let rt = runtime?;
    let launch = team_for(&rt, &board, &owner, "Launch")?;
    let recovery = team_for(&rt, &board, &owner, "Recovery")?;
    let path = project_in(&rt, &board, &owner, launch, "Apollo")?;

    let misaddressed = ProjectPath::new(recovery, path.project_id);
    let result = rt.block_on(board.lanes.list_lanes(&owner, misaddressed));

    assert_eq!(result.err().map(|err| err.kind()), Some(ErrorKind::NotFound));
    Ok(())
}

/// Joining a team grants access; leaving it revokes access.
#[rstest]
fn membership_controls_access(
    runtime: io::Result<Runtime>,
    board: Board,
    owner: Principal,
) -> TestResult {
    let rt = runtime?;
    let member = Principal::session(UserId::new());
    let team_id = team_for(&rt, &board, &owner, "Launch")?;
    let path = project_in(&rt, &board, &owner, team_id, "Apollo")?;

    join(&rt, &board, &owner, team_id, &member, "member")?;
    let visible = rt.block_on(board.tasks.list_tasks(&member, path, None));
    rt.block_on(board.teams.remove_member(&owner, team_id, member.user_id()))?;
    let revoked = rt.block_on(board.tasks.list_tasks(&member, path, None));

    assert!(visible.is_ok());
    assert_eq!(revoked.err().map(|err| err.kind()), Some(ErrorKind::NotFound));
    Ok(())
}

/// Service credentials act with the scope of the user they name.
#[rstest]
fn service_principal_uses_acting_user_scope(
    runtime: io::Result<Runtime>,
    board: Board,
    owner: Principal,
) -> TestResult {
    let rt = runtime?;
    let team_id = team_for(&rt, &board, &owner, "Launch")?;
    let path = project_in(&rt, &board, &owner, team_id, "Apollo")?;
    let automation = Principal::service(owner.user_id());

    let created = rt.block_on(board.tasks.create_task(
        &automation,
        path,
        CreateTaskRequest::new("Nightly sync"),
    ))?;

    assert_eq!(created.task.creator_id(), owner.user_id());
    Ok(())
}
