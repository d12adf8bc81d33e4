//! Given steps for lane management BDD scenarios.

use super::world::{LaneWorld, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::given;
use taskboard::{
    board::services::CreateTaskRequest,
    tenancy::{
        domain::ProjectPath,
        services::{CreateProjectRequest, CreateTeamRequest},
    },
};

#[given(r#"a project "{name}" owned by its creator"#)]
fn project_owned_by_creator(world: &mut LaneWorld, name: String) -> Result<(), eyre::Report> {
    let team = run_async(
        world
            .teams
            .create_team(&world.owner, CreateTeamRequest::new("Mission Ops")),
    )
    .wrap_err("create team")?;
    let project = run_async(world.projects.create_project(
        &world.owner,
        team.id(),
        CreateProjectRequest::new(name),
    ))
    .wrap_err("create project")?;
    world.path = Some(ProjectPath::new(team.id(), project.id()));
    Ok(())
}

#[given(r#"a task "{title}" in lane "{key}""#)]
fn task_in_lane(world: &mut LaneWorld, title: String, key: String) -> Result<(), eyre::Report> {
    let path = world.path()?;
    run_async(world.tasks.create_task(
        &world.owner,
        path,
        CreateTaskRequest::new(title).with_status(key),
    ))
    .wrap_err("create task")?;
    Ok(())
}

#[given(r#"only lane "{key}" remains"#)]
fn only_lane_remains(world: &mut LaneWorld, key: String) -> Result<(), eyre::Report> {
    let path = world.path()?;
    for lane in world.current_lanes()? {
        if lane.key().as_str() != key {
            run_async(world.lanes.delete_lane(&world.owner, path, lane.id()))
                .wrap_err_with(|| format!("delete lane {}", lane.key()))?;
        }
    }
    Ok(())
}
