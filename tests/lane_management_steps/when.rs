//! When steps for lane management BDD scenarios.

use super::world::{LaneWorld, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::when;
use taskboard::board::services::{CreateLaneRequest, UpdateLaneRequest};

#[when("the lanes are listed")]
fn lanes_listed(world: &mut LaneWorld) -> Result<(), eyre::Report> {
    world.current_lanes()?;
    Ok(())
}

#[when(r#"a lane named "{name}" is created"#)]
fn lane_created(world: &mut LaneWorld, name: String) -> Result<(), eyre::Report> {
    let path = world.path()?;
    let result = run_async(
        world
            .lanes
            .create_lane(&world.owner, path, CreateLaneRequest::new(name)),
    );
    world.last_error = result.err();
    Ok(())
}

#[when(r#"lane "{key}" is deleted"#)]
fn lane_deleted(world: &mut LaneWorld, key: String) -> Result<(), eyre::Report> {
    let path = world.path()?;
    let lane_id = world.lane_id(&key)?;
    match run_async(world.lanes.delete_lane(&world.owner, path, lane_id)) {
        Ok(deletion) => {
            world.last_deletion = Some(deletion);
            world.last_error = None;
        }
        Err(error) => {
            world.last_deletion = None;
            world.last_error = Some(error);
        }
    }
    Ok(())
}

#[when(r#"lane "{key}" is rekeyed to "{new_key}""#)]
fn lane_rekeyed(world: &mut LaneWorld, key: String, new_key: String) -> Result<(), eyre::Report> {
    let path = world.path()?;
    let lane_id = world.lane_id(&key)?;
    let request = UpdateLaneRequest {
        key: Some(new_key),
        ..UpdateLaneRequest::default()
    };
    run_async(world.lanes.update_lane(&world.owner, path, lane_id, request))
        .wrap_err("rekey lane")?;
    Ok(())
}

#[when(r#"lane "{key}" is moved before lane "{target}""#)]
fn lane_moved(world: &mut LaneWorld, key: String, target: String) -> Result<(), eyre::Report> {
    let path = world.path()?;
    let lane_id = world.lane_id(&key)?;
    let before = world.lane_id(&target)?;
    run_async(
        world
            .lanes
            .move_lane(&world.owner, path, lane_id, Some(before)),
    )
    .wrap_err("move lane")?;
    Ok(())
}
