//! Then steps for lane management BDD scenarios.

use super::world::{LaneWorld, run_async};
use eyre::{WrapErr, eyre};
use rstest_bdd_macros::then;
use taskboard::error::{Classify, ErrorKind};

#[then(r#"the lanes are "{keys}""#)]
fn lanes_are(world: &LaneWorld, keys: String) -> Result<(), eyre::Report> {
    let expected: Vec<&str> = keys.split(',').map(str::trim).collect();
    let lanes = world.current_lanes()?;
    let actual: Vec<&str> = lanes.iter().map(|lane| lane.key().as_str()).collect();
    if actual != expected {
        return Err(eyre!("expected lanes {expected:?}, found {actual:?}"));
    }
    Ok(())
}

#[then(r#"lane "{key}" is the default lane"#)]
fn lane_is_default(world: &LaneWorld, key: String) -> Result<(), eyre::Report> {
    let lanes = world.current_lanes()?;
    let defaults: Vec<&str> = lanes
        .iter()
        .filter(|lane| lane.is_default())
        .map(|lane| lane.key().as_str())
        .collect();
    if defaults != [key.as_str()] {
        return Err(eyre!("expected only {key} as default, found {defaults:?}"));
    }
    Ok(())
}

#[then("the lane request fails with a conflict")]
fn lane_request_conflicts(world: &LaneWorld) -> Result<(), eyre::Report> {
    let error = world
        .last_error
        .as_ref()
        .ok_or_else(|| eyre!("expected the lane request to fail"))?;
    if error.kind() != ErrorKind::Conflict {
        return Err(eyre!("expected a conflict, got {error:?}"));
    }
    Ok(())
}

#[then(r#"{count:u64} task was reassigned to lane "{key}""#)]
fn tasks_reassigned(world: &LaneWorld, count: u64, key: String) -> Result<(), eyre::Report> {
    let deletion = world
        .last_deletion
        .as_ref()
        .ok_or_else(|| eyre!("missing lane deletion outcome"))?;
    if deletion.reassigned != count || deletion.fallback.as_str() != key {
        return Err(eyre!(
            "expected {count} task(s) moved to {key}, got {} moved to {}",
            deletion.reassigned,
            deletion.fallback.as_str()
        ));
    }
    Ok(())
}

#[then(r#"task "{title}" is in lane "{key}""#)]
fn task_is_in_lane(world: &LaneWorld, title: String, key: String) -> Result<(), eyre::Report> {
    let path = world.path()?;
    let tasks =
        run_async(world.tasks.list_tasks(&world.owner, path, None)).wrap_err("list tasks")?;
    let details = tasks
        .iter()
        .find(|details| details.task.title().as_str() == title)
        .ok_or_else(|| eyre!("no task titled {title}"))?;
    let status = details.task.status().as_str();
    if status != key {
        return Err(eyre!("expected {title} in {key}, found it in {status}"));
    }
    Ok(())
}
