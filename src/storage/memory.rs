//! In-memory store backing both repositories.
//!
//! All state sits behind one lock so that cross-aggregate writes (cascading
//! project deletion, lane deletion with task reassignment, sequence
//! allocation) are atomic.

use async_trait::async_trait;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::board::{
    domain::{Lane, LaneId, LaneKey, SortOrder, Task, TaskId, ordering::compare_positions},
    ports::{BoardRepository, BoardRepositoryError, BoardRepositoryResult},
};
use crate::tenancy::{
    domain::{PersistedProjectData, Project, ProjectId, Team, TeamId, TeamMembership, UserId},
    ports::{TenancyRepository, TenancyRepositoryError, TenancyRepositoryResult},
};

/// Thread-safe in-memory tenancy and board store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<StoreState>>,
}

#[derive(Debug, Default)]
struct StoreState {
    teams: HashMap<TeamId, Team>,
    memberships: HashMap<(TeamId, UserId), TeamMembership>,
    projects: HashMap<ProjectId, Project>,
    lanes: HashMap<LaneId, Lane>,
    tasks: HashMap<TaskId, Task>,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, StoreState>, std::io::Error> {
        self.state
            .read()
            .map_err(|err| std::io::Error::other(err.to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, StoreState>, std::io::Error> {
        self.state
            .write()
            .map_err(|err| std::io::Error::other(err.to_string()))
    }
}

fn by_lane_position(left: &Lane, right: &Lane) -> Ordering {
    compare_positions(
        (left.order(), left.created_at()),
        (right.order(), right.created_at()),
    )
}

fn by_task_position(left: &Task, right: &Task) -> Ordering {
    compare_positions(
        (left.order(), left.created_at()),
        (right.order(), right.created_at()),
    )
}

impl StoreState {
    fn project_lanes(&self, project_id: ProjectId) -> Vec<Lane> {
        let mut lanes: Vec<Lane> = self
            .lanes
            .values()
            .filter(|lane| lane.project_id() == project_id)
            .cloned()
            .collect();
        lanes.sort_by(by_lane_position);
        lanes
    }

    fn lane_key_taken(&self, lane: &Lane) -> bool {
        self.lanes.values().any(|other| {
            other.id() != lane.id()
                && other.project_id() == lane.project_id()
                && other.key() == lane.key()
        })
    }

    fn require_status_lane(&self, task: &Task) -> BoardRepositoryResult<()> {
        let exists = self.lanes.values().any(|lane| {
            lane.project_id() == task.project_id() && lane.key() == task.status()
        });
        if exists {
            Ok(())
        } else {
            Err(BoardRepositoryError::UnknownLane {
                project_id: task.project_id(),
                key: task.status().clone(),
            })
        }
    }

    fn clear_other_defaults(&mut self, lane: &Lane) {
        if !lane.is_default() {
            return;
        }
        self.lanes
            .values_mut()
            .filter(|other| other.project_id() == lane.project_id() && other.id() != lane.id())
            .for_each(Lane::yield_default);
    }

    fn relabel_tasks(&mut self, project_id: ProjectId, from: &LaneKey, to: &LaneKey) -> u64 {
        let mut moved = 0_u64;
        for task in self
            .tasks
            .values_mut()
            .filter(|task| task.project_id() == project_id && task.status() == from)
        {
            task.relabel(to.clone());
            moved = moved.saturating_add(1);
        }
        moved
    }

    fn remove_project(&mut self, project_id: ProjectId) {
        self.lanes.retain(|_, lane| lane.project_id() != project_id);
        self.tasks.retain(|_, task| task.project_id() != project_id);
        self.projects.remove(&project_id);
    }
}

#[async_trait]
impl TenancyRepository for InMemoryStore {
    async fn store_team(&self, team: &Team) -> TenancyRepositoryResult<()> {
        let mut state = self.write().map_err(TenancyRepositoryError::persistence)?;
        if state.teams.values().any(|other| other.slug() == team.slug()) {
            return Err(TenancyRepositoryError::DuplicateTeamSlug(team.slug().clone()));
        }
        state.teams.insert(team.id(), team.clone());
        Ok(())
    }

    async fn find_team(&self, id: TeamId) -> TenancyRepositoryResult<Option<Team>> {
        let state = self.read().map_err(TenancyRepositoryError::persistence)?;
        Ok(state.teams.get(&id).cloned())
    }

    async fn find_teams(&self, ids: &[TeamId]) -> TenancyRepositoryResult<Vec<Team>> {
        let state = self.read().map_err(TenancyRepositoryError::persistence)?;
        Ok(ids
            .iter()
            .filter_map(|id| state.teams.get(id).cloned())
            .collect())
    }

    async fn team_ids_for_user(&self, user_id: UserId) -> TenancyRepositoryResult<Vec<TeamId>> {
        let state = self.read().map_err(TenancyRepositoryError::persistence)?;
        let mut ids: Vec<TeamId> = state
            .teams
            .values()
            .filter(|team| team.owner_id() == user_id)
            .map(Team::id)
            .chain(
                state
                    .memberships
                    .keys()
                    .filter(|(_, member)| *member == user_id)
                    .map(|(team_id, _)| *team_id)
                    .filter(|team_id| state.teams.contains_key(team_id)),
            )
            .collect();
        ids.sort_unstable();
        ids.dedup();
        Ok(ids)
    }

    async fn store_membership(&self, membership: &TeamMembership) -> TenancyRepositoryResult<()> {
        let mut state = self.write().map_err(TenancyRepositoryError::persistence)?;
        let key = (membership.team_id(), membership.user_id());
        if state.memberships.contains_key(&key) {
            return Err(TenancyRepositoryError::DuplicateMembership {
                team_id: key.0,
                user_id: key.1,
            });
        }
        state.memberships.insert(key, membership.clone());
        Ok(())
    }

    async fn find_membership(
        &self,
        team_id: TeamId,
        user_id: UserId,
    ) -> TenancyRepositoryResult<Option<TeamMembership>> {
        let state = self.read().map_err(TenancyRepositoryError::persistence)?;
        Ok(state.memberships.get(&(team_id, user_id)).cloned())
    }

    async fn list_memberships(
        &self,
        team_id: TeamId,
    ) -> TenancyRepositoryResult<Vec<TeamMembership>> {
        let state = self.read().map_err(TenancyRepositoryError::persistence)?;
        let mut memberships: Vec<TeamMembership> = state
            .memberships
            .values()
            .filter(|membership| membership.team_id() == team_id)
            .cloned()
            .collect();
        memberships.sort_by_key(TeamMembership::created_at);
        Ok(memberships)
    }

    async fn delete_membership(
        &self,
        team_id: TeamId,
        user_id: UserId,
    ) -> TenancyRepositoryResult<()> {
        let mut state = self.write().map_err(TenancyRepositoryError::persistence)?;
        state
            .memberships
            .remove(&(team_id, user_id))
            .map(|_| ())
            .ok_or(TenancyRepositoryError::MembershipNotFound { team_id, user_id })
    }

    async fn store_project(&self, project: &Project) -> TenancyRepositoryResult<()> {
        let mut state = self.write().map_err(TenancyRepositoryError::persistence)?;
        let taken = state
            .projects
            .values()
            .any(|other| other.team_id() == project.team_id() && other.slug() == project.slug());
        if taken {
            return Err(TenancyRepositoryError::DuplicateProjectSlug {
                team_id: project.team_id(),
                slug: project.slug().clone(),
            });
        }
        state.projects.insert(project.id(), project.clone());
        Ok(())
    }

    async fn update_project(&self, project: &Project) -> TenancyRepositoryResult<()> {
        let mut state = self.write().map_err(TenancyRepositoryError::persistence)?;
        let taken = state.projects.values().any(|other| {
            other.id() != project.id()
                && other.team_id() == project.team_id()
                && other.slug() == project.slug()
        });
        if taken {
            return Err(TenancyRepositoryError::DuplicateProjectSlug {
                team_id: project.team_id(),
                slug: project.slug().clone(),
            });
        }
        let stored = state
            .projects
            .get_mut(&project.id())
            .ok_or(TenancyRepositoryError::ProjectNotFound(project.id()))?;
        *stored = Project::from_persisted(PersistedProjectData {
            id: project.id(),
            team_id: project.team_id(),
            name: project.name().clone(),
            slug: project.slug().clone(),
            task_sequence: stored.task_sequence(),
            created_at: project.created_at(),
            updated_at: project.updated_at(),
        });
        Ok(())
    }

    async fn find_project(&self, id: ProjectId) -> TenancyRepositoryResult<Option<Project>> {
        let state = self.read().map_err(TenancyRepositoryError::persistence)?;
        Ok(state.projects.get(&id).cloned())
    }

    async fn list_projects(&self, team_ids: &[TeamId]) -> TenancyRepositoryResult<Vec<Project>> {
        let state = self.read().map_err(TenancyRepositoryError::persistence)?;
        let mut projects: Vec<Project> = state
            .projects
            .values()
            .filter(|project| team_ids.contains(&project.team_id()))
            .cloned()
            .collect();
        projects.sort_by(|left, right| left.name().as_str().cmp(right.name().as_str()));
        Ok(projects)
    }

    async fn delete_project(&self, id: ProjectId) -> TenancyRepositoryResult<()> {
        let mut state = self.write().map_err(TenancyRepositoryError::persistence)?;
        if !state.projects.contains_key(&id) {
            return Err(TenancyRepositoryError::ProjectNotFound(id));
        }
        state.remove_project(id);
        Ok(())
    }

    async fn allocate_task_sequence(&self, id: ProjectId) -> TenancyRepositoryResult<u64> {
        let mut state = self.write().map_err(TenancyRepositoryError::persistence)?;
        let project = state
            .projects
            .get_mut(&id)
            .ok_or(TenancyRepositoryError::ProjectNotFound(id))?;
        Ok(project.take_task_sequence())
    }
}

#[async_trait]
impl BoardRepository for InMemoryStore {
    async fn list_lanes(&self, project_id: ProjectId) -> BoardRepositoryResult<Vec<Lane>> {
        let state = self.read().map_err(BoardRepositoryError::persistence)?;
        Ok(state.project_lanes(project_id))
    }

    async fn insert_lanes_if_absent(
        &self,
        project_id: ProjectId,
        seeds: &[Lane],
    ) -> BoardRepositoryResult<Vec<Lane>> {
        let mut state = self.write().map_err(BoardRepositoryError::persistence)?;
        let has_lanes = state
            .lanes
            .values()
            .any(|lane| lane.project_id() == project_id);
        if !has_lanes {
            for lane in seeds {
                state.lanes.insert(lane.id(), lane.clone());
            }
        }
        Ok(state.project_lanes(project_id))
    }

    async fn store_lane(&self, lane: &Lane) -> BoardRepositoryResult<()> {
        let mut state = self.write().map_err(BoardRepositoryError::persistence)?;
        if state.lane_key_taken(lane) {
            return Err(BoardRepositoryError::DuplicateLaneKey {
                project_id: lane.project_id(),
                key: lane.key().clone(),
            });
        }
        state.clear_other_defaults(lane);
        state.lanes.insert(lane.id(), lane.clone());
        Ok(())
    }

    async fn update_lane(&self, lane: &Lane) -> BoardRepositoryResult<()> {
        let mut state = self.write().map_err(BoardRepositoryError::persistence)?;
        let previous_key = state
            .lanes
            .get(&lane.id())
            .map(|stored| stored.key().clone())
            .ok_or(BoardRepositoryError::LaneNotFound(lane.id()))?;
        if state.lane_key_taken(lane) {
            return Err(BoardRepositoryError::DuplicateLaneKey {
                project_id: lane.project_id(),
                key: lane.key().clone(),
            });
        }
        if &previous_key != lane.key() {
            state.relabel_tasks(lane.project_id(), &previous_key, lane.key());
        }
        state.clear_other_defaults(lane);
        state.lanes.insert(lane.id(), lane.clone());
        Ok(())
    }

    async fn find_lane(&self, id: LaneId) -> BoardRepositoryResult<Option<Lane>> {
        let state = self.read().map_err(BoardRepositoryError::persistence)?;
        Ok(state.lanes.get(&id).cloned())
    }

    async fn reorder_lanes(&self, positions: &[(LaneId, SortOrder)]) -> BoardRepositoryResult<()> {
        let mut state = self.write().map_err(BoardRepositoryError::persistence)?;
        for (id, order) in positions {
            if let Some(lane) = state.lanes.get_mut(id) {
                lane.renumber(*order);
            }
        }
        Ok(())
    }

    async fn delete_lane_reassigning(
        &self,
        id: LaneId,
        fallback: &LaneKey,
    ) -> BoardRepositoryResult<u64> {
        let mut state = self.write().map_err(BoardRepositoryError::persistence)?;
        let lane = state
            .lanes
            .get(&id)
            .cloned()
            .ok_or(BoardRepositoryError::LaneNotFound(id))?;
        let siblings = state
            .lanes
            .values()
            .filter(|other| other.project_id() == lane.project_id() && other.id() != id);
        let fallback_lane = siblings
            .clone()
            .find(|other| other.key() == fallback)
            .map(Lane::id);
        if siblings.count() == 0 {
            return Err(BoardRepositoryError::LastLane(id));
        }
        let fallback_id = fallback_lane.ok_or(BoardRepositoryError::LaneNotFound(id))?;
        let moved = state.relabel_tasks(lane.project_id(), lane.key(), fallback);
        state.lanes.remove(&id);
        tracing::debug!(lane_id = %id, fallback_lane = %fallback_id, moved, "lane removed");
        Ok(moved)
    }

    async fn store_task(&self, task: &Task) -> BoardRepositoryResult<()> {
        let mut state = self.write().map_err(BoardRepositoryError::persistence)?;
        let taken = state.tasks.values().any(|other| {
            other.project_id() == task.project_id() && other.local_id() == task.local_id()
        });
        if taken {
            return Err(BoardRepositoryError::DuplicateLocalId {
                project_id: task.project_id(),
                local_id: task.local_id(),
            });
        }
        state.require_status_lane(task)?;
        state.tasks.insert(task.id(), task.clone());
        Ok(())
    }

    async fn update_task(&self, task: &Task) -> BoardRepositoryResult<()> {
        let mut state = self.write().map_err(BoardRepositoryError::persistence)?;
        if !state.tasks.contains_key(&task.id()) {
            return Err(BoardRepositoryError::TaskNotFound(task.id()));
        }
        state.require_status_lane(task)?;
        state.tasks.insert(task.id(), task.clone());
        Ok(())
    }

    async fn find_task(&self, id: TaskId) -> BoardRepositoryResult<Option<Task>> {
        let state = self.read().map_err(BoardRepositoryError::persistence)?;
        Ok(state.tasks.get(&id).cloned())
    }

    async fn delete_task(&self, id: TaskId) -> BoardRepositoryResult<()> {
        let mut state = self.write().map_err(BoardRepositoryError::persistence)?;
        state
            .tasks
            .remove(&id)
            .map(|_| ())
            .ok_or(BoardRepositoryError::TaskNotFound(id))
    }

    async fn list_tasks<'a>(
        &self,
        project_id: ProjectId,
        status: Option<&'a LaneKey>,
    ) -> BoardRepositoryResult<Vec<Task>> {
        let state = self.read().map_err(BoardRepositoryError::persistence)?;
        let mut tasks: Vec<Task> = state
            .tasks
            .values()
            .filter(|task| task.project_id() == project_id)
            .filter(|task| status.is_none_or(|key| task.status() == key))
            .cloned()
            .collect();
        tasks.sort_by(by_task_position);
        Ok(tasks)
    }

    async fn reorder_tasks(&self, positions: &[(TaskId, SortOrder)]) -> BoardRepositoryResult<()> {
        let mut state = self.write().map_err(BoardRepositoryError::persistence)?;
        for (id, order) in positions {
            if let Some(task) = state.tasks.get_mut(id) {
                task.renumber(*order);
            }
        }
        Ok(())
    }
}
