//! Typed board client wrapping every remote write in an optimistic
//! mutation.

use super::{MutationCoordinator, ObservedStore};
use crate::api::dto::{
    CreateLaneBody, CreateTaskBody, LaneView, MoveLaneBody, MoveTaskBody, ProjectView, TaskView,
    UpdateLaneBody, UpdateTaskBody,
};
use crate::board::domain::{
    LaneColor, LaneId, LaneKey, LaneName, SortOrder, TaskId, TaskPriority, TaskTitle,
    normalize_description,
    ordering::{append_after, place_before},
};
use crate::error::ErrorKind;
use crate::optimistic::{
    domain::{
        CollectionKey, MutationOutcome, MutationPhase, ObservedItem, RefreshOutcome, Speculation,
    },
    ports::{RemoteBoard, RemoteError, RemoteResult},
};
use crate::tenancy::domain::{ProjectPath, TeamId, UserId};
use mockable::Clock;
use std::fmt::Display;
use std::sync::Arc;

/// Lane a task lands in when no lanes are loaded and none is named.
const FIRST_SEEDED_LANE: &str = "todo";

fn invalid(err: &dyn Display) -> RemoteError {
    RemoteError::new(ErrorKind::Validation, err.to_string())
}

fn not_loaded(what: &str) -> RemoteError {
    RemoteError::new(ErrorKind::NotFound, format!("{what} is not loaded"))
}

fn position(value: f64) -> RemoteResult<SortOrder> {
    SortOrder::new(value).map_err(|err| invalid(&err))
}

/// Sorted `(id, order)` pairs of a bucket, leaving out `moved`.
fn bucket<I, T>(
    items: &[T],
    moved: &I,
    member: impl Fn(&T) -> Option<(I, f64)>,
) -> RemoteResult<Vec<(I, SortOrder)>>
where
    I: PartialEq,
{
    let mut siblings = items
        .iter()
        .filter_map(member)
        .filter(|(id, _)| id != moved)
        .map(|(id, order)| position(order).map(|sort| (id, sort)))
        .collect::<RemoteResult<Vec<_>>>()?;
    siblings.sort_by(|left, right| left.1.total_cmp(right.1));
    Ok(siblings)
}

/// Loaded siblings carrying the positions a renumbering gave them.
fn shifted<T: ObservedItem>(
    loaded: &[T],
    renumbered: Option<Vec<(T::Id, SortOrder)>>,
    reorder: impl Fn(&T, f64) -> T,
) -> Vec<T> {
    renumbered
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(id, order)| {
            loaded
                .iter()
                .find(|item| item.item_id() == id)
                .map(|item| reorder(item, order.value()))
        })
        .collect()
}

fn highest(orders: impl Iterator<Item = f64>) -> RemoteResult<Option<SortOrder>> {
    let mut max: Option<SortOrder> = None;
    for value in orders {
        let order = position(value)?;
        if max.is_none_or(|current| order.total_cmp(current).is_gt()) {
            max = Some(order);
        }
    }
    Ok(max)
}

/// Client-side view of the board.
///
/// Every write is applied to the shared observed collections first and
/// settled once the server answers; reads go through
/// [`tasks`](Self::tasks), [`lanes`](Self::lanes) and
/// [`projects`](Self::projects).
pub struct BoardClient<R, C>
where
    R: RemoteBoard + ?Sized + 'static,
    C: Clock + Send + Sync,
{
    remote: Arc<R>,
    clock: Arc<C>,
    acting_user: UserId,
    tasks: MutationCoordinator<TaskView>,
    lanes: MutationCoordinator<LaneView>,
    projects: MutationCoordinator<ProjectView>,
    reconcile: bool,
}

impl<R, C> Clone for BoardClient<R, C>
where
    R: RemoteBoard + ?Sized + 'static,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            remote: Arc::clone(&self.remote),
            clock: Arc::clone(&self.clock),
            acting_user: self.acting_user,
            tasks: self.tasks.clone(),
            lanes: self.lanes.clone(),
            projects: self.projects.clone(),
            reconcile: self.reconcile,
        }
    }
}

impl<R, C> BoardClient<R, C>
where
    R: RemoteBoard + ?Sized + 'static,
    C: Clock + Send + Sync,
{
    /// Creates a client acting as `acting_user`, who is recorded as the
    /// creator of placeholder tasks.
    #[must_use]
    pub fn new(remote: Arc<R>, clock: Arc<C>, acting_user: UserId) -> Self {
        Self {
            remote,
            clock,
            acting_user,
            tasks: MutationCoordinator::default(),
            lanes: MutationCoordinator::default(),
            projects: MutationCoordinator::default(),
            reconcile: false,
        }
    }

    /// Refetches a collection in the background after every committed
    /// mutation.
    #[must_use]
    pub const fn with_reconciliation(mut self, reconcile: bool) -> Self {
        self.reconcile = reconcile;
        self
    }

    /// Observed task collections.
    #[must_use]
    pub const fn tasks(&self) -> &ObservedStore<TaskView> {
        self.tasks.store()
    }

    /// Observed lane collections.
    #[must_use]
    pub const fn lanes(&self) -> &ObservedStore<LaneView> {
        self.lanes.store()
    }

    /// Observed project collections.
    #[must_use]
    pub const fn projects(&self) -> &ObservedStore<ProjectView> {
        self.projects.store()
    }

    /// Mutation phase of a project's tasks.
    #[must_use]
    pub fn task_phase(&self, path: ProjectPath) -> MutationPhase {
        self.tasks.phase(CollectionKey::ProjectTasks(path))
    }

    /// Mutation phase of a project's lanes.
    #[must_use]
    pub fn lane_phase(&self, path: ProjectPath) -> MutationPhase {
        self.lanes.phase(CollectionKey::ProjectLanes(path))
    }

    /// Loads a team's projects.
    pub async fn load_projects(&self, team_id: TeamId) -> RefreshOutcome<ProjectView> {
        let remote = Arc::clone(&self.remote);
        self.projects
            .refresh(CollectionKey::TeamProjects(team_id), async move {
                remote.list_projects(team_id).await
            })
            .await
    }

    /// Loads a project's lanes.
    pub async fn load_lanes(&self, path: ProjectPath) -> RefreshOutcome<LaneView> {
        let remote = Arc::clone(&self.remote);
        self.lanes
            .refresh(CollectionKey::ProjectLanes(path), async move {
                remote.list_lanes(path).await
            })
            .await
    }

    /// Loads a project's tasks.
    pub async fn load_tasks(&self, path: ProjectPath) -> RefreshOutcome<TaskView> {
        let remote = Arc::clone(&self.remote);
        self.tasks
            .refresh(CollectionKey::ProjectTasks(path), async move {
                remote.list_tasks(path).await
            })
            .await
    }

    /// Creates a task, showing a placeholder at the end of the collection
    /// until the server assigns its identity and key.
    pub async fn create_task(
        &self,
        path: ProjectPath,
        body: CreateTaskBody,
    ) -> MutationOutcome<TaskView> {
        let key = CollectionKey::ProjectTasks(path);
        let placeholder = match self.task_placeholder(path, &body) {
            Ok(placeholder) => placeholder,
            Err(err) => return self.tasks.reject(key, err),
        };
        let outcome = self
            .tasks
            .mutate(
                key,
                Speculation::Append(placeholder),
                self.remote.create_task(path, body),
            )
            .await;
        self.after_task_write(path, &outcome, false);
        outcome
    }

    /// Changes a loaded task.
    pub async fn update_task(
        &self,
        path: ProjectPath,
        task_id: TaskId,
        body: UpdateTaskBody,
    ) -> MutationOutcome<TaskView> {
        let key = CollectionKey::ProjectTasks(path);
        let next = match self.updated_task(path, task_id, &body) {
            Ok(next) => next,
            Err(err) => return self.tasks.reject(key, err),
        };
        let outcome = self
            .tasks
            .mutate(
                key,
                Speculation::Replace(next),
                self.remote.update_task(path, task_id, body),
            )
            .await;
        self.after_task_write(path, &outcome, false);
        outcome
    }

    /// Moves a loaded task just before `body.before` in the target lane, or
    /// to the end of that lane.
    pub async fn move_task(
        &self,
        path: ProjectPath,
        task_id: TaskId,
        body: MoveTaskBody,
    ) -> MutationOutcome<TaskView> {
        let key = CollectionKey::ProjectTasks(path);
        let (next, renumbered) = match self.moved_task(key, task_id, &body) {
            Ok(moved) => moved,
            Err(err) => return self.tasks.reject(key, err),
        };
        let renumbers = !renumbered.is_empty();
        let before = body.before;
        let outcome = self
            .tasks
            .mutate(
                key,
                Speculation::Relocate {
                    item: next,
                    before,
                    renumbered,
                },
                self.remote.move_task(path, task_id, body),
            )
            .await;
        // The server renumbers its own bucket, which may hold unloaded tasks.
        self.after_task_write(path, &outcome, renumbers);
        outcome
    }

    /// Deletes a task.
    pub async fn delete_task(&self, path: ProjectPath, task_id: TaskId) -> MutationOutcome<()> {
        let outcome = self
            .tasks
            .remove(
                CollectionKey::ProjectTasks(path),
                task_id,
                self.remote.delete_task(path, task_id),
            )
            .await;
        self.after_task_write(path, &outcome, false);
        outcome
    }

    /// Creates a lane appended after its siblings unless an order is given.
    ///
    /// A key already present in the loaded lanes is rejected before any
    /// request is made.
    pub async fn create_lane(
        &self,
        path: ProjectPath,
        body: CreateLaneBody,
    ) -> MutationOutcome<LaneView> {
        let key = CollectionKey::ProjectLanes(path);
        let placeholder = match self.lane_placeholder(path, &body) {
            Ok(placeholder) => placeholder,
            Err(err) => return self.lanes.reject(key, err),
        };
        let is_default = placeholder.is_default;
        let outcome = self
            .lanes
            .mutate(
                key,
                Speculation::Append(placeholder),
                self.remote.create_lane(path, body),
            )
            .await;
        // A new default lane took the flag from its siblings on the server.
        self.after_lane_write(path, &outcome, is_default);
        outcome
    }

    /// Renames a loaded lane.
    pub async fn rename_lane(
        &self,
        path: ProjectPath,
        lane_id: LaneId,
        name: impl Into<String>,
    ) -> MutationOutcome<LaneView> {
        let key = CollectionKey::ProjectLanes(path);
        let raw: String = name.into();
        let next = match self.renamed_lane(key, lane_id, &raw) {
            Ok(next) => next,
            Err(err) => return self.lanes.reject(key, err),
        };
        let body = UpdateLaneBody {
            name: Some(raw),
            ..UpdateLaneBody::default()
        };
        let outcome = self
            .lanes
            .mutate(
                key,
                Speculation::Replace(next),
                self.remote.update_lane(path, lane_id, body),
            )
            .await;
        self.after_lane_write(path, &outcome, false);
        outcome
    }

    /// Moves a loaded lane just before `before`, or to the end.
    pub async fn move_lane(
        &self,
        path: ProjectPath,
        lane_id: LaneId,
        before: Option<LaneId>,
    ) -> MutationOutcome<LaneView> {
        let key = CollectionKey::ProjectLanes(path);
        let (next, renumbered) = match self.moved_lane(key, lane_id, before) {
            Ok(moved) => moved,
            Err(err) => return self.lanes.reject(key, err),
        };
        let renumbers = !renumbered.is_empty();
        let outcome = self
            .lanes
            .mutate(
                key,
                Speculation::Relocate {
                    item: next,
                    before,
                    renumbered,
                },
                self.remote.move_lane(path, lane_id, MoveLaneBody { before }),
            )
            .await;
        self.after_lane_write(path, &outcome, renumbers);
        outcome
    }

    /// Deletes a lane. The server moves its tasks to a fallback lane, so the
    /// project's tasks are refetched once the deletion commits.
    ///
    /// Deleting the only loaded lane is rejected before any request is made.
    pub async fn delete_lane(&self, path: ProjectPath, lane_id: LaneId) -> MutationOutcome<()> {
        let key = CollectionKey::ProjectLanes(path);
        let loaded = self.lanes.store().items(key);
        let is_last = loaded.len() == 1 && loaded.iter().all(|lane| lane.id == lane_id);
        if is_last {
            return self.lanes.reject(
                key,
                RemoteError::new(ErrorKind::Conflict, "cannot delete the last lane of a project"),
            );
        }
        let outcome = self
            .lanes
            .remove(key, lane_id, self.remote.delete_lane(path, lane_id))
            .await;
        if outcome.is_committed() {
            self.refresh_tasks(path);
        }
        self.after_lane_write(path, &outcome, false);
        outcome
    }

    fn task_placeholder(&self, path: ProjectPath, body: &CreateTaskBody) -> RemoteResult<TaskView> {
        let title = TaskTitle::new(body.title.clone()).map_err(|err| invalid(&err))?;
        let description =
            normalize_description(body.description.clone()).map_err(|err| invalid(&err))?;
        let status = match &body.status {
            Some(raw) => LaneKey::new(raw.clone()).map_err(|err| invalid(&err))?,
            None => self.default_status(path)?,
        };
        let priority = body
            .priority
            .as_deref()
            .map(TaskPriority::try_from)
            .transpose()
            .map_err(|err| invalid(&err))?
            .unwrap_or_default();
        let order = match body.order {
            Some(value) => position(value)?,
            None => self.append_to_lane(CollectionKey::ProjectTasks(path), &status, None)?,
        };
        let now = self.clock.utc();
        Ok(TaskView {
            id: TaskId::new(),
            project_id: path.project_id,
            key: String::new(),
            local_id: 0,
            creator_id: self.acting_user,
            title: title.as_str().to_owned(),
            description,
            status,
            priority,
            due_date: body.due_date,
            assignee_id: body.assignee_id,
            order: order.value(),
            created_at: now,
            updated_at: now,
        })
    }

    fn updated_task(
        &self,
        path: ProjectPath,
        task_id: TaskId,
        body: &UpdateTaskBody,
    ) -> RemoteResult<TaskView> {
        let key = CollectionKey::ProjectTasks(path);
        let mut next = self
            .tasks
            .store()
            .find(key, &task_id)
            .ok_or_else(|| not_loaded("task"))?;
        if let Some(raw) = &body.title {
            let title = TaskTitle::new(raw.clone()).map_err(|err| invalid(&err))?;
            next.title = title.as_str().to_owned();
        }
        if let Some(description) = &body.description {
            next.description =
                normalize_description(description.clone()).map_err(|err| invalid(&err))?;
        }
        if let Some(raw) = &body.priority {
            next.priority = TaskPriority::try_from(raw.as_str()).map_err(|err| invalid(&err))?;
        }
        if let Some(due_date) = body.due_date {
            next.due_date = due_date;
        }
        if let Some(assignee_id) = body.assignee_id {
            next.assignee_id = assignee_id;
        }
        if let Some(raw) = &body.status {
            let status = LaneKey::new(raw.clone()).map_err(|err| invalid(&err))?;
            if status != next.status && body.order.is_none() {
                next.order = self.append_to_lane(key, &status, Some(task_id))?.value();
            }
            next.status = status;
        }
        if let Some(value) = body.order {
            next.order = position(value)?.value();
        }
        next.updated_at = self.clock.utc();
        Ok(next)
    }

    fn moved_task(
        &self,
        key: CollectionKey,
        task_id: TaskId,
        body: &MoveTaskBody,
    ) -> RemoteResult<(TaskView, Vec<TaskView>)> {
        let mut next = self
            .tasks
            .store()
            .find(key, &task_id)
            .ok_or_else(|| not_loaded("task"))?;
        if let Some(raw) = &body.status {
            next.status = LaneKey::new(raw.clone()).map_err(|err| invalid(&err))?;
        }
        let loaded = self.tasks.store().items(key);
        let siblings = bucket(&loaded, &task_id, |task: &TaskView| {
            (task.status == next.status).then_some((task.id, task.order))
        })?;
        let placement = place_before(&siblings, body.before.as_ref())
            .ok_or_else(|| not_loaded("target task"))?;
        next.order = placement.order.value();
        next.updated_at = self.clock.utc();
        let renumbered = shifted(&loaded, placement.renumbered, |task, order| {
            let mut sibling = task.clone();
            sibling.order = order;
            sibling
        });
        Ok((next, renumbered))
    }

    fn lane_placeholder(&self, path: ProjectPath, body: &CreateLaneBody) -> RemoteResult<LaneView> {
        let name = LaneName::new(body.name.clone()).map_err(|err| invalid(&err))?;
        let lane_key = match &body.key {
            Some(raw) => LaneKey::new(raw.clone()),
            None => LaneKey::derive(name.as_str()),
        }
        .map_err(|err| invalid(&err))?;
        let key = CollectionKey::ProjectLanes(path);
        let loaded = self.lanes.store().items(key);
        if loaded.iter().any(|lane| lane.key == lane_key) {
            return Err(RemoteError::new(
                ErrorKind::Conflict,
                format!("lane key `{lane_key}` already exists in this project"),
            ));
        }
        let color = body
            .color
            .clone()
            .map(LaneColor::new)
            .transpose()
            .map_err(|err| invalid(&err))?
            .unwrap_or_default();
        let order = match body.order {
            Some(value) => position(value)?,
            None => append_after(highest(loaded.iter().map(|lane| lane.order))?),
        };
        let now = self.clock.utc();
        Ok(LaneView {
            id: LaneId::new(),
            project_id: path.project_id,
            key: lane_key,
            name: name.as_str().to_owned(),
            color: color.as_str().to_owned(),
            order: order.value(),
            is_default: body.is_default,
            created_at: now,
            updated_at: now,
        })
    }

    fn renamed_lane(&self, key: CollectionKey, lane_id: LaneId, raw: &str) -> RemoteResult<LaneView> {
        let name = LaneName::new(raw).map_err(|err| invalid(&err))?;
        let mut next = self
            .lanes
            .store()
            .find(key, &lane_id)
            .ok_or_else(|| not_loaded("lane"))?;
        next.name = name.as_str().to_owned();
        next.updated_at = self.clock.utc();
        Ok(next)
    }

    fn moved_lane(
        &self,
        key: CollectionKey,
        lane_id: LaneId,
        before: Option<LaneId>,
    ) -> RemoteResult<(LaneView, Vec<LaneView>)> {
        let mut next = self
            .lanes
            .store()
            .find(key, &lane_id)
            .ok_or_else(|| not_loaded("lane"))?;
        let loaded = self.lanes.store().items(key);
        let siblings = bucket(&loaded, &lane_id, |lane: &LaneView| Some((lane.id, lane.order)))?;
        let placement =
            place_before(&siblings, before.as_ref()).ok_or_else(|| not_loaded("target lane"))?;
        next.order = placement.order.value();
        next.updated_at = self.clock.utc();
        let renumbered = shifted(&loaded, placement.renumbered, |lane, order| {
            let mut sibling = lane.clone();
            sibling.order = order;
            sibling
        });
        Ok((next, renumbered))
    }

    /// The loaded default lane, else the first loaded lane, else the lane
    /// every project is seeded with first.
    fn default_status(&self, path: ProjectPath) -> RemoteResult<LaneKey> {
        let mut lanes = self.lanes.store().items(CollectionKey::ProjectLanes(path));
        lanes.sort_by(|left, right| left.order.total_cmp(&right.order));
        let chosen = lanes
            .iter()
            .find(|lane| lane.is_default)
            .or_else(|| lanes.first())
            .map(|lane| lane.key.clone());
        match chosen {
            Some(status) => Ok(status),
            None => LaneKey::new(FIRST_SEEDED_LANE).map_err(|err| invalid(&err)),
        }
    }

    fn append_to_lane(
        &self,
        key: CollectionKey,
        status: &LaneKey,
        moved: Option<TaskId>,
    ) -> RemoteResult<SortOrder> {
        let loaded = self.tasks.store().items(key);
        let max = highest(
            loaded
                .iter()
                .filter(|task| &task.status == status && Some(task.id) != moved)
                .map(|task| task.order),
        )?;
        Ok(append_after(max))
    }

    fn after_task_write<T>(&self, path: ProjectPath, outcome: &MutationOutcome<T>, force: bool) {
        if outcome.is_committed() && (force || self.reconcile) {
            self.refresh_tasks(path);
        }
    }

    fn after_lane_write<T>(&self, path: ProjectPath, outcome: &MutationOutcome<T>, force: bool) {
        if outcome.is_committed() && (force || self.reconcile) {
            let remote = Arc::clone(&self.remote);
            drop(self.lanes.spawn_refresh(
                CollectionKey::ProjectLanes(path),
                async move { remote.list_lanes(path).await },
            ));
        }
    }

    fn refresh_tasks(&self, path: ProjectPath) {
        let remote = Arc::clone(&self.remote);
        drop(self.tasks.spawn_refresh(
            CollectionKey::ProjectTasks(path),
            async move { remote.list_tasks(path).await },
        ));
    }
}
