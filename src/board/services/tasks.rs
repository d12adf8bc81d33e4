//! Service layer for tasks.

use super::{BoardServiceError, BoardServiceResult, LaneService, TaskSequenceAllocator};
use crate::board::{
    domain::{
        Lane, LaneKey, SortOrder, Task, TaskDraft, TaskId, TaskKey, TaskPriority, TaskTitle,
        normalize_description,
        ordering::{append_after, place_before},
    },
    ports::BoardRepository,
};
use crate::error::Resource;
use crate::tenancy::{
    domain::{Principal, Project, ProjectPath, UserId},
    ports::TenancyRepository,
    services::AccessScopeResolver,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use std::sync::Arc;

/// Request payload for creating a task.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateTaskRequest {
    title: String,
    description: Option<String>,
    status: Option<String>,
    priority: Option<String>,
    due_date: Option<DateTime<Utc>>,
    assignee_id: Option<UserId>,
    order: Option<f64>,
}

impl CreateTaskRequest {
    /// Creates a request with the required title.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            status: None,
            priority: None,
            due_date: None,
            assignee_id: None,
            order: None,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Places the task in the lane with this key instead of the default lane.
    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Sets the priority.
    #[must_use]
    pub fn with_priority(mut self, priority: impl Into<String>) -> Self {
        self.priority = Some(priority.into());
        self
    }

    /// Sets the due date.
    #[must_use]
    pub const fn with_due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Sets the assignee.
    #[must_use]
    pub const fn with_assignee(mut self, assignee_id: UserId) -> Self {
        self.assignee_id = Some(assignee_id);
        self
    }

    /// Sets an explicit position instead of appending to the lane.
    #[must_use]
    pub const fn with_order(mut self, order: f64) -> Self {
        self.order = Some(order);
        self
    }
}

/// Request payload for changing a task. Absent fields stay unchanged; the
/// nested options of clearable fields distinguish "clear" from "keep".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateTaskRequest {
    /// New title.
    pub title: Option<String>,
    /// New or cleared description.
    pub description: Option<Option<String>>,
    /// Key of the lane to move to; the task is appended there unless
    /// `order` is also set.
    pub status: Option<String>,
    /// New priority.
    pub priority: Option<String>,
    /// New or cleared due date.
    pub due_date: Option<Option<DateTime<Utc>>>,
    /// New or cleared assignee.
    pub assignee_id: Option<Option<UserId>>,
    /// New explicit position.
    pub order: Option<f64>,
}

/// Request payload for a drag-and-drop move.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MoveTaskRequest {
    /// Lane to move into; the current lane when absent.
    pub status: Option<String>,
    /// Task to land just before; the end of the lane when absent.
    pub before: Option<TaskId>,
}

/// A task together with its human-readable key.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskDetails {
    /// The task.
    pub task: Task,
    /// Key such as `"ABC-07"`.
    pub key: TaskKey,
}

impl TaskDetails {
    fn of(project: &Project, task: Task) -> Self {
        let key = TaskKey::new(project.name().as_str(), task.local_id());
        Self { task, key }
    }
}

/// Task orchestration service.
pub struct TaskService<T, B, C>
where
    T: TenancyRepository + ?Sized,
    B: BoardRepository + ?Sized,
    C: Clock + Send + Sync,
{
    scope: AccessScopeResolver<T>,
    lanes: LaneService<T, B, C>,
    sequence: TaskSequenceAllocator<T>,
    board: Arc<B>,
    clock: Arc<C>,
}

impl<T, B, C> Clone for TaskService<T, B, C>
where
    T: TenancyRepository + ?Sized,
    B: BoardRepository + ?Sized,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            scope: self.scope.clone(),
            lanes: self.lanes.clone(),
            sequence: self.sequence.clone(),
            board: Arc::clone(&self.board),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<T, B, C> TaskService<T, B, C>
where
    T: TenancyRepository + ?Sized,
    B: BoardRepository + ?Sized,
    C: Clock + Send + Sync,
{
    /// Creates a new task service.
    #[must_use]
    pub fn new(tenancy: Arc<T>, board: Arc<B>, clock: Arc<C>) -> Self {
        let scope = AccessScopeResolver::new(Arc::clone(&tenancy));
        let lanes = LaneService::new(scope.clone(), Arc::clone(&board), Arc::clone(&clock));
        Self {
            scope,
            lanes,
            sequence: TaskSequenceAllocator::new(tenancy),
            board,
            clock,
        }
    }

    /// Lists the tasks of an accessible project, optionally only one lane.
    ///
    /// # Errors
    ///
    /// Returns not-found when out of scope and a validation error for a
    /// malformed status.
    pub async fn list_tasks(
        &self,
        principal: &Principal,
        path: ProjectPath,
        status_filter: Option<String>,
    ) -> BoardServiceResult<Vec<TaskDetails>> {
        let project = self.scope.require_project(principal, path).await?;
        let status = status_filter.map(LaneKey::new).transpose()?;
        let tasks = self
            .board
            .list_tasks(project.id(), status.as_ref())
            .await?;
        Ok(tasks
            .into_iter()
            .map(|task| TaskDetails::of(&project, task))
            .collect())
    }

    /// Returns an accessible task.
    ///
    /// # Errors
    ///
    /// Returns not-found when the task or its project is out of scope.
    pub async fn get_task(
        &self,
        principal: &Principal,
        path: ProjectPath,
        task_id: TaskId,
    ) -> BoardServiceResult<TaskDetails> {
        let project = self.scope.require_project(principal, path).await?;
        let task = self.require_task(&project, task_id).await?;
        Ok(TaskDetails::of(&project, task))
    }

    /// Creates a task.
    ///
    /// Without a status the task lands in the default lane (or the first lane
    /// when none is default). Without an order it is appended to its lane.
    /// The local identifier comes from the project's task sequence.
    ///
    /// # Errors
    ///
    /// Returns validation errors for bad input or an unknown status and
    /// not-found when out of scope.
    pub async fn create_task(
        &self,
        principal: &Principal,
        path: ProjectPath,
        request: CreateTaskRequest,
    ) -> BoardServiceResult<TaskDetails> {
        let project = self.scope.require_project(principal, path).await?;
        let lanes = self.lanes.ensure_lanes(project.id()).await?;
        let status = match request.status {
            Some(raw) => known_status(&lanes, LaneKey::new(raw)?)?,
            None => default_status(&lanes).ok_or(BoardServiceError::NotFound(Resource::Lane))?,
        };
        let title = TaskTitle::new(request.title)?;
        let description = normalize_description(request.description)?;
        let priority = request
            .priority
            .as_deref()
            .map(TaskPriority::try_from)
            .transpose()?
            .unwrap_or_default();
        let order = match request.order {
            Some(value) => SortOrder::new(value)?,
            None => self.append_position(&project, &status).await?,
        };
        let (local_id, key) = self.sequence.allocate(&project).await?;
        let task = Task::new(
            TaskDraft {
                project_id: project.id(),
                creator_id: principal.user_id(),
                local_id,
                title,
                description,
                status,
                priority,
                due_date: request.due_date,
                assignee_id: request.assignee_id,
                order,
            },
            &*self.clock,
        );
        self.board
            .store_task(&task)
            .await
            .map_err(BoardServiceError::from_task_write)?;
        tracing::info!(
            project_id = %project.id(),
            task_id = %task.id(),
            task_key = %key,
            status = %task.status(),
            "task created"
        );
        Ok(TaskDetails { task, key })
    }

    /// Changes a task.
    ///
    /// # Errors
    ///
    /// Returns validation errors for bad input or an unknown status and
    /// not-found when out of scope.
    pub async fn update_task(
        &self,
        principal: &Principal,
        path: ProjectPath,
        task_id: TaskId,
        request: UpdateTaskRequest,
    ) -> BoardServiceResult<TaskDetails> {
        let project = self.scope.require_project(principal, path).await?;
        let mut task = self.require_task(&project, task_id).await?;
        let clock = &*self.clock;
        if let Some(raw) = request.title {
            task.retitle(TaskTitle::new(raw)?, clock);
        }
        if let Some(description) = request.description {
            task.describe(normalize_description(description)?, clock);
        }
        if let Some(raw) = request.priority {
            task.prioritize(TaskPriority::try_from(raw.as_str())?, clock);
        }
        if let Some(due_date) = request.due_date {
            task.schedule(due_date, clock);
        }
        if let Some(assignee_id) = request.assignee_id {
            task.assign(assignee_id, clock);
        }
        let explicit_order = request.order.map(SortOrder::new).transpose()?;
        let next_status = match request.status {
            Some(raw) => {
                let key = LaneKey::new(raw)?;
                if &key == task.status() {
                    None
                } else {
                    let lanes = self.lanes.ensure_lanes(project.id()).await?;
                    Some(known_status(&lanes, key)?)
                }
            }
            None => None,
        };
        match (next_status, explicit_order) {
            (Some(status), Some(order)) => task.place(status, order, clock),
            (Some(status), None) => {
                let order = self.append_position(&project, &status).await?;
                task.place(status, order, clock);
            }
            (None, Some(order)) => task.place(task.status().clone(), order, clock),
            (None, None) => {}
        }
        self.board
            .update_task(&task)
            .await
            .map_err(BoardServiceError::from_task_write)?;
        tracing::info!(project_id = %project.id(), %task_id, "task updated");
        Ok(TaskDetails::of(&project, task))
    }

    /// Moves a task just before another task of the target lane, or to the
    /// end of that lane. The lane is renumbered first when the gap between
    /// the neighbours is exhausted.
    ///
    /// # Errors
    ///
    /// Returns not-found when the task, the target task or the project is
    /// out of reach and a validation error for an unknown status.
    pub async fn move_task(
        &self,
        principal: &Principal,
        path: ProjectPath,
        task_id: TaskId,
        request: MoveTaskRequest,
    ) -> BoardServiceResult<TaskDetails> {
        let project = self.scope.require_project(principal, path).await?;
        let mut task = self.require_task(&project, task_id).await?;
        let status = match request.status {
            Some(raw) => {
                let lanes = self.lanes.ensure_lanes(project.id()).await?;
                known_status(&lanes, LaneKey::new(raw)?)?
            }
            None => task.status().clone(),
        };
        let siblings: Vec<(TaskId, SortOrder)> = self
            .board
            .list_tasks(project.id(), Some(&status))
            .await?
            .iter()
            .filter(|sibling| sibling.id() != task_id)
            .map(|sibling| (sibling.id(), sibling.order()))
            .collect();
        let placement = place_before(&siblings, request.before.as_ref())
            .ok_or(BoardServiceError::NotFound(Resource::Task))?;
        if let Some(fresh) = placement.renumbered {
            tracing::debug!(
                project_id = %project.id(),
                %status,
                tasks = fresh.len(),
                "renumbering lane tasks"
            );
            self.board.reorder_tasks(&fresh).await?;
        }
        task.place(status, placement.order, &*self.clock);
        self.board
            .update_task(&task)
            .await
            .map_err(BoardServiceError::from_task_write)?;
        tracing::debug!(%task_id, order = %task.order(), status = %task.status(), "task moved");
        Ok(TaskDetails::of(&project, task))
    }

    /// Deletes a task. Its local identifier is never reused.
    ///
    /// # Errors
    ///
    /// Returns not-found when out of scope.
    pub async fn delete_task(
        &self,
        principal: &Principal,
        path: ProjectPath,
        task_id: TaskId,
    ) -> BoardServiceResult<()> {
        let project = self.scope.require_project(principal, path).await?;
        let task = self.require_task(&project, task_id).await?;
        self.board.delete_task(task.id()).await?;
        tracing::info!(project_id = %project.id(), %task_id, "task deleted");
        Ok(())
    }

    async fn require_task(&self, project: &Project, task_id: TaskId) -> BoardServiceResult<Task> {
        self.board
            .find_task(task_id)
            .await?
            .filter(|task| task.project_id() == project.id())
            .ok_or(BoardServiceError::NotFound(Resource::Task))
    }

    async fn append_position(
        &self,
        project: &Project,
        status: &LaneKey,
    ) -> BoardServiceResult<SortOrder> {
        let bucket = self.board.list_tasks(project.id(), Some(status)).await?;
        let max = bucket
            .iter()
            .map(Task::order)
            .max_by(|left, right| left.total_cmp(*right));
        Ok(append_after(max))
    }
}

fn known_status(lanes: &[Lane], key: LaneKey) -> BoardServiceResult<LaneKey> {
    if lanes.iter().any(|lane| lane.key() == &key) {
        Ok(key)
    } else {
        Err(BoardServiceError::UnknownStatus(key))
    }
}

fn default_status(lanes: &[Lane]) -> Option<LaneKey> {
    lanes
        .iter()
        .find(|lane| lane.is_default())
        .or_else(|| lanes.first())
        .map(|lane| lane.key().clone())
}
