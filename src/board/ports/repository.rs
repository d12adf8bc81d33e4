//! Repository port for lanes and tasks.

use crate::board::domain::{Lane, LaneId, LaneKey, LocalId, SortOrder, Task, TaskId};
use crate::tenancy::domain::ProjectId;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for board repository operations.
pub type BoardRepositoryResult<T> = Result<T, BoardRepositoryError>;

/// Lane and task persistence contract.
///
/// Reads return items sorted ascending by position with the most recently
/// created item first among equal positions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BoardRepository: Send + Sync {
    /// Lists the lanes of a project.
    async fn list_lanes(&self, project_id: ProjectId) -> BoardRepositoryResult<Vec<Lane>>;

    /// Inserts `seeds` only when the project has no lanes yet, then returns
    /// the project's lanes. Check and insert happen atomically, so concurrent
    /// first readers never seed twice.
    async fn insert_lanes_if_absent(
        &self,
        project_id: ProjectId,
        seeds: &[Lane],
    ) -> BoardRepositoryResult<Vec<Lane>>;

    /// Stores a new lane. When the lane is default, every sibling loses its
    /// default flag in the same write.
    ///
    /// # Errors
    ///
    /// Returns [`BoardRepositoryError::DuplicateLaneKey`] when the key is
    /// already used within the project.
    async fn store_lane(&self, lane: &Lane) -> BoardRepositoryResult<()>;

    /// Persists a changed lane.
    ///
    /// When the lane is default, siblings lose their default flag. When the
    /// key changed, tasks referencing the previous key move to the new key.
    /// Both happen in the same write as the update.
    ///
    /// # Errors
    ///
    /// Returns [`BoardRepositoryError::LaneNotFound`] when the lane is missing
    /// and [`BoardRepositoryError::DuplicateLaneKey`] on a key collision.
    async fn update_lane(&self, lane: &Lane) -> BoardRepositoryResult<()>;

    /// Finds a lane by identifier.
    async fn find_lane(&self, id: LaneId) -> BoardRepositoryResult<Option<Lane>>;

    /// Writes new positions for several lanes at once.
    async fn reorder_lanes(&self, positions: &[(LaneId, SortOrder)]) -> BoardRepositoryResult<()>;

    /// Moves every task of the lane to `fallback` and removes the lane,
    /// returning the number of reassigned tasks.
    ///
    /// # Errors
    ///
    /// Returns [`BoardRepositoryError::LastLane`] when the lane is the only
    /// one left in its project and [`BoardRepositoryError::LaneNotFound`]
    /// when the lane or the fallback key is missing.
    async fn delete_lane_reassigning(
        &self,
        id: LaneId,
        fallback: &LaneKey,
    ) -> BoardRepositoryResult<u64>;

    /// Stores a new task. The status lane must exist at write time; a lane
    /// deletion cannot interleave with the check.
    ///
    /// # Errors
    ///
    /// Returns [`BoardRepositoryError::DuplicateLocalId`] when the local
    /// identifier is already used within the project and
    /// [`BoardRepositoryError::UnknownLane`] when no lane of the project
    /// has the task's status.
    async fn store_task(&self, task: &Task) -> BoardRepositoryResult<()>;

    /// Persists a changed task, checking its status lane like
    /// [`store_task`](Self::store_task).
    ///
    /// # Errors
    ///
    /// Returns [`BoardRepositoryError::TaskNotFound`] when the task is
    /// missing and [`BoardRepositoryError::UnknownLane`] when its status
    /// lane is gone.
    async fn update_task(&self, task: &Task) -> BoardRepositoryResult<()>;

    /// Finds a task by identifier.
    async fn find_task(&self, id: TaskId) -> BoardRepositoryResult<Option<Task>>;

    /// Removes a task.
    ///
    /// # Errors
    ///
    /// Returns [`BoardRepositoryError::TaskNotFound`] when the task is
    /// missing.
    async fn delete_task(&self, id: TaskId) -> BoardRepositoryResult<()>;

    /// Lists a project's tasks, optionally only those in one lane.
    async fn list_tasks<'a>(
        &self,
        project_id: ProjectId,
        status: Option<&'a LaneKey>,
    ) -> BoardRepositoryResult<Vec<Task>>;

    /// Writes new positions for several tasks at once.
    async fn reorder_tasks(&self, positions: &[(TaskId, SortOrder)]) -> BoardRepositoryResult<()>;
}

/// Errors returned by board repository implementations.
#[derive(Debug, Clone, Error)]
pub enum BoardRepositoryError {
    /// Another lane of the project already uses the key.
    #[error("lane key '{key}' already exists in project {project_id}")]
    DuplicateLaneKey {
        /// Project identifier.
        project_id: ProjectId,
        /// Conflicting key.
        key: LaneKey,
    },

    /// Another task of the project already uses the local identifier.
    #[error("local task id {local_id} already exists in project {project_id}")]
    DuplicateLocalId {
        /// Project identifier.
        project_id: ProjectId,
        /// Conflicting local identifier.
        local_id: LocalId,
    },

    /// The lane was not found.
    #[error("lane not found: {0}")]
    LaneNotFound(LaneId),

    /// The task was not found.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// No lane of the project has the key a task was written with.
    #[error("no lane '{key}' in project {project_id}")]
    UnknownLane {
        /// Project identifier.
        project_id: ProjectId,
        /// Missing key.
        key: LaneKey,
    },

    /// The lane is the last one of its project.
    #[error("lane {0} is the last lane of its project")]
    LastLane(LaneId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl BoardRepositoryError {
    /// Wraps a persistence error.
    #[must_use]
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
