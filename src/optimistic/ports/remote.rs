//! Port to the authoritative board server.

use crate::api::dto::{
    CreateLaneBody, CreateTaskBody, LaneView, MoveLaneBody, MoveTaskBody, ProjectView, TaskView,
    UpdateLaneBody, UpdateTaskBody,
};
use crate::board::domain::{LaneId, TaskId};
use crate::error::ErrorKind;
use crate::tenancy::domain::{ProjectPath, TeamId};
use async_trait::async_trait;
use thiserror::Error;

/// Result type for remote board calls.
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Authoritative board operations as seen from the client.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RemoteBoard: Send + Sync {
    /// Lists the projects of a team.
    async fn list_projects(&self, team_id: TeamId) -> RemoteResult<Vec<ProjectView>>;

    /// Lists the lanes of a project.
    async fn list_lanes(&self, path: ProjectPath) -> RemoteResult<Vec<LaneView>>;

    /// Creates a lane.
    async fn create_lane(&self, path: ProjectPath, body: CreateLaneBody)
    -> RemoteResult<LaneView>;

    /// Changes a lane.
    async fn update_lane(
        &self,
        path: ProjectPath,
        lane_id: LaneId,
        body: UpdateLaneBody,
    ) -> RemoteResult<LaneView>;

    /// Moves a lane.
    async fn move_lane(
        &self,
        path: ProjectPath,
        lane_id: LaneId,
        body: MoveLaneBody,
    ) -> RemoteResult<LaneView>;

    /// Deletes a lane.
    async fn delete_lane(&self, path: ProjectPath, lane_id: LaneId) -> RemoteResult<()>;

    /// Lists the tasks of a project.
    async fn list_tasks(&self, path: ProjectPath) -> RemoteResult<Vec<TaskView>>;

    /// Creates a task.
    async fn create_task(&self, path: ProjectPath, body: CreateTaskBody)
    -> RemoteResult<TaskView>;

    /// Changes a task.
    async fn update_task(
        &self,
        path: ProjectPath,
        task_id: TaskId,
        body: UpdateTaskBody,
    ) -> RemoteResult<TaskView>;

    /// Moves a task.
    async fn move_task(
        &self,
        path: ProjectPath,
        task_id: TaskId,
        body: MoveTaskBody,
    ) -> RemoteResult<TaskView>;

    /// Deletes a task.
    async fn delete_task(&self, path: ProjectPath, task_id: TaskId) -> RemoteResult<()>;
}

/// Failure reported by the remote board.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct RemoteError {
    kind: ErrorKind,
    message: String,
}

impl RemoteError {
    /// Creates an error of the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Creates an error for a failed round trip.
    #[must_use]
    pub fn transport(err: &impl std::error::Error) -> Self {
        Self::new(ErrorKind::Internal, err.to_string())
    }

    /// Returns the error kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}
