//! Per-project task numbering.

use super::BoardServiceResult;
use crate::board::domain::{LocalId, TaskKey};
use crate::tenancy::{domain::Project, ports::TenancyRepository};
use std::sync::Arc;

/// Hands out per-project local identifiers and their human-readable keys.
///
/// The counter lives on the project row; the repository performs the
/// read-and-increment as one atomic step.
pub struct TaskSequenceAllocator<R>
where
    R: TenancyRepository + ?Sized,
{
    repository: Arc<R>,
}

impl<R> Clone for TaskSequenceAllocator<R>
where
    R: TenancyRepository + ?Sized,
{
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

impl<R> TaskSequenceAllocator<R>
where
    R: TenancyRepository + ?Sized,
{
    /// Creates an allocator backed by the tenancy repository.
    #[must_use]
    pub const fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Takes the next local identifier of `project`.
    ///
    /// # Errors
    ///
    /// Returns a repository error when the project vanished and a domain
    /// error when the counter left the persisted range.
    pub async fn allocate(&self, project: &Project) -> BoardServiceResult<(LocalId, TaskKey)> {
        let value = self.repository.allocate_task_sequence(project.id()).await?;
        let local_id = LocalId::new(value)?;
        let key = TaskKey::new(project.name().as_str(), local_id);
        tracing::debug!(project_id = %project.id(), task_key = %key, "task sequence allocated");
        Ok((local_id, key))
    }
}
