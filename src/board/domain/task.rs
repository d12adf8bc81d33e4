//! Task aggregate root.

use super::{BoardDomainError, LaneKey, LocalId, ParseTaskPriorityError, SortOrder, TaskId};
use crate::tenancy::domain::{ProjectId, UserId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum task title length, matching `VARCHAR(500)`.
const MAX_TITLE_LENGTH: usize = 500;

/// Maximum description length.
const MAX_DESCRIPTION_LENGTH: usize = 20_000;

/// Validated task title.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskTitle(String);

impl TaskTitle {
    /// Creates a validated title.
    ///
    /// # Errors
    ///
    /// Returns [`BoardDomainError::EmptyTaskTitle`] for blank input and
    /// [`BoardDomainError::TooLong`] beyond 500 characters.
    pub fn new(value: impl Into<String>) -> Result<Self, BoardDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(BoardDomainError::EmptyTaskTitle);
        }
        if trimmed.chars().count() > MAX_TITLE_LENGTH {
            return Err(BoardDomainError::TooLong {
                field: "title",
                max: MAX_TITLE_LENGTH,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the title as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validates an optional description, mapping blank text to `None`.
///
/// # Errors
///
/// Returns [`BoardDomainError::TooLong`] beyond 20 000 characters.
pub fn normalize_description(value: Option<String>) -> Result<Option<String>, BoardDomainError> {
    let Some(text) = value else {
        return Ok(None);
    };
    if text.chars().count() > MAX_DESCRIPTION_LENGTH {
        return Err(BoardDomainError::TooLong {
            field: "description",
            max: MAX_DESCRIPTION_LENGTH,
        });
    }
    if text.trim().is_empty() {
        return Ok(None);
    }
    Ok(Some(text))
}

/// Task urgency.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    /// No priority assigned.
    #[default]
    None,
    /// Low priority.
    Low,
    /// Medium priority.
    Medium,
    /// High priority.
    High,
    /// Needs immediate attention.
    Urgent,
}

impl TaskPriority {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }
}

impl TryFrom<&str> for TaskPriority {
    type Error = ParseTaskPriorityError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "none" | "" => Ok(Self::None),
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "urgent" => Ok(Self::Urgent),
            _ => Err(ParseTaskPriorityError(value.to_owned())),
        }
    }
}

/// Validated inputs for a new task.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskDraft {
    /// Owning project.
    pub project_id: ProjectId,
    /// Creating user.
    pub creator_id: UserId,
    /// Allocated per-project number.
    pub local_id: LocalId,
    /// Title.
    pub title: TaskTitle,
    /// Optional description.
    pub description: Option<String>,
    /// Key of the lane the task sits in.
    pub status: LaneKey,
    /// Urgency.
    pub priority: TaskPriority,
    /// Optional due date.
    pub due_date: Option<DateTime<Utc>>,
    /// Optional assignee.
    pub assignee_id: Option<UserId>,
    /// Position within the status bucket.
    pub order: SortOrder,
}

/// Task aggregate root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    project_id: ProjectId,
    creator_id: UserId,
    local_id: LocalId,
    title: TaskTitle,
    description: Option<String>,
    status: LaneKey,
    priority: TaskPriority,
    due_date: Option<DateTime<Utc>>,
    assignee_id: Option<UserId>,
    order: SortOrder,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted task.
#[derive(Debug, Clone, PartialEq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted fields shared with new tasks.
    pub draft: TaskDraft,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a new task.
    #[must_use]
    pub fn new(draft: TaskDraft, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        Self::assemble(TaskId::new(), draft, timestamp, timestamp)
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self::assemble(data.id, data.draft, data.created_at, data.updated_at)
    }

    fn assemble(
        id: TaskId,
        draft: TaskDraft,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        let TaskDraft {
            project_id,
            creator_id,
            local_id,
            title,
            description,
            status,
            priority,
            due_date,
            assignee_id,
            order,
        } = draft;
        Self {
            id,
            project_id,
            creator_id,
            local_id,
            title,
            description,
            status,
            priority,
            due_date,
            assignee_id,
            order,
            created_at,
            updated_at,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the owning project.
    #[must_use]
    pub const fn project_id(&self) -> ProjectId {
        self.project_id
    }

    /// Returns the creating user.
    #[must_use]
    pub const fn creator_id(&self) -> UserId {
        self.creator_id
    }

    /// Returns the per-project number.
    #[must_use]
    pub const fn local_id(&self) -> LocalId {
        self.local_id
    }

    /// Returns the title.
    #[must_use]
    pub const fn title(&self) -> &TaskTitle {
        &self.title
    }

    /// Returns the description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the key of the lane the task sits in.
    #[must_use]
    pub const fn status(&self) -> &LaneKey {
        &self.status
    }

    /// Returns the urgency.
    #[must_use]
    pub const fn priority(&self) -> TaskPriority {
        self.priority
    }

    /// Returns the due date, if any.
    #[must_use]
    pub const fn due_date(&self) -> Option<DateTime<Utc>> {
        self.due_date
    }

    /// Returns the assignee, if any.
    #[must_use]
    pub const fn assignee_id(&self) -> Option<UserId> {
        self.assignee_id
    }

    /// Returns the position within the status bucket.
    #[must_use]
    pub const fn order(&self) -> SortOrder {
        self.order
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Replaces the title.
    pub fn retitle(&mut self, title: TaskTitle, clock: &impl Clock) {
        self.title = title;
        self.touch(clock);
    }

    /// Replaces the description.
    pub fn describe(&mut self, description: Option<String>, clock: &impl Clock) {
        self.description = description;
        self.touch(clock);
    }

    /// Changes the urgency.
    pub fn prioritize(&mut self, priority: TaskPriority, clock: &impl Clock) {
        self.priority = priority;
        self.touch(clock);
    }

    /// Changes the due date.
    pub fn schedule(&mut self, due_date: Option<DateTime<Utc>>, clock: &impl Clock) {
        self.due_date = due_date;
        self.touch(clock);
    }

    /// Changes the assignee.
    pub fn assign(&mut self, assignee_id: Option<UserId>, clock: &impl Clock) {
        self.assignee_id = assignee_id;
        self.touch(clock);
    }

    /// Moves the task into a lane at the given position.
    pub fn place(&mut self, status: LaneKey, order: SortOrder, clock: &impl Clock) {
        self.status = status;
        self.order = order;
        self.touch(clock);
    }

    /// Moves the task to another lane keeping its position and update
    /// timestamp. Used when its lane is deleted or rekeyed.
    pub fn relabel(&mut self, status: LaneKey) {
        self.status = status;
    }

    /// Changes the position without touching the update timestamp. Used by
    /// bucket renumbering, which is not a user-visible edit.
    pub const fn renumber(&mut self, order: SortOrder) {
        self.order = order;
    }

    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}
