//! Wire types of the REST surface, shared with the board client.
//!
//! Field names are camelCase on the wire.

use crate::board::{
    domain::{Lane, LaneId, LaneKey, TaskId, TaskPriority},
    services::{
        CreateLaneRequest, CreateTaskRequest, MoveTaskRequest, TaskDetails, UpdateLaneRequest,
        UpdateTaskRequest,
    },
};
use crate::tenancy::{
    domain::{Project, ProjectId, Team, TeamId, TeamMembership, TeamRole, UserId},
    services::{AddMemberRequest, CreateProjectRequest, CreateTeamRequest, UpdateProjectRequest},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Distinguishes an absent field (`None`) from an explicit `null`
/// (`Some(None)`).
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Team representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamView {
    /// Team identifier.
    pub id: TeamId,
    /// Display name.
    pub name: String,
    /// Slug.
    pub slug: String,
    /// Designated owner.
    pub owner_id: UserId,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<&Team> for TeamView {
    fn from(team: &Team) -> Self {
        Self {
            id: team.id(),
            name: team.name().as_str().to_owned(),
            slug: team.slug().as_str().to_owned(),
            owner_id: team.owner_id(),
            created_at: team.created_at(),
        }
    }
}

/// Team membership representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberView {
    /// Team identifier.
    pub team_id: TeamId,
    /// Member identifier.
    pub user_id: UserId,
    /// Role: `owner`, `admin` or `member`.
    pub role: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<&TeamMembership> for MemberView {
    fn from(membership: &TeamMembership) -> Self {
        Self {
            team_id: membership.team_id(),
            user_id: membership.user_id(),
            role: membership.role().as_str().to_owned(),
            created_at: membership.created_at(),
        }
    }
}

/// Project representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectView {
    /// Project identifier.
    pub id: ProjectId,
    /// Owning team.
    pub team_id: TeamId,
    /// Display name.
    pub name: String,
    /// Slug.
    pub slug: String,
    /// Next local task identifier.
    pub task_sequence: u64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl From<&Project> for ProjectView {
    fn from(project: &Project) -> Self {
        Self {
            id: project.id(),
            team_id: project.team_id(),
            name: project.name().as_str().to_owned(),
            slug: project.slug().as_str().to_owned(),
            task_sequence: project.task_sequence(),
            created_at: project.created_at(),
            updated_at: project.updated_at(),
        }
    }
}

/// Lane representation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaneView {
    /// Lane identifier.
    pub id: LaneId,
    /// Owning project.
    pub project_id: ProjectId,
    /// Key referenced by task status.
    pub key: LaneKey,
    /// Display name.
    pub name: String,
    /// Hex color.
    pub color: String,
    /// Fractional position.
    pub order: f64,
    /// Default lane flag.
    pub is_default: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl From<&Lane> for LaneView {
    fn from(lane: &Lane) -> Self {
        Self {
            id: lane.id(),
            project_id: lane.project_id(),
            key: lane.key().clone(),
            name: lane.name().as_str().to_owned(),
            color: lane.color().as_str().to_owned(),
            order: lane.order().value(),
            is_default: lane.is_default(),
            created_at: lane.created_at(),
            updated_at: lane.updated_at(),
        }
    }
}

/// Task representation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskView {
    /// Task identifier.
    pub id: TaskId,
    /// Owning project.
    pub project_id: ProjectId,
    /// Human-readable key such as `ABC-07`.
    pub key: String,
    /// Per-project number.
    pub local_id: u64,
    /// Creating user.
    pub creator_id: UserId,
    /// Title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Key of the lane the task sits in.
    pub status: LaneKey,
    /// Priority.
    pub priority: TaskPriority,
    /// Optional due date.
    pub due_date: Option<DateTime<Utc>>,
    /// Optional assignee.
    pub assignee_id: Option<UserId>,
    /// Fractional position within the lane.
    pub order: f64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl From<&TaskDetails> for TaskView {
    fn from(details: &TaskDetails) -> Self {
        let task = &details.task;
        Self {
            id: task.id(),
            project_id: task.project_id(),
            key: details.key.to_string(),
            local_id: task.local_id().value(),
            creator_id: task.creator_id(),
            title: task.title().as_str().to_owned(),
            description: task.description().map(str::to_owned),
            status: task.status().clone(),
            priority: task.priority(),
            due_date: task.due_date(),
            assignee_id: task.assignee_id(),
            order: task.order().value(),
            created_at: task.created_at(),
            updated_at: task.updated_at(),
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthView {
    /// Always `ok`.
    pub status: String,
    /// Crate version.
    pub version: String,
}

/// Body of `POST /teams`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTeamBody {
    /// Display name.
    pub name: String,
    /// Optional explicit slug.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
}

impl From<CreateTeamBody> for CreateTeamRequest {
    fn from(body: CreateTeamBody) -> Self {
        let request = Self::new(body.name);
        match body.slug {
            Some(slug) => request.with_slug(slug),
            None => request,
        }
    }
}

/// Body of `POST /teams/{team_id}/members`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddMemberBody {
    /// User to add.
    pub user_id: UserId,
    /// Role, `member` when absent.
    #[serde(default = "default_member_role")]
    pub role: String,
}

fn default_member_role() -> String {
    TeamRole::Member.as_str().to_owned()
}

impl From<AddMemberBody> for AddMemberRequest {
    fn from(body: AddMemberBody) -> Self {
        Self::new(body.user_id, body.role)
    }
}

/// Body of `POST /teams/{team_id}/projects`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectBody {
    /// Display name.
    pub name: String,
    /// Optional explicit slug.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
}

impl From<CreateProjectBody> for CreateProjectRequest {
    fn from(body: CreateProjectBody) -> Self {
        let request = Self::new(body.name);
        match body.slug {
            Some(slug) => request.with_slug(slug),
            None => request,
        }
    }
}

/// Body of `PATCH /teams/{team_id}/projects/{project_id}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectBody {
    /// New display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New slug.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
}

impl From<UpdateProjectBody> for UpdateProjectRequest {
    fn from(body: UpdateProjectBody) -> Self {
        Self {
            name: body.name,
            slug: body.slug,
        }
    }
}

/// Body of `POST .../lanes`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLaneBody {
    /// Display name.
    pub name: String,
    /// Optional explicit key; derived from the name when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Optional hex color.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Optional explicit position.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<f64>,
    /// Whether the lane becomes the default.
    #[serde(default)]
    pub is_default: bool,
}

impl From<CreateLaneBody> for CreateLaneRequest {
    fn from(body: CreateLaneBody) -> Self {
        let mut request = Self::new(body.name).with_default(body.is_default);
        if let Some(key) = body.key {
            request = request.with_key(key);
        }
        if let Some(color) = body.color {
            request = request.with_color(color);
        }
        if let Some(order) = body.order {
            request = request.with_order(order);
        }
        request
    }
}

/// Body of `PATCH .../lanes/{lane_id}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLaneBody {
    /// New display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// New hex color.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// New explicit position.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<f64>,
    /// New default flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_default: Option<bool>,
}

impl From<UpdateLaneBody> for UpdateLaneRequest {
    fn from(body: UpdateLaneBody) -> Self {
        Self {
            name: body.name,
            key: body.key,
            color: body.color,
            order: body.order,
            is_default: body.is_default,
        }
    }
}

/// Body of `POST .../lanes/{lane_id}/move`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveLaneBody {
    /// Lane to land just before; the end when absent.
    #[serde(default)]
    pub before: Option<LaneId>,
}

/// Body of `POST .../tasks`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskBody {
    /// Title.
    pub title: String,
    /// Optional description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Optional lane key; the default lane when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Optional priority.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    /// Optional due date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    /// Optional assignee.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<UserId>,
    /// Optional explicit position.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<f64>,
}

impl From<CreateTaskBody> for CreateTaskRequest {
    fn from(body: CreateTaskBody) -> Self {
        let mut request = Self::new(body.title);
        if let Some(description) = body.description {
            request = request.with_description(description);
        }
        if let Some(status) = body.status {
            request = request.with_status(status);
        }
        if let Some(priority) = body.priority {
            request = request.with_priority(priority);
        }
        if let Some(due_date) = body.due_date {
            request = request.with_due_date(due_date);
        }
        if let Some(assignee_id) = body.assignee_id {
            request = request.with_assignee(assignee_id);
        }
        if let Some(order) = body.order {
            request = request.with_order(order);
        }
        request
    }
}

/// Body of `PATCH .../tasks/{task_id}`. An explicit `null` clears a
/// clearable field; an absent field is left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskBody {
    /// New title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New or cleared description.
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<Option<String>>,
    /// New lane key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// New priority.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    /// New or cleared due date.
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub due_date: Option<Option<DateTime<Utc>>>,
    /// New or cleared assignee.
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub assignee_id: Option<Option<UserId>>,
    /// New explicit position.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<f64>,
}

impl From<UpdateTaskBody> for UpdateTaskRequest {
    fn from(body: UpdateTaskBody) -> Self {
        Self {
            title: body.title,
            description: body.description,
            status: body.status,
            priority: body.priority,
            due_date: body.due_date,
            assignee_id: body.assignee_id,
            order: body.order,
        }
    }
}

/// Body of `POST .../tasks/{task_id}/move`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveTaskBody {
    /// Lane key to move into; the current lane when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Task to land just before; the end of the lane when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<TaskId>,
}

impl From<MoveTaskBody> for MoveTaskRequest {
    fn from(body: MoveTaskBody) -> Self {
        Self {
            status: body.status,
            before: body.before,
        }
    }
}

/// Query string of `GET .../tasks`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskFilter {
    /// Only tasks in the lane with this key.
    #[serde(default)]
    pub status: Option<String>,
}
