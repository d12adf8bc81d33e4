//! Diesel row models for tenancy and board persistence.

use super::schema::{lanes, projects, tasks, team_memberships, teams};
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Team row, used for both queries and inserts.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = teams)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TeamRow {
    /// Team identifier.
    pub id: uuid::Uuid,
    /// Display name.
    pub name: String,
    /// Designated owner.
    pub owner_id: uuid::Uuid,
    /// Slug.
    pub slug: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Membership row, used for both queries and inserts.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = team_memberships)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct MembershipRow {
    /// Team identifier.
    pub team_id: uuid::Uuid,
    /// Member identifier.
    pub user_id: uuid::Uuid,
    /// Role.
    pub role: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Project row, used for both queries and inserts.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = projects)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProjectRow {
    /// Project identifier.
    pub id: uuid::Uuid,
    /// Owning team.
    pub team_id: uuid::Uuid,
    /// Display name.
    pub name: String,
    /// Slug.
    pub slug: String,
    /// Next local task identifier.
    pub task_sequence: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Lane row, used for queries, inserts and updates.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = lanes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct LaneRow {
    /// Lane identifier.
    pub id: uuid::Uuid,
    /// Owning project.
    pub project_id: uuid::Uuid,
    /// Key.
    pub key: String,
    /// Display name.
    pub name: String,
    /// Hex color.
    pub color: String,
    /// Fractional position.
    pub sort_order: f64,
    /// Default flag.
    pub is_default: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Task row, used for queries, inserts and updates.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub struct TaskRow {
    /// Task identifier.
    pub id: uuid::Uuid,
    /// Owning project.
    pub project_id: uuid::Uuid,
    /// Creating user.
    pub creator_id: uuid::Uuid,
    /// Per-project number.
    pub local_id: i64,
    /// Title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Lane key.
    pub status: String,
    /// Priority.
    pub priority: String,
    /// Optional due date.
    pub due_date: Option<DateTime<Utc>>,
    /// Optional assignee.
    pub assignee_id: Option<uuid::Uuid>,
    /// Fractional position.
    pub sort_order: f64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}
