//! Diesel schema for tenancy and board persistence.

diesel::table! {
    /// Teams owning projects.
    teams (id) {
        /// Team identifier.
        id -> Uuid,
        /// Display name.
        #[max_length = 200]
        name -> Varchar,
        /// Designated owner.
        owner_id -> Uuid,
        /// Globally unique slug.
        #[max_length = 100]
        slug -> Varchar,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Stored team memberships. The owner is implicit and never stored.
    team_memberships (team_id, user_id) {
        /// Team identifier.
        team_id -> Uuid,
        /// Member identifier.
        user_id -> Uuid,
        /// Member role.
        #[max_length = 16]
        role -> Varchar,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Projects with their task counters.
    projects (id) {
        /// Project identifier.
        id -> Uuid,
        /// Owning team.
        team_id -> Uuid,
        /// Display name.
        #[max_length = 200]
        name -> Varchar,
        /// Slug, unique per team.
        #[max_length = 100]
        slug -> Varchar,
        /// Next local task identifier.
        task_sequence -> Int8,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Status lanes.
    lanes (id) {
        /// Lane identifier.
        id -> Uuid,
        /// Owning project.
        project_id -> Uuid,
        /// Key, unique per project.
        #[max_length = 64]
        key -> Varchar,
        /// Display name.
        #[max_length = 100]
        name -> Varchar,
        /// Hex color.
        #[max_length = 7]
        color -> Varchar,
        /// Fractional position.
        sort_order -> Float8,
        /// Default lane flag, at most one per project.
        is_default -> Bool,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Board tasks.
    tasks (id) {
        /// Task identifier.
        id -> Uuid,
        /// Owning project.
        project_id -> Uuid,
        /// Creating user.
        creator_id -> Uuid,
        /// Per-project number.
        local_id -> Int8,
        /// Title.
        #[max_length = 500]
        title -> Varchar,
        /// Optional description.
        description -> Nullable<Text>,
        /// Key of the lane the task sits in.
        #[max_length = 64]
        status -> Varchar,
        /// Priority.
        #[max_length = 16]
        priority -> Varchar,
        /// Optional due date.
        due_date -> Nullable<Timestamptz>,
        /// Optional assignee.
        assignee_id -> Nullable<Uuid>,
        /// Fractional position within the lane.
        sort_order -> Float8,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}
