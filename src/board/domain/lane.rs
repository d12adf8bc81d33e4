//! Lane (status column) aggregate.

use super::{BoardDomainError, LaneId, LaneKey, SortOrder};
use crate::tenancy::domain::ProjectId;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum lane name length, matching `VARCHAR(100)`.
const MAX_LANE_NAME_LENGTH: usize = 100;

/// Lanes inserted when a project is first opened: key, name and color.
const SEED_LANES: [(&str, &str, &str); 3] = [
    ("todo", "To Do", "#94a3b8"),
    ("doing", "Doing", "#3b82f6"),
    ("done", "Done", "#22c55e"),
];

/// Validated lane display name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LaneName(String);

impl LaneName {
    /// Creates a validated lane name.
    ///
    /// # Errors
    ///
    /// Returns [`BoardDomainError::EmptyLaneName`] for blank input and
    /// [`BoardDomainError::TooLong`] beyond 100 characters.
    pub fn new(value: impl Into<String>) -> Result<Self, BoardDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(BoardDomainError::EmptyLaneName);
        }
        if trimmed.chars().count() > MAX_LANE_NAME_LENGTH {
            return Err(BoardDomainError::TooLong {
                field: "lane name",
                max: MAX_LANE_NAME_LENGTH,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the name as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LaneName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Hex display color of a lane.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LaneColor(String);

impl LaneColor {
    /// Color used when none is requested.
    pub const DEFAULT: &'static str = "#94a3b8";

    /// Creates a validated color, normalised to lowercase.
    ///
    /// # Errors
    ///
    /// Returns [`BoardDomainError::InvalidLaneColor`] unless the value is
    /// `#rgb` or `#rrggbb`.
    pub fn new(value: impl Into<String>) -> Result<Self, BoardDomainError> {
        let raw = value.into();
        let normalized = raw.trim().to_ascii_lowercase();
        let digits = normalized.strip_prefix('#').unwrap_or_default();
        let is_valid = matches!(digits.len(), 3 | 6)
            && digits.chars().all(|ch| ch.is_ascii_hexdigit());
        if !is_valid {
            return Err(BoardDomainError::InvalidLaneColor(raw));
        }
        Ok(Self(normalized))
    }

    /// Returns the color as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for LaneColor {
    fn default() -> Self {
        Self(Self::DEFAULT.to_owned())
    }
}

/// Validated inputs for a new lane.
#[derive(Debug, Clone, PartialEq)]
pub struct LaneDraft {
    /// Owning project.
    pub project_id: ProjectId,
    /// Unique key within the project.
    pub key: LaneKey,
    /// Display name.
    pub name: LaneName,
    /// Display color.
    pub color: LaneColor,
    /// Position among the project's lanes.
    pub order: SortOrder,
    /// Whether new tasks land in this lane by default.
    pub is_default: bool,
}

/// Lane aggregate root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lane {
    id: LaneId,
    project_id: ProjectId,
    key: LaneKey,
    name: LaneName,
    color: LaneColor,
    order: SortOrder,
    is_default: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted lane.
#[derive(Debug, Clone, PartialEq)]
pub struct PersistedLaneData {
    /// Persisted lane identifier.
    pub id: LaneId,
    /// Owning project.
    pub project_id: ProjectId,
    /// Persisted key.
    pub key: LaneKey,
    /// Persisted name.
    pub name: LaneName,
    /// Persisted color.
    pub color: LaneColor,
    /// Persisted position.
    pub order: SortOrder,
    /// Persisted default flag.
    pub is_default: bool,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Lane {
    /// Creates a new lane.
    #[must_use]
    pub fn new(draft: LaneDraft, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        Self {
            id: LaneId::new(),
            project_id: draft.project_id,
            key: draft.key,
            name: draft.name,
            color: draft.color,
            order: draft.order,
            is_default: draft.is_default,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs a lane from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedLaneData) -> Self {
        Self {
            id: data.id,
            project_id: data.project_id,
            key: data.key,
            name: data.name,
            color: data.color,
            order: data.order,
            is_default: data.is_default,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the lane identifier.
    #[must_use]
    pub const fn id(&self) -> LaneId {
        self.id
    }

    /// Returns the owning project.
    #[must_use]
    pub const fn project_id(&self) -> ProjectId {
        self.project_id
    }

    /// Returns the lane key.
    #[must_use]
    pub const fn key(&self) -> &LaneKey {
        &self.key
    }

    /// Returns the display name.
    #[must_use]
    pub const fn name(&self) -> &LaneName {
        &self.name
    }

    /// Returns the display color.
    #[must_use]
    pub const fn color(&self) -> &LaneColor {
        &self.color
    }

    /// Returns the position among the project's lanes.
    #[must_use]
    pub const fn order(&self) -> SortOrder {
        self.order
    }

    /// Returns whether this is the project's default lane.
    #[must_use]
    pub const fn is_default(&self) -> bool {
        self.is_default
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

    /// Renames the lane.
    pub fn rename(&mut self, name: LaneName, clock: &impl Clock) {
        self.name = name;
        self.touch(clock);
    }

    /// Changes the lane key.
    pub fn rekey(&mut self, key: LaneKey, clock: &impl Clock) {
        self.key = key;
        self.touch(clock);
    }

    /// Changes the display color.
    pub fn recolor(&mut self, color: LaneColor, clock: &impl Clock) {
        self.color = color;
        self.touch(clock);
    }

    /// Moves the lane to a new position.
    pub fn reposition(&mut self, order: SortOrder, clock: &impl Clock) {
        self.order = order;
        self.touch(clock);
    }

    /// Sets or clears the default flag.
    pub fn mark_default(&mut self, is_default: bool, clock: &impl Clock) {
        self.is_default = is_default;
        self.touch(clock);
    }

    /// Drops the default flag because a sibling became default.
    pub const fn yield_default(&mut self) {
        self.is_default = false;
    }

    /// Changes the position without touching the update timestamp. Used by
    /// lane renumbering.
    pub const fn renumber(&mut self, order: SortOrder) {
        self.order = order;
    }

    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}

/// Default lanes for a project that has none: `todo`, `doing`, `done` at
/// 1000, 2000 and 3000, the first one marked default.
#[must_use]
pub fn seed_lanes(project_id: ProjectId, clock: &impl Clock) -> Vec<Lane> {
    SEED_LANES
        .iter()
        .zip(0_u32..)
        .map(|(&(key, name, color), index)| {
            Lane::new(
                LaneDraft {
                    project_id,
                    key: LaneKey(key.to_owned()),
                    name: LaneName(name.to_owned()),
                    color: LaneColor(color.to_owned()),
                    order: SortOrder::nth_step(index),
                    is_default: index == 0,
                },
                clock,
            )
        })
        .collect()
}
