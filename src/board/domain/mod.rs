//! Domain model for lanes and tasks.
//!
//! Lanes are the status columns of a project; tasks reference their lane by
//! key. Both are positioned with the fractional ordering in [`ordering`]
//! (re-exported items below).

mod error;
mod ids;
mod keys;
mod lane;
pub mod ordering;
mod task;

pub use error::{BoardDomainError, ParseTaskPriorityError};
pub use ids::{LaneId, TaskId};
pub use keys::{LaneKey, LocalId, TaskKey, project_acronym};
pub use lane::{Lane, LaneColor, LaneDraft, LaneName, PersistedLaneData, seed_lanes};
pub use ordering::{Placement, SortOrder};
pub use task::{
    PersistedTaskData, Task, TaskDraft, TaskPriority, TaskTitle, normalize_description,
};
