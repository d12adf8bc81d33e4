//! Identifier types for the board domain.

use crate::ids::uuid_identifier;

uuid_identifier!(
    /// Unique identifier for a lane.
    LaneId,
    "lane"
);

uuid_identifier!(
    /// Unique identifier for a task record.
    TaskId,
    "task"
);
