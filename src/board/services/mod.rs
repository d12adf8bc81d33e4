//! Application services for lanes, tasks and task numbering.

mod error;
mod lanes;
mod sequence;
mod tasks;

pub use error::{BoardServiceError, BoardServiceResult};
pub use lanes::{CreateLaneRequest, LaneDeletion, LaneService, UpdateLaneRequest};
pub use sequence::TaskSequenceAllocator;
pub use tasks::{
    CreateTaskRequest, MoveTaskRequest, TaskDetails, TaskService, UpdateTaskRequest,
};
