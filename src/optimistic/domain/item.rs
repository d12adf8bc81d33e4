//! Records held in observed collections.

use crate::api::dto::{LaneView, ProjectView, TaskView};
use crate::board::domain::{LaneId, TaskId};
use crate::tenancy::domain::ProjectId;
use std::fmt::Debug;

/// A record that can live in an observed collection.
///
/// Items are matched by identifier when the server's record replaces a
/// speculative one.
pub trait ObservedItem: Clone + Debug + PartialEq + Send + Sync + 'static {
    /// Identifier type.
    type Id: Clone + Debug + PartialEq + Send + Sync + 'static;

    /// Returns the item's identifier.
    fn item_id(&self) -> Self::Id;
}

impl ObservedItem for TaskView {
    type Id = TaskId;

    fn item_id(&self) -> TaskId {
        self.id
    }
}

impl ObservedItem for LaneView {
    type Id = LaneId;

    fn item_id(&self) -> LaneId {
        self.id
    }
}

impl ObservedItem for ProjectView {
    type Id = ProjectId;

    fn item_id(&self) -> ProjectId {
        self.id
    }
}
