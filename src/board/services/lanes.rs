//! Lane lifecycle: lazy seeding, creation, edits, reordering and deletion
//! with task migration.

use super::{BoardServiceError, BoardServiceResult};
use crate::board::{
    domain::{
        Lane, LaneColor, LaneDraft, LaneId, LaneKey, LaneName, SortOrder,
        ordering::{append_after, place_before},
        seed_lanes,
    },
    ports::{BoardRepository, BoardRepositoryError},
};
use crate::error::Resource;
use crate::tenancy::{
    domain::{Principal, ProjectId, ProjectPath},
    ports::TenancyRepository,
    services::AccessScopeResolver,
};
use mockable::Clock;
use std::sync::Arc;

/// Request payload for creating a lane.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateLaneRequest {
    name: String,
    key: Option<String>,
    color: Option<String>,
    order: Option<f64>,
    is_default: bool,
}

impl CreateLaneRequest {
    /// Creates a request with the required lane name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key: None,
            color: None,
            order: None,
            is_default: false,
        }
    }

    /// Sets an explicit key instead of deriving one from the name.
    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Sets the display color.
    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Sets an explicit position instead of appending.
    #[must_use]
    pub const fn with_order(mut self, order: f64) -> Self {
        self.order = Some(order);
        self
    }

    /// Marks the new lane as the project's default.
    #[must_use]
    pub const fn with_default(mut self, is_default: bool) -> Self {
        self.is_default = is_default;
        self
    }
}

/// Request payload for changing a lane. Absent fields stay unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateLaneRequest {
    /// New display name.
    pub name: Option<String>,
    /// New key; tasks follow the lane to it.
    pub key: Option<String>,
    /// New display color.
    pub color: Option<String>,
    /// New explicit position.
    pub order: Option<f64>,
    /// New default flag.
    pub is_default: Option<bool>,
}

/// Result of deleting a lane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaneDeletion {
    /// Key of the lane that received the deleted lane's tasks.
    pub fallback: LaneKey,
    /// Number of reassigned tasks.
    pub reassigned: u64,
}

/// Lane orchestration service.
pub struct LaneService<T, B, C>
where
    T: TenancyRepository + ?Sized,
    B: BoardRepository + ?Sized,
    C: Clock + Send + Sync,
{
    scope: AccessScopeResolver<T>,
    board: Arc<B>,
    clock: Arc<C>,
}

impl<T, B, C> Clone for LaneService<T, B, C>
where
    T: TenancyRepository + ?Sized,
    B: BoardRepository + ?Sized,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            scope: self.scope.clone(),
            board: Arc::clone(&self.board),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<T, B, C> LaneService<T, B, C>
where
    T: TenancyRepository + ?Sized,
    B: BoardRepository + ?Sized,
    C: Clock + Send + Sync,
{
    /// Creates a new lane service.
    #[must_use]
    pub const fn new(scope: AccessScopeResolver<T>, board: Arc<B>, clock: Arc<C>) -> Self {
        Self {
            scope,
            board,
            clock,
        }
    }

    /// Seeds the default lanes when the project has none and returns the
    /// project's lanes. Calling it again is a no-op.
    ///
    /// No scope check happens here; callers resolve the project first.
    ///
    /// # Errors
    ///
    /// Returns repository errors.
    pub async fn ensure_lanes(&self, project_id: ProjectId) -> BoardServiceResult<Vec<Lane>> {
        let lanes = self.board.list_lanes(project_id).await?;
        if !lanes.is_empty() {
            return Ok(lanes);
        }
        let seeds = seed_lanes(project_id, &*self.clock);
        let seeded = self
            .board
            .insert_lanes_if_absent(project_id, &seeds)
            .await?;
        tracing::info!(%project_id, lanes = seeded.len(), "default lanes seeded");
        Ok(seeded)
    }

    /// Lists the lanes of an accessible project, seeding them on first use.
    ///
    /// # Errors
    ///
    /// Returns not-found when the project is outside the principal's scope.
    pub async fn list_lanes(
        &self,
        principal: &Principal,
        path: ProjectPath,
    ) -> BoardServiceResult<Vec<Lane>> {
        let project = self.scope.require_project(principal, path).await?;
        self.ensure_lanes(project.id()).await
    }

    /// Creates a lane.
    ///
    /// The key is derived from the name when absent and the lane is appended
    /// after its siblings unless an explicit order is given. A default lane
    /// takes the default flag from every sibling.
    ///
    /// # Errors
    ///
    /// Returns validation errors for bad input, a conflict when the key is
    /// already used in the project, and not-found when out of scope.
    pub async fn create_lane(
        &self,
        principal: &Principal,
        path: ProjectPath,
        request: CreateLaneRequest,
    ) -> BoardServiceResult<Lane> {
        let project = self.scope.require_project(principal, path).await?;
        let lanes = self.ensure_lanes(project.id()).await?;
        let name = LaneName::new(request.name)?;
        let key = match request.key {
            Some(raw) => LaneKey::new(raw)?,
            None => LaneKey::derive(name.as_str())?,
        };
        if lanes.iter().any(|lane| lane.key() == &key) {
            return Err(BoardRepositoryError::DuplicateLaneKey {
                project_id: project.id(),
                key,
            }
            .into());
        }
        let color = request
            .color
            .map(LaneColor::new)
            .transpose()?
            .unwrap_or_default();
        let order = match request.order {
            Some(value) => SortOrder::new(value)?,
            None => append_after(max_order(&lanes)),
        };
        let lane = Lane::new(
            LaneDraft {
                project_id: project.id(),
                key,
                name,
                color,
                order,
                is_default: request.is_default,
            },
            &*self.clock,
        );
        self.board.store_lane(&lane).await?;
        tracing::info!(
            project_id = %project.id(),
            lane_id = %lane.id(),
            key = %lane.key(),
            "lane created"
        );
        Ok(lane)
    }

    /// Changes a lane.
    ///
    /// A new key must not collide with another lane of the project; tasks
    /// referencing the old key follow the lane.
    ///
    /// # Errors
    ///
    /// Returns validation errors, a key conflict, or not-found.
    pub async fn update_lane(
        &self,
        principal: &Principal,
        path: ProjectPath,
        lane_id: LaneId,
        request: UpdateLaneRequest,
    ) -> BoardServiceResult<Lane> {
        let project = self.scope.require_project(principal, path).await?;
        let mut lane = self.require_lane(project.id(), lane_id).await?;
        let clock = &*self.clock;
        if let Some(raw) = request.name {
            lane.rename(LaneName::new(raw)?, clock);
        }
        if let Some(raw) = request.key {
            let key = LaneKey::new(raw)?;
            if &key != lane.key() {
                let siblings = self.board.list_lanes(project.id()).await?;
                let taken = siblings
                    .iter()
                    .any(|sibling| sibling.id() != lane_id && sibling.key() == &key);
                if taken {
                    return Err(BoardRepositoryError::DuplicateLaneKey {
                        project_id: project.id(),
                        key,
                    }
                    .into());
                }
                lane.rekey(key, clock);
            }
        }
        if let Some(raw) = request.color {
            lane.recolor(LaneColor::new(raw)?, clock);
        }
        if let Some(value) = request.order {
            lane.reposition(SortOrder::new(value)?, clock);
        }
        if let Some(is_default) = request.is_default {
            lane.mark_default(is_default, clock);
        }
        self.board.update_lane(&lane).await?;
        tracing::info!(project_id = %project.id(), %lane_id, "lane updated");
        Ok(lane)
    }

    /// Moves a lane just before `before`, or to the end when `before` is
    /// `None`. Siblings are renumbered first when the gap is exhausted.
    ///
    /// # Errors
    ///
    /// Returns not-found when the lane, the target or the project is out of
    /// reach.
    pub async fn move_lane(
        &self,
        principal: &Principal,
        path: ProjectPath,
        lane_id: LaneId,
        before: Option<LaneId>,
    ) -> BoardServiceResult<Lane> {
        let project = self.scope.require_project(principal, path).await?;
        let mut lane = self.require_lane(project.id(), lane_id).await?;
        let siblings: Vec<(LaneId, SortOrder)> = self
            .board
            .list_lanes(project.id())
            .await?
            .iter()
            .filter(|sibling| sibling.id() != lane_id)
            .map(|sibling| (sibling.id(), sibling.order()))
            .collect();
        let placement = place_before(&siblings, before.as_ref())
            .ok_or(BoardServiceError::NotFound(Resource::Lane))?;
        if let Some(fresh) = placement.renumbered {
            tracing::debug!(project_id = %project.id(), lanes = fresh.len(), "renumbering lanes");
            self.board.reorder_lanes(&fresh).await?;
        }
        lane.reposition(placement.order, &*self.clock);
        self.board.update_lane(&lane).await?;
        Ok(lane)
    }

    /// Deletes a lane after moving its tasks to a fallback lane: another
    /// default lane if one exists, otherwise the first remaining lane.
    ///
    /// # Errors
    ///
    /// Returns a conflict when the lane is the project's only lane and
    /// not-found when out of scope.
    pub async fn delete_lane(
        &self,
        principal: &Principal,
        path: ProjectPath,
        lane_id: LaneId,
    ) -> BoardServiceResult<LaneDeletion> {
        let project = self.scope.require_project(principal, path).await?;
        let lane = self.require_lane(project.id(), lane_id).await?;
        let lanes = self.board.list_lanes(project.id()).await?;
        let mut remaining = lanes.iter().filter(|candidate| candidate.id() != lane_id);
        let fallback = remaining
            .clone()
            .find(|candidate| candidate.is_default())
            .or_else(|| remaining.next())
            .ok_or(BoardRepositoryError::LastLane(lane_id))?
            .key()
            .clone();
        let reassigned = self
            .board
            .delete_lane_reassigning(lane_id, &fallback)
            .await?;
        tracing::info!(
            project_id = %project.id(),
            %lane_id,
            deleted_key = %lane.key(),
            %fallback,
            reassigned,
            "lane deleted"
        );
        Ok(LaneDeletion {
            fallback,
            reassigned,
        })
    }

    async fn require_lane(&self, project_id: ProjectId, lane_id: LaneId) -> BoardServiceResult<Lane> {
        self.board
            .find_lane(lane_id)
            .await?
            .filter(|lane| lane.project_id() == project_id)
            .ok_or(BoardServiceError::NotFound(Resource::Lane))
    }
}

fn max_order(lanes: &[Lane]) -> Option<SortOrder> {
    lanes
        .iter()
        .map(Lane::order)
        .max_by(|left, right| left.total_cmp(*right))
}
