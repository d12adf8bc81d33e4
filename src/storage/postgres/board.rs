//! `BoardRepository` implementation for [`PostgresStore`].

use super::{
    PostgresStore,
    models::{LaneRow, TaskRow},
    schema::{lanes, tasks},
    unique_violation_on,
};
use crate::board::{
    domain::{
        Lane, LaneColor, LaneId, LaneKey, LaneName, LocalId, PersistedLaneData,
        PersistedTaskData, SortOrder, Task, TaskDraft, TaskId, TaskPriority, TaskTitle,
    },
    ports::{BoardRepository, BoardRepositoryError, BoardRepositoryResult},
};
use crate::tenancy::domain::{ProjectId, UserId};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;

const LANE_KEY_CONSTRAINT: &str = "idx_lanes_project_key_unique";
const TASK_LOCAL_ID_CONSTRAINT: &str = "idx_tasks_project_local_id_unique";

#[async_trait]
impl BoardRepository for PostgresStore {
    async fn list_lanes(&self, project_id: ProjectId) -> BoardRepositoryResult<Vec<Lane>> {
        self.run_blocking(move |connection| load_lanes(connection, project_id))
            .await
    }

    async fn insert_lanes_if_absent(
        &self,
        project_id: ProjectId,
        seeds: &[Lane],
    ) -> BoardRepositoryResult<Vec<Lane>> {
        let rows: Vec<LaneRow> = seeds.iter().map(lane_to_row).collect();
        self.run_blocking(move |connection| {
            connection.transaction::<_, BoardRepositoryError, _>(|conn| {
                // Serialises concurrent first readers of the same project.
                diesel::sql_query("SELECT id FROM projects WHERE id = $1 FOR UPDATE")
                    .bind::<diesel::sql_types::Uuid, _>(project_id.into_inner())
                    .execute(conn)?;
                let existing: i64 = lanes::table
                    .filter(lanes::project_id.eq(project_id.into_inner()))
                    .count()
                    .get_result(conn)?;
                if existing == 0 {
                    diesel::insert_into(lanes::table)
                        .values(&rows)
                        .execute(conn)?;
                }
                load_lanes(conn, project_id)
            })
        })
        .await
    }

    async fn store_lane(&self, lane: &Lane) -> BoardRepositoryResult<()> {
        let row = lane_to_row(lane);
        let project_id = lane.project_id();
        let key = lane.key().clone();
        self.run_blocking(move |connection| {
            connection.transaction::<_, BoardRepositoryError, _>(|conn| {
                if row.is_default {
                    clear_defaults(conn, row.project_id, row.id)?;
                }
                diesel::insert_into(lanes::table)
                    .values(&row)
                    .execute(conn)
                    .map_err(|err| duplicate_lane_key(err, project_id, &key))?;
                Ok(())
            })
        })
        .await
    }

    async fn update_lane(&self, lane: &Lane) -> BoardRepositoryResult<()> {
        let row = lane_to_row(lane);
        let lane_id = lane.id();
        let project_id = lane.project_id();
        let key = lane.key().clone();
        self.run_blocking(move |connection| {
            connection.transaction::<_, BoardRepositoryError, _>(|conn| {
                let stored_key: Option<String> = lanes::table
                    .filter(lanes::id.eq(row.id))
                    .select(lanes::key)
                    .for_update()
                    .first(conn)
                    .optional()?;
                let previous_key = stored_key.ok_or(BoardRepositoryError::LaneNotFound(lane_id))?;
                if row.is_default {
                    clear_defaults(conn, row.project_id, row.id)?;
                }
                diesel::update(lanes::table.filter(lanes::id.eq(row.id)))
                    .set(&row)
                    .execute(conn)
                    .map_err(|err| duplicate_lane_key(err, project_id, &key))?;
                if previous_key != row.key {
                    let moved = diesel::update(
                        tasks::table
                            .filter(tasks::project_id.eq(row.project_id))
                            .filter(tasks::status.eq(previous_key.as_str())),
                    )
                    .set(tasks::status.eq(row.key.as_str()))
                    .execute(conn)?;
                    tracing::debug!(%lane_id, from = %previous_key, to = %row.key, moved, "lane rekeyed");
                }
                Ok(())
            })
        })
        .await
    }

    async fn find_lane(&self, id: LaneId) -> BoardRepositoryResult<Option<Lane>> {
        self.run_blocking(move |connection| {
            let row = lanes::table
                .filter(lanes::id.eq(id.into_inner()))
                .select(LaneRow::as_select())
                .first::<LaneRow>(connection)
                .optional()?;
            row.map(row_to_lane).transpose()
        })
        .await
    }

    async fn reorder_lanes(&self, positions: &[(LaneId, SortOrder)]) -> BoardRepositoryResult<()> {
        let updates: Vec<(uuid::Uuid, f64)> = positions
            .iter()
            .map(|(id, order)| (id.into_inner(), order.value()))
            .collect();
        self.run_blocking(move |connection| {
            connection.transaction::<_, BoardRepositoryError, _>(|conn| {
                for (id, order) in &updates {
                    diesel::update(lanes::table.filter(lanes::id.eq(*id)))
                        .set(lanes::sort_order.eq(*order))
                        .execute(conn)?;
                }
                Ok(())
            })
        })
        .await
    }

    async fn delete_lane_reassigning(
        &self,
        id: LaneId,
        fallback: &LaneKey,
    ) -> BoardRepositoryResult<u64> {
        let fallback_key = fallback.as_str().to_owned();
        self.run_blocking(move |connection| {
            connection.transaction::<_, BoardRepositoryError, _>(|conn| {
                let lane = lanes::table
                    .filter(lanes::id.eq(id.into_inner()))
                    .select(LaneRow::as_select())
                    .for_update()
                    .first::<LaneRow>(conn)
                    .optional()?
                    .ok_or(BoardRepositoryError::LaneNotFound(id))?;
                let siblings: Vec<String> = lanes::table
                    .filter(lanes::project_id.eq(lane.project_id))
                    .filter(lanes::id.ne(lane.id))
                    .select(lanes::key)
                    .for_update()
                    .load(conn)?;
                if siblings.is_empty() {
                    return Err(BoardRepositoryError::LastLane(id));
                }
                if !siblings.contains(&fallback_key) {
                    return Err(BoardRepositoryError::LaneNotFound(id));
                }
                let moved = diesel::update(
                    tasks::table
                        .filter(tasks::project_id.eq(lane.project_id))
                        .filter(tasks::status.eq(lane.key.as_str())),
                )
                .set(tasks::status.eq(fallback_key.as_str()))
                .execute(conn)?;
                diesel::delete(lanes::table.filter(lanes::id.eq(lane.id))).execute(conn)?;
                u64::try_from(moved).map_err(BoardRepositoryError::persistence)
            })
        })
        .await
    }

    async fn store_task(&self, task: &Task) -> BoardRepositoryResult<()> {
        let row = task_to_row(task)?;
        let project_id = task.project_id();
        let local_id = task.local_id();
        let status = task.status().clone();
        self.run_blocking(move |connection| {
            connection.transaction::<_, BoardRepositoryError, _>(|conn| {
                share_status_lane(conn, project_id, &status)?;
                diesel::insert_into(tasks::table)
                    .values(&row)
                    .execute(conn)
                    .map_err(|err| {
                        if unique_violation_on(&err, TASK_LOCAL_ID_CONSTRAINT) {
                            BoardRepositoryError::DuplicateLocalId {
                                project_id,
                                local_id,
                            }
                        } else {
                            BoardRepositoryError::persistence(err)
                        }
                    })?;
                Ok(())
            })
        })
        .await
    }

    async fn update_task(&self, task: &Task) -> BoardRepositoryResult<()> {
        let row = task_to_row(task)?;
        let task_id = task.id();
        let project_id = task.project_id();
        let status = task.status().clone();
        self.run_blocking(move |connection| {
            connection.transaction::<_, BoardRepositoryError, _>(|conn| {
                share_status_lane(conn, project_id, &status)?;
                let updated = diesel::update(tasks::table.filter(tasks::id.eq(row.id)))
                    .set(&row)
                    .execute(conn)?;
                if updated == 0 {
                    return Err(BoardRepositoryError::TaskNotFound(task_id));
                }
                Ok(())
            })
        })
        .await
    }

    async fn find_task(&self, id: TaskId) -> BoardRepositoryResult<Option<Task>> {
        self.run_blocking(move |connection| {
            let row = tasks::table
                .filter(tasks::id.eq(id.into_inner()))
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()?;
            row.map(row_to_task).transpose()
        })
        .await
    }

    async fn delete_task(&self, id: TaskId) -> BoardRepositoryResult<()> {
        self.run_blocking(move |connection| {
            let deleted = diesel::delete(tasks::table.filter(tasks::id.eq(id.into_inner())))
                .execute(connection)?;
            if deleted == 0 {
                return Err(BoardRepositoryError::TaskNotFound(id));
            }
            Ok(())
        })
        .await
    }

    async fn list_tasks<'a>(
        &self,
        project_id: ProjectId,
        status: Option<&'a LaneKey>,
    ) -> BoardRepositoryResult<Vec<Task>> {
        let status_filter = status.map(|key| key.as_str().to_owned());
        self.run_blocking(move |connection| {
            let mut query = tasks::table
                .filter(tasks::project_id.eq(project_id.into_inner()))
                .into_boxed();
            if let Some(key) = status_filter {
                query = query.filter(tasks::status.eq(key));
            }
            query
                .order((tasks::sort_order.asc(), tasks::created_at.desc()))
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)?
                .into_iter()
                .map(row_to_task)
                .collect()
        })
        .await
    }

    async fn reorder_tasks(&self, positions: &[(TaskId, SortOrder)]) -> BoardRepositoryResult<()> {
        let updates: Vec<(uuid::Uuid, f64)> = positions
            .iter()
            .map(|(id, order)| (id.into_inner(), order.value()))
            .collect();
        self.run_blocking(move |connection| {
            connection.transaction::<_, BoardRepositoryError, _>(|conn| {
                for (id, order) in &updates {
                    diesel::update(tasks::table.filter(tasks::id.eq(*id)))
                        .set(tasks::sort_order.eq(*order))
                        .execute(conn)?;
                }
                Ok(())
            })
        })
        .await
    }
}

fn load_lanes(
    connection: &mut PgConnection,
    project_id: ProjectId,
) -> BoardRepositoryResult<Vec<Lane>> {
    lanes::table
        .filter(lanes::project_id.eq(project_id.into_inner()))
        .order((lanes::sort_order.asc(), lanes::created_at.desc()))
        .select(LaneRow::as_select())
        .load::<LaneRow>(connection)?
        .into_iter()
        .map(row_to_lane)
        .collect()
}

fn clear_defaults(
    connection: &mut PgConnection,
    project_id: uuid::Uuid,
    keep: uuid::Uuid,
) -> BoardRepositoryResult<()> {
    diesel::update(
        lanes::table
            .filter(lanes::project_id.eq(project_id))
            .filter(lanes::id.ne(keep))
            .filter(lanes::is_default.eq(true)),
    )
    .set(lanes::is_default.eq(false))
    .execute(connection)?;
    Ok(())
}

/// Share-locks the lane a task is written into, so lane deletion and
/// rekeying wait for the task write to commit.
fn share_status_lane(
    connection: &mut PgConnection,
    project_id: ProjectId,
    status: &LaneKey,
) -> BoardRepositoryResult<()> {
    lanes::table
        .filter(lanes::project_id.eq(project_id.into_inner()))
        .filter(lanes::key.eq(status.as_str()))
        .select(lanes::id)
        .for_share()
        .first::<uuid::Uuid>(connection)
        .optional()?
        .map(drop)
        .ok_or_else(|| BoardRepositoryError::UnknownLane {
            project_id,
            key: status.clone(),
        })
}

fn duplicate_lane_key(
    err: diesel::result::Error,
    project_id: ProjectId,
    key: &LaneKey,
) -> BoardRepositoryError {
    if unique_violation_on(&err, LANE_KEY_CONSTRAINT) {
        BoardRepositoryError::DuplicateLaneKey {
            project_id,
            key: key.clone(),
        }
    } else {
        BoardRepositoryError::persistence(err)
    }
}

fn lane_to_row(lane: &Lane) -> LaneRow {
    LaneRow {
        id: lane.id().into_inner(),
        project_id: lane.project_id().into_inner(),
        key: lane.key().as_str().to_owned(),
        name: lane.name().as_str().to_owned(),
        color: lane.color().as_str().to_owned(),
        sort_order: lane.order().value(),
        is_default: lane.is_default(),
        created_at: lane.created_at(),
        updated_at: lane.updated_at(),
    }
}

fn row_to_lane(row: LaneRow) -> BoardRepositoryResult<Lane> {
    Ok(Lane::from_persisted(PersistedLaneData {
        id: LaneId::from_uuid(row.id),
        project_id: ProjectId::from_uuid(row.project_id),
        key: LaneKey::new(row.key).map_err(BoardRepositoryError::persistence)?,
        name: LaneName::new(row.name).map_err(BoardRepositoryError::persistence)?,
        color: LaneColor::new(row.color).map_err(BoardRepositoryError::persistence)?,
        order: SortOrder::new(row.sort_order).map_err(BoardRepositoryError::persistence)?,
        is_default: row.is_default,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }))
}

fn task_to_row(task: &Task) -> BoardRepositoryResult<TaskRow> {
    let local_id =
        i64::try_from(task.local_id().value()).map_err(BoardRepositoryError::persistence)?;
    Ok(TaskRow {
        id: task.id().into_inner(),
        project_id: task.project_id().into_inner(),
        creator_id: task.creator_id().into_inner(),
        local_id,
        title: task.title().as_str().to_owned(),
        description: task.description().map(str::to_owned),
        status: task.status().as_str().to_owned(),
        priority: task.priority().as_str().to_owned(),
        due_date: task.due_date(),
        assignee_id: task.assignee_id().map(UserId::into_inner),
        sort_order: task.order().value(),
        created_at: task.created_at(),
        updated_at: task.updated_at(),
    })
}

fn row_to_task(row: TaskRow) -> BoardRepositoryResult<Task> {
    let local_id = u64::try_from(row.local_id).map_err(BoardRepositoryError::persistence)?;
    let draft = TaskDraft {
        project_id: ProjectId::from_uuid(row.project_id),
        creator_id: UserId::from_uuid(row.creator_id),
        local_id: LocalId::new(local_id).map_err(BoardRepositoryError::persistence)?,
        title: TaskTitle::new(row.title).map_err(BoardRepositoryError::persistence)?,
        description: row.description,
        status: LaneKey::new(row.status).map_err(BoardRepositoryError::persistence)?,
        priority: TaskPriority::try_from(row.priority.as_str())
            .map_err(BoardRepositoryError::persistence)?,
        due_date: row.due_date,
        assignee_id: row.assignee_id.map(UserId::from_uuid),
        order: SortOrder::new(row.sort_order).map_err(BoardRepositoryError::persistence)?,
    };
    Ok(Task::from_persisted(PersistedTaskData {
        id: TaskId::from_uuid(row.id),
        draft,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }))
}
