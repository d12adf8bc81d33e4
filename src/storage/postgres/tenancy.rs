//! `TenancyRepository` implementation for [`PostgresStore`].

use super::{
    PostgresStore,
    models::{MembershipRow, ProjectRow, TeamRow},
    schema::{projects, team_memberships, teams},
    unique_violation_on,
};
use crate::tenancy::{
    domain::{
        PersistedProjectData, PersistedTeamData, Project, ProjectId, ProjectName, Slug, Team,
        TeamId, TeamMembership, TeamName, TeamRole, UserId,
    },
    ports::{TenancyRepository, TenancyRepositoryError, TenancyRepositoryResult},
};
use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};

const TEAM_SLUG_CONSTRAINT: &str = "idx_teams_slug_unique";
const PROJECT_SLUG_CONSTRAINT: &str = "idx_projects_team_slug_unique";

#[async_trait]
impl TenancyRepository for PostgresStore {
    async fn store_team(&self, team: &Team) -> TenancyRepositoryResult<()> {
        let row = team_to_row(team);
        let slug = team.slug().clone();
        self.run_blocking(move |connection| {
            diesel::insert_into(teams::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| {
                    if unique_violation_on(&err, TEAM_SLUG_CONSTRAINT) {
                        TenancyRepositoryError::DuplicateTeamSlug(slug.clone())
                    } else {
                        TenancyRepositoryError::persistence(err)
                    }
                })?;
            Ok(())
        })
        .await
    }

    async fn find_team(&self, id: TeamId) -> TenancyRepositoryResult<Option<Team>> {
        self.run_blocking(move |connection| {
            let row = teams::table
                .filter(teams::id.eq(id.into_inner()))
                .select(TeamRow::as_select())
                .first::<TeamRow>(connection)
                .optional()?;
            row.map(row_to_team).transpose()
        })
        .await
    }

    async fn find_teams(&self, ids: &[TeamId]) -> TenancyRepositoryResult<Vec<Team>> {
        let lookup: Vec<uuid::Uuid> = ids.iter().map(|id| id.into_inner()).collect();
        self.run_blocking(move |connection| {
            teams::table
                .filter(teams::id.eq_any(lookup))
                .select(TeamRow::as_select())
                .load::<TeamRow>(connection)?
                .into_iter()
                .map(row_to_team)
                .collect()
        })
        .await
    }

    async fn team_ids_for_user(&self, user_id: UserId) -> TenancyRepositoryResult<Vec<TeamId>> {
        self.run_blocking(move |connection| {
            let user = user_id.into_inner();
            let mut ids: Vec<uuid::Uuid> = teams::table
                .filter(teams::owner_id.eq(user))
                .select(teams::id)
                .load(connection)?;
            let member_of: Vec<uuid::Uuid> = team_memberships::table
                .filter(team_memberships::user_id.eq(user))
                .select(team_memberships::team_id)
                .load(connection)?;
            ids.extend(member_of);
            ids.sort_unstable();
            ids.dedup();
            Ok(ids.into_iter().map(TeamId::from_uuid).collect())
        })
        .await
    }

    async fn store_membership(&self, membership: &TeamMembership) -> TenancyRepositoryResult<()> {
        let row = MembershipRow {
            team_id: membership.team_id().into_inner(),
            user_id: membership.user_id().into_inner(),
            role: membership.role().as_str().to_owned(),
            created_at: membership.created_at(),
        };
        let team_id = membership.team_id();
        let user_id = membership.user_id();
        self.run_blocking(move |connection| {
            diesel::insert_into(team_memberships::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        TenancyRepositoryError::DuplicateMembership { team_id, user_id }
                    }
                    _ => TenancyRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn find_membership(
        &self,
        team_id: TeamId,
        user_id: UserId,
    ) -> TenancyRepositoryResult<Option<TeamMembership>> {
        self.run_blocking(move |connection| {
            let row = team_memberships::table
                .filter(team_memberships::team_id.eq(team_id.into_inner()))
                .filter(team_memberships::user_id.eq(user_id.into_inner()))
                .select(MembershipRow::as_select())
                .first::<MembershipRow>(connection)
                .optional()?;
            row.map(row_to_membership).transpose()
        })
        .await
    }

    async fn list_memberships(
        &self,
        team_id: TeamId,
    ) -> TenancyRepositoryResult<Vec<TeamMembership>> {
        self.run_blocking(move |connection| {
            team_memberships::table
                .filter(team_memberships::team_id.eq(team_id.into_inner()))
                .order(team_memberships::created_at.asc())
                .select(MembershipRow::as_select())
                .load::<MembershipRow>(connection)?
                .into_iter()
                .map(row_to_membership)
                .collect()
        })
        .await
    }

    async fn delete_membership(
        &self,
        team_id: TeamId,
        user_id: UserId,
    ) -> TenancyRepositoryResult<()> {
        self.run_blocking(move |connection| {
            let deleted = diesel::delete(
                team_memberships::table
                    .filter(team_memberships::team_id.eq(team_id.into_inner()))
                    .filter(team_memberships::user_id.eq(user_id.into_inner())),
            )
            .execute(connection)?;
            if deleted == 0 {
                return Err(TenancyRepositoryError::MembershipNotFound { team_id, user_id });
            }
            Ok(())
        })
        .await
    }

    async fn store_project(&self, project: &Project) -> TenancyRepositoryResult<()> {
        let row = project_to_row(project)?;
        let team_id = project.team_id();
        let slug = project.slug().clone();
        self.run_blocking(move |connection| {
            diesel::insert_into(projects::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| duplicate_project_slug(err, team_id, &slug))?;
            Ok(())
        })
        .await
    }

    async fn update_project(&self, project: &Project) -> TenancyRepositoryResult<()> {
        let id = project.id();
        let team_id = project.team_id();
        let name = project.name().as_str().to_owned();
        let slug = project.slug().clone();
        let updated_at = project.updated_at();
        self.run_blocking(move |connection| {
            let updated = diesel::update(projects::table.filter(projects::id.eq(id.into_inner())))
                .set((
                    projects::name.eq(name),
                    projects::slug.eq(slug.as_str()),
                    projects::updated_at.eq(updated_at),
                ))
                .execute(connection)
                .map_err(|err| duplicate_project_slug(err, team_id, &slug))?;
            if updated == 0 {
                return Err(TenancyRepositoryError::ProjectNotFound(id));
            }
            Ok(())
        })
        .await
    }

    async fn find_project(&self, id: ProjectId) -> TenancyRepositoryResult<Option<Project>> {
        self.run_blocking(move |connection| {
            let row = projects::table
                .filter(projects::id.eq(id.into_inner()))
                .select(ProjectRow::as_select())
                .first::<ProjectRow>(connection)
                .optional()?;
            row.map(row_to_project).transpose()
        })
        .await
    }

    async fn list_projects(&self, team_ids: &[TeamId]) -> TenancyRepositoryResult<Vec<Project>> {
        let lookup: Vec<uuid::Uuid> = team_ids.iter().map(|id| id.into_inner()).collect();
        self.run_blocking(move |connection| {
            projects::table
                .filter(projects::team_id.eq_any(lookup))
                .order(projects::name.asc())
                .select(ProjectRow::as_select())
                .load::<ProjectRow>(connection)?
                .into_iter()
                .map(row_to_project)
                .collect()
        })
        .await
    }

    async fn delete_project(&self, id: ProjectId) -> TenancyRepositoryResult<()> {
        self.run_blocking(move |connection| {
            // Lanes and tasks go with the project through ON DELETE CASCADE.
            let deleted = diesel::delete(projects::table.filter(projects::id.eq(id.into_inner())))
                .execute(connection)?;
            if deleted == 0 {
                return Err(TenancyRepositoryError::ProjectNotFound(id));
            }
            Ok(())
        })
        .await
    }

    async fn allocate_task_sequence(&self, id: ProjectId) -> TenancyRepositoryResult<u64> {
        self.run_blocking(move |connection| {
            let bumped: Option<i64> =
                diesel::update(projects::table.filter(projects::id.eq(id.into_inner())))
                    .set(projects::task_sequence.eq(projects::task_sequence + 1))
                    .returning(projects::task_sequence)
                    .get_result(connection)
                    .optional()?;
            let next = bumped.ok_or(TenancyRepositoryError::ProjectNotFound(id))?;
            let taken = next.saturating_sub(1);
            u64::try_from(taken).map_err(TenancyRepositoryError::persistence)
        })
        .await
    }
}

fn duplicate_project_slug(err: DieselError, team_id: TeamId, slug: &Slug) -> TenancyRepositoryError {
    if unique_violation_on(&err, PROJECT_SLUG_CONSTRAINT) {
        TenancyRepositoryError::DuplicateProjectSlug {
            team_id,
            slug: slug.clone(),
        }
    } else {
        TenancyRepositoryError::persistence(err)
    }
}

fn team_to_row(team: &Team) -> TeamRow {
    TeamRow {
        id: team.id().into_inner(),
        name: team.name().as_str().to_owned(),
        owner_id: team.owner_id().into_inner(),
        slug: team.slug().as_str().to_owned(),
        created_at: team.created_at(),
    }
}

fn row_to_team(row: TeamRow) -> TenancyRepositoryResult<Team> {
    let name = TeamName::new(row.name).map_err(TenancyRepositoryError::persistence)?;
    let slug = Slug::new(row.slug).map_err(TenancyRepositoryError::persistence)?;
    Ok(Team::from_persisted(PersistedTeamData {
        id: TeamId::from_uuid(row.id),
        name,
        owner_id: UserId::from_uuid(row.owner_id),
        slug,
        created_at: row.created_at,
    }))
}

fn row_to_membership(row: MembershipRow) -> TenancyRepositoryResult<TeamMembership> {
    let role = TeamRole::try_from(row.role.as_str()).map_err(TenancyRepositoryError::persistence)?;
    Ok(TeamMembership::from_persisted(
        TeamId::from_uuid(row.team_id),
        UserId::from_uuid(row.user_id),
        role,
        row.created_at,
    ))
}

fn project_to_row(project: &Project) -> TenancyRepositoryResult<ProjectRow> {
    let task_sequence =
        i64::try_from(project.task_sequence()).map_err(TenancyRepositoryError::persistence)?;
    Ok(ProjectRow {
        id: project.id().into_inner(),
        team_id: project.team_id().into_inner(),
        name: project.name().as_str().to_owned(),
        slug: project.slug().as_str().to_owned(),
        task_sequence,
        created_at: project.created_at(),
        updated_at: project.updated_at(),
    })
}

fn row_to_project(row: ProjectRow) -> TenancyRepositoryResult<Project> {
    let name = ProjectName::new(row.name).map_err(TenancyRepositoryError::persistence)?;
    let slug = Slug::new(row.slug).map_err(TenancyRepositoryError::persistence)?;
    let task_sequence =
        u64::try_from(row.task_sequence).map_err(TenancyRepositoryError::persistence)?;
    Ok(Project::from_persisted(PersistedProjectData {
        id: ProjectId::from_uuid(row.id),
        team_id: TeamId::from_uuid(row.team_id),
        name,
        slug,
        task_sequence,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }))
}
