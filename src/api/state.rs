//! Shared router state.

use crate::board::{
    ports::BoardRepository,
    services::{LaneService, TaskService},
};
use crate::tenancy::{
    ports::{IdentityProvider, TenancyRepository},
    services::{AccessScopeResolver, ProjectService, TeamService},
};
use axum::extract::FromRef;
use mockable::DefaultClock;
use sha2::{Digest, Sha256};
use std::sync::Arc;

/// Team service as mounted on the router.
pub type Teams = TeamService<dyn TenancyRepository, DefaultClock>;
/// Project service as mounted on the router.
pub type Projects = ProjectService<dyn TenancyRepository, DefaultClock>;
/// Lane service as mounted on the router.
pub type Lanes = LaneService<dyn TenancyRepository, dyn BoardRepository, DefaultClock>;
/// Task service as mounted on the router.
pub type Tasks = TaskService<dyn TenancyRepository, dyn BoardRepository, DefaultClock>;

/// Credentials accepted by the [`Authenticated`](super::Authenticated)
/// extractor.
#[derive(Clone)]
pub struct AuthConfig {
    identity: Arc<dyn IdentityProvider>,
    service_key_digest: Option<[u8; 32]>,
}

impl AuthConfig {
    /// Accepts bearer sessions resolved by `identity` and no service key.
    #[must_use]
    pub fn new(identity: Arc<dyn IdentityProvider>) -> Self {
        Self {
            identity,
            service_key_digest: None,
        }
    }

    /// Additionally accepts the given shared service key.
    #[must_use]
    pub fn with_service_key(mut self, key: &str) -> Self {
        self.service_key_digest = Some(digest(key));
        self
    }

    /// Returns the identity provider.
    #[must_use]
    pub fn identity(&self) -> &dyn IdentityProvider {
        &*self.identity
    }

    /// Whether `presented` matches the configured service key.
    ///
    /// Both sides are hashed first so the comparison time does not depend on
    /// the length of a matching prefix.
    #[must_use]
    pub fn accepts_service_key(&self, presented: &str) -> bool {
        self.service_key_digest
            .is_some_and(|expected| digest(presented) == expected)
    }
}

fn digest(value: &str) -> [u8; 32] {
    Sha256::digest(value.as_bytes()).into()
}

/// Services and credentials shared by every handler.
#[derive(Clone)]
pub struct AppState {
    /// Teams and memberships.
    pub teams: Teams,
    /// Projects.
    pub projects: Projects,
    /// Lanes.
    pub lanes: Lanes,
    /// Tasks.
    pub tasks: Tasks,
    /// Request authentication.
    pub auth: AuthConfig,
}

impl AppState {
    /// Wires every service over one store implementing both repositories.
    #[must_use]
    pub fn from_store<S>(store: Arc<S>, auth: AuthConfig) -> Self
    where
        S: TenancyRepository + BoardRepository + 'static,
    {
        let tenancy: Arc<dyn TenancyRepository> = store.clone();
        let board: Arc<dyn BoardRepository> = store;
        Self::new(tenancy, board, auth)
    }

    /// Wires every service over separate repositories.
    #[must_use]
    pub fn new(
        tenancy: Arc<dyn TenancyRepository>,
        board: Arc<dyn BoardRepository>,
        auth: AuthConfig,
    ) -> Self {
        let clock = Arc::new(DefaultClock);
        let scope = AccessScopeResolver::new(Arc::clone(&tenancy));
        Self {
            teams: TeamService::new(Arc::clone(&tenancy), Arc::clone(&clock)),
            projects: ProjectService::new(Arc::clone(&tenancy), Arc::clone(&clock)),
            lanes: LaneService::new(scope, Arc::clone(&board), Arc::clone(&clock)),
            tasks: TaskService::new(tenancy, board, clock),
            auth,
        }
    }
}

impl FromRef<AppState> for AuthConfig {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}
