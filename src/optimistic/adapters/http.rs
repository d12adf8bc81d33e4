//! `reqwest` implementation of [`RemoteBoard`] against the REST surface.

use crate::api::{
    ACTING_USER_HEADER, SERVICE_KEY_HEADER,
    dto::{
        CreateLaneBody, CreateTaskBody, LaneView, MoveLaneBody, MoveTaskBody, ProjectView,
        TaskView, UpdateLaneBody, UpdateTaskBody,
    },
};
use crate::board::domain::{LaneId, TaskId};
use crate::error::ErrorKind;
use crate::optimistic::ports::{RemoteBoard, RemoteError, RemoteResult};
use crate::tenancy::domain::{ProjectPath, TeamId, UserId};
use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response};
use serde::{Deserialize, de::DeserializeOwned};
use std::time::Duration;

/// How the client authenticates against the board API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    /// A session token sent as `Authorization: Bearer`.
    Session(String),
    /// The shared service key acting for a named user.
    Service {
        /// Shared secret.
        key: String,
        /// User the calls act for.
        acting_user: UserId,
    },
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// Remote board speaking JSON over HTTP.
#[derive(Debug, Clone)]
pub struct HttpRemoteBoard {
    client: reqwest::Client,
    base_url: String,
    credentials: Credentials,
}

impl HttpRemoteBoard {
    /// Creates a client for the server at `base_url` whose requests give up
    /// after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an internal error when the HTTP client cannot be built.
    pub fn new(
        base_url: impl Into<String>,
        credentials: Credentials,
        timeout: Duration,
    ) -> RemoteResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| RemoteError::transport(&err))?;
        let raw: String = base_url.into();
        Ok(Self {
            client,
            base_url: raw.trim_end_matches('/').to_owned(),
            credentials,
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .client
            .request(method, format!("{}/api{path}", self.base_url));
        match &self.credentials {
            Credentials::Session(token) => builder.bearer_auth(token),
            Credentials::Service { key, acting_user } => builder
                .header(SERVICE_KEY_HEADER, key)
                .header(ACTING_USER_HEADER, acting_user.to_string()),
        }
    }
}

async fn send<T: DeserializeOwned>(builder: RequestBuilder) -> RemoteResult<T> {
    let response = checked(builder).await?;
    response
        .json::<T>()
        .await
        .map_err(|err| RemoteError::transport(&err))
}

async fn send_empty(builder: RequestBuilder) -> RemoteResult<()> {
    checked(builder).await.map(drop)
}

async fn checked(builder: RequestBuilder) -> RemoteResult<Response> {
    let response = builder
        .send()
        .await
        .map_err(|err| RemoteError::transport(&err))?;
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let kind = ErrorKind::from_status(status.as_u16());
    let message = match response.json::<ErrorBody>().await {
        Ok(body) => body.error,
        Err(_) => status.to_string(),
    };
    tracing::debug!(%status, %kind, %message, "board request rejected");
    Err(RemoteError::new(kind, message))
}

fn project_path(path: ProjectPath) -> String {
    format!("/teams/{}/projects/{}", path.team_id, path.project_id)
}

#[async_trait]
impl RemoteBoard for HttpRemoteBoard {
    async fn list_projects(&self, team_id: TeamId) -> RemoteResult<Vec<ProjectView>> {
        send(self.request(Method::GET, &format!("/teams/{team_id}/projects")))
            .await
    }

    async fn list_lanes(&self, path: ProjectPath) -> RemoteResult<Vec<LaneView>> {
        let url = format!("{}/lanes", project_path(path));
        send(self.request(Method::GET, &url)).await
    }

    async fn create_lane(
        &self,
        path: ProjectPath,
        body: CreateLaneBody,
    ) -> RemoteResult<LaneView> {
        let url = format!("{}/lanes", project_path(path));
        send(self.request(Method::POST, &url).json(&body)).await
    }

    async fn update_lane(
        &self,
        path: ProjectPath,
        lane_id: LaneId,
        body: UpdateLaneBody,
    ) -> RemoteResult<LaneView> {
        let url = format!("{}/lanes/{lane_id}", project_path(path));
        send(self.request(Method::PATCH, &url).json(&body)).await
    }

    async fn move_lane(
        &self,
        path: ProjectPath,
        lane_id: LaneId,
        body: MoveLaneBody,
    ) -> RemoteResult<LaneView> {
        let url = format!("{}/lanes/{lane_id}/move", project_path(path));
        send(self.request(Method::POST, &url).json(&body)).await
    }

    async fn delete_lane(&self, path: ProjectPath, lane_id: LaneId) -> RemoteResult<()> {
        let url = format!("{}/lanes/{lane_id}", project_path(path));
        send_empty(self.request(Method::DELETE, &url)).await
    }

    async fn list_tasks(&self, path: ProjectPath) -> RemoteResult<Vec<TaskView>> {
        let url = format!("{}/tasks", project_path(path));
        send(self.request(Method::GET, &url)).await
    }

    async fn create_task(
        &self,
        path: ProjectPath,
        body: CreateTaskBody,
    ) -> RemoteResult<TaskView> {
        let url = format!("{}/tasks", project_path(path));
        send(self.request(Method::POST, &url).json(&body)).await
    }

    async fn update_task(
        &self,
        path: ProjectPath,
        task_id: TaskId,
        body: UpdateTaskBody,
    ) -> RemoteResult<TaskView> {
        let url = format!("{}/tasks/{task_id}", project_path(path));
        send(self.request(Method::PATCH, &url).json(&body)).await
    }

    async fn move_task(
        &self,
        path: ProjectPath,
        task_id: TaskId,
        body: MoveTaskBody,
    ) -> RemoteResult<TaskView> {
        let url = format!("{}/tasks/{task_id}/move", project_path(path));
        send(self.request(Method::POST, &url).json(&body)).await
    }

    async fn delete_task(&self, path: ProjectPath, task_id: TaskId) -> RemoteResult<()> {
        let url = format!("{}/tasks/{task_id}", project_path(path));
        send_empty(self.request(Method::DELETE, &url)).await
    }
}
