//! HTTP error responses.

use crate::board::services::BoardServiceError;
use crate::error::{Classify, ErrorKind};
use crate::tenancy::services::TenancyServiceError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;

/// Message returned for every internal failure; details only go to the log.
const INTERNAL_MESSAGE: &str = "internal server error";

/// Unified API error type.
///
/// Produces `{"error": "<message>"}` JSON responses with the status code of
/// the error's [`ErrorKind`].
#[derive(Debug)]
pub struct ApiErr {
    kind: ErrorKind,
    message: String,
}

impl ApiErr {
    /// Creates an error of the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// 400 with a validation message.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// 401 with an authentication message.
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unauthorized, message)
    }

    /// Classifies a service error, logging and masking internal failures.
    #[must_use]
    pub fn classified<E>(err: &E) -> Self
    where
        E: Classify + fmt::Display,
    {
        match err.kind() {
            ErrorKind::Internal => {
                tracing::error!(error = %err, "request failed");
                Self::new(ErrorKind::Internal, INTERNAL_MESSAGE)
            }
            kind => Self::new(kind, err.to_string()),
        }
    }

    /// Returns the error kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the client-facing message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Maps an error kind to its HTTP status.
#[must_use]
pub const fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorKind::Forbidden => StatusCode::FORBIDDEN,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<TenancyServiceError> for ApiErr {
    fn from(err: TenancyServiceError) -> Self {
        Self::classified(&err)
    }
}

impl From<BoardServiceError> for ApiErr {
    fn from(err: BoardServiceError) -> Self {
        Self::classified(&err)
    }
}

impl IntoResponse for ApiErr {
    fn into_response(self) -> Response {
        (
            status_for(self.kind),
            Json(serde_json::json!({ "error": self.message })),
        )
            .into_response()
    }
}
