//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use common::ErrorKind;
use domain::{DomainError, TodoListError};
use projections::ProjectionError;

/// API-level error type that maps to HTTP responses.
///
/// The status code depends only on the error's [`ErrorKind`].
#[derive(Debug)]
pub enum ApiError {
    /// Malformed input that never reached the domain (e.g. a bad path id).
    BadRequest(String),
    /// Command or replay failure.
    Domain(DomainError),
    /// Read-model failure.
    Projection(ProjectionError),
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::BadRequest(_) => ErrorKind::InvalidParameter,
            ApiError::Domain(err) => err.kind(),
            ApiError::Projection(err) => err.kind(),
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::BadRequest(msg) => msg.clone(),
            ApiError::Domain(err) => err.to_string(),
            ApiError::Projection(err) => err.to_string(),
        }
    }
}

/// Maps an error kind to its HTTP status.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::InvalidParameter | ErrorKind::CapacityExceeded => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::OptimisticLock => StatusCode::CONFLICT,
        ErrorKind::Repository | ErrorKind::Query | ErrorKind::UnknownEventType => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        let status = status_for(kind);
        let message = self.message();

        if status.is_server_error() {
            tracing::error!(error = %message, %kind, "internal server error");
        }

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError::Domain(err)
    }
}

impl From<TodoListError> for ApiError {
    fn from(err: TodoListError) -> Self {
        ApiError::Domain(err.into())
    }
}

impl From<ProjectionError> for ApiError {
    fn from(err: ProjectionError) -> Self {
        ApiError::Projection(err)
    }
}
