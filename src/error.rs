use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::IntoResponse,
};
use thiserror::Error;
use validator::ValidationErrors;

use crate::{
    cluster::ClusterError,
    dto::{
        common::ErrorResponse,
        pod::{MissingWorkloadResponse, WorkloadLocation},
    },
};

/// Errors that can occur in service layer operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Invalid input provided by the client.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// Resource already exists or was modified concurrently.
    #[error("conflict: {0}")]
    Conflict(String),
    /// The service account may not perform the operation.
    #[error("forbidden: {0}")]
    Forbidden(String),
    /// The game server exists but its workload has no pod yet.
    #[error("workload not found: {message}")]
    MissingWorkload {
        message: String,
        location: WorkloadLocation,
    },
    /// The Kubernetes API failed in a way the client cannot fix.
    #[error("upstream error: {0}")]
    Upstream(String),
}

impl From<ClusterError> for ServiceError {
    fn from(err: ClusterError) -> Self {
        match err {
            ClusterError::NotFound(message) => ServiceError::NotFound(message),
            ClusterError::Conflict(message) => ServiceError::Conflict(message),
            ClusterError::Invalid(message) => ServiceError::InvalidInput(message),
            ClusterError::Forbidden(message) => ServiceError::Forbidden(message),
            other => ServiceError::Upstream(other.to_string()),
        }
    }
}

impl From<ValidationErrors> for ServiceError {
    fn from(err: ValidationErrors) -> Self {
        ServiceError::InvalidInput(format!("validation failed: {err}"))
    }
}

/// Application-level errors that are converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad request with invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// Requested resource not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// Conflict with current state.
    #[error("conflict: {0}")]
    Conflict(String),
    /// Access denied by the cluster.
    #[error("forbidden: {0}")]
    Forbidden(String),
    /// No workload pod found; the body names where it was looked for.
    #[error("not found: {}", .0.error)]
    MissingWorkload(Box<MissingWorkloadResponse>),
    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::InvalidInput(message) => AppError::BadRequest(message),
            ServiceError::NotFound(message) => AppError::NotFound(message),
            ServiceError::Conflict(message) => AppError::Conflict(message),
            ServiceError::Forbidden(message) => AppError::Forbidden(message),
            ServiceError::MissingWorkload { message, location } => {
                AppError::MissingWorkload(Box::new(MissingWorkloadResponse {
                    error: message,
                    location,
                }))
            }
            ServiceError::Upstream(message) => AppError::Internal(message),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(format!("Invalid request body: {}", rejection.body_text()))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound(message) => (StatusCode::NOT_FOUND, message),
            AppError::Conflict(message) => (StatusCode::CONFLICT, message),
            AppError::Forbidden(message) => (StatusCode::FORBIDDEN, message),
            AppError::Internal(message) => (StatusCode::INTERNAL_SERVER_ERROR, message),
            AppError::MissingWorkload(body) => {
                return (StatusCode::NOT_FOUND, Json(*body)).into_response();
            }
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
