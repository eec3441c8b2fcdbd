//! Error types shared by the Kubernetes backends.

use thiserror::Error;

/// Convenient result alias returning [`ClusterError`] failures.
pub type ClusterResult<T> = Result<T, ClusterError>;

/// Failures that can occur while talking to the Kubernetes API server.
#[derive(Debug, Error)]
pub enum ClusterError {
    /// The addressed object does not exist.
    #[error("not found: {0}")]
    NotFound(String),
    /// The object already exists or was modified concurrently.
    #[error("conflict: {0}")]
    Conflict(String),
    /// The API server rejected the object as invalid.
    #[error("invalid: {0}")]
    Invalid(String),
    /// The service account is not allowed to perform the request.
    #[error("forbidden: {0}")]
    Forbidden(String),
    /// Building a raw request against the API server failed.
    #[error("failed to build request for `{path}`")]
    Request {
        path: String,
        #[source]
        source: http::Error,
    },
    /// The API server could not be reached.
    #[error("unavailable: {0}")]
    Unavailable(String),
    /// Any other client or transport failure.
    #[error("kubernetes api error: {0}")]
    Kube(#[source] kube::Error),
}

impl From<kube::Error> for ClusterError {
    fn from(err: kube::Error) -> Self {
        let status = match &err {
            kube::Error::Api(response) => Some((response.code, response.message.clone())),
            kube::Error::HyperError(_) | kube::Error::Service(_) => {
                return ClusterError::Unavailable(err.to_string());
            }
            _ => None,
        };

        match status {
            Some((404, message)) => ClusterError::NotFound(message),
            Some((409, message)) => ClusterError::Conflict(message),
            Some((400 | 422, message)) => ClusterError::Invalid(message),
            Some((401 | 403, message)) => ClusterError::Forbidden(message),
            _ => ClusterError::Kube(err),
        }
    }
}

impl ClusterError {
    /// True when the upstream object is missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClusterError::NotFound(_))
    }
}
