use axum::{Json, Router, extract::State, routing::get};

use crate::{
    dto::{
        cluster::{ClusterInfo, NamespaceList},
        common::ErrorResponse,
    },
    error::AppError,
    services::cluster_service,
    state::SharedState,
};

/// Cluster-wide read-only queries.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/api/v1/namespaces", get(list_namespaces))
        .route("/api/v1/cluster/info", get(cluster_info))
}

/// List every namespace of the cluster.
#[utoipa::path(
    get,
    path = "/api/v1/namespaces",
    tag = "cluster",
    responses(
        (status = 200, description = "Namespace names", body = NamespaceList),
        (status = 500, description = "Kubernetes API failure", body = ErrorResponse)
    )
)]
pub async fn list_namespaces(
    State(state): State<SharedState>,
) -> Result<Json<NamespaceList>, AppError> {
    Ok(Json(cluster_service::list_namespaces(&state).await?))
}

/// Report the API server version, platform and node count.
#[utoipa::path(
    get,
    path = "/api/v1/cluster/info",
    tag = "cluster",
    responses(
        (status = 200, description = "API server version and node count", body = ClusterInfo),
        (status = 500, description = "Kubernetes API failure", body = ErrorResponse)
    )
)]
pub async fn cluster_info(State(state): State<SharedState>) -> Result<Json<ClusterInfo>, AppError> {
    Ok(Json(cluster_service::cluster_info(&state).await?))
}
