use tracing::warn;

use crate::{
    dto::cluster::{ClusterInfo, NamespaceList},
    error::ServiceError,
    state::SharedState,
};

/// Names of every namespace in the cluster.
pub async fn list_namespaces(state: &SharedState) -> Result<NamespaceList, ServiceError> {
    let namespaces = state.cluster().list_namespaces().await.map_err(|err| {
        warn!(error = %err, "failed to list namespaces");
        ServiceError::Upstream("Failed to list namespaces".into())
    })?;
    Ok(NamespaceList { namespaces })
}

/// API server version, build platform and node count.
pub async fn cluster_info(state: &SharedState) -> Result<ClusterInfo, ServiceError> {
    let version = state.cluster().server_version().await.map_err(|err| {
        warn!(error = %err, "failed to get cluster version");
        ServiceError::Upstream("Failed to get cluster version".into())
    })?;
    let node_count = state.cluster().node_count().await.map_err(|err| {
        warn!(error = %err, "failed to list nodes");
        ServiceError::Upstream("Failed to get nodes".into())
    })?;

    Ok(ClusterInfo {
        version: version.git_version,
        node_count,
        platform: version.platform,
    })
}
