use serde::Serialize;
use utoipa::ToSchema;

/// Names of every namespace visible to the API's service account.
#[derive(Debug, Serialize, ToSchema)]
pub struct NamespaceList {
    pub namespaces: Vec<String>,
}

/// Basic facts about the connected cluster.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClusterInfo {
    /// Git version of the API server, e.g. `v1.31.2`.
    pub version: String,
    pub node_count: usize,
    /// `os/arch` of the API server build.
    pub platform: String,
}
