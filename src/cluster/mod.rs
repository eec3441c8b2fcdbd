//! Access to the Kubernetes API server.
//!
//! Services only talk to the cluster through the [`Cluster`] trait so the HTTP
//! layer can be exercised without a live API server.

pub mod error;
#[cfg(test)]
pub mod fake;
pub mod kubernetes;

use futures::future::BoxFuture;
use kube::api::DynamicObject;
use serde::Deserialize;

pub use self::error::{ClusterError, ClusterResult};
pub use self::kubernetes::KubeCluster;

/// Namespace selection for list calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamespaceScope {
    /// Restrict the call to one namespace.
    Namespace(String),
    /// Query every namespace.
    All,
}

/// Version facts reported by the API server.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerVersion {
    pub git_version: String,
    pub platform: String,
}

/// Subset of `metrics.k8s.io/v1beta1` `PodMetrics` used by the API.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PodMetrics {
    #[serde(default)]
    pub containers: Vec<ContainerMetrics>,
}

/// Usage sample of a single container.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ContainerMetrics {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub usage: Option<ContainerUsage>,
}

/// Raw quantities as reported by metrics-server (`"2001669174n"`, `"54Mi"`).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ContainerUsage {
    #[serde(default)]
    pub cpu: Option<String>,
    #[serde(default)]
    pub memory: Option<String>,
}

/// Abstraction over the Kubernetes calls the API needs.
pub trait Cluster: Send + Sync {
    fn list_game_servers(
        &self,
        scope: NamespaceScope,
    ) -> BoxFuture<'static, ClusterResult<Vec<DynamicObject>>>;
    fn get_game_server(
        &self,
        namespace: &str,
        name: &str,
    ) -> BoxFuture<'static, ClusterResult<DynamicObject>>;
    fn create_game_server(
        &self,
        object: DynamicObject,
    ) -> BoxFuture<'static, ClusterResult<DynamicObject>>;
    fn replace_game_server(
        &self,
        object: DynamicObject,
    ) -> BoxFuture<'static, ClusterResult<DynamicObject>>;
    fn delete_game_server(&self, namespace: &str, name: &str)
    -> BoxFuture<'static, ClusterResult<()>>;
    /// Names of the pods matching `label_selector`, in API order.
    fn list_pods(
        &self,
        namespace: &str,
        label_selector: &str,
    ) -> BoxFuture<'static, ClusterResult<Vec<String>>>;
    fn delete_pod(&self, namespace: &str, name: &str) -> BoxFuture<'static, ClusterResult<()>>;
    fn pod_logs(
        &self,
        namespace: &str,
        pod: &str,
        tail_lines: i64,
    ) -> BoxFuture<'static, ClusterResult<String>>;
    fn pod_metrics(
        &self,
        namespace: &str,
        pod: &str,
    ) -> BoxFuture<'static, ClusterResult<PodMetrics>>;
    fn list_namespaces(&self) -> BoxFuture<'static, ClusterResult<Vec<String>>>;
    fn server_version(&self) -> BoxFuture<'static, ClusterResult<ServerVersion>>;
    fn node_count(&self) -> BoxFuture<'static, ClusterResult<usize>>;
    /// Cheap reachability probe of the API server.
    fn ping(&self) -> BoxFuture<'static, ClusterResult<()>>;
}
