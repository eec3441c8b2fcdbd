use std::sync::Arc;

use crate::{cluster::Cluster, config::AppConfig};

pub type SharedState = Arc<AppState>;

/// State shared by every handler: the cluster backend and the immutable config.
pub struct AppState {
    cluster: Arc<dyn Cluster>,
    config: AppConfig,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    pub fn new(cluster: Arc<dyn Cluster>, config: AppConfig) -> SharedState {
        Arc::new(Self { cluster, config })
    }

    /// Backend used to reach the Kubernetes API server.
    pub fn cluster(&self) -> &dyn Cluster {
        self.cluster.as_ref()
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Namespace used when a request leaves it out or sends it empty.
    pub fn namespace_or_default(&self, namespace: Option<&str>) -> String {
        namespace
            .map(str::trim)
            .filter(|ns| !ns.is_empty())
            .unwrap_or(&self.config.default_namespace)
            .to_string()
    }
}
