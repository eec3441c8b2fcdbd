//! [`Cluster`] implementation backed by a live `kube::Client`.

use futures::{FutureExt, future::BoxFuture};
use k8s_openapi::api::core::v1::{Namespace, Node, Pod};
use kube::{
    Api, Client,
    api::{ApiResource, DeleteParams, DynamicObject, ListParams, LogParams, PostParams},
};
use tracing::debug;

use crate::{
    cluster::{
        Cluster, NamespaceScope, PodMetrics, ServerVersion,
        error::{ClusterError, ClusterResult},
    },
    resource,
};

const METRICS_API_PREFIX: &str = "/apis/metrics.k8s.io/v1beta1";

/// Talks to the API server the process was configured for.
#[derive(Clone)]
pub struct KubeCluster {
    client: Client,
    game_servers: ApiResource,
}

impl KubeCluster {
    /// Connect using the inferred configuration: in-cluster service account
    /// first, then `KUBECONFIG`, then `~/.kube/config`.
    pub async fn connect() -> ClusterResult<Self> {
        let client = Client::try_default().await?;
        Ok(Self::new(client))
    }

    /// Wrap an already configured client.
    pub fn new(client: Client) -> Self {
        Self {
            client,
            game_servers: resource::api_resource(),
        }
    }

    fn game_server_api(&self, namespace: &str) -> Api<DynamicObject> {
        Api::namespaced_with(self.client.clone(), namespace, &self.game_servers)
    }

    fn pod_api(&self, namespace: &str) -> Api<Pod> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

impl Cluster for KubeCluster {
    fn list_game_servers(
        &self,
        scope: NamespaceScope,
    ) -> BoxFuture<'static, ClusterResult<Vec<DynamicObject>>> {
        let api = match &scope {
            NamespaceScope::Namespace(namespace) => self.game_server_api(namespace),
            NamespaceScope::All => Api::all_with(self.client.clone(), &self.game_servers),
        };
        async move {
            let list = api.list(&ListParams::default()).await?;
            debug!(?scope, count = list.items.len(), "listed game servers");
            Ok(list.items)
        }
        .boxed()
    }

    fn get_game_server(
        &self,
        namespace: &str,
        name: &str,
    ) -> BoxFuture<'static, ClusterResult<DynamicObject>> {
        let api = self.game_server_api(namespace);
        let name = name.to_owned();
        async move { Ok(api.get(&name).await?) }.boxed()
    }

    fn create_game_server(
        &self,
        object: DynamicObject,
    ) -> BoxFuture<'static, ClusterResult<DynamicObject>> {
        let namespace = object.metadata.namespace.clone().unwrap_or_default();
        let api = self.game_server_api(&namespace);
        async move { Ok(api.create(&PostParams::default(), &object).await?) }.boxed()
    }

    fn replace_game_server(
        &self,
        object: DynamicObject,
    ) -> BoxFuture<'static, ClusterResult<DynamicObject>> {
        let namespace = object.metadata.namespace.clone().unwrap_or_default();
        let name = object.metadata.name.clone().unwrap_or_default();
        let api = self.game_server_api(&namespace);
        async move { Ok(api.replace(&name, &PostParams::default(), &object).await?) }.boxed()
    }

    fn delete_game_server(
        &self,
        namespace: &str,
        name: &str,
    ) -> BoxFuture<'static, ClusterResult<()>> {
        let api = self.game_server_api(namespace);
        let name = name.to_owned();
        async move {
            api.delete(&name, &DeleteParams::default()).await?;
            Ok(())
        }
        .boxed()
    }

    fn list_pods(
        &self,
        namespace: &str,
        label_selector: &str,
    ) -> BoxFuture<'static, ClusterResult<Vec<String>>> {
        let api = self.pod_api(namespace);
        let params = ListParams::default().labels(label_selector);
        async move {
            let pods = api.list(&params).await?;
            Ok(pods
                .items
                .into_iter()
                .filter_map(|pod| pod.metadata.name)
                .collect())
        }
        .boxed()
    }

    fn delete_pod(&self, namespace: &str, name: &str) -> BoxFuture<'static, ClusterResult<()>> {
        let api = self.pod_api(namespace);
        let name = name.to_owned();
        async move {
            api.delete(&name, &DeleteParams::default()).await?;
            Ok(())
        }
        .boxed()
    }

    fn pod_logs(
        &self,
        namespace: &str,
        pod: &str,
        tail_lines: i64,
    ) -> BoxFuture<'static, ClusterResult<String>> {
        let api = self.pod_api(namespace);
        let pod = pod.to_owned();
        let params = LogParams {
            tail_lines: Some(tail_lines),
            ..LogParams::default()
        };
        async move { Ok(api.logs(&pod, &params).await?) }.boxed()
    }

    fn pod_metrics(
        &self,
        namespace: &str,
        pod: &str,
    ) -> BoxFuture<'static, ClusterResult<PodMetrics>> {
        let client = self.client.clone();
        let path = format!("{METRICS_API_PREFIX}/namespaces/{namespace}/pods/{pod}");
        async move {
            let request = http::Request::get(&path)
                .body(Vec::new())
                .map_err(|source| ClusterError::Request {
                    path: path.clone(),
                    source,
                })?;
            Ok(client.request::<PodMetrics>(request).await?)
        }
        .boxed()
    }

    fn list_namespaces(&self) -> BoxFuture<'static, ClusterResult<Vec<String>>> {
        let api: Api<Namespace> = Api::all(self.client.clone());
        async move {
            let namespaces = api.list(&ListParams::default()).await?;
            Ok(namespaces
                .items
                .into_iter()
                .filter_map(|namespace| namespace.metadata.name)
                .collect())
        }
        .boxed()
    }

    fn server_version(&self) -> BoxFuture<'static, ClusterResult<ServerVersion>> {
        let client = self.client.clone();
        async move {
            let info = client.apiserver_version().await?;
            Ok(ServerVersion {
                git_version: info.git_version,
                platform: info.platform,
            })
        }
        .boxed()
    }

    fn node_count(&self) -> BoxFuture<'static, ClusterResult<usize>> {
        let api: Api<Node> = Api::all(self.client.clone());
        async move { Ok(api.list(&ListParams::default()).await?.items.len()) }.boxed()
    }

    fn ping(&self) -> BoxFuture<'static, ClusterResult<()>> {
        let client = self.client.clone();
        async move {
            client.apiserver_version().await?;
            Ok(())
        }
        .boxed()
    }
}
