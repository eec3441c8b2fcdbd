//! In-memory [`Cluster`] used by service and route tests.

use std::{
    collections::{BTreeMap, HashSet},
    sync::Mutex,
};

use futures::{FutureExt, future::BoxFuture};
use kube::api::DynamicObject;

use crate::cluster::{
    Cluster, NamespaceScope, PodMetrics, ServerVersion,
    error::{ClusterError, ClusterResult},
};

/// Pod known to the fake cluster.
#[derive(Debug, Clone, Default)]
pub struct FakePod {
    pub namespace: String,
    pub name: String,
    pub labels: BTreeMap<String, String>,
    pub logs: String,
    /// `None` simulates a pod that metrics-server has not scraped.
    pub metrics: Option<PodMetrics>,
}

impl FakePod {
    pub fn new(namespace: &str, name: &str, labels: &[(&str, &str)]) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            labels: labels
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            ..Self::default()
        }
    }

    pub fn with_logs(mut self, logs: &str) -> Self {
        self.logs = logs.into();
        self
    }

    pub fn with_metrics(mut self, metrics: PodMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    fn matches(&self, namespace: &str, selector: &str) -> bool {
        self.namespace == namespace
            && selector
                .split(',')
                .filter(|term| !term.is_empty())
                .all(|term| match term.split_once('=') {
                    Some((key, value)) => self.labels.get(key).map(String::as_str) == Some(value),
                    None => false,
                })
    }
}

#[derive(Default)]
struct Inner {
    game_servers: BTreeMap<(String, String), DynamicObject>,
    pods: Vec<FakePod>,
    namespaces: Vec<String>,
    version: ServerVersion,
    nodes: usize,
    unreachable: bool,
    pod_lists_fail: bool,
    deleted_pods: Vec<(String, String)>,
    log_requests: Vec<(String, i64)>,
}

/// Thread-safe fake API server keeping everything in memory.
#[derive(Default)]
pub struct FakeCluster {
    inner: Mutex<Inner>,
}

impl FakeCluster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_game_server(self, object: DynamicObject) -> Self {
        self.insert_game_server(object);
        self
    }

    pub fn with_pod(self, pod: FakePod) -> Self {
        self.lock().pods.push(pod);
        self
    }

    pub fn with_namespaces(self, namespaces: &[&str]) -> Self {
        self.lock().namespaces = namespaces.iter().map(|ns| ns.to_string()).collect();
        self
    }

    pub fn with_version(self, git_version: &str, platform: &str, nodes: usize) -> Self {
        {
            let mut inner = self.lock();
            inner.version = ServerVersion {
                git_version: git_version.into(),
                platform: platform.into(),
            };
            inner.nodes = nodes;
        }
        self
    }

    /// Make every call fail as if the API server were down.
    pub fn unreachable(self) -> Self {
        self.lock().unreachable = true;
        self
    }

    /// Fail pod listings only, leaving game server reads intact.
    pub fn failing_pod_lists(self) -> Self {
        self.lock().pod_lists_fail = true;
        self
    }

    pub fn insert_game_server(&self, object: DynamicObject) {
        let key = key_of(&object);
        self.lock().game_servers.insert(key, object);
    }

    pub fn stored_game_server(&self, namespace: &str, name: &str) -> Option<DynamicObject> {
        self.lock()
            .game_servers
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
    }

    pub fn deleted_pods(&self) -> Vec<(String, String)> {
        self.lock().deleted_pods.clone()
    }

    pub fn log_requests(&self) -> Vec<(String, i64)> {
        self.lock().log_requests.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn respond<T: Send + 'static>(
        &self,
        call: impl FnOnce(&mut Inner) -> ClusterResult<T>,
    ) -> BoxFuture<'static, ClusterResult<T>> {
        let mut inner = self.lock();
        let result = if inner.unreachable {
            Err(ClusterError::Unavailable("connection refused".into()))
        } else {
            call(&mut inner)
        };
        futures::future::ready(result).boxed()
    }
}

fn key_of(object: &DynamicObject) -> (String, String) {
    (
        object.metadata.namespace.clone().unwrap_or_default(),
        object.metadata.name.clone().unwrap_or_default(),
    )
}

fn missing(kind: &str, namespace: &str, name: &str) -> ClusterError {
    ClusterError::NotFound(format!("{kind} \"{name}\" not found in namespace \"{namespace}\""))
}

impl Cluster for FakeCluster {
    fn list_game_servers(
        &self,
        scope: NamespaceScope,
    ) -> BoxFuture<'static, ClusterResult<Vec<DynamicObject>>> {
        self.respond(move |inner| {
            Ok(inner
                .game_servers
                .iter()
                .filter(|((namespace, _), _)| match &scope {
                    NamespaceScope::Namespace(wanted) => namespace == wanted,
                    NamespaceScope::All => true,
                })
                .map(|(_, object)| object.clone())
                .collect())
        })
    }

    fn get_game_server(
        &self,
        namespace: &str,
        name: &str,
    ) -> BoxFuture<'static, ClusterResult<DynamicObject>> {
        let key = (namespace.to_string(), name.to_string());
        self.respond(move |inner| {
            inner
                .game_servers
                .get(&key)
                .cloned()
                .ok_or_else(|| missing("gameservers", &key.0, &key.1))
        })
    }

    fn create_game_server(
        &self,
        object: DynamicObject,
    ) -> BoxFuture<'static, ClusterResult<DynamicObject>> {
        self.respond(move |inner| {
            let key = key_of(&object);
            if inner.game_servers.contains_key(&key) {
                return Err(ClusterError::Conflict(format!(
                    "gameservers \"{}\" already exists",
                    key.1
                )));
            }
            inner.game_servers.insert(key, object.clone());
            Ok(object)
        })
    }

    fn replace_game_server(
        &self,
        object: DynamicObject,
    ) -> BoxFuture<'static, ClusterResult<DynamicObject>> {
        self.respond(move |inner| {
            let key = key_of(&object);
            match inner.game_servers.get_mut(&key) {
                Some(stored) => {
                    *stored = object.clone();
                    Ok(object)
                }
                None => Err(missing("gameservers", &key.0, &key.1)),
            }
        })
    }

    fn delete_game_server(
        &self,
        namespace: &str,
        name: &str,
    ) -> BoxFuture<'static, ClusterResult<()>> {
        let key = (namespace.to_string(), name.to_string());
        self.respond(move |inner| {
            inner
                .game_servers
                .remove(&key)
                .map(|_| ())
                .ok_or_else(|| missing("gameservers", &key.0, &key.1))
        })
    }

    fn list_pods(
        &self,
        namespace: &str,
        label_selector: &str,
    ) -> BoxFuture<'static, ClusterResult<Vec<String>>> {
        let namespace = namespace.to_string();
        let selector = label_selector.to_string();
        self.respond(move |inner| {
            if inner.pod_lists_fail {
                return Err(ClusterError::Forbidden(format!(
                    "pods is forbidden: cannot list resource \"pods\" in namespace \"{namespace}\""
                )));
            }
            Ok(inner
                .pods
                .iter()
                .filter(|pod| pod.matches(&namespace, &selector))
                .map(|pod| pod.name.clone())
                .collect())
        })
    }

    fn delete_pod(&self, namespace: &str, name: &str) -> BoxFuture<'static, ClusterResult<()>> {
        let namespace = namespace.to_string();
        let name = name.to_string();
        self.respond(move |inner| {
            let before = inner.pods.len();
            inner
                .pods
                .retain(|pod| !(pod.namespace == namespace && pod.name == name));
            if inner.pods.len() == before {
                return Err(missing("pods", &namespace, &name));
            }
            inner.deleted_pods.push((namespace, name));
            Ok(())
        })
    }

    fn pod_logs(
        &self,
        namespace: &str,
        pod: &str,
        tail_lines: i64,
    ) -> BoxFuture<'static, ClusterResult<String>> {
        let namespace = namespace.to_string();
        let pod = pod.to_string();
        self.respond(move |inner| {
            inner.log_requests.push((pod.clone(), tail_lines));
            let logs = inner
                .pods
                .iter()
                .find(|candidate| candidate.namespace == namespace && candidate.name == pod)
                .map(|found| found.logs.clone())
                .ok_or_else(|| missing("pods", &namespace, &pod))?;

            let lines: Vec<&str> = logs.lines().collect();
            let keep = usize::try_from(tail_lines).unwrap_or(0).min(lines.len());
            Ok(lines[lines.len() - keep..].join("\n"))
        })
    }

    fn pod_metrics(
        &self,
        namespace: &str,
        pod: &str,
    ) -> BoxFuture<'static, ClusterResult<PodMetrics>> {
        let namespace = namespace.to_string();
        let pod = pod.to_string();
        self.respond(move |inner| {
            inner
                .pods
                .iter()
                .find(|candidate| candidate.namespace == namespace && candidate.name == pod)
                .and_then(|found| found.metrics.clone())
                .ok_or_else(|| missing("podmetrics.metrics.k8s.io", &namespace, &pod))
        })
    }

    fn list_namespaces(&self) -> BoxFuture<'static, ClusterResult<Vec<String>>> {
        self.respond(|inner| {
            let mut seen = HashSet::new();
            Ok(inner
                .namespaces
                .iter()
                .filter(|ns| seen.insert(ns.as_str()))
                .cloned()
                .collect())
        })
    }

    fn server_version(&self) -> BoxFuture<'static, ClusterResult<ServerVersion>> {
        self.respond(|inner| Ok(inner.version.clone()))
    }

    fn node_count(&self) -> BoxFuture<'static, ClusterResult<usize>> {
        self.respond(|inner| Ok(inner.nodes))
    }

    fn ping(&self) -> BoxFuture<'static, ClusterResult<()>> {
        self.respond(|_| Ok(()))
    }
}
