//! Pod-level actions on a game server: logs, restart and live metrics.
//!
//! Logs and restart address the pods labelled with the claim instance in the
//! claim namespace. Metrics follow the claim to the namespace composed for
//! its workload, which is only known once `spec.resourceRef` is bound.

use tracing::{debug, info, warn};

use crate::{
    cluster::{ClusterError, PodMetrics},
    dto::pod::{
        LogsResponse, MetricsResponse, MetricsStatus, ResourceMetrics, ResourceUsage,
        RestartResponse, WorkloadLocation,
    },
    error::ServiceError,
    quantity,
    resource::{self, ConfiguredResources},
    state::SharedState,
};

const NO_PODS: &str = "No pods found for GameServer";
const UNBOUND_CLAIM: &str =
    "GameServer resourceRef.name not found in status - server may not be ready yet";

/// Tail the logs of the first pod of a claim.
pub async fn pod_logs(
    state: &SharedState,
    namespace: &str,
    name: &str,
    tail_lines: i64,
) -> Result<LogsResponse, ServiceError> {
    let pod = first_claim_pod(state, namespace, name).await?;
    let logs = state
        .cluster()
        .pod_logs(namespace, &pod, tail_lines)
        .await
        .map_err(|err| ServiceError::Upstream(format!("Failed to get logs: {err}")))?;

    debug!(%namespace, %name, %pod, tail_lines, "fetched pod logs");
    Ok(LogsResponse { logs, pod })
}

/// Delete the first pod of a claim so its controller recreates it.
pub async fn restart_game_server(
    state: &SharedState,
    namespace: &str,
    name: &str,
) -> Result<RestartResponse, ServiceError> {
    let pod = first_claim_pod(state, namespace, name).await?;
    state
        .cluster()
        .delete_pod(namespace, &pod)
        .await
        .map_err(|err| ServiceError::Upstream(format!("Failed to restart GameServer: {err}")))?;

    info!(%namespace, %name, %pod, "restarted game server");
    Ok(RestartResponse {
        message: format!("GameServer {name} restarted successfully"),
        pod,
    })
}

/// Current CPU and memory usage of a claim's workload against its configured
/// resources.
///
/// A workload whose metrics cannot be read still answers, with zeroed usage
/// and [`MetricsStatus::MetricsUnavailable`].
pub async fn game_server_metrics(
    state: &SharedState,
    namespace: &str,
    name: &str,
) -> Result<MetricsResponse, ServiceError> {
    let claim = state
        .cluster()
        .get_game_server(namespace, name)
        .await
        .map_err(|err| ServiceError::NotFound(format!("GameServer not found: {err}")))?;

    let configured = resource::configured_resources(&claim);
    let workload = resource::workload_ref(&claim)
        .ok_or_else(|| ServiceError::NotFound(UNBOUND_CLAIM.into()))?;
    let workload_namespace = workload.namespace();

    let pods = state
        .cluster()
        .list_pods(&workload_namespace, &workload.selector())
        .await
        .map_err(|err| {
            ServiceError::Upstream(format!(
                "Failed to list pods in namespace {workload_namespace}: {err}"
            ))
        })?;

    let Some(pod) = pods.into_iter().next() else {
        return Err(ServiceError::MissingWorkload {
            message: format!("{NO_PODS} {name} in namespace {workload_namespace}"),
            location: WorkloadLocation {
                actual_namespace: workload_namespace,
                resource_ref_name: workload.resource_ref_name,
                game_type: workload.game_type,
                claim_name: name.to_string(),
            },
        });
    };

    let usage = state
        .cluster()
        .pod_metrics(&workload_namespace, &pod)
        .await
        .map_err(|err| format!("failed to get metrics: {err}"))
        .and_then(|metrics| first_container_usage(&metrics));

    let response = match usage {
        Ok((cpu, memory)) => MetricsResponse {
            metrics: measure(&cpu, &memory, configured),
            status: MetricsStatus::Success,
            error: None,
            pod_name: pod,
            pod_namespace: workload_namespace,
        },
        Err(reason) => {
            warn!(namespace = %workload_namespace, %pod, error = %reason, "pod metrics unavailable");
            MetricsResponse {
                metrics: unavailable(configured),
                status: MetricsStatus::MetricsUnavailable,
                error: Some(format!("Metrics unavailable: {reason}")),
                pod_name: pod,
                pod_namespace: workload_namespace,
            }
        }
    };
    Ok(response)
}

async fn first_claim_pod(
    state: &SharedState,
    namespace: &str,
    name: &str,
) -> Result<String, ServiceError> {
    let pods = state
        .cluster()
        .list_pods(namespace, &resource::instance_selector(name))
        .await
        .map_err(|err: ClusterError| ServiceError::Upstream(format!("Failed to find pods: {err}")))?;

    pods.into_iter()
        .next()
        .ok_or_else(|| ServiceError::NotFound(NO_PODS.into()))
}

/// Raw usage of the first container, which runs the game server itself.
fn first_container_usage(metrics: &PodMetrics) -> Result<(String, String), String> {
    let container = metrics
        .containers
        .first()
        .ok_or_else(|| "no container metrics found".to_string())?;
    let usage = container
        .usage
        .as_ref()
        .ok_or_else(|| "no usage data found".to_string())?;
    debug!(container = %container.name, "reading container usage");

    Ok((
        usage.cpu.clone().unwrap_or_else(|| "0m".into()),
        usage.memory.clone().unwrap_or_else(|| "0Mi".into()),
    ))
}

fn measure(cpu: &str, memory: &str, configured: ConfiguredResources) -> ResourceMetrics {
    let cpu_percentage = quantity::cpu_percentage(cpu, &configured.cpu);
    let memory_percentage = quantity::memory_percentage(memory, &configured.memory);
    debug!(
        cpu,
        configured_cpu = %configured.cpu,
        cpu_percentage,
        memory,
        configured_memory = %configured.memory,
        memory_percentage,
        "computed pod usage"
    );

    ResourceMetrics {
        cpu: ResourceUsage {
            current: quantity::format_cpu(cpu),
            configured: configured.cpu,
            percentage: cpu_percentage,
        },
        memory: ResourceUsage {
            current: quantity::format_memory(memory),
            configured: configured.memory,
            percentage: memory_percentage,
        },
    }
}

fn unavailable(configured: ConfiguredResources) -> ResourceMetrics {
    ResourceMetrics {
        cpu: ResourceUsage {
            current: "0m".into(),
            configured: configured.cpu,
            percentage: 0.0,
        },
        memory: ResourceUsage {
            current: "0Mi".into(),
            configured: configured.memory,
            percentage: 0.0,
        },
    }
}
