//! DTOs for the pod-level actions of a game server (logs, restart, metrics).

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use utoipa::ToSchema;

/// Default number of log lines returned when the caller does not ask for more.
pub const DEFAULT_LOG_LINES: i64 = 100;

/// Query parameters of the logs endpoint.
///
/// `lines` is kept as raw text so that junk values fall back to the default
/// instead of rejecting the request.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LogsQuery {
    /// Number of trailing lines to return (default 100).
    pub lines: Option<String>,
}

impl LogsQuery {
    /// Requested tail length, falling back to [`DEFAULT_LOG_LINES`].
    pub fn tail_lines(&self) -> i64 {
        self.lines
            .as_deref()
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .filter(|lines| *lines > 0)
            .unwrap_or(DEFAULT_LOG_LINES)
    }
}

/// Logs of the first pod backing a game server.
#[derive(Debug, Serialize, ToSchema)]
pub struct LogsResponse {
    pub logs: String,
    pub pod: String,
}

/// Acknowledgement of a restart, naming the pod that was deleted.
#[derive(Debug, Serialize, ToSchema)]
pub struct RestartResponse {
    pub message: String,
    pub pod: String,
}

/// Usage of one resource compared to its configured amount.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ResourceUsage {
    /// Current usage formatted for display.
    pub current: String,
    /// Amount configured in the game server spec, verbatim.
    pub configured: String,
    /// `current / configured * 100`; may exceed 100.
    pub percentage: f64,
}

/// CPU and memory usage of a game server pod.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ResourceMetrics {
    pub cpu: ResourceUsage,
    pub memory: ResourceUsage,
}

/// Whether live metrics could be read from the metrics API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum MetricsStatus {
    Success,
    MetricsUnavailable,
}

/// Response of the metrics endpoint.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MetricsResponse {
    pub pod_name: String,
    pub pod_namespace: String,
    pub metrics: ResourceMetrics,
    pub status: MetricsStatus,
    /// Present when `status` is `metrics_unavailable`.
    pub error: Option<String>,
}

/// Where the composed workload of a game server was looked for.
///
/// Returned alongside the error message when no pod could be found, so that
/// operators can see which namespace and label were queried.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadLocation {
    pub actual_namespace: String,
    pub resource_ref_name: String,
    pub game_type: String,
    pub claim_name: String,
}

/// 404 body returned by the metrics endpoint when no workload pod exists.
#[derive(Debug, Serialize, ToSchema)]
pub struct MissingWorkloadResponse {
    pub error: String,
    #[serde(flatten)]
    pub location: WorkloadLocation,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(lines: Option<&str>) -> LogsQuery {
        LogsQuery {
            lines: lines.map(str::to_owned),
        }
    }

    #[test]
    fn tail_lines_defaults_and_falls_back() {
        assert_eq!(query(None).tail_lines(), 100);
        assert_eq!(query(Some("250")).tail_lines(), 250);
        assert_eq!(query(Some("lots")).tail_lines(), 100);
        assert_eq!(query(Some("0")).tail_lines(), 100);
        assert_eq!(query(Some("-5")).tail_lines(), 100);
    }

    #[test]
    fn missing_workload_body_is_flat() {
        let body = MissingWorkloadResponse {
            error: "no pods".into(),
            location: WorkloadLocation {
                actual_namespace: "xr-abc-vh".into(),
                resource_ref_name: "xr-abc".into(),
                game_type: "vh".into(),
                claim_name: "valheim".into(),
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["error"], "no pods");
        assert_eq!(json["actualNamespace"], "xr-abc-vh");
        assert_eq!(json["resourceRefName"], "xr-abc");
        assert_eq!(json["gameType"], "vh");
        assert_eq!(json["claimName"], "valheim");
    }
}
