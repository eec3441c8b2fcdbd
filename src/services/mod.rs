/// Namespace and cluster-info queries.
pub mod cluster_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// GameServer create, read, update and delete.
pub mod gameserver_service;
/// Health check service.
pub mod health_service;
/// Logs, restart and metrics of the pods behind a GameServer.
pub mod pod_service;
