// crates/consul-itest-core/src/interfaces.rs
// ============================================================================
// Module: Collaborator Interfaces
// Description: Traits for the external systems the suite probes.
// Purpose: Decouple steps and wait flows from HTTP, Kubernetes and S3 clients.
// Dependencies: async-trait, serde, thiserror
// ============================================================================

//! ## Overview
//! Every external collaborator is reached through a trait defined here:
//! [`KeyValueStore`] and [`ClusterStatus`] for Consul, [`Platform`] for the
//! container orchestrator, [`BackupDaemon`] for the backup service,
//! [`BackupStorage`] for the object store and [`AlertSource`] for Prometheus.
//! Adapters live in `consul-itest-clients`; unit tests supply in-memory fakes.
//!
//! Single calls are never retried. Retrying belongs to [`crate::poll`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// External collaborator identity, used in error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    /// Consul HTTP API.
    Consul,
    /// Backup daemon HTTP API.
    BackupDaemon,
    /// Kubernetes API.
    Kubernetes,
    /// S3-compatible object store.
    S3,
    /// Prometheus HTTP API.
    Prometheus,
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Consul => "consul",
            Self::BackupDaemon => "backup daemon",
            Self::Kubernetes => "kubernetes",
            Self::S3 => "s3",
            Self::Prometheus => "prometheus",
        })
    }
}

/// Client adapter failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClientError {
    /// The client could not be constructed.
    #[error("{service} client setup failed: {message}")]
    Setup {
        /// Collaborator.
        service: Service,
        /// Failure description.
        message: String,
    },
    /// The request did not complete.
    #[error("{service} request failed: {message}")]
    Transport {
        /// Collaborator.
        service: Service,
        /// Failure description.
        message: String,
    },
    /// The collaborator answered with an unexpected HTTP status.
    #[error("{service} {operation} returned status {status}: {body}")]
    UnexpectedStatus {
        /// Collaborator.
        service: Service,
        /// Operation label.
        operation: &'static str,
        /// HTTP status code.
        status: u16,
        /// Response body excerpt.
        body: String,
    },
    /// The response body could not be decoded.
    #[error("{service} response could not be decoded: {message}")]
    Decode {
        /// Collaborator.
        service: Service,
        /// Failure description.
        message: String,
    },
    /// A Consul key does not exist.
    #[error("key {key:?} not found in consul")]
    KeyNotFound {
        /// Missing key.
        key: String,
    },
    /// A named resource does not exist.
    #[error("{service} resource not found: {what}")]
    NotFound {
        /// Collaborator.
        service: Service,
        /// Resource description.
        what: String,
    },
}

// ============================================================================
// SECTION: Consul
// ============================================================================

/// Consul key-value operations.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Stores `value` under `key`; returns the API's boolean answer.
    async fn put(&self, key: &str, value: &str) -> Result<bool, ClientError>;

    /// Returns the raw bytes stored under `key`.
    ///
    /// Absent keys yield [`ClientError::KeyNotFound`].
    async fn get(&self, key: &str) -> Result<Vec<u8>, ClientError>;

    /// Deletes `key`, or every key under the prefix when `recurse` is set.
    async fn delete(&self, key: &str, recurse: bool) -> Result<bool, ClientError>;

    /// Issues a plain HTTP PUT and returns the status code.
    ///
    /// The server dropping the connection while the body is in flight is
    /// reported as `413`; refused connections and timeouts are errors.
    async fn put_raw(&self, key: &str, value: &str) -> Result<u16, ClientError>;
}

/// Consul cluster status operations.
#[async_trait]
pub trait ClusterStatus: Send + Sync {
    /// Returns the leader address (`ip:port`); empty when there is no leader.
    async fn leader(&self) -> Result<String, ClientError>;

    /// Returns the raft peer addresses.
    async fn peers(&self) -> Result<Vec<String>, ClientError>;

    /// Returns true when the leader endpoint answers 200 with a non-empty body.
    async fn leader_reachable(&self) -> bool;
}

// ============================================================================
// SECTION: Platform
// ============================================================================

/// Workload kinds whose container images can be inspected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// apps/v1 Deployment.
    Deployment,
    /// apps/v1 StatefulSet.
    StatefulSet,
    /// apps/v1 DaemonSet.
    DaemonSet,
    /// apps/v1 ReplicaSet.
    ReplicaSet,
    /// batch/v1 Job.
    Job,
    /// batch/v1 CronJob.
    CronJob,
    /// core/v1 Pod.
    Pod,
}

impl ResourceKind {
    /// Returns the canonical kind name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Deployment => "deployment",
            Self::StatefulSet => "statefulset",
            Self::DaemonSet => "daemonset",
            Self::ReplicaSet => "replicaset",
            Self::Job => "job",
            Self::CronJob => "cronjob",
            Self::Pod => "pod",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognized workload kind.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unsupported resource kind {kind:?}")]
pub struct UnknownResourceKind {
    /// Rejected input.
    pub kind: String,
}

impl FromStr for ResourceKind {
    type Err = UnknownResourceKind;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "deployment" | "deployments" | "deploy" => Ok(Self::Deployment),
            "statefulset" | "statefulsets" | "sts" => Ok(Self::StatefulSet),
            "daemonset" | "daemonsets" | "ds" => Ok(Self::DaemonSet),
            "replicaset" | "replicasets" | "rs" => Ok(Self::ReplicaSet),
            "job" | "jobs" => Ok(Self::Job),
            "cronjob" | "cronjobs" | "cj" => Ok(Self::CronJob),
            "pod" | "pods" | "po" => Ok(Self::Pod),
            _ => Err(UnknownResourceKind {
                kind: raw.to_string(),
            }),
        }
    }
}

/// Container orchestrator queries and mutations.
#[async_trait]
pub trait Platform: Send + Sync {
    /// Returns the desired replica count of a StatefulSet.
    async fn stateful_set_replicas(&self, name: &str, namespace: &str) -> Result<i32, ClientError>;

    /// Returns the ready replica count of a StatefulSet.
    async fn stateful_set_ready_replicas(
        &self,
        name: &str,
        namespace: &str,
    ) -> Result<i32, ClientError>;

    /// Sets the desired replica count of a StatefulSet.
    async fn scale_stateful_set(
        &self,
        name: &str,
        namespace: &str,
        replicas: i32,
    ) -> Result<(), ClientError>;

    /// Deletes the pod whose IP address is `ip`.
    async fn delete_pod_by_ip(&self, ip: &str, namespace: &str) -> Result<(), ClientError>;

    /// Returns the image of `container` in the given workload.
    async fn container_image(
        &self,
        kind: ResourceKind,
        name: &str,
        namespace: &str,
        container: &str,
    ) -> Result<String, ClientError>;
}

// ============================================================================
// SECTION: Backup Daemon
// ============================================================================

/// Backup identifier returned by `POST /backup`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BackupId(String);

impl BackupId {
    /// Wraps an identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Parses a response body, dropping whitespace and surrounding quotes.
    #[must_use]
    pub fn from_response_body(body: &str) -> Self {
        Self(strip_quotes(body))
    }

    /// Returns the identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BackupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Restore task identifier returned by `POST /restore`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TaskId(String);

impl TaskId {
    /// Wraps an identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Parses a response body, dropping whitespace and surrounding quotes.
    #[must_use]
    pub fn from_response_body(body: &str) -> Self {
        Self(strip_quotes(body))
    }

    /// Returns the identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Strips whitespace and double quotes from both ends of a body.
fn strip_quotes(body: &str) -> String {
    body.trim().trim_matches('"').to_string()
}

/// Scope of a requested backup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackupScope {
    /// Every datacenter.
    Full,
    /// One datacenter only.
    Granular {
        /// Datacenter name.
        datacenter: String,
    },
}

impl BackupScope {
    /// Returns true for granular backups.
    #[must_use]
    pub const fn is_granular(&self) -> bool {
        matches!(self, Self::Granular { .. })
    }

    /// Returns the JSON request body, if the scope needs one.
    #[must_use]
    pub fn request_body(&self) -> Option<DatabaseSelection> {
        match self {
            Self::Full => None,
            Self::Granular {
                datacenter,
            } => Some(DatabaseSelection {
                dbs: vec![datacenter.clone()],
            }),
        }
    }
}

/// `{"dbs": [...]}` request body for granular backups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatabaseSelection {
    /// Selected datacenters.
    pub dbs: Vec<String>,
}

/// `POST /restore` request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RestoreRequest {
    /// Backup to restore from.
    pub vault: String,
    /// Datacenters to restore.
    pub dbs: Vec<String>,
    /// ACL recovery switch; the daemon expects the string form.
    pub skip_acl_recovery: String,
}

impl RestoreRequest {
    /// Builds a restore of one datacenter that skips ACL recovery.
    #[must_use]
    pub fn new(backup: &BackupId, datacenter: &str) -> Self {
        Self {
            vault: backup.as_str().to_string(),
            dbs: vec![datacenter.to_string()],
            skip_acl_recovery: "true".to_string(),
        }
    }
}

/// `GET /listbackups/<id>` record. Missing fields read as `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct BackupStatus {
    /// Backup failed.
    #[serde(default)]
    pub failed: bool,
    /// Backup is complete and usable.
    #[serde(default)]
    pub valid: bool,
    /// Backup covers a datacenter subset.
    #[serde(default)]
    pub is_granular: bool,
}

impl BackupStatus {
    /// Returns true once the backup is valid and has not failed.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.valid && !self.failed
    }
}

impl fmt::Display for BackupStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "valid={} failed={} is_granular={}", self.valid, self.failed, self.is_granular)
    }
}

/// `GET /jobstatus/<id>` record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct JobStatus {
    /// Job state label.
    #[serde(default)]
    pub status: String,
}

impl JobStatus {
    /// State reported by a finished restore.
    pub const SUCCESSFUL: &'static str = "Successful";

    /// Returns true when the job finished successfully.
    #[must_use]
    pub fn is_successful(&self) -> bool {
        self.status == Self::SUCCESSFUL
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "status={:?}", self.status)
    }
}

/// Backup daemon HTTP API.
#[async_trait]
pub trait BackupDaemon: Send + Sync {
    /// Calls `GET /health` and returns the status code, whatever it is.
    async fn health(&self) -> Result<u16, ClientError>;

    /// Calls `POST /backup`; anything but 200 is an error.
    async fn request_backup(&self, scope: &BackupScope) -> Result<BackupId, ClientError>;

    /// Calls `GET /listbackups/<id>`; anything but 200 is an error.
    async fn backup_status(&self, id: &BackupId) -> Result<BackupStatus, ClientError>;

    /// Calls `POST /restore`; anything but 200 is an error.
    async fn request_restore(&self, request: &RestoreRequest) -> Result<TaskId, ClientError>;

    /// Calls `GET /jobstatus/<id>`; anything but 200 is an error.
    async fn job_status(&self, task: &TaskId) -> Result<JobStatus, ClientError>;

    /// Calls `POST /evict/<id>`; anything but 200 is an error.
    async fn evict(&self, id: &BackupId) -> Result<(), ClientError>;

    /// Calls `GET /listbackups` and returns the raw body.
    async fn list_backups(&self) -> Result<String, ClientError>;

    /// Calls `POST /backup` and returns the status code without judging it.
    async fn try_backup(&self) -> Result<u16, ClientError>;
}

// ============================================================================
// SECTION: Object Storage
// ============================================================================

/// Backup artifact lookups in object storage.
#[async_trait]
pub trait BackupStorage: Send + Sync {
    /// Returns true when at least one object exists under `<path>/<id>`.
    async fn backup_exists(&self, path: &str, id: &BackupId) -> Result<bool, ClientError>;
}

// ============================================================================
// SECTION: Alerts
// ============================================================================

/// Prometheus alert state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertState {
    /// No active alert matched.
    Inactive,
    /// Alert condition holds but the `for` window has not elapsed.
    Pending,
    /// Alert is firing.
    Firing,
}

impl AlertState {
    /// Returns the Prometheus state label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Inactive => "inactive",
            Self::Pending => "pending",
            Self::Firing => "firing",
        }
    }
}

impl fmt::Display for AlertState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognized alert state label.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown alert state {state:?}")]
pub struct UnknownAlertState {
    /// Rejected input.
    pub state: String,
}

impl FromStr for AlertState {
    type Err = UnknownAlertState;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "inactive" => Ok(Self::Inactive),
            "pending" => Ok(Self::Pending),
            "firing" => Ok(Self::Firing),
            _ => Err(UnknownAlertState {
                state: raw.to_string(),
            }),
        }
    }
}

/// Alert state queries.
#[async_trait]
pub trait AlertSource: Send + Sync {
    /// Returns the state of alert `name` in `namespace`.
    ///
    /// Alerts without an active match are [`AlertState::Inactive`].
    async fn alert_state(&self, name: &str, namespace: &str) -> Result<AlertState, ClientError>;
}
