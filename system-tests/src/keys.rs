// system-tests/src/keys.rs
// ============================================================================
// Module: Scenario Context Keys
// Description: Typed handles for values passed between steps.
// Dependencies: consul-itest-core
// ============================================================================

//! Every value a step leaves for a later step is stored under one of these
//! handles. Reading a handle that no earlier step wrote fails the scenario
//! with a missing-key error naming it.

use consul_itest_core::ContextKey;
use consul_itest_core::TestData;
use consul_itest_core::images::ImageReport;
use consul_itest_core::interfaces::BackupId;
use consul_itest_core::interfaces::BackupStatus;
use consul_itest_core::interfaces::JobStatus;
use consul_itest_core::interfaces::TaskId;

// ============================================================================
// SECTION: Key-Value Data
// ============================================================================

/// Generated keys and values.
pub const TEST_DATA: ContextKey<TestData> = ContextKey::new("test_data");
/// Consul answer to the last plain-key write.
pub const STORED: ContextKey<bool> = ContextKey::new("stored");
/// Consul answer to the last plain-key delete.
pub const DELETED: ContextKey<bool> = ContextKey::new("deleted");
/// Last value read from the plain key.
pub const READ_VALUE: ContextKey<String> = ContextKey::new("read_value");
/// Consul answer to the last path-key write.
pub const PATH_STORED: ContextKey<bool> = ContextKey::new("path_stored");
/// Consul answer to the last path-key delete.
pub const PATH_DELETED: ContextKey<bool> = ContextKey::new("path_deleted");
/// Last value read from the path key.
pub const PATH_READ_VALUE: ContextKey<String> = ContextKey::new("path_read_value");
/// Oversized payload.
pub const LARGE_VALUE: ContextKey<String> = ContextKey::new("large_value");
/// Key written through raw HTTP requests.
pub const FOLDER_KEY: ContextKey<String> = ContextKey::new("folder_key");
/// Status code of the last raw HTTP request.
pub const RESPONSE_STATUS: ContextKey<u16> = ContextKey::new("response_status");

// ============================================================================
// SECTION: Cluster
// ============================================================================

/// Leader address before failover.
pub const OLD_LEADER: ContextKey<String> = ContextKey::new("leader_old");
/// IP of the leader before failover.
pub const LEADER_IP: ContextKey<String> = ContextKey::new("leader_ip");
/// Leader address after failover.
pub const NEW_LEADER: ContextKey<String> = ContextKey::new("leader_new");
/// StatefulSet replica count observed before scaling.
pub const ORIGINAL_REPLICAS: ContextKey<i32> = ContextKey::new("original_replicas");

// ============================================================================
// SECTION: Backups
// ============================================================================

/// Identifier of the last backup.
pub const BACKUP_ID: ContextKey<BackupId> = ContextKey::new("backup_id");
/// Final status of the last backup.
pub const BACKUP_STATUS: ContextKey<BackupStatus> = ContextKey::new("backup_status");
/// Whether the last backup was requested as granular.
pub const IS_GRANULAR: ContextKey<bool> = ContextKey::new("is_granular");
/// Identifier of the last restore task.
pub const RESTORE_TASK: ContextKey<TaskId> = ContextKey::new("restore_task_id");
/// Final status of the last restore task.
pub const RESTORE_STATUS: ContextKey<JobStatus> = ContextKey::new("restore_status");
/// Set once the scenario switched to a daemon client without credentials.
pub const UNAUTHORIZED_SESSION: ContextKey<bool> = ContextKey::new("unauthorized_session");

// ============================================================================
// SECTION: Images
// ============================================================================

/// Raw monitored-images list.
pub const MONITORED_IMAGES: ContextKey<String> = ContextKey::new("monitored_images");
/// Results of the image checks.
pub const IMAGE_REPORT: ContextKey<ImageReport> = ContextKey::new("image_report");
