// crates/consul-itest-core/src/flows.rs
// ============================================================================
// Module: Wait and Verify Flows
// Description: Multi-call sequences shared by scenario steps.
// Purpose: Keep polling parameters and verification order in one place.
// Dependencies: tokio
// ============================================================================

//! ## Overview
//! Each flow combines collaborator calls with the bounded polling helper.
//! The policy constants carry the wait budgets used against a live
//! deployment; callers pass them through
//! [`PollPolicy::with_timeout_floor`] to honor the suite-wide floor.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use serde_json::json;

use crate::error::StepError;
use crate::error::require;
use crate::error::require_eq;
use crate::events::EventSink;
use crate::events::SuiteEvent;
use crate::images::ImageCheck;
use crate::images::ImageReport;
use crate::images::parse_monitored_images;
use crate::interfaces::AlertSource;
use crate::interfaces::AlertState;
use crate::interfaces::BackupDaemon;
use crate::interfaces::BackupId;
use crate::interfaces::BackupStatus;
use crate::interfaces::ClusterStatus;
use crate::interfaces::JobStatus;
use crate::interfaces::KeyValueStore;
use crate::interfaces::Platform;
use crate::interfaces::ResourceKind;
use crate::interfaces::TaskId;
use crate::poll::Attempt;
use crate::poll::PollPolicy;
use crate::poll::poll;
use crate::poll::poll_until;
use crate::testdata::TestData;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Backup completion wait.
pub const BACKUP_POLICY: PollPolicy =
    PollPolicy::new(Duration::from_secs(120), Duration::from_secs(10));
/// Restore completion wait.
pub const RESTORE_POLICY: PollPolicy =
    PollPolicy::new(Duration::from_secs(120), Duration::from_secs(10));
/// Leader reelection wait.
pub const LEADER_REELECTION_POLICY: PollPolicy =
    PollPolicy::attempts(10, Duration::from_secs(5));
/// Leader availability wait.
pub const LEADER_AVAILABILITY_POLICY: PollPolicy =
    PollPolicy::new(Duration::from_secs(300), Duration::from_secs(1));
/// Alert state wait.
pub const ALERT_POLICY: PollPolicy = PollPolicy::new(Duration::from_secs(300), Duration::from_secs(1));

/// Pause before exercising the cluster after a failover.
pub const STABILIZATION_DELAY: Duration = Duration::from_secs(15);

/// Backup storage root inside the daemon and the bucket.
pub const BACKUP_STORAGE_ROOT: &str = "/opt/consul/backup-storage";

/// Scale target when no original replica count was recorded.
pub const DEFAULT_ORIGINAL_REPLICAS: i32 = 3;

/// Returns the storage directory for full or granular backups.
#[must_use]
pub fn backup_storage_path(granular: bool) -> String {
    if granular { format!("{BACKUP_STORAGE_ROOT}/granular") } else { BACKUP_STORAGE_ROOT.to_string() }
}

// ============================================================================
// SECTION: Backup Daemon
// ============================================================================

/// Waits for backup `id` to become valid, then checks its granularity.
///
/// Status errors (including non-200 answers) count as "not ready yet".
///
/// # Errors
///
/// Returns [`StepError::Poll`] on timeout and [`StepError::Assertion`] when
/// the finished backup has the wrong granularity.
pub async fn wait_for_backup(
    daemon: &dyn BackupDaemon,
    id: &BackupId,
    granular: bool,
    policy: PollPolicy,
) -> Result<BackupStatus, StepError> {
    let status = poll_until(
        &format!("backup {id}"),
        policy,
        || daemon.backup_status(id),
        BackupStatus::is_complete,
    )
    .await?;
    require_eq("backup granularity", &granular, &status.is_granular)?;
    Ok(status)
}

/// Waits for restore task `task` to report `Successful`.
///
/// # Errors
///
/// Returns [`StepError::Poll`] on timeout.
pub async fn wait_for_restore(
    daemon: &dyn BackupDaemon,
    task: &TaskId,
    policy: PollPolicy,
) -> Result<JobStatus, StepError> {
    let status = poll_until(
        &format!("restore {task}"),
        policy,
        || daemon.job_status(task),
        JobStatus::is_successful,
    )
    .await?;
    Ok(status)
}

/// Splits a `/listbackups` body into identifier tokens.
///
/// Tokens are maximal runs of ASCII alphanumerics, `-`, `_` and `.`, so JSON
/// arrays, quoted strings and line-separated listings all work.
pub fn listed_backup_ids(listing: &str) -> impl Iterator<Item = &str> {
    listing
        .split(|ch: char| !(ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.')))
        .filter(|token| !token.is_empty())
}

/// Checks that backup `id` no longer appears in the daemon's listing.
///
/// # Errors
///
/// Returns [`StepError::Check`] when the identifier is empty or still listed
/// and [`StepError::Client`] when the listing cannot be fetched.
pub async fn verify_backup_evicted(daemon: &dyn BackupDaemon, id: &BackupId) -> Result<(), StepError> {
    require(!id.as_str().is_empty(), "backup id is empty")?;
    let listing = daemon.list_backups().await?;
    let listed = listed_backup_ids(&listing).any(|token| token == id.as_str());
    require(!listed, format!("backup {id} is still listed"))
}

// ============================================================================
// SECTION: Server Replicas
// ============================================================================

/// Reads the stateful set replica count and requires at least `minimum`.
///
/// # Errors
///
/// Returns [`StepError::Precondition`] when the cluster is too small and
/// [`StepError::Client`] when the count cannot be read.
pub async fn require_min_replicas(
    platform: &dyn Platform,
    name: &str,
    namespace: &str,
    minimum: i32,
) -> Result<i32, StepError> {
    let replicas = platform.stateful_set_replicas(name, namespace).await?;
    if replicas < minimum {
        return Err(StepError::Precondition(format!(
            "cluster has {replicas} replicas, minimum {minimum} required"
        )));
    }
    Ok(replicas)
}

/// Scales the stateful set back to `recorded` replicas, or to
/// [`DEFAULT_ORIGINAL_REPLICAS`] when nothing was recorded.
///
/// # Errors
///
/// Returns [`StepError::Client`] when the scale call fails.
pub async fn restore_replicas(
    platform: &dyn Platform,
    name: &str,
    namespace: &str,
    recorded: Option<i32>,
) -> Result<i32, StepError> {
    let replicas = recorded.unwrap_or(DEFAULT_ORIGINAL_REPLICAS);
    platform.scale_stateful_set(name, namespace, replicas).await?;
    Ok(replicas)
}

// ============================================================================
// SECTION: Leader
// ============================================================================

/// Waits until the cluster reports a leader other than `old_leader`.
///
/// # Errors
///
/// Returns [`StepError::Poll`] when no new leader appears in time.
pub async fn wait_for_leader_reelection(
    cluster: &dyn ClusterStatus,
    old_leader: &str,
    policy: PollPolicy,
) -> Result<String, StepError> {
    let leader = poll_until(
        "leader reelection",
        policy,
        || cluster.leader(),
        |leader: &String| !leader.is_empty() && leader != old_leader,
    )
    .await?;
    Ok(leader)
}

/// Waits until the leader endpoint answers with a non-empty body.
///
/// # Errors
///
/// Returns [`StepError::Poll`] when the leader stays unreachable.
pub async fn wait_for_leader_available(
    cluster: &dyn ClusterStatus,
    policy: PollPolicy,
) -> Result<(), StepError> {
    poll("leader availability", policy, || async {
        if cluster.leader_reachable().await {
            Attempt::Ready(())
        } else {
            Attempt::NotReady("leader endpoint unreachable".to_string())
        }
    })
    .await?;
    Ok(())
}

// ============================================================================
// SECTION: Alerts
// ============================================================================

/// Waits until alert `name` in `namespace` reaches `expected`.
///
/// # Errors
///
/// Returns [`StepError::Poll`] when the state is not reached in time.
pub async fn wait_for_alert_state(
    alerts: &dyn AlertSource,
    name: &str,
    namespace: &str,
    expected: AlertState,
    policy: PollPolicy,
) -> Result<AlertState, StepError> {
    let state = poll_until(
        &format!("alert {name} to become {expected}"),
        policy,
        || alerts.alert_state(name, namespace),
        |state: &AlertState| *state == expected,
    )
    .await?;
    Ok(state)
}

// ============================================================================
// SECTION: Key-Value
// ============================================================================

/// Reads `key` and decodes it as UTF-8.
///
/// # Errors
///
/// Returns [`StepError::Client`] when the read fails and
/// [`StepError::Check`] when the bytes are not UTF-8.
pub async fn read_string(kv: &dyn KeyValueStore, key: &str) -> Result<String, StepError> {
    let bytes = kv.get(key).await?;
    String::from_utf8(bytes)
        .map_err(|err| StepError::Check(format!("value under {key:?} is not UTF-8: {err}")))
}

/// Writes, reads back, and deletes one key.
///
/// # Errors
///
/// Returns [`StepError`] on the first failed call or mismatched read.
pub async fn crud_round_trip(
    kv: &dyn KeyValueStore,
    key: &str,
    value: &str,
) -> Result<(), StepError> {
    kv.put(key, value).await?;
    require_eq(&format!("value under {key}"), value, read_string(kv, key).await?.as_str())?;
    kv.delete(key, false).await?;
    Ok(())
}

/// Runs create, read, update, read and delete over the plain test key.
///
/// # Errors
///
/// Returns [`StepError`] on the first failed call or mismatched read.
pub async fn crud_full_cycle(kv: &dyn KeyValueStore, data: &TestData) -> Result<(), StepError> {
    let key = data.test_key.as_str();
    kv.put(key, &data.test_value).await?;
    require_eq("created value", data.test_value.as_str(), read_string(kv, key).await?.as_str())?;
    kv.put(key, &data.updated_value).await?;
    require_eq("updated value", data.updated_value.as_str(), read_string(kv, key).await?.as_str())?;
    kv.delete(key, false).await?;
    Ok(())
}

// ============================================================================
// SECTION: Images
// ============================================================================

/// Checks every record of a `MONITORED_IMAGES` value against the platform.
///
/// Malformed records are skipped with a warning event. Lookup failures are
/// recorded in the report.
pub async fn check_monitored_images(
    platform: &dyn Platform,
    namespace: &str,
    raw: &str,
    events: &dyn EventSink,
) -> ImageReport {
    let parsed = parse_monitored_images(raw);
    for record in &parsed.skipped {
        events.record(&SuiteEvent::new("image_record_skipped").field("record", record.as_str()));
    }
    let mut report = ImageReport::default();
    for resource in &parsed.resources {
        let check = match resource.kind.parse::<ResourceKind>() {
            Ok(kind) => match platform
                .container_image(kind, &resource.name, namespace, &resource.container)
                .await
            {
                Ok(actual) => ImageCheck::compare(resource, &actual),
                Err(err) => ImageCheck::failed(resource, err),
            },
            Err(err) => ImageCheck::failed(resource, err),
        };
        events.record(
            &SuiteEvent::new("image_checked")
                .field("resource", check.resource.as_str())
                .field("container", check.container.as_str())
                .field("matched", check.matched())
                .field("detail", json!(check.to_string())),
        );
        report.push(check);
    }
    report
}
