// system-tests/tests/steps/backup.rs
// ============================================================================
// Module: Backup Steps
// Description: Backup, restore, eviction, and auth enforcement on the daemon.
// ============================================================================

use consul_itest_core::StepError;
use consul_itest_core::SuiteEvent;
use consul_itest_core::flows::BACKUP_POLICY;
use consul_itest_core::flows::RESTORE_POLICY;
use consul_itest_core::flows::read_string;
use consul_itest_core::flows::verify_backup_evicted;
use consul_itest_core::flows::wait_for_backup;
use consul_itest_core::flows::wait_for_restore;
use consul_itest_core::interfaces::BackupDaemon;
use consul_itest_core::interfaces::BackupScope;
use consul_itest_core::interfaces::KeyValueStore;
use consul_itest_core::interfaces::RestoreRequest;
use consul_itest_core::require;
use consul_itest_core::require_eq;
use consul_system_tests::keys;
use cucumber::given;
use cucumber::then;
use cucumber::when;

use crate::world::ConsulWorld;

async fn perform_backup(world: &mut ConsulWorld, scope: BackupScope) -> Result<(), StepError> {
    let suite = world.suite()?;
    let daemon = suite.backup_daemon().await?;
    let granular = scope.is_granular();
    let id = daemon.request_backup(&scope).await?;
    world.emit(
        SuiteEvent::new("backup_started").field("id", id.as_str()).field("granular", granular),
    );
    world.ctx.insert(keys::BACKUP_ID, id.clone());
    world.ctx.insert(keys::IS_GRANULAR, granular);
    let status = wait_for_backup(daemon, &id, granular, suite.policy(BACKUP_POLICY)).await?;
    world.emit(SuiteEvent::new("backup_completed").field("id", id.as_str()));
    world.ctx.insert(keys::BACKUP_STATUS, status);
    Ok(())
}

// ============================================================================
// SECTION: Actions
// ============================================================================

#[given("unauthorized backup session")]
async fn unauthorized_session(world: &mut ConsulWorld) -> Result<(), StepError> {
    world.suite()?.config().backup()?;
    world.ctx.insert(keys::UNAUTHORIZED_SESSION, true);
    Ok(())
}

#[when("I perform full backup")]
async fn full_backup(world: &mut ConsulWorld) -> Result<(), StepError> {
    perform_backup(world, BackupScope::Full).await
}

#[when("I perform granular backup")]
async fn granular_backup(world: &mut ConsulWorld) -> Result<(), StepError> {
    let datacenter = world.suite()?.datacenter()?.to_string();
    perform_backup(
        world,
        BackupScope::Granular {
            datacenter,
        },
    )
    .await
}

#[when("I restore from backup")]
async fn restore_from_backup(world: &mut ConsulWorld) -> Result<(), StepError> {
    let suite = world.suite()?;
    let daemon = suite.backup_daemon().await?;
    let request = RestoreRequest::new(world.ctx.get(keys::BACKUP_ID)?, suite.datacenter()?);
    let task = daemon.request_restore(&request).await?;
    world.emit(SuiteEvent::new("restore_started").field("task", task.as_str()));
    world.ctx.insert(keys::RESTORE_TASK, task.clone());
    let status = wait_for_restore(daemon, &task, suite.policy(RESTORE_POLICY)).await?;
    world.emit(SuiteEvent::new("restore_completed").field("task", task.as_str()));
    world.ctx.insert(keys::RESTORE_STATUS, status);
    Ok(())
}

#[when("I evict backup by ID")]
async fn evict_backup(world: &mut ConsulWorld) -> Result<(), StepError> {
    let suite = world.suite()?;
    let id = world.ctx.get(keys::BACKUP_ID)?;
    suite.backup_daemon().await?.evict(id).await?;
    world.emit(SuiteEvent::new("backup_evicted").field("id", id.as_str()));
    Ok(())
}

#[when("I try to create backup without auth")]
async fn backup_without_auth(world: &mut ConsulWorld) -> Result<(), StepError> {
    require(
        *world.ctx.get(keys::UNAUTHORIZED_SESSION)?,
        "unauthorized backup session was not prepared",
    )?;
    let daemon = world.suite()?.unauthenticated_backup_daemon()?;
    let status = daemon.try_backup().await?;
    world.emit(SuiteEvent::new("unauthenticated_backup").field("status", status));
    world.ctx.insert(keys::RESPONSE_STATUS, status);
    Ok(())
}

// ============================================================================
// SECTION: Assertions
// ============================================================================

#[then("backup should complete successfully")]
async fn backup_completed(world: &mut ConsulWorld) -> Result<(), StepError> {
    world.ctx.get(keys::BACKUP_ID)?;
    let status = world.ctx.get(keys::BACKUP_STATUS)?;
    require(status.is_complete(), format!("backup is not complete: {status}"))
}

#[then("backup should be marked as granular")]
async fn backup_is_granular(world: &mut ConsulWorld) -> Result<(), StepError> {
    require_eq("requested granularity", &true, world.ctx.get(keys::IS_GRANULAR)?)?;
    require_eq("reported granularity", &true, &world.ctx.get(keys::BACKUP_STATUS)?.is_granular)
}

#[then("restore should complete successfully")]
async fn restore_completed(world: &mut ConsulWorld) -> Result<(), StepError> {
    world.ctx.get(keys::RESTORE_TASK)?;
    let status = world.ctx.get(keys::RESTORE_STATUS)?;
    require(status.is_successful(), format!("restore did not succeed: {status}"))
}

#[then("test data should be recovered")]
async fn data_recovered(world: &mut ConsulWorld) -> Result<(), StepError> {
    let suite = world.suite()?;
    let data = world.data()?;
    let value = read_string(suite.consul(), &data.test_key).await?;
    require_eq(&format!("value under {}", data.test_key), data.test_value.as_str(), value.as_str())?;
    suite.consul().delete(&data.test_key, false).await?;
    world.emit(SuiteEvent::new("data_recovered").field("key", data.test_key.as_str()));
    Ok(())
}

#[then("backup should be removed from list")]
async fn backup_removed_from_list(world: &mut ConsulWorld) -> Result<(), StepError> {
    let suite = world.suite()?;
    let id = world.ctx.get(keys::BACKUP_ID)?;
    verify_backup_evicted(suite.backup_daemon().await?, id).await
}
