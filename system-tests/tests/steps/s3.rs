// system-tests/tests/steps/s3.rs
// ============================================================================
// Module: S3 Storage Steps
// Description: Backup artifact presence and removal in object storage.
// ============================================================================

use consul_itest_core::StepError;
use consul_itest_core::SuiteEvent;
use consul_itest_core::flows::backup_storage_path;
use consul_itest_core::interfaces::BackupStorage;
use consul_itest_core::require_eq;
use consul_system_tests::keys;
use cucumber::then;

use crate::world::ConsulWorld;

async fn check_storage(
    world: &mut ConsulWorld,
    granular: bool,
    expected: bool,
) -> Result<(), StepError> {
    let suite = world.suite()?;
    let id = world.ctx.get(keys::BACKUP_ID)?;
    let path = backup_storage_path(granular);
    let exists = suite.backup_storage().await?.backup_exists(&path, id).await?;
    world.emit(
        SuiteEvent::new("s3_backup_checked")
            .field("id", id.as_str())
            .field("path", path.as_str())
            .field("exists", exists),
    );
    require_eq(&format!("presence of backup {id} under {path} in S3"), &expected, &exists)
}

#[then("backup should exist in S3 storage")]
async fn backup_in_s3(world: &mut ConsulWorld) -> Result<(), StepError> {
    check_storage(world, false, true).await
}

#[then("granular backup should exist in S3 storage")]
async fn granular_backup_in_s3(world: &mut ConsulWorld) -> Result<(), StepError> {
    check_storage(world, true, true).await
}

#[then("backup should be removed from S3 storage")]
async fn backup_removed_from_s3(world: &mut ConsulWorld) -> Result<(), StepError> {
    check_storage(world, false, false).await
}

#[then("granular backup should be removed from S3 storage")]
async fn granular_backup_removed_from_s3(world: &mut ConsulWorld) -> Result<(), StepError> {
    check_storage(world, true, false).await
}
