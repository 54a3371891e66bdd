// system-tests/tests/steps/common.rs
// ============================================================================
// Module: Common Steps
// Description: Environment checks and shared fixtures used by every feature.
// ============================================================================

use consul_itest_core::StepError;
use consul_itest_core::SuiteEvent;
use consul_itest_core::TestData;
use consul_itest_core::cluster::strip_port;
use consul_itest_core::flows::require_min_replicas;
use consul_itest_core::interfaces::AlertSource;
use consul_itest_core::interfaces::AlertState;
use consul_itest_core::interfaces::BackupDaemon;
use consul_itest_core::interfaces::ClusterStatus;
use consul_itest_core::interfaces::KeyValueStore;
use consul_itest_core::interfaces::Platform;
use consul_itest_core::require;
use consul_itest_core::require_eq;
use consul_system_tests::keys;
use cucumber::given;
use cucumber::then;

use crate::world::ConsulWorld;

// ============================================================================
// SECTION: Collaborators
// ============================================================================

#[given("Consul cluster is available")]
async fn consul_cluster_available(world: &mut ConsulWorld) -> Result<(), StepError> {
    let suite = world.suite()?;
    let leader = suite.consul().leader().await?;
    require(!leader.is_empty(), "Consul cluster has no leader")?;
    world.emit(SuiteEvent::new("consul_available").field("leader", leader));
    Ok(())
}

#[given("Kubernetes cluster is available")]
async fn kubernetes_cluster_available(world: &mut ConsulWorld) -> Result<(), StepError> {
    world.suite()?.platform().await?;
    Ok(())
}

#[given("backup daemon is available")]
async fn backup_daemon_available(world: &mut ConsulWorld) -> Result<(), StepError> {
    let suite = world.suite()?;
    let status = suite.backup_daemon().await?.health().await?;
    world.emit(SuiteEvent::new("backup_daemon_available").field("status", status));
    Ok(())
}

#[given("Prometheus is configured")]
async fn prometheus_configured(world: &mut ConsulWorld) -> Result<(), StepError> {
    world.suite()?.config().prometheus()?;
    Ok(())
}

#[given("S3 storage is configured")]
async fn s3_storage_configured(world: &mut ConsulWorld) -> Result<(), StepError> {
    world.suite()?.config().s3()?;
    Ok(())
}

#[given("monitored images list is configured")]
async fn monitored_images_configured(world: &mut ConsulWorld) -> Result<(), StepError> {
    let suite = world.suite()?;
    let images = suite.config().monitored_images()?.to_string();
    world.ctx.insert(keys::MONITORED_IMAGES, images);
    Ok(())
}

// ============================================================================
// SECTION: Test Data
// ============================================================================

#[given("I have unique test key and value")]
async fn unique_test_data(world: &mut ConsulWorld) -> Result<(), StepError> {
    let data = TestData::generate();
    world.emit(SuiteEvent::new("test_data_generated").field("id", data.id.as_str()));
    world.ctx.insert(keys::TEST_DATA, data);
    Ok(())
}

#[given("test data exists in Consul")]
async fn test_data_exists(world: &mut ConsulWorld) -> Result<(), StepError> {
    let suite = world.suite()?;
    let data = world.data()?;
    suite.consul().put(&data.test_key, &data.test_value).await?;
    Ok(())
}

#[given("test data under path exists in Consul")]
async fn path_data_exists(world: &mut ConsulWorld) -> Result<(), StepError> {
    let suite = world.suite()?;
    let data = world.data()?;
    suite.consul().put(&data.path_test_key, &data.path_value).await?;
    Ok(())
}

// ============================================================================
// SECTION: Cluster State
// ============================================================================

#[given(expr = "cluster has at least {int} replicas")]
async fn cluster_has_replicas(world: &mut ConsulWorld, count: i32) -> Result<(), StepError> {
    let suite = world.suite()?;
    let platform = suite.platform().await?;
    let replicas =
        require_min_replicas(platform, suite.stateful_set(), suite.namespace(), count).await?;
    world.ctx.insert(keys::ORIGINAL_REPLICAS, replicas);
    Ok(())
}

#[given("I get current leader")]
async fn current_leader(world: &mut ConsulWorld) -> Result<(), StepError> {
    let suite = world.suite()?;
    let leader = suite.consul().leader().await?;
    let ip = strip_port(&leader).to_string();
    world.emit(SuiteEvent::new("leader_recorded").field("leader", leader.as_str()));
    world.ctx.insert(keys::LEADER_IP, ip);
    world.ctx.insert(keys::OLD_LEADER, leader);
    Ok(())
}

#[given("all servers are ready")]
async fn all_servers_ready(world: &mut ConsulWorld) -> Result<(), StepError> {
    let suite = world.suite()?;
    let platform = suite.platform().await?;
    let (name, namespace) = (suite.stateful_set(), suite.namespace());
    let replicas = platform.stateful_set_replicas(name, namespace).await?;
    let ready = platform.stateful_set_ready_replicas(name, namespace).await?;
    require_eq("ready server replicas", &replicas, &ready)
}

#[given(regex = r#"^alert "([^"]+)" is inactive$"#)]
async fn alert_is_inactive(world: &mut ConsulWorld, name: String) -> Result<(), StepError> {
    let suite = world.suite()?;
    let state = suite.alerts().await?.alert_state(&name, suite.namespace()).await?;
    require_eq(&format!("state of alert {name}"), &AlertState::Inactive, &state)
}

// ============================================================================
// SECTION: Responses
// ============================================================================

#[then(expr = "response status code should be {int}")]
async fn response_status_code(world: &mut ConsulWorld, code: u16) -> Result<(), StepError> {
    let actual = world.ctx.get(keys::RESPONSE_STATUS)?;
    require_eq("response status", &code, actual)
}
