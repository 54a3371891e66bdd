// system-tests/tests/steps/ha.rs
// ============================================================================
// Module: High Availability Steps
// Description: Leader failover, request size limits, and post-failover CRUD.
// ============================================================================

use std::path::Path;

use consul_itest_core::StepError;
use consul_itest_core::SuiteEvent;
use consul_itest_core::cluster::is_leader_reelected;
use consul_itest_core::cluster::strip_port;
use consul_itest_core::flows::LEADER_REELECTION_POLICY;
use consul_itest_core::flows::STABILIZATION_DELAY;
use consul_itest_core::flows::crud_full_cycle;
use consul_itest_core::flows::crud_round_trip;
use consul_itest_core::flows::read_string;
use consul_itest_core::flows::wait_for_leader_reelection;
use consul_itest_core::interfaces::ClusterStatus;
use consul_itest_core::interfaces::KeyValueStore;
use consul_itest_core::interfaces::Platform;
use consul_itest_core::require;
use consul_itest_core::require_eq;
use consul_system_tests::keys;
use consul_system_tests::load_large_value;
use cucumber::given;
use cucumber::then;
use cucumber::when;

use crate::world::ConsulWorld;

const LARGE_VALUE_FILE: &str =
    concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data/extremely_big_value.txt");

// ============================================================================
// SECTION: Request Size Limits
// ============================================================================

#[given("I have extremely large value from file")]
async fn large_value_from_file(world: &mut ConsulWorld) -> Result<(), StepError> {
    let value = load_large_value(Path::new(LARGE_VALUE_FILE))?;
    world.emit(SuiteEvent::new("large_value_loaded").field("bytes", value.len()));
    world.ctx.insert(keys::LARGE_VALUE, value);
    Ok(())
}

#[when("I try to put large value using HTTP request")]
async fn put_large_value(world: &mut ConsulWorld) -> Result<(), StepError> {
    let suite = world.suite()?;
    let key = world.data()?.folder_key();
    let value = world.ctx.get(keys::LARGE_VALUE)?;
    let status = suite.consul().put_raw(&key, value).await?;
    world.emit(SuiteEvent::new("raw_put").field("key", key.as_str()).field("status", status));
    world.ctx.insert(keys::RESPONSE_STATUS, status);
    world.ctx.insert(keys::FOLDER_KEY, key);
    Ok(())
}

#[when("I put normal value using HTTP request")]
async fn put_normal_value(world: &mut ConsulWorld) -> Result<(), StepError> {
    let suite = world.suite()?;
    let key = world.ctx.get(keys::FOLDER_KEY)?;
    let status = suite.consul().put_raw(key, &world.data()?.test_value).await?;
    world.emit(SuiteEvent::new("raw_put").field("key", key.as_str()).field("status", status));
    world.ctx.insert(keys::RESPONSE_STATUS, status);
    Ok(())
}

#[then("I can read the stored value")]
async fn read_stored_value(world: &mut ConsulWorld) -> Result<(), StepError> {
    let suite = world.suite()?;
    let key = world.ctx.get(keys::FOLDER_KEY)?;
    let value = read_string(suite.consul(), key).await?;
    require_eq(&format!("value under {key}"), world.data()?.test_value.as_str(), value.as_str())
}

#[then("I cleanup the test data")]
async fn cleanup_test_data(world: &mut ConsulWorld) -> Result<(), StepError> {
    let suite = world.suite()?;
    let key = world.ctx.get(keys::FOLDER_KEY)?;
    suite.consul().delete(key, false).await?;
    world.emit(SuiteEvent::new("kv_deleted").field("key", key.as_str()));
    Ok(())
}

// ============================================================================
// SECTION: Failover
// ============================================================================

#[when("I perform CRUD operations successfully")]
async fn perform_crud(world: &mut ConsulWorld) -> Result<(), StepError> {
    let suite = world.suite()?;
    crud_full_cycle(suite.consul(), world.data()?).await?;
    world.emit(SuiteEvent::new("crud_completed"));
    Ok(())
}

/// Deletes the recorded leader's pod, or the current leader's when none was recorded.
#[when("I delete leader pod")]
async fn delete_leader_pod(world: &mut ConsulWorld) -> Result<(), StepError> {
    let suite = world.suite()?;
    let ip = if let Ok(ip) = world.ctx.get(keys::LEADER_IP) {
        ip.clone()
    } else {
        let leader = suite.consul().leader().await?;
        strip_port(&leader).to_string()
    };
    suite.platform().await?.delete_pod_by_ip(&ip, suite.namespace()).await?;
    world.emit(SuiteEvent::new("leader_pod_deleted").field("ip", ip));
    Ok(())
}

#[when("I wait for leader reelection")]
async fn wait_for_reelection(world: &mut ConsulWorld) -> Result<(), StepError> {
    let suite = world.suite()?;
    let old = world.ctx.get(keys::OLD_LEADER)?;
    let policy = suite.policy(LEADER_REELECTION_POLICY);
    let leader = wait_for_leader_reelection(suite.consul(), old, policy).await?;
    world.emit(SuiteEvent::new("leader_elected").field("leader", leader.as_str()));
    world.ctx.insert(keys::NEW_LEADER, leader);
    Ok(())
}

#[then("new leader should be elected")]
async fn new_leader_elected(world: &mut ConsulWorld) -> Result<(), StepError> {
    let suite = world.suite()?;
    let peers = suite.consul().peers().await?;
    let new = world.ctx.get(keys::NEW_LEADER)?;
    let old = world.ctx.get(keys::OLD_LEADER)?;
    require(
        is_leader_reelected(new, old, &peers),
        format!("leader {new} is not a new member of peers {peers:?} (previous {old})"),
    )
}

#[then("CRUD operations should work after failover")]
async fn crud_after_failover(world: &mut ConsulWorld) -> Result<(), StepError> {
    let suite = world.suite()?;
    tokio::time::sleep(STABILIZATION_DELAY).await;
    let data = world.data()?;
    crud_round_trip(suite.consul(), &data.test_key, &data.test_value).await?;
    world.emit(SuiteEvent::new("crud_after_failover"));
    Ok(())
}
