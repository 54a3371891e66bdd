// system-tests/tests/steps/alerts.rs
// ============================================================================
// Module: Alert Steps
// Description: Outage simulation and Prometheus alert state transitions.
// ============================================================================

use consul_itest_core::StepError;
use consul_itest_core::SuiteEvent;
use consul_itest_core::cluster::peer_ips;
use consul_itest_core::flows::ALERT_POLICY;
use consul_itest_core::flows::LEADER_AVAILABILITY_POLICY;
use consul_itest_core::flows::restore_replicas;
use consul_itest_core::flows::wait_for_alert_state;
use consul_itest_core::flows::wait_for_leader_available;
use consul_itest_core::interfaces::AlertState;
use consul_itest_core::interfaces::ClusterStatus;
use consul_itest_core::interfaces::Platform;
use consul_system_tests::keys;
use cucumber::then;
use cucumber::when;

use crate::world::ConsulWorld;


async fn await_alert(
    world: &mut ConsulWorld,
    name: &str,
    expected: AlertState,
) -> Result<(), StepError> {
    let suite = world.suite()?;
    let alerts = suite.alerts().await?;
    let policy = suite.policy(ALERT_POLICY);
    wait_for_alert_state(alerts, name, suite.namespace(), expected, policy).await?;
    world.emit(SuiteEvent::new("alert_state").field("alert", name).field("state", expected.as_str()));
    Ok(())
}

// ============================================================================
// SECTION: Outages
// ============================================================================

#[when("I scale statefulset to 0 replicas")]
async fn scale_to_zero(world: &mut ConsulWorld) -> Result<(), StepError> {
    let suite = world.suite()?;
    let platform = suite.platform().await?;
    platform.scale_stateful_set(suite.stateful_set(), suite.namespace(), 0).await?;
    world.emit(SuiteEvent::new("statefulset_scaled").field("replicas", 0));
    Ok(())
}

#[when("I scale statefulset back to original replicas")]
async fn scale_back(world: &mut ConsulWorld) -> Result<(), StepError> {
    let suite = world.suite()?;
    let platform = suite.platform().await?;
    let recorded = world.ctx.get_opt(keys::ORIGINAL_REPLICAS)?.copied();
    let replicas =
        restore_replicas(platform, suite.stateful_set(), suite.namespace(), recorded).await?;
    world.emit(SuiteEvent::new("statefulset_scaled").field("replicas", replicas));
    Ok(())
}

#[when("I delete all server pods")]
async fn delete_all_server_pods(world: &mut ConsulWorld) -> Result<(), StepError> {
    let suite = world.suite()?;
    let peers = suite.consul().peers().await?;
    let platform = suite.platform().await?;
    for ip in peer_ips(&peers) {
        platform.delete_pod_by_ip(&ip, suite.namespace()).await?;
        world.emit(SuiteEvent::new("server_pod_deleted").field("ip", ip));
    }
    Ok(())
}

// ============================================================================
// SECTION: Alert States
// ============================================================================

#[then(regex = r#"^alert "([^"]+)" should become pending$"#)]
async fn alert_pending(world: &mut ConsulWorld, name: String) -> Result<(), StepError> {
    await_alert(world, &name, AlertState::Pending).await
}

#[then(regex = r#"^alert "([^"]+)" should become inactive$"#)]
async fn alert_inactive(world: &mut ConsulWorld, name: String) -> Result<(), StepError> {
    await_alert(world, &name, AlertState::Inactive).await
}

#[then(regex = r#"^alert "([^"]+)" should eventually become inactive$"#)]
async fn alert_eventually_inactive(world: &mut ConsulWorld, name: String) -> Result<(), StepError> {
    let suite = world.suite()?;
    wait_for_leader_available(suite.consul(), suite.policy(LEADER_AVAILABILITY_POLICY)).await?;
    world.emit(SuiteEvent::new("leader_available"));
    await_alert(world, &name, AlertState::Inactive).await
}
