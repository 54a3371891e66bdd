// system-tests/tests/steps/images.rs
// ============================================================================
// Module: Image Version Steps
// Description: Deployed container image tags against the monitored list.
// ============================================================================

use consul_itest_core::StepError;
use consul_itest_core::SuiteEvent;
use consul_itest_core::flows::check_monitored_images;
use consul_system_tests::keys;
use cucumber::then;
use cucumber::when;

use crate::world::ConsulWorld;

#[when("I check each monitored resource image")]
async fn check_each_image(world: &mut ConsulWorld) -> Result<(), StepError> {
    let suite = world.suite()?;
    let platform = suite.platform().await?;
    let raw = world.ctx.get(keys::MONITORED_IMAGES)?;
    let report = check_monitored_images(platform, suite.namespace(), raw, suite.events()).await;
    world.ctx.insert(keys::IMAGE_REPORT, report);
    Ok(())
}

#[then("all image tags should match expected versions")]
async fn image_tags_match(world: &mut ConsulWorld) -> Result<(), StepError> {
    let checked = world.ctx.get(keys::IMAGE_REPORT)?.verify()?;
    world.emit(SuiteEvent::new("images_verified").field("checked", checked));
    Ok(())
}
