// system-tests/src/preconditions.rs
// ============================================================================
// Module: Scenario Preconditions
// Description: Pre-run checks that decide whether a scenario can run at all.
// Purpose: Skip scenarios the deployed cluster is too small for.
// Dependencies: none
// ============================================================================

//! ## Overview
//! Scenarios declare their minimum server count with the step
//! `cluster has at least <n> replicas`. The driver reads the live replica
//! count once and leaves out scenarios that ask for more, so an undersized
//! cluster reports them as skipped instead of failed.

/// Leading text of the minimum replica step.
const MIN_REPLICAS_PREFIX: &str = "cluster has at least ";
/// Trailing text of the minimum replica step.
const MIN_REPLICAS_SUFFIX: &str = " replicas";

/// Returns the largest replica count demanded by `steps`, if any.
///
/// Steps whose count does not parse (outline placeholders) are ignored.
#[must_use]
pub fn required_replicas<'a>(steps: impl IntoIterator<Item = &'a str>) -> Option<i32> {
    steps
        .into_iter()
        .filter_map(|step| {
            step.trim()
                .strip_prefix(MIN_REPLICAS_PREFIX)?
                .strip_suffix(MIN_REPLICAS_SUFFIX)?
                .trim()
                .parse::<i32>()
                .ok()
        })
        .max()
}

/// Returns why `steps` cannot run on a cluster of `available` servers.
#[must_use]
pub fn replica_shortfall<'a>(steps: impl IntoIterator<Item = &'a str>, available: i32) -> Option<String> {
    let required = required_replicas(steps)?;
    (available < required)
        .then(|| format!("cluster has {available} replicas, minimum {required} required"))
}
