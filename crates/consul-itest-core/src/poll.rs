// crates/consul-itest-core/src/poll.rs
// ============================================================================
// Module: Bounded Polling
// Description: Fixed-interval retry loop with a wall-clock deadline.
// Purpose: Await eventual consistency in external systems without open-ended sleeps.
// Dependencies: tokio, thiserror
// ============================================================================

//! ## Overview
//! [`poll`] drives a check that reports a tagged [`Attempt`]: `Ready` ends the
//! loop with the value, `NotReady` records an observation and sleeps one
//! interval, `Fatal` aborts immediately. [`poll_until`] adapts a fallible
//! status check plus a target predicate to that shape, using the policy's
//! [`ErrorPolicy`] to decide whether check errors mean "not ready yet".
//!
//! A policy is bounded either by wall-clock time or by a check count. Count
//! bounded policies ignore the clock, so slow checks still get every attempt.
//!
//! There is no backoff or jitter: these loops govern test wait time against a
//! live deployment.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio::time::Instant;
use tokio::time::sleep;

// ============================================================================
// SECTION: Policy
// ============================================================================

/// How check errors are treated while polling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Errors count as "not ready yet" and the loop continues.
    Retry,
    /// The first error aborts the loop.
    Propagate,
}

/// Timing and error handling for one wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Total wall-clock budget; nominal when `max_attempts` is set.
    pub timeout: Duration,
    /// Fixed delay between attempts.
    pub interval: Duration,
    /// Treatment of check errors.
    pub errors: ErrorPolicy,
    /// Check count bound, replacing the deadline.
    pub max_attempts: Option<u32>,
}

impl PollPolicy {
    /// Builds a policy from a total timeout and interval; errors are retried.
    #[must_use]
    pub const fn new(timeout: Duration, interval: Duration) -> Self {
        Self {
            timeout,
            interval,
            errors: ErrorPolicy::Retry,
            max_attempts: None,
        }
    }

    /// Builds a policy performing exactly `count` checks spaced by `interval`,
    /// however long each check takes.
    #[must_use]
    pub const fn attempts(count: u32, interval: Duration) -> Self {
        let mut policy = Self::new(interval.saturating_mul(count), interval);
        policy.max_attempts = Some(count);
        policy
    }

    /// Makes the first check error abort the wait.
    #[must_use]
    pub const fn propagate_errors(mut self) -> Self {
        self.errors = ErrorPolicy::Propagate;
        self
    }

    /// Raises the timeout to `floor` when the floor is longer.
    ///
    /// The floor never shortens a policy and leaves attempt counts alone.
    #[must_use]
    pub fn with_timeout_floor(mut self, floor: Option<Duration>) -> Self {
        if let Some(floor) = floor {
            self.timeout = self.timeout.max(floor);
        }
        self
    }
}

// ============================================================================
// SECTION: Attempt
// ============================================================================

/// Result of one check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attempt<T> {
    /// Target reached; polling stops with this value.
    Ready(T),
    /// Not there yet; the observation is reported on timeout.
    NotReady(String),
    /// Unrecoverable failure; polling stops with this reason.
    Fatal(String),
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Polling failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PollError {
    /// The deadline elapsed before the target was reached.
    #[error(
        "{label} did not reach its target within {:.1}s ({attempts} attempts, {:.1}s elapsed); last observed: {}",
        .timeout.as_secs_f64(),
        .elapsed.as_secs_f64(),
        .last_observed.as_deref().unwrap_or("nothing")
    )]
    Timeout {
        /// What was being awaited.
        label: String,
        /// Time spent polling.
        elapsed: Duration,
        /// Configured budget.
        timeout: Duration,
        /// Checks performed.
        attempts: u32,
        /// Last observation, if any check ran.
        last_observed: Option<String>,
    },
    /// A check failed and the policy does not tolerate it.
    #[error("{label} failed: {reason}")]
    Fatal {
        /// What was being awaited.
        label: String,
        /// Failure description.
        reason: String,
    },
}

// ============================================================================
// SECTION: Deadline Tracking
// ============================================================================

/// Attempt and deadline bookkeeping shared by the polling loops.
struct Tracker<'a> {
    /// What is being awaited.
    label: &'a str,
    /// Active policy.
    policy: PollPolicy,
    /// Loop start.
    start: Instant,
    /// Checks performed so far.
    attempts: u32,
    /// Last recorded observation.
    last_observed: Option<String>,
}

impl<'a> Tracker<'a> {
    /// Starts the clock.
    fn new(label: &'a str, policy: PollPolicy) -> Self {
        Self {
            label,
            policy,
            start: Instant::now(),
            attempts: 0,
            last_observed: None,
        }
    }

    /// Counts one more attempt, or fails once the budget is spent.
    fn next_attempt(&mut self) -> Result<(), PollError> {
        let elapsed = self.start.elapsed();
        let spent = match self.policy.max_attempts {
            Some(max) => self.attempts >= max,
            None => elapsed >= self.policy.timeout,
        };
        if spent {
            return Err(PollError::Timeout {
                label: self.label.to_string(),
                elapsed,
                timeout: self.policy.timeout,
                attempts: self.attempts,
                last_observed: self.last_observed.take(),
            });
        }
        self.attempts = self.attempts.saturating_add(1);
        Ok(())
    }

    /// Records the latest observation.
    fn observe(&mut self, observation: String) {
        self.last_observed = Some(observation);
    }

    /// Builds a fatal error for this wait.
    fn fatal(&self, reason: String) -> PollError {
        PollError::Fatal {
            label: self.label.to_string(),
            reason,
        }
    }
}

// ============================================================================
// SECTION: Loops
// ============================================================================

/// Runs `attempt` until it reports [`Attempt::Ready`] or the policy expires.
///
/// # Errors
///
/// Returns [`PollError::Timeout`] when the deadline passes and
/// [`PollError::Fatal`] when an attempt reports [`Attempt::Fatal`].
pub async fn poll<T, F, Fut>(label: &str, policy: PollPolicy, mut attempt: F) -> Result<T, PollError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Attempt<T>>,
{
    let mut tracker = Tracker::new(label, policy);
    loop {
        tracker.next_attempt()?;
        match attempt().await {
            Attempt::Ready(value) => return Ok(value),
            Attempt::NotReady(observation) => tracker.observe(observation),
            Attempt::Fatal(reason) => return Err(tracker.fatal(reason)),
        }
        sleep(policy.interval).await;
    }
}

/// Polls `check` until its value satisfies `target`.
///
/// Check errors are retried or propagated according to `policy.errors`.
///
/// # Errors
///
/// See [`poll`].
pub async fn poll_until<T, E, F, Fut, P>(
    label: &str,
    policy: PollPolicy,
    mut check: F,
    mut target: P,
) -> Result<T, PollError>
where
    T: Display,
    E: Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: FnMut(&T) -> bool,
{
    let mut tracker = Tracker::new(label, policy);
    loop {
        tracker.next_attempt()?;
        match check().await {
            Ok(value) if target(&value) => return Ok(value),
            Ok(value) => tracker.observe(value.to_string()),
            Err(err) => match policy.errors {
                ErrorPolicy::Retry => tracker.observe(format!("error: {err}")),
                ErrorPolicy::Propagate => return Err(tracker.fatal(err.to_string())),
            },
        }
        sleep(policy.interval).await;
    }
}
