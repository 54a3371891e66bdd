// crates/consul-itest-core/src/error.rs
// ============================================================================
// Module: Step Errors
// Description: Failure type returned by every scenario step.
// Purpose: Report assertion, timeout, client and context failures uniformly.
// Dependencies: thiserror, consul-itest-config
// ============================================================================

//! ## Overview
//! Steps return `Result<(), StepError>`. A failure aborts the current scenario
//! only; nothing is rolled back.

use std::fmt::Display;

use consul_itest_config::ConfigError;
use thiserror::Error;

use crate::context::ContextError;
use crate::images::ImageError;
use crate::interfaces::ClientError;
use crate::poll::PollError;

/// Step failure.
#[derive(Debug, Error)]
pub enum StepError {
    /// An observed value differs from the expected one.
    #[error("{what}: expected {expected}, got {actual}")]
    Assertion {
        /// What was checked.
        what: String,
        /// Expected value.
        expected: String,
        /// Observed value.
        actual: String,
    },
    /// A boolean check failed.
    #[error("{0}")]
    Check(String),
    /// The environment does not meet a scenario precondition.
    #[error("precondition not met: {0}")]
    Precondition(String),
    /// A bounded wait failed.
    #[error(transparent)]
    Poll(#[from] PollError),
    /// A collaborator call failed.
    #[error(transparent)]
    Client(#[from] ClientError),
    /// The scenario context was misused.
    #[error(transparent)]
    Context(#[from] ContextError),
    /// A configuration section is missing or invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Monitored image verification failed.
    #[error(transparent)]
    Image(#[from] ImageError),
    /// Local file access failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Fails with [`StepError::Check`] unless `condition` holds.
///
/// # Errors
///
/// Returns [`StepError::Check`] carrying `message`.
pub fn require(condition: bool, message: impl Into<String>) -> Result<(), StepError> {
    if condition { Ok(()) } else { Err(StepError::Check(message.into())) }
}

/// Fails with [`StepError::Assertion`] unless `actual == expected`.
///
/// # Errors
///
/// Returns [`StepError::Assertion`] naming both values.
pub fn require_eq<T>(what: &str, expected: &T, actual: &T) -> Result<(), StepError>
where
    T: PartialEq + Display + ?Sized,
{
    if actual == expected {
        return Ok(());
    }
    Err(StepError::Assertion {
        what: what.to_string(),
        expected: expected.to_string(),
        actual: actual.to_string(),
    })
}
