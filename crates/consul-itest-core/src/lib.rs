// crates/consul-itest-core/src/lib.rs
// ============================================================================
// Module: Consul Integration Suite Core
// Description: Scenario context, bounded polling, and collaborator contracts.
// Purpose: Hold the suite logic that does not depend on a live cluster.
// Dependencies: consul-itest-config, serde, thiserror, tokio
// ============================================================================

//! ## Overview
//! The core crate owns everything the step library needs apart from the wire:
//! - [`ScenarioContext`]: typed per-scenario key/value store.
//! - [`poll`] / [`poll_until`]: the bounded polling helper.
//! - [`interfaces`]: traits implemented by the client adapters.
//! - [`flows`]: wait-and-verify sequences shared by several steps.
//! - [`images`]: monitored image parsing and tag aggregation.
//! - [`events`]: JSON-lines event sinks.
//!
//! Invariants:
//! - A key read from the context must have been written earlier in the scenario.
//! - Polling never outlives its policy timeout by more than one interval.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod cluster;
pub mod context;
pub mod error;
pub mod events;
pub mod flows;
pub mod images;
pub mod interfaces;
pub mod poll;
pub mod testdata;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use context::ContextError;
pub use context::ContextKey;
pub use context::ScenarioContext;
pub use error::StepError;
pub use error::require;
pub use error::require_eq;
pub use events::EventSink;
pub use events::SuiteEvent;
pub use interfaces::ClientError;
pub use poll::Attempt;
pub use poll::ErrorPolicy;
pub use poll::PollError;
pub use poll::PollPolicy;
pub use poll::poll;
pub use poll::poll_until;
pub use testdata::TestData;
