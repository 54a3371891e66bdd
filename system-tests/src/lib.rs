// system-tests/src/lib.rs
// ============================================================================
// Module: Consul System Tests Library
// Description: Session state shared by every scenario of the suite.
// Purpose: Provide session-scoped clients and context keys to step functions.
// Dependencies: consul-itest-clients, consul-itest-config, consul-itest-core
// ============================================================================

//! ## Overview
//! The cucumber driver in `system-tests/tests/bdd.rs` installs one [`Suite`]
//! per run. Each scenario's world borrows it for clients, poll policies and
//! the event sink, and keeps its own per-scenario context addressed through
//! the typed handles in [`keys`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod data;
pub mod keys;
pub mod preconditions;
pub mod suite;


// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use data::LARGE_VALUE_FALLBACK_LEN;
pub use data::load_large_value;
pub use preconditions::replica_shortfall;
pub use suite::SetupError;
pub use suite::Suite;
pub use suite::install;
pub use suite::installed;
