// crates/consul-itest-config/src/lib.rs
// ============================================================================
// Module: Consul Integration Suite Configuration
// Description: Typed configuration records loaded from environment variables.
// Purpose: Give every suite component one validated view of its collaborators.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! The suite is configured entirely through environment variables. The Consul
//! section is mandatory and validated before any scenario runs. The backup
//! daemon, Prometheus and S3 sections are all-or-nothing: setting any of their
//! enabling variables validates the whole section up front, while leaving them
//! unset defers the failure to the first step that needs the collaborator.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod env;
mod error;
mod suite;


// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use env::EnvLookup;
pub use env::ProcessEnv;
pub use env::SuiteEnv;
pub use env::read_env_strict;
pub use error::ConfigError;
pub use error::ConfigSection;
pub use suite::BackupDaemonConfig;
pub use suite::ConsulConfig;
pub use suite::DEFAULT_BACKUP_CA_PATH;
pub use suite::DEFAULT_CONSUL_CA_PATH;
pub use suite::DEFAULT_S3_REGION;
pub use suite::PrometheusConfig;
pub use suite::RunConfig;
pub use suite::S3Config;
pub use suite::Scheme;
pub use suite::SuiteConfig;
