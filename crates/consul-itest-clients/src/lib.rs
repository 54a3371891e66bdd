// crates/consul-itest-clients/src/lib.rs
// ============================================================================
// Module: Consul Integration Suite Clients
// Description: Adapters for every external system the suite probes.
// Purpose: Implement the core collaborator traits over real transports.
// Dependencies: reqwest, kube, k8s-openapi, aws-sdk-s3, consul-itest-core
// ============================================================================

//! ## Overview
//! - [`ConsulClient`]: Consul key-value and status endpoints.
//! - [`BackupDaemonClient`]: backup daemon HTTP API.
//! - [`KubePlatform`]: StatefulSet scaling, pod deletion, image lookups.
//! - [`S3BackupStorage`]: backup artifact presence in S3.
//! - [`PrometheusAlerts`]: alert state lookups.
//!
//! HTTP adapters share a 10 second request timeout and trust a configured CA
//! bundle only when the file exists.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod backup;
pub mod consul;
mod http;
pub mod platform;
pub mod prometheus;
pub mod s3;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use backup::BackupDaemonClient;
pub use consul::ConsulClient;
pub use platform::KubePlatform;
pub use prometheus::PrometheusAlerts;
pub use s3::S3BackupStorage;
