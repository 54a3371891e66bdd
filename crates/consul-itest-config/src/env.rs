// crates/consul-itest-config/src/env.rs
// ============================================================================
// Module: Suite Environment
// Description: Environment variable names and strict value readers.
// Purpose: Centralize env parsing with strict UTF-8 validation.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Environment values are parsed with strict UTF-8 enforcement to avoid silent
//! misconfiguration. Invalid UTF-8 fails closed. Reads go through
//! [`EnvLookup`] so configuration can be assembled from the process
//! environment or from an in-memory map.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::time::Duration;

use crate::error::ConfigError;

// ============================================================================
// SECTION: Environment Constants
// ============================================================================

/// Environment keys read by the integration suite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuiteEnv {
    /// Kubernetes namespace hosting the Consul servers.
    ConsulNamespace,
    /// Consul server host (also the StatefulSet name).
    ConsulHost,
    /// Consul HTTP port.
    ConsulPort,
    /// Consul scheme (`http` or `https`).
    ConsulScheme,
    /// Optional Consul ACL token.
    ConsulToken,
    /// Optional override for the Consul CA certificate path.
    ConsulTlsCaPath,
    /// Backup daemon host.
    BackupHost,
    /// Backup daemon port.
    BackupPort,
    /// Optional backup daemon basic-auth user.
    BackupUsername,
    /// Optional backup daemon basic-auth password.
    BackupPassword,
    /// Backup daemon scheme (`http` or `https`).
    BackupProtocol,
    /// Optional override for the backup daemon CA certificate path.
    BackupTlsCaPath,
    /// Datacenter restored and backed up by granular operations.
    DatacenterName,
    /// Prometheus base URL.
    PrometheusUrl,
    /// Optional Prometheus basic-auth user.
    PrometheusUser,
    /// Optional Prometheus basic-auth password.
    PrometheusPassword,
    /// S3 endpoint URL.
    S3Url,
    /// S3 bucket holding backups.
    S3Bucket,
    /// S3 access key id.
    S3KeyId,
    /// S3 secret access key.
    S3KeySecret,
    /// Optional S3 region.
    S3Region,
    /// Comma-separated `kind name container image` records.
    MonitoredImages,
    /// Optional minimum poll timeout in seconds.
    TimeoutSeconds,
    /// Optional JSON-lines event log path.
    EventLog,
}

impl SuiteEnv {
    /// Returns the canonical environment variable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ConsulNamespace => "CONSUL_NAMESPACE",
            Self::ConsulHost => "CONSUL_HOST",
            Self::ConsulPort => "CONSUL_PORT",
            Self::ConsulScheme => "CONSUL_SCHEME",
            Self::ConsulToken => "CONSUL_TOKEN",
            Self::ConsulTlsCaPath => "CONSUL_TLS_CA_PATH",
            Self::BackupHost => "CONSUL_BACKUP_DAEMON_HOST",
            Self::BackupPort => "CONSUL_BACKUP_DAEMON_PORT",
            Self::BackupUsername => "CONSUL_BACKUP_DAEMON_USERNAME",
            Self::BackupPassword => "CONSUL_BACKUP_DAEMON_PASSWORD",
            Self::BackupProtocol => "CONSUL_BACKUP_DAEMON_PROTOCOL",
            Self::BackupTlsCaPath => "CONSUL_BACKUP_DAEMON_TLS_CA_PATH",
            Self::DatacenterName => "DATACENTER_NAME",
            Self::PrometheusUrl => "PROMETHEUS_URL",
            Self::PrometheusUser => "PROMETHEUS_USER",
            Self::PrometheusPassword => "PROMETHEUS_PASSWORD",
            Self::S3Url => "S3_URL",
            Self::S3Bucket => "S3_BUCKET",
            Self::S3KeyId => "S3_KEY_ID",
            Self::S3KeySecret => "S3_KEY_SECRET",
            Self::S3Region => "S3_REGION",
            Self::MonitoredImages => "MONITORED_IMAGES",
            Self::TimeoutSeconds => "CONSUL_ITEST_TIMEOUT_SEC",
            Self::EventLog => "CONSUL_ITEST_EVENT_LOG",
        }
    }
}

// ============================================================================
// SECTION: Lookup
// ============================================================================

/// Source of raw environment values.
pub trait EnvLookup {
    /// Returns the raw value for `name`, or `None` when unset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidUtf8`] when the value cannot be decoded.
    fn lookup(&self, name: &str) -> Result<Option<String>, ConfigError>;
}

/// Reads values from the current process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvLookup for ProcessEnv {
    fn lookup(&self, name: &str) -> Result<Option<String>, ConfigError> {
        read_env_strict(name)
    }
}

impl EnvLookup for HashMap<String, String> {
    fn lookup(&self, name: &str) -> Result<Option<String>, ConfigError> {
        Ok(self.get(name).cloned())
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads an environment variable and enforces UTF-8 validity.
///
/// # Errors
///
/// Returns an error when the environment variable contains invalid UTF-8.
pub fn read_env_strict(name: &str) -> Result<Option<String>, ConfigError> {
    std::env::var_os(name).map_or(Ok(None), |raw| {
        raw.into_string().map(Some).map_err(|_| ConfigError::InvalidUtf8 {
            name: name.to_string(),
        })
    })
}

/// Reads a required variable; unset and blank values both fail.
pub(crate) fn required(env: &dyn EnvLookup, key: SuiteEnv) -> Result<String, ConfigError> {
    let name = key.as_str();
    match env.lookup(name)? {
        Some(value) if value.trim().is_empty() => Err(ConfigError::Empty {
            name: name.to_string(),
        }),
        Some(value) => Ok(value.trim().to_string()),
        None => Err(ConfigError::Missing {
            name: name.to_string(),
        }),
    }
}

/// Reads an optional variable; blank values are treated as unset.
pub(crate) fn optional(env: &dyn EnvLookup, key: SuiteEnv) -> Result<Option<String>, ConfigError> {
    Ok(env.lookup(key.as_str())?.filter(|value| !value.trim().is_empty()))
}

/// Returns true when any of `keys` carries a non-blank value.
pub(crate) fn any_set(env: &dyn EnvLookup, keys: &[SuiteEnv]) -> Result<bool, ConfigError> {
    for key in keys {
        if optional(env, *key)?.is_some() {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Parses a TCP port.
pub(crate) fn parse_port(key: SuiteEnv, raw: &str) -> Result<u16, ConfigError> {
    match raw.trim().parse::<u16>() {
        Ok(0) | Err(_) => Err(ConfigError::Invalid {
            name: key.as_str().to_string(),
            reason: format!("expected a port number in 1..=65535, got {raw:?}"),
        }),
        Ok(port) => Ok(port),
    }
}

/// Parses a positive timeout value from an environment variable string.
pub(crate) fn parse_timeout_seconds(key: SuiteEnv, raw: &str) -> Result<Duration, ConfigError> {
    let invalid = |reason: &str| ConfigError::Invalid {
        name: key.as_str().to_string(),
        reason: reason.to_string(),
    };
    let secs: u64 =
        raw.trim().parse().map_err(|_| invalid("must be a positive integer number of seconds"))?;
    if secs == 0 {
        return Err(invalid("must be greater than zero"));
    }
    Ok(Duration::from_secs(secs))
}
