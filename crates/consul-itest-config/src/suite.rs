// crates/consul-itest-config/src/suite.rs
// ============================================================================
// Module: Suite Configuration Records
// Description: Typed connection records for every suite collaborator.
// Purpose: Validate environment inputs once and expose typed accessors.
// Dependencies: std
// ============================================================================

//! ## Overview
//! [`SuiteConfig::load`] assembles the records below from the process
//! environment. Optional sections are `None` when none of their enabling
//! variables are set; the accessor methods turn that into
//! [`ConfigError::SectionMissing`] at the point of use.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::env::EnvLookup;
use crate::env::ProcessEnv;
use crate::env::SuiteEnv;
use crate::env::any_set;
use crate::env::optional;
use crate::env::parse_port;
use crate::env::parse_timeout_seconds;
use crate::env::required;
use crate::error::ConfigError;
use crate::error::ConfigSection;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// CA bundle mounted for Consul TLS.
pub const DEFAULT_CONSUL_CA_PATH: &str = "/consul/tls/ca/tls.crt";
/// CA bundle mounted for backup daemon TLS.
pub const DEFAULT_BACKUP_CA_PATH: &str = "/consul/tls/backup/ca.crt";
/// Region used when `S3_REGION` is unset.
pub const DEFAULT_S3_REGION: &str = "us-east-1";

// ============================================================================
// SECTION: Scheme
// ============================================================================

/// HTTP scheme of a collaborator endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scheme {
    /// Plain HTTP.
    #[default]
    Http,
    /// HTTP over TLS.
    Https,
}

impl Scheme {
    /// Returns the URL scheme label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "https",
        }
    }

    /// Parses a scheme value from the named variable.
    fn parse(key: SuiteEnv, raw: &str) -> Result<Self, ConfigError> {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("http") {
            return Ok(Self::Http);
        }
        if trimmed.eq_ignore_ascii_case("https") {
            return Ok(Self::Https);
        }
        Err(ConfigError::Invalid {
            name: key.as_str().to_string(),
            reason: format!("expected http or https, got {trimmed:?}"),
        })
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reads an optional scheme variable, defaulting to HTTP.
fn scheme_or_default(env: &dyn EnvLookup, key: SuiteEnv) -> Result<Scheme, ConfigError> {
    optional(env, key)?.map_or(Ok(Scheme::Http), |raw| Scheme::parse(key, &raw))
}

// ============================================================================
// SECTION: Consul
// ============================================================================

/// Consul connection settings.
#[derive(Clone, PartialEq, Eq)]
pub struct ConsulConfig {
    /// Kubernetes namespace of the Consul deployment.
    pub namespace: String,
    /// Server host; doubles as the StatefulSet name.
    pub host: String,
    /// HTTP API port.
    pub port: u16,
    /// Endpoint scheme.
    pub scheme: Scheme,
    /// ACL token sent as a bearer token.
    pub token: Option<String>,
    /// CA bundle trusted when it exists on disk.
    pub tls_ca_path: PathBuf,
}

impl ConsulConfig {
    /// Loads the Consul section; every field except the token is required.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a required variable is missing or invalid.
    pub fn from_env(env: &dyn EnvLookup) -> Result<Self, ConfigError> {
        let namespace = required(env, SuiteEnv::ConsulNamespace)?;
        let host = required(env, SuiteEnv::ConsulHost)?;
        let port = parse_port(SuiteEnv::ConsulPort, &required(env, SuiteEnv::ConsulPort)?)?;
        let scheme = scheme_or_default(env, SuiteEnv::ConsulScheme)?;
        let token = optional(env, SuiteEnv::ConsulToken)?;
        let tls_ca_path = optional(env, SuiteEnv::ConsulTlsCaPath)?
            .map_or_else(|| PathBuf::from(DEFAULT_CONSUL_CA_PATH), PathBuf::from);
        Ok(Self {
            namespace,
            host,
            port,
            scheme,
            token,
            tls_ca_path,
        })
    }

    /// Returns the HTTP API base URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("{}://{}:{}", self.scheme, self.host, self.port)
    }
}

impl fmt::Debug for ConsulConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsulConfig")
            .field("namespace", &self.namespace)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("scheme", &self.scheme)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("tls_ca_path", &self.tls_ca_path)
            .finish()
    }
}

// ============================================================================
// SECTION: Backup Daemon
// ============================================================================

/// Backup daemon connection settings.
#[derive(Clone, PartialEq, Eq)]
pub struct BackupDaemonConfig {
    /// Daemon host.
    pub host: String,
    /// Daemon port.
    pub port: u16,
    /// Basic-auth user.
    pub username: Option<String>,
    /// Basic-auth password.
    pub password: Option<String>,
    /// Endpoint scheme.
    pub protocol: Scheme,
    /// Datacenter used for granular backups and restores.
    pub datacenter: String,
    /// CA bundle trusted for HTTPS when it exists on disk.
    pub tls_ca_path: PathBuf,
}

impl BackupDaemonConfig {
    /// Variables whose presence enables the section.
    const ENABLING: [SuiteEnv; 2] = [SuiteEnv::BackupHost, SuiteEnv::BackupPort];

    /// Loads the section, or `None` when it is not enabled.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the section is enabled but incomplete.
    pub fn from_env(env: &dyn EnvLookup) -> Result<Option<Self>, ConfigError> {
        if !any_set(env, &Self::ENABLING)? {
            return Ok(None);
        }
        let host = required(env, SuiteEnv::BackupHost)?;
        let port = parse_port(SuiteEnv::BackupPort, &required(env, SuiteEnv::BackupPort)?)?;
        let datacenter = required(env, SuiteEnv::DatacenterName)?;
        let tls_ca_path = optional(env, SuiteEnv::BackupTlsCaPath)?
            .map_or_else(|| PathBuf::from(DEFAULT_BACKUP_CA_PATH), PathBuf::from);
        Ok(Some(Self {
            host,
            port,
            username: optional(env, SuiteEnv::BackupUsername)?,
            password: optional(env, SuiteEnv::BackupPassword)?,
            protocol: scheme_or_default(env, SuiteEnv::BackupProtocol)?,
            datacenter,
            tls_ca_path,
        }))
    }

    /// Returns the daemon base URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("{}://{}:{}", self.protocol, self.host, self.port)
    }

    /// Returns basic-auth credentials when both halves are configured.
    #[must_use]
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.username, &self.password) {
            (Some(user), Some(password)) => Some((user.as_str(), password.as_str())),
            _ => None,
        }
    }
}

impl fmt::Debug for BackupDaemonConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackupDaemonConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("protocol", &self.protocol)
            .field("datacenter", &self.datacenter)
            .field("tls_ca_path", &self.tls_ca_path)
            .finish()
    }
}

// ============================================================================
// SECTION: Prometheus
// ============================================================================

/// Prometheus connection settings.
#[derive(Clone, PartialEq, Eq)]
pub struct PrometheusConfig {
    /// Prometheus base URL.
    pub url: String,
    /// Basic-auth user.
    pub user: Option<String>,
    /// Basic-auth password.
    pub password: Option<String>,
}

impl PrometheusConfig {
    /// Loads the section, or `None` when `PROMETHEUS_URL` is unset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a value cannot be read.
    pub fn from_env(env: &dyn EnvLookup) -> Result<Option<Self>, ConfigError> {
        let Some(url) = optional(env, SuiteEnv::PrometheusUrl)? else {
            return Ok(None);
        };
        Ok(Some(Self {
            url: url.trim().trim_end_matches('/').to_string(),
            user: optional(env, SuiteEnv::PrometheusUser)?,
            password: optional(env, SuiteEnv::PrometheusPassword)?,
        }))
    }
}

impl fmt::Debug for PrometheusConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrometheusConfig")
            .field("url", &self.url)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

// ============================================================================
// SECTION: S3
// ============================================================================

/// S3 storage connection settings.
#[derive(Clone, PartialEq, Eq)]
pub struct S3Config {
    /// Endpoint URL of the S3-compatible store.
    pub url: String,
    /// Bucket holding backups.
    pub bucket: String,
    /// Access key id.
    pub key_id: Option<String>,
    /// Secret access key.
    pub key_secret: Option<String>,
    /// Signing region.
    pub region: String,
}

impl S3Config {
    /// Variables whose presence enables the section.
    const ENABLING: [SuiteEnv; 2] = [SuiteEnv::S3Url, SuiteEnv::S3Bucket];

    /// Loads the section, or `None` when it is not enabled.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the section is enabled but incomplete.
    pub fn from_env(env: &dyn EnvLookup) -> Result<Option<Self>, ConfigError> {
        if !any_set(env, &Self::ENABLING)? {
            return Ok(None);
        }
        Ok(Some(Self {
            url: required(env, SuiteEnv::S3Url)?,
            bucket: required(env, SuiteEnv::S3Bucket)?,
            key_id: optional(env, SuiteEnv::S3KeyId)?,
            key_secret: optional(env, SuiteEnv::S3KeySecret)?,
            region: optional(env, SuiteEnv::S3Region)?
                .unwrap_or_else(|| DEFAULT_S3_REGION.to_string()),
        }))
    }
}

impl fmt::Debug for S3Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("S3Config")
            .field("url", &self.url)
            .field("bucket", &self.bucket)
            .field("key_id", &self.key_id)
            .field("key_secret", &self.key_secret.as_ref().map(|_| "<redacted>"))
            .field("region", &self.region)
            .finish()
    }
}

// ============================================================================
// SECTION: Run Settings
// ============================================================================

/// Suite-level tuning knobs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunConfig {
    /// Minimum timeout applied to every poll policy.
    pub timeout_floor: Option<Duration>,
    /// JSON-lines event log; stderr when unset.
    pub event_log: Option<PathBuf>,
}

impl RunConfig {
    /// Loads the run settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the timeout override is not a positive integer.
    pub fn from_env(env: &dyn EnvLookup) -> Result<Self, ConfigError> {
        let timeout_floor = optional(env, SuiteEnv::TimeoutSeconds)?
            .map(|raw| parse_timeout_seconds(SuiteEnv::TimeoutSeconds, &raw))
            .transpose()?;
        let event_log = optional(env, SuiteEnv::EventLog)?.map(PathBuf::from);
        Ok(Self {
            timeout_floor,
            event_log,
        })
    }
}

// ============================================================================
// SECTION: Suite
// ============================================================================

/// Complete suite configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuiteConfig {
    /// Consul connection (always present).
    pub consul: ConsulConfig,
    /// Backup daemon connection.
    pub backup: Option<BackupDaemonConfig>,
    /// Prometheus connection.
    pub prometheus: Option<PrometheusConfig>,
    /// S3 storage connection.
    pub s3: Option<S3Config>,
    /// Raw `MONITORED_IMAGES` value.
    pub monitored_images: Option<String>,
    /// Suite tuning.
    pub run: RunConfig,
}

impl SuiteConfig {
    /// Loads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the Consul section is incomplete or an
    /// enabled optional section fails validation.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_env(&ProcessEnv)
    }

    /// Loads configuration from an arbitrary lookup.
    ///
    /// # Errors
    ///
    /// See [`SuiteConfig::load`].
    pub fn from_env(env: &dyn EnvLookup) -> Result<Self, ConfigError> {
        Ok(Self {
            consul: ConsulConfig::from_env(env)?,
            backup: BackupDaemonConfig::from_env(env)?,
            prometheus: PrometheusConfig::from_env(env)?,
            s3: S3Config::from_env(env)?,
            monitored_images: optional(env, SuiteEnv::MonitoredImages)?,
            run: RunConfig::from_env(env)?,
        })
    }

    /// Returns the backup daemon section.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::SectionMissing`] when it was not configured.
    pub fn backup(&self) -> Result<&BackupDaemonConfig, ConfigError> {
        self.backup.as_ref().ok_or(ConfigError::SectionMissing {
            section: ConfigSection::BackupDaemon,
        })
    }

    /// Returns the Prometheus section.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::SectionMissing`] when it was not configured.
    pub fn prometheus(&self) -> Result<&PrometheusConfig, ConfigError> {
        self.prometheus.as_ref().ok_or(ConfigError::SectionMissing {
            section: ConfigSection::Prometheus,
        })
    }

    /// Returns the S3 section.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::SectionMissing`] when it was not configured.
    pub fn s3(&self) -> Result<&S3Config, ConfigError> {
        self.s3.as_ref().ok_or(ConfigError::SectionMissing {
            section: ConfigSection::S3,
        })
    }

    /// Returns the raw monitored-images list.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::SectionMissing`] when it was not configured.
    pub fn monitored_images(&self) -> Result<&str, ConfigError> {
        self.monitored_images.as_deref().ok_or(ConfigError::SectionMissing {
            section: ConfigSection::MonitoredImages,
        })
    }
}
