// system-tests/src/suite.rs
// ============================================================================
// Module: Suite Session
// Description: Session-scoped configuration, clients, and event sink.
// Purpose: Build each collaborator client once and share it across scenarios.
// Dependencies: consul-itest-clients, consul-itest-config, tokio
// ============================================================================

//! ## Overview
//! The Consul client is built eagerly because every feature needs it. The
//! backup daemon, Kubernetes, S3 and Prometheus clients are built on first
//! use, so a run that never touches a collaborator never needs its section.
//! A missing section surfaces as a step failure in the scenario that asked.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io;
use std::sync::Arc;
use std::sync::OnceLock;

use consul_itest_clients::BackupDaemonClient;
use consul_itest_clients::ConsulClient;
use consul_itest_clients::KubePlatform;
use consul_itest_clients::PrometheusAlerts;
use consul_itest_clients::S3BackupStorage;
use consul_itest_config::ConfigError;
use consul_itest_config::SuiteConfig;
use consul_itest_core::ClientError;
use consul_itest_core::EventSink;
use consul_itest_core::PollPolicy;
use consul_itest_core::StepError;
use consul_itest_core::events::sink_for;
use consul_itest_core::interfaces::Platform;
use thiserror::Error;
use tokio::sync::OnceCell;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Failures that stop the run before any scenario starts.
#[derive(Debug, Error)]
pub enum SetupError {
    /// Environment configuration is invalid.
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),
    /// The Consul client could not be built.
    #[error("consul client: {0}")]
    Client(#[from] ClientError),
    /// The event log could not be opened.
    #[error("event log: {0}")]
    EventLog(#[from] io::Error),
}

// ============================================================================
// SECTION: Suite
// ============================================================================

/// Session state shared by every scenario.
pub struct Suite {
    /// Validated configuration.
    config: SuiteConfig,
    /// Progress event sink.
    events: Arc<dyn EventSink>,
    /// Consul client.
    consul: ConsulClient,
    /// Authenticated backup daemon client.
    backup: OnceCell<BackupDaemonClient>,
    /// Kubernetes client.
    platform: OnceCell<KubePlatform>,
    /// S3 storage client.
    storage: OnceCell<S3BackupStorage>,
    /// Prometheus client.
    alerts: OnceCell<PrometheusAlerts>,
}

impl Suite {
    /// Builds a suite from validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError::Client`] when the Consul client cannot be built.
    pub fn new(config: SuiteConfig, events: Arc<dyn EventSink>) -> Result<Self, SetupError> {
        let consul = ConsulClient::new(&config.consul)?;
        Ok(Self {
            config,
            events,
            consul,
            backup: OnceCell::new(),
            platform: OnceCell::new(),
            storage: OnceCell::new(),
            alerts: OnceCell::new(),
        })
    }

    /// Loads configuration from the process environment and builds a suite.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError`] when configuration, the event log, or the
    /// Consul client fails.
    pub fn from_env() -> Result<Self, SetupError> {
        let config = SuiteConfig::load()?;
        let events = sink_for(config.run.event_log.as_deref())?;
        Self::new(config, events)
    }

    /// Returns the validated configuration.
    #[must_use]
    pub const fn config(&self) -> &SuiteConfig {
        &self.config
    }

    /// Returns the Kubernetes namespace of the Consul deployment.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.config.consul.namespace
    }

    /// Returns the Consul server StatefulSet name.
    #[must_use]
    pub fn stateful_set(&self) -> &str {
        &self.config.consul.host
    }

    /// Returns the event sink.
    #[must_use]
    pub fn events(&self) -> &dyn EventSink {
        self.events.as_ref()
    }

    /// Applies the suite-wide minimum timeout to `base`.
    #[must_use]
    pub fn policy(&self, base: PollPolicy) -> PollPolicy {
        base.with_timeout_floor(self.config.run.timeout_floor)
    }

    /// Returns the Consul client.
    #[must_use]
    pub const fn consul(&self) -> &ConsulClient {
        &self.consul
    }

    /// Returns the backup daemon datacenter name.
    ///
    /// # Errors
    ///
    /// Returns [`StepError::Config`] when the backup section is missing.
    pub fn datacenter(&self) -> Result<&str, StepError> {
        Ok(self.config.backup()?.datacenter.as_str())
    }

    /// Returns the authenticated backup daemon client.
    ///
    /// # Errors
    ///
    /// Returns [`StepError`] when the section is missing or the client fails.
    pub async fn backup_daemon(&self) -> Result<&BackupDaemonClient, StepError> {
        self.backup
            .get_or_try_init(|| async {
                let config = self.config.backup()?;
                Ok::<_, StepError>(BackupDaemonClient::new(config)?)
            })
            .await
    }

    /// Builds a backup daemon client that sends no credentials.
    ///
    /// # Errors
    ///
    /// Returns [`StepError`] when the section is missing or the client fails.
    pub fn unauthenticated_backup_daemon(&self) -> Result<BackupDaemonClient, StepError> {
        Ok(BackupDaemonClient::unauthenticated(self.config.backup()?)?)
    }

    /// Returns the Kubernetes client.
    ///
    /// # Errors
    ///
    /// Returns [`StepError::Client`] when no cluster configuration is found.
    pub async fn platform(&self) -> Result<&KubePlatform, StepError> {
        self.platform
            .get_or_try_init(|| async { Ok::<_, StepError>(KubePlatform::connect().await?) })
            .await
    }

    /// Reads the current server replica count.
    ///
    /// # Errors
    ///
    /// Returns [`StepError::Client`] when Kubernetes cannot be reached.
    pub async fn server_replicas(&self) -> Result<i32, StepError> {
        let platform = self.platform().await?;
        Ok(platform.stateful_set_replicas(self.stateful_set(), self.namespace()).await?)
    }

    /// Returns the S3 storage client.
    ///
    /// # Errors
    ///
    /// Returns [`StepError::Config`] when the S3 section is missing.
    pub async fn backup_storage(&self) -> Result<&S3BackupStorage, StepError> {
        self.storage
            .get_or_try_init(|| async {
                let config = self.config.s3()?;
                Ok::<_, StepError>(S3BackupStorage::connect(config).await)
            })
            .await
    }

    /// Returns the Prometheus client.
    ///
    /// # Errors
    ///
    /// Returns [`StepError`] when the section is missing or the client fails.
    pub async fn alerts(&self) -> Result<&PrometheusAlerts, StepError> {
        self.alerts
            .get_or_try_init(|| async {
                let config = self.config.prometheus()?;
                Ok::<_, StepError>(PrometheusAlerts::new(config)?)
            })
            .await
    }
}

impl std::fmt::Debug for Suite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Suite")
            .field("consul", &self.consul)
            .field("backup_ready", &self.backup.initialized())
            .field("platform_ready", &self.platform.initialized())
            .field("storage_ready", &self.storage.initialized())
            .field("alerts_ready", &self.alerts.initialized())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// SECTION: Installation
// ============================================================================

/// Suite shared by every scenario of the run.
static INSTALLED: OnceLock<Arc<Suite>> = OnceLock::new();

/// Installs the run's suite; later calls keep the first one.
pub fn install(suite: Suite) -> Arc<Suite> {
    Arc::clone(INSTALLED.get_or_init(|| Arc::new(suite)))
}

/// Returns the installed suite, if any.
#[must_use]
pub fn installed() -> Option<Arc<Suite>> {
    INSTALLED.get().cloned()
}
