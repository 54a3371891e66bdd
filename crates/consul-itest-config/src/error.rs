// crates/consul-itest-config/src/error.rs
// ============================================================================
// Module: Configuration Errors
// Description: Error type for configuration loading.
// Purpose: Name the offending variable or section in every failure.
// Dependencies: thiserror
// ============================================================================

use std::fmt;

use thiserror::Error;

/// Optional configuration sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSection {
    /// Backup daemon connection.
    BackupDaemon,
    /// Prometheus connection.
    Prometheus,
    /// S3 storage connection.
    S3,
    /// `MONITORED_IMAGES` list.
    MonitoredImages,
}

impl ConfigSection {
    /// Returns the variable that enables the section.
    #[must_use]
    pub const fn enabling_variable(self) -> &'static str {
        match self {
            Self::BackupDaemon => "CONSUL_BACKUP_DAEMON_HOST",
            Self::Prometheus => "PROMETHEUS_URL",
            Self::S3 => "S3_URL",
            Self::MonitoredImages => "MONITORED_IMAGES",
        }
    }
}

impl fmt::Display for ConfigSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::BackupDaemon => "backup daemon",
            Self::Prometheus => "prometheus",
            Self::S3 => "s3 storage",
            Self::MonitoredImages => "monitored images",
        };
        f.write_str(label)
    }
}

/// Configuration loading errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is unset.
    #[error("environment variable {name} is required")]
    Missing {
        /// Variable name.
        name: String,
    },
    /// A required variable is set but blank.
    #[error("environment variable {name} must not be empty")]
    Empty {
        /// Variable name.
        name: String,
    },
    /// A variable is not valid UTF-8.
    #[error("environment variable {name} must be valid UTF-8")]
    InvalidUtf8 {
        /// Variable name.
        name: String,
    },
    /// A variable failed validation.
    #[error("environment variable {name} is invalid: {reason}")]
    Invalid {
        /// Variable name.
        name: String,
        /// Validation failure description.
        reason: String,
    },
    /// A step needs a section that was never configured.
    #[error("{section} is not configured (set {})", .section.enabling_variable())]
    SectionMissing {
        /// The missing section.
        section: ConfigSection,
    },
}
