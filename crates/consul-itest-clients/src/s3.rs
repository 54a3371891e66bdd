// crates/consul-itest-clients/src/s3.rs
// ============================================================================
// Module: S3 Backup Storage Client
// Description: Backup artifact lookups in an S3-compatible bucket.
// Purpose: Implement the backup storage contract with aws-sdk-s3.
// Dependencies: aws-config, aws-sdk-s3
// ============================================================================

//! ## Overview
//! The daemon mirrors its storage directory into the bucket, so a backup
//! stored under `/opt/consul/backup-storage/<id>` appears as objects prefixed
//! `opt/consul/backup-storage/<id>`. Existence means at least one object
//! under that prefix. Requests use path-style addressing against `S3_URL`.

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_config::Region;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::Credentials;
use consul_itest_config::S3Config;
use consul_itest_core::ClientError;
use consul_itest_core::interfaces::BackupId;
use consul_itest_core::interfaces::BackupStorage;
use consul_itest_core::interfaces::Service;

/// Credential provider name reported to the SDK.
const PROVIDER_NAME: &str = "consul-itest";

/// S3-backed backup storage.
#[derive(Debug, Clone)]
pub struct S3BackupStorage {
    /// SDK client.
    client: Client,
    /// Bucket holding backups.
    bucket: String,
}

impl S3BackupStorage {
    /// Builds a client from the S3 section.
    pub async fn connect(config: &S3Config) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .endpoint_url(config.url.clone());
        if let (Some(key_id), Some(secret)) = (&config.key_id, &config.key_secret) {
            loader = loader.credentials_provider(Credentials::new(
                key_id.clone(),
                secret.clone(),
                None,
                None,
                PROVIDER_NAME,
            ));
        }
        let shared = loader.load().await;
        let s3_config = aws_sdk_s3::config::Builder::from(&shared).force_path_style(true).build();
        Self {
            client: Client::from_conf(s3_config),
            bucket: config.bucket.clone(),
        }
    }
}

/// Returns the object prefix of backup `id` stored under directory `path`.
#[must_use]
pub fn object_prefix(path: &str, id: &BackupId) -> String {
    let directory = path.trim_matches('/');
    if directory.is_empty() { id.to_string() } else { format!("{directory}/{id}") }
}

#[async_trait]
impl BackupStorage for S3BackupStorage {
    async fn backup_exists(&self, path: &str, id: &BackupId) -> Result<bool, ClientError> {
        let output = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .prefix(object_prefix(path, id))
            .max_keys(1)
            .send()
            .await
            .map_err(|err| ClientError::Transport {
                service: Service::S3,
                message: format!("list {}: {err}", self.bucket),
            })?;
        Ok(output.key_count().unwrap_or(0) > 0 || !output.contents().is_empty())
    }
}
