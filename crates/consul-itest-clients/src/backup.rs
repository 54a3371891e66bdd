// crates/consul-itest-clients/src/backup.rs
// ============================================================================
// Module: Backup Daemon Client
// Description: HTTP client for the Consul backup daemon.
// Purpose: Implement the backup daemon contract over reqwest.
// Dependencies: reqwest, serde_json
// ============================================================================

//! ## Overview
//! Every request carries JSON content-type and accept headers. Basic auth is
//! applied only when both credential halves are configured; the
//! [`BackupDaemonClient::unauthenticated`] variant never sends it, which is
//! how scenarios verify auth enforcement.

// ============================================================================
// SECTION: Imports
// ============================================================================

use async_trait::async_trait;
use consul_itest_config::BackupDaemonConfig;
use consul_itest_config::Scheme;
use consul_itest_core::ClientError;
use consul_itest_core::interfaces::BackupDaemon;
use consul_itest_core::interfaces::BackupId;
use consul_itest_core::interfaces::BackupScope;
use consul_itest_core::interfaces::BackupStatus;
use consul_itest_core::interfaces::JobStatus;
use consul_itest_core::interfaces::RestoreRequest;
use consul_itest_core::interfaces::Service;
use consul_itest_core::interfaces::TaskId;
use reqwest::Client;
use reqwest::Method;
use reqwest::RequestBuilder;
use reqwest::header::ACCEPT;
use reqwest::header::CONTENT_TYPE;
use reqwest::header::HeaderMap;
use reqwest::header::HeaderValue;

use crate::http::build_client;
use crate::http::expect_ok;
use crate::http::ok_json;
use crate::http::ok_text;
use crate::http::transport;

const SERVICE: Service = Service::BackupDaemon;

// ============================================================================
// SECTION: Client
// ============================================================================

/// Backup daemon HTTP client.
#[derive(Clone)]
pub struct BackupDaemonClient {
    /// Shared HTTP client.
    http: Client,
    /// Daemon base URL.
    base_url: String,
    /// Basic-auth user and password.
    credentials: Option<(String, String)>,
}

impl BackupDaemonClient {
    /// Builds an authenticated client from the backup daemon section.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Setup`] when the CA bundle is unreadable.
    pub fn new(config: &BackupDaemonConfig) -> Result<Self, ClientError> {
        let mut client = Self::unauthenticated(config)?;
        client.credentials = config
            .credentials()
            .map(|(user, password)| (user.to_string(), password.to_string()));
        Ok(client)
    }

    /// Builds a client for the same daemon that never sends credentials.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Setup`] when the CA bundle is unreadable.
    pub fn unauthenticated(config: &BackupDaemonConfig) -> Result<Self, ClientError> {
        let ca_path = (config.protocol == Scheme::Https).then_some(config.tls_ca_path.as_path());
        Ok(Self {
            http: build_client(SERVICE, ca_path, json_headers())?,
            base_url: config.base_url(),
            credentials: None,
        })
    }

    /// Builds a client for an explicit base URL without TLS customization.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Setup`] when the HTTP client cannot be built.
    pub fn with_base_url(
        base_url: &str,
        credentials: Option<(String, String)>,
    ) -> Result<Self, ClientError> {
        Ok(Self {
            http: build_client(SERVICE, None, json_headers())?,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    /// Starts a request with basic auth applied when configured.
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let request = self.http.request(method, format!("{}{path}", self.base_url));
        match &self.credentials {
            Some((user, password)) => request.basic_auth(user, Some(password)),
            None => request,
        }
    }

    /// Sends a request, mapping transport failures.
    async fn send(request: RequestBuilder) -> Result<reqwest::Response, ClientError> {
        request.send().await.map_err(transport(SERVICE))
    }
}

impl std::fmt::Debug for BackupDaemonClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackupDaemonClient")
            .field("base_url", &self.base_url)
            .field("authenticated", &self.credentials.is_some())
            .finish_non_exhaustive()
    }
}

/// JSON content-type and accept headers.
fn json_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers
}

#[async_trait]
impl BackupDaemon for BackupDaemonClient {
    async fn health(&self) -> Result<u16, ClientError> {
        let response = Self::send(self.request(Method::GET, "/health")).await?;
        Ok(response.status().as_u16())
    }

    async fn request_backup(&self, scope: &BackupScope) -> Result<BackupId, ClientError> {
        let mut request = self.request(Method::POST, "/backup");
        if let Some(body) = scope.request_body() {
            request = request.json(&body);
        }
        let response = Self::send(request).await?;
        let body = ok_text(SERVICE, "backup", response).await?;
        Ok(BackupId::from_response_body(&body))
    }

    async fn backup_status(&self, id: &BackupId) -> Result<BackupStatus, ClientError> {
        let response = Self::send(self.request(Method::GET, &format!("/listbackups/{id}"))).await?;
        ok_json(SERVICE, "listbackups", response).await
    }

    async fn request_restore(&self, request: &RestoreRequest) -> Result<TaskId, ClientError> {
        let response = Self::send(self.request(Method::POST, "/restore").json(request)).await?;
        let body = ok_text(SERVICE, "restore", response).await?;
        Ok(TaskId::from_response_body(&body))
    }

    async fn job_status(&self, task: &TaskId) -> Result<JobStatus, ClientError> {
        let response = Self::send(self.request(Method::GET, &format!("/jobstatus/{task}"))).await?;
        ok_json(SERVICE, "jobstatus", response).await
    }

    async fn evict(&self, id: &BackupId) -> Result<(), ClientError> {
        let response = Self::send(self.request(Method::POST, &format!("/evict/{id}"))).await?;
        expect_ok(SERVICE, "evict", response).await?;
        Ok(())
    }

    async fn list_backups(&self) -> Result<String, ClientError> {
        let response = Self::send(self.request(Method::GET, "/listbackups")).await?;
        ok_text(SERVICE, "listbackups", response).await
    }

    async fn try_backup(&self) -> Result<u16, ClientError> {
        let response = Self::send(self.request(Method::POST, "/backup")).await?;
        Ok(response.status().as_u16())
    }
}
