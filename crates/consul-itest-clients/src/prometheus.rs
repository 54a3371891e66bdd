// crates/consul-itest-clients/src/prometheus.rs
// ============================================================================
// Module: Prometheus Alerts Client
// Description: Alert state lookups through the Prometheus HTTP API.
// Purpose: Implement the alert source contract over reqwest.
// Dependencies: reqwest, serde
// ============================================================================

//! Alert state lookups through the Prometheus HTTP API.

use std::collections::HashMap;

use async_trait::async_trait;
use consul_itest_config::PrometheusConfig;
use consul_itest_core::ClientError;
use consul_itest_core::interfaces::AlertSource;
use consul_itest_core::interfaces::AlertState;
use consul_itest_core::interfaces::Service;
use reqwest::Client;
use reqwest::header::HeaderMap;
use serde::Deserialize;

use crate::http::build_client;
use crate::http::ok_json;
use crate::http::transport;

const SERVICE: Service = Service::Prometheus;

/// `GET /api/v1/alerts` envelope.
#[derive(Debug, Deserialize)]
struct AlertsResponse {
    /// Response payload.
    data: AlertsData,
}

/// Active alert list.
#[derive(Debug, Deserialize)]
struct AlertsData {
    /// Active alerts.
    #[serde(default)]
    alerts: Vec<ActiveAlert>,
}

/// One active alert.
#[derive(Debug, Deserialize)]
struct ActiveAlert {
    /// Alert labels.
    #[serde(default)]
    labels: HashMap<String, String>,
    /// `pending` or `firing`.
    state: String,
}

/// Prometheus alert client.
#[derive(Clone)]
pub struct PrometheusAlerts {
    /// Shared HTTP client.
    http: Client,
    /// Prometheus base URL.
    base_url: String,
    /// Basic-auth user and optional password.
    credentials: Option<(String, Option<String>)>,
}

impl PrometheusAlerts {
    /// Builds a client from the Prometheus section.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Setup`] when the HTTP client cannot be built.
    pub fn new(config: &PrometheusConfig) -> Result<Self, ClientError> {
        Ok(Self {
            http: build_client(SERVICE, None, HeaderMap::new())?,
            base_url: config.url.trim_end_matches('/').to_string(),
            credentials: config.user.clone().map(|user| (user, config.password.clone())),
        })
    }
}

impl std::fmt::Debug for PrometheusAlerts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrometheusAlerts")
            .field("base_url", &self.base_url)
            .field("authenticated", &self.credentials.is_some())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl AlertSource for PrometheusAlerts {
    async fn alert_state(&self, name: &str, namespace: &str) -> Result<AlertState, ClientError> {
        let mut request = self.http.get(format!("{}/api/v1/alerts", self.base_url));
        if let Some((user, password)) = &self.credentials {
            request = request.basic_auth(user, password.as_ref());
        }
        let response = request.send().await.map_err(transport(SERVICE))?;
        let alerts: AlertsResponse = ok_json(SERVICE, "alerts", response).await?;
        let matching = alerts.data.alerts.into_iter().find(|alert| {
            alert.labels.get("alertname").is_some_and(|value| value == name)
                && alert.labels.get("namespace").is_some_and(|value| value == namespace)
        });
        match matching {
            Some(alert) => alert.state.parse().map_err(|err| ClientError::Decode {
                service: SERVICE,
                message: format!("alert {name}: {err}"),
            }),
            None => Ok(AlertState::Inactive),
        }
    }
}
