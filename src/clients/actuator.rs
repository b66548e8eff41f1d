//! HTTP client for the SIM actuator.
//!
//! POSTs `{"iccid": ...}` to the configured endpoint and expects
//! `{"success": bool}` back. Every transport or protocol problem is folded
//! into `GatewayOutcome::Fault`; nothing is retried.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::interfaces::{GatewayOutcome, GatewayResponse, ProvisioningGateway};

/// Longest body excerpt carried into a fault description.
const MAX_BODY_EXCERPT: usize = 200;

/// Actuator client configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Actuator endpoint URL.
    pub url: String,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8444/actuate".to_string(),
            timeout_ms: 10_000,
        }
    }
}

impl GatewayConfig {
    /// Set the endpoint URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Errors raised while talking to the actuator.
///
/// These never leave the client; `activate` renders them into a fault
/// description.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Actuator timed out: {0}")]
    Timeout(String),

    #[error("Actuator unreachable: {0}")]
    Unreachable(String),

    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    #[error("Actuator returned HTTP {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("Malformed actuator response: {source} (body: {body})")]
    Decode {
        source: serde_json::Error,
        body: String,
    },
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GatewayError::Timeout(err.to_string())
        } else if err.is_connect() {
            GatewayError::Unreachable(err.to_string())
        } else {
            GatewayError::Http(err)
        }
    }
}

#[derive(Debug, Serialize)]
struct ActuatorRequest<'a> {
    iccid: &'a str,
}

#[derive(Debug, Deserialize)]
struct ActuatorResponse {
    success: bool,
}

/// Actuator gateway speaking JSON over HTTP.
pub struct HttpProvisioningGateway {
    client: Client,
    config: GatewayConfig,
}

impl HttpProvisioningGateway {
    /// Create a new gateway client with the given configuration.
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        if config.url.is_empty() {
            return Err(GatewayError::Config(
                "actuator URL not configured".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(GatewayError::Http)?;

        Ok(Self { client, config })
    }

    async fn call(&self, identifier: &str) -> Result<GatewayResponse, GatewayError> {
        let response = self
            .client
            .post(&self.config.url)
            .json(&ActuatorRequest { iccid: identifier })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(GatewayError::Status {
                status,
                body: excerpt(&body),
            });
        }

        let parsed: ActuatorResponse =
            serde_json::from_str(&body).map_err(|source| GatewayError::Decode {
                source,
                body: excerpt(&body),
            })?;

        Ok(GatewayResponse::new(parsed.success, body))
    }
}

fn excerpt(body: &str) -> String {
    body.chars().take(MAX_BODY_EXCERPT).collect()
}

#[async_trait]
impl ProvisioningGateway for HttpProvisioningGateway {
    async fn activate(&self, identifier: &str) -> GatewayOutcome {
        debug!(url = %self.config.url, iccid = %identifier, "calling actuator");

        match self.call(identifier).await {
            Ok(response) => GatewayOutcome::Responded(response),
            Err(e) => {
                warn!(
                    url = %self.config.url,
                    iccid = %identifier,
                    error = %e,
                    "actuator call failed"
                );
                GatewayOutcome::Fault(e.to_string())
            }
        }
    }

    fn name(&self) -> &str {
        "http"
    }
}
