//! Mock provisioning gateway for testing.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::interfaces::{GatewayOutcome, GatewayResponse, ProvisioningGateway};

/// Body the mock reports for a scripted success.
pub const MOCK_SUCCESS_BODY: &str = r#"{"success":true}"#;
/// Body the mock reports for a scripted failure.
pub const MOCK_FAILURE_BODY: &str = r#"{"success":false}"#;

/// Mock gateway with per-ICCID scripted outcomes and call recording.
///
/// Unscripted ICCIDs get the default outcome, which starts out as success.
pub struct MockGateway {
    outcomes: RwLock<HashMap<String, GatewayOutcome>>,
    default_outcome: RwLock<GatewayOutcome>,
    calls: RwLock<Vec<String>>,
    delay: RwLock<Option<Duration>>,
}

impl Default for MockGateway {
    fn default() -> Self {
        Self {
            outcomes: RwLock::new(HashMap::new()),
            default_outcome: RwLock::new(Self::success()),
            calls: RwLock::new(Vec::new()),
            delay: RwLock::new(None),
        }
    }
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// A well-formed success reply.
    pub fn success() -> GatewayOutcome {
        GatewayOutcome::Responded(GatewayResponse::new(true, MOCK_SUCCESS_BODY))
    }

    /// A well-formed reply with the success flag cleared.
    pub fn failure() -> GatewayOutcome {
        GatewayOutcome::Responded(GatewayResponse::new(false, MOCK_FAILURE_BODY))
    }

    /// A transport fault.
    pub fn unreachable() -> GatewayOutcome {
        GatewayOutcome::Fault("Connection refused".to_string())
    }

    pub async fn set_outcome(&self, identifier: &str, outcome: GatewayOutcome) {
        self.outcomes
            .write()
            .await
            .insert(identifier.to_string(), outcome);
    }

    pub async fn set_default_outcome(&self, outcome: GatewayOutcome) {
        *self.default_outcome.write().await = outcome;
    }

    /// Hold every call open for `delay` before answering.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = Some(delay);
    }

    pub async fn call_count(&self) -> usize {
        self.calls.read().await.len()
    }

    pub async fn calls_for(&self, identifier: &str) -> usize {
        self.calls
            .read()
            .await
            .iter()
            .filter(|c| c.as_str() == identifier)
            .count()
    }
}

#[async_trait]
impl ProvisioningGateway for MockGateway {
    async fn activate(&self, identifier: &str) -> GatewayOutcome {
        self.calls.write().await.push(identifier.to_string());

        let delay = *self.delay.read().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(outcome) = self.outcomes.read().await.get(identifier) {
            return outcome.clone();
        }
        self.default_outcome.read().await.clone()
    }

    fn name(&self) -> &str {
        "mock"
    }
}
