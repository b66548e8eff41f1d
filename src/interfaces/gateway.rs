//! Provisioning gateway interface.

use async_trait::async_trait;

/// A well-formed reply from the provisioning gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayResponse {
    /// Success flag reported by the gateway.
    pub success: bool,
    /// Response payload exactly as received.
    pub raw: String,
}

impl GatewayResponse {
    pub fn new(success: bool, raw: impl Into<String>) -> Self {
        Self {
            success,
            raw: raw.into(),
        }
    }
}

/// Result of a single gateway invocation.
///
/// Transport problems are data, not errors: unreachable hosts, timeouts,
/// non-success statuses and malformed bodies all arrive as `Fault`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayOutcome {
    Responded(GatewayResponse),
    Fault(String),
}

/// Interface for the external system that performs the provisioning side effect.
///
/// Implementations:
/// - `HttpProvisioningGateway`: JSON over HTTP to the actuator
/// - `MockGateway`: scripted outcomes for tests
#[async_trait]
pub trait ProvisioningGateway: Send + Sync {
    /// Ask the gateway to activate one ICCID.
    ///
    /// Exactly one attempt is made; implementations must not retry.
    async fn activate(&self, identifier: &str) -> GatewayOutcome;

    /// Name used in logs.
    fn name(&self) -> &str;
}
