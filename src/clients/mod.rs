//! External service clients.

pub mod actuator;
pub mod mock;

pub use actuator::{GatewayConfig, GatewayError, HttpProvisioningGateway};
pub use mock::MockGateway;
