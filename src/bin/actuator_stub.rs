//! actuator-stub: stand-in for the SIM actuator
//!
//! Answers `POST /actuate` with `{"success": true}` unless the ICCID is
//! listed in ACTUATOR_FAIL_ICCIDS (comma separated).
//!
//! ## Configuration
//! - ACTUATOR_PORT: listen port (default: 8444)
//! - ACTUATOR_FAIL_ICCIDS: ICCIDs that report failure
//! - SIMCARD_LOG: tracing filter (default: info)

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::info;

use simcard_activator::stub::{self, ActuatorStub, DEFAULT_PORT, PORT_ENV_VAR};
use simcard_activator::utils::bootstrap::init_tracing;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let port: u16 = std::env::var(PORT_ENV_VAR)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_PORT);

    let stub = Arc::new(ActuatorStub::from_env());
    let addr = stub::spawn(stub, SocketAddr::from(([0, 0, 0, 0], port))).await?;
    info!(addr = %addr, "actuator-stub ready");

    tokio::signal::ctrl_c().await?;
    info!("actuator-stub shutting down");
    Ok(())
}
