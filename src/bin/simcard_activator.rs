//! simcard-activator: SIM card activation service
//!
//! Serves the activation REST API and calls the external actuator once per
//! ICCID, recording every outcome.
//!
//! ## Architecture
//! ```text
//! [Client] -> [REST API :8080] -> [ActivationService] -> [Actuator :8444]
//!                                        |
//!                                        v
//!                              [SQLite/Postgres/memory]
//! ```
//!
//! ## Configuration
//! - SIMCARD_CONFIG: path to a YAML config file
//! - SIMCARD__SERVER__PORT: REST API port (default: 8080)
//! - SIMCARD__STORAGE__TYPE: "sqlite", "postgres" or "memory" (default: sqlite)
//! - SIMCARD__GATEWAY__URL: actuator endpoint (default: http://localhost:8444/actuate)
//! - SIMCARD_LOG: tracing filter (default: info)

use std::sync::Arc;

use tracing::info;

use simcard_activator::api;
use simcard_activator::clients::HttpProvisioningGateway;
use simcard_activator::config::Config;
use simcard_activator::services::ActivationService;
use simcard_activator::storage::init_storage;
use simcard_activator::utils::bootstrap::init_tracing;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let config = Config::load(None)?;
    let addr = config.server.bind_addr()?;

    info!(
        addr = %addr,
        storage = ?config.storage.storage_type,
        actuator = %config.gateway.url,
        "starting simcard-activator"
    );

    let store = init_storage(&config.storage).await?;
    let gateway = Arc::new(HttpProvisioningGateway::new(config.gateway.clone())?);
    let service = Arc::new(ActivationService::new(gateway, store));

    api::serve(service, addr).await?;
    Ok(())
}
