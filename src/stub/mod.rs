//! In-process stand-in for the external actuator.
//!
//! Answers `POST /actuate` with `{"success": bool}`. ICCIDs in the failing
//! set get `false`, every other ICCID gets `true`. Used by the
//! `actuator-stub` binary for local development and by integration tests.
//!
//! Configuration via environment variables:
//! - `ACTUATOR_PORT`: HTTP port (default: 8444)
//! - `ACTUATOR_FAIL_ICCIDS`: Comma-separated ICCIDs to reject

use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tracing::info;

/// Environment variable listing ICCIDs the stub rejects.
pub const FAIL_ICCIDS_ENV_VAR: &str = "ACTUATOR_FAIL_ICCIDS";
/// Environment variable for the stub's port.
pub const PORT_ENV_VAR: &str = "ACTUATOR_PORT";
/// Default stub port.
pub const DEFAULT_PORT: u16 = 8444;
/// Path the stub serves activations on.
pub const ACTUATE_PATH: &str = "/actuate";

/// Request from the activation service.
#[derive(Debug, Serialize, Deserialize)]
pub struct ActuateRequest {
    pub iccid: String,
}

/// Response to the activation service.
#[derive(Debug, Serialize, Deserialize)]
pub struct ActuateResponse {
    pub success: bool,
}

/// Shared stub state: which ICCIDs fail, and what was asked.
#[derive(Debug, Default)]
pub struct ActuatorStub {
    failing: RwLock<HashSet<String>>,
    received: RwLock<Vec<String>>,
}

impl ActuatorStub {
    pub fn new(failing: impl IntoIterator<Item = String>) -> Self {
        Self {
            failing: RwLock::new(failing.into_iter().collect()),
            received: RwLock::new(Vec::new()),
        }
    }

    /// Create from `ACTUATOR_FAIL_ICCIDS`.
    pub fn from_env() -> Self {
        let failing = std::env::var(FAIL_ICCIDS_ENV_VAR)
            .map(|raw| parse_iccid_list(&raw))
            .unwrap_or_default();
        for iccid in &failing {
            info!(iccid = %iccid, "configured failing ICCID");
        }
        Self::new(failing)
    }

    pub async fn fail_iccid(&self, iccid: &str) {
        self.failing.write().await.insert(iccid.to_string());
    }

    /// Number of activation requests received for an ICCID.
    pub async fn requests_for(&self, iccid: &str) -> usize {
        self.received
            .read()
            .await
            .iter()
            .filter(|r| r.as_str() == iccid)
            .count()
    }
}

fn parse_iccid_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Build the stub router.
pub fn router(stub: Arc<ActuatorStub>) -> Router {
    Router::new()
        .route(ACTUATE_PATH, post(actuate))
        .route("/health", get(health))
        .with_state(stub)
}

/// Bind the stub to `addr` and serve it in the background.
///
/// Returns the bound address, which carries the OS-assigned port when
/// `addr` uses port 0.
pub async fn spawn(stub: Arc<ActuatorStub>, addr: SocketAddr) -> std::io::Result<SocketAddr> {
    let listener = TcpListener::bind(addr).await?;
    let bound = listener.local_addr()?;
    let app = router(stub);
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!(error = %e, "actuator stub stopped");
        }
    });
    info!(addr = %bound, "actuator stub listening");
    Ok(bound)
}

async fn actuate(
    State(stub): State<Arc<ActuatorStub>>,
    Json(req): Json<ActuateRequest>,
) -> (StatusCode, Json<ActuateResponse>) {
    stub.received.write().await.push(req.iccid.clone());
    let success = !stub.failing.read().await.contains(&req.iccid);

    info!(iccid = %req.iccid, success, "actuation processed");

    (StatusCode::OK, Json(ActuateResponse { success }))
}

async fn health() -> StatusCode {
    StatusCode::OK
}
