//! REST API for SIM card activation.
//!
//! Endpoints:
//! - `POST /api/activate`: activate an ICCID (`{"iccid", "customerEmail"}`)
//! - `GET /api/activations`: all records
//! - `GET /api/activations/successful`: records with a successful outcome
//! - `GET /api/activations/failed`: records with a failed outcome
//! - `GET /api/activations/:iccid`: record for an ICCID
//! - `GET /api/activations/:iccid/status`: activation state of an ICCID
//! - `GET /api/activations/id/:id`: record by id
//! - `GET /api/activations/customer/:email`: records for a customer
//! - `GET /api/health`: health check

mod error;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::record::{ActivationRecord, ActivationState, RecordId};
use crate::services::ActivationService;

pub use error::ApiError;

/// Shared state for axum handlers.
type AppState = Arc<ActivationService>;

/// Start the REST server on the given address.
///
/// When the port is 0, the OS assigns an ephemeral port. The actual bound
/// port is always logged so it can be discovered.
pub async fn serve(service: Arc<ActivationService>, addr: SocketAddr) -> std::io::Result<()> {
    let app = router(service);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let bound = listener.local_addr()?;
    info!(addr = %bound, "activation REST API listening");
    axum::serve(listener, app).await
}

/// Build the axum router (separated for testing).
pub fn router(service: Arc<ActivationService>) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/activate", post(activate))
        .route("/api/activations", get(all_records))
        .route("/api/activations/successful", get(successful_records))
        .route("/api/activations/failed", get(failed_records))
        .route("/api/activations/id/:id", get(record_by_id))
        .route("/api/activations/customer/:email", get(records_by_customer))
        .route("/api/activations/:iccid", get(record_by_iccid))
        .route("/api/activations/:iccid/status", get(status))
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

// ============================================================================
// Handlers
// ============================================================================

async fn health() -> StatusCode {
    StatusCode::OK
}

async fn activate(
    State(service): State<AppState>,
    Json(req): Json<ActivationRequest>,
) -> Result<String, ApiError> {
    info!(request = ?req, "received activation request");

    let iccid = required(req.iccid, "ICCID is required")?;
    let email = required(req.customer_email, "Customer email is required")?;

    let success = service.activate(&iccid, &email).await.map_err(|e| {
        error!(iccid = %iccid, error = %e, "error processing activation request");
        ApiError::Internal(format!("Error processing activation request: {}", e))
    })?;

    let result = if success { "SUCCESS" } else { "FAILURE" };
    info!(iccid = %iccid, result, "SIM card activation result");
    Ok(format!("Activation {} for ICCID: {}", result, iccid))
}

fn required(value: Option<String>, message: &str) -> Result<String, ApiError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ApiError::BadRequest(message.to_string())),
    }
}

async fn all_records(State(service): State<AppState>) -> Result<Json<Vec<RecordView>>, ApiError> {
    Ok(Json(views(service.all_records().await?)))
}

async fn successful_records(
    State(service): State<AppState>,
) -> Result<Json<Vec<RecordView>>, ApiError> {
    Ok(Json(views(service.successful_records().await?)))
}

async fn failed_records(
    State(service): State<AppState>,
) -> Result<Json<Vec<RecordView>>, ApiError> {
    Ok(Json(views(service.failed_records().await?)))
}

async fn record_by_iccid(
    State(service): State<AppState>,
    Path(iccid): Path<String>,
) -> Result<Json<RecordView>, ApiError> {
    service
        .record_by_identifier(&iccid)
        .await?
        .map(|r| Json(RecordView::from(r)))
        .ok_or_else(not_found)
}

async fn record_by_id(
    State(service): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<RecordView>, ApiError> {
    service
        .record_by_id(RecordId(id))
        .await?
        .map(|r| Json(RecordView::from(r)))
        .ok_or_else(not_found)
}

async fn records_by_customer(
    State(service): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<Vec<RecordView>>, ApiError> {
    Ok(Json(views(service.records_by_requester(&email).await?)))
}

async fn status(
    State(service): State<AppState>,
    Path(iccid): Path<String>,
) -> Result<Json<StatusView>, ApiError> {
    let status = service.status(&iccid).await?;
    Ok(Json(StatusView { iccid, status }))
}

fn not_found() -> ApiError {
    ApiError::NotFound("Activation record not found".to_string())
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Inbound activation request.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivationRequest {
    pub iccid: Option<String>,
    pub customer_email: Option<String>,
}

/// Activation record as exposed over HTTP.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordView {
    pub id: i64,
    pub iccid: String,
    pub customer_email: String,
    pub active: bool,
    pub activation_timestamp: String,
    pub actuator_response: String,
}

impl From<ActivationRecord> for RecordView {
    fn from(record: ActivationRecord) -> Self {
        Self {
            id: record.id.0,
            iccid: record.identifier,
            customer_email: record.requester,
            active: record.outcome,
            activation_timestamp: record.created_at.to_rfc3339(),
            actuator_response: record.diagnostic,
        }
    }
}

fn views(records: Vec<ActivationRecord>) -> Vec<RecordView> {
    records.into_iter().map(RecordView::from).collect()
}

/// Activation state of one ICCID.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusView {
    pub iccid: String,
    pub status: ActivationState,
}
