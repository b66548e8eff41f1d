//! Activation orchestration.
//!
//! Enforces at most one provisioning attempt per ICCID: the store is
//! consulted first, the gateway is called only for ICCIDs without a record,
//! and every completed attempt is persisted exactly once.
//!
//! ```text
//! activate(iccid) --> store lookup --hit--> stored outcome
//!                          |
//!                         miss --> gateway --> save --> outcome
//! ```
//!
//! Gateway faults become failed outcomes. Store faults, and a panicked
//! activation task, are the only errors `activate` returns. Each attempt runs
//! on a spawned task, so a caller that gives up does not abandon a gateway
//! call whose outcome has not been recorded yet.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::interfaces::record_store::StorageError;
use crate::interfaces::{GatewayOutcome, ProvisioningGateway, RecordStore};
use crate::record::{ActivationRecord, ActivationState, NewActivationRecord, RecordId};

use super::keyed_lock::KeyedLocks;

/// Prefix for diagnostics describing a gateway fault.
pub const FAULT_PREFIX: &str = "Error: ";

/// Errors surfaced by activation operations.
#[derive(Debug, thiserror::Error)]
pub enum ActivationError {
    /// The store could not be read or written; the operation did not complete.
    #[error("Activation record store failed: {0}")]
    Persistence(#[from] StorageError),

    /// The background activation task panicked or was shut down.
    #[error("Activation task did not complete: {0}")]
    Aborted(#[from] tokio::task::JoinError),
}

/// Result type for activation operations.
pub type Result<T> = std::result::Result<T, ActivationError>;

/// Coordinates the provisioning gateway and the record store.
#[derive(Clone)]
pub struct ActivationService {
    gateway: Arc<dyn ProvisioningGateway>,
    store: Arc<dyn RecordStore>,
    locks: Arc<KeyedLocks>,
}

impl ActivationService {
    pub fn new(gateway: Arc<dyn ProvisioningGateway>, store: Arc<dyn RecordStore>) -> Self {
        Self {
            gateway,
            store,
            locks: Arc::new(KeyedLocks::new()),
        }
    }

    /// Activate a SIM, or report the outcome already recorded for it.
    ///
    /// Returns whether the SIM is active. The gateway is called at most once
    /// per ICCID for the lifetime of the store. The attempt runs on its own
    /// task and completes even if the caller stops waiting for it.
    pub async fn activate(&self, identifier: &str, requester: &str) -> Result<bool> {
        info!(iccid = %identifier, requester = %requester, "activation requested");

        let service = self.clone();
        let identifier = identifier.to_string();
        let requester = requester.to_string();
        tokio::spawn(async move { service.activate_exclusive(&identifier, &requester).await })
            .await?
    }

    async fn activate_exclusive(&self, identifier: &str, requester: &str) -> Result<bool> {
        let _guard = self.locks.lock(identifier).await;

        if let Some(existing) = self.store.find_by_identifier(identifier).await? {
            warn!(
                iccid = %identifier,
                active = existing.outcome,
                "ICCID already processed, returning recorded outcome"
            );
            return Ok(existing.outcome);
        }

        let (outcome, diagnostic) = match self.gateway.activate(identifier).await {
            GatewayOutcome::Responded(response) => {
                info!(
                    iccid = %identifier,
                    gateway = %self.gateway.name(),
                    response = %response.raw,
                    "actuator responded"
                );
                (response.success, response.raw)
            }
            GatewayOutcome::Fault(description) => {
                warn!(
                    iccid = %identifier,
                    gateway = %self.gateway.name(),
                    error = %description,
                    "actuator call failed, recording failed activation"
                );
                (false, format!("{}{}", FAULT_PREFIX, description))
            }
        };

        let record = NewActivationRecord::new(identifier, requester, outcome, diagnostic);
        match self.store.save(record).await {
            Ok(saved) => {
                info!(
                    iccid = %identifier,
                    record_id = %saved.id,
                    "SIM card activation {}",
                    if outcome { "SUCCESS" } else { "FAILED" }
                );
                Ok(outcome)
            }
            Err(StorageError::Duplicate { .. }) => self.resolve_conflict(identifier).await,
            Err(e) => Err(e.into()),
        }
    }

    /// Another writer recorded this ICCID first; its outcome is authoritative.
    async fn resolve_conflict(&self, identifier: &str) -> Result<bool> {
        match self.store.find_by_identifier(identifier).await? {
            Some(winner) => {
                warn!(
                    iccid = %identifier,
                    record_id = %winner.id,
                    active = winner.outcome,
                    "lost activation race, discarding local outcome"
                );
                Ok(winner.outcome)
            }
            None => Err(StorageError::Unavailable(format!(
                "record for ICCID {} reported as duplicate but not found",
                identifier
            ))
            .into()),
        }
    }

    /// Current state of an ICCID.
    pub async fn status(&self, identifier: &str) -> Result<ActivationState> {
        Ok(self
            .store
            .find_by_identifier(identifier)
            .await?
            .map(|r| r.state())
            .unwrap_or(ActivationState::Unattempted))
    }

    pub async fn all_records(&self) -> Result<Vec<ActivationRecord>> {
        debug!("retrieving all activation records");
        Ok(self.store.find_all().await?)
    }

    pub async fn record_by_identifier(&self, identifier: &str) -> Result<Option<ActivationRecord>> {
        debug!(iccid = %identifier, "retrieving activation record");
        Ok(self.store.find_by_identifier(identifier).await?)
    }

    pub async fn record_by_id(&self, id: RecordId) -> Result<Option<ActivationRecord>> {
        debug!(record_id = %id, "retrieving activation record");
        Ok(self.store.find_by_id(id).await?)
    }

    pub async fn records_by_requester(&self, requester: &str) -> Result<Vec<ActivationRecord>> {
        debug!(requester = %requester, "retrieving activation records");
        Ok(self.store.find_by_requester(requester).await?)
    }

    /// Records whose activation succeeded.
    pub async fn successful_records(&self) -> Result<Vec<ActivationRecord>> {
        Ok(self.store.find_by_outcome(true).await?)
    }

    /// Records whose activation failed.
    pub async fn failed_records(&self) -> Result<Vec<ActivationRecord>> {
        Ok(self.store.find_by_outcome(false).await?)
    }
}
