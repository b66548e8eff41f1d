//! Abstract interfaces for the activation core.
//!
//! These traits define the contracts for:
//! - Record storage (durable activation outcomes)
//! - Provisioning gateway (the external actuator call)

pub mod gateway;
pub mod record_store;

pub use gateway::{GatewayOutcome, GatewayResponse, ProvisioningGateway};
pub use record_store::{RecordStore, StorageError};
