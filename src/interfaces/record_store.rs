//! Activation record storage interface.

use async_trait::async_trait;

use crate::record::{ActivationRecord, NewActivationRecord, RecordId};

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The identifier already has an authoritative record.
    #[error("Activation record already exists for ICCID {identifier}")]
    Duplicate { identifier: String },

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[cfg(any(feature = "sqlite", feature = "postgres"))]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Interface for activation record persistence.
///
/// Records are insert-only. Listings are ordered by id ascending.
///
/// Implementations:
/// - `MemoryRecordStore`: in-process map, used for tests and `memory` storage
/// - `SqliteRecordStore`: SQLite storage
/// - `PostgresRecordStore`: PostgreSQL storage
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Check whether a record exists for an ICCID.
    async fn exists(&self, identifier: &str) -> Result<bool>;

    /// Look up the record for an ICCID.
    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<ActivationRecord>>;

    /// Look up a record by its store-assigned id.
    async fn find_by_id(&self, id: RecordId) -> Result<Option<ActivationRecord>>;

    /// All records requested by a customer.
    async fn find_by_requester(&self, requester: &str) -> Result<Vec<ActivationRecord>>;

    /// All records with the given outcome.
    async fn find_by_outcome(&self, outcome: bool) -> Result<Vec<ActivationRecord>>;

    /// Every record in the store.
    async fn find_all(&self) -> Result<Vec<ActivationRecord>>;

    /// Insert a new record, assigning its id and (if unset) its timestamp.
    ///
    /// Fails with `StorageError::Duplicate` when the ICCID already has a
    /// record; the existing record is left untouched.
    async fn save(&self, record: NewActivationRecord) -> Result<ActivationRecord>;
}
