//! Activation record types.
//!
//! An `ActivationRecord` is the durable, write-once outcome of the first
//! completed activation attempt for an ICCID. Records are never updated or
//! deleted once saved.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Store-assigned record identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub i64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for RecordId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// A persisted activation outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationRecord {
    pub id: RecordId,
    /// SIM identifier (ICCID). Unique across all records.
    pub identifier: String,
    /// Customer contact that requested the activation.
    pub requester: String,
    /// Whether the actuator activated the SIM.
    pub outcome: bool,
    pub created_at: DateTime<Utc>,
    /// Actuator response body, or the fault that caused the failure.
    pub diagnostic: String,
}

impl ActivationRecord {
    /// State this record puts its identifier in.
    pub fn state(&self) -> ActivationState {
        if self.outcome {
            ActivationState::Active
        } else {
            ActivationState::Inactive
        }
    }
}

/// An activation outcome that has not been saved yet.
///
/// `RecordStore::save` assigns the id, and `created_at` when left unset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewActivationRecord {
    pub identifier: String,
    pub requester: String,
    pub outcome: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub diagnostic: String,
}

impl NewActivationRecord {
    pub fn new(
        identifier: impl Into<String>,
        requester: impl Into<String>,
        outcome: bool,
        diagnostic: impl Into<String>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            requester: requester.into(),
            outcome,
            created_at: None,
            diagnostic: diagnostic.into(),
        }
    }

    /// Pin the creation timestamp instead of letting the store stamp it.
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// Attach a store-assigned id, stamping `created_at` if still unset.
    pub fn into_record(self, id: RecordId) -> ActivationRecord {
        ActivationRecord {
            id,
            identifier: self.identifier,
            requester: self.requester,
            outcome: self.outcome,
            created_at: self.created_at.unwrap_or_else(Utc::now),
            diagnostic: self.diagnostic,
        }
    }
}

/// Per-identifier activation state.
///
/// `Unattempted` is the only non-terminal state; once a record exists the
/// identifier stays `Active` or `Inactive` for the lifetime of the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivationState {
    Unattempted,
    Active,
    Inactive,
}

impl ActivationState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivationState::Unattempted => "unattempted",
            ActivationState::Active => "active",
            ActivationState::Inactive => "inactive",
        }
    }
}

impl fmt::Display for ActivationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
