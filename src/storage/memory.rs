//! In-memory RecordStore.
//!
//! Backs the `memory` storage type and unit tests. Failure injection mirrors
//! what a database outage looks like to callers.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::interfaces::record_store::{RecordStore, Result, StorageError};
use crate::record::{ActivationRecord, NewActivationRecord, RecordId};

#[derive(Default)]
struct Records {
    by_id: BTreeMap<RecordId, ActivationRecord>,
    by_identifier: HashMap<String, RecordId>,
    next_id: i64,
}

/// Record store that keeps everything in process memory.
#[derive(Default)]
pub struct MemoryRecordStore {
    records: RwLock<Records>,
    fail_on_save: RwLock<bool>,
    fail_on_read: RwLock<bool>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_fail_on_save(&self, fail: bool) {
        *self.fail_on_save.write().await = fail;
    }

    pub async fn set_fail_on_read(&self, fail: bool) {
        *self.fail_on_read.write().await = fail;
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.by_id.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    async fn check_read(&self) -> Result<()> {
        if *self.fail_on_read.read().await {
            return Err(StorageError::Unavailable("Mock read failure".to_string()));
        }
        Ok(())
    }

    async fn filtered<F>(&self, keep: F) -> Result<Vec<ActivationRecord>>
    where
        F: Fn(&ActivationRecord) -> bool,
    {
        self.check_read().await?;
        let records = self.records.read().await;
        Ok(records.by_id.values().filter(|r| keep(*r)).cloned().collect())
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn exists(&self, identifier: &str) -> Result<bool> {
        self.check_read().await?;
        Ok(self
            .records
            .read()
            .await
            .by_identifier
            .contains_key(identifier))
    }

    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<ActivationRecord>> {
        self.check_read().await?;
        let records = self.records.read().await;
        Ok(records
            .by_identifier
            .get(identifier)
            .and_then(|id| records.by_id.get(id))
            .cloned())
    }

    async fn find_by_id(&self, id: RecordId) -> Result<Option<ActivationRecord>> {
        self.check_read().await?;
        Ok(self.records.read().await.by_id.get(&id).cloned())
    }

    async fn find_by_requester(&self, requester: &str) -> Result<Vec<ActivationRecord>> {
        self.filtered(|r| r.requester == requester).await
    }

    async fn find_by_outcome(&self, outcome: bool) -> Result<Vec<ActivationRecord>> {
        self.filtered(|r| r.outcome == outcome).await
    }

    async fn find_all(&self) -> Result<Vec<ActivationRecord>> {
        self.filtered(|_| true).await
    }

    async fn save(&self, record: NewActivationRecord) -> Result<ActivationRecord> {
        if *self.fail_on_save.read().await {
            return Err(StorageError::Unavailable("Mock save failure".to_string()));
        }

        let mut records = self.records.write().await;
        if records.by_identifier.contains_key(&record.identifier) {
            return Err(StorageError::Duplicate {
                identifier: record.identifier,
            });
        }

        records.next_id += 1;
        let id = RecordId(records.next_id);
        let saved = record.into_record(id);
        records.by_identifier.insert(saved.identifier.clone(), id);
        records.by_id.insert(id, saved.clone());
        Ok(saved)
    }
}
