//! RecordStore interface step definitions.

use chrono::{DateTime, Utc};
use cucumber::{given, then, when, World};

use simcard_activator::interfaces::{RecordStore, StorageError};
use simcard_activator::record::{ActivationRecord, NewActivationRecord, RecordId};

use crate::backend::{StorageBackend, StorageContext};

/// Test context for RecordStore scenarios.
#[derive(Debug, World)]
#[world(init = Self::new)]
pub struct RecordStoreWorld {
    backend: StorageBackend,
    context: Option<StorageContext>,
    last_saved: Option<ActivationRecord>,
    last_error: Option<StorageError>,
}

impl RecordStoreWorld {
    fn new() -> Self {
        Self {
            backend: StorageBackend::from_env(),
            context: None,
            last_saved: None,
            last_error: None,
        }
    }

    fn store(&self) -> &dyn RecordStore {
        self.context
            .as_ref()
            .expect("Storage context not initialized")
            .record_store
            .as_ref()
    }

    async fn save(&mut self, record: NewActivationRecord) {
        match self.store().save(record).await {
            Ok(saved) => {
                self.last_saved = Some(saved);
                self.last_error = None;
            }
            Err(e) => {
                self.last_saved = None;
                self.last_error = Some(e);
            }
        }
    }

    async fn record_for(&self, iccid: &str) -> ActivationRecord {
        self.store()
            .find_by_identifier(iccid)
            .await
            .expect("Failed to look up record")
            .unwrap_or_else(|| panic!("No record for {}", iccid))
    }
}

fn is_success(outcome: &str) -> bool {
    outcome == "successful"
}

fn iccid_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn iccids(records: &[ActivationRecord]) -> Vec<String> {
    records.iter().map(|r| r.identifier.clone()).collect()
}

fn timestamp(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .expect("Invalid timestamp in scenario")
        .with_timezone(&Utc)
}

// --- Background ---

#[given("a RecordStore backend")]
async fn given_record_store_backend(world: &mut RecordStoreWorld) {
    println!("Using backend: {}", world.backend.name());
    world.context = Some(StorageContext::new(world.backend).await);
}

// --- Given steps ---

#[given(regex = r#"^a (successful|failed) record for "([^"]*)" requested by "([^"]*)"$"#)]
async fn given_record(
    world: &mut RecordStoreWorld,
    outcome: String,
    iccid: String,
    requester: String,
) {
    world
        .store()
        .save(NewActivationRecord::new(
            iccid,
            requester,
            is_success(&outcome),
            "{\"success\":true}",
        ))
        .await
        .expect("Failed to save record");
}

// --- When steps ---

#[when(regex = r#"^I save a (successful|failed) record for "([^"]*)" requested by "([^"]*)"$"#)]
async fn when_save_record(
    world: &mut RecordStoreWorld,
    outcome: String,
    iccid: String,
    requester: String,
) {
    let record = NewActivationRecord::new(iccid, requester, is_success(&outcome), "");
    world.save(record).await;
}

#[when(regex = r#"^I save a (successful|failed) record for "([^"]*)" with diagnostic "([^"]*)"$"#)]
async fn when_save_record_with_diagnostic(
    world: &mut RecordStoreWorld,
    outcome: String,
    iccid: String,
    diagnostic: String,
) {
    let record =
        NewActivationRecord::new(iccid, "diag@example.com", is_success(&outcome), diagnostic);
    world.save(record).await;
}

#[when(regex = r#"^I save a (successful|failed) record for "([^"]*)" created at "([^"]*)"$"#)]
async fn when_save_record_created_at(
    world: &mut RecordStoreWorld,
    outcome: String,
    iccid: String,
    created_at: String,
) {
    let record = NewActivationRecord::new(iccid, "time@example.com", is_success(&outcome), "")
        .with_created_at(timestamp(&created_at));
    world.save(record).await;
}

// --- Then steps ---

#[then("the save succeeds")]
async fn then_save_succeeds(world: &mut RecordStoreWorld) {
    assert!(
        world.last_error.is_none(),
        "Expected save to succeed, got {:?}",
        world.last_error
    );
    assert!(world.last_saved.is_some());
}

#[then("the save is rejected as a duplicate")]
async fn then_save_rejected(world: &mut RecordStoreWorld) {
    assert!(
        matches!(world.last_error, Some(StorageError::Duplicate { .. })),
        "Expected duplicate error, got {:?}",
        world.last_error
    );
}

#[then(expr = "a record exists for {string}")]
async fn then_record_exists(world: &mut RecordStoreWorld, iccid: String) {
    assert!(world.store().exists(&iccid).await.expect("exists failed"));
}

#[then(expr = "no record exists for {string}")]
async fn then_no_record_exists(world: &mut RecordStoreWorld, iccid: String) {
    assert!(!world.store().exists(&iccid).await.expect("exists failed"));
}

#[then(expr = "looking up {string} finds nothing")]
async fn then_lookup_finds_nothing(world: &mut RecordStoreWorld, iccid: String) {
    let found = world
        .store()
        .find_by_identifier(&iccid)
        .await
        .expect("lookup failed");
    assert!(found.is_none());
}

#[then(expr = "looking up id {int} finds nothing")]
async fn then_lookup_id_finds_nothing(world: &mut RecordStoreWorld, id: i64) {
    let found = world
        .store()
        .find_by_id(RecordId(id))
        .await
        .expect("lookup failed");
    assert!(found.is_none());
}

#[then(expr = "the record for {string} is requested by {string}")]
async fn then_record_requester(world: &mut RecordStoreWorld, iccid: String, requester: String) {
    assert_eq!(world.record_for(&iccid).await.requester, requester);
}

#[then(regex = r#"^the record for "([^"]*)" has a (successful|failed) outcome$"#)]
async fn then_record_outcome(world: &mut RecordStoreWorld, iccid: String, outcome: String) {
    assert_eq!(world.record_for(&iccid).await.outcome, is_success(&outcome));
}

#[then(expr = "the record for {string} has diagnostic {string}")]
async fn then_record_diagnostic(world: &mut RecordStoreWorld, iccid: String, diagnostic: String) {
    assert_eq!(world.record_for(&iccid).await.diagnostic, diagnostic);
}

#[then(expr = "the record for {string} was created at {string}")]
async fn then_record_created_at(world: &mut RecordStoreWorld, iccid: String, created_at: String) {
    assert_eq!(world.record_for(&iccid).await.created_at, timestamp(&created_at));
}

#[then("the last saved record can be found by its id")]
async fn then_found_by_id(world: &mut RecordStoreWorld) {
    let saved = world.last_saved.clone().expect("No record saved");
    let found = world
        .store()
        .find_by_id(saved.id)
        .await
        .expect("lookup failed");
    assert_eq!(found, Some(saved));
}

#[then(expr = "the store holds {int} record(s)")]
async fn then_store_holds(world: &mut RecordStoreWorld, count: usize) {
    let all = world.store().find_all().await.expect("find_all failed");
    assert_eq!(all.len(), count);
}

#[then(expr = "listing all records returns {string} in that order")]
async fn then_all_in_order(world: &mut RecordStoreWorld, expected: String) {
    let all = world.store().find_all().await.expect("find_all failed");
    assert_eq!(iccids(&all), iccid_list(&expected));
}

#[then("the ids of all records strictly increase")]
async fn then_ids_increase(world: &mut RecordStoreWorld) {
    let all = world.store().find_all().await.expect("find_all failed");
    assert!(all.windows(2).all(|w| w[0].id < w[1].id));
}

#[then(regex = r#"^the (successful|failed) records are "([^"]*)"$"#)]
async fn then_records_by_outcome(world: &mut RecordStoreWorld, outcome: String, expected: String) {
    let records = world
        .store()
        .find_by_outcome(is_success(&outcome))
        .await
        .expect("find_by_outcome failed");
    assert_eq!(iccids(&records), iccid_list(&expected));
}

#[then(expr = "the records requested by {string} are {string}")]
async fn then_records_by_requester(
    world: &mut RecordStoreWorld,
    requester: String,
    expected: String,
) {
    let records = world
        .store()
        .find_by_requester(&requester)
        .await
        .expect("find_by_requester failed");
    assert_eq!(iccids(&records), iccid_list(&expected));
}
