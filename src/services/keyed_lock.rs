//! Per-key async mutual exclusion.
//!
//! Tasks locking the same key run one at a time; tasks on different keys
//! never wait on each other. An entry lives only while some task holds or
//! waits for its lock, including waiters that are cancelled mid-wait.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type Entries = Arc<Mutex<HashMap<String, Arc<AsyncMutex<()>>>>>;

/// Registry of per-key locks.
#[derive(Default)]
pub struct KeyedLocks {
    entries: Entries,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `key`.
    pub async fn lock(&self, key: &str) -> KeyedGuard {
        let lock = {
            let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
            entries
                .entry(key.to_string())
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };

        // Registered before waiting so a cancelled wait still cleans up.
        let entry = EntryHandle {
            key: key.to_string(),
            entries: Arc::clone(&self.entries),
            lock,
        };
        let guard = Arc::clone(&entry.lock).lock_owned().await;

        KeyedGuard {
            _guard: guard,
            _entry: entry,
        }
    }

    /// Number of keys currently held or awaited.
    pub fn active_keys(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }
}

/// Exclusive access to one key; released on drop.
///
/// Fields drop in order: the mutex is released before the entry is
/// considered for removal.
pub struct KeyedGuard {
    _guard: OwnedMutexGuard<()>,
    _entry: EntryHandle,
}

/// One holder's or waiter's claim on a map entry.
struct EntryHandle {
    key: String,
    entries: Entries,
    lock: Arc<AsyncMutex<()>>,
}

impl Drop for EntryHandle {
    fn drop(&mut self) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        // Map entry + this handle: nobody else holds or waits on it.
        let unused = entries
            .get(&self.key)
            .is_some_and(|l| Arc::ptr_eq(l, &self.lock) && Arc::strong_count(l) == 2);
        if unused {
            entries.remove(&self.key);
        }
    }
}
