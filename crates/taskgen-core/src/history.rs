//! Bounded, newest-first history of generated specs.
//!
//! The whole list is rewritten on every `record` call. That is a
//! read-modify-write cycle: two writers that interleave can lose one of the
//! two entries. Callers sharing a [`History`] across threads must serialize
//! `record` themselves (the server does this with a mutex).

use crate::error::{Result, TaskgenError};
use crate::io;
use crate::types::HistoryRecord;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, Once};

/// Maximum number of records kept.
pub const HISTORY_CAPACITY: usize = 5;

// ---------------------------------------------------------------------------
// Bounded list
// ---------------------------------------------------------------------------

/// Insert `item` at the front of `list`, then drop everything past `cap`.
pub fn push_front_bounded<T>(list: &mut Vec<T>, item: T, cap: usize) {
    list.insert(0, item);
    list.truncate(cap);
}

// ---------------------------------------------------------------------------
// Storage
// ---------------------------------------------------------------------------

/// Durable home of the history list. `load` returns `None` when nothing has
/// ever been saved.
pub trait HistoryStorage: Send + Sync {
    fn load(&self) -> Result<Option<Vec<HistoryRecord>>>;
    fn save(&self, records: &[HistoryRecord]) -> Result<()>;
}

impl<T: HistoryStorage + ?Sized> HistoryStorage for std::sync::Arc<T> {
    fn load(&self) -> Result<Option<Vec<HistoryRecord>>> {
        (**self).load()
    }

    fn save(&self, records: &[HistoryRecord]) -> Result<()> {
        (**self).save(records)
    }
}

/// History kept as a pretty-printed JSON array in a single file.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl HistoryStorage for JsonFileStorage {
    fn load(&self) -> Result<Option<Vec<HistoryRecord>>> {
        let read_err = |message: String| TaskgenError::PersistenceRead {
            path: self.path.clone(),
            message,
        };
        let Some(data) = io::read_if_exists(&self.path).map_err(|e| read_err(e.to_string()))?
        else {
            return Ok(None);
        };
        if data.trim().is_empty() {
            return Ok(None);
        }
        let records = serde_json::from_str(&data).map_err(|e| read_err(e.to_string()))?;
        Ok(Some(records))
    }

    fn save(&self, records: &[HistoryRecord]) -> Result<()> {
        let write_err = |e: TaskgenError| TaskgenError::PersistenceWrite {
            path: self.path.clone(),
            source: Box::new(e),
        };
        let data = serde_json::to_string_pretty(records).map_err(|e| write_err(e.into()))?;
        io::atomic_write(&self.path, data.as_bytes()).map_err(write_err)
    }
}

/// In-process storage, used by tests and by callers that do not need
/// durability. `fail_writes` simulates an unavailable disk.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    records: Mutex<Option<Vec<HistoryRecord>>>,
    fail_writes: AtomicBool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

impl HistoryStorage for MemoryStorage {
    fn load(&self) -> Result<Option<Vec<HistoryRecord>>> {
        let guard = self
            .records
            .lock()
            .map_err(|_| TaskgenError::PersistenceRead {
                path: PathBuf::from(":memory:"),
                message: "storage lock poisoned".to_string(),
            })?;
        Ok(guard.clone())
    }

    fn save(&self, records: &[HistoryRecord]) -> Result<()> {
        let write_err = |msg: &str| TaskgenError::PersistenceWrite {
            path: PathBuf::from(":memory:"),
            source: msg.to_string().into(),
        };
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(write_err("storage unavailable"));
        }
        let mut guard = self
            .records
            .lock()
            .map_err(|_| write_err("storage lock poisoned"))?;
        *guard = Some(records.to_vec());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

pub struct History {
    storage: Box<dyn HistoryStorage>,
    last_id: AtomicU64,
    seeded: Once,
}

impl History {
    pub fn new(storage: impl HistoryStorage + 'static) -> Self {
        Self {
            storage: Box::new(storage),
            last_id: AtomicU64::new(0),
            seeded: Once::new(),
        }
    }

    /// File-backed history at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self::new(JsonFileStorage::new(path))
    }

    /// Current records, newest first. Unreadable storage is logged and
    /// reported as empty.
    pub fn list(&self) -> Vec<HistoryRecord> {
        let mut records = self.load_or_empty();
        records.truncate(HISTORY_CAPACITY);
        records
    }

    /// Prepend `entry`, keep the newest [`HISTORY_CAPACITY`] records, and
    /// persist the result.
    pub fn record(&self, entry: HistoryRecord) -> Result<()> {
        let mut records = self.load_or_empty();
        let id = entry.id;
        push_front_bounded(&mut records, entry, HISTORY_CAPACITY);
        if let Err(e) = self.storage.save(&records) {
            tracing::error!(id, error = %e, "failed to persist history");
            return Err(e);
        }
        tracing::debug!(id, len = records.len(), "recorded history entry");
        Ok(())
    }

    /// Allocate a record id from `now`: milliseconds since the epoch, bumped
    /// past the last id handed out (or stored) so ids strictly increase.
    pub fn next_id(&self, now: DateTime<Utc>) -> u64 {
        let candidate = u64::try_from(now.timestamp_millis()).unwrap_or(0);
        // Stored ids are read once per `History`, even when the store is empty.
        self.seeded.call_once(|| {
            let stored_max = self.list().iter().map(|r| r.id).max().unwrap_or(0);
            self.last_id.fetch_max(stored_max, Ordering::SeqCst);
        });
        let mut last = self.last_id.load(Ordering::SeqCst);
        loop {
            let id = candidate.max(last + 1);
            match self
                .last_id
                .compare_exchange(last, id, Ordering::SeqCst, Ordering::SeqCst)
            {
                Ok(_) => return id,
                Err(actual) => last = actual,
            }
        }
    }

    fn load_or_empty(&self) -> Vec<HistoryRecord> {
        match self.storage.load() {
            Ok(records) => records.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(error = %e, "history unreadable, treating as empty");
                Vec::new()
            }
        }
    }
}
