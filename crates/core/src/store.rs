//! Durable storage for the booking ledger.
//!
//! The ledger's only side effect is writing its full state to a flat JSON
//! document: one object mapping every `"{doctorId}-{date}"` key to the array
//! of booked times for that key. The document is rewritten wholesale on every
//! successful mutation — simple and safe at clinic-directory scale, and a
//! known scalability ceiling rather than a correctness concern.
//!
//! Storage is injected behind [`BookingStore`] so the ledger can be tested
//! against an in-memory fake without touching the filesystem.

use crate::error::{AppointmentError, AppointmentResult};
use medibook_types::SlotTime;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

/// Serialized form of the full booking ledger.
///
/// `BTreeMap` keeps the persisted document stable across rewrites, which
/// makes the file diffable when it sits in version control during demos.
pub type LedgerSnapshot = BTreeMap<String, Vec<SlotTime>>;

/// Persistence surface for the booking ledger.
///
/// `load` is called once at startup; `save_all` after every successful
/// mutation. An implementation must not report `Ok` from `save_all` unless
/// the snapshot is durably written.
pub trait BookingStore: Send + Sync {
    /// Loads the last persisted snapshot. A store with no prior document
    /// returns an empty snapshot, not an error.
    fn load(&self) -> AppointmentResult<LedgerSnapshot>;

    /// Durably replaces the persisted snapshot.
    fn save_all(&self, snapshot: &LedgerSnapshot) -> AppointmentResult<()>;
}

impl<T: BookingStore + ?Sized> BookingStore for std::sync::Arc<T> {
    fn load(&self) -> AppointmentResult<LedgerSnapshot> {
        (**self).load()
    }

    fn save_all(&self, snapshot: &LedgerSnapshot) -> AppointmentResult<()> {
        (**self).save_all(snapshot)
    }
}

/// `BookingStore` backed by a single JSON file.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl BookingStore for JsonFileStore {
    fn load(&self) -> AppointmentResult<LedgerSnapshot> {
        if !self.path.exists() {
            tracing::info!(
                "no existing booked slots at {}, starting fresh",
                self.path.display()
            );
            return Ok(LedgerSnapshot::new());
        }

        let contents = fs::read_to_string(&self.path).map_err(AppointmentError::FileRead)?;
        serde_json::from_str(&contents).map_err(AppointmentError::Deserialization)
    }

    fn save_all(&self, snapshot: &LedgerSnapshot) -> AppointmentResult<()> {
        let json =
            serde_json::to_string_pretty(snapshot).map_err(AppointmentError::Serialization)?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(AppointmentError::StorageDirCreation)?;
        }

        // Write-then-rename in the same directory, so a crash mid-write
        // leaves the previous document intact instead of a truncated one.
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, json).map_err(AppointmentError::FileWrite)?;
        fs::rename(&tmp_path, &self.path).map_err(|e| AppointmentError::FilePersist {
            path: self.path.clone(),
            source: e,
        })?;

        Ok(())
    }
}

/// In-memory `BookingStore` fake for ledger tests.
#[cfg(test)]
pub(crate) mod fake {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MemoryStore {
        snapshot: Mutex<LedgerSnapshot>,
        fail_writes: AtomicBool,
    }

    impl MemoryStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_snapshot(snapshot: LedgerSnapshot) -> Self {
            Self {
                snapshot: Mutex::new(snapshot),
                fail_writes: AtomicBool::new(false),
            }
        }

        /// Makes every subsequent `save_all` fail, simulating a storage fault.
        pub fn fail_writes(&self, fail: bool) {
            self.fail_writes.store(fail, Ordering::SeqCst);
        }

        pub fn snapshot(&self) -> LedgerSnapshot {
            self.snapshot.lock().unwrap().clone()
        }
    }

    impl BookingStore for MemoryStore {
        fn load(&self) -> AppointmentResult<LedgerSnapshot> {
            Ok(self.snapshot.lock().unwrap().clone())
        }

        fn save_all(&self, snapshot: &LedgerSnapshot) -> AppointmentResult<()> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(AppointmentError::FileWrite(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "simulated storage fault",
                )));
            }
            *self.snapshot.lock().unwrap() = snapshot.clone();
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medibook_types::SlotTime;
    use tempfile::TempDir;

    fn slot(s: &str) -> SlotTime {
        SlotTime::parse(s).expect("test slot should parse")
    }

    #[test]
    fn test_load_missing_file_starts_fresh() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = JsonFileStore::new(temp_dir.path().join("booked_slots.json"));

        let snapshot = store.load().expect("load should succeed");
        assert!(snapshot.is_empty(), "missing file should yield empty ledger");
    }

    #[test]
    fn test_save_then_load_round_trips() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = JsonFileStore::new(temp_dir.path().join("booked_slots.json"));

        let mut snapshot = LedgerSnapshot::new();
        snapshot.insert("doc1-2024-03-18".into(), vec![slot("09:00"), slot("10:00")]);
        snapshot.insert("doc2-2024-03-19".into(), vec![]);

        store.save_all(&snapshot).expect("save_all should succeed");
        let reloaded = store.load().expect("load should succeed");

        assert_eq!(reloaded, snapshot);
    }

    #[test]
    fn test_save_creates_missing_data_dir() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let nested = temp_dir.path().join("data").join("booked_slots.json");
        let store = JsonFileStore::new(nested.clone());

        store
            .save_all(&LedgerSnapshot::new())
            .expect("save_all should create parent directories");
        assert!(nested.is_file());
    }

    #[test]
    fn test_save_leaves_no_temp_file_behind() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("booked_slots.json");
        let store = JsonFileStore::new(path.clone());

        let mut snapshot = LedgerSnapshot::new();
        snapshot.insert("doc1-2024-03-18".into(), vec![slot("09:00")]);
        store.save_all(&snapshot).expect("save_all should succeed");

        let entries: Vec<_> = std::fs::read_dir(temp_dir.path())
            .expect("should list temp dir")
            .flatten()
            .collect();
        assert_eq!(entries.len(), 1, "only the ledger document should remain");
        assert_eq!(entries[0].path(), path);
    }

    #[test]
    fn test_load_rejects_corrupt_document() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("booked_slots.json");
        std::fs::write(&path, "{ truncated").expect("should write corrupt file");

        let err = JsonFileStore::new(path)
            .load()
            .expect_err("corrupt document should fail");
        assert!(matches!(err, AppointmentError::Deserialization(_)));
    }
}
