use crate::error::{Result, RigcheckError};
use crate::paths;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

pub const STATUS_PINNED: &str = "pinned";
pub const STATUS_IN_PROGRESS: &str = "in_progress";
pub const STATUS_TOMBSTONE: &str = "tombstone";

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

/// The subset of a store record the probe reads. Unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub updated_at: String,
}

impl Record {
    pub fn new(id: impl Into<String>, title: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            assignee: None,
            status: status.into(),
            updated_at: String::new(),
        }
    }

    /// Assignee with blank values treated as unassigned.
    pub fn assignee(&self) -> Option<&str> {
        self.assignee
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty())
    }
}

// ---------------------------------------------------------------------------
// RecordStore
// ---------------------------------------------------------------------------

/// Read access to a worker's record store, addressed by its location
/// (the store-marker directory, e.g. `<worker>/.beads`).
pub trait RecordStore {
    /// Records whose status equals `status`, in store order.
    fn list(&self, location: &Path, status: &str) -> Result<Vec<Record>>;

    /// A single record by id. Missing or deleted records yield
    /// [`RigcheckError::RecordNotFound`].
    fn show(&self, location: &Path, id: &str) -> Result<Record>;

    /// Read the store at `location` once, so that one scan pass answers every
    /// `list` and `show` from the same contents. `None` means the backend has
    /// no cheaper view and calls go straight to `self`.
    fn snapshot(&self, _location: &Path) -> Result<Option<Snapshot>> {
        Ok(None)
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Records of one store held in memory. Tombstoned records are kept for
/// `list` but hidden from `show`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    records: Vec<Record>,
}

impl Snapshot {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }
}

impl RecordStore for Snapshot {
    fn list(&self, _location: &Path, status: &str) -> Result<Vec<Record>> {
        Ok(self
            .records
            .iter()
            .filter(|r| r.status == status)
            .cloned()
            .collect())
    }

    fn show(&self, _location: &Path, id: &str) -> Result<Record> {
        self.records
            .iter()
            .find(|r| r.id == id && r.status != STATUS_TOMBSTONE)
            .cloned()
            .ok_or_else(|| RigcheckError::RecordNotFound(id.to_string()))
    }
}

/// Reads `<location>/issues.jsonl`, one JSON record per line.
///
/// The file is append-style: when an id appears more than once the last line
/// wins, keeping the position of its first appearance.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonlStore;

impl JsonlStore {
    pub fn new() -> Self {
        Self
    }

    fn load(&self, location: &Path) -> Result<Vec<Record>> {
        if !location.is_dir() {
            return Err(RigcheckError::StoreUnavailable {
                location: location.to_path_buf(),
                reason: "store directory missing".to_string(),
            });
        }
        let file = paths::issues_file(location);
        if !file.exists() {
            return Ok(Vec::new());
        }
        let data = std::fs::read_to_string(&file).map_err(|e| RigcheckError::StoreUnavailable {
            location: location.to_path_buf(),
            reason: e.to_string(),
        })?;

        let mut records: Vec<Record> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        for (n, line) in data.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let record: Record =
                serde_json::from_str(line).map_err(|e| RigcheckError::StoreUnavailable {
                    location: location.to_path_buf(),
                    reason: format!("{}:{}: {e}", paths::ISSUES_FILE, n + 1),
                })?;
            match index.get(&record.id) {
                Some(&pos) => records[pos] = record,
                None => {
                    index.insert(record.id.clone(), records.len());
                    records.push(record);
                }
            }
        }
        Ok(records)
    }
}

impl RecordStore for JsonlStore {
    fn list(&self, location: &Path, status: &str) -> Result<Vec<Record>> {
        Snapshot::new(self.load(location)?).list(location, status)
    }

    fn show(&self, location: &Path, id: &str) -> Result<Record> {
        Snapshot::new(self.load(location)?).show(location, id)
    }

    fn snapshot(&self, location: &Path) -> Result<Option<Snapshot>> {
        Ok(Some(Snapshot::new(self.load(location)?)))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
