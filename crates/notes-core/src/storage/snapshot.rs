//! Snapshot persistence
//!
//! Saves and loads the full store state to/from a single JSON file:
//!
//! ```json
//! {
//!   "notes": { "1": { "id": 1, "title": "...", ... } },
//!   "next_id": 2
//! }
//! ```
//!
//! Uses atomic writes (write to temp file, then rename) to prevent corruption.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::error::{StorageError, StorageResult};
use crate::models::Note;

/// Full store state: every note keyed by id, plus the next id to hand out
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Snapshot {
    #[serde(default)]
    pub notes: BTreeMap<u64, Note>,
    #[serde(default = "first_id")]
    pub next_id: u64,
}

fn first_id() -> u64 {
    1
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            notes: BTreeMap::new(),
            next_id: first_id(),
        }
    }
}

impl Snapshot {
    /// Restore invariants after loading
    ///
    /// The map key is the note's id, and the counter is raised past every
    /// stored id. Fails when the largest id leaves no room for a counter.
    fn normalize(&mut self) -> Result<(), String> {
        for (id, note) in self.notes.iter_mut() {
            note.id = *id;
        }
        let floor = match self.notes.keys().next_back() {
            Some(&max) => max
                .checked_add(1)
                .ok_or_else(|| format!("note id {} leaves no room for further ids", max))?,
            None => first_id(),
        };
        self.next_id = self.next_id.max(floor);
        Ok(())
    }
}

/// Reads and writes a `Snapshot` at a fixed path
#[derive(Debug, Clone)]
pub struct SnapshotPersistence {
    path: PathBuf,
}

impl SnapshotPersistence {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the snapshot file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check if a snapshot exists on disk
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load the snapshot from disk
    ///
    /// Returns `None` if the file doesn't exist or is empty.
    /// Returns an error if the file exists but can't be read or parsed.
    pub fn load(&self) -> StorageResult<Option<Snapshot>> {
        if !self.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path).map_err(|source| StorageError::ReadError {
            path: self.path.clone(),
            source,
        })?;

        if content.trim().is_empty() {
            return Ok(None);
        }

        let invalid = |details: String| StorageError::InvalidFormat {
            path: self.path.clone(),
            details,
        };
        let mut snapshot: Snapshot =
            serde_json::from_str(&content).map_err(|e| invalid(e.to_string()))?;
        snapshot.normalize().map_err(invalid)?;

        Ok(Some(snapshot))
    }

    /// Load the snapshot, falling back to an empty one
    ///
    /// A missing, empty, unreadable or malformed file yields the empty state;
    /// only the last two are logged. A malformed file is first copied to
    /// `<file>.corrupt.backup`, since the next save replaces it.
    pub fn load_or_default(&self) -> Snapshot {
        match self.load() {
            Ok(Some(snapshot)) => {
                debug!(
                    "Loaded {} notes from {:?}",
                    snapshot.notes.len(),
                    self.path
                );
                snapshot
            }
            Ok(None) => Snapshot::default(),
            Err(StorageError::InvalidFormat { path, details }) => {
                match self.backup_corrupt() {
                    Ok(backup_path) => {
                        let err = StorageError::CorruptSnapshot {
                            path,
                            backup_path,
                            details,
                        };
                        warn!("{}; starting with an empty store", err);
                    }
                    Err(e) => warn!(
                        "Invalid snapshot format in {:?}: {}; backup failed ({}); \
                         starting with an empty store",
                        path, details, e
                    ),
                }
                Snapshot::default()
            }
            Err(e) => {
                warn!("{}; starting with an empty store", e);
                Snapshot::default()
            }
        }
    }

    /// Path the snapshot is copied to when it can't be parsed
    pub fn backup_path(&self) -> PathBuf {
        sibling_with_suffix(&self.path, ".corrupt.backup")
    }

    fn backup_corrupt(&self) -> StorageResult<PathBuf> {
        let backup_path = self.backup_path();
        fs::copy(&self.path, &backup_path)
            .map_err(|e| StorageError::from_io(e, backup_path.clone()))?;
        Ok(backup_path)
    }

    /// Save the snapshot using an atomic write
    pub fn save(&self, snapshot: &Snapshot) -> StorageResult<()> {
        let bytes = serde_json::to_vec_pretty(snapshot)?;
        atomic_write(&self.path, &bytes)?;
        debug!("Saved {} notes to {:?}", snapshot.notes.len(), self.path);
        Ok(())
    }
}

/// Write data to a file atomically
///
/// 1. Write to a temporary file in the same directory
/// 2. Sync the file to disk
/// 3. Rename the temp file to the target path
///
/// The target file is never left in a partially-written state.
fn atomic_write(path: &Path, data: &[u8]) -> StorageResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| StorageError::CreateDirectory {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let temp_path = temp_path_for(path);

    let result = File::create(&temp_path)
        .and_then(|mut file| {
            file.write_all(data)?;
            file.sync_all()
        })
        .map_err(|e| StorageError::from_io(e, temp_path.clone()));
    if let Err(e) = result {
        let _ = fs::remove_file(&temp_path);
        return Err(e);
    }

    fs::rename(&temp_path, path).map_err(|source| {
        let _ = fs::remove_file(&temp_path);
        StorageError::AtomicWriteFailed {
            from: temp_path.clone(),
            to: path.to_path_buf(),
            source,
        }
    })
}

/// `notes.json` -> `notes.json.tmp`, next to the target
fn temp_path_for(path: &Path) -> PathBuf {
    sibling_with_suffix(path, ".tmp")
}

fn sibling_with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(suffix);
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::TempDir;

    fn note(id: u64, title: &str) -> Note {
        let now = Utc::now();
        Note {
            id,
            title: title.to_string(),
            content: format!("content of {}", title),
            created_at: now,
            updated_at: now,
        }
    }

    fn snapshot_with(notes: &[Note], next_id: u64) -> Snapshot {
        Snapshot {
            notes: notes.iter().map(|n| (n.id, n.clone())).collect(),
            next_id,
        }
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let persistence = SnapshotPersistence::new(temp_dir.path().join("notes.json"));

        assert!(!persistence.exists());
        assert!(persistence.load().unwrap().is_none());

        let snapshot = snapshot_with(&[note(1, "one"), note(3, "three")], 4);
        persistence.save(&snapshot).unwrap();
        assert!(persistence.exists());

        let loaded = persistence.load().unwrap().unwrap();
        assert_eq!(loaded, snapshot);
    }

    #[test]
    fn test_file_layout() {
        let temp_dir = TempDir::new().unwrap();
        let persistence = SnapshotPersistence::new(temp_dir.path().join("notes.json"));

        persistence
            .save(&snapshot_with(&[note(7, "seven")], 8))
            .unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(persistence.path()).unwrap()).unwrap();
        assert_eq!(raw["next_id"], 8);
        assert_eq!(raw["notes"]["7"]["title"], "seven");
        assert!(raw["notes"]["7"]["created_at"].is_string());
        assert!(raw["notes"]["7"]["updated_at"].is_string());
    }

    #[test]
    fn test_empty_file_loads_as_none() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("notes.json");
        fs::write(&path, "  \n").unwrap();

        let persistence = SnapshotPersistence::new(&path);
        assert!(persistence.load().unwrap().is_none());
        assert_eq!(persistence.load_or_default(), Snapshot::default());
    }

    #[test]
    fn test_malformed_file_is_invalid_format() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("notes.json");
        fs::write(&path, "{ not json").unwrap();

        let persistence = SnapshotPersistence::new(&path);
        assert!(matches!(
            persistence.load(),
            Err(StorageError::InvalidFormat { .. })
        ));

        let fallback = persistence.load_or_default();
        assert!(fallback.notes.is_empty());
        assert_eq!(fallback.next_id, 1);
    }

    #[test]
    fn test_malformed_file_is_backed_up() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("notes.json");
        fs::write(&path, "{ not json").unwrap();

        let persistence = SnapshotPersistence::new(&path);
        persistence.load_or_default();

        let backup = temp_dir.path().join("notes.json.corrupt.backup");
        assert_eq!(persistence.backup_path(), backup);
        assert_eq!(fs::read_to_string(&backup).unwrap(), "{ not json");
        assert_eq!(fs::read_to_string(&path).unwrap(), "{ not json");
    }

    #[test]
    fn test_valid_file_is_not_backed_up() {
        let temp_dir = TempDir::new().unwrap();
        let persistence = SnapshotPersistence::new(temp_dir.path().join("notes.json"));
        persistence.save(&snapshot_with(&[note(1, "one")], 2)).unwrap();

        assert_eq!(persistence.load_or_default().notes.len(), 1);
        assert!(!persistence.backup_path().exists());
    }

    #[test]
    fn test_max_id_leaves_no_counter() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("notes.json");
        fs::write(
            &path,
            r#"{
                "notes": {
                    "18446744073709551615": {
                        "id": 18446744073709551615,
                        "title": "last",
                        "content": "",
                        "created_at": "2024-05-01T10:00:00Z",
                        "updated_at": "2024-05-01T10:00:00Z"
                    }
                },
                "next_id": 1
            }"#,
        )
        .unwrap();

        let persistence = SnapshotPersistence::new(&path);
        assert!(matches!(
            persistence.load(),
            Err(StorageError::InvalidFormat { .. })
        ));

        let fallback = persistence.load_or_default();
        assert_eq!(fallback, Snapshot::default());
        assert!(persistence.backup_path().exists());
    }

    #[test]
    fn test_counter_at_limit_loads() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("notes.json");
        fs::write(&path, r#"{"notes": {}, "next_id": 18446744073709551615}"#).unwrap();

        let loaded = SnapshotPersistence::new(&path).load().unwrap().unwrap();
        assert_eq!(loaded.next_id, u64::MAX);
    }

    #[test]
    fn test_naive_timestamps_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("notes.json");
        fs::write(
            &path,
            r#"{
                "notes": {
                    "1": {
                        "id": 1,
                        "title": "old",
                        "content": "kept",
                        "created_at": "2024-05-01T10:00:00.123456",
                        "updated_at": "2024-05-01 10:30:00"
                    }
                },
                "next_id": 2
            }"#,
        )
        .unwrap();

        let persistence = SnapshotPersistence::new(&path);
        let loaded = persistence.load().unwrap().unwrap();
        assert_eq!(loaded.notes[&1].content, "kept");
        assert!(loaded.notes[&1].updated_at > loaded.notes[&1].created_at);
        assert!(!persistence.backup_path().exists());
    }

    #[test]
    fn test_missing_fields_default() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("notes.json");
        fs::write(&path, "{}").unwrap();

        let loaded = SnapshotPersistence::new(&path).load().unwrap().unwrap();
        assert!(loaded.notes.is_empty());
        assert_eq!(loaded.next_id, 1);
    }

    #[test]
    fn test_load_raises_stale_counter() {
        let temp_dir = TempDir::new().unwrap();
        let persistence = SnapshotPersistence::new(temp_dir.path().join("notes.json"));

        persistence
            .save(&snapshot_with(&[note(2, "two"), note(5, "five")], 3))
            .unwrap();

        let loaded = persistence.load().unwrap().unwrap();
        assert_eq!(loaded.next_id, 6);
    }

    #[test]
    fn test_load_takes_id_from_key() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("notes.json");
        fs::write(
            &path,
            r#"{
                "notes": {
                    "4": {
                        "id": 99,
                        "title": "t",
                        "content": "",
                        "created_at": "2024-05-01T10:00:00Z",
                        "updated_at": "2024-05-01T10:00:00Z"
                    }
                },
                "next_id": 5
            }"#,
        )
        .unwrap();

        let loaded = SnapshotPersistence::new(&path).load().unwrap().unwrap();
        assert_eq!(loaded.notes[&4].id, 4);
        assert_eq!(loaded.next_id, 5);
    }

    #[test]
    fn test_save_replaces_previous_contents() {
        let temp_dir = TempDir::new().unwrap();
        let persistence = SnapshotPersistence::new(temp_dir.path().join("notes.json"));

        persistence
            .save(&snapshot_with(&[note(1, "one"), note(2, "two")], 3))
            .unwrap();
        persistence.save(&snapshot_with(&[note(2, "two")], 3)).unwrap();

        let loaded = persistence.load().unwrap().unwrap();
        assert_eq!(loaded.notes.len(), 1);
        assert!(loaded.notes.contains_key(&2));
        assert!(!temp_dir.path().join("notes.json.tmp").exists());
    }

    #[test]
    fn test_atomic_write_creates_parent_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let nested_path = temp_dir.path().join("a").join("b").join("notes.json");

        atomic_write(&nested_path, b"test data").unwrap();

        assert_eq!(fs::read_to_string(&nested_path).unwrap(), "test data");
    }

    #[test]
    fn test_atomic_write_failure_keeps_existing_file() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("blocker");
        fs::write(&blocker, "i am a file").unwrap();

        // Parent of the target is a regular file, so the directory can't be created
        let err = atomic_write(&blocker.join("notes.json"), b"data").unwrap_err();
        assert!(matches!(err, StorageError::CreateDirectory { .. }));
        assert_eq!(fs::read_to_string(&blocker).unwrap(), "i am a file");
    }

    #[test]
    fn test_temp_path_for() {
        assert_eq!(
            temp_path_for(Path::new("/data/notes.json")),
            PathBuf::from("/data/notes.json.tmp")
        );
    }
}
