//! Record store
//!
//! The `NoteStore` is the authoritative in-memory state for all notes:
//! - assigns identifiers from a counter that never goes backwards
//! - serves paginated and searched views, newest first
//! - rewrites the snapshot file (if configured) after every mutation
//!
//! ## Concurrency
//!
//! A single `RwLock` guards the state. Reads share it; a mutation holds the
//! write lock across both the in-memory change and the file write, so readers
//! never see a half-applied mutation and writers never interleave on disk.
//!
//! ## Usage
//!
//! ```ignore
//! let store = NoteStore::open(config.data_file.clone());
//!
//! let note = store.create(NewNote::new("Title", "Body"))?;
//! let page = store.list(0, 10);
//! ```

use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use chrono::Utc;
use parking_lot::RwLock;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::{timestamp_after, NewNote, Note, NotePatch, ValidationError};
use crate::storage::{Snapshot, SnapshotPersistence, StorageError};

/// Errors returned by mutating store operations
///
/// "Not found" is not an error: lookups return `Option`, deletes return `bool`.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Input violates a field constraint
    #[error("Invalid note: {0}")]
    Validation(#[from] ValidationError),

    /// The id counter has reached `u64::MAX`
    #[error("No note ids left to assign")]
    IdsExhausted,

    /// The snapshot could not be written; the in-memory change was rolled back
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// In-memory note store with optional snapshot persistence
pub struct NoteStore {
    state: RwLock<Snapshot>,
    persistence: Option<SnapshotPersistence>,
}

impl NoteStore {
    /// A store that never touches the filesystem
    pub fn in_memory() -> Self {
        Self {
            state: RwLock::new(Snapshot::default()),
            persistence: None,
        }
    }

    /// Open a store, restoring from `data_file` when given
    ///
    /// Never fails: a missing, empty or corrupt file starts an empty store.
    pub fn open(data_file: Option<PathBuf>) -> Self {
        match data_file {
            Some(path) => Self::with_persistence(SnapshotPersistence::new(path)),
            None => Self::in_memory(),
        }
    }

    /// Open a store backed by the given snapshot file
    pub fn with_persistence(persistence: SnapshotPersistence) -> Self {
        let snapshot = persistence.load_or_default();
        info!(
            "Opened note store at {:?} ({} notes, next id {})",
            persistence.path(),
            snapshot.notes.len(),
            snapshot.next_id
        );
        Self {
            state: RwLock::new(snapshot),
            persistence: Some(persistence),
        }
    }

    /// Path of the backing file, if any
    pub fn data_file(&self) -> Option<&Path> {
        self.persistence.as_ref().map(SnapshotPersistence::path)
    }

    // ==================== Mutations ====================

    /// Create a note with a fresh id
    pub fn create(&self, input: NewNote) -> Result<Note, StoreError> {
        input.validate()?;

        let mut state = self.state.write();
        let id = state.next_id;
        let next_id = id.checked_add(1).ok_or(StoreError::IdsExhausted)?;
        let now = Utc::now();
        let note = Note {
            id,
            title: input.title,
            content: input.content,
            created_at: now,
            updated_at: now,
        };

        state.notes.insert(id, note.clone());
        state.next_id = next_id;

        if let Err(e) = self.persist(&state) {
            state.notes.remove(&id);
            state.next_id = id;
            return Err(e.into());
        }

        debug!(id, "Created note");
        Ok(note)
    }

    /// Apply a partial update
    ///
    /// Returns `Ok(None)` if no note has this id. An empty patch returns the
    /// note as is, without refreshing `updated_at` or writing the snapshot.
    pub fn update(&self, id: u64, patch: NotePatch) -> Result<Option<Note>, StoreError> {
        patch.validate()?;

        let mut state = self.state.write();
        let Some(note) = state.notes.get_mut(&id) else {
            return Ok(None);
        };

        if patch.is_empty() {
            return Ok(Some(note.clone()));
        }

        let previous = note.clone();
        note.apply(patch);
        note.updated_at = timestamp_after(previous.updated_at);
        let updated = note.clone();

        if let Err(e) = self.persist(&state) {
            state.notes.insert(id, previous);
            return Err(e.into());
        }

        debug!(id, "Updated note");
        Ok(Some(updated))
    }

    /// Delete a note
    ///
    /// Returns `Ok(false)` if no note has this id.
    pub fn delete(&self, id: u64) -> Result<bool, StoreError> {
        let mut state = self.state.write();
        let Some(removed) = state.notes.remove(&id) else {
            return Ok(false);
        };

        if let Err(e) = self.persist(&state) {
            state.notes.insert(id, removed);
            return Err(e.into());
        }

        debug!(id, "Deleted note");
        Ok(true)
    }

    // ==================== Queries ====================

    /// Get a note by id
    pub fn get(&self, id: u64) -> Option<Note> {
        self.state.read().notes.get(&id).cloned()
    }

    /// One page of notes, newest first, plus the total number of notes
    pub fn list(&self, skip: usize, limit: usize) -> (Vec<Note>, usize) {
        let state = self.state.read();
        let total = state.notes.len();

        let mut notes: Vec<&Note> = state.notes.values().collect();
        notes.sort_by(|a, b| newest_first(a, b));

        let page = notes.into_iter().skip(skip).take(limit).cloned().collect();
        (page, total)
    }

    /// Notes whose title or content contains `query`, ignoring case
    ///
    /// Plain substring match, newest first. An empty query matches every
    /// note; callers that don't want that must reject it first.
    pub fn search(&self, query: &str) -> Vec<Note> {
        let needle = query.to_lowercase();
        let state = self.state.read();

        let mut hits: Vec<&Note> = state
            .notes
            .values()
            .filter(|note| note.matches(&needle))
            .collect();
        hits.sort_by(|a, b| newest_first(a, b));

        hits.into_iter().cloned().collect()
    }

    /// Number of notes
    pub fn count(&self) -> usize {
        self.state.read().notes.len()
    }

    /// The id the next created note will get
    pub fn next_id(&self) -> u64 {
        self.state.read().next_id
    }

    fn persist(&self, snapshot: &Snapshot) -> Result<(), StorageError> {
        let Some(persistence) = &self.persistence else {
            return Ok(());
        };
        persistence.save(snapshot).map_err(|e| {
            match e.recovery_suggestion() {
                Some(hint) => warn!("Failed to persist notes: {}. {}", e, hint),
                None => warn!("Failed to persist notes: {}", e),
            }
            e
        })
    }
}

/// `created_at` descending, then `id` descending
fn newest_first(a: &Note, b: &Note) -> Ordering {
    b.created_at
        .cmp(&a.created_at)
        .then_with(|| b.id.cmp(&a.id))
}
