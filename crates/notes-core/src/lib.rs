//! Notes Core Library
//!
//! This crate provides the record store behind the `notes` server and CLI:
//! an in-memory map of notes with integer identifiers, paginated and searched
//! views, and optional durability to a single JSON snapshot file.
//!
//! # Quick Start
//!
//! ```text
//! let store = NoteStore::open(Some("notes.json".into()))?;
//!
//! let note = store.create(NewNote::new("Groceries", "milk, eggs"))?;
//! store.update(note.id, NotePatch::title("Shopping"))?;
//!
//! let (page, total) = store.list(0, 10);
//! let hits = store.search("milk");
//! ```
//!
//! # Modules
//!
//! - `store`: The record store (main entry point)
//! - `models`: Note, input types and validation
//! - `storage`: Snapshot file format and atomic persistence
//! - `config`: Application configuration

pub mod config;
pub mod models;
pub mod storage;
pub mod store;

pub use config::Config;
pub use models::{validate_title, NewNote, Note, NotePage, NotePatch, ValidationError};
pub use storage::{Snapshot, SnapshotPersistence, StorageError};
pub use store::{NoteStore, StoreError};
