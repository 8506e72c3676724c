//! Storage layer
//!
//! Handles the snapshot file that backs a `NoteStore`.
//!
//! The whole store (notes plus the next-identifier counter) is serialized as
//! one JSON document and rewritten on every mutation. Writes go through a
//! temp file and a rename so the previous snapshot survives a failed write.

pub mod error;
pub mod snapshot;

pub use error::{StorageError, StorageResult};
pub use snapshot::{Snapshot, SnapshotPersistence};
