//! Insertion-ordered record store with last-write-wins deduplication.
//!
//! Within one source file, value records are keyed by parameter name plus
//! condition string; a repeated key overwrites the earlier record, so only
//! the last occurrence of a condition combination survives. Records move
//! to the final output sequence when the file ends and are append-only
//! afterwards.

use crate::app::models::DataObject;
use indexmap::IndexMap;

/// Insertion-ordered mapping from dedup key to value record
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    entries: IndexMap<String, DataObject>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record under its dedup key. Returns `true` when an earlier
    /// record was overwritten (a repeated condition combination).
    pub fn insert(&mut self, key: String, record: DataObject) -> bool {
        self.entries.insert(key, record).is_some()
    }

    /// Move all stored records into the output sequence in insertion
    /// order and clear the store
    pub fn flush_into(&mut self, output: &mut Vec<DataObject>) {
        output.extend(self.entries.drain(..).map(|(_, record)| record));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
