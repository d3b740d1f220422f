//! In-flight tracking per record
//!
//! While a mutation for a record is on the wire, the record is in the
//! processing set and the presentation disables its controls. A second
//! request for the same record is refused rather than queued.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

/// Set of record ids with a request in flight
#[derive(Debug, Clone, Default)]
pub struct ProcessingSet {
    ids: Arc<Mutex<HashSet<String>>>,
}

impl ProcessingSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `id` as in flight
    ///
    /// Returns `None` when it already is. The mark is released when the
    /// returned guard is dropped.
    pub fn begin(&self, id: &str) -> Option<ProcessingGuard> {
        let mut ids = self.ids.lock().unwrap_or_else(PoisonError::into_inner);
        if !ids.insert(id.to_string()) {
            return None;
        }
        Some(ProcessingGuard {
            ids: Arc::clone(&self.ids),
            id: id.to_string(),
        })
    }

    pub fn is_processing(&self, id: &str) -> bool {
        self.ids
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sorted copy of the in-flight ids
    pub fn snapshot(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .ids
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect();
        ids.sort();
        ids
    }
}

/// Releases the in-flight mark on drop
#[derive(Debug)]
pub struct ProcessingGuard {
    ids: Arc<Mutex<HashSet<String>>>,
    id: String,
}

impl ProcessingGuard {
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl Drop for ProcessingGuard {
    fn drop(&mut self) {
        self.ids
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.id);
    }
}
