//! Per-document in-flight guard.
//!
//! Two overlapping calculations for the same document would race to
//! overwrite its stored patch and break the chain. The guard admits at most
//! one invocation per document; a second one is rejected until the first
//! ticket is dropped. Different documents never block each other.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use revtrack_types::DocumentId;

/// Set of documents with a calculation in progress.
#[derive(Clone, Debug, Default)]
pub struct InFlightGuard {
    busy: Arc<Mutex<HashSet<DocumentId>>>,
}

impl InFlightGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `id`, or return `None` if it is already claimed.
    pub fn try_acquire(&self, id: &DocumentId) -> Option<InFlightTicket> {
        let mut busy = self.busy.lock().unwrap_or_else(|e| e.into_inner());
        if !busy.insert(id.clone()) {
            return None;
        }
        Some(InFlightTicket {
            busy: Arc::clone(&self.busy),
            id: id.clone(),
        })
    }

    /// Returns `true` if `id` is currently claimed.
    pub fn is_busy(&self, id: &DocumentId) -> bool {
        self.busy
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(id)
    }
}

/// Releases its document when dropped.
#[derive(Debug)]
pub struct InFlightTicket {
    busy: Arc<Mutex<HashSet<DocumentId>>>,
    id: DocumentId,
}

impl InFlightTicket {
    pub fn document(&self) -> &DocumentId {
        &self.id
    }
}

impl Drop for InFlightTicket {
    fn drop(&mut self) {
        self.busy
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(path: &str) -> DocumentId {
        DocumentId::new(path).unwrap()
    }

    #[test]
    fn second_claim_is_rejected() {
        let guard = InFlightGuard::new();
        let ticket = guard.try_acquire(&doc("a.md")).unwrap();
        assert!(guard.try_acquire(&doc("a.md")).is_none());
        assert!(guard.is_busy(&doc("a.md")));
        assert_eq!(ticket.document(), &doc("a.md"));
    }

    #[test]
    fn drop_releases() {
        let guard = InFlightGuard::new();
        drop(guard.try_acquire(&doc("a.md")).unwrap());
        assert!(!guard.is_busy(&doc("a.md")));
        assert!(guard.try_acquire(&doc("a.md")).is_some());
    }

    #[test]
    fn different_documents_do_not_block() {
        let guard = InFlightGuard::new();
        let _a = guard.try_acquire(&doc("a.md")).unwrap();
        assert!(guard.try_acquire(&doc("b.md")).is_some());
    }

    #[test]
    fn clones_share_state() {
        let guard = InFlightGuard::new();
        let other = guard.clone();
        let _a = guard.try_acquire(&doc("a.md")).unwrap();
        assert!(other.try_acquire(&doc("a.md")).is_none());
    }
}
