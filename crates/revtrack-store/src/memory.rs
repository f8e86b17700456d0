use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use revtrack_types::DocumentId;

use crate::error::{StoreError, StoreResult};
use crate::host::{Host, DEFAULT_PATCH_SUFFIX};

/// In-memory, HashMap-based host.
///
/// Intended for tests and embedding. Documents and blobs share one path
/// namespace, as files do on a real host. Reads and writes can be made to
/// fail on demand to exercise error handling.
pub struct InMemoryHost {
    files: RwLock<HashMap<String, String>>,
    active: RwLock<Option<DocumentId>>,
    patch_suffix: String,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl InMemoryHost {
    /// Create an empty host using [`DEFAULT_PATCH_SUFFIX`].
    pub fn new() -> Self {
        Self::with_suffix(DEFAULT_PATCH_SUFFIX)
    }

    /// Create an empty host with a custom patch suffix.
    pub fn with_suffix(suffix: impl Into<String>) -> Self {
        Self {
            files: RwLock::new(HashMap::new()),
            active: RwLock::new(None),
            patch_suffix: suffix.into(),
            fail_reads: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
            writes: AtomicUsize::new(0),
        }
    }

    /// Create or replace a document's content.
    pub fn put_document(&self, id: &DocumentId, text: impl Into<String>) {
        self.files
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(id.as_str().to_string(), text.into());
    }

    /// Remove a file, returning `true` if it existed.
    pub fn remove(&self, path: &str) -> bool {
        self.files
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(path)
            .is_some()
    }

    /// Current content at `path`, bypassing failure injection.
    pub fn get(&self, path: &str) -> Option<String> {
        self.files
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(path)
            .cloned()
    }

    /// Set or clear the active document.
    pub fn set_active(&self, id: Option<DocumentId>) {
        *self.active.write().unwrap_or_else(|e| e.into_inner()) = id;
    }

    /// Make every subsequent blob read fail.
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent blob write fail.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful blob writes so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Number of files held.
    pub fn len(&self) -> usize {
        self.files.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Returns `true` if the host holds no files.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryHost {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Host for InMemoryHost {
    async fn active_document(&self) -> StoreResult<Option<DocumentId>> {
        let active = self
            .active
            .read()
            .map_err(|e| StoreError::Unavailable(format!("lock poisoned: {e}")))?;
        Ok(active.clone())
    }

    async fn read_document(&self, id: &DocumentId) -> StoreResult<Option<String>> {
        let files = self
            .files
            .read()
            .map_err(|e| StoreError::Unavailable(format!("lock poisoned: {e}")))?;
        Ok(files.get(id.as_str()).cloned())
    }

    async fn read_blob(&self, path: &str) -> StoreResult<Option<String>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(format!("read of {path} refused")));
        }
        let files = self
            .files
            .read()
            .map_err(|e| StoreError::Unavailable(format!("lock poisoned: {e}")))?;
        Ok(files.get(path).cloned())
    }

    async fn write_blob(&self, path: &str, text: &str) -> StoreResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(format!("write of {path} refused")));
        }
        let mut files = self
            .files
            .write()
            .map_err(|e| StoreError::Unavailable(format!("lock poisoned: {e}")))?;
        files.insert(path.to_string(), text.to_string());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn resolve_patch_path(&self, id: &DocumentId) -> String {
        id.with_suffix(&self.patch_suffix)
    }
}

impl std::fmt::Debug for InMemoryHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryHost")
            .field("file_count", &self.len())
            .field("patch_suffix", &self.patch_suffix)
            .finish()
    }
}
