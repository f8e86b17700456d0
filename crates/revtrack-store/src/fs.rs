//! Filesystem-backed host rooted at a directory.
//!
//! Blob writes go to a temporary file in the destination directory which is
//! then renamed over the target, so a crash or I/O error never leaves a
//! half-written patch behind.

use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use async_trait::async_trait;
use revtrack_types::DocumentId;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::host::{Host, DEFAULT_PATCH_SUFFIX};

/// A host serving documents and blobs from a directory tree.
///
/// Every path is resolved relative to the root after normalization, so
/// nothing outside the root can be read or written.
#[derive(Debug)]
pub struct FsHost {
    root: PathBuf,
    patch_suffix: String,
    active: RwLock<Option<DocumentId>>,
}

impl FsHost {
    /// Open a host rooted at `root` using [`DEFAULT_PATCH_SUFFIX`].
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_suffix(root, DEFAULT_PATCH_SUFFIX)
    }

    /// Open a host rooted at `root` with a custom patch suffix.
    pub fn with_suffix(root: impl Into<PathBuf>, suffix: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            patch_suffix: suffix.into(),
            active: RwLock::new(None),
        }
    }

    /// The root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Mark `id` as the document the user is working on.
    pub fn set_active(&self, id: Option<DocumentId>) {
        *self.active.write().unwrap_or_else(|e| e.into_inner()) = id;
    }

    /// Absolute location of a logical path.
    pub fn locate(&self, path: &str) -> StoreResult<PathBuf> {
        let normalized = DocumentId::new(path)?;
        Ok(self.root.join(normalized.as_str()))
    }

    async fn read_text(&self, path: &str) -> StoreResult<Option<String>> {
        let location = self.locate(path)?;
        match tokio::fs::read(&location).await {
            Ok(bytes) => String::from_utf8(bytes)
                .map(Some)
                .map_err(|_| StoreError::InvalidUtf8(path.to_string())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::io(path, e)),
        }
    }
}

/// Write `text` to `target` through a sibling temporary file.
fn write_atomic(target: &Path, text: &str) -> std::io::Result<()> {
    let dir = target.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir)?;
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(text.as_bytes())?;
    tmp.as_file().sync_all()?;
    tmp.persist(target).map_err(|e| e.error)?;
    Ok(())
}

#[async_trait]
impl Host for FsHost {
    async fn active_document(&self) -> StoreResult<Option<DocumentId>> {
        let active = self
            .active
            .read()
            .map_err(|e| StoreError::Unavailable(format!("lock poisoned: {e}")))?;
        Ok(active.clone())
    }

    async fn read_document(&self, id: &DocumentId) -> StoreResult<Option<String>> {
        self.read_text(id.as_str()).await
    }

    async fn read_blob(&self, path: &str) -> StoreResult<Option<String>> {
        self.read_text(path).await
    }

    async fn write_blob(&self, path: &str, text: &str) -> StoreResult<()> {
        let target = self.locate(path)?;
        let text = text.to_string();
        let dest = target.clone();
        tokio::task::spawn_blocking(move || write_atomic(&dest, &text))
            .await
            .map_err(|e| StoreError::Unavailable(format!("write task failed: {e}")))?
            .map_err(|e| StoreError::io(path, e))?;
        debug!(path = %target.display(), "blob written");
        Ok(())
    }

    fn resolve_patch_path(&self, id: &DocumentId) -> String {
        id.with_suffix(&self.patch_suffix)
    }
}
