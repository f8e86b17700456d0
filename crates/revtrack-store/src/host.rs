use async_trait::async_trait;
use revtrack_types::DocumentId;

use crate::error::StoreResult;

/// Suffix appended to a document path to locate its patch.
pub const DEFAULT_PATCH_SUFFIX: &str = ".patch";

/// The application that owns documents and blob storage.
///
/// Implementations must satisfy these invariants:
/// - `read_document` and `read_blob` return `Ok(None)` when nothing exists at
///   the location, and `Err` only for real failures.
/// - `write_blob` replaces the blob atomically: after an `Err` the previous
///   content (or absence) is unchanged.
/// - `resolve_patch_path` is a pure function of the identity.
#[async_trait]
pub trait Host: Send + Sync {
    /// The document the user is currently working on, if any.
    async fn active_document(&self) -> StoreResult<Option<DocumentId>>;

    /// Read the whole current content of a document.
    async fn read_document(&self, id: &DocumentId) -> StoreResult<Option<String>>;

    /// Read a blob by path.
    async fn read_blob(&self, path: &str) -> StoreResult<Option<String>>;

    /// Create or overwrite a blob.
    async fn write_blob(&self, path: &str, text: &str) -> StoreResult<()>;

    /// Where the patch for `id` lives.
    fn resolve_patch_path(&self, id: &DocumentId) -> String;
}
