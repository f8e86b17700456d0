//! One patch artifact per document, stored through the host.

use std::sync::Arc;

use revtrack_patch::{PatchArtifact, PatchResult};
use revtrack_types::DocumentId;
use tracing::debug;

use crate::error::StoreResult;
use crate::host::Host;

/// A patch as read back from storage, not yet parsed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredPatch {
    /// Where the patch was read from.
    pub path: String,
    /// The raw artifact text.
    pub text: String,
}

impl StoredPatch {
    /// Parse the stored text.
    pub fn parse(&self) -> PatchResult<PatchArtifact> {
        PatchArtifact::parse(&self.text)
    }
}

/// Associates exactly one patch artifact with each document.
///
/// The location of a document's patch is derived from its identity by the
/// host. The store keeps no state of its own.
#[derive(Clone)]
pub struct PatchStore {
    host: Arc<dyn Host>,
}

impl PatchStore {
    pub fn new(host: Arc<dyn Host>) -> Self {
        Self { host }
    }

    /// Where the patch for `id` is stored.
    pub fn patch_path(&self, id: &DocumentId) -> String {
        self.host.resolve_patch_path(id)
    }

    /// Load the stored patch for `id`.
    ///
    /// Returns `Ok(None)` when no patch has been saved yet. An existing but
    /// empty blob is returned as-is and will fail to parse.
    pub async fn load(&self, id: &DocumentId) -> StoreResult<Option<StoredPatch>> {
        let path = self.patch_path(id);
        let text = self.host.read_blob(&path).await?;
        debug!(document = %id, path = %path, found = text.is_some(), "patch loaded");
        Ok(text.map(|text| StoredPatch { path, text }))
    }

    /// Store `artifact` as the patch for `id`, replacing any previous one.
    pub async fn save(&self, id: &DocumentId, artifact: &PatchArtifact) -> StoreResult<String> {
        let path = self.patch_path(id);
        let text = artifact.to_text();
        self.host.write_blob(&path, &text).await?;
        debug!(document = %id, path = %path, bytes = text.len(), "patch saved");
        Ok(path)
    }
}

impl std::fmt::Debug for PatchStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatchStore").finish_non_exhaustive()
    }
}
