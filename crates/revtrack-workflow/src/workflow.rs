//! The calculation itself.
//!
//! One invocation walks `ReadingCurrent -> ResolvingPrevious -> Diffing ->
//! Rendering -> Persisting -> Idle`. Only the first step can abort. Every
//! later failure is downgraded to a [`WorkflowWarning`] so the user still
//! sees a diff.
//!
//! The previous version is resolved in order:
//!
//! 1. no stored patch: empty text
//! 2. the patch applies in reverse to the current text: its base side
//! 3. the patch records its whole revised side: that text
//! 4. otherwise: empty text, with a warning
//!
//! Stored patches keep every unchanged line, so step 3 holds for any patch
//! this workflow wrote.

use std::sync::Arc;

use revtrack_diff::{compute_diff, render_split};
use revtrack_patch::{
    apply_patch, make_patch_with, recover_revised, Direction, PatchError, PatchOptions,
};
use revtrack_store::{Host, PatchStore, StoreError};
use revtrack_types::DocumentId;
use tracing::{debug, info, warn};

use crate::config::WorkflowConfig;
use crate::error::{WorkflowError, WorkflowResult};
use crate::guard::InFlightGuard;
use crate::report::{PreviousSource, WorkflowReport, WorkflowState, WorkflowWarning};
use crate::sink::{DiffView, PresentationSink};

/// Previous content together with how it was obtained.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedPrevious {
    pub text: String,
    pub source: PreviousSource,
    pub warning: Option<WorkflowWarning>,
}

impl ResolvedPrevious {
    fn baseline() -> Self {
        Self {
            text: String::new(),
            source: PreviousSource::Baseline,
            warning: None,
        }
    }

    fn recovered(reason: String) -> Self {
        Self {
            text: String::new(),
            source: PreviousSource::Recovered,
            warning: Some(WorkflowWarning::PreviousUnrecoverable { reason }),
        }
    }
}

/// Drives diff calculations for documents on a host.
pub struct RevisionWorkflow {
    host: Arc<dyn Host>,
    store: PatchStore,
    sink: Arc<dyn PresentationSink>,
    config: WorkflowConfig,
    in_flight: InFlightGuard,
}

impl RevisionWorkflow {
    /// Fails if the host places patches under a different suffix than
    /// `config.patch_suffix`.
    pub fn new(
        host: Arc<dyn Host>,
        sink: Arc<dyn PresentationSink>,
        config: WorkflowConfig,
    ) -> WorkflowResult<Self> {
        let sample = DocumentId::new("document.md").map_err(StoreError::from)?;
        let resolved = host.resolve_patch_path(&sample);
        if !resolved.ends_with(&config.patch_suffix) {
            return Err(WorkflowError::SuffixMismatch {
                configured: config.patch_suffix,
                resolved,
            });
        }
        let store = PatchStore::new(Arc::clone(&host));
        Ok(Self {
            host,
            store,
            sink,
            config,
            in_flight: InFlightGuard::new(),
        })
    }

    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    pub fn store(&self) -> &PatchStore {
        &self.store
    }

    /// The guard rejecting overlapping calculations for one document.
    pub fn in_flight(&self) -> &InFlightGuard {
        &self.in_flight
    }

    /// Calculate the diff for whatever document the host reports as active.
    pub async fn calculate_active(&self) -> WorkflowResult<WorkflowReport> {
        let id = self
            .host
            .active_document()
            .await?
            .ok_or(WorkflowError::NoActiveDocument)?;
        self.calculate(&id).await
    }

    /// Calculate the diff for `id` and advance its patch chain.
    pub async fn calculate(&self, id: &DocumentId) -> WorkflowResult<WorkflowReport> {
        let _ticket = self
            .in_flight
            .try_acquire(id)
            .ok_or_else(|| WorkflowError::Busy(id.clone()))?;

        let mut run = Run::new(id);

        run.enter(WorkflowState::ReadingCurrent);
        let current = self.read_current(id).await?;

        run.enter(WorkflowState::ResolvingPrevious);
        let previous = self.resolve_previous(id, &current).await;
        if let Some(warning) = previous.warning.clone() {
            run.warnings.push(warning);
        }

        run.enter(WorkflowState::Diffing);
        let diff = compute_diff(&previous.text, &current);

        run.enter(WorkflowState::Rendering);
        let view = DiffView {
            document: id.clone(),
            markup: self.config.render_markup.then(|| render_split(&diff)),
            diff,
        };
        if let Err(e) = self.sink.render(&view).await {
            warn!(document = %id, error = %e, "presentation failed");
            run.warnings.push(WorkflowWarning::RenderFailed {
                reason: e.to_string(),
            });
        }

        run.enter(WorkflowState::Persisting);
        let artifact = make_patch_with(&previous.text, &current, &PatchOptions::full_context());
        let patch_path = self.store.patch_path(id);
        let chain_advanced = match self.store.save(id, &artifact).await {
            Ok(_) => true,
            Err(e) => {
                warn!(document = %id, path = %patch_path, error = %e, "patch not stored");
                run.warnings.push(WorkflowWarning::StorageWriteFailed {
                    reason: e.to_string(),
                });
                false
            }
        };

        run.enter(WorkflowState::Idle);
        let stats = view.diff.stats();
        info!(
            document = %id,
            source = %previous.source,
            inserted = stats.inserted,
            deleted = stats.deleted,
            warnings = run.warnings.len(),
            chain_advanced,
            "diff calculated"
        );

        Ok(WorkflowReport {
            document: id.clone(),
            previous_source: previous.source,
            diff: view.diff,
            warnings: run.warnings,
            chain_advanced,
            patch_path,
            states: run.states,
        })
    }

    /// Reconstruct the previous version of `id` without storing anything.
    pub async fn previous(&self, id: &DocumentId) -> WorkflowResult<ResolvedPrevious> {
        let current = self.read_current(id).await?;
        Ok(self.resolve_previous(id, &current).await)
    }

    async fn read_current(&self, id: &DocumentId) -> WorkflowResult<String> {
        self.host
            .read_document(id)
            .await?
            .ok_or_else(|| WorkflowError::DocumentNotFound(id.clone()))
    }

    async fn resolve_previous(&self, id: &DocumentId, current: &str) -> ResolvedPrevious {
        let stored = match self.store.load(id).await {
            Ok(Some(stored)) => stored,
            Ok(None) => {
                debug!(document = %id, "no stored patch, using empty baseline");
                return ResolvedPrevious::baseline();
            }
            Err(e) => {
                warn!(document = %id, error = %e, "stored patch unreadable, using empty baseline");
                return ResolvedPrevious::recovered(e.to_string());
            }
        };

        let artifact = match stored.parse() {
            Ok(artifact) => artifact,
            Err(e) => return unusable(id, &stored.path, &e, e.to_string()),
        };

        // Unchanged since the last calculation: show the same change again.
        let reverse_err = match apply_patch(&artifact, current, Direction::Reverse) {
            Ok(text) => {
                return ResolvedPrevious {
                    text,
                    source: PreviousSource::Reconstructed,
                    warning: None,
                }
            }
            Err(e) => e,
        };

        match recover_revised(&artifact) {
            Ok(text) => {
                debug!(document = %id, "document changed, comparing against last recorded version");
                ResolvedPrevious {
                    text,
                    source: PreviousSource::LastRecorded,
                    warning: None,
                }
            }
            Err(recover_err) => {
                let reason = format!(
                    "last recorded version not in patch: {recover_err}; reverse apply: {reverse_err}"
                );
                unusable(id, &stored.path, &recover_err, reason)
            }
        }
    }
}

fn unusable(id: &DocumentId, path: &str, e: &PatchError, reason: String) -> ResolvedPrevious {
    warn!(
        document = %id,
        path = %path,
        malformed = e.is_malformed(),
        error = %reason,
        "stored patch unusable, using empty baseline"
    );
    ResolvedPrevious::recovered(reason)
}

impl std::fmt::Debug for RevisionWorkflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RevisionWorkflow")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Bookkeeping for one invocation.
struct Run<'a> {
    document: &'a DocumentId,
    states: Vec<WorkflowState>,
    warnings: Vec<WorkflowWarning>,
}

impl<'a> Run<'a> {
    fn new(document: &'a DocumentId) -> Self {
        Self {
            document,
            states: Vec::new(),
            warnings: Vec::new(),
        }
    }

    fn enter(&mut self, state: WorkflowState) {
        debug!(document = %self.document, state = %state, "workflow state");
        self.states.push(state);
    }
}
