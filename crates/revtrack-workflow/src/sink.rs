use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use revtrack_diff::Diff;
use revtrack_types::DocumentId;
use serde::Serialize;

/// What a presentation surface receives for one calculation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DiffView {
    pub document: DocumentId,
    pub diff: Diff,
    /// Split-view markup, when the workflow is configured to render it.
    pub markup: Option<String>,
}

/// A surface failed to show a diff.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("render failed: {0}")]
pub struct SinkError(pub String);

/// Anything that can show a diff to the user.
#[async_trait]
pub trait PresentationSink: Send + Sync {
    async fn render(&self, view: &DiffView) -> Result<(), SinkError>;
}

/// Discards every view.
pub struct NullSink;

#[async_trait]
impl PresentationSink for NullSink {
    async fn render(&self, _view: &DiffView) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Keeps every rendered view in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
    views: Mutex<Vec<DiffView>>,
    fail: AtomicBool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent render fail.
    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// All views rendered so far, oldest first.
    pub fn views(&self) -> Vec<DiffView> {
        self.views.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// The most recently rendered view.
    pub fn last(&self) -> Option<DiffView> {
        self.views
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .last()
            .cloned()
    }
}

#[async_trait]
impl PresentationSink for RecordingSink {
    async fn render(&self, view: &DiffView) -> Result<(), SinkError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(SinkError("surface unavailable".into()));
        }
        self.views
            .lock()
            .map_err(|e| SinkError(format!("lock poisoned: {e}")))?
            .push(view.clone());
        Ok(())
    }
}
