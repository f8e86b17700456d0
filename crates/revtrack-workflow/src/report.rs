use std::fmt;

use revtrack_diff::Diff;
use revtrack_types::DocumentId;
use serde::Serialize;

/// Stage of a single calculation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowState {
    Idle,
    ReadingCurrent,
    ResolvingPrevious,
    Diffing,
    Rendering,
    Persisting,
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::ReadingCurrent => "reading-current",
            Self::ResolvingPrevious => "resolving-previous",
            Self::Diffing => "diffing",
            Self::Rendering => "rendering",
            Self::Persisting => "persisting",
        };
        f.write_str(name)
    }
}

/// Where the previous content came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PreviousSource {
    /// No patch was stored; previous is empty.
    Baseline,
    /// Rebuilt from the stored patch and the unchanged current content.
    Reconstructed,
    /// The content recorded by the last calculation, read from the patch.
    LastRecorded,
    /// A patch was stored but unusable; previous is empty.
    Recovered,
}

impl fmt::Display for PreviousSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Baseline => f.write_str("baseline"),
            Self::Reconstructed => f.write_str("reconstructed"),
            Self::LastRecorded => f.write_str("last-recorded"),
            Self::Recovered => f.write_str("recovered"),
        }
    }
}

/// A degraded step that did not abort the calculation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WorkflowWarning {
    #[error("previous version unrecoverable, compared against empty: {reason}")]
    PreviousUnrecoverable { reason: String },

    #[error("presentation failed: {reason}")]
    RenderFailed { reason: String },

    #[error("patch not stored, chain did not advance: {reason}")]
    StorageWriteFailed { reason: String },
}

/// Outcome of one calculation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct WorkflowReport {
    pub document: DocumentId,
    pub previous_source: PreviousSource,
    pub diff: Diff,
    pub warnings: Vec<WorkflowWarning>,
    /// `true` once the new patch is durably stored.
    pub chain_advanced: bool,
    pub patch_path: String,
    /// Every state entered, in order, ending with `Idle`.
    pub states: Vec<WorkflowState>,
}

impl WorkflowReport {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn has_warning(&self, pred: impl Fn(&WorkflowWarning) -> bool) -> bool {
        self.warnings.iter().any(pred)
    }
}
