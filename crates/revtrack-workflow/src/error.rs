use revtrack_types::DocumentId;
use thiserror::Error;

/// Errors that abort a workflow invocation before anything is persisted.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("no active document")]
    NoActiveDocument,

    #[error("document not found: {0}")]
    DocumentNotFound(DocumentId),

    #[error("a calculation for {0} is already running")]
    Busy(DocumentId),

    #[error("host stores patches at {resolved}, not under suffix {configured:?}")]
    SuffixMismatch { configured: String, resolved: String },

    #[error("host error: {0}")]
    Host(#[from] revtrack_store::StoreError),
}

pub type WorkflowResult<T> = Result<T, WorkflowError>;
