//! Revision workflow for revtrack.
//!
//! On each trigger the workflow reconstructs a document's previous version
//! from its current content and stored patch, diffs the two, hands the diff
//! to a presentation sink, and stores a new patch so the next run can do the
//! same. This is the main entry point for applications embedding revtrack.

pub mod config;
pub mod error;
pub mod guard;
pub mod report;
pub mod sink;
pub mod workflow;

pub use config::{ConfigError, WorkflowConfig};
pub use error::{WorkflowError, WorkflowResult};
pub use guard::{InFlightGuard, InFlightTicket};
pub use report::{PreviousSource, WorkflowReport, WorkflowState, WorkflowWarning};
pub use sink::{DiffView, NullSink, PresentationSink, RecordingSink, SinkError};
pub use workflow::{ResolvedPrevious, RevisionWorkflow};

// Re-export key types
pub use revtrack_diff::{Diff, DiffSegment, DiffStats, SegmentKind};
pub use revtrack_store::{FsHost, Host, InMemoryHost, PatchStore};
pub use revtrack_types::DocumentId;
