//! Diff engine for revtrack.
//!
//! Computes line-level structural diffs between two versions of a document
//! and renders them as side-by-side markup for a presentation surface.
//!
//! # Key Types
//!
//! - [`Diff`] / [`DiffSegment`] / [`SegmentKind`] -- Ordered equal/insert/delete segments
//! - [`DiffStats`] -- Line counts per segment kind
//! - [`render_split`] -- Split-view markup (old on the left, new on the right)

pub mod line_diff;
pub mod render;
pub mod segment;

pub use line_diff::{compute_diff, diff_line_slices, split_lines};
pub use render::{escape_markup, render_split, render_split_document};
pub use segment::{Diff, DiffSegment, DiffStats, SegmentKind};
