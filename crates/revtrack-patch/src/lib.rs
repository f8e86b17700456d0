//! Patch codec for revtrack.
//!
//! A [`PatchArtifact`] describes how to turn one text version (the base) into
//! another (the revised text). It is stored as a self-describing, versioned
//! unified-diff text and can be applied in either direction:
//!
//! - [`Direction::Forward`] -- base in, revised out
//! - [`Direction::Reverse`] -- revised in, base out
//!
//! Both sides' digests are recorded in the artifact, so applying a patch to
//! the wrong text fails with [`PatchError::Mismatch`] instead of producing
//! plausible but wrong output. When the hunks happen to record every revised
//! line, [`recover_revised`] rebuilds the revised side without any input.
//!
//! # Format (version 1)
//!
//! ```text
//! revtrack-patch v1
//! base-digest <hex>
//! revised-digest <hex>
//! --- previous
//! +++ current
//! @@ -1,2 +1,2 @@
//!  line1
//! -line2
//! +line2x
//! ```
//!
//! A `\ No newline at end of file` line after a body line marks that line as
//! unterminated.

pub mod artifact;
pub mod codec;
pub mod error;

pub use artifact::{Hunk, HunkLine, LineKind, PatchArtifact, FORMAT_VERSION};
pub use codec::{
    apply_patch, apply_patch_text, make_patch, make_patch_with, recover_revised, Direction,
    PatchOptions,
};
pub use error::{MismatchKind, PatchError, PatchResult};
