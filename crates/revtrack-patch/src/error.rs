//! Error types for the patch codec.

use revtrack_types::ContentDigest;

/// Errors that can occur while parsing or applying a patch.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatchError {
    /// The artifact text could not be parsed.
    #[error("malformed patch at line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    /// The artifact was written by a newer format version.
    #[error("unsupported patch format version {found} (newest supported is {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },

    /// The artifact does not describe the text it was applied to.
    #[error("patch does not match text: {0}")]
    Mismatch(MismatchKind),
}

impl PatchError {
    pub(crate) fn malformed(line: usize, reason: impl Into<String>) -> Self {
        Self::Malformed {
            line,
            reason: reason.into(),
        }
    }

    /// Returns `true` if the artifact itself is unreadable.
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Malformed { .. } | Self::UnsupportedVersion { .. })
    }

    /// Returns `true` if the artifact is readable but belongs to other content.
    pub fn is_mismatch(&self) -> bool {
        matches!(self, Self::Mismatch(_))
    }
}

/// Where a well-formed patch disagreed with the text it was applied to.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MismatchKind {
    /// The known side's digest differs from the one recorded in the artifact.
    #[error("input digest {actual:?} differs from recorded {expected:?}")]
    InputDigest {
        expected: ContentDigest,
        actual: ContentDigest,
    },

    /// A hunk starts beyond the end of the text or before the previous hunk ended.
    #[error("hunk {hunk} starts at line {start} outside the text ({lines} lines)")]
    HunkOutOfRange {
        hunk: usize,
        start: usize,
        lines: usize,
    },

    /// A context or consumed line differs from the text at its position.
    #[error("hunk {hunk} expects different content at line {line}")]
    Line { hunk: usize, line: usize },

    /// The hunks do not record the revised text from `line` onwards.
    #[error("revised line {line} is not recorded in the patch")]
    Uncovered { line: usize },

    /// The reconstructed text does not hash to the recorded digest.
    #[error("output digest {actual:?} differs from recorded {expected:?}")]
    OutputDigest {
        expected: ContentDigest,
        actual: ContentDigest,
    },
}

/// Convenience alias for patch results.
pub type PatchResult<T> = Result<T, PatchError>;
