//! Structural diff values: segments tagged equal, insert or delete.

use serde::{Deserialize, Serialize};

/// How a segment relates the two sides of a comparison.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentKind {
    /// Present in both base and revised.
    Equal,
    /// Present only in the revised text.
    Insert,
    /// Present only in the base text.
    Delete,
}

impl SegmentKind {
    /// Whether this segment contributes to the base side.
    pub fn in_base(self) -> bool {
        matches!(self, Self::Equal | Self::Delete)
    }

    /// Whether this segment contributes to the revised side.
    pub fn in_revised(self) -> bool {
        matches!(self, Self::Equal | Self::Insert)
    }
}

/// A run of whole lines sharing one [`SegmentKind`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffSegment {
    pub kind: SegmentKind,
    /// The lines of the run, each including its line terminator if it had one.
    pub text: String,
}

impl DiffSegment {
    pub fn equal(text: impl Into<String>) -> Self {
        Self {
            kind: SegmentKind::Equal,
            text: text.into(),
        }
    }

    pub fn insert(text: impl Into<String>) -> Self {
        Self {
            kind: SegmentKind::Insert,
            text: text.into(),
        }
    }

    pub fn delete(text: impl Into<String>) -> Self {
        Self {
            kind: SegmentKind::Delete,
            text: text.into(),
        }
    }

    /// Number of lines in the segment; a final unterminated line counts.
    pub fn line_count(&self) -> usize {
        self.text.split_inclusive('\n').count()
    }
}

/// Ordered result of comparing a base text with a revised text.
///
/// Concatenating the equal and delete segments reproduces the base exactly;
/// concatenating the equal and insert segments reproduces the revised text.
/// Adjacent segments never share a kind.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diff {
    pub segments: Vec<DiffSegment>,
}

impl Diff {
    /// Build a diff from segments, merging adjacent runs of the same kind and
    /// dropping empty ones.
    pub fn from_segments(segments: impl IntoIterator<Item = DiffSegment>) -> Self {
        let mut merged: Vec<DiffSegment> = Vec::new();
        for segment in segments {
            if segment.text.is_empty() {
                continue;
            }
            match merged.last_mut() {
                Some(last) if last.kind == segment.kind => last.text.push_str(&segment.text),
                _ => merged.push(segment),
            }
        }
        Self { segments: merged }
    }

    /// Returns `true` if both sides are identical.
    pub fn is_unchanged(&self) -> bool {
        self.segments.iter().all(|s| s.kind == SegmentKind::Equal)
    }

    /// Reassemble the base text.
    pub fn base_text(&self) -> String {
        self.side(SegmentKind::in_base)
    }

    /// Reassemble the revised text.
    pub fn revised_text(&self) -> String {
        self.side(SegmentKind::in_revised)
    }

    /// Line counts per kind.
    pub fn stats(&self) -> DiffStats {
        let mut stats = DiffStats::default();
        for segment in &self.segments {
            let lines = segment.line_count();
            match segment.kind {
                SegmentKind::Equal => stats.unchanged += lines,
                SegmentKind::Insert => stats.inserted += lines,
                SegmentKind::Delete => stats.deleted += lines,
            }
        }
        stats
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DiffSegment> {
        self.segments.iter()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    fn side(&self, keep: fn(SegmentKind) -> bool) -> String {
        self.segments
            .iter()
            .filter(|s| keep(s.kind))
            .map(|s| s.text.as_str())
            .collect()
    }
}

impl<'a> IntoIterator for &'a Diff {
    type Item = &'a DiffSegment;
    type IntoIter = std::slice::Iter<'a, DiffSegment>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments.iter()
    }
}

/// Number of lines in each kind of segment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffStats {
    pub unchanged: usize,
    pub inserted: usize,
    pub deleted: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adjacent_runs_are_merged() {
        let diff = Diff::from_segments(vec![
            DiffSegment::equal("a\n"),
            DiffSegment::equal("b\n"),
            DiffSegment::delete("c\n"),
            DiffSegment::delete("d\n"),
            DiffSegment::insert("e\n"),
        ]);
        assert_eq!(
            diff.segments,
            vec![
                DiffSegment::equal("a\nb\n"),
                DiffSegment::delete("c\nd\n"),
                DiffSegment::insert("e\n"),
            ]
        );
    }

    #[test]
    fn empty_segments_are_dropped() {
        let diff = Diff::from_segments(vec![
            DiffSegment::equal("a\n"),
            DiffSegment::insert(""),
            DiffSegment::equal("b\n"),
        ]);
        assert_eq!(diff.segments, vec![DiffSegment::equal("a\nb\n")]);
    }

    #[test]
    fn sides_are_reassembled() {
        let diff = Diff::from_segments(vec![
            DiffSegment::equal("line1\n"),
            DiffSegment::delete("line2\n"),
            DiffSegment::insert("line2x\n"),
        ]);
        assert_eq!(diff.base_text(), "line1\nline2\n");
        assert_eq!(diff.revised_text(), "line1\nline2x\n");
        assert!(!diff.is_unchanged());
    }

    #[test]
    fn stats_count_lines() {
        let diff = Diff::from_segments(vec![
            DiffSegment::equal("a\nb\n"),
            DiffSegment::delete("c\n"),
            DiffSegment::insert("x\ny"),
        ]);
        assert_eq!(
            diff.stats(),
            DiffStats {
                unchanged: 2,
                inserted: 2,
                deleted: 1,
            }
        );
    }

    #[test]
    fn empty_diff_is_unchanged() {
        let diff = Diff::default();
        assert!(diff.is_unchanged());
        assert!(diff.is_empty());
        assert_eq!(diff.base_text(), "");
    }

    #[test]
    fn kind_serializes_lowercase() {
        let json = serde_json::to_string(&DiffSegment::insert("x\n")).unwrap();
        assert_eq!(json, r#"{"kind":"insert","text":"x\n"}"#);
    }
}
