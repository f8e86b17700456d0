//! Creating patches from two texts and applying them in either direction.

use revtrack_diff::{diff_line_slices, split_lines};
use revtrack_types::ContentDigest;
use similar::{group_diff_ops, DiffTag};

use crate::artifact::{Hunk, HunkLine, LineKind, PatchArtifact};
use crate::error::{MismatchKind, PatchError, PatchResult};

/// Which side of the original comparison a patch is applied to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// The known text is the base; the result is the revised text.
    Forward,
    /// The known text is the revised text; the result is the base.
    Reverse,
}

impl Direction {
    fn consumes(self, kind: LineKind) -> bool {
        match self {
            Self::Forward => matches!(kind, LineKind::Context | LineKind::Removed),
            Self::Reverse => matches!(kind, LineKind::Context | LineKind::Added),
        }
    }

    fn emits(self, kind: LineKind) -> bool {
        match self {
            Self::Forward => matches!(kind, LineKind::Context | LineKind::Added),
            Self::Reverse => matches!(kind, LineKind::Context | LineKind::Removed),
        }
    }
}

/// Options for [`make_patch_with`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatchOptions {
    /// Unchanged lines kept around each change.
    pub context_radius: usize,
}

impl Default for PatchOptions {
    fn default() -> Self {
        Self { context_radius: 3 }
    }
}

impl PatchOptions {
    /// Keep every unchanged line, so the revised side can be read back from
    /// the patch alone.
    pub fn full_context() -> Self {
        Self {
            context_radius: usize::MAX,
        }
    }
}

/// Describe the change from `base` to `revised` with default options.
pub fn make_patch(base: &str, revised: &str) -> PatchArtifact {
    make_patch_with(base, revised, &PatchOptions::default())
}

/// Describe the change from `base` to `revised`.
///
/// The result is lossless: applying it forward to `base` yields `revised`
/// byte for byte and applying it in reverse to `revised` yields `base`.
pub fn make_patch_with(base: &str, revised: &str, options: &PatchOptions) -> PatchArtifact {
    let base_digest = ContentDigest::of_text(base);
    let revised_digest = ContentDigest::of_text(revised);
    if base == revised {
        return PatchArtifact {
            base_digest,
            revised_digest,
            hunks: Vec::new(),
        };
    }

    let base_lines = split_lines(base);
    let revised_lines = split_lines(revised);
    let ops = diff_line_slices(&base_lines, &revised_lines);
    let radius = options
        .context_radius
        .min(base_lines.len().max(revised_lines.len()));

    let mut hunks = Vec::new();
    for group in group_diff_ops(ops, radius) {
        let Some(first) = group.first() else {
            continue;
        };
        let mut lines = Vec::new();
        for op in &group {
            let (tag, old_range, new_range) = op.as_tag_tuple();
            let base_run = &base_lines[old_range];
            let revised_run = &revised_lines[new_range];
            let mut push = |kind: LineKind, run: &[&str]| {
                lines.extend(run.iter().map(|line| HunkLine::new(kind, *line)));
            };
            match tag {
                DiffTag::Equal => push(LineKind::Context, base_run),
                DiffTag::Delete => push(LineKind::Removed, base_run),
                DiffTag::Insert => push(LineKind::Added, revised_run),
                DiffTag::Replace => {
                    push(LineKind::Removed, base_run);
                    push(LineKind::Added, revised_run);
                }
            }
        }
        hunks.push(Hunk {
            base_offset: first.old_range().start,
            revised_offset: first.new_range().start,
            lines,
        });
    }

    PatchArtifact {
        base_digest,
        revised_digest,
        hunks,
    }
}

/// Apply `artifact` to `known`, producing the other side of the comparison.
///
/// Fails with [`PatchError::Mismatch`] if `known` is not the side the
/// artifact expects for `direction`, or if the result does not match the
/// recorded digest of the other side.
pub fn apply_patch(artifact: &PatchArtifact, known: &str, direction: Direction) -> PatchResult<String> {
    let (input_digest, output_digest) = match direction {
        Direction::Forward => (artifact.base_digest, artifact.revised_digest),
        Direction::Reverse => (artifact.revised_digest, artifact.base_digest),
    };

    let actual = ContentDigest::of_text(known);
    if actual != input_digest {
        return Err(PatchError::Mismatch(MismatchKind::InputDigest {
            expected: input_digest,
            actual,
        }));
    }

    let source = split_lines(known);
    let mut out = String::with_capacity(known.len());
    let mut cursor = 0usize;

    for (index, hunk) in artifact.hunks.iter().enumerate() {
        let start = match direction {
            Direction::Forward => hunk.base_offset,
            Direction::Reverse => hunk.revised_offset,
        };
        if start < cursor || start > source.len() {
            return Err(PatchError::Mismatch(MismatchKind::HunkOutOfRange {
                hunk: index + 1,
                start: start.saturating_add(1),
                lines: source.len(),
            }));
        }
        source[cursor..start].iter().for_each(|line| out.push_str(line));
        cursor = start;

        for line in &hunk.lines {
            if direction.consumes(line.kind) {
                match source.get(cursor) {
                    Some(actual) if *actual == line.text => cursor += 1,
                    _ => {
                        return Err(PatchError::Mismatch(MismatchKind::Line {
                            hunk: index + 1,
                            line: cursor + 1,
                        }))
                    }
                }
            }
            if direction.emits(line.kind) {
                out.push_str(&line.text);
            }
        }
    }
    source[cursor..].iter().for_each(|line| out.push_str(line));

    let produced = ContentDigest::of_text(&out);
    if produced != output_digest {
        return Err(PatchError::Mismatch(MismatchKind::OutputDigest {
            expected: output_digest,
            actual: produced,
        }));
    }
    Ok(out)
}

/// Rebuild the revised side from the artifact alone.
///
/// Only possible when the hunks record every revised line, as they do for a
/// patch from empty text or one whose context spans the whole document.
/// Fails with [`MismatchKind::Uncovered`] when a gap is found and with
/// [`MismatchKind::OutputDigest`] when lines past the last hunk are missing.
pub fn recover_revised(artifact: &PatchArtifact) -> PatchResult<String> {
    let mut out = String::new();
    let mut next = 0usize;
    for hunk in &artifact.hunks {
        if hunk.revised_offset != next {
            return Err(PatchError::Mismatch(MismatchKind::Uncovered { line: next + 1 }));
        }
        hunk.lines
            .iter()
            .filter(|line| line.kind != LineKind::Removed)
            .for_each(|line| out.push_str(&line.text));
        next += hunk.revised_count();
    }

    let produced = ContentDigest::of_text(&out);
    if produced != artifact.revised_digest {
        return Err(PatchError::Mismatch(MismatchKind::OutputDigest {
            expected: artifact.revised_digest,
            actual: produced,
        }));
    }
    Ok(out)
}

/// Parse `patch_text` and apply it to `known`.
pub fn apply_patch_text(patch_text: &str, known: &str, direction: Direction) -> PatchResult<String> {
    let artifact = PatchArtifact::parse(patch_text)?;
    apply_patch(&artifact, known, direction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn reverse(base: &str, revised: &str) -> String {
        let text = make_patch(base, revised).to_text();
        apply_patch_text(&text, revised, Direction::Reverse).unwrap()
    }

    #[test]
    fn reconstructs_previous_from_current() {
        assert_eq!(reverse("line1\nline2\n", "line1\nline2x\n"), "line1\nline2\n");
    }

    #[test]
    fn forward_yields_revised() {
        let artifact = make_patch("line1\nline2\n", "line1\nline2x\n");
        let out = apply_patch(&artifact, "line1\nline2\n", Direction::Forward).unwrap();
        assert_eq!(out, "line1\nline2x\n");
    }

    #[test]
    fn first_run_baseline() {
        let artifact = make_patch("", "hello\n");
        assert_eq!(artifact.hunks.len(), 1);
        assert_eq!(apply_patch(&artifact, "hello\n", Direction::Reverse).unwrap(), "");
    }

    #[test]
    fn content_removed_entirely() {
        assert_eq!(reverse("gone\nfor good\n", ""), "gone\nfor good\n");
    }

    #[test]
    fn trailing_newline_edges() {
        assert_eq!(reverse("a\nb", "a\nb\n"), "a\nb");
        assert_eq!(reverse("a\nb\n", "a\nb"), "a\nb\n");
        assert_eq!(reverse("x", "y"), "x");
    }

    #[test]
    fn identical_texts_produce_identity_patch() {
        let artifact = make_patch("same\n", "same\n");
        assert!(artifact.is_identity());
        assert_eq!(apply_patch(&artifact, "same\n", Direction::Reverse).unwrap(), "same\n");
    }

    #[test]
    fn far_apart_changes_produce_separate_hunks() {
        let base: String = (1..=20).map(|i| format!("line{i}\n")).collect();
        let revised = base.replace("line2\n", "two\n").replace("line18\n", "eighteen\n");
        let artifact = make_patch(&base, &revised);
        assert_eq!(artifact.hunks.len(), 2);
        assert_eq!(reverse(&base, &revised), base);
    }

    #[test]
    fn context_radius_is_respected() {
        let base: String = (1..=10).map(|i| format!("{i}\n")).collect();
        let revised = base.replace("5\n", "five\n");
        let artifact = make_patch_with(&base, &revised, &PatchOptions { context_radius: 1 });
        let hunk = &artifact.hunks[0];
        assert_eq!(hunk.base_offset, 3);
        assert_eq!(hunk.base_count(), 3);
        assert_eq!(hunk.revised_count(), 3);
    }

    #[test]
    fn wrong_known_text_is_a_mismatch() {
        let artifact = make_patch("v1\n", "v2\n");
        let err = apply_patch(&artifact, "something else\n", Direction::Reverse).unwrap_err();
        assert!(matches!(err, PatchError::Mismatch(MismatchKind::InputDigest { .. })));
    }

    #[test]
    fn direction_matters() {
        let artifact = make_patch("v1\n", "v2\n");
        let err = apply_patch(&artifact, "v1\n", Direction::Reverse).unwrap_err();
        assert!(err.is_mismatch());
    }

    #[test]
    fn tampered_body_is_detected() {
        // Keep the recorded digests but change what the hunk would restore.
        let text = make_patch("keep\nold\n", "keep\nnew\n")
            .to_text()
            .replace("-old\n", "-forged\n");
        let err = apply_patch_text(&text, "keep\nnew\n", Direction::Reverse).unwrap_err();
        assert!(matches!(err, PatchError::Mismatch(MismatchKind::OutputDigest { .. })));
    }

    #[test]
    fn shifted_context_is_detected() {
        let mut artifact = make_patch("a\nb\nc\n", "a\nB\nc\n");
        artifact.hunks[0].revised_offset = 1;
        let err = apply_patch(&artifact, "a\nB\nc\n", Direction::Reverse).unwrap_err();
        assert!(matches!(err, PatchError::Mismatch(MismatchKind::Line { hunk: 1, .. })));
    }

    #[test]
    fn hunk_past_end_is_detected() {
        let mut artifact = make_patch("a\n", "b\n");
        artifact.hunks[0].revised_offset = 5;
        let err = apply_patch(&artifact, "b\n", Direction::Reverse).unwrap_err();
        assert!(matches!(err, PatchError::Mismatch(MismatchKind::HunkOutOfRange { .. })));
    }

    #[test]
    fn garbage_is_malformed_not_a_panic() {
        for garbage in ["", "\n", "@@ -1 +1 @@\n", "revtrack-patch v1\n", "\u{0}\u{1}binary"] {
            let err = apply_patch_text(garbage, "anything\n", Direction::Reverse).unwrap_err();
            assert!(err.is_malformed(), "{garbage:?} gave {err:?}");
        }
    }

    #[test]
    fn huge_hunk_ranges_are_malformed() {
        let digest = ContentDigest::of_text("x\n").to_hex();
        let other = ContentDigest::of_text("y\n").to_hex();
        let headers = [
            "@@ -1,0 +18446744073709551615,2 @@\n+a\n+b\n",
            "@@ -18446744073709551615,1 +1 @@\n-a\n+b\n",
            "@@ -1,0 +1,18446744073709551615 @@\n+a\n",
        ];
        for header in headers {
            let text = format!(
                "revtrack-patch v1\nbase-digest {digest}\nrevised-digest {other}\n--- previous\n+++ current\n\
                 @@ -1 +1 @@\n-x\n+y\n{header}"
            );
            let err = apply_patch_text(&text, "y\n", Direction::Reverse).unwrap_err();
            assert!(err.is_malformed(), "{header:?} gave {err:?}");
        }
    }

    #[test]
    fn full_context_records_every_line() {
        let base: String = (1..=20).map(|i| format!("{i}\n")).collect();
        let revised = base.replace("10\n", "ten\n");
        let artifact = make_patch_with(&base, &revised, &PatchOptions::full_context());
        assert_eq!(artifact.hunks.len(), 1);
        assert_eq!(artifact.hunks[0].base_count(), 20);
        assert_eq!(recover_revised(&artifact).unwrap(), revised);
    }

    #[test]
    fn revised_side_of_baseline_patch_is_recoverable() {
        let artifact = make_patch("", "first\nsecond\n");
        assert_eq!(recover_revised(&artifact).unwrap(), "first\nsecond\n");
    }

    #[test]
    fn sparse_hunks_leave_revised_side_unrecoverable() {
        let base: String = (1..=20).map(|i| format!("{i}\n")).collect();
        let revised = base.replace("10\n", "ten\n");
        let err = recover_revised(&make_patch(&base, &revised)).unwrap_err();
        assert!(matches!(err, PatchError::Mismatch(MismatchKind::Uncovered { line: 1 })));
    }

    #[test]
    fn missing_tail_fails_digest_check() {
        let base: String = (1..=10).map(|i| format!("{i}\n")).collect();
        let revised = base.replace("1\n", "one\n");
        let err = recover_revised(&make_patch(&base, &revised)).unwrap_err();
        assert!(matches!(err, PatchError::Mismatch(MismatchKind::OutputDigest { .. })));
    }

    #[test]
    fn identity_patch_recovers_only_empty_text() {
        assert_eq!(recover_revised(&make_patch("", "")).unwrap(), "");
        assert!(recover_revised(&make_patch("same\n", "same\n")).is_err());
    }

    fn text() -> impl Strategy<Value = String> {
        prop::collection::vec(
            prop::sample::select(vec!["a\n", "b\n", "c\n", "\n", "tail", "x\r\n", "ü\n"]),
            0..16,
        )
        .prop_map(|parts| parts.concat())
    }

    proptest! {
        #[test]
        fn reverse_roundtrip(base in text(), revised in text(), radius in 0usize..4) {
            let artifact = make_patch_with(&base, &revised, &PatchOptions { context_radius: radius });
            let parsed = PatchArtifact::parse(&artifact.to_text()).unwrap();
            prop_assert_eq!(apply_patch(&parsed, &revised, Direction::Reverse).unwrap(), base.clone());
            prop_assert_eq!(apply_patch(&parsed, &base, Direction::Forward).unwrap(), revised);
        }

        #[test]
        fn full_context_records_revised_side(base in text(), revised in text()) {
            prop_assume!(base != revised);
            let artifact = make_patch_with(&base, &revised, &PatchOptions::full_context());
            prop_assert_eq!(recover_revised(&artifact).unwrap(), revised);
        }
    }
}
