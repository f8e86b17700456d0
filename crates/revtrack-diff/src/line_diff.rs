//! Line-level diff: whole-line comparison of two text versions.
//!
//! Uses the `similar` crate (Myers diff algorithm) over lines split on `\n`
//! only. A line carries its own terminator, so `"a"` and `"a\n"` are
//! different lines and a lone `\r` never ends a line.

use similar::{capture_diff_slices, Algorithm, DiffOp, DiffTag};

use crate::segment::{Diff, DiffSegment};

/// Split `text` into lines, each keeping its `\n` terminator.
pub fn split_lines(text: &str) -> Vec<&str> {
    text.split_inclusive('\n').collect()
}

/// Myers diff operations between two line slices.
pub fn diff_line_slices(base: &[&str], revised: &[&str]) -> Vec<DiffOp> {
    capture_diff_slices(Algorithm::Myers, base, revised)
}

/// Compute a line-by-line diff from `base` to `revised`.
///
/// Total and deterministic for any pair of inputs. Identical inputs produce a
/// single equal segment, or no segments when both are empty. Within a
/// replaced region the deleted lines come before the inserted ones.
pub fn compute_diff(base: &str, revised: &str) -> Diff {
    if base == revised {
        return Diff::from_segments([DiffSegment::equal(base)]);
    }

    let base_lines = split_lines(base);
    let revised_lines = split_lines(revised);
    let mut segments = Vec::new();
    for op in diff_line_slices(&base_lines, &revised_lines) {
        let (tag, old_range, new_range) = op.as_tag_tuple();
        let deleted = || base_lines[old_range.clone()].concat();
        let inserted = || revised_lines[new_range.clone()].concat();
        match tag {
            DiffTag::Equal => segments.push(DiffSegment::equal(deleted())),
            DiffTag::Delete => segments.push(DiffSegment::delete(deleted())),
            DiffTag::Insert => segments.push(DiffSegment::insert(inserted())),
            DiffTag::Replace => {
                segments.push(DiffSegment::delete(deleted()));
                segments.push(DiffSegment::insert(inserted()));
            }
        }
    }
    Diff::from_segments(segments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn identical_texts_single_equal_segment() {
        let diff = compute_diff("hello\nworld\n", "hello\nworld\n");
        assert_eq!(diff.segments, vec![DiffSegment::equal("hello\nworld\n")]);
        assert!(diff.is_unchanged());
    }

    #[test]
    fn empty_texts_no_segments() {
        let diff = compute_diff("", "");
        assert!(diff.is_empty());
    }

    #[test]
    fn modified_line_is_delete_then_insert() {
        let diff = compute_diff("line1\nline2\n", "line1\nline2x\n");
        assert_eq!(
            diff.segments,
            vec![
                DiffSegment::equal("line1\n"),
                DiffSegment::delete("line2\n"),
                DiffSegment::insert("line2x\n"),
            ]
        );
    }

    #[test]
    fn empty_to_content() {
        let diff = compute_diff("", "hello\n");
        assert_eq!(diff.segments, vec![DiffSegment::insert("hello\n")]);
    }

    #[test]
    fn content_to_empty() {
        let diff = compute_diff("old content\n", "");
        assert_eq!(diff.segments, vec![DiffSegment::delete("old content\n")]);
    }

    #[test]
    fn appended_line() {
        let diff = compute_diff("line1\nline2\n", "line1\nline2\nline3\n");
        assert_eq!(
            diff.segments,
            vec![
                DiffSegment::equal("line1\nline2\n"),
                DiffSegment::insert("line3\n"),
            ]
        );
        assert_eq!(diff.stats().inserted, 1);
        assert_eq!(diff.stats().deleted, 0);
    }

    #[test]
    fn missing_trailing_newline_is_a_change() {
        let diff = compute_diff("a\nb", "a\nb\n");
        assert_eq!(
            diff.segments,
            vec![
                DiffSegment::equal("a\n"),
                DiffSegment::delete("b"),
                DiffSegment::insert("b\n"),
            ]
        );
    }

    #[test]
    fn unchanged_runs_are_not_fragmented() {
        let base = "a\nb\nc\nd\ne\nf\n";
        let revised = "a\nb\nX\nd\ne\nf\n";
        let diff = compute_diff(base, revised);
        assert_eq!(diff.len(), 4);
        assert_eq!(diff.segments[0], DiffSegment::equal("a\nb\n"));
        assert_eq!(diff.segments[3], DiffSegment::equal("d\ne\nf\n"));
    }

    #[test]
    fn lone_carriage_return_does_not_split_lines() {
        assert_eq!(split_lines("a\rb\nc"), vec!["a\rb\n", "c"]);
        let diff = compute_diff("a\rb\n", "a\rb\nc\n");
        assert_eq!(
            diff.segments,
            vec![DiffSegment::equal("a\rb\n"), DiffSegment::insert("c\n")]
        );
    }

    #[test]
    fn deterministic_for_identical_inputs() {
        let base = "x\ny\nx\ny\n";
        let revised = "y\nx\ny\nx\n";
        assert_eq!(compute_diff(base, revised), compute_diff(base, revised));
    }

    fn lines() -> impl Strategy<Value = String> {
        prop::collection::vec(prop::sample::select(vec!["a\n", "b\n", "c\n", "d", "\n", "\r"]), 0..12)
            .prop_map(|parts| parts.concat())
    }

    proptest! {
        #[test]
        fn sides_reassemble(base in lines(), revised in lines()) {
            let diff = compute_diff(&base, &revised);
            prop_assert_eq!(diff.base_text(), base);
            prop_assert_eq!(diff.revised_text(), revised);
        }

        #[test]
        fn adjacent_segments_differ_in_kind(base in lines(), revised in lines()) {
            let diff = compute_diff(&base, &revised);
            for pair in diff.segments.windows(2) {
                prop_assert_ne!(pair[0].kind, pair[1].kind);
            }
        }
    }
}
