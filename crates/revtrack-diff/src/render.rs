//! Split-view markup for a [`Diff`].
//!
//! The left column shows the base side (equal and deleted runs), the right
//! column the revised side (equal and inserted runs). Every fragment is a
//! `div` tagged with the class of its segment kind, its text escaped and its
//! line breaks made explicit as `<br>`.

use crate::segment::{Diff, SegmentKind};

/// Stylesheet matching the class names emitted by [`render_split`].
const SPLIT_STYLE: &str = "\
.split-diff-container { display: flex; justify-content: space-between; }
.split-diff-left, .split-diff-right { width: 48%; }
.diff-insert { background-color: #e6ffe6; text-decoration: none; }
.diff-delete { background-color: #ffe6e6; text-decoration: line-through; }
.diff-equal { background-color: none; text-decoration: none; }
";

/// Escape the five markup-significant characters.
pub fn escape_markup(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            c => out.push(c),
        }
    }
    out
}

fn class_name(kind: SegmentKind) -> &'static str {
    match kind {
        SegmentKind::Equal => "diff-equal",
        SegmentKind::Insert => "diff-insert",
        SegmentKind::Delete => "diff-delete",
    }
}

fn render_column(diff: &Diff, keep: fn(SegmentKind) -> bool) -> String {
    diff.iter()
        .filter(|segment| keep(segment.kind))
        .map(|segment| {
            let body = escape_markup(&segment.text).replace('\n', "<br>");
            format!("<div class=\"{}\">{}</div>", class_name(segment.kind), body)
        })
        .collect()
}

/// Render the side-by-side markup for a diff.
pub fn render_split(diff: &Diff) -> String {
    format!(
        "<div class=\"split-diff-container\">\
         <div class=\"split-diff-left\">{}</div>\
         <div class=\"split-diff-right\">{}</div>\
         </div>",
        render_column(diff, SegmentKind::in_base),
        render_column(diff, SegmentKind::in_revised),
    )
}

/// Render a standalone HTML document with the split view and its stylesheet.
pub fn render_split_document(diff: &Diff, title: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{}</title>\n<style>\n{}</style>\n</head>\n<body>\n{}\n</body>\n</html>\n",
        escape_markup(title),
        SPLIT_STYLE,
        render_split(diff),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute_diff;

    #[test]
    fn escapes_all_special_characters() {
        assert_eq!(
            escape_markup(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#039;Jerry&#039;&lt;/a&gt;"
        );
    }

    #[test]
    fn modified_line_split_columns() {
        let diff = compute_diff("line1\nline2\n", "line1\nline2x\n");
        let html = render_split(&diff);

        let left_start = html.find("split-diff-left").unwrap();
        let right_start = html.find("split-diff-right").unwrap();
        let left = &html[left_start..right_start];
        let right = &html[right_start..];

        assert!(left.contains("<div class=\"diff-equal\">line1<br></div>"));
        assert!(left.contains("<div class=\"diff-delete\">line2<br></div>"));
        assert!(!left.contains("diff-insert"));

        assert!(right.contains("<div class=\"diff-equal\">line1<br></div>"));
        assert!(right.contains("<div class=\"diff-insert\">line2x<br></div>"));
        assert!(!right.contains("diff-delete"));
    }

    #[test]
    fn content_is_escaped_in_fragments() {
        let diff = compute_diff("", "<script>\n");
        let html = render_split(&diff);
        assert!(html.contains("&lt;script&gt;<br>"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn empty_diff_renders_empty_columns() {
        let html = render_split(&compute_diff("", ""));
        assert!(html.contains("<div class=\"split-diff-left\"></div>"));
        assert!(html.contains("<div class=\"split-diff-right\"></div>"));
    }

    #[test]
    fn document_carries_stylesheet_and_title() {
        let diff = compute_diff("a\n", "b\n");
        let doc = render_split_document(&diff, "notes/<a>.md");
        assert!(doc.starts_with("<!DOCTYPE html>"));
        assert!(doc.contains("text-decoration: line-through"));
        assert!(doc.contains("<title>notes/&lt;a&gt;.md</title>"));
        assert!(doc.contains("split-diff-container"));
    }
}
