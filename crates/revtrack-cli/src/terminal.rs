use async_trait::async_trait;
use colored::Colorize;
use revtrack_diff::{Diff, SegmentKind};
use revtrack_workflow::{DiffView, PresentationSink, SinkError};

/// Prints diffs to stdout, one marked line per diff line.
pub struct TerminalSink;

#[async_trait]
impl PresentationSink for TerminalSink {
    async fn render(&self, view: &DiffView) -> Result<(), SinkError> {
        println!("{} {}", "diff".bold(), view.document.as_str().cyan());
        print!("{}", format_diff(&view.diff));
        Ok(())
    }
}

/// `+ `, `- ` or two spaces before every line, colored by kind.
pub fn format_diff(diff: &Diff) -> String {
    let mut out = String::new();
    for segment in diff {
        for line in segment.text.split_inclusive('\n') {
            let body = line.strip_suffix('\n').unwrap_or(line);
            let rendered = match segment.kind {
                SegmentKind::Insert => format!("+ {body}").green().to_string(),
                SegmentKind::Delete => format!("- {body}").red().to_string(),
                SegmentKind::Equal => format!("  {body}").dimmed().to_string(),
            };
            out.push_str(&rendered);
            out.push('\n');
        }
    }
    out
}
