//! The patch artifact and its on-disk text form.

use std::fmt;
use std::iter::Peekable;
use std::str::SplitInclusive;

use revtrack_types::ContentDigest;

use crate::error::{PatchError, PatchResult};

/// Newest format version this codec reads and the version it writes.
pub const FORMAT_VERSION: u32 = 1;

const MAGIC: &str = "revtrack-patch v";
const BASE_DIGEST_KEY: &str = "base-digest ";
const REVISED_DIGEST_KEY: &str = "revised-digest ";
const BASE_LABEL: &str = "--- previous";
const REVISED_LABEL: &str = "+++ current";
const NO_NEWLINE_MARKER: &str = "\\ No newline at end of file";

/// Largest line number or count accepted in a hunk header.
const MAX_RANGE: usize = u32::MAX as usize;

/// Role of a line inside a hunk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineKind {
    /// Present on both sides.
    Context,
    /// Present only in the base.
    Removed,
    /// Present only in the revised text.
    Added,
}

impl LineKind {
    fn prefix(self) -> char {
        match self {
            Self::Context => ' ',
            Self::Removed => '-',
            Self::Added => '+',
        }
    }

    fn in_base(self) -> bool {
        matches!(self, Self::Context | Self::Removed)
    }

    fn in_revised(self) -> bool {
        matches!(self, Self::Context | Self::Added)
    }
}

/// One line of a hunk, including its terminator if it had one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HunkLine {
    pub kind: LineKind,
    pub text: String,
}

impl HunkLine {
    pub fn new(kind: LineKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

/// A contiguous region of change plus its surrounding context.
///
/// Offsets are 0-based line indices into each side.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Hunk {
    pub base_offset: usize,
    pub revised_offset: usize,
    pub lines: Vec<HunkLine>,
}

impl Hunk {
    /// Number of base lines the hunk spans.
    pub fn base_count(&self) -> usize {
        self.lines.iter().filter(|l| l.kind.in_base()).count()
    }

    /// Number of revised lines the hunk spans.
    pub fn revised_count(&self) -> usize {
        self.lines.iter().filter(|l| l.kind.in_revised()).count()
    }
}

/// A complete, self-describing description of the change from a base text to
/// a revised text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatchArtifact {
    pub base_digest: ContentDigest,
    pub revised_digest: ContentDigest,
    pub hunks: Vec<Hunk>,
}

/// Render a hunk header number: 1-based, or the preceding line for empty spans.
fn header_start(offset: usize, count: usize) -> usize {
    if count == 0 {
        offset
    } else {
        offset + 1
    }
}

impl PatchArtifact {
    /// Returns `true` if base and revised are identical.
    pub fn is_identity(&self) -> bool {
        self.hunks.is_empty() && self.base_digest == self.revised_digest
    }

    /// Serialize to the version 1 text format.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("{MAGIC}{FORMAT_VERSION}\n"));
        out.push_str(&format!("{BASE_DIGEST_KEY}{}\n", self.base_digest.to_hex()));
        out.push_str(&format!("{REVISED_DIGEST_KEY}{}\n", self.revised_digest.to_hex()));
        out.push_str(BASE_LABEL);
        out.push('\n');
        out.push_str(REVISED_LABEL);
        out.push('\n');

        for hunk in &self.hunks {
            let base_count = hunk.base_count();
            let revised_count = hunk.revised_count();
            out.push_str(&format!(
                "@@ -{},{} +{},{} @@\n",
                header_start(hunk.base_offset, base_count),
                base_count,
                header_start(hunk.revised_offset, revised_count),
                revised_count,
            ));
            for line in &hunk.lines {
                out.push(line.kind.prefix());
                out.push_str(&line.text);
                if !line.text.ends_with('\n') {
                    out.push('\n');
                    out.push_str(NO_NEWLINE_MARKER);
                    out.push('\n');
                }
            }
        }
        out
    }

    /// Parse the text format.
    pub fn parse(text: &str) -> PatchResult<Self> {
        let mut reader = LineReader::new(text);

        let (line_no, magic) = reader.expect_line("version tag")?;
        let version = magic
            .strip_prefix(MAGIC)
            .and_then(|v| v.parse::<u32>().ok())
            .ok_or_else(|| PatchError::malformed(line_no, "missing version tag"))?;
        if version == 0 {
            return Err(PatchError::malformed(line_no, "version 0 is not valid"));
        }
        if version > FORMAT_VERSION {
            return Err(PatchError::UnsupportedVersion {
                found: version,
                supported: FORMAT_VERSION,
            });
        }

        let base_digest = reader.expect_digest(BASE_DIGEST_KEY)?;
        let revised_digest = reader.expect_digest(REVISED_DIGEST_KEY)?;

        let (line_no, label) = reader.expect_line("base label")?;
        if !label.starts_with("--- ") {
            return Err(PatchError::malformed(line_no, "expected '--- ' label"));
        }
        let (line_no, label) = reader.expect_line("revised label")?;
        if !label.starts_with("+++ ") {
            return Err(PatchError::malformed(line_no, "expected '+++ ' label"));
        }

        let mut hunks: Vec<Hunk> = Vec::new();
        while let Some((line_no, header)) = reader.next_line()? {
            let hunk = parse_hunk(line_no, header, &mut reader)?;
            if let Some(prev) = hunks.last() {
                let overflow = || PatchError::malformed(line_no, "hunk range overflows");
                let base_end = prev.base_offset.checked_add(prev.base_count()).ok_or_else(overflow)?;
                let revised_end = prev
                    .revised_offset
                    .checked_add(prev.revised_count())
                    .ok_or_else(overflow)?;
                if hunk.base_offset < base_end || hunk.revised_offset < revised_end {
                    return Err(PatchError::malformed(line_no, "hunks overlap or are out of order"));
                }
            }
            hunks.push(hunk);
        }

        if hunks.is_empty() && base_digest != revised_digest {
            return Err(PatchError::malformed(
                reader.line_no,
                "differing digests but no hunks",
            ));
        }

        Ok(Self {
            base_digest,
            revised_digest,
            hunks,
        })
    }
}

impl fmt::Display for PatchArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl std::str::FromStr for PatchArtifact {
    type Err = PatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Iterates newline-terminated lines, tracking 1-based line numbers.
struct LineReader<'a> {
    lines: Peekable<SplitInclusive<'a, char>>,
    line_no: usize,
}

impl<'a> LineReader<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            lines: text.split_inclusive('\n').peekable(),
            line_no: 0,
        }
    }

    /// Next raw line with its terminator; errors on an unterminated line.
    fn next_raw(&mut self) -> PatchResult<Option<(usize, &'a str)>> {
        match self.lines.next() {
            None => Ok(None),
            Some(line) => {
                self.line_no += 1;
                if !line.ends_with('\n') {
                    return Err(PatchError::malformed(self.line_no, "unterminated line"));
                }
                Ok(Some((self.line_no, line)))
            }
        }
    }

    /// Next line without its terminator.
    fn next_line(&mut self) -> PatchResult<Option<(usize, &'a str)>> {
        Ok(self
            .next_raw()?
            .map(|(no, line)| (no, &line[..line.len() - 1])))
    }

    fn expect_line(&mut self, what: &str) -> PatchResult<(usize, &'a str)> {
        self.next_line()?
            .ok_or_else(|| PatchError::malformed(self.line_no + 1, format!("missing {what}")))
    }

    fn expect_digest(&mut self, key: &str) -> PatchResult<ContentDigest> {
        let (line_no, line) = self.expect_line(key.trim_end())?;
        let hex = line
            .strip_prefix(key)
            .ok_or_else(|| PatchError::malformed(line_no, format!("expected '{}'", key.trim_end())))?;
        ContentDigest::from_hex(hex).map_err(|e| PatchError::malformed(line_no, e.to_string()))
    }

    /// Consume the next line if it is the no-newline marker.
    ///
    /// Any other line starting with `\` is malformed.
    fn take_no_newline_marker(&mut self) -> PatchResult<bool> {
        let is_escape = matches!(self.lines.peek(), Some(line) if line.starts_with('\\'));
        if !is_escape {
            return Ok(false);
        }
        match self.next_line()? {
            Some((_, line)) if line == NO_NEWLINE_MARKER => Ok(true),
            Some((line_no, _)) => Err(PatchError::malformed(line_no, "unknown '\\' line")),
            None => Ok(false),
        }
    }
}

/// Parse `-a[,b] +c[,d]` range pairs from a hunk header.
fn parse_range(line_no: usize, range: &str, sign: char) -> PatchResult<(usize, usize)> {
    let body = range
        .strip_prefix(sign)
        .ok_or_else(|| PatchError::malformed(line_no, format!("expected '{sign}' range")))?;
    let (start, count) = match body.split_once(',') {
        Some((start, count)) => (start, count),
        None => (body, "1"),
    };
    let start: usize = start
        .parse()
        .map_err(|_| PatchError::malformed(line_no, format!("bad range start {start:?}")))?;
    let count: usize = count
        .parse()
        .map_err(|_| PatchError::malformed(line_no, format!("bad range count {count:?}")))?;
    if start > MAX_RANGE || count > MAX_RANGE {
        return Err(PatchError::malformed(line_no, "hunk range too large"));
    }
    let offset = if count == 0 {
        start
    } else {
        start
            .checked_sub(1)
            .ok_or_else(|| PatchError::malformed(line_no, "non-empty range starting at line 0"))?
    };
    Ok((offset, count))
}

fn parse_hunk(line_no: usize, header: &str, reader: &mut LineReader<'_>) -> PatchResult<Hunk> {
    let ranges = header
        .strip_prefix("@@ ")
        .and_then(|rest| rest.strip_suffix(" @@"))
        .ok_or_else(|| PatchError::malformed(line_no, "expected hunk header"))?;
    let (base_range, revised_range) = ranges
        .split_once(' ')
        .ok_or_else(|| PatchError::malformed(line_no, "expected two ranges in hunk header"))?;
    let (base_offset, base_count) = parse_range(line_no, base_range, '-')?;
    let (revised_offset, revised_count) = parse_range(line_no, revised_range, '+')?;

    let mut lines: Vec<HunkLine> = Vec::new();
    let mut base_seen = 0usize;
    let mut revised_seen = 0usize;
    while base_seen < base_count || revised_seen < revised_count {
        let (body_no, raw) = reader
            .next_raw()?
            .ok_or_else(|| PatchError::malformed(reader.line_no + 1, "hunk body ends early"))?;
        let kind = match raw.chars().next() {
            Some(' ') => LineKind::Context,
            Some('-') => LineKind::Removed,
            Some('+') => LineKind::Added,
            // Blank context lines are sometimes stripped of their leading space.
            Some('\n') => LineKind::Context,
            _ => return Err(PatchError::malformed(body_no, "unknown line prefix")),
        };
        let mut text = if raw == "\n" { raw.to_string() } else { raw[1..].to_string() };
        if reader.take_no_newline_marker()? {
            text.pop();
        }
        if kind.in_base() {
            base_seen += 1;
        }
        if kind.in_revised() {
            revised_seen += 1;
        }
        if base_seen > base_count || revised_seen > revised_count {
            return Err(PatchError::malformed(body_no, "hunk body longer than its header"));
        }
        lines.push(HunkLine { kind, text });
    }

    Ok(Hunk {
        base_offset,
        revised_offset,
        lines,
    })
}
