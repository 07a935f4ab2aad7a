//! Heading-driven text segmenter.
//!
//! Splits sanitized document text into [`Segment`]s at heading-like lines.
//! Each segment receives its 1-based index, the total count, the heading
//! that opened it, a SHA-256 content hash, and a content-type label from
//! [`classify`](crate::classify::classify).
//!
//! # Algorithm
//!
//! 1. Measure the text's code density. At or above the threshold the text is
//!    treated as code-heavy.
//! 2. A line is a candidate header when it is non-empty, at most
//!    [`MAX_HEADER_CHARS`] characters, and is one of:
//!    a numbered `Set/Part/Module/Phase/Section` marker, a numbered list
//!    item, or a markdown heading with 1–3 `#` marks.
//! 3. In code-heavy text only markdown headings count; numbered items are
//!    too easily confused with code.
//! 4. Every confirmed header after the first line closes the current segment
//!    and opens a new one that starts with the header line.
//! 5. If that yields at most one segment, the whole text becomes a single
//!    untitled segment.
//!
//! # Guarantees
//!
//! - Empty or whitespace-only text yields no segments.
//! - Otherwise at least one segment, indices `1..=count`.
//! - Segment contents joined with `\n` reproduce the input's lines.

use regex::Regex;
use std::sync::LazyLock;

use crate::classify::{classify, is_code_heavy};
use crate::hashing::hash_text;
use crate::models::Segment;

/// Longest line (in characters) still considered a heading.
pub const MAX_HEADER_CHARS: usize = 140;

static MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:set|part|module|phase|section)\s*[-#:]?\s*\d+\b").expect("marker regex")
});

static NUMBERED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{1,3}[.)]\s+\S").expect("numbered item regex"));

static MARKDOWN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#{1,3}\s+\S").expect("markdown heading regex"));

/// Which heading rule a line matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderKind {
    Marker,
    Numbered,
    Markdown,
}

/// Classify a line as a candidate header, if it is one.
pub fn header_kind(line: &str) -> Option<HeaderKind> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.chars().count() > MAX_HEADER_CHARS {
        return None;
    }
    if MARKDOWN_RE.is_match(trimmed) {
        Some(HeaderKind::Markdown)
    } else if MARKER_RE.is_match(trimmed) {
        Some(HeaderKind::Marker)
    } else if NUMBERED_RE.is_match(trimmed) {
        Some(HeaderKind::Numbered)
    } else {
        None
    }
}

/// Heading text with markdown `#` marks and surrounding whitespace removed.
pub fn header_title(line: &str) -> String {
    line.trim().trim_start_matches('#').trim().to_string()
}

/// Split `text` into segments. See the module docs for the rules.
pub fn segment_text(text: &str) -> Vec<Segment> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let code_heavy = is_code_heavy(text);
    let mut drafts: Vec<(Option<String>, Vec<&str>)> = Vec::new();
    let mut title: Option<String> = None;
    let mut buf: Vec<&str> = Vec::new();

    for (i, line) in text.lines().enumerate() {
        let confirmed = match header_kind(line) {
            Some(HeaderKind::Markdown) => true,
            Some(_) => !code_heavy,
            None => false,
        };
        if confirmed {
            // Blank-only preambles roll forward into the next segment.
            if i > 0 && buf.iter().any(|l| !l.trim().is_empty()) {
                drafts.push((title.take(), std::mem::take(&mut buf)));
            }
            title = Some(header_title(line));
        }
        buf.push(line);
    }
    drafts.push((title, buf));

    if drafts.len() <= 1 {
        let whole = text.lines().collect::<Vec<_>>().join("\n");
        return vec![make_segment(1, 1, None, whole)];
    }

    let count = drafts.len();
    drafts
        .into_iter()
        .enumerate()
        .map(|(i, (title, lines))| make_segment(i + 1, count, title, lines.join("\n")))
        .collect()
}

/// Wrap the whole text in a single untitled segment, bypassing heading
/// detection. Returns `None` for blank text.
pub fn whole_document(text: &str) -> Option<Segment> {
    if text.trim().is_empty() {
        return None;
    }
    let whole = text.lines().collect::<Vec<_>>().join("\n");
    Some(make_segment(1, 1, None, whole))
}

fn make_segment(index: usize, count: usize, title: Option<String>, content: String) -> Segment {
    Segment {
        index,
        count,
        title,
        content_hash: hash_text(&content),
        content_type: classify(&content),
        content,
    }
}
