//! Core data models shared by the segmenter, classifier, and pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Heuristic classification label for a segment of source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Code,
    Evolution,
    Prompt,
    Architecture,
    Blueprint,
}

impl ContentType {
    pub const ALL: [ContentType; 5] = [
        ContentType::Code,
        ContentType::Evolution,
        ContentType::Prompt,
        ContentType::Architecture,
        ContentType::Blueprint,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Code => "code",
            ContentType::Evolution => "evolution",
            ContentType::Prompt => "prompt",
            ContentType::Architecture => "architecture",
            ContentType::Blueprint => "blueprint",
        }
    }

    /// Audience label attached to records of this type.
    pub fn role(&self) -> &'static str {
        match self {
            ContentType::Code => "engineering",
            ContentType::Evolution => "evolution",
            ContentType::Prompt => "prompt-engineering",
            ContentType::Architecture => "architect",
            ContentType::Blueprint => "product",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ContentType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown content type: '{}'", s))
    }
}

/// An ordered slice of a source document's sanitized text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// 1-based position among the segments of the same source.
    pub index: usize,
    /// Total number of segments produced from the source.
    pub count: usize,
    /// Heading text that opened this segment, if any.
    pub title: Option<String>,
    pub content: String,
    /// SHA-256 hex digest of `content`.
    pub content_hash: String,
    pub content_type: ContentType,
}
