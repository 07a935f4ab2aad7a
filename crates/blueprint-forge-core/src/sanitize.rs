//! Name sanitizing.
//!
//! Replaces known personal and organisation names with generic
//! placeholders and collapses runs of horizontal whitespace. Patterns are
//! regular expressions matched case-insensitively; organisation patterns
//! run first so that a person pattern never eats part of an organisation
//! name (`NaMo-Hub` must become one placeholder, not two).

use anyhow::{Context, Result};
use regex::{Regex, RegexBuilder};
use std::sync::LazyLock;

pub const GENERIC_PERSON: &str = "Contributor";
pub const GENERIC_ORG: &str = "Organization";

/// Thai names carry no word boundaries, so they are matched bare.
pub const DEFAULT_PERSON_PATTERNS: &[&str] = &[
    r"พี่ไอซ์",
    r"\bNamo\b",
    r"นะโม",
    r"\bIce\b",
    r"\bIced\b",
    r"\bJules team\b",
];

pub const DEFAULT_ORG_PATTERNS: &[&str] = &[r"\bNaMo[- ]?Hub\b", r"\bNamoVerse\b"];

static HORIZONTAL_WS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t]+").expect("horizontal whitespace regex"));

/// Compiled set of replacement patterns.
#[derive(Debug, Clone)]
pub struct Sanitizer {
    person: Vec<Regex>,
    org: Vec<Regex>,
    person_placeholder: String,
    org_placeholder: String,
}

impl Sanitizer {
    pub fn new<S: AsRef<str>>(
        person_patterns: &[S],
        org_patterns: &[S],
        person_placeholder: &str,
        org_placeholder: &str,
    ) -> Result<Self> {
        Ok(Self {
            person: compile_all(person_patterns)?,
            org: compile_all(org_patterns)?,
            person_placeholder: person_placeholder.to_string(),
            org_placeholder: org_placeholder.to_string(),
        })
    }

    /// Sanitize `text`: replace names, collapse spaces/tabs, trim.
    pub fn sanitize(&self, text: &str) -> String {
        let mut out = text.to_string();
        for re in &self.org {
            out = re
                .replace_all(&out, self.org_placeholder.as_str())
                .into_owned();
        }
        for re in &self.person {
            out = re
                .replace_all(&out, self.person_placeholder.as_str())
                .into_owned();
        }
        let collapsed = HORIZONTAL_WS.replace_all(&out, " ");
        collapsed.trim().to_string()
    }
}

impl Default for Sanitizer {
    fn default() -> Self {
        Self::new(
            DEFAULT_PERSON_PATTERNS,
            DEFAULT_ORG_PATTERNS,
            GENERIC_PERSON,
            GENERIC_ORG,
        )
        .expect("default sanitize patterns compile")
    }
}

fn compile_all<S: AsRef<str>>(patterns: &[S]) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|p| {
            RegexBuilder::new(p.as_ref())
                .case_insensitive(true)
                .build()
                .with_context(|| format!("invalid sanitize pattern: {}", p.as_ref()))
        })
        .collect()
}
