//! Heuristic content classification.
//!
//! [`classify`] maps a block of text to exactly one [`ContentType`] using an
//! ordered list of checks; the first match wins:
//!
//! | Order | Label | Rule |
//! |-------|-------|------|
//! | 1 | `code` | [`code_density`] ≥ [`CODE_DENSITY_THRESHOLD`] |
//! | 2 | `evolution` | evolution, evolve…, canary, kpi(s), drift |
//! | 3 | `prompt` | prompt(s), instruction(s), template(s), persona |
//! | 4 | `architecture` | module(s), interface(s), schema(s), architecture, component(s) |
//! | 5 | `blueprint` | fallback |
//!
//! Keyword checks are case-insensitive and whole-word.

use regex::Regex;
use std::sync::LazyLock;

use crate::models::ContentType;

/// Fraction of non-blank code-like lines at which text counts as code.
pub const CODE_DENSITY_THRESHOLD: f64 = 0.25;

static CODE_LINE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // keyword-prefixed statements
        r"^\s*(?:def|class|import|from|return|fn|let|const|var|function|pub|use|struct|enum|impl|trait|async|await|elif|else|if|for|while|try|except|catch|with|package|public|private|protected|static|void|#include|#define)\b",
        // brace / semicolon punctuation
        r"[{};]\s*$",
        r"^\s*[}\])]",
        // tag-like markup
        r"^\s*</?[A-Za-z][\w:-]*(?:\s[^>]*)?/?>",
        // key: value and key = value
        r#"^\s*["']?[A-Za-z_][\w.-]*["']?\s*(?::\s*\S|=[^=])"#,
    ]
    .iter()
    .map(|p| Regex::new(p).expect("code line regex"))
    .collect()
});

static EVOLUTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:evolution|evolv\w*|canary|kpis?|drift)\b").expect("evolution regex")
});

static PROMPT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:prompts?|instructions?|templates?|persona)\b").expect("prompt regex")
});

static ARCHITECTURE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:modules?|interfaces?|schemas?|architecture|components?)\b")
        .expect("architecture regex")
});

/// True if a single line looks like source code or structured data.
pub fn is_code_line(line: &str) -> bool {
    CODE_LINE_PATTERNS.iter().any(|re| re.is_match(line))
}

/// Fraction of non-blank lines in `text` that look like code.
///
/// Returns `0.0` for text with no non-blank lines.
pub fn code_density(text: &str) -> f64 {
    let mut total = 0usize;
    let mut code = 0usize;
    for line in text.lines().filter(|l| !l.trim().is_empty()) {
        total += 1;
        if is_code_line(line) {
            code += 1;
        }
    }
    if total == 0 {
        return 0.0;
    }
    code as f64 / total as f64
}

pub fn is_code_heavy(text: &str) -> bool {
    code_density(text) >= CODE_DENSITY_THRESHOLD
}

/// Classify `text` into one of the five content types.
pub fn classify(text: &str) -> ContentType {
    if is_code_heavy(text) {
        ContentType::Code
    } else if EVOLUTION_RE.is_match(text) {
        ContentType::Evolution
    } else if PROMPT_RE.is_match(text) {
        ContentType::Prompt
    } else if ARCHITECTURE_RE.is_match(text) {
        ContentType::Architecture
    } else {
        ContentType::Blueprint
    }
}
