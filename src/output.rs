//! Output naming and writing.
//!
//! [`resolve_output_path`] picks a file name that never overwrites a
//! different record: the plain stem when free, then a hash-suffixed name,
//! then numbered variants. A candidate that already holds the same content
//! hash is reused, so re-running over unchanged input lands on the same
//! files. Writes go through a temp file in the target directory followed by
//! a rename.

use anyhow::{Context, Result};
use blueprint_forge_core::hashing::{hash_text, short_hash};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Hex characters of the content hash used in suffixed names.
const HASH_SUFFIX_LEN: usize = 8;

/// File stem reduced to `[A-Za-z0-9_.-]`. Non-ASCII characters are
/// dropped; other runs become a single `_`. Falls back to `blueprint_<hash8>` when nothing usable remains.
pub fn safe_stem(stem: &str) -> String {
    let mut out = String::with_capacity(stem.len());
    for c in stem.chars().filter(char::is_ascii) {
        let keep = c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-');
        let next = if keep { c } else { '_' };
        if next == '_' && out.ends_with('_') {
            continue;
        }
        out.push(next);
    }
    let trimmed = out.trim_matches(|c| c == '_' || c == '.');
    if trimmed.is_empty() {
        format!("blueprint_{}", short_hash(&hash_text(stem), HASH_SUFFIX_LEN))
    } else {
        trimmed.to_string()
    }
}

/// Stem for one segment's output: multi-segment sources get `_NN`.
pub fn segment_stem(stem: &str, index: usize, count: usize) -> String {
    if count > 1 {
        format!("{}_{:02}", stem, index)
    } else {
        stem.to_string()
    }
}

pub fn resolve_output_path(dir: &Path, stem: &str, ext: &str, content_hash: &str) -> PathBuf {
    let usable = |p: &Path| !p.exists() || stored_hash(p).as_deref() == Some(content_hash);

    let plain = dir.join(format!("{}.{}", stem, ext));
    if usable(&plain) {
        return plain;
    }

    let short = short_hash(content_hash, HASH_SUFFIX_LEN);
    let hashed = dir.join(format!("{}_{}.{}", stem, short, ext));
    if usable(&hashed) {
        return hashed;
    }

    let mut n = 2usize;
    loop {
        let candidate = dir.join(format!("{}_{}_{}.{}", stem, short, n, ext));
        if usable(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

/// Content hash recorded in an existing output, if it can be read.
pub fn stored_hash(path: &Path) -> Option<String> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let text = std::fs::read_to_string(path).ok()?;
    match ext.as_str() {
        "json" => json_hash(&text),
        "md" => front_matter_hash(&text),
        _ => None,
    }
}

fn json_hash(text: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(text).ok()?;
    let meta = value.get("metadata")?;
    meta.get("content_hash")
        .and_then(|v| v.as_str())
        .or_else(|| meta.get("source_hash").and_then(|v| v.as_str()))
        .map(str::to_string)
}

fn front_matter_hash(text: &str) -> Option<String> {
    let mut lines = text.lines();
    if lines.next()?.trim() != "---" {
        return None;
    }
    for line in lines {
        let line = line.trim();
        if line == "---" {
            break;
        }
        if let Some(rest) = line.strip_prefix("content_hash:") {
            let value = rest.trim().trim_matches('"');
            if !value.is_empty() {
                return Some(value.to_string());
            }
        }
    }
    None
}

/// Write `contents` to `path` via a sibling temp file and rename.
pub fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory {}", dir.display()))?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temp file in {}", dir.display()))?;
    tmp.write_all(contents.as_bytes())
        .with_context(|| format!("Failed to write {}", path.display()))?;
    tmp.flush()?;
    tmp.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("Failed to move output into place: {}", path.display()))?;
    Ok(())
}
