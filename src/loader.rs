//! Source discovery and loading.
//!
//! Walks the input directory with `walkdir`, keeps files whose extension is
//! on the allow-list and that no exclude glob matches, and returns them in
//! sorted order. Loading reads bytes once and runs them through a
//! [`TextExtractor`]; extraction failures degrade to empty text.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::PipelineConfig;
use crate::extract::{DocumentKind, TextExtractor};

/// Size and modification time, read before any bytes are loaded.
#[derive(Debug, Clone, Copy)]
pub struct SourceStat {
    pub bytes: u64,
    pub modified: Option<DateTime<Utc>>,
}

/// A source document read once per run.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub stat: SourceStat,
    pub text: String,
}

pub struct Discovery<'a> {
    pub input_dir: &'a Path,
    pub extensions: &'a [String],
    pub exclude_globs: &'a [String],
    pub recursive: bool,
    /// 0 means no limit.
    pub max_files: usize,
}

impl<'a> Discovery<'a> {
    pub fn from_config(config: &'a PipelineConfig) -> Self {
        Self {
            input_dir: &config.input_dir,
            extensions: &config.extensions,
            exclude_globs: &config.exclude_globs,
            recursive: config.recursive,
            max_files: config.max_files,
        }
    }
}

pub fn discover_sources(discovery: &Discovery<'_>) -> Result<Vec<PathBuf>> {
    let root = discovery.input_dir;
    if !root.is_dir() {
        bail!("Input directory does not exist: {}", root.display());
    }

    let exclude_set = build_globset(discovery.exclude_globs)?;
    let extensions: Vec<String> = discovery
        .extensions
        .iter()
        .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
        .collect();

    let mut walker = WalkDir::new(root).min_depth(1);
    if !discovery.recursive {
        walker = walker.max_depth(1);
    }

    let mut paths = Vec::new();
    for entry in walker {
        let entry = entry.with_context(|| format!("Failed to scan {}", root.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let ext = match path.extension().and_then(|e| e.to_str()) {
            Some(e) => e.to_ascii_lowercase(),
            None => continue,
        };
        if !extensions.contains(&ext) || DocumentKind::from_path(path).is_none() {
            continue;
        }

        let relative = path.strip_prefix(root).unwrap_or(path);
        if exclude_set.is_match(relative) {
            continue;
        }

        paths.push(path.to_path_buf());
    }

    paths.sort();
    if discovery.max_files > 0 {
        paths.truncate(discovery.max_files);
    }
    Ok(paths)
}

pub fn stat_source(path: &Path) -> Result<SourceStat> {
    let meta =
        std::fs::metadata(path).with_context(|| format!("Failed to stat {}", path.display()))?;
    Ok(SourceStat {
        bytes: meta.len(),
        modified: meta.modified().ok().map(DateTime::<Utc>::from),
    })
}

/// Reads and extracts a source already stat'ed. I/O errors propagate;
/// extraction errors are logged and yield empty text.
pub fn read_source(path: &Path, stat: SourceStat, extractor: &dyn TextExtractor) -> Result<SourceFile> {
    let raw = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;

    let text = match DocumentKind::from_path(path) {
        Some(kind) => extractor.extract(&raw, kind).unwrap_or_else(|e| {
            tracing::warn!(path = %path.display(), error = %e, "extraction failed");
            String::new()
        }),
        None => String::new(),
    };

    Ok(SourceFile { stat, text })
}

pub fn load_source(path: &Path, extractor: &dyn TextExtractor) -> Result<SourceFile> {
    read_source(path, stat_source(path)?, extractor)
}

/// `path` relative to `root` with forward slashes; unchanged when it lies
/// outside `root`.
pub fn relative_path(path: &Path, root: &Path) -> String {
    let stripped = match (path.canonicalize(), root.canonicalize()) {
        (Ok(p), Ok(r)) => p.strip_prefix(&r).map(Path::to_path_buf).ok(),
        _ => None,
    };
    let shown = stripped.unwrap_or_else(|| path.strip_prefix(root).unwrap_or(path).to_path_buf());
    shown.to_string_lossy().replace('\\', "/")
}

pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(
            Glob::new(pattern).with_context(|| format!("Invalid exclude glob: {}", pattern))?,
        );
    }
    Ok(builder.build()?)
}
