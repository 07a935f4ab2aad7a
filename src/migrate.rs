//! Schema migration for existing blueprint records.
//!
//! [`migrate_blueprint`] rewrites one record into the current shape: missing
//! required sections get a placeholder, required metadata gets defaults,
//! unknown top-level keys are dropped, and `schema_version` is forced to the
//! target. The transform is idempotent, and a record the pipeline just wrote
//! comes back unchanged.
//!
//! [`run_migrate`] applies it to every `*.json` in a directory. Nothing is
//! written unless `apply` is set.

use anyhow::{bail, Context, Result};
use blueprint_forge_core::hashing::{hash_text, short_hash};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

use crate::blueprint::{BRAND, OPTIONAL_METADATA, OPTIONAL_SECTIONS, REQUIRED_SECTIONS};
use crate::config::MigrateConfig;
use crate::extract::DefaultExtractor;
use crate::loader::load_source;
use crate::manifest::timestamp;
use crate::output::write_atomic;

#[derive(Debug, Clone)]
pub struct MigrateOptions {
    pub schema_version: String,
    /// Used only when a record has no `pipeline_version`.
    pub pipeline_version: String,
    pub placeholder: String,
    /// Re-read `metadata.source_file` to recompute missing hashes.
    pub use_source: bool,
    /// Relative `source_file` values resolve against this directory.
    pub repo_root: PathBuf,
}

impl MigrateOptions {
    pub fn from_config(config: &MigrateConfig, repo_root: &Path) -> Self {
        Self {
            schema_version: config.schema_version.clone(),
            pipeline_version: config.pipeline_version.clone(),
            placeholder: config.placeholder.clone(),
            use_source: false,
            repo_root: repo_root.to_path_buf(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    pub placeholders_added: usize,
    pub source_read: usize,
    /// Top-level keys that were absent and got a default.
    pub fields_added: usize,
}

/// Python-style truthiness: null, false, 0, and empty strings or
/// containers count as missing.
fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

fn pick<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    map.get(key).filter(|v| truthy(v))
}

fn pick_or(map: &Map<String, Value>, key: &str, default: impl Into<Value>) -> Value {
    pick(map, key).cloned().unwrap_or_else(|| default.into())
}

fn non_blank(value: Option<&Value>) -> Option<&str> {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
}

/// Text the source hash is computed from when a record lacks one.
fn fallback_source_text(doc: &Map<String, Value>) -> String {
    if let Some(Value::String(content)) = doc.get("content") {
        return content.clone();
    }
    match doc.get("sections") {
        Some(Value::Object(sections)) => match sections.get("executive_summary") {
            Some(Value::String(summary)) => summary.clone(),
            _ => serde_json::to_string(sections).unwrap_or_default(),
        },
        _ => serde_json::to_string(doc).unwrap_or_default(),
    }
}

fn read_source(source_file: &str, opts: &MigrateOptions) -> Option<(String, Option<DateTime<Utc>>)> {
    let path = Path::new(source_file);
    let path = if path.is_absolute() {
        path.to_path_buf()
    } else {
        opts.repo_root.join(path)
    };
    if !path.is_file() {
        return None;
    }
    let source = load_source(&path, &DefaultExtractor).ok()?;
    let text = source.text.trim().to_string();
    (!text.is_empty()).then_some((text, source.stat.modified))
}

pub fn migrate_blueprint(doc: &Value, path: &Path, opts: &MigrateOptions) -> (Value, MigrationReport) {
    let empty = Map::new();
    let data = doc.as_object().unwrap_or(&empty);
    let mut report = MigrationReport::default();

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let file_stem = path
        .file_stem()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let old_sections = data.get("sections").and_then(Value::as_object).unwrap_or(&empty);
    let mut sections = Map::new();
    for key in REQUIRED_SECTIONS {
        match non_blank(old_sections.get(key)) {
            Some(_) => {
                sections.insert(key.to_string(), old_sections[key].clone());
            }
            None => {
                sections.insert(key.to_string(), Value::String(opts.placeholder.clone()));
                report.placeholders_added += 1;
            }
        }
    }
    for key in OPTIONAL_SECTIONS {
        if non_blank(old_sections.get(key)).is_some() {
            sections.insert(key.to_string(), old_sections[key].clone());
        }
    }

    let mut metadata = data
        .get("metadata")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();

    let source_file = match pick(&metadata, "source_file") {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => format!("blueprints/{}", file_name),
    };
    let source_name = match pick(&metadata, "source_name") {
        Some(v) => v.clone(),
        None => Value::String(
            Path::new(&source_file)
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| file_name.clone()),
        ),
    };

    let mut source_text = None;
    if opts.use_source {
        if let Some((text, modified)) = read_source(&source_file, opts) {
            report.source_read += 1;
            if !metadata.contains_key("source_mtime") {
                if let Some(m) = modified {
                    metadata.insert("source_mtime".into(), Value::String(timestamp(m)));
                }
            }
            source_text = Some(text);
        }
    }
    let source_text = source_text.unwrap_or_else(|| fallback_source_text(data));

    let source_hash = pick_or(&metadata, "source_hash", hash_text(&source_text));
    let source_bytes = match metadata.get("source_bytes") {
        Some(v) if v.is_u64() => v.clone(),
        _ => Value::from(source_text.len() as u64),
    };

    let mut new_metadata = Map::new();
    new_metadata.insert("author".into(), pick_or(&metadata, "author", "Unknown"));
    new_metadata.insert("language".into(), pick_or(&metadata, "language", "en"));
    new_metadata.insert("source_file".into(), Value::String(source_file));
    new_metadata.insert("source_name".into(), source_name);
    new_metadata.insert("source_hash".into(), source_hash);
    new_metadata.insert("source_bytes".into(), source_bytes);
    new_metadata.insert(
        "last_updated".into(),
        pick_or(&metadata, "last_updated", Utc::now().date_naive().to_string()),
    );
    new_metadata.insert("pipeline".into(), pick_or(&metadata, "pipeline", "unknown"));
    new_metadata.insert(
        "pipeline_version".into(),
        pick_or(&metadata, "pipeline_version", opts.pipeline_version.as_str()),
    );
    for key in OPTIONAL_METADATA {
        if let Some(v) = metadata.get(key) {
            new_metadata.insert(key.to_string(), v.clone());
        }
    }

    let mut out = Map::new();
    out.insert(
        "schema_version".into(),
        Value::String(opts.schema_version.clone()),
    );
    out.insert(
        "id".into(),
        pick_or(
            data,
            "id",
            format!("BP-{}", short_hash(&hash_text(&file_name), 8)),
        ),
    );
    out.insert("brand".into(), pick_or(data, "brand", BRAND));
    out.insert("title".into(), pick_or(data, "title", file_stem));
    out.insert("slogan".into(), pick_or(data, "slogan", ""));
    out.insert("meta_definition".into(), pick_or(data, "meta_definition", ""));
    out.insert(
        "tags".into(),
        match data.get("tags") {
            Some(v @ Value::Array(_)) => v.clone(),
            _ => Value::Array(Vec::new()),
        },
    );
    out.insert("sections".into(), Value::Object(sections));
    out.insert(
        "visual_identity".into(),
        match data.get("visual_identity") {
            Some(v @ Value::Object(_)) => v.clone(),
            _ => Value::Object(Map::new()),
        },
    );
    out.insert("status".into(), pick_or(data, "status", "draft"));
    out.insert("version".into(), pick_or(data, "version", "0.1"));
    out.insert("metadata".into(), Value::Object(new_metadata));

    report.fields_added = out.keys().filter(|k| !data.contains_key(*k)).count();
    (Value::Object(out), report)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MigrationSummary {
    pub total: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub errors: usize,
    pub placeholders_added: usize,
    pub source_read: usize,
}

/// Migrate every `*.json` in `input_dir` (names starting with `_` are
/// skipped). Errors only when the directory is missing or the report cannot
/// be written; unreadable records are counted in `errors`.
pub fn run_migrate(
    input_dir: &Path,
    opts: &MigrateOptions,
    max_files: usize,
    apply: bool,
    report_path: Option<&Path>,
) -> Result<MigrationSummary> {
    if !input_dir.is_dir() {
        bail!("Input directory not found: {}", input_dir.display());
    }

    let mut files: Vec<PathBuf> = std::fs::read_dir(input_dir)
        .with_context(|| format!("Failed to read {}", input_dir.display()))?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && is_record_file(p))
        .collect();
    files.sort();
    if max_files > 0 {
        files.truncate(max_files);
    }

    let mut summary = MigrationSummary {
        total: files.len(),
        ..Default::default()
    };

    for path in &files {
        let original: Value = match std::fs::read_to_string(path)
            .map_err(anyhow::Error::from)
            .and_then(|text| Ok(serde_json::from_str(&text)?))
        {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "cannot read record");
                summary.errors += 1;
                continue;
            }
        };

        let (migrated, report) = migrate_blueprint(&original, path, opts);
        summary.placeholders_added += report.placeholders_added;
        summary.source_read += report.source_read;

        if migrated == original {
            summary.unchanged += 1;
            continue;
        }
        summary.updated += 1;
        tracing::info!(path = %path.display(), fields_added = report.fields_added, "record needs migration");

        if apply {
            let mut json = serde_json::to_string_pretty(&migrated)?;
            json.push('\n');
            if let Err(e) = write_atomic(path, &json) {
                tracing::warn!(path = %path.display(), error = %e, "write failed");
                summary.errors += 1;
            }
        }
    }

    if let Some(report) = report_path {
        let mut json = serde_json::to_string_pretty(&summary)?;
        json.push('\n');
        write_atomic(report, &json)
            .with_context(|| format!("Failed to write report {}", report.display()))?;
    }

    Ok(summary)
}

/// `*.json` not starting with `_`.
pub fn is_record_file(path: &Path) -> bool {
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    let hidden = path
        .file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.starts_with('_'))
        .unwrap_or(true);
    is_json && !hidden
}
