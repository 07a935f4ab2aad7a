//! Run manifest and audit log.
//!
//! The manifest is a single JSON document written at the end of a run with
//! one [`FileResult`] per source. The audit log is append-only JSON lines,
//! one entry per source per run, so it accumulates history across runs.

use anyhow::{Context, Result};
use blueprint_forge_core::hashing::hash_identifier;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;

use crate::output::write_atomic;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    Ok,
    Skipped,
    DryRun,
    Error,
}

impl FileStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileStatus::Ok => "ok",
            FileStatus::Skipped => "skipped",
            FileStatus::DryRun => "dry_run",
            FileStatus::Error => "error",
        }
    }
}

/// Outcome for one source document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileResult {
    pub source_file: String,
    pub source_name: String,
    pub source_hash: String,
    pub segment_count: usize,
    pub status: FileStatus,
    pub output_files: Vec<String>,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
    pub duration_ms: u64,
}

impl FileResult {
    pub fn new(source_file: String, source_name: String) -> Self {
        Self {
            source_file,
            source_name,
            source_hash: String::new(),
            segment_count: 0,
            status: FileStatus::Error,
            output_files: Vec::new(),
            warnings: Vec::new(),
            errors: Vec::new(),
            duration_ms: 0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunCounts {
    pub total_files: usize,
    pub success: usize,
    pub failed: usize,
    pub skipped: usize,
    pub dry_run: usize,
    pub warnings: usize,
    pub errors: usize,
    pub segments: usize,
}

impl RunCounts {
    pub fn tally(results: &[FileResult]) -> Self {
        let mut counts = RunCounts {
            total_files: results.len(),
            ..Default::default()
        };
        for r in results {
            match r.status {
                FileStatus::Ok => counts.success += 1,
                FileStatus::Error => counts.failed += 1,
                FileStatus::Skipped => counts.skipped += 1,
                FileStatus::DryRun => counts.dry_run += 1,
            }
            counts.warnings += r.warnings.len();
            counts.errors += r.errors.len();
            counts.segments += r.segment_count;
        }
        counts
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    pub run_id: String,
    pub pipeline: String,
    pub pipeline_version: String,
    pub schema_version: String,
    pub input_dir: String,
    pub output_dir: String,
    pub started_at: String,
    pub finished_at: String,
    pub counts: RunCounts,
    pub files: Vec<FileResult>,
}

/// RFC 3339 UTC with second precision.
pub fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

impl RunManifest {
    pub fn write(&self, path: &Path) -> Result<()> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        write_atomic(path, &json)
            .with_context(|| format!("Failed to write manifest {}", path.display()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub run_id: String,
    pub source_id: String,
    pub source_hash: String,
    pub status: FileStatus,
    pub timestamp: String,
}

/// Append one line per result to the JSONL audit log at `path`.
pub fn append_audit_log(path: &Path, run_id: &str, results: &[FileResult]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open audit log {}", path.display()))?;

    let now = timestamp(Utc::now());
    let mut buf = String::new();
    for r in results {
        let entry = AuditEntry {
            run_id: run_id.to_string(),
            source_id: hash_identifier(&r.source_file),
            source_hash: r.source_hash.clone(),
            status: r.status,
            timestamp: now.clone(),
        };
        buf.push_str(&serde_json::to_string(&entry)?);
        buf.push('\n');
    }
    file.write_all(buf.as_bytes())
        .with_context(|| format!("Failed to append audit log {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(name: &str, status: FileStatus, warnings: usize, segments: usize) -> FileResult {
        FileResult {
            status,
            segment_count: segments,
            warnings: vec!["w".to_string(); warnings],
            source_hash: "h".into(),
            ..FileResult::new(format!("framework/{}", name), name.to_string())
        }
    }

    #[test]
    fn tally_counts_statuses() {
        let results = vec![
            result("a", FileStatus::Ok, 0, 3),
            result("b", FileStatus::Skipped, 1, 0),
            result("c", FileStatus::Error, 0, 1),
            result("d", FileStatus::DryRun, 2, 2),
        ];
        let counts = RunCounts::tally(&results);
        assert_eq!(counts.total_files, 4);
        assert_eq!(counts.success, 1);
        assert_eq!(counts.skipped, 1);
        assert_eq!(counts.failed, 1);
        assert_eq!(counts.dry_run, 1);
        assert_eq!(counts.warnings, 3);
        assert_eq!(counts.segments, 6);
    }

    #[test]
    fn status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&FileStatus::DryRun).unwrap(),
            "\"dry_run\""
        );
    }

    #[test]
    fn audit_log_appends() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("logs/audit.jsonl");
        let results = vec![result("a", FileStatus::Ok, 0, 1)];
        append_audit_log(&path, "run-1", &results).unwrap();
        append_audit_log(&path, "run-2", &results).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let entry: AuditEntry = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(entry.run_id, "run-2");
        assert_eq!(entry.source_id, hash_identifier("framework/a"));
        assert_eq!(entry.source_id.len(), 16);
    }
}
