//! The document-to-blueprint pipeline.
//!
//! [`PipelineRunner::run`] discovers sources, processes each one
//! independently, and writes the run manifest. Per file:
//!
//! 1. size check against `max_bytes`
//! 2. load and extract text
//! 3. sanitize, then optionally redact PII
//! 4. hash the raw text and collect source metadata
//! 5. segment (or take the whole document in `single` mode)
//! 6. per segment: resolve the output path, skip if unchanged, build,
//!    enrich, render, and write atomically
//!
//! A failure inside one file is recorded in its [`FileResult`] and never
//! stops the run. With more than one worker, files are spread over a rayon
//! pool and only path resolution plus writing is serialized by the
//! runner's output lock.

use anyhow::{Context, Result};
use blueprint_forge_core::hashing::{hash_identifier, hash_text};
use blueprint_forge_core::models::Segment;
use blueprint_forge_core::pii::{contains_pii, redact_pii};
use blueprint_forge_core::sanitize::Sanitizer;
use blueprint_forge_core::segment::{segment_text, whole_document};
use chrono::Utc;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Instant;

use crate::blueprint::{
    build_blueprint, BuildContext, SourceInfo, Status, PIPELINE_NAME, PIPELINE_VERSION,
    SCHEMA_VERSION,
};
use crate::config::{OutputLayout, OutputMode, PipelineConfig};
use crate::enrich::Enrichment;
use crate::extract::{DefaultExtractor, TextExtractor};
use crate::loader::{
    discover_sources, file_name, read_source, relative_path, stat_source, Discovery,
};
use crate::manifest::{append_audit_log, timestamp, FileResult, FileStatus, RunCounts, RunManifest};
use crate::output::{resolve_output_path, safe_stem, segment_stem, stored_hash, write_atomic};
use crate::progress::{NoProgress, RunProgressEvent, RunProgressReporter};

pub const WARN_MAX_BYTES: &str = "max-bytes-exceeded";
pub const WARN_EMPTY: &str = "empty-or-unreadable";
pub const WARN_ENRICHMENT_FAILED: &str = "enrichment-failed";

/// Manifest file name inside the output directory.
pub const DEFAULT_MANIFEST_NAME: &str = "_manifest.json";

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub pipeline: PipelineConfig,
    pub dry_run: bool,
    /// Defaults to `<output_dir>/_manifest.json`.
    pub manifest_path: Option<PathBuf>,
    pub audit_log: Option<PathBuf>,
}

impl RunOptions {
    pub fn manifest_path(&self) -> PathBuf {
        self.manifest_path
            .clone()
            .unwrap_or_else(|| self.pipeline.output_dir.join(DEFAULT_MANIFEST_NAME))
    }
}

/// What a finished run produced.
#[derive(Debug)]
pub struct RunReport {
    pub manifest: RunManifest,
    /// Where the manifest was written; `None` in dry-run mode.
    pub manifest_path: Option<PathBuf>,
}

impl RunReport {
    pub fn exit_code(&self) -> i32 {
        if self.manifest.counts.failed > 0 {
            1
        } else {
            0
        }
    }
}

pub struct PipelineRunner {
    options: RunOptions,
    sanitizer: Sanitizer,
    extractor: Box<dyn TextExtractor>,
    enrichment: Option<Enrichment>,
    progress: Box<dyn RunProgressReporter>,
    /// Serializes resolve-and-write when files run in parallel.
    output_lock: Option<Mutex<()>>,
    run_id: String,
}

impl PipelineRunner {
    pub fn new(options: RunOptions, sanitizer: Sanitizer) -> Self {
        let output_lock = (options.pipeline.workers > 1).then(|| Mutex::new(()));
        Self {
            options,
            sanitizer,
            extractor: Box::new(DefaultExtractor),
            enrichment: None,
            progress: Box::new(NoProgress),
            output_lock,
            run_id: uuid::Uuid::new_v4().to_string(),
        }
    }

    pub fn with_extractor(mut self, extractor: Box<dyn TextExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn with_enrichment(mut self, enrichment: Option<Enrichment>) -> Self {
        self.enrichment = enrichment;
        self
    }

    pub fn with_progress(mut self, progress: Box<dyn RunProgressReporter>) -> Self {
        self.progress = progress;
        self
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn run(&self) -> Result<RunReport> {
        let started_at = Utc::now();
        let config = &self.options.pipeline;

        self.progress.report(RunProgressEvent::Discovering {
            input_dir: config.input_dir.display().to_string(),
        });
        let paths = discover_sources(&Discovery::from_config(config))?;
        tracing::info!(
            run_id = %self.run_id,
            files = paths.len(),
            workers = config.workers,
            "starting run"
        );

        let total = paths.len() as u64;
        let done = AtomicU64::new(0);
        let process = |path: &PathBuf| {
            let result = self.process_file(path);
            let n = done.fetch_add(1, Ordering::SeqCst) + 1;
            self.progress.report(RunProgressEvent::Processed {
                n,
                total,
                source_name: result.source_name.clone(),
                status: result.status.as_str(),
            });
            result
        };

        let mut results: Vec<FileResult> = if config.workers > 1 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(config.workers)
                .build()
                .with_context(|| "Failed to build worker pool")?;
            pool.install(|| paths.par_iter().map(process).collect())
        } else {
            paths.iter().map(process).collect()
        };
        results.sort_by(|a, b| {
            a.source_name
                .cmp(&b.source_name)
                .then_with(|| a.source_file.cmp(&b.source_file))
        });

        let manifest = RunManifest {
            run_id: self.run_id.clone(),
            pipeline: PIPELINE_NAME.to_string(),
            pipeline_version: PIPELINE_VERSION.to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            input_dir: config.input_dir.display().to_string(),
            output_dir: config.output_dir.display().to_string(),
            started_at: timestamp(started_at),
            finished_at: timestamp(Utc::now()),
            counts: RunCounts::tally(&results),
            files: results,
        };

        let manifest_path = if self.options.dry_run {
            None
        } else {
            let path = self.options.manifest_path();
            manifest.write(&path)?;
            Some(path)
        };
        // Dry runs are audited too.
        if let Some(audit) = &self.options.audit_log {
            append_audit_log(audit, &self.run_id, &manifest.files)?;
        }

        Ok(RunReport {
            manifest,
            manifest_path,
        })
    }

    /// Process one source. Never fails; problems land in the result.
    pub fn process_file(&self, path: &Path) -> FileResult {
        let started = Instant::now();
        let config = &self.options.pipeline;
        let mut result = FileResult::new(
            relative_path(path, &config.repo_root),
            file_name(path),
        );

        self.process_into(path, &mut result);
        result.duration_ms = started.elapsed().as_millis() as u64;
        result
    }

    fn process_into(&self, path: &Path, result: &mut FileResult) {
        let config = &self.options.pipeline;

        let stat = match stat_source(path) {
            Ok(stat) => stat,
            Err(e) => {
                skip_unreadable(path, result, &e);
                return;
            }
        };
        if config.max_bytes > 0 && stat.bytes > config.max_bytes {
            tracing::warn!(path = %path.display(), size = stat.bytes, "skipping oversized source");
            result.status = FileStatus::Skipped;
            result.warnings.push(WARN_MAX_BYTES.to_string());
            return;
        }

        let source = match read_source(path, stat, self.extractor.as_ref()) {
            Ok(source) => source,
            Err(e) => {
                skip_unreadable(path, result, &e);
                return;
            }
        };
        if source.text.trim().is_empty() {
            tracing::warn!(path = %path.display(), "skipping empty or unreadable source");
            result.status = FileStatus::Skipped;
            result.warnings.push(WARN_EMPTY.to_string());
            return;
        }

        let mut text = self.sanitizer.sanitize(&source.text);
        let mut pii_redacted = false;
        if config.redact_pii {
            let (redacted, counts) = redact_pii(&text);
            if counts.any() {
                tracing::info!(
                    path = %path.display(),
                    email = counts.email,
                    phone = counts.phone,
                    ip = counts.ip,
                    credit = counts.credit,
                    "redacted PII"
                );
            }
            pii_redacted = counts.any();
            text = redacted;
        } else if contains_pii(&text) {
            tracing::warn!(path = %path.display(), "source looks like it contains PII; not redacted");
        }

        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let info = self.source_info(&source.text, &stem, result, source.stat.modified);
        result.source_file = info.source_file.clone();
        result.source_name = info.source_name.clone();
        result.source_hash = info.source_hash.clone();

        let segments: Vec<Segment> = match config.output_mode {
            OutputMode::Single => whole_document(&text).into_iter().collect(),
            OutputMode::RoleSplit => segment_text(&text),
        };
        if segments.is_empty() {
            result.status = FileStatus::Skipped;
            result.warnings.push(WARN_EMPTY.to_string());
            return;
        }
        result.segment_count = segments.len();
        tracing::debug!(path = %path.display(), segments = segments.len(), "segmented");

        let ctx = BuildContext {
            author: config.author.clone(),
            license_id: config.license_id.clone(),
            build_id: config.build_id.clone(),
            run_id: Some(self.run_id.clone()),
            pii_redacted,
            last_updated: BuildContext::today(),
        };
        let base_stem = safe_stem(&stem);

        let mut attempted = 0usize;
        let mut unchanged = 0usize;
        let mut write_failed = false;

        for segment in segments.iter().filter(|s| !s.content.trim().is_empty()) {
            attempted += 1;
            let out_stem = segment_stem(&base_stem, segment.index, segment.count);
            let dir = match config.output_layout {
                OutputLayout::Flat => config.output_dir.clone(),
                OutputLayout::ByType => config.output_dir.join(segment.content_type.as_str()),
            };

            if config.skip_unchanged {
                let _guard = self.lock_output();
                if let Some(existing) = self.unchanged_output(&dir, &out_stem, &segment.content_hash)
                {
                    tracing::info!(output = %existing.display(), "unchanged, skipping");
                    result
                        .warnings
                        .push(format!("unchanged:{}", file_name(&existing)));
                    unchanged += 1;
                    continue;
                }
            }

            let mut blueprint = build_blueprint(segment, &info, &ctx);
            if let Some(enrichment) = &self.enrichment {
                if let Err(e) = enrichment.apply(&mut blueprint) {
                    tracing::warn!(id = %blueprint.id, error = %e, "enrichment failed, keeping base blueprint");
                    result.warnings.push(WARN_ENRICHMENT_FAILED.to_string());
                }
            }
            blueprint.status = Status::Complete;

            let mut rendered: Vec<(&str, String)> = Vec::new();
            if config.output_format.writes_json() {
                match blueprint.to_json() {
                    Ok(json) => rendered.push(("json", json)),
                    Err(e) => {
                        result.errors.push(format!("serialize-failed:{}: {}", out_stem, e));
                        write_failed = true;
                        continue;
                    }
                }
            }
            if config.output_format.writes_markdown() {
                rendered.push(("md", blueprint.to_markdown()));
            }

            let _guard = self.lock_output();
            for (ext, body) in rendered {
                let target = resolve_output_path(&dir, &out_stem, ext, &segment.content_hash);
                if self.options.dry_run {
                    result.output_files.push(target.display().to_string());
                    continue;
                }
                match write_atomic(&target, &body) {
                    Ok(()) => {
                        tracing::info!(output = %target.display(), id = %blueprint.id, "saved");
                        result.output_files.push(target.display().to_string());
                    }
                    Err(e) => {
                        tracing::warn!(output = %target.display(), error = %e, "write failed");
                        result
                            .errors
                            .push(format!("write-failed:{}: {:#}", target.display(), e));
                        write_failed = true;
                    }
                }
            }
        }

        result.status = if write_failed {
            FileStatus::Error
        } else if attempted > 0 && unchanged == attempted {
            FileStatus::Skipped
        } else if self.options.dry_run {
            FileStatus::DryRun
        } else {
            FileStatus::Ok
        };
    }

    fn source_info(
        &self,
        raw_text: &str,
        stem: &str,
        result: &FileResult,
        modified: Option<chrono::DateTime<Utc>>,
    ) -> SourceInfo {
        let anonymized = self.options.pipeline.anonymize_source;
        let (source_file, source_name) = if anonymized {
            let id = format!("hash:{}", hash_identifier(&result.source_file));
            (id.clone(), id)
        } else {
            (result.source_file.clone(), result.source_name.clone())
        };
        SourceInfo {
            source_file,
            source_name,
            stem: stem.to_string(),
            source_hash: hash_text(raw_text),
            source_bytes: raw_text.len() as u64,
            source_mtime: modified.map(timestamp),
            anonymized,
        }
    }

    /// First output for `stem` that already holds `content_hash`, if every
    /// configured format has one.
    fn unchanged_output(&self, dir: &Path, stem: &str, content_hash: &str) -> Option<PathBuf> {
        let format = self.options.pipeline.output_format;
        let mut exts = Vec::new();
        if format.writes_json() {
            exts.push("json");
        }
        if format.writes_markdown() {
            exts.push("md");
        }

        let mut first = None;
        for ext in exts {
            let path = resolve_output_path(dir, stem, ext, content_hash);
            if stored_hash(&path).as_deref() != Some(content_hash) {
                return None;
            }
            first.get_or_insert(path);
        }
        first
    }

    fn lock_output(&self) -> Option<MutexGuard<'_, ()>> {
        self.output_lock
            .as_ref()
            .map(|m| m.lock().unwrap_or_else(|poisoned| poisoned.into_inner()))
    }
}

/// Unreadable sources are input errors: skipped, never failed.
fn skip_unreadable(path: &Path, result: &mut FileResult, error: &anyhow::Error) {
    let error = format!("{:#}", error);
    tracing::warn!(path = %path.display(), error = %error, "skipping unreadable source");
    result.status = FileStatus::Skipped;
    result.warnings.push(WARN_EMPTY.to_string());
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn options(tmp: &TempDir) -> RunOptions {
        let input = tmp.path().join("framework");
        fs::create_dir_all(&input).unwrap();
        RunOptions {
            pipeline: PipelineConfig {
                input_dir: input,
                output_dir: tmp.path().join("blueprints"),
                repo_root: tmp.path().to_path_buf(),
                ..PipelineConfig::default()
            },
            dry_run: false,
            manifest_path: None,
            audit_log: None,
        }
    }

    fn runner(opts: RunOptions) -> PipelineRunner {
        PipelineRunner::new(opts, Sanitizer::default())
    }

    fn json_outputs(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().to_string())
            .filter(|n| n.ends_with(".json") && !n.starts_with('_'))
            .collect();
        names.sort();
        names
    }

    #[test]
    fn segmented_source_writes_one_record_per_segment() {
        let tmp = TempDir::new().unwrap();
        let opts = options(&tmp);
        fs::write(
            opts.pipeline.input_dir.join("guide.txt"),
            "Part 1 Intro\nWelcome.\nPart 2 Setup\nInstall it.\nPart 3 Use\nRun it.",
        )
        .unwrap();

        let report = runner(opts.clone()).run().unwrap();
        assert_eq!(report.manifest.counts.success, 1);
        assert_eq!(report.manifest.counts.segments, 3);
        assert_eq!(report.exit_code(), 0);
        assert_eq!(
            json_outputs(&opts.pipeline.output_dir),
            vec!["guide_01.json", "guide_02.json", "guide_03.json"]
        );
        assert!(opts.pipeline.output_dir.join("_manifest.json").exists());
    }

    #[test]
    fn single_mode_writes_whole_document() {
        let tmp = TempDir::new().unwrap();
        let mut opts = options(&tmp);
        opts.pipeline.output_mode = OutputMode::Single;
        fs::write(
            opts.pipeline.input_dir.join("guide.txt"),
            "Part 1 Intro\nWelcome.\nPart 2 Setup\nInstall it.",
        )
        .unwrap();

        runner(opts.clone()).run().unwrap();
        assert_eq!(json_outputs(&opts.pipeline.output_dir), vec!["guide.json"]);
    }

    #[test]
    fn oversized_and_empty_sources_are_skipped() {
        let tmp = TempDir::new().unwrap();
        let mut opts = options(&tmp);
        opts.pipeline.max_bytes = 10;
        fs::write(opts.pipeline.input_dir.join("big.txt"), "x".repeat(50)).unwrap();
        fs::write(opts.pipeline.input_dir.join("blank.txt"), "   \n").unwrap();

        let report = runner(opts).run().unwrap();
        assert_eq!(report.manifest.counts.skipped, 2);
        let big = &report.manifest.files[0];
        assert_eq!(big.source_name, "big.txt");
        assert_eq!(big.warnings, vec![WARN_MAX_BYTES]);
        let blank = &report.manifest.files[1];
        assert_eq!(blank.warnings, vec![WARN_EMPTY]);
        assert_eq!(report.exit_code(), 0);
    }

    #[test]
    fn dry_run_writes_nothing() {
        let tmp = TempDir::new().unwrap();
        let mut opts = options(&tmp);
        opts.dry_run = true;
        fs::write(opts.pipeline.input_dir.join("a.md"), "hello").unwrap();

        let report = runner(opts.clone()).run().unwrap();
        assert_eq!(report.manifest.counts.dry_run, 1);
        assert!(report.manifest_path.is_none());
        assert!(!opts.pipeline.output_dir.exists());
        assert_eq!(report.manifest.files[0].output_files.len(), 1);
    }

    #[test]
    fn skip_unchanged_second_run() {
        let tmp = TempDir::new().unwrap();
        let mut opts = options(&tmp);
        opts.pipeline.skip_unchanged = true;
        fs::write(opts.pipeline.input_dir.join("a.md"), "# One\nx\n# Two\ny").unwrap();

        let first = runner(opts.clone()).run().unwrap();
        assert_eq!(first.manifest.counts.success, 1);
        let second = runner(opts.clone()).run().unwrap();
        assert_eq!(second.manifest.counts.skipped, 1);
        assert_eq!(
            second.manifest.files[0].warnings,
            vec!["unchanged:a_01.json", "unchanged:a_02.json"]
        );
        assert_eq!(json_outputs(&opts.pipeline.output_dir).len(), 2);
    }

    #[test]
    fn by_type_layout_and_markdown_format() {
        let tmp = TempDir::new().unwrap();
        let mut opts = options(&tmp);
        opts.pipeline.output_layout = OutputLayout::ByType;
        opts.pipeline.output_format = crate::config::OutputFormat::Both;
        fs::write(
            opts.pipeline.input_dir.join("loop.txt"),
            "The evolution loop tracks drift.",
        )
        .unwrap();

        runner(opts.clone()).run().unwrap();
        let dir = opts.pipeline.output_dir.join("evolution");
        assert!(dir.join("loop.json").exists());
        assert!(dir.join("loop.md").exists());
    }

    #[test]
    fn anonymized_source_hides_path() {
        let tmp = TempDir::new().unwrap();
        let mut opts = options(&tmp);
        opts.pipeline.anonymize_source = true;
        opts.pipeline.redact_pii = true;
        fs::write(
            opts.pipeline.input_dir.join("secret.txt"),
            "Mail ops@example.com today.",
        )
        .unwrap();

        let report = runner(opts.clone()).run().unwrap();
        let file = &report.manifest.files[0];
        assert!(file.source_name.starts_with("hash:"));

        let out = fs::read_to_string(opts.pipeline.output_dir.join("secret.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["metadata"]["source_file"], file.source_file.as_str());
        assert_eq!(value["metadata"]["pii_redacted"], true);
        assert_eq!(value["status"], "complete");
        let summary = value["sections"]["executive_summary"].as_str().unwrap();
        assert!(summary.contains("[REDACTED_EMAIL]"));
        assert!(!summary.contains("ops@example.com"));
    }

    #[test]
    fn parallel_workers_match_sequential_manifest() {
        let tmp = TempDir::new().unwrap();
        let mut opts = options(&tmp);
        for i in 0..6 {
            fs::write(
                opts.pipeline.input_dir.join(format!("doc{}.txt", i)),
                format!("Document {} body", i),
            )
            .unwrap();
        }
        opts.pipeline.workers = 3;
        let report = runner(opts.clone()).run().unwrap();
        let names: Vec<&str> = report
            .manifest
            .files
            .iter()
            .map(|f| f.source_name.as_str())
            .collect();
        assert_eq!(
            names,
            vec!["doc0.txt", "doc1.txt", "doc2.txt", "doc3.txt", "doc4.txt", "doc5.txt"]
        );
        assert_eq!(report.manifest.counts.success, 6);
    }

    #[test]
    fn unreadable_source_is_skipped_not_failed() {
        let tmp = TempDir::new().unwrap();
        let opts = options(&tmp);
        let runner = runner(opts.clone());

        let vanished = runner.process_file(&opts.pipeline.input_dir.join("vanished.txt"));
        assert_eq!(vanished.status, FileStatus::Skipped);
        assert_eq!(vanished.warnings, vec![WARN_EMPTY]);
        assert!(vanished.errors.is_empty());

        // Stat succeeds on a directory but reading it does not.
        let dir = opts.pipeline.input_dir.join("folder.txt");
        fs::create_dir(&dir).unwrap();
        let unreadable = runner.process_file(&dir);
        assert_eq!(unreadable.status, FileStatus::Skipped);
        assert_eq!(unreadable.warnings, vec![WARN_EMPTY]);
        assert!(unreadable.errors.is_empty());
    }

    #[test]
    fn write_failure_marks_file_and_run_failed() {
        let tmp = TempDir::new().unwrap();
        let mut opts = options(&tmp);
        opts.pipeline.output_layout = OutputLayout::ByType;
        fs::create_dir_all(&opts.pipeline.output_dir).unwrap();
        // A plain file where the evolution subdirectory should go.
        fs::write(opts.pipeline.output_dir.join("evolution"), "in the way").unwrap();
        fs::write(
            opts.pipeline.input_dir.join("loop.txt"),
            "The evolution loop tracks drift.",
        )
        .unwrap();
        fs::write(
            opts.pipeline.input_dir.join("plain.txt"),
            "A short product note.",
        )
        .unwrap();

        let report = runner(opts.clone()).run().unwrap();
        assert_eq!(report.manifest.counts.failed, 1);
        assert_eq!(report.manifest.counts.success, 1);
        assert_eq!(report.exit_code(), 1);

        let failed = &report.manifest.files[0];
        assert_eq!(failed.source_name, "loop.txt");
        assert_eq!(failed.status, FileStatus::Error);
        assert!(failed.errors[0].starts_with("write-failed:"), "{:?}", failed.errors);

        assert_eq!(report.manifest.files[1].status, FileStatus::Ok);
        assert!(opts.pipeline.output_dir.join("blueprint/plain.json").exists());
        assert!(report.manifest_path.unwrap().exists());
    }

    #[test]
    fn pii_flag_follows_actual_redactions() {
        let tmp = TempDir::new().unwrap();
        let mut opts = options(&tmp);
        opts.pipeline.redact_pii = true;
        fs::write(
            opts.pipeline.input_dir.join("clean.txt"),
            "Nothing sensitive at all.",
        )
        .unwrap();

        runner(opts.clone()).run().unwrap();
        let out = fs::read_to_string(opts.pipeline.output_dir.join("clean.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["metadata"]["pii_redacted"], false);
        assert!(value["sections"].get("safety_compliance").is_none());
    }

    #[test]
    fn dry_run_still_appends_audit_log() {
        let tmp = TempDir::new().unwrap();
        let mut opts = options(&tmp);
        opts.dry_run = true;
        let audit = tmp.path().join("logs/audit.jsonl");
        opts.audit_log = Some(audit.clone());
        fs::write(opts.pipeline.input_dir.join("a.md"), "hello").unwrap();

        runner(opts.clone()).run().unwrap();
        assert!(!opts.pipeline.output_dir.exists());
        let log = fs::read_to_string(&audit).unwrap();
        let lines: Vec<&str> = log.lines().collect();
        assert_eq!(lines.len(), 1);
        let entry: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(entry["status"], "dry_run");
    }
}
