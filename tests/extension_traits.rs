//! Integration tests for the library's extension seams.
//!
//! Custom `TextExtractor`, `Enricher`, and `RunProgressReporter`
//! implementations plugged into a real `PipelineRunner` run.

use anyhow::{bail, Result};
use blueprint_forge::config::PipelineConfig;
use blueprint_forge::enrich::{Enricher, Enrichment, RetryPolicy};
use blueprint_forge::extract::{DocumentKind, ExtractError, TextExtractor};
use blueprint_forge::manifest::FileStatus;
use blueprint_forge::pipeline::{PipelineRunner, RunOptions, WARN_ENRICHMENT_FAILED};
use blueprint_forge::progress::{RunProgressEvent, RunProgressReporter};
use blueprint_forge_core::sanitize::Sanitizer;
use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

// ─── Test Extractor ─────────────────────────────────────────────────

/// Pretends every PDF contains the same two-part outline.
struct OutlineExtractor;

impl TextExtractor for OutlineExtractor {
    fn extract(&self, bytes: &[u8], kind: DocumentKind) -> Result<String, ExtractError> {
        match kind {
            DocumentKind::Pdf => Ok("# Intro\nWelcome.\n# Details\nThe details.".to_string()),
            _ => Ok(String::from_utf8_lossy(bytes).into_owned()),
        }
    }
}

// ─── Test Enricher ──────────────────────────────────────────────────

/// Fails the first `failures` calls, then answers with fixed sections.
struct FlakyEnricher {
    failures: usize,
    calls: Arc<AtomicUsize>,
    models: Arc<Mutex<Vec<String>>>,
}

impl Enricher for FlakyEnricher {
    fn generate(&self, model: &str, _prompt: &str) -> Result<String> {
        self.models.lock().unwrap().push(model.to_string());
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if n < self.failures {
            bail!("simulated outage");
        }
        Ok(r#"```json
{"sections": {"value_proposition": "Saves planning time."}, "tags": ["Planning"]}
```"#
            .to_string())
    }
}

// ─── Test Progress ──────────────────────────────────────────────────

#[derive(Clone, Default)]
struct Recorder {
    events: Arc<Mutex<Vec<String>>>,
}

impl RunProgressReporter for Recorder {
    fn report(&self, event: RunProgressEvent) {
        let line = match event {
            RunProgressEvent::Discovering { .. } => "discovering".to_string(),
            RunProgressEvent::Processed { n, total, status, .. } => {
                format!("{}/{} {}", n, total, status)
            }
        };
        self.events.lock().unwrap().push(line);
    }
}

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

fn no_backoff(max_attempts: u32) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        backoff_base: Duration::ZERO,
    }
}

fn read_record(tmp: &TempDir, name: &str) -> serde_json::Value {
    let text = fs::read_to_string(tmp.path().join("blueprints").join(name)).unwrap();
    serde_json::from_str(&text).unwrap()
}

#[test]
fn test_custom_extractor_feeds_segmenter() {
    let tmp = TempDir::new().unwrap();
    fs::create_dir_all(tmp.path().join("framework")).unwrap();
    fs::write(tmp.path().join("framework/outline.pdf"), b"%PDF-fake").unwrap();

    let report = PipelineRunner::new(options(&tmp), Sanitizer::default())
        .with_extractor(Box::new(OutlineExtractor))
        .run()
        .unwrap();

    assert_eq!(report.exit_code(), 0);
    assert_eq!(report.manifest.files[0].segment_count, 2);
    let second = read_record(&tmp, "outline_02.json");
    assert_eq!(second["title"], "outline: Details");
}

#[test]
fn test_enricher_retries_then_falls_back_to_next_model() {
    let tmp = TempDir::new().unwrap();
    fs::create_dir_all(tmp.path().join("framework")).unwrap();
    fs::write(tmp.path().join("framework/plan.txt"), "A plan for the quarter.").unwrap();

    let calls = Arc::new(AtomicUsize::new(0));
    let models = Arc::new(Mutex::new(Vec::new()));
    let enricher = FlakyEnricher {
        failures: 2,
        calls: calls.clone(),
        models: models.clone(),
    };
    let enrichment = Enrichment::new(
        Box::new(enricher),
        vec!["fast".to_string(), "slow".to_string()],
        no_backoff(2),
    );

    let report = PipelineRunner::new(options(&tmp), Sanitizer::default())
        .with_enrichment(Some(enrichment))
        .run()
        .unwrap();

    assert_eq!(report.manifest.files[0].status, FileStatus::Ok);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(*models.lock().unwrap(), vec!["fast", "fast", "slow"]);

    let bp = read_record(&tmp, "plan.json");
    assert_eq!(bp["sections"]["value_proposition"], "Saves planning time.");
    assert_eq!(bp["metadata"]["enriched"], true);
    assert!(bp["tags"]
        .as_array()
        .unwrap()
        .iter()
        .any(|t| t == "planning"));
}

#[test]
fn test_enrichment_failure_keeps_base_record() {
    let tmp = TempDir::new().unwrap();
    fs::create_dir_all(tmp.path().join("framework")).unwrap();
    fs::write(tmp.path().join("framework/plan.txt"), "A plan for the quarter.").unwrap();

    let enricher = FlakyEnricher {
        failures: usize::MAX,
        calls: Arc::new(AtomicUsize::new(0)),
        models: Arc::new(Mutex::new(Vec::new())),
    };
    let enrichment = Enrichment::new(Box::new(enricher), vec!["only".to_string()], no_backoff(3));

    let report = PipelineRunner::new(options(&tmp), Sanitizer::default())
        .with_enrichment(Some(enrichment))
        .run()
        .unwrap();

    let file = &report.manifest.files[0];
    assert_eq!(file.status, FileStatus::Ok);
    assert_eq!(file.warnings, vec![WARN_ENRICHMENT_FAILED]);

    let bp = read_record(&tmp, "plan.json");
    assert_eq!(bp["status"], "complete");
    assert!(bp["metadata"].get("enriched").is_none());
}

#[test]
fn test_progress_reporter_sees_every_source() {
    let tmp = TempDir::new().unwrap();
    fs::create_dir_all(tmp.path().join("framework")).unwrap();
    fs::write(tmp.path().join("framework/a.txt"), "Alpha.").unwrap();
    fs::write(tmp.path().join("framework/b.txt"), "").unwrap();

    let recorder = Recorder::default();
    PipelineRunner::new(options(&tmp), Sanitizer::default())
        .with_progress(Box::new(recorder.clone()))
        .run()
        .unwrap();

    let events = recorder.events.lock().unwrap();
    assert_eq!(*events, vec!["discovering", "1/2 ok", "2/2 skipped"]);
}
