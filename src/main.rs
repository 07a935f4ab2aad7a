//! # Blueprint Forge CLI (`forge`)
//!
//! ## Usage
//!
//! ```bash
//! forge --config ./config/forge.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `forge run` | Turn source documents into blueprint records |
//! | `forge migrate` | Bring existing records up to the current schema |
//! | `forge validate [DIR]` | Check a directory of records |
//!
//! ## Examples
//!
//! ```bash
//! # Process ./framework into ./blueprints with four workers
//! forge run --workers 4
//!
//! # Preview what a run would write
//! forge run --dry-run --progress human
//!
//! # Rewrite legacy records in place
//! forge migrate --input-dir blueprints --apply --report migrate.json
//!
//! # Validate against the built-in schema
//! forge validate blueprints --strict --summary-json summary.json
//! ```

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use blueprint_forge::config::{self, Config, OutputFormat, OutputLayout, OutputMode};
use blueprint_forge::enrich::Enrichment;
use blueprint_forge::migrate::{run_migrate, MigrateOptions};
use blueprint_forge::pipeline::{PipelineRunner, RunOptions};
use blueprint_forge::progress::ProgressMode;
use blueprint_forge::validate::{run_validate, ValidateOptions};

const DEFAULT_CONFIG_PATH: &str = "./config/forge.toml";

/// Blueprint Forge: raw documents in, validated blueprint records out.
///
/// Every command reads an optional TOML config (`--config`, default
/// `./config/forge.toml` when present). Flags override the file.
#[derive(Parser)]
#[command(
    name = "forge",
    about = "Blueprint Forge: turn raw documents into segmented, validated blueprint records",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log filter when RUST_LOG is unset (e.g. `debug`, `blueprint_forge=trace`).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process source documents into blueprint records.
    ///
    /// Exits 1 when any source failed to write.
    Run(RunArgs),

    /// Migrate existing records to the current schema.
    ///
    /// Dry-run unless `--apply` is given.
    Migrate(MigrateArgs),

    /// Validate a directory of records.
    ///
    /// Exits 1 when any record has errors. A missing directory is skipped.
    Validate(ValidateArgs),
}

#[derive(Args)]
struct RunArgs {
    #[arg(long)]
    input_dir: Option<PathBuf>,
    #[arg(long)]
    output_dir: Option<PathBuf>,
    /// Manifest path. Defaults to `<output-dir>/_manifest.json`.
    #[arg(long)]
    manifest: Option<PathBuf>,
    /// Append one JSON line per source to this file.
    #[arg(long)]
    audit_log: Option<PathBuf>,
    /// Do everything except writing files.
    #[arg(long)]
    dry_run: bool,
    #[arg(long)]
    max_files: Option<usize>,
    /// Skip sources larger than this many bytes (0 = no limit).
    #[arg(long)]
    max_bytes: Option<u64>,
    /// Leave outputs whose stored content hash already matches.
    #[arg(long)]
    skip_unchanged: bool,
    #[arg(long, overrides_with = "no_redact_pii")]
    redact_pii: bool,
    #[arg(long, overrides_with = "redact_pii")]
    no_redact_pii: bool,
    #[arg(long, overrides_with = "no_anonymize_source")]
    anonymize_source: bool,
    #[arg(long, overrides_with = "anonymize_source")]
    no_anonymize_source: bool,
    #[arg(long, overrides_with = "no_enable_llm")]
    enable_llm: bool,
    #[arg(long, overrides_with = "enable_llm")]
    no_enable_llm: bool,
    #[arg(long)]
    license_id: Option<String>,
    #[arg(long)]
    build_id: Option<String>,
    #[arg(long)]
    workers: Option<usize>,
    #[arg(long, value_enum)]
    output_layout: Option<OutputLayout>,
    #[arg(long, value_enum)]
    output_mode: Option<OutputMode>,
    #[arg(long, value_enum)]
    output_format: Option<OutputFormat>,
    /// Progress on stderr. Defaults to `human` on a TTY, else `off`.
    #[arg(long, value_enum)]
    progress: Option<ProgressMode>,
}

#[derive(Args)]
struct MigrateArgs {
    /// Directory of records. Defaults to the configured output directory.
    #[arg(long)]
    input_dir: Option<PathBuf>,
    #[arg(long)]
    schema_version: Option<String>,
    /// Applied only to records without one.
    #[arg(long)]
    pipeline_version: Option<String>,
    /// Text for missing required sections.
    #[arg(long)]
    placeholder: Option<String>,
    #[arg(long, default_value_t = 0)]
    max_files: usize,
    /// Write migrated records back in place.
    #[arg(long)]
    apply: bool,
    /// Re-read source files to recompute missing hashes.
    #[arg(long)]
    use_source: bool,
    /// Write the JSON summary here.
    #[arg(long)]
    report: Option<PathBuf>,
}

#[derive(Args)]
struct ValidateArgs {
    /// Directory of records. Defaults to the configured blueprints directory.
    dir: Option<PathBuf>,
    /// Schema for `--strict`. Defaults to the built-in blueprint schema.
    #[arg(long)]
    schema: Option<PathBuf>,
    /// Run the schema check and treat warnings as errors.
    #[arg(long)]
    strict: bool,
    #[arg(long)]
    summary_json: Option<PathBuf>,
    /// Stop at the first failing record.
    #[arg(long)]
    fail_fast: bool,
}

/// `Some(true)` for `--x`, `Some(false)` for `--no-x`, `None` for neither.
fn flag_pair(yes: bool, no: bool) -> Option<bool> {
    match (yes, no) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let cfg = config::load_or_default(cli.config.as_deref(), Path::new(DEFAULT_CONFIG_PATH))?;

    let code = match cli.command {
        Commands::Run(args) => cmd_run(cfg, args)?,
        Commands::Migrate(args) => cmd_migrate(&cfg, args)?,
        Commands::Validate(args) => cmd_validate(&cfg, args)?,
    };
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}

fn cmd_run(mut cfg: Config, args: RunArgs) -> Result<i32> {
    let p = &mut cfg.pipeline;
    if let Some(v) = args.input_dir {
        p.input_dir = v;
    }
    if let Some(v) = args.output_dir {
        p.output_dir = v;
    }
    if let Some(v) = args.max_files {
        p.max_files = v;
    }
    if let Some(v) = args.max_bytes {
        p.max_bytes = v;
    }
    if args.skip_unchanged {
        p.skip_unchanged = true;
    }
    if let Some(v) = flag_pair(args.redact_pii, args.no_redact_pii) {
        p.redact_pii = v;
    }
    if let Some(v) = flag_pair(args.anonymize_source, args.no_anonymize_source) {
        p.anonymize_source = v;
    }
    if let Some(v) = args.license_id {
        p.license_id = v;
    }
    if args.build_id.is_some() {
        p.build_id = args.build_id;
    }
    if let Some(v) = args.workers {
        p.workers = v;
    }
    if let Some(v) = args.output_layout {
        p.output_layout = v;
    }
    if let Some(v) = args.output_mode {
        p.output_mode = v;
    }
    if let Some(v) = args.output_format {
        p.output_format = v;
    }
    if let Some(v) = flag_pair(args.enable_llm, args.no_enable_llm) {
        cfg.enrichment.enabled = v;
        if v && cfg.enrichment.provider == "disabled" {
            cfg.enrichment.provider = "gemini".to_string();
        }
    }
    config::validate_config(&cfg)?;

    let enrichment = match Enrichment::from_config(&cfg.enrichment) {
        Ok(e) => e,
        Err(e) => {
            tracing::warn!(error = %format!("{:#}", e), "enrichment unavailable, continuing without it");
            None
        }
    };
    let sanitizer = cfg.sanitize.build()?;
    let progress = args.progress.unwrap_or_else(ProgressMode::default_for_tty);

    let options = RunOptions {
        pipeline: cfg.pipeline,
        dry_run: args.dry_run,
        manifest_path: args.manifest,
        audit_log: args.audit_log,
    };
    let runner = PipelineRunner::new(options, sanitizer)
        .with_enrichment(enrichment)
        .with_progress(progress.reporter());

    let report = runner.run()?;
    let counts = &report.manifest.counts;
    println!("run {}", report.manifest.run_id);
    println!("  files: {}", counts.total_files);
    println!("  ok: {}", counts.success);
    println!("  skipped: {}", counts.skipped);
    if args.dry_run {
        println!("  dry_run: {}", counts.dry_run);
    }
    println!("  failed: {}", counts.failed);
    println!("  segments: {}", counts.segments);
    println!("  warnings: {}", counts.warnings);
    match &report.manifest_path {
        Some(path) => println!("  manifest: {}", path.display()),
        None => println!("  manifest: (dry run, not written)"),
    }
    println!("{}", if counts.failed > 0 { "failed" } else { "ok" });

    Ok(report.exit_code())
}

fn cmd_migrate(cfg: &Config, args: MigrateArgs) -> Result<i32> {
    let input_dir = args
        .input_dir
        .unwrap_or_else(|| cfg.pipeline.output_dir.clone());
    if !input_dir.is_dir() {
        println!("Input directory not found: {}", input_dir.display());
        return Ok(1);
    }

    let mut opts = MigrateOptions::from_config(&cfg.migrate, &cfg.pipeline.repo_root);
    if let Some(v) = args.schema_version {
        opts.schema_version = v;
    }
    if let Some(v) = args.pipeline_version {
        opts.pipeline_version = v;
    }
    if let Some(v) = args.placeholder {
        opts.placeholder = v;
    }
    opts.use_source = args.use_source;

    let summary = run_migrate(
        &input_dir,
        &opts,
        args.max_files,
        args.apply,
        args.report.as_deref(),
    )?;
    println!(
        "Migration summary: total={} updated={} unchanged={} errors={} placeholders={} source_read={}",
        summary.total,
        summary.updated,
        summary.unchanged,
        summary.errors,
        summary.placeholders_added,
        summary.source_read
    );
    if !args.apply && summary.updated > 0 {
        println!("Dry run: re-run with --apply to write changes.");
    }
    Ok(0)
}

fn cmd_validate(cfg: &Config, args: ValidateArgs) -> Result<i32> {
    let opts = ValidateOptions {
        dir: args
            .dir
            .unwrap_or_else(|| cfg.validate.blueprints_dir.clone()),
        schema: args.schema.or_else(|| cfg.validate.schema.clone()),
        strict: args.strict,
        summary_json: args.summary_json,
        fail_fast: args.fail_fast,
    };
    let mut stdout = std::io::stdout().lock();
    let summary = run_validate(&opts, &mut stdout)?;
    Ok(summary.map(|s| s.exit_code()).unwrap_or(0))
}
