//! TOML configuration.
//!
//! Every section is optional; a missing file or section falls back to the
//! built-in defaults returned by [`Config::minimal`]. Command-line flags
//! override whatever the file sets.
//!
//! ```toml
//! [pipeline]
//! input_dir = "framework"
//! output_dir = "blueprints"
//! workers = 4
//! output_layout = "by-type"
//!
//! [enrichment]
//! enabled = true
//! provider = "gemini"
//! models = ["gemini-1.5-flash", "gemini-1.5-pro"]
//! ```

use anyhow::{bail, Context, Result};
use blueprint_forge_core::sanitize::{
    Sanitizer, DEFAULT_ORG_PATTERNS, DEFAULT_PERSON_PATTERNS, GENERIC_ORG, GENERIC_PERSON,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub sanitize: SanitizeConfig,
    #[serde(default)]
    pub enrichment: EnrichmentConfig,
    #[serde(default)]
    pub migrate: MigrateConfig,
    #[serde(default)]
    pub validate: ValidateConfig,
}

/// Where outputs land relative to the output directory.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum OutputLayout {
    #[default]
    Flat,
    ByType,
}

/// How many records a source produces.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum OutputMode {
    /// One record for the whole document.
    Single,
    /// One record per detected segment, tagged by role.
    #[default]
    RoleSplit,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    #[default]
    Json,
    Md,
    Both,
}

impl OutputFormat {
    pub fn writes_json(&self) -> bool {
        matches!(self, OutputFormat::Json | OutputFormat::Both)
    }

    pub fn writes_markdown(&self) -> bool {
        matches!(self, OutputFormat::Md | OutputFormat::Both)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct PipelineConfig {
    #[serde(default = "default_input_dir")]
    pub input_dir: PathBuf,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Source paths in metadata are written relative to this directory.
    #[serde(default = "default_repo_root")]
    pub repo_root: PathBuf,
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    #[serde(default)]
    pub exclude_globs: Vec<String>,
    #[serde(default)]
    pub recursive: bool,
    /// 0 means no limit.
    #[serde(default)]
    pub max_files: usize,
    /// 0 means no limit.
    #[serde(default)]
    pub max_bytes: u64,
    #[serde(default = "default_workers")]
    pub workers: usize,
    #[serde(default)]
    pub skip_unchanged: bool,
    #[serde(default)]
    pub redact_pii: bool,
    #[serde(default)]
    pub anonymize_source: bool,
    #[serde(default)]
    pub output_layout: OutputLayout,
    #[serde(default)]
    pub output_mode: OutputMode,
    #[serde(default)]
    pub output_format: OutputFormat,
    #[serde(default = "default_license_id")]
    pub license_id: String,
    #[serde(default)]
    pub build_id: Option<String>,
    #[serde(default = "default_author")]
    pub author: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_dir: default_input_dir(),
            output_dir: default_output_dir(),
            repo_root: default_repo_root(),
            extensions: default_extensions(),
            exclude_globs: Vec::new(),
            recursive: false,
            max_files: 0,
            max_bytes: 0,
            workers: default_workers(),
            skip_unchanged: false,
            redact_pii: false,
            anonymize_source: false,
            output_layout: OutputLayout::default(),
            output_mode: OutputMode::default(),
            output_format: OutputFormat::default(),
            license_id: default_license_id(),
            build_id: None,
            author: default_author(),
        }
    }
}

fn default_input_dir() -> PathBuf {
    PathBuf::from("framework")
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("blueprints")
}
fn default_repo_root() -> PathBuf {
    PathBuf::from(".")
}
fn default_extensions() -> Vec<String> {
    ["txt", "md", "pdf", "docx"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}
fn default_workers() -> usize {
    1
}
fn default_license_id() -> String {
    "NCFL-1.0".to_string()
}
fn default_author() -> String {
    "Blueprint Forge".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct SanitizeConfig {
    #[serde(default = "default_person_patterns")]
    pub person_patterns: Vec<String>,
    #[serde(default = "default_org_patterns")]
    pub org_patterns: Vec<String>,
    #[serde(default = "default_person_placeholder")]
    pub person_placeholder: String,
    #[serde(default = "default_org_placeholder")]
    pub org_placeholder: String,
}

impl Default for SanitizeConfig {
    fn default() -> Self {
        Self {
            person_patterns: default_person_patterns(),
            org_patterns: default_org_patterns(),
            person_placeholder: default_person_placeholder(),
            org_placeholder: default_org_placeholder(),
        }
    }
}

impl SanitizeConfig {
    pub fn build(&self) -> Result<Sanitizer> {
        Sanitizer::new(
            self.person_patterns.as_slice(),
            self.org_patterns.as_slice(),
            &self.person_placeholder,
            &self.org_placeholder,
        )
    }
}

fn default_person_patterns() -> Vec<String> {
    DEFAULT_PERSON_PATTERNS.iter().map(|s| s.to_string()).collect()
}
fn default_org_patterns() -> Vec<String> {
    DEFAULT_ORG_PATTERNS.iter().map(|s| s.to_string()).collect()
}
fn default_person_placeholder() -> String {
    GENERIC_PERSON.to_string()
}
fn default_org_placeholder() -> String {
    GENERIC_ORG.to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct EnrichmentConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Tried in order; the first model that answers wins.
    #[serde(default = "default_models")]
    pub models: Vec<String>,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            provider: default_provider(),
            models: default_models(),
            max_retries: default_max_retries(),
            backoff_base_ms: default_backoff_base_ms(),
            timeout_secs: default_timeout_secs(),
            api_key_env: default_api_key_env(),
        }
    }
}

fn default_provider() -> String {
    "gemini".to_string()
}
fn default_models() -> Vec<String> {
    vec!["gemini-1.5-flash".to_string(), "gemini-1.5-pro".to_string()]
}
fn default_max_retries() -> u32 {
    3
}
fn default_backoff_base_ms() -> u64 {
    2000
}
fn default_timeout_secs() -> u64 {
    20
}
fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct MigrateConfig {
    #[serde(default = "default_schema_version")]
    pub schema_version: String,
    #[serde(default = "default_pipeline_version")]
    pub pipeline_version: String,
    #[serde(default = "default_placeholder")]
    pub placeholder: String,
}

impl Default for MigrateConfig {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            pipeline_version: default_pipeline_version(),
            placeholder: default_placeholder(),
        }
    }
}

fn default_schema_version() -> String {
    crate::blueprint::SCHEMA_VERSION.to_string()
}
fn default_pipeline_version() -> String {
    "legacy".to_string()
}
fn default_placeholder() -> String {
    "Placeholder - missing in source".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct ValidateConfig {
    #[serde(default = "default_output_dir")]
    pub blueprints_dir: PathBuf,
    /// Formal schema for `--strict`; the built-in schema is used when unset.
    #[serde(default)]
    pub schema: Option<PathBuf>,
}

impl Default for ValidateConfig {
    fn default() -> Self {
        Self {
            blueprints_dir: default_output_dir(),
            schema: None,
        }
    }
}

impl EnrichmentConfig {
    pub fn is_enabled(&self) -> bool {
        self.enabled && self.provider != "disabled"
    }
}

impl Config {
    /// Built-in defaults, used when no config file exists.
    pub fn minimal() -> Self {
        Self::default()
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate_config(&config)?;
    Ok(config)
}

/// Load `path` when given; otherwise the default location if it exists,
/// else [`Config::minimal`].
pub fn load_or_default(path: Option<&Path>, default_path: &Path) -> Result<Config> {
    match path {
        Some(p) => load_config(p),
        None if default_path.exists() => load_config(default_path),
        None => Ok(Config::minimal()),
    }
}

pub fn validate_config(config: &Config) -> Result<()> {
    if config.pipeline.workers == 0 {
        bail!("pipeline.workers must be >= 1");
    }

    if config.pipeline.extensions.is_empty() {
        bail!("pipeline.extensions must list at least one extension");
    }

    config
        .sanitize
        .build()
        .with_context(|| "Invalid [sanitize] patterns")?;

    match config.enrichment.provider.as_str() {
        "disabled" | "gemini" => {}
        other => bail!(
            "Unknown enrichment provider: '{}'. Must be disabled or gemini.",
            other
        ),
    }

    if config.enrichment.is_enabled() && config.enrichment.models.is_empty() {
        bail!("enrichment.models must list at least one model when enrichment is enabled");
    }

    Ok(())
}
