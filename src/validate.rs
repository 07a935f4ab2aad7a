//! Blueprint directory validation.
//!
//! Each `*.json` record is classified as ok, warn, or error:
//!
//! - unparseable JSON is an error (`invalid-json`)
//! - in strict mode a schema violation is an error (`schema-error:<msg>`)
//! - a missing or blank required section is an error
//! - missing top-level fields or required metadata are warnings, errors in
//!   strict mode
//!
//! Files whose names start with `_` (run manifests) are not records and are
//! skipped.

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::blueprint::{REQUIRED_METADATA, REQUIRED_SECTIONS, TOP_LEVEL_FIELDS};
use crate::migrate::is_record_file;
use crate::output::write_atomic;
use crate::schema::BlueprintSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationStatus {
    Ok,
    Warn,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileValidation {
    pub file: String,
    pub status: ValidationStatus,
    pub missing_sections: Vec<String>,
    pub missing_fields: Vec<String>,
    pub errors: Vec<String>,
}

impl FileValidation {
    fn new(file: String) -> Self {
        Self {
            file,
            status: ValidationStatus::Ok,
            missing_sections: Vec::new(),
            missing_fields: Vec::new(),
            errors: Vec::new(),
        }
    }

    fn fail(mut self, error: String) -> Self {
        self.status = ValidationStatus::Error;
        self.errors.push(error);
        self
    }

    /// The per-file line printed by `forge validate`.
    pub fn line(&self) -> String {
        match self.status {
            ValidationStatus::Ok => format!("OK: {} complete", self.file),
            ValidationStatus::Warn => format!("Warning: {} missing fields or sections", self.file),
            ValidationStatus::Error => format!("Error: {} failed validation", self.file),
        }
    }
}

/// A metadata value counts as present unless it is null, `false`, or an
/// empty or blank string. Zero is present.
fn present(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => false,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(_) => true,
    }
}

/// Classify one parsed record. `schema` is consulted only in strict mode.
pub fn validate_value(
    file: &str,
    value: &Value,
    schema: Option<&BlueprintSchema>,
    strict: bool,
) -> FileValidation {
    let mut result = FileValidation::new(file.to_string());

    if strict {
        if let Some(schema) = schema {
            if let Err(e) = schema.check(value) {
                return result.fail(format!("schema-error:{}", e));
            }
        }
    }

    let Some(obj) = value.as_object() else {
        return result.fail("not-an-object".to_string());
    };

    for key in TOP_LEVEL_FIELDS {
        if !obj.contains_key(key) {
            result.missing_fields.push(key.to_string());
        }
    }

    let sections = obj.get("sections").and_then(Value::as_object);
    result.missing_sections = REQUIRED_SECTIONS
        .iter()
        .filter(|k| {
            !sections
                .and_then(|s| s.get(**k))
                .and_then(Value::as_str)
                .map(|s| !s.trim().is_empty())
                .unwrap_or(false)
        })
        .map(|k| k.to_string())
        .collect();

    let metadata = obj.get("metadata").and_then(Value::as_object);
    for key in REQUIRED_METADATA {
        if !present(metadata.and_then(|m| m.get(key))) {
            result.missing_fields.push(format!("metadata.{}", key));
        }
    }

    result.status = if !result.missing_sections.is_empty() {
        ValidationStatus::Error
    } else if !result.missing_fields.is_empty() {
        if strict {
            ValidationStatus::Error
        } else {
            ValidationStatus::Warn
        }
    } else {
        ValidationStatus::Ok
    };
    result
}

pub fn validate_file(path: &Path, schema: Option<&BlueprintSchema>, strict: bool) -> FileValidation {
    let name = crate::loader::file_name(path);
    let text = match std::fs::read_to_string(path) {
        Ok(t) => t,
        Err(e) => return FileValidation::new(name).fail(format!("read-error:{}", e)),
    };
    match serde_json::from_str::<Value>(&text) {
        Ok(value) => validate_value(&name, &value, schema, strict),
        Err(_) => FileValidation::new(name).fail("invalid-json".to_string()),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub ok: usize,
    pub warn: usize,
    pub error: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationSummary {
    pub date: String,
    pub counts: StatusCounts,
    pub total: usize,
    pub files: Vec<FileValidation>,
}

impl ValidationSummary {
    pub fn line(&self) -> String {
        format!(
            "Summary {}: OK={}, Warning={}, Error={}",
            self.date, self.counts.ok, self.counts.warn, self.counts.error
        )
    }

    pub fn exit_code(&self) -> i32 {
        if self.counts.error > 0 {
            1
        } else {
            0
        }
    }
}

#[derive(Debug, Clone)]
pub struct ValidateOptions {
    pub dir: PathBuf,
    /// Schema for strict mode; the built-in schema when `None`.
    pub schema: Option<PathBuf>,
    pub strict: bool,
    pub summary_json: Option<PathBuf>,
    pub fail_fast: bool,
}

/// Validate a directory, printing one line per file and a summary to `out`.
/// Returns `None` when the directory does not exist.
pub fn run_validate(opts: &ValidateOptions, out: &mut dyn Write) -> Result<Option<ValidationSummary>> {
    if !opts.dir.is_dir() {
        writeln!(
            out,
            "Directory '{}' not found. Skipping validation.",
            opts.dir.display()
        )?;
        return Ok(None);
    }

    let schema = if opts.strict {
        Some(match &opts.schema {
            Some(path) => BlueprintSchema::load(path)?,
            None => BlueprintSchema::builtin()?,
        })
    } else {
        None
    };

    let mut files: Vec<PathBuf> = std::fs::read_dir(&opts.dir)
        .with_context(|| format!("Failed to read {}", opts.dir.display()))?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && is_record_file(p))
        .collect();
    files.sort();

    let mut counts = StatusCounts::default();
    let mut results = Vec::with_capacity(files.len());
    for path in &files {
        let result = validate_file(path, schema.as_ref(), opts.strict);
        writeln!(out, "{}", result.line())?;
        if !result.errors.is_empty() {
            tracing::debug!(file = %result.file, errors = ?result.errors, "validation errors");
        }
        match result.status {
            ValidationStatus::Ok => counts.ok += 1,
            ValidationStatus::Warn => counts.warn += 1,
            ValidationStatus::Error => counts.error += 1,
        }
        let stop = opts.fail_fast && result.status == ValidationStatus::Error;
        results.push(result);
        if stop {
            break;
        }
    }

    let summary = ValidationSummary {
        date: chrono::Utc::now().date_naive().to_string(),
        counts,
        total: results.len(),
        files: results,
    };
    writeln!(out, "{}", summary.line())?;

    if let Some(path) = &opts.summary_json {
        let mut json = serde_json::to_string_pretty(&summary)?;
        json.push('\n');
        write_atomic(path, &json)
            .with_context(|| format!("Failed to write summary {}", path.display()))?;
    }
    Ok(Some(summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;

    fn complete() -> Value {
        let sections: serde_json::Map<String, Value> = REQUIRED_SECTIONS
            .iter()
            .map(|k| (k.to_string(), json!("text")))
            .collect();
        json!({
            "schema_version": "1.2",
            "id": "BP-1",
            "brand": "B",
            "title": "T",
            "slogan": "",
            "meta_definition": "",
            "tags": [],
            "sections": sections,
            "visual_identity": {},
            "status": "complete",
            "version": "0.3",
            "metadata": {
                "author": "a", "language": "en", "source_file": "f", "source_name": "n",
                "source_hash": "h", "source_bytes": 0, "last_updated": "2026-01-01",
                "pipeline": "p", "pipeline_version": "1"
            }
        })
    }

    #[test]
    fn complete_record_is_ok_with_zero_bytes() {
        let r = validate_value("a.json", &complete(), None, false);
        assert_eq!(r.status, ValidationStatus::Ok, "{:?}", r);
        let schema = BlueprintSchema::builtin().unwrap();
        let r = validate_value("a.json", &complete(), Some(&schema), true);
        assert_eq!(r.status, ValidationStatus::Ok, "{:?}", r);
    }

    #[test]
    fn missing_section_is_error() {
        let mut v = complete();
        v["sections"].as_object_mut().unwrap().remove("marketing_pack");
        let r = validate_value("a.json", &v, None, false);
        assert_eq!(r.status, ValidationStatus::Error);
        assert_eq!(r.missing_sections, vec!["marketing_pack"]);

        let mut v = complete();
        v["sections"]["examples"] = json!("   ");
        assert_eq!(
            validate_value("a.json", &v, None, false).status,
            ValidationStatus::Error
        );
    }

    #[test]
    fn missing_metadata_warns_or_errors() {
        let mut v = complete();
        v["metadata"]["author"] = json!("");
        let r = validate_value("a.json", &v, None, false);
        assert_eq!(r.status, ValidationStatus::Warn);
        assert_eq!(r.missing_fields, vec!["metadata.author"]);
        assert_eq!(
            validate_value("a.json", &v, None, true).status,
            ValidationStatus::Error
        );
    }

    #[test]
    fn missing_top_level_warns() {
        let mut v = complete();
        v.as_object_mut().unwrap().remove("visual_identity");
        let r = validate_value("a.json", &v, None, false);
        assert_eq!(r.status, ValidationStatus::Warn);
        assert_eq!(r.missing_fields, vec!["visual_identity"]);
    }

    #[test]
    fn strict_schema_failure_is_reported() {
        let mut v = complete();
        v["status"] = json!("published");
        let schema = BlueprintSchema::builtin().unwrap();
        let r = validate_value("a.json", &v, Some(&schema), true);
        assert_eq!(r.status, ValidationStatus::Error);
        assert!(r.errors[0].starts_with("schema-error:"));
    }

    #[test]
    fn directory_run_prints_lines_and_summary() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("blueprints");
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("a.json"), complete().to_string()).unwrap();
        fs::write(dir.join("b.json"), "{oops").unwrap();
        fs::write(dir.join("_manifest.json"), "{}").unwrap();

        let opts = ValidateOptions {
            dir: dir.clone(),
            schema: None,
            strict: false,
            summary_json: Some(tmp.path().join("summary.json")),
            fail_fast: false,
        };
        let mut out = Vec::new();
        let summary = run_validate(&opts, &mut out).unwrap().unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "OK: a.json complete");
        assert_eq!(lines[1], "Error: b.json failed validation");
        assert!(lines[2].starts_with("Summary "));
        assert!(lines[2].ends_with("OK=1, Warning=0, Error=1"));
        assert_eq!(summary.exit_code(), 1);
        assert_eq!(summary.files[1].errors, vec!["invalid-json"]);
        assert!(tmp.path().join("summary.json").exists());
    }

    #[test]
    fn fail_fast_stops_at_first_error() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("a.json"), "[").unwrap();
        fs::write(tmp.path().join("b.json"), complete().to_string()).unwrap();
        let opts = ValidateOptions {
            dir: tmp.path().to_path_buf(),
            schema: None,
            strict: false,
            summary_json: None,
            fail_fast: true,
        };
        let mut out = Vec::new();
        let summary = run_validate(&opts, &mut out).unwrap().unwrap();
        assert_eq!(summary.total, 1);
    }

    #[test]
    fn missing_directory_is_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        let opts = ValidateOptions {
            dir: tmp.path().join("none"),
            schema: None,
            strict: false,
            summary_json: None,
            fail_fast: false,
        };
        let mut out = Vec::new();
        assert!(run_validate(&opts, &mut out).unwrap().is_none());
        assert!(String::from_utf8(out).unwrap().contains("not found. Skipping validation."));
    }
}
