//! Formal JSON Schema checks for `validate --strict`.
//!
//! Schemas are compiled once per run with the `jsonschema` crate, so every
//! keyword the draft defines is enforced, user-supplied schemas included.
//! Violations are reported with the instance path of the offending value.

use anyhow::{anyhow, Context, Result};
use serde_json::Value;
use std::path::Path;

/// Built-in blueprint schema used when no schema file is given.
pub const BUILTIN_SCHEMA: &str = include_str!("../schemas/blueprint.schema.json");

/// Reported violations per record before the rest are elided.
const MAX_REPORTED: usize = 3;

pub struct BlueprintSchema {
    validator: jsonschema::Validator,
}

impl BlueprintSchema {
    pub fn compile(schema: &Value) -> Result<Self> {
        let validator =
            jsonschema::validator_for(schema).map_err(|e| anyhow!("Invalid schema: {}", e))?;
        Ok(Self { validator })
    }

    pub fn builtin() -> Result<Self> {
        let schema: Value = serde_json::from_str(BUILTIN_SCHEMA)
            .with_context(|| "built-in schema is not valid JSON")?;
        Self::compile(&schema)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read schema {}", path.display()))?;
        let schema: Value = serde_json::from_str(&text)
            .with_context(|| format!("Invalid schema JSON: {}", path.display()))?;
        Self::compile(&schema).with_context(|| format!("Failed to compile {}", path.display()))
    }

    /// Check `value`; the error lists the first few violations.
    pub fn check(&self, value: &Value) -> Result<()> {
        let mut violations = Vec::new();
        let mut total = 0usize;
        for error in self.validator.iter_errors(value) {
            total += 1;
            if violations.len() < MAX_REPORTED {
                let path = error.instance_path.to_string();
                let at = if path.is_empty() { "/".to_string() } else { path };
                violations.push(format!("{}: {}", at, error));
            }
        }
        if total == 0 {
            return Ok(());
        }
        let mut message = violations.join("; ");
        if total > MAX_REPORTED {
            message.push_str(&format!(" (+{} more)", total - MAX_REPORTED));
        }
        Err(anyhow!(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builtin_schema_compiles() {
        assert!(BlueprintSchema::builtin().is_ok());
    }

    #[test]
    fn reports_missing_required() {
        let schema = BlueprintSchema::compile(&json!({ "type": "object", "required": ["id"] })).unwrap();
        let err = schema.check(&json!({})).unwrap_err();
        assert!(err.to_string().contains("\"id\""), "{}", err);
    }

    #[test]
    fn nested_paths_in_errors() {
        let schema = BlueprintSchema::compile(&json!({
            "type": "object",
            "properties": {
                "tags": { "type": "array", "items": { "type": "string", "minLength": 1 } },
                "status": { "enum": ["draft", "complete"] }
            }
        }))
        .unwrap();
        assert!(schema.check(&json!({ "tags": ["a"], "status": "draft" })).is_ok());

        let err = schema.check(&json!({ "tags": ["a", ""] })).unwrap_err();
        assert!(err.to_string().starts_with("/tags/1"), "{}", err);

        assert!(schema.check(&json!({ "status": "done" })).is_err());
    }

    #[test]
    fn enforces_pattern_length_and_additional_properties() {
        let schema = BlueprintSchema::compile(&json!({
            "type": "object",
            "additionalProperties": false,
            "properties": {
                "id": { "type": "string", "pattern": "^BP-[0-9]+$" },
                "version": { "type": "string", "maxLength": 3 }
            }
        }))
        .unwrap();
        assert!(schema.check(&json!({ "id": "BP-12", "version": "0.1" })).is_ok());

        let err = schema
            .check(&json!({ "id": "not-an-id", "version": "0.1.2.3.4", "rogue": 1 }))
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("/id"), "{}", message);
        assert!(message.contains("/version"), "{}", message);
        assert!(message.contains("rogue"), "{}", message);
    }

    #[test]
    fn refs_and_one_of_are_followed() {
        let schema = BlueprintSchema::compile(&json!({
            "$defs": { "label": { "type": "string", "minLength": 2 } },
            "type": "object",
            "properties": {
                "brand": { "$ref": "#/$defs/label" },
                "version": { "oneOf": [{ "type": "string" }, { "type": "integer" }] }
            }
        }))
        .unwrap();
        assert!(schema.check(&json!({ "brand": "ok", "version": 3 })).is_ok());
        assert!(schema.check(&json!({ "brand": "x" })).is_err());
        assert!(schema.check(&json!({ "version": 1.5 })).is_err());
    }

    #[test]
    fn malformed_schema_is_rejected() {
        assert!(BlueprintSchema::compile(&json!({ "type": 12 })).is_err());
    }
}
