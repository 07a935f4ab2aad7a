//! Optional LLM enrichment.
//!
//! A built blueprint can be handed to an [`Enricher`] that rewrites some
//! sections and proposes tags. The collaborator is unreliable by contract:
//! every call may fail or return garbage. [`Enrichment::apply`] retries each
//! model with exponential backoff, falls through the configured model list,
//! and leaves the blueprint untouched when nothing usable comes back.
//!
//! The default backend is the Gemini REST API over blocking `reqwest`.

use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;

use crate::blueprint::{normalize_tags, Blueprint};
use crate::config::EnrichmentConfig;

/// Characters of the executive summary sent in the prompt.
const PROMPT_CONTENT_CHARS: usize = 4000;

const GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Text generation backend.
pub trait Enricher: Send + Sync {
    fn generate(&self, model: &str, prompt: &str) -> Result<String>;
}

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Attempts per model.
    pub max_attempts: u32,
    pub backoff_base: Duration,
}

impl RetryPolicy {
    /// Delay after failed attempt `attempt` (1-based): base, 2x, 4x, ...
    /// capped at 32x.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = 1u32 << attempt.saturating_sub(1).min(5);
        self.backoff_base * factor
    }
}

pub struct GeminiEnricher {
    client: reqwest::blocking::Client,
    api_key: String,
    endpoint: String,
}

impl GeminiEnricher {
    pub fn new(api_key: String, timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            api_key,
            endpoint: GEMINI_ENDPOINT.to_string(),
        })
    }

    /// Fails when the API key variable is unset.
    pub fn from_config(config: &EnrichmentConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env)
            .map_err(|_| anyhow!("{} environment variable not set", config.api_key_env))?;
        Self::new(api_key, Duration::from_secs(config.timeout_secs))
    }

    /// Base URL the model path is appended to.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

impl Enricher for GeminiEnricher {
    fn generate(&self, model: &str, prompt: &str) -> Result<String> {
        // The key travels in a header so it never shows up in error URLs.
        let url = format!("{}/{}:generateContent", self.endpoint, model);
        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
        });

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .map_err(reqwest::Error::without_url)?;
        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().unwrap_or_default();
            bail!("Gemini API error {}: {}", status, body_text);
        }

        let json: serde_json::Value = response.json().map_err(reqwest::Error::without_url)?;
        parse_gemini_response(&json)
    }
}

/// Concatenate `candidates[0].content.parts[].text`.
fn parse_gemini_response(json: &serde_json::Value) -> Result<String> {
    let parts = json
        .pointer("/candidates/0/content/parts")
        .and_then(|p| p.as_array())
        .ok_or_else(|| anyhow!("Invalid Gemini response: missing candidates"))?;
    let text: String = parts
        .iter()
        .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
        .collect();
    if text.trim().is_empty() {
        bail!("Gemini response contained no text");
    }
    Ok(text)
}

#[derive(Debug, Deserialize)]
struct EnrichmentReply {
    #[serde(default)]
    sections: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    tags: Vec<serde_json::Value>,
}

/// An enricher plus the models to try and how hard to try each one.
pub struct Enrichment {
    enricher: Box<dyn Enricher>,
    models: Vec<String>,
    retry: RetryPolicy,
}

impl Enrichment {
    pub fn new(enricher: Box<dyn Enricher>, models: Vec<String>, retry: RetryPolicy) -> Self {
        Self {
            enricher,
            models,
            retry,
        }
    }

    /// Gemini-backed enrichment from config. `Ok(None)` when disabled.
    pub fn from_config(config: &EnrichmentConfig) -> Result<Option<Self>> {
        if !config.is_enabled() {
            return Ok(None);
        }
        let enricher = GeminiEnricher::from_config(config)
            .with_context(|| "Failed to configure Gemini enrichment")?;
        Ok(Some(Self::new(
            Box::new(enricher),
            config.models.clone(),
            RetryPolicy {
                max_attempts: config.max_retries.max(1),
                backoff_base: Duration::from_millis(config.backoff_base_ms),
            },
        )))
    }

    /// Enrich `blueprint` in place. Returns the model that answered; on error
    /// the blueprint is unchanged.
    pub fn apply(&self, blueprint: &mut Blueprint) -> Result<String> {
        let prompt = build_prompt(blueprint);
        let mut last_err = None;

        for model in &self.models {
            for attempt in 1..=self.retry.max_attempts {
                match self
                    .enricher
                    .generate(model, &prompt)
                    .and_then(|text| parse_reply(&text))
                {
                    Ok(reply) => {
                        merge_reply(blueprint, reply);
                        tracing::info!(model = %model, id = %blueprint.id, "enrichment succeeded");
                        return Ok(model.clone());
                    }
                    Err(e) => {
                        tracing::warn!(model = %model, attempt, error = %e, "enrichment attempt failed");
                        last_err = Some(e);
                        if attempt < self.retry.max_attempts {
                            std::thread::sleep(self.retry.delay_for_attempt(attempt));
                        }
                    }
                }
            }
        }

        Err(last_err.unwrap_or_else(|| anyhow!("no enrichment models configured")))
    }
}

fn build_prompt(blueprint: &Blueprint) -> String {
    let content: String = blueprint
        .sections
        .executive_summary
        .chars()
        .take(PROMPT_CONTENT_CHARS)
        .collect();
    format!(
        r#"You are an expert Knowledge Architect. Transform the raw text below into a structured blueprint.

Raw content from a document titled "{title}":
---
{content}
---

Reply with a single JSON object, without markdown fences, of this shape:
{{
  "sections": {{
    "executive_summary": "A concise summary of the core idea (max 3 sentences).",
    "value_proposition": "The unique value or benefit (max 2 sentences).",
    "system_overview": "Technical or logical architecture description.",
    "quick_start_guide": "Step-by-step guide to get started.",
    "examples": "Practical use cases.",
    "marketing_pack": "Target audience, pain points, and selling points."
  }},
  "tags": ["tag1", "tag2", "tag3"]
}}

If the raw content is empty or meaningless, return reasonable placeholders related to "{title}".
"#,
        title = blueprint.title,
        content = content
    )
}

/// Drop a surrounding ```/```json fence if the model added one.
pub fn strip_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = match rest.find('\n') {
        Some(pos) => &rest[pos + 1..],
        None => rest.trim_start_matches("json"),
    };
    body.trim_end().trim_end_matches("```").trim()
}

fn parse_reply(text: &str) -> Result<EnrichmentReply> {
    serde_json::from_str(strip_fences(text)).with_context(|| "enrichment reply is not valid JSON")
}

fn merge_reply(blueprint: &mut Blueprint, reply: EnrichmentReply) {
    for (key, value) in reply.sections {
        let Some(text) = value.as_str().map(str::trim).filter(|s| !s.is_empty()) else {
            continue;
        };
        if !blueprint.sections.set(&key, text.to_string()) {
            tracing::debug!(section = %key, "ignoring unknown section from enrichment");
        }
    }

    let mut tags = std::mem::take(&mut blueprint.tags);
    tags.extend(
        reply
            .tags
            .iter()
            .filter_map(|t| t.as_str())
            .map(|t| t.to_lowercase()),
    );
    blueprint.tags = normalize_tags(tags);
    blueprint.metadata.enriched = Some(true);
}
