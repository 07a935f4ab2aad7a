//! Blueprint records: the persisted JSON shape, the builder that fills it
//! from a segment, and the markdown master-template view.

use blueprint_forge_core::hashing::blueprint_id;
use blueprint_forge_core::models::{ContentType, Segment};
use serde::{Deserialize, Serialize};

pub const SCHEMA_VERSION: &str = "1.2";
/// Version of the record contents, distinct from the schema version.
pub const RECORD_VERSION: &str = "0.3";
pub const PIPELINE_NAME: &str = "blueprint-forge";
pub const PIPELINE_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const BRAND: &str = "NamoNexus";
pub const SLOGAN: &str = "Elevate your existence with NamoNexus.";
pub const META_DEFINITION: &str = "This Blueprint is designed as an entity beyond AI - \
a self-evolving, meta-intelligent framework that grows infinitely across dimensions.";

/// Characters of segment content copied into the executive summary.
const SUMMARY_CHARS: usize = 600;

pub const TOP_LEVEL_FIELDS: [&str; 12] = [
    "schema_version",
    "id",
    "brand",
    "title",
    "slogan",
    "meta_definition",
    "tags",
    "sections",
    "visual_identity",
    "status",
    "version",
    "metadata",
];

pub const REQUIRED_SECTIONS: [&str; 8] = [
    "executive_summary",
    "value_proposition",
    "system_overview",
    "quick_start_guide",
    "template_instructions",
    "examples",
    "license_and_notes",
    "marketing_pack",
];

pub const OPTIONAL_SECTIONS: [&str; 4] = [
    "engineering_alignment",
    "self_evolution_loop",
    "kpis",
    "safety_compliance",
];

pub const REQUIRED_METADATA: [&str; 9] = [
    "author",
    "language",
    "source_file",
    "source_name",
    "source_hash",
    "source_bytes",
    "last_updated",
    "pipeline",
    "pipeline_version",
];

/// Metadata keys the migrator carries over untouched when present.
pub const OPTIONAL_METADATA: [&str; 11] = [
    "source_mtime",
    "content_hash",
    "content_type",
    "segment_index",
    "segment_count",
    "license_id",
    "build_id",
    "run_id",
    "pii_redacted",
    "anonymized_source",
    "enriched",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Draft,
    Complete,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Blueprint {
    pub schema_version: String,
    pub id: String,
    pub brand: String,
    pub title: String,
    pub slogan: String,
    pub meta_definition: String,
    pub tags: Vec<String>,
    pub sections: Sections,
    pub visual_identity: serde_json::Map<String, serde_json::Value>,
    pub status: Status,
    pub version: String,
    pub metadata: BlueprintMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sections {
    pub executive_summary: String,
    pub value_proposition: String,
    pub system_overview: String,
    pub quick_start_guide: String,
    pub template_instructions: String,
    pub examples: String,
    pub license_and_notes: String,
    pub marketing_pack: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engineering_alignment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub self_evolution_loop: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kpis: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub safety_compliance: Option<String>,
}

impl Sections {
    /// Default scaffold text with the executive summary taken from `content`.
    pub fn scaffold(content: &str) -> Self {
        Self {
            executive_summary: content.chars().take(SUMMARY_CHARS).collect(),
            value_proposition: "Universal adaptability, modular architecture, AI-agnostic \
integration, and self-evolving design."
                .to_string(),
            system_overview: "A layered framework transforming raw data into commercial \
blueprints with metadata and validation."
                .to_string(),
            quick_start_guide: "1) Place raw files into /framework  2) Run the pipeline  \
3) Review JSON in /blueprints  4) Deploy to your ecosystem."
                .to_string(),
            template_instructions: "Follow the schema. Keep sections concise. Use neutral, \
professional English. Avoid personal names."
                .to_string(),
            examples: "Education curricula, healthcare protocols, financial decision flows, \
brand guidelines."
                .to_string(),
            license_and_notes: "Licensed under NamoVerse Creative Framework License \
(NCFL-1.0). Provide attribution for redistribution."
                .to_string(),
            marketing_pack: "Target: builders, strategists, educators. Pain: unstructured \
data. USP: chaos-to-commerce via meta-intelligence. Pricing: Base/Pro tiers. \
GTM: ProductHunt + LinkedIn."
                .to_string(),
            engineering_alignment: None,
            self_evolution_loop: None,
            kpis: None,
            safety_compliance: None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        let value = match key {
            "executive_summary" => &self.executive_summary,
            "value_proposition" => &self.value_proposition,
            "system_overview" => &self.system_overview,
            "quick_start_guide" => &self.quick_start_guide,
            "template_instructions" => &self.template_instructions,
            "examples" => &self.examples,
            "license_and_notes" => &self.license_and_notes,
            "marketing_pack" => &self.marketing_pack,
            "engineering_alignment" => return self.engineering_alignment.as_deref(),
            "self_evolution_loop" => return self.self_evolution_loop.as_deref(),
            "kpis" => return self.kpis.as_deref(),
            "safety_compliance" => return self.safety_compliance.as_deref(),
            _ => return None,
        };
        Some(value.as_str())
    }

    /// Overwrite a known section. Returns false for unknown keys.
    pub fn set(&mut self, key: &str, value: String) -> bool {
        let slot = match key {
            "executive_summary" => &mut self.executive_summary,
            "value_proposition" => &mut self.value_proposition,
            "system_overview" => &mut self.system_overview,
            "quick_start_guide" => &mut self.quick_start_guide,
            "template_instructions" => &mut self.template_instructions,
            "examples" => &mut self.examples,
            "license_and_notes" => &mut self.license_and_notes,
            "marketing_pack" => &mut self.marketing_pack,
            "engineering_alignment" => {
                self.engineering_alignment = Some(value);
                return true;
            }
            "self_evolution_loop" => {
                self.self_evolution_loop = Some(value);
                return true;
            }
            "kpis" => {
                self.kpis = Some(value);
                return true;
            }
            "safety_compliance" => {
                self.safety_compliance = Some(value);
                return true;
            }
            _ => return false,
        };
        *slot = value;
        true
    }

    /// Present sections in template order: required first, then optional.
    pub fn ordered(&self) -> Vec<(&'static str, &str)> {
        REQUIRED_SECTIONS
            .iter()
            .chain(OPTIONAL_SECTIONS.iter())
            .filter_map(|k| self.get(k).map(|v| (*k, v)))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlueprintMetadata {
    pub author: String,
    pub language: String,
    pub source_file: String,
    pub source_name: String,
    pub source_hash: String,
    pub source_bytes: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_mtime: Option<String>,
    pub content_hash: String,
    pub content_type: ContentType,
    pub segment_index: usize,
    pub segment_count: usize,
    pub last_updated: String,
    pub pipeline: String,
    pub pipeline_version: String,
    pub license_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pii_redacted: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anonymized_source: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enriched: Option<bool>,
}

/// Facts about the source document shared by all of its segments.
#[derive(Debug, Clone)]
pub struct SourceInfo {
    /// Repo-relative path, or `hash:<id>` when anonymized.
    pub source_file: String,
    pub source_name: String,
    /// File stem used for titles and output names. Never anonymized.
    pub stem: String,
    pub source_hash: String,
    pub source_bytes: u64,
    pub source_mtime: Option<String>,
    pub anonymized: bool,
}

/// Per-run settings stamped into every record.
#[derive(Debug, Clone)]
pub struct BuildContext {
    pub author: String,
    pub license_id: String,
    pub build_id: Option<String>,
    pub run_id: Option<String>,
    pub pii_redacted: bool,
    pub last_updated: String,
}

impl BuildContext {
    pub fn today() -> String {
        chrono::Utc::now().date_naive().to_string()
    }
}

/// Human title from a file stem: underscores become spaces.
pub fn document_title(stem: &str) -> String {
    stem.replace('_', " ").trim().to_string()
}

pub fn build_blueprint(segment: &Segment, source: &SourceInfo, ctx: &BuildContext) -> Blueprint {
    let doc_title = document_title(&source.stem);
    let title = match &segment.title {
        Some(t) if !t.is_empty() && segment.count > 1 => format!("{}: {}", doc_title, t),
        _ => doc_title,
    };

    let content_type = segment.content_type;
    let mut sections = Sections::scaffold(&segment.content);
    if matches!(content_type, ContentType::Code | ContentType::Architecture) {
        sections.engineering_alignment = Some(format!(
            "Role: {}. Keep the interfaces and module boundaries described here stable, \
and land changes together with tests.",
            content_type.role()
        ));
    }
    if content_type == ContentType::Evolution {
        sections.self_evolution_loop = Some(
            "Observe outcomes, propose a change, ship it as a canary, compare against \
the baseline, then promote or roll back."
                .to_string(),
        );
        sections.kpis =
            Some("Adoption rate, error rate, drift from baseline, time to recover.".to_string());
    }
    if content_type == ContentType::Prompt || ctx.pii_redacted {
        sections.safety_compliance = Some(
            "Prompts and outputs must not carry personal names or personal data. \
Redacted values stay redacted downstream."
                .to_string(),
        );
    }

    Blueprint {
        schema_version: SCHEMA_VERSION.to_string(),
        id: blueprint_id(&source.source_name, segment.index, &segment.content_hash),
        brand: BRAND.to_string(),
        title,
        slogan: SLOGAN.to_string(),
        meta_definition: META_DEFINITION.to_string(),
        tags: normalize_tags(vec![
            content_type.as_str().to_string(),
            content_type.role().to_string(),
        ]),
        sections,
        visual_identity: serde_json::Map::new(),
        status: Status::Draft,
        version: RECORD_VERSION.to_string(),
        metadata: BlueprintMetadata {
            author: ctx.author.clone(),
            language: "en".to_string(),
            source_file: source.source_file.clone(),
            source_name: source.source_name.clone(),
            source_hash: source.source_hash.clone(),
            source_bytes: source.source_bytes,
            source_mtime: source.source_mtime.clone(),
            content_hash: segment.content_hash.clone(),
            content_type,
            segment_index: segment.index,
            segment_count: segment.count,
            last_updated: ctx.last_updated.clone(),
            pipeline: PIPELINE_NAME.to_string(),
            pipeline_version: PIPELINE_VERSION.to_string(),
            license_id: ctx.license_id.clone(),
            build_id: ctx.build_id.clone(),
            run_id: ctx.run_id.clone(),
            pii_redacted: Some(ctx.pii_redacted),
            anonymized_source: Some(source.anonymized),
            enriched: None,
        },
    }
}

/// Trim, drop empties, sort, de-duplicate.
pub fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = tags
        .into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();
    out.sort();
    out.dedup();
    out
}

impl Blueprint {
    pub fn to_json(&self) -> serde_json::Result<String> {
        let mut out = serde_json::to_string_pretty(self)?;
        out.push('\n');
        Ok(out)
    }

    /// Markdown master-template view with YAML front matter. The
    /// `content_hash:` line is what the output resolver reads back.
    pub fn to_markdown(&self) -> String {
        let quote = |s: &str| serde_json::to_string(s).unwrap_or_else(|_| format!("\"{}\"", s));
        let mut out = String::new();
        out.push_str("---\n");
        out.push_str(&format!("id: {}\n", self.id));
        out.push_str(&format!("title: {}\n", quote(&self.title)));
        out.push_str(&format!("schema_version: {}\n", quote(&self.schema_version)));
        out.push_str(&format!("content_type: {}\n", self.metadata.content_type));
        out.push_str(&format!("content_hash: {}\n", self.metadata.content_hash));
        out.push_str(&format!("source_name: {}\n", quote(&self.metadata.source_name)));
        out.push_str(&format!("tags: [{}]\n", self.tags.join(", ")));
        out.push_str("---\n\n");

        out.push_str(&format!("# {} Master Blueprint: {}\n\n", self.brand, self.title));
        if !self.slogan.is_empty() {
            out.push_str(&format!("> **Slogan:** {}\n\n", self.slogan));
        }
        if !self.meta_definition.is_empty() {
            out.push_str(&format!("## Meta Definition\n> {}\n\n", self.meta_definition));
        }
        for (i, (key, body)) in self.sections.ordered().into_iter().enumerate() {
            out.push_str(&format!("## {}. {}\n{}\n\n", i + 1, section_heading(key), body));
        }
        out.push_str("---\n");
        out.push_str(&format!(
            "*Generated by {} {} from {}.*\n",
            self.metadata.pipeline, self.metadata.pipeline_version, self.metadata.source_name
        ));
        out
    }
}

/// `license_and_notes` -> `License and Notes`.
fn section_heading(key: &str) -> String {
    key.split('_')
        .map(|w| match w {
            "and" => "and".to_string(),
            "kpis" => "KPIs".to_string(),
            _ => {
                let mut chars = w.chars();
                match chars.next() {
                    Some(c) => c.to_uppercase().chain(chars).collect(),
                    None => String::new(),
                }
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
