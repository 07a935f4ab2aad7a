//! # Blueprint Forge
//!
//! A local-first pipeline that turns raw documents into structured,
//! validated blueprint records.
//!
//! Source documents (text, markdown, PDF, DOCX) are sanitized, optionally
//! stripped of PII, split into segments at heading-like lines, classified,
//! and written as one JSON blueprint per segment. Companion commands
//! validate a directory of blueprints and migrate older records to the
//! current schema.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐   ┌──────────────────────┐   ┌────────────┐
//! │  Loader    │──▶│ Sanitize / PII /     │──▶│  Builder   │
//! │ txt/md/pdf │   │ Segment / Classify   │   │ (+enrich)  │
//! └────────────┘   └──────────────────────┘   └─────┬──────┘
//!                                                   ▼
//!                  ┌──────────┐   ┌──────────┐   ┌─────────┐
//!                  │ Validate │◀──│ Migrate  │◀──│ Output  │
//!                  └──────────┘   └──────────┘   └─────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! forge run --input-dir framework --output-dir blueprints
//! forge validate blueprints --strict
//! forge migrate --input-dir blueprints --apply
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`extract`] | PDF / DOCX text extraction |
//! | [`loader`] | Source discovery and loading |
//! | [`blueprint`] | Record shape, builder, markdown view |
//! | [`enrich`] | Optional LLM enrichment with retries |
//! | [`output`] | Output naming and atomic writes |
//! | [`pipeline`] | The run loop and worker pool |
//! | [`manifest`] | Run manifest and audit log |
//! | [`progress`] | Progress reporting on stderr |
//! | [`migrate`] | Schema migration of existing records |
//! | [`validate`] | Directory validation |
//! | [`schema`] | JSON Schema subset checker |
//!
//! The I/O-free pieces (sanitizer, PII redaction, segmenter, classifier,
//! hashing) live in the `blueprint-forge-core` crate.

pub mod blueprint;
pub mod config;
pub mod enrich;
pub mod extract;
pub mod loader;
pub mod manifest;
pub mod migrate;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod schema;
pub mod validate;
