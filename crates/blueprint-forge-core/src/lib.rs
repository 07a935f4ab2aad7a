//! # Blueprint Forge Core
//!
//! Shared, I/O-free logic for Blueprint Forge: data models, text
//! sanitizing, PII redaction, heading-based segmentation, and content
//! classification.
//!
//! This crate performs no filesystem or network access. Everything here is
//! a pure function of its inputs, which keeps the pipeline's per-file work
//! safe to run on any worker thread.

pub mod classify;
pub mod hashing;
pub mod models;
pub mod pii;
pub mod sanitize;
pub mod segment;
