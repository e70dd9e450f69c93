//! # Vellum Pipeline
//!
//! Per-file orchestration and the fail-soft batch runner.
//!
//! The pipeline only coordinates: parsing and serialization live in
//! `vellum-parser`, templates and reconciliation in `vellum-core`, remote
//! fetches in `vellum-enrichment`. File discovery is left to the caller.

pub mod error;
pub mod note_pipeline;
pub mod report;

pub use error::{PipelineError, Result};
pub use note_pipeline::{BatchSummary, FileOutcome, NotePipeline, NotePipelineConfig, ProcessMode};
pub use report::write_report;
