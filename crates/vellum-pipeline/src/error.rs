//! Pipeline errors.

use std::path::PathBuf;
use thiserror::Error;
use vellum_core::TemplateError;
use vellum_enrichment::EnrichmentError;

/// Errors raised while processing a file or setting up a pipeline.
///
/// Per-file variants are isolated by the batch runner; they never abort
/// other files.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The file could not be read.
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The rewritten file could not be written; the original is untouched.
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The batch report could not be written.
    #[error("Failed to write report to {path}: {source}")]
    Report {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A configured template is unusable.
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// Enrichment providers could not be built.
    #[error(transparent)]
    Enrichment(#[from] EnrichmentError),
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;
