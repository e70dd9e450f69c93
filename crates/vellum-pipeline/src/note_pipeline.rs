//! Note Processing Pipeline
//!
//! Processes one Markdown file at a time:
//!
//! 1. **Resolve**: pick the template for the file's directory (skip if none)
//! 2. **Read + Extract**: a missing frontmatter block is an empty document
//! 3. **Normalize**: rename legacy keys (when enabled)
//! 4. **Reconcile**: inspect and, outside check mode, inject defaults
//! 5. **Enrich**: fetch derived fields (enrich mode only)
//! 6. **Write**: serialize in template order and write once, only if the
//!    text changed
//!
//! Enrichment works on a snapshot. Before writing, the file is read again and
//! the enrichment patch is replayed onto whatever is on disk by then, so
//! edits made during a slow fetch survive.

use crate::error::{PipelineError, Result};
use futures::stream::{self, StreamExt};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use vellum_config::VellumConfig;
use vellum_core::{
    normalize_aliases, reconcile_with_sink, serialize_options, ChangeEvent, ChangeReporter,
    NullSink, ReconcileOptions, Template, TemplateRegistry,
};
use vellum_enrichment::{EnrichmentCoordinator, EnrichmentOutcome, PatchOp};
use vellum_parser::{extract, update_document, FrontmatterDocument};

/// What a run is allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessMode {
    /// Report only; nothing is written
    Check,
    /// Inject template defaults and rewrite files
    Fix,
    /// Like `Fix`, plus external enrichment
    Enrich,
}

impl ProcessMode {
    pub fn auto_patch(&self) -> bool {
        !matches!(self, ProcessMode::Check)
    }

    pub fn enriches(&self) -> bool {
        matches!(self, ProcessMode::Enrich)
    }
}

/// Configuration for pipeline behavior
#[derive(Debug, Clone)]
pub struct NotePipelineConfig {
    /// Rename legacy keys before reconciling
    pub normalize_aliases: bool,
    /// Upper bound on files processed at once in a batch
    pub max_concurrent_files: usize,
}

impl Default for NotePipelineConfig {
    fn default() -> Self {
        Self {
            normalize_aliases: true,
            max_concurrent_files: 8,
        }
    }
}

impl From<&VellumConfig> for NotePipelineConfig {
    fn from(config: &VellumConfig) -> Self {
        Self {
            normalize_aliases: config.reconcile.normalize_aliases,
            max_concurrent_files: config.enrichment.max_concurrent_files.max(1),
        }
    }
}

/// Result of processing one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// No template governs the file
    Skipped,
    /// The file went through the pipeline
    Processed {
        template: String,
        /// Field values differ from what was on disk
        changed: bool,
        /// The new text was written to disk; also true for rewrites that only
        /// normalize formatting
        written: bool,
        /// Fields whose inspection was not `ok`
        issues: usize,
    },
}

/// Totals for a batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub processed: usize,
    /// Files whose field values changed (formatting-only rewrites excluded)
    pub changed: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

/// The pipeline orchestrator
///
/// ```text
/// NotePipeline
///   ├─> TemplateRegistry (resolve)
///   ├─> vellum-parser (extract / serialize)
///   ├─> vellum-core (normalize, reconcile, report)
///   └─> EnrichmentCoordinator (optional)
/// ```
pub struct NotePipeline {
    registry: TemplateRegistry,
    enrichment: Option<Arc<EnrichmentCoordinator>>,
    reporter: ChangeReporter,
    config: NotePipelineConfig,
}

impl NotePipeline {
    pub fn new(registry: TemplateRegistry, reporter: ChangeReporter) -> Self {
        Self::with_config(registry, reporter, NotePipelineConfig::default())
    }

    pub fn with_config(
        registry: TemplateRegistry,
        reporter: ChangeReporter,
        config: NotePipelineConfig,
    ) -> Self {
        Self {
            registry,
            enrichment: None,
            reporter,
            config,
        }
    }

    /// Build templates and, when enabled, HTTP enrichment from configuration.
    pub fn from_config(config: &VellumConfig, reporter: ChangeReporter) -> Result<Self> {
        let templates = config.effective_templates();
        let registry = TemplateRegistry::from_specs(
            config.content_root.clone(),
            templates.iter().map(|(name, spec)| (name, spec)),
        )?;

        let mut pipeline = Self::with_config(registry, reporter, NotePipelineConfig::from(config));

        if config.enrichment.enabled {
            let coordinator = EnrichmentCoordinator::from_config(&config.enrichment)?;
            if coordinator.has_providers() {
                pipeline = pipeline.with_enrichment(Arc::new(coordinator));
            } else {
                warn!("Enrichment enabled but no provider endpoint configured");
            }
        }

        Ok(pipeline)
    }

    /// Attach an enrichment coordinator (builder pattern).
    pub fn with_enrichment(mut self, coordinator: Arc<EnrichmentCoordinator>) -> Self {
        self.enrichment = Some(coordinator);
        self
    }

    pub fn reporter(&self) -> &ChangeReporter {
        &self.reporter
    }

    /// Process one file.
    ///
    /// Errors are returned, not recorded; [`process_batch`](Self::process_batch)
    /// records them.
    pub async fn process_file(&self, path: &Path, mode: ProcessMode) -> Result<FileOutcome> {
        let Some(template) = self.registry.resolve(path) else {
            debug!(path = %path.display(), "No template, skipping");
            return Ok(FileOutcome::Skipped);
        };

        let text = read(path).await?;
        let options = ReconcileOptions {
            auto_patch: mode.auto_patch(),
        };

        let mut doc = extract(&text).unwrap_or_default();
        if self.config.normalize_aliases {
            normalize_aliases(&mut doc, &template, path, &self.reporter);
        }
        let reconciled = reconcile_with_sink(&doc, &template, path, options, &self.reporter);
        let issues = reconciled.report.issues().count();

        if !options.auto_patch {
            info!(path = %path.display(), issues, "Checked");
            return Ok(FileOutcome::Processed {
                template: template.name.clone(),
                changed: false,
                written: false,
                issues,
            });
        }

        let enrichment = match (&self.enrichment, mode.enriches()) {
            (Some(coordinator), true) => Some(coordinator.process(&reconciled.patched, path).await),
            _ => None,
        };

        let (base_text, final_doc) = match &enrichment {
            Some(outcome) if !outcome.patch.is_empty() => {
                self.record_enrichment(path, outcome);
                let fresh_text = read(path).await?;
                let merged = if fresh_text == text {
                    outcome.updated.clone()
                } else {
                    debug!(path = %path.display(), "File changed during enrichment, merging onto fresh copy");
                    self.remerge(&fresh_text, &template, path, options, outcome)
                };
                (fresh_text, merged)
            }
            _ => (text.clone(), reconciled.patched),
        };

        let new_text = update_document(&base_text, &final_doc, &serialize_options(&template));
        let written = new_text != base_text;
        let changed = extract(&base_text).unwrap_or_default() != final_doc;

        if written {
            tokio::fs::write(path, &new_text)
                .await
                .map_err(|e| PipelineError::Write {
                    path: path.to_path_buf(),
                    source: e,
                })?;
            info!(path = %path.display(), issues, changed, "Updated frontmatter");
        } else {
            debug!(path = %path.display(), "Already up to date");
        }

        Ok(FileOutcome::Processed {
            template: template.name.clone(),
            changed,
            written,
            issues,
        })
    }

    /// Process many files with bounded concurrency.
    ///
    /// Every file is attempted; failures are logged, recorded as
    /// [`ChangeEvent::Failure`] and counted.
    pub async fn process_batch(&self, paths: Vec<PathBuf>, mode: ProcessMode) -> BatchSummary {
        let limit = self.config.max_concurrent_files.max(1);
        info!(files = paths.len(), ?mode, concurrency = limit, "Starting batch");

        let results: Vec<(PathBuf, Result<FileOutcome>)> = stream::iter(paths)
            .map(|path| async move {
                let result = self.process_file(&path, mode).await;
                (path, result)
            })
            .buffer_unordered(limit)
            .collect()
            .await;

        let mut summary = BatchSummary::default();
        for (path, result) in results {
            match result {
                Ok(FileOutcome::Skipped) => summary.skipped += 1,
                Ok(FileOutcome::Processed { changed, .. }) => {
                    summary.processed += 1;
                    if changed {
                        summary.changed += 1;
                    }
                    self.reporter.record(ChangeEvent::Processed { file: path });
                }
                Err(e) => {
                    error!(path = %path.display(), error = %e, "Failed to process file");
                    summary.failed += 1;
                    self.reporter.record(ChangeEvent::Failure {
                        file: path,
                        reason: e.to_string(),
                    });
                }
            }
        }

        info!(
            processed = summary.processed,
            changed = summary.changed,
            skipped = summary.skipped,
            failed = summary.failed,
            "Batch complete"
        );
        summary
    }

    /// Re-run normalization and reconciliation on the on-disk text, then
    /// replay the enrichment patch. Events were already recorded for the
    /// first pass, so this one is silent.
    fn remerge(
        &self,
        fresh_text: &str,
        template: &Template,
        path: &Path,
        options: ReconcileOptions,
        outcome: &EnrichmentOutcome,
    ) -> FrontmatterDocument {
        let mut fresh = extract(fresh_text).unwrap_or_default();
        if self.config.normalize_aliases {
            normalize_aliases(&mut fresh, template, path, &NullSink);
        }
        let mut merged = reconcile_with_sink(&fresh, template, path, options, &NullSink).patched;
        outcome.apply_to(&mut merged);
        merged
    }

    fn record_enrichment(&self, path: &Path, outcome: &EnrichmentOutcome) {
        for op in &outcome.patch {
            if let PatchOp::Fill { field, value } = op {
                if !value.is_empty_value() {
                    self.reporter.record(ChangeEvent::FieldAdded {
                        file: path.to_path_buf(),
                        field: field.clone(),
                        value: value.clone(),
                    });
                }
            }
        }
    }
}

async fn read(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| PipelineError::Read {
            path: path.to_path_buf(),
            source: e,
        })
}
