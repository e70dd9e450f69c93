//! One CLI run: discover notes, process them, write the report.

use crate::discover::discover_markdown_files;
use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::{info, warn};
use vellum_config::VellumConfig;
use vellum_core::ChangeReporter;
use vellum_pipeline::{write_report, BatchSummary, NotePipeline, ProcessMode};

/// What a run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunResult {
    pub summary: BatchSummary,
    /// Report file, when anything was recorded
    pub report: Option<PathBuf>,
}

impl RunResult {
    /// Process exit code: 1 when any file failed.
    pub fn exit_code(&self) -> i32 {
        if self.summary.has_failures() {
            1
        } else {
            0
        }
    }
}

/// Process every Markdown file under the configured content root.
pub async fn run(config: &VellumConfig, mode: ProcessMode) -> Result<RunResult> {
    let root = &config.content_root;
    if !root.exists() {
        anyhow::bail!("content root {} does not exist", root.display());
    }

    let reporter = ChangeReporter::new();
    let pipeline =
        NotePipeline::from_config(config, reporter.clone()).context("failed to build pipeline")?;

    if mode.enriches() && !config.enrichment.enabled {
        warn!("Enrich requested but enrichment is disabled in config; only fixing");
    }

    let files = discover_markdown_files(root);
    info!(root = %root.display(), files = files.len(), "Discovered notes");

    let summary = pipeline.process_batch(files, mode).await;

    let report = match reporter.render() {
        Some(text) => {
            let path = write_report(&config.reports_dir(), &text)
                .await
                .context("failed to write report")?;
            info!(path = %path.display(), "Wrote report");
            Some(path)
        }
        None => None,
    };

    Ok(RunResult { summary, report })
}
