//! Report file output.

use crate::error::{PipelineError, Result};
use chrono::Utc;
use std::path::{Path, PathBuf};
use tracing::info;

/// Write a rendered report as `frontmatter-report-<timestamp>.md` in `dir`.
pub async fn write_report(dir: &Path, text: &str) -> Result<PathBuf> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| PipelineError::Report {
            path: dir.to_path_buf(),
            source: e,
        })?;

    let file_name = format!(
        "frontmatter-report-{}.md",
        Utc::now().format("%Y%m%dT%H%M%S%.3fZ")
    );
    let path = dir.join(file_name);

    tokio::fs::write(&path, text)
        .await
        .map_err(|e| PipelineError::Report {
            path: path.clone(),
            source: e,
        })?;

    info!(path = %path.display(), "Wrote report");
    Ok(path)
}
