//! Batch change reporting.
//!
//! Components record structured events through the narrow [`ChangeSink`]
//! interface. [`ChangeReporter`] accumulates them for one batch and renders a
//! Markdown summary at the end. Nothing reads events back before rendering.

use crate::template::InspectStatus;
use chrono::Utc;
use std::collections::BTreeMap;
use std::fmt::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use vellum_parser::FieldValue;

/// One recorded change or finding.
#[derive(Debug, Clone, PartialEq)]
pub enum ChangeEvent {
    /// A field was injected or overwritten
    FieldAdded {
        file: PathBuf,
        field: String,
        value: FieldValue,
    },
    /// A field failed inspection
    ValidationIssue {
        file: PathBuf,
        field: String,
        status: InspectStatus,
        message: String,
    },
    /// A legacy key was renamed
    Conversion {
        file: PathBuf,
        from: String,
        to: String,
    },
    /// A file finished processing
    Processed { file: PathBuf },
    /// A file could not be processed
    Failure { file: PathBuf, reason: String },
}

impl ChangeEvent {
    pub fn file(&self) -> &Path {
        match self {
            Self::FieldAdded { file, .. }
            | Self::ValidationIssue { file, .. }
            | Self::Conversion { file, .. }
            | Self::Processed { file }
            | Self::Failure { file, .. } => file,
        }
    }
}

/// Receiver for change events.
pub trait ChangeSink: Send + Sync {
    fn record(&self, event: ChangeEvent);
}

/// Sink that drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl ChangeSink for NullSink {
    fn record(&self, _event: ChangeEvent) {}
}

/// Per-kind event totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportCounts {
    pub processed: usize,
    pub fields_added: usize,
    pub validation_issues: usize,
    pub conversions: usize,
    pub failures: usize,
}

/// Accumulates events for one batch.
///
/// Clones share the same event log, so one reporter can be handed to several
/// concurrent file tasks.
#[derive(Debug, Clone, Default)]
pub struct ChangeReporter {
    events: Arc<Mutex<Vec<ChangeEvent>>>,
}

impl ChangeReporter {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<ChangeEvent>> {
        self.events.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn record(&self, event: ChangeEvent) {
        self.lock().push(event);
    }

    /// Snapshot of recorded events in arrival order.
    pub fn events(&self) -> Vec<ChangeEvent> {
        self.lock().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Clear all accumulated state.
    pub fn reset(&self) {
        self.lock().clear();
    }

    pub fn counts(&self) -> ReportCounts {
        let mut counts = ReportCounts::default();
        for event in self.lock().iter() {
            match event {
                ChangeEvent::FieldAdded { .. } => counts.fields_added += 1,
                ChangeEvent::ValidationIssue { .. } => counts.validation_issues += 1,
                ChangeEvent::Conversion { .. } => counts.conversions += 1,
                ChangeEvent::Processed { .. } => counts.processed += 1,
                ChangeEvent::Failure { .. } => counts.failures += 1,
            }
        }
        counts
    }

    /// Render the batch as Markdown, or `None` if nothing was recorded.
    pub fn render(&self) -> Option<String> {
        let events = self.events();
        if events.is_empty() {
            return None;
        }

        let counts = self.counts();
        let mut out = String::new();
        let _ = writeln!(out, "# Frontmatter Report");
        let _ = writeln!(out);
        let _ = writeln!(out, "Generated: {}", Utc::now().format("%Y-%m-%d %H:%M:%S UTC"));
        let _ = writeln!(out);
        let _ = writeln!(out, "| Event | Count |");
        let _ = writeln!(out, "|-------|-------|");
        let _ = writeln!(out, "| Files processed | {} |", counts.processed);
        let _ = writeln!(out, "| Fields added | {} |", counts.fields_added);
        let _ = writeln!(out, "| Validation issues | {} |", counts.validation_issues);
        let _ = writeln!(out, "| Conversions | {} |", counts.conversions);
        let _ = writeln!(out, "| Failures | {} |", counts.failures);

        render_section(&mut out, "Failures", &events, |event| match event {
            ChangeEvent::Failure { reason, .. } => Some(reason.clone()),
            _ => None,
        });
        render_section(&mut out, "Validation Issues", &events, |event| match event {
            ChangeEvent::ValidationIssue {
                field,
                status,
                message,
                ..
            } => Some(format!("`{}` ({}): {}", field, status, message)),
            _ => None,
        });
        render_section(&mut out, "Fields Added", &events, |event| match event {
            ChangeEvent::FieldAdded { field, value, .. } => {
                Some(format!("`{}`: {}", field, display_value(value)))
            }
            _ => None,
        });
        render_section(&mut out, "Conversions", &events, |event| match event {
            ChangeEvent::Conversion { from, to, .. } => Some(format!("`{}` → `{}`", from, to)),
            _ => None,
        });

        Some(out)
    }
}

impl ChangeSink for ChangeReporter {
    fn record(&self, event: ChangeEvent) {
        ChangeReporter::record(self, event);
    }
}

fn render_section<F>(out: &mut String, title: &str, events: &[ChangeEvent], line: F)
where
    F: Fn(&ChangeEvent) -> Option<String>,
{
    let mut by_file: BTreeMap<&Path, Vec<String>> = BTreeMap::new();
    for event in events {
        if let Some(text) = line(event) {
            by_file.entry(event.file()).or_default().push(text);
        }
    }
    if by_file.is_empty() {
        return;
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "## {}", title);
    for (file, lines) in by_file {
        let _ = writeln!(out);
        let _ = writeln!(out, "### {}", file.display());
        let _ = writeln!(out);
        for text in lines {
            let _ = writeln!(out, "- {}", text);
        }
    }
}

fn display_value(value: &FieldValue) -> String {
    match value {
        FieldValue::String(s) if s.is_empty() => "`\"\"`".to_string(),
        FieldValue::StringArray(items) if items.is_empty() => "`[]`".to_string(),
        FieldValue::StringArray(items) => format!("[{}]", items.join(", ")),
        other => other.to_string(),
    }
}
