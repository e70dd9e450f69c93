//! Enrichment coordination.
//!
//! For one document the coordinator:
//!
//! 1. derives the resource from the `url` field (no usable link, no work);
//!    its normalized key deduplicates fetches, the link as written is fetched
//! 2. picks the field groups with at least one absent field; presence, not
//!    truthiness, decides, so an empty string counts as already attempted
//! 3. claims an in-flight slot per group and skips groups another task holds
//! 4. fetches the claimed groups concurrently, each under the retry policy
//! 5. merges resolved fields, marks unresolved ones with `""` after a
//!    successful response, and records terminal failures in `og_error`
//! 6. stamps `og_last_fetch` only when a fetched field actually changed
//!
//! The result carries the ordered patch so callers can replay it onto a
//! fresh copy of the file instead of the snapshot enrichment started from.
//! Provider values replay as fills, so a value someone wrote in the meantime
//! is kept.

use crate::error::{EnrichmentError, Result};
use crate::fields::{FieldGroup, ERROR_FIELD, LAST_FETCH_FIELD};
use crate::http::{HttpMetadataProvider, HttpScreenshotProvider};
use crate::inflight::{InFlightGuard, InFlightRegistry};
use crate::normalize::{preview_fields, resource, screenshot_fields};
use crate::provider::{MetadataProvider, ScreenshotProvider};
use crate::retry::RetryPolicy;
use chrono::{SecondsFormat, Utc};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};
use vellum_config::EnrichmentConfig;
use vellum_parser::{FieldValue, FrontmatterDocument};

/// One enrichment-owned assignment.
#[derive(Debug, Clone, PartialEq)]
pub enum PatchOp {
    /// Write `value` only while the field is absent or empty
    Fill { field: String, value: FieldValue },
    /// Overwrite unconditionally (stamp and error bookkeeping)
    Set { field: String, value: FieldValue },
    Remove { field: String },
}

impl PatchOp {
    pub fn field(&self) -> &str {
        match self {
            PatchOp::Fill { field, .. } | PatchOp::Set { field, .. } | PatchOp::Remove { field } => {
                field
            }
        }
    }

    /// Apply to a document; returns whether it changed anything.
    pub fn apply(&self, doc: &mut FrontmatterDocument) -> bool {
        match self {
            PatchOp::Fill { field, value } => {
                let fillable = doc
                    .get(field)
                    .map(FieldValue::is_empty_value)
                    .unwrap_or(true);
                fillable && set(doc, field, value)
            }
            PatchOp::Set { field, value } => set(doc, field, value),
            PatchOp::Remove { field } => doc.remove(field).is_some(),
        }
    }
}

fn set(doc: &mut FrontmatterDocument, field: &str, value: &FieldValue) -> bool {
    if doc.get(field) == Some(value) {
        false
    } else {
        doc.insert(field.to_string(), value.clone());
        true
    }
}

/// Result of enriching one document.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichmentOutcome {
    /// Input document with the patch applied
    pub updated: FrontmatterDocument,
    /// Whether the patch changed anything
    pub changed: bool,
    /// Ordered enrichment-owned assignments
    pub patch: Vec<PatchOp>,
}

impl EnrichmentOutcome {
    fn unchanged(doc: &FrontmatterDocument) -> Self {
        Self {
            updated: doc.clone(),
            changed: false,
            patch: Vec::new(),
        }
    }

    /// Replay the patch onto another document; returns whether it changed.
    pub fn apply_to(&self, doc: &mut FrontmatterDocument) -> bool {
        let mut changed = false;
        for op in &self.patch {
            changed |= op.apply(doc);
        }
        changed
    }
}

/// Coordinates metadata and screenshot fetches for documents.
pub struct EnrichmentCoordinator {
    metadata: Option<Arc<dyn MetadataProvider>>,
    screenshot: Option<Arc<dyn ScreenshotProvider>>,
    retry: RetryPolicy,
    in_flight: InFlightRegistry,
}

impl EnrichmentCoordinator {
    /// Coordinator without providers; add them with the builder methods.
    pub fn new(retry: RetryPolicy) -> Self {
        Self {
            metadata: None,
            screenshot: None,
            retry,
            in_flight: InFlightRegistry::new(),
        }
    }

    /// Build HTTP providers for every configured endpoint.
    pub fn from_config(config: &EnrichmentConfig) -> Result<Self> {
        let mut coordinator = Self::new(RetryPolicy::from(&config.retry));
        if config.metadata.is_configured() {
            coordinator = coordinator.with_metadata_provider(Arc::new(
                HttpMetadataProvider::from_config(&config.metadata)?,
            ));
        }
        if config.screenshot.is_configured() {
            coordinator = coordinator.with_screenshot_provider(Arc::new(
                HttpScreenshotProvider::from_config(&config.screenshot)?,
            ));
        }
        Ok(coordinator)
    }

    pub fn with_metadata_provider(mut self, provider: Arc<dyn MetadataProvider>) -> Self {
        self.metadata = Some(provider);
        self
    }

    pub fn with_screenshot_provider(mut self, provider: Arc<dyn ScreenshotProvider>) -> Self {
        self.screenshot = Some(provider);
        self
    }

    pub fn in_flight(&self) -> &InFlightRegistry {
        &self.in_flight
    }

    pub fn has_providers(&self) -> bool {
        self.metadata.is_some() || self.screenshot.is_some()
    }

    /// Groups this coordinator can fetch and the document still lacks.
    pub fn needed_groups(&self, doc: &FrontmatterDocument) -> Vec<FieldGroup> {
        FieldGroup::ALL
            .into_iter()
            .filter(|group| self.has_provider(*group))
            .filter(|group| group.fields().iter().any(|f| !doc.contains_key(f)))
            .collect()
    }

    fn has_provider(&self, group: FieldGroup) -> bool {
        match group {
            FieldGroup::Preview => self.metadata.is_some(),
            FieldGroup::Screenshot => self.screenshot.is_some(),
        }
    }

    /// Enrich one document.
    ///
    /// Never fails: provider errors end up in `og_error` and the next run
    /// tries again.
    pub async fn process(&self, doc: &FrontmatterDocument, path: &Path) -> EnrichmentOutcome {
        let Some(resource) = resource(doc) else {
            debug!(path = %path.display(), "No usable url, skipping enrichment");
            return EnrichmentOutcome::unchanged(doc);
        };

        let needed = self.needed_groups(doc);
        if needed.is_empty() {
            debug!(path = %path.display(), resource = %resource.key, "Enrichment fields present");
            return EnrichmentOutcome::unchanged(doc);
        }

        // Claim slots before the first suspension point
        let preview_guard = self.claim(&needed, FieldGroup::Preview, &resource.key, path);
        let screenshot_guard = self.claim(&needed, FieldGroup::Screenshot, &resource.key, path);
        if preview_guard.is_none() && screenshot_guard.is_none() {
            return EnrichmentOutcome::unchanged(doc);
        }

        info!(path = %path.display(), resource = %resource.key, groups = ?needed, "Fetching enrichment");

        let (preview, screenshot) = tokio::join!(
            self.fetch_preview(preview_guard.is_some(), &resource.url),
            self.fetch_screenshot(screenshot_guard.is_some(), &resource.url),
        );

        let mut results = Vec::new();
        if let Some(result) = preview {
            results.push((FieldGroup::Preview, result));
        }
        if let Some(result) = screenshot {
            results.push((FieldGroup::Screenshot, result));
        }

        let outcome = merge(doc, &results, path);
        drop(preview_guard);
        drop(screenshot_guard);
        outcome
    }

    fn claim(
        &self,
        needed: &[FieldGroup],
        group: FieldGroup,
        resource: &str,
        path: &Path,
    ) -> Option<InFlightGuard> {
        if !needed.contains(&group) {
            return None;
        }
        let guard = self.in_flight.try_acquire(group, resource);
        if guard.is_none() {
            info!(
                path = %path.display(),
                resource,
                group = %group,
                "Fetch already in flight, skipping"
            );
        }
        guard
    }

    async fn fetch_preview(
        &self,
        claimed: bool,
        url: &str,
    ) -> Option<Result<Vec<(&'static str, FieldValue)>>> {
        if !claimed {
            return None;
        }
        let provider = self.metadata.as_ref()?;
        let result = self
            .retry
            .run("metadata", || provider.fetch_metadata(url))
            .await
            .map(|record| preview_fields(&record));
        Some(result)
    }

    async fn fetch_screenshot(
        &self,
        claimed: bool,
        url: &str,
    ) -> Option<Result<Vec<(&'static str, FieldValue)>>> {
        if !claimed {
            return None;
        }
        let provider = self.screenshot.as_ref()?;
        let result = self
            .retry
            .run("screenshot", || provider.fetch_screenshot(url))
            .await
            .map(|record| screenshot_fields(&record));
        Some(result)
    }
}

fn merge(
    doc: &FrontmatterDocument,
    results: &[(FieldGroup, Result<Vec<(&'static str, FieldValue)>>)],
    path: &Path,
) -> EnrichmentOutcome {
    let mut updated = doc.clone();
    let mut patch = Vec::new();
    let mut fields_changed = false;
    let mut errors: Vec<String> = Vec::new();

    for (group, result) in results {
        match result {
            Ok(resolved) => {
                for (field, value) in resolved {
                    // Never overwrite a value someone already filled in
                    let fillable = updated
                        .get(field)
                        .map(FieldValue::is_empty_value)
                        .unwrap_or(true);
                    if fillable {
                        let op = PatchOp::Fill {
                            field: field.to_string(),
                            value: value.clone(),
                        };
                        fields_changed |= op.apply(&mut updated);
                        patch.push(op);
                    }
                }
                for field in group.fields() {
                    if !updated.contains_key(field) {
                        let op = PatchOp::Fill {
                            field: field.to_string(),
                            value: FieldValue::string(""),
                        };
                        fields_changed |= op.apply(&mut updated);
                        patch.push(op);
                    }
                }
                debug!(path = %path.display(), group = %group, resolved = resolved.len(), "Merged enrichment");
            }
            Err(error) => {
                warn!(path = %path.display(), group = %group, %error, "Enrichment failed");
                errors.push(format!("{}: {}", group, describe(error)));
            }
        }
    }

    let mut changed = fields_changed;

    if errors.is_empty() {
        if updated.contains_key(ERROR_FIELD) {
            let op = PatchOp::Remove {
                field: ERROR_FIELD.to_string(),
            };
            changed |= op.apply(&mut updated);
            patch.push(op);
        }
    } else {
        let op = PatchOp::Set {
            field: ERROR_FIELD.to_string(),
            value: FieldValue::String(errors.join("; ")),
        };
        changed |= op.apply(&mut updated);
        patch.push(op);
    }

    if fields_changed {
        let op = PatchOp::Set {
            field: LAST_FETCH_FIELD.to_string(),
            value: FieldValue::String(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)),
        };
        op.apply(&mut updated);
        patch.push(op);
    }

    if changed {
        info!(path = %path.display(), fields = patch.len(), "Enrichment updated frontmatter");
    }

    EnrichmentOutcome {
        updated,
        changed,
        patch,
    }
}

fn describe(error: &EnrichmentError) -> String {
    // Single line, so the value serializes as a plain scalar
    error.to_string().replace(['\n', '\r'], " ")
}
