//! Template reconciliation.
//!
//! [`inspect`] classifies every template field of a document. [`reconcile`]
//! additionally injects defaults into required fields that are missing or
//! empty when auto-patching is enabled.
//!
//! Default resolution for a patchable field, highest priority first:
//!
//! 1. the `title` override, derived from the file name
//! 2. the field's default generator (date fields accept `{"date": ..}` and
//!    `{"changes": {"date_created": ..}}` and otherwise fall back to today)
//! 3. the field's static default
//! 4. the type-based empty default
//!
//! A second pass replaces any value that is still empty with the first
//! non-empty candidate further down the chain.

use crate::report::{ChangeEvent, ChangeSink, NullSink};
use crate::template::{
    title_from_path, today, InspectStatus, Inspection, Template, TemplateField, TITLE_FIELD,
};
use std::path::Path;
use tracing::{debug, warn};
use vellum_config::FieldType;
use vellum_parser::{FieldValue, FrontmatterDocument, SerializeOptions};

/// Per-call reconciliation switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileOptions {
    /// Inject defaults into missing or empty required fields
    pub auto_patch: bool,
}

impl ReconcileOptions {
    pub fn patch() -> Self {
        Self { auto_patch: true }
    }

    pub fn dry() -> Self {
        Self { auto_patch: false }
    }
}

/// Inspection result for one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldInspection {
    pub field: String,
    pub status: InspectStatus,
    pub message: String,
}

/// Inspection of a whole document against its template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InspectionReport {
    /// Required fields in template order, then present, non-blank optional
    /// fields
    pub entries: Vec<FieldInspection>,
    /// Required fields absent from the document
    pub missing_fields: Vec<String>,
    /// Document keys the template does not know
    pub extra_fields: Vec<String>,
}

impl InspectionReport {
    /// Entries whose status is not `ok`.
    pub fn issues(&self) -> impl Iterator<Item = &FieldInspection> {
        self.entries.iter().filter(|e| e.status != InspectStatus::Ok)
    }

    pub fn is_clean(&self) -> bool {
        self.issues().next().is_none()
    }

    pub fn status_of(&self, field: &str) -> Option<InspectStatus> {
        self.entries
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.status)
    }
}

/// Result of reconciling one document.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconcileOutcome {
    pub patched: FrontmatterDocument,
    pub changed: bool,
    pub report: InspectionReport,
}

/// Classify every template field. Pure.
pub fn inspect(doc: &FrontmatterDocument, template: &Template) -> InspectionReport {
    let mut report = InspectionReport::default();

    for field in &template.required {
        let inspection = run_inspector(field, doc.get(&field.name));
        if !doc.contains_key(&field.name) {
            report.missing_fields.push(field.name.clone());
        }
        report.entries.push(FieldInspection {
            field: field.name.clone(),
            status: inspection.status,
            message: inspection.message,
        });
    }

    // An optional field left blank is as acceptable as an absent one
    for field in &template.optional {
        if let Some(value) = doc.get(&field.name) {
            let inspection = run_inspector(field, Some(value));
            if inspection.status == InspectStatus::Empty {
                continue;
            }
            report.entries.push(FieldInspection {
                field: field.name.clone(),
                status: inspection.status,
                message: inspection.message,
            });
        }
    }

    report.extra_fields = doc
        .keys()
        .filter(|key| !template.knows(key))
        .map(str::to_string)
        .collect();

    report
}

/// Reconcile a document without recording events.
pub fn reconcile(
    doc: &FrontmatterDocument,
    template: &Template,
    path: &Path,
    options: ReconcileOptions,
) -> ReconcileOutcome {
    reconcile_with_sink(doc, template, path, options, &NullSink)
}

/// Reconcile a document, recording validation issues and injected fields.
pub fn reconcile_with_sink(
    doc: &FrontmatterDocument,
    template: &Template,
    path: &Path,
    options: ReconcileOptions,
    sink: &dyn ChangeSink,
) -> ReconcileOutcome {
    let report = inspect(doc, template);

    for issue in report.issues() {
        sink.record(ChangeEvent::ValidationIssue {
            file: path.to_path_buf(),
            field: issue.field.clone(),
            status: issue.status,
            message: issue.message.clone(),
        });
    }

    let mut patched = doc.clone();

    if options.auto_patch {
        let patchable: Vec<&TemplateField> = template
            .required
            .iter()
            .filter(|field| {
                report
                    .status_of(&field.name)
                    .map(|status| status.is_patchable())
                    .unwrap_or(false)
            })
            .collect();

        for field in &patchable {
            let value = primary_default(field, path, &patched);
            patched.insert(field.name.clone(), value);
        }

        // Guard against generators that produced an empty value
        for field in &patchable {
            let still_empty = patched
                .get(&field.name)
                .map(FieldValue::is_empty_value)
                .unwrap_or(true);
            if still_empty {
                let value = fallback_default(field, path, &patched);
                patched.insert(field.name.clone(), value);
            }
        }

        for field in &patchable {
            let new_value = patched.get(&field.name);
            if new_value != doc.get(&field.name) {
                if let Some(value) = new_value {
                    debug!(path = %path.display(), field = %field.name, value = %value, "Injected default");
                    sink.record(ChangeEvent::FieldAdded {
                        file: path.to_path_buf(),
                        field: field.name.clone(),
                        value: value.clone(),
                    });
                }
            }
        }
    }

    let changed = patched != *doc;
    ReconcileOutcome {
        patched,
        changed,
        report,
    }
}

/// Rename legacy keys to their canonical names.
///
/// A legacy key is renamed only when the canonical key is absent. Returns the
/// `(from, to)` pairs applied, in template order.
pub fn normalize_aliases(
    doc: &mut FrontmatterDocument,
    template: &Template,
    path: &Path,
    sink: &dyn ChangeSink,
) -> Vec<(String, String)> {
    let mut applied = Vec::new();

    for field in template.fields() {
        for alias in &field.aliases {
            if doc.contains_key(&field.name) {
                break;
            }
            if doc.rename_key(alias, &field.name) {
                debug!(path = %path.display(), from = %alias, to = %field.name, "Renamed legacy field");
                sink.record(ChangeEvent::Conversion {
                    file: path.to_path_buf(),
                    from: alias.clone(),
                    to: field.name.clone(),
                });
                applied.push((alias.clone(), field.name.clone()));
            }
        }
    }

    applied
}

/// Required field names, then optional ones.
pub fn field_order(template: &Template) -> Vec<String> {
    template.fields().map(|f| f.name.clone()).collect()
}

/// Serializer options for documents governed by `template`.
pub fn serialize_options(template: &Template) -> SerializeOptions {
    SerializeOptions::new()
        .with_field_order(field_order(template))
        .with_date_fields(template.date_fields())
}

fn run_inspector(field: &TemplateField, value: Option<&FieldValue>) -> Inspection {
    match field.inspect(value) {
        Ok(inspection) => inspection,
        Err(e) => {
            warn!(field = %field.name, error = %e, "Inspector failed, treating field as malformed");
            Inspection::new(InspectStatus::Malformed, e.to_string())
        }
    }
}

/// Highest-priority default, accepted even when empty.
fn primary_default(field: &TemplateField, path: &Path, doc: &FrontmatterDocument) -> FieldValue {
    if field.name == TITLE_FIELD {
        if let Some(title) = title_from_path(path) {
            return FieldValue::String(title);
        }
    }
    if let Some(value) = generated_default(field, path, doc) {
        return value;
    }
    if let Some(value) = &field.static_default {
        return value.clone();
    }
    field.type_default()
}

/// First non-empty default below the override, else the type default.
fn fallback_default(field: &TemplateField, path: &Path, doc: &FrontmatterDocument) -> FieldValue {
    generated_default(field, path, doc)
        .filter(|v| !v.is_empty_value())
        .or_else(|| field.static_default.clone().filter(|v| !v.is_empty_value()))
        .unwrap_or_else(|| field.type_default())
}

fn generated_default(
    field: &TemplateField,
    path: &Path,
    doc: &FrontmatterDocument,
) -> Option<FieldValue> {
    let result = field.generate_default(path, doc)?;
    let is_date = field.expected_type == FieldType::Date;

    match result {
        Ok(value) if is_date => Some(FieldValue::String(
            nested_date(&value).unwrap_or_else(today),
        )),
        Ok(value) => match FieldValue::from_json(&value) {
            Some(converted) => Some(converted),
            None => {
                warn!(path = %path.display(), field = %field.name, "Default generator returned an object, using type default");
                Some(field.type_default())
            }
        },
        Err(e) => {
            warn!(path = %path.display(), field = %field.name, error = %e, "Default generator failed");
            if is_date {
                Some(FieldValue::String(today()))
            } else {
                Some(field.type_default())
            }
        }
    }
}

/// Date string from a generator result: a plain string, `{"date": ..}` or
/// `{"changes": {"date_created": ..}}`.
fn nested_date(value: &serde_json::Value) -> Option<String> {
    let date = match value {
        serde_json::Value::String(s) => Some(s.as_str()),
        serde_json::Value::Object(_) => value
            .get("date")
            .and_then(|d| d.as_str())
            .or_else(|| value.pointer("/changes/date_created").and_then(|d| d.as_str())),
        _ => None,
    }?;
    let date = date.trim();
    if date.is_empty() {
        None
    } else {
        Some(date.to_string())
    }
}
