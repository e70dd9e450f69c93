//! Runtime template model.
//!
//! A [`Template`] is built once from a [`TemplateSpec`] and shared read-only
//! across every file of its category. Each [`TemplateField`] carries an
//! inspector that classifies a value and, optionally, a default generator.
//!
//! Inspectors are pure. Default generators may read the filesystem (file
//! birth time) but never write to it.

use crate::error::{Result, TemplateError};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use vellum_config::{DefaultFn, FieldSpec, FieldType, TemplateSpec};
use vellum_parser::{date_prefix, FieldValue, FrontmatterDocument};

/// Field name that always derives its default from the file name.
pub const TITLE_FIELD: &str = "title";

/// Classification of a single field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InspectStatus {
    /// Key absent from the document
    Missing,
    /// Key present with null, a blank string or an empty array
    Empty,
    /// Key present with a value of the wrong shape
    Malformed,
    /// Value acceptable
    Ok,
}

impl InspectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Missing => "missing",
            Self::Empty => "empty",
            Self::Malformed => "malformed",
            Self::Ok => "ok",
        }
    }

    /// Whether auto-patching may replace the value.
    pub fn is_patchable(&self) -> bool {
        matches!(self, Self::Missing | Self::Empty)
    }
}

impl fmt::Display for InspectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of inspecting one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inspection {
    pub status: InspectStatus,
    pub message: String,
}

impl Inspection {
    pub fn new(status: InspectStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn ok() -> Self {
        Self::new(InspectStatus::Ok, "")
    }
}

/// Required fields are patched; optional fields are only inspected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Required,
    Optional,
}

/// Classifies a value (`None` when the key is absent).
pub type Inspector = Arc<dyn Fn(Option<&FieldValue>) -> Result<Inspection> + Send + Sync>;

/// Produces a default from the file path and the current frontmatter.
///
/// The returned JSON may be a plain value or, for date fields, an object
/// carrying the date under `date` or `changes.date_created`.
pub type DefaultGenerator =
    Arc<dyn Fn(&Path, &FrontmatterDocument) -> Result<serde_json::Value> + Send + Sync>;

/// One field of a runtime template.
#[derive(Clone)]
pub struct TemplateField {
    pub name: String,
    pub kind: FieldKind,
    pub expected_type: FieldType,
    pub aliases: Vec<String>,
    pub static_default: Option<FieldValue>,
    inspector: Inspector,
    default_fn: Option<DefaultGenerator>,
}

impl fmt::Debug for TemplateField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateField")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("expected_type", &self.expected_type)
            .field("aliases", &self.aliases)
            .field("static_default", &self.static_default)
            .field("has_default_fn", &self.default_fn.is_some())
            .finish()
    }
}

impl TemplateField {
    /// Field with the standard inspector for its type.
    pub fn new(name: impl Into<String>, kind: FieldKind, expected_type: FieldType) -> Self {
        Self {
            name: name.into(),
            kind,
            expected_type,
            aliases: Vec::new(),
            static_default: None,
            inspector: type_inspector(expected_type),
            default_fn: None,
        }
    }

    pub fn required(name: impl Into<String>, expected_type: FieldType) -> Self {
        Self::new(name, FieldKind::Required, expected_type)
    }

    pub fn optional(name: impl Into<String>, expected_type: FieldType) -> Self {
        Self::new(name, FieldKind::Optional, expected_type)
    }

    /// Replace the inspector (builder pattern).
    pub fn with_inspector<F>(mut self, inspector: F) -> Self
    where
        F: Fn(Option<&FieldValue>) -> Result<Inspection> + Send + Sync + 'static,
    {
        self.inspector = Arc::new(inspector);
        self
    }

    /// Attach a default generator (builder pattern).
    pub fn with_default_fn<F>(mut self, generator: F) -> Self
    where
        F: Fn(&Path, &FrontmatterDocument) -> Result<serde_json::Value> + Send + Sync + 'static,
    {
        self.default_fn = Some(Arc::new(generator));
        self
    }

    /// Attach a static default (builder pattern).
    pub fn with_static_default(mut self, value: FieldValue) -> Self {
        self.static_default = Some(value);
        self
    }

    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases = aliases.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_required(&self) -> bool {
        self.kind == FieldKind::Required
    }

    pub fn has_default_fn(&self) -> bool {
        self.default_fn.is_some()
    }

    /// Run the inspector.
    pub fn inspect(&self, value: Option<&FieldValue>) -> Result<Inspection> {
        (self.inspector)(value)
    }

    /// Run the default generator, if any.
    pub fn generate_default(
        &self,
        path: &Path,
        doc: &FrontmatterDocument,
    ) -> Option<Result<serde_json::Value>> {
        self.default_fn.as_ref().map(|generate| generate(path, doc))
    }

    /// Type-based empty default: `""` for strings, `[]` for arrays, null otherwise.
    pub fn type_default(&self) -> FieldValue {
        match self.expected_type {
            FieldType::String => FieldValue::string(""),
            FieldType::Array => FieldValue::StringArray(Vec::new()),
            _ => FieldValue::Null,
        }
    }

    fn from_spec(template: &str, spec: &FieldSpec) -> Result<Self> {
        let kind = if spec.required {
            FieldKind::Required
        } else {
            FieldKind::Optional
        };
        let mut field = Self::new(spec.name.clone(), kind, spec.field_type)
            .with_aliases(spec.aliases.iter().cloned());

        if let Some(default) = &spec.default {
            let value = FieldValue::from_json(default).ok_or_else(|| {
                TemplateError::invalid_template(
                    template,
                    format!("default for '{}' is not a scalar or flat list", spec.name),
                )
            })?;
            field.static_default = Some(value);
        }

        if let Some(default_fn) = spec.default_fn {
            field.default_fn = Some(builtin_default_fn(default_fn));
        }

        Ok(field)
    }
}

/// Field definitions for one content category.
#[derive(Debug, Clone)]
pub struct Template {
    pub name: String,
    pub directory: String,
    pub required: Vec<TemplateField>,
    pub optional: Vec<TemplateField>,
}

impl Template {
    pub fn new(name: impl Into<String>, directory: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            directory: directory.into(),
            required: Vec::new(),
            optional: Vec::new(),
        }
    }

    /// Append a field to the matching list (builder pattern).
    pub fn with_field(mut self, field: TemplateField) -> Self {
        match field.kind {
            FieldKind::Required => self.required.push(field),
            FieldKind::Optional => self.optional.push(field),
        }
        self
    }

    /// Build a runtime template from its declarative definition.
    pub fn from_spec(name: &str, spec: &TemplateSpec) -> Result<Self> {
        let mut template = Self::new(name, spec.directory.clone());
        for field_spec in &spec.fields {
            if template.field(&field_spec.name).is_some() {
                return Err(TemplateError::invalid_template(
                    name,
                    format!("field '{}' defined twice", field_spec.name),
                ));
            }
            template = template.with_field(TemplateField::from_spec(name, field_spec)?);
        }
        Ok(template)
    }

    /// Required fields first, then optional ones.
    pub fn fields(&self) -> impl Iterator<Item = &TemplateField> {
        self.required.iter().chain(self.optional.iter())
    }

    pub fn field(&self, name: &str) -> Option<&TemplateField> {
        self.fields().find(|f| f.name == name)
    }

    pub fn knows(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// Names of date-typed fields.
    pub fn date_fields(&self) -> impl Iterator<Item = &str> {
        self.fields()
            .filter(|f| f.expected_type == FieldType::Date)
            .map(|f| f.name.as_str())
    }
}

/// Standard inspector for an expected type.
pub fn type_inspector(expected: FieldType) -> Inspector {
    Arc::new(move |value: Option<&FieldValue>| -> Result<Inspection> {
        Ok(inspect_as(expected, value))
    })
}

fn inspect_as(expected: FieldType, value: Option<&FieldValue>) -> Inspection {
    let value = match value {
        None => return Inspection::new(InspectStatus::Missing, "field is missing"),
        Some(v) if v.is_empty_value() => {
            return Inspection::new(InspectStatus::Empty, "field is empty")
        }
        Some(v) => v,
    };

    let malformed = |detail: String| Inspection::new(InspectStatus::Malformed, detail);
    let wrong_type = || {
        malformed(format!(
            "expected {}, found {}",
            expected.as_str(),
            value.type_name()
        ))
    };

    match (expected, value) {
        (FieldType::String, FieldValue::String(_)) => Inspection::ok(),
        (FieldType::Array, FieldValue::StringArray(_)) => Inspection::ok(),
        (FieldType::Number, FieldValue::Number(_)) => Inspection::ok(),
        (FieldType::Boolean, FieldValue::Boolean(_)) => Inspection::ok(),
        (FieldType::Date, FieldValue::String(s)) => {
            if date_prefix(s).is_some() {
                Inspection::ok()
            } else {
                malformed(format!("'{}' does not start with YYYY-MM-DD", s))
            }
        }
        (FieldType::Url, FieldValue::String(s)) => {
            let s = s.trim();
            if s.starts_with("http://") || s.starts_with("https://") {
                Inspection::ok()
            } else {
                malformed(format!("'{}' is not an http(s) URL", s))
            }
        }
        _ => wrong_type(),
    }
}

fn builtin_default_fn(default_fn: DefaultFn) -> DefaultGenerator {
    match default_fn {
        DefaultFn::Today => Arc::new(|_: &Path, _: &FrontmatterDocument| -> Result<serde_json::Value> {
            Ok(serde_json::Value::String(today()))
        }),
        DefaultFn::FileBirthDate => Arc::new(|path: &Path, _: &FrontmatterDocument| {
            file_birth_date(path).map(|date| serde_json::json!({ "date": date }))
        }),
        DefaultFn::FileStemTitle => Arc::new(|path: &Path, _: &FrontmatterDocument| {
            title_from_path(path)
                .map(serde_json::Value::String)
                .ok_or_else(|| {
                    TemplateError::default_generation(TITLE_FIELD, "path has no file stem")
                })
        }),
    }
}

/// Current local calendar date as `YYYY-MM-DD`.
pub fn today() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

/// Creation date of a file (modification date when creation time is
/// unavailable on this platform) as `YYYY-MM-DD`.
pub fn file_birth_date(path: &Path) -> Result<String> {
    let metadata = std::fs::metadata(path).map_err(|e| {
        TemplateError::default_generation("date_created", format!("{}: {}", path.display(), e))
    })?;
    let time = metadata
        .created()
        .or_else(|_| metadata.modified())
        .map_err(|e| TemplateError::default_generation("date_created", e.to_string()))?;
    let local: DateTime<Local> = time.into();
    Ok(local.format("%Y-%m-%d").to_string())
}

/// Human title from a file name: `my-note.md` becomes `My Note`.
pub fn title_from_path(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    let title = stem
        .split(['-', '_', ' '])
        .filter(|word| !word.is_empty())
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ");
    if title.is_empty() {
        None
    } else {
        Some(title)
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use vellum_config::builtin_templates;

    #[test]
    fn test_title_from_path() {
        assert_eq!(
            title_from_path(Path::new("/notes/essays/my-note.md")).as_deref(),
            Some("My Note")
        );
        assert_eq!(
            title_from_path(Path::new("rust_async--tips.md")).as_deref(),
            Some("Rust Async Tips")
        );
        assert_eq!(title_from_path(Path::new("README")).as_deref(), Some("README"));
        assert_eq!(title_from_path(Path::new("/")), None);
    }

    #[test]
    fn test_missing_vs_empty() {
        let field = TemplateField::required("title", FieldType::String);
        assert_eq!(field.inspect(None).unwrap().status, InspectStatus::Missing);
        assert_eq!(
            field.inspect(Some(&FieldValue::string("  "))).unwrap().status,
            InspectStatus::Empty
        );
        assert_eq!(
            field.inspect(Some(&FieldValue::Null)).unwrap().status,
            InspectStatus::Empty
        );
        assert_eq!(
            field.inspect(Some(&FieldValue::string("Hello"))).unwrap().status,
            InspectStatus::Ok
        );
    }

    #[test]
    fn test_empty_array_is_empty_not_missing() {
        let field = TemplateField::required("tags", FieldType::Array);
        let inspection = field.inspect(Some(&FieldValue::StringArray(vec![]))).unwrap();
        assert_eq!(inspection.status, InspectStatus::Empty);
    }

    #[test]
    fn test_typed_inspectors() {
        let date = TemplateField::required("date_created", FieldType::Date);
        assert_eq!(
            date.inspect(Some(&FieldValue::string("2024-01-02T03:04:05Z"))).unwrap().status,
            InspectStatus::Ok
        );
        assert_eq!(
            date.inspect(Some(&FieldValue::string("last week"))).unwrap().status,
            InspectStatus::Malformed
        );

        let url = TemplateField::required("url", FieldType::Url);
        assert_eq!(
            url.inspect(Some(&FieldValue::string("example.com"))).unwrap().status,
            InspectStatus::Malformed
        );

        let tags = TemplateField::required("tags", FieldType::Array);
        let inspection = tags.inspect(Some(&FieldValue::string("rust"))).unwrap();
        assert_eq!(inspection.status, InspectStatus::Malformed);
        assert_eq!(inspection.message, "expected array, found string");
    }

    #[test]
    fn test_type_defaults() {
        assert_eq!(
            TemplateField::required("a", FieldType::String).type_default(),
            FieldValue::string("")
        );
        assert_eq!(
            TemplateField::required("a", FieldType::Array).type_default(),
            FieldValue::StringArray(vec![])
        );
        assert_eq!(
            TemplateField::required("a", FieldType::Date).type_default(),
            FieldValue::Null
        );
    }

    #[test]
    fn test_from_builtin_specs() {
        for (name, spec) in builtin_templates() {
            let template = Template::from_spec(&name, &spec).unwrap();
            assert_eq!(template.directory, spec.directory);
            assert!(template.knows("title"));
            assert!(template.field("title").unwrap().has_default_fn());
        }
    }

    #[test]
    fn test_object_static_default_rejected() {
        let spec = TemplateSpec {
            directory: "x".to_string(),
            fields: vec![FieldSpec::required("meta", FieldType::String)
                .with_default(serde_json::json!({ "nested": true }))],
        };
        let err = Template::from_spec("x", &spec).unwrap_err();
        assert!(matches!(err, TemplateError::InvalidTemplate { .. }));
    }

    #[test]
    fn test_birth_date_of_missing_file_is_error() {
        let path = PathBuf::from("/definitely/not/here.md");
        assert!(matches!(
            file_birth_date(&path),
            Err(TemplateError::DefaultGeneration { .. })
        ));
    }

    #[test]
    fn test_birth_date_of_real_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("note.md");
        std::fs::write(&path, "x").unwrap();
        let date = file_birth_date(&path).unwrap();
        assert_eq!(date, today());
    }
}
