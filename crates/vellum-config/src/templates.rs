//! Declarative template definitions.
//!
//! A template describes the fields expected in one content category. The
//! definitions here are plain data; `vellum-core` turns them into runtime
//! templates with inspectors and default generators.

use crate::fields::{enrichment_fields, OG_VIDEOS, URL_FIELD};
use serde::{Deserialize, Serialize};

/// Expected type of a frontmatter field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Free text
    #[default]
    String,
    /// Flat list of strings
    Array,
    /// `YYYY-MM-DD`, possibly followed by a time component
    Date,
    /// `http://` or `https://` link
    Url,
    /// Numeric value
    Number,
    /// `true` / `false`
    Boolean,
}

impl FieldType {
    /// Lowercase name used in config files and reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Array => "array",
            Self::Date => "date",
            Self::Url => "url",
            Self::Number => "number",
            Self::Boolean => "boolean",
        }
    }
}

/// Named default-value generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultFn {
    /// Current calendar date
    Today,
    /// File creation date (modification date when creation is unavailable)
    FileBirthDate,
    /// Title derived from the file name
    FileStemTitle,
}

/// One field of a template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Canonical field name
    pub name: String,
    /// Required fields are inspected and patched; optional ones only inspected
    #[serde(default = "default_true")]
    pub required: bool,
    /// Expected value type
    #[serde(rename = "type", default)]
    pub field_type: FieldType,
    /// Static default value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
    /// Default generator, consulted before the static default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_fn: Option<DefaultFn>,
    /// Legacy names that normalize to this field
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
}

fn default_true() -> bool {
    true
}

impl FieldSpec {
    /// Required field of the given type.
    pub fn required(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            required: true,
            field_type,
            default: None,
            default_fn: None,
            aliases: Vec::new(),
        }
    }

    /// Optional field of the given type.
    pub fn optional(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            required: false,
            ..Self::required(name, field_type)
        }
    }

    /// Attach a default generator (builder pattern).
    pub fn with_default_fn(mut self, default_fn: DefaultFn) -> Self {
        self.default_fn = Some(default_fn);
        self
    }

    /// Attach a static default (builder pattern).
    pub fn with_default(mut self, value: serde_json::Value) -> Self {
        self.default = Some(value);
        self
    }

    /// Attach legacy aliases (builder pattern).
    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases = aliases.into_iter().map(Into::into).collect();
        self
    }
}

/// Template for one content category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateSpec {
    /// Directory (first component under the content root) governed by this template
    pub directory: String,
    /// Field definitions, in output order
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
}

/// Templates used when the configuration defines none.
pub fn builtin_templates() -> Vec<(String, TemplateSpec)> {
    let title = || FieldSpec::required("title", FieldType::String).with_default_fn(DefaultFn::FileStemTitle);
    let created = || {
        FieldSpec::required("date_created", FieldType::Date)
            .with_default_fn(DefaultFn::FileBirthDate)
            .with_aliases(["created", "date"])
    };
    let tags = || FieldSpec::required("tags", FieldType::Array).with_aliases(["keywords"]);

    let essays = TemplateSpec {
        directory: "essays".to_string(),
        fields: vec![
            title(),
            created(),
            tags(),
            FieldSpec::optional("description", FieldType::String),
            FieldSpec::optional("date_modified", FieldType::Date).with_aliases(["modified", "updated"]),
        ],
    };

    let prompts = TemplateSpec {
        directory: "prompts".to_string(),
        fields: vec![
            title(),
            created(),
            tags(),
            FieldSpec::required("model", FieldType::String).with_default(serde_json::json!("")),
            FieldSpec::optional("version", FieldType::Number),
        ],
    };

    let mut resource_fields = vec![
        title(),
        FieldSpec::required(URL_FIELD, FieldType::Url).with_aliases(["link", "source"]),
        tags(),
        created(),
    ];
    // Enrichment-owned fields are accepted as optional
    resource_fields.extend(enrichment_fields().map(|name| {
        let field_type = if name == OG_VIDEOS {
            FieldType::Array
        } else {
            FieldType::String
        };
        FieldSpec::optional(name, field_type)
    }));

    let resources = TemplateSpec {
        directory: "resources".to_string(),
        fields: resource_fields,
    };

    vec![
        ("essays".to_string(), essays),
        ("prompts".to_string(), prompts),
        ("resources".to_string(), resources),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_spec_from_toml() {
        let spec: FieldSpec = toml::from_str(
            r#"
name = "date_created"
type = "date"
default_fn = "file_birth_date"
aliases = ["created"]
"#,
        )
        .unwrap();

        assert_eq!(spec.name, "date_created");
        assert!(spec.required);
        assert_eq!(spec.field_type, FieldType::Date);
        assert_eq!(spec.default_fn, Some(DefaultFn::FileBirthDate));
        assert_eq!(spec.aliases, vec!["created".to_string()]);
    }

    #[test]
    fn test_unknown_default_fn_rejected() {
        let result: Result<FieldSpec, _> = toml::from_str(
            r#"
name = "x"
default_fn = "random_words"
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_builtin_templates_have_unique_fields() {
        for (name, template) in builtin_templates() {
            let mut names: Vec<_> = template.fields.iter().map(|f| f.name.as_str()).collect();
            let total = names.len();
            names.sort();
            names.dedup();
            assert_eq!(names.len(), total, "duplicate field in template {}", name);
        }
    }

    #[test]
    fn test_resources_accept_every_enrichment_field() {
        let (_, resources) = builtin_templates()
            .into_iter()
            .find(|(name, _)| name == "resources")
            .unwrap();

        for name in enrichment_fields() {
            let spec = resources
                .fields
                .iter()
                .find(|f| f.name == name)
                .unwrap_or_else(|| panic!("missing {}", name));
            assert!(!spec.required);
            let expected = if name == OG_VIDEOS {
                FieldType::Array
            } else {
                FieldType::String
            };
            assert_eq!(spec.field_type, expected);
        }
    }
}
