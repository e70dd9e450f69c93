//! Frontmatter value types.
//!
//! The codec only understands a restricted dialect: scalar strings, numbers,
//! booleans, null and flat string arrays. A nested mapping under a key is
//! outside the dialect; it is carried as opaque [`FieldValue::Nested`] text
//! and written back unchanged. Comment lines ride along with the key that
//! follows them.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single frontmatter value in the restricted dialect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// `null`, `~`, or a bare `key: ` with nothing after it in flow position
    Null,
    /// Plain or quoted scalar string
    String(String),
    /// Unquoted numeric token
    Number(f64),
    /// `true` / `false`
    Boolean(bool),
    /// Flat list of strings, block (`- item`) or flow (`[a, b]`) form
    StringArray(Vec<String>),
    /// Indented lines under a bare `key:` that are not list items, kept
    /// verbatim (newline-separated, indentation included)
    Nested(String),
}

impl FieldValue {
    /// Convenience constructor for string values.
    pub fn string(value: impl Into<String>) -> Self {
        Self::String(value.into())
    }

    /// Convenience constructor for array values.
    pub fn array<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::StringArray(items.into_iter().map(Into::into).collect())
    }

    /// True for null, blank strings and empty arrays.
    ///
    /// This is the "empty" notion used by template inspection: the key is
    /// present but carries nothing usable.
    pub fn is_empty_value(&self) -> bool {
        match self {
            Self::Null => true,
            Self::String(s) => s.trim().is_empty(),
            Self::StringArray(items) => items.is_empty(),
            Self::Nested(raw) => raw.trim().is_empty(),
            Self::Number(_) | Self::Boolean(_) => false,
        }
    }

    /// Borrow the string payload, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Borrow the array payload, if this is an array.
    pub fn as_array(&self) -> Option<&[String]> {
        match self {
            Self::StringArray(items) => Some(items),
            _ => None,
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Self::StringArray(_))
    }

    /// Short type name for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::String(_) => "string",
            Self::Number(_) => "number",
            Self::Boolean(_) => "boolean",
            Self::StringArray(_) => "array",
            Self::Nested(_) => "nested mapping",
        }
    }

    /// Convert a JSON value into the dialect.
    ///
    /// Arrays keep only their scalar members (rendered as strings). Objects
    /// have no representation and return `None`.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        use serde_json::Value;
        match value {
            Value::Null => Some(Self::Null),
            Value::Bool(b) => Some(Self::Boolean(*b)),
            Value::Number(n) => n.as_f64().map(Self::Number),
            Value::String(s) => Some(Self::String(s.clone())),
            Value::Array(items) => Some(Self::StringArray(
                items
                    .iter()
                    .filter_map(|item| match item {
                        Value::String(s) => Some(s.clone()),
                        Value::Number(n) => Some(n.to_string()),
                        Value::Bool(b) => Some(b.to_string()),
                        _ => None,
                    })
                    .collect(),
            )),
            Value::Object(_) => None,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::String(s) => write!(f, "{}", s),
            Self::Number(n) => write!(f, "{}", format_number(*n)),
            Self::Boolean(b) => write!(f, "{}", b),
            Self::StringArray(items) => write!(f, "[{}]", items.join(", ")),
            Self::Nested(raw) => {
                let lines: Vec<&str> = raw.lines().map(str::trim).collect();
                write!(f, "{{{}}}", lines.join(", "))
            }
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(value: Vec<String>) -> Self {
        Self::StringArray(value)
    }
}

/// Render a number the way the codec emits it: integral values without a
/// fractional part, everything else in shortest round-trip form.
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// Ordered frontmatter mapping.
///
/// Keys are unique; insertion order is the document order and is what the
/// serializer falls back to for fields without an explicit position.
///
/// Lines the parser cannot interpret as fields (comments, stray text) are
/// kept as `leading` lines of the next key, or as `trailing` lines after the
/// last one. They move with their key when fields are reordered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrontmatterDocument {
    fields: IndexMap<String, FieldValue>,
    #[serde(skip)]
    leading: IndexMap<String, Vec<String>>,
    #[serde(skip)]
    trailing: Vec<String>,
}

impl FrontmatterDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Insert or replace a value. Replacing keeps the key's original position.
    pub fn insert(&mut self, key: impl Into<String>, value: FieldValue) -> Option<FieldValue> {
        self.fields.insert(key.into(), value)
    }

    /// Remove a key, preserving the order of the remaining keys. Lines
    /// attached to the key go with it.
    pub fn remove(&mut self, key: &str) -> Option<FieldValue> {
        self.leading.shift_remove(key);
        self.fields.shift_remove(key)
    }

    /// Rename `from` to `to` in place, keeping its position.
    ///
    /// Returns false (and changes nothing) when `from` is absent or `to`
    /// already exists.
    pub fn rename_key(&mut self, from: &str, to: &str) -> bool {
        if !self.fields.contains_key(from) || self.fields.contains_key(to) {
            return false;
        }
        let fields = std::mem::take(&mut self.fields);
        self.fields = fields
            .into_iter()
            .map(|(k, v)| if k == from { (to.to_string(), v) } else { (k, v) })
            .collect();
        if let Some(lines) = self.leading.shift_remove(from) {
            self.leading.insert(to.to_string(), lines);
        }
        true
    }

    /// Verbatim lines that precede `key` in the source block.
    pub fn leading_lines(&self, key: &str) -> &[String] {
        self.leading.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Attach verbatim lines in front of `key`.
    pub fn push_leading_lines(&mut self, key: &str, lines: impl IntoIterator<Item = String>) {
        let mut lines = lines.into_iter().peekable();
        if lines.peek().is_some() {
            self.leading.entry(key.to_string()).or_default().extend(lines);
        }
    }

    /// Verbatim lines after the last field.
    pub fn trailing_lines(&self) -> &[String] {
        &self.trailing
    }

    pub fn set_trailing_lines(&mut self, lines: Vec<String>) {
        self.trailing = lines;
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FromIterator<(String, FieldValue)> for FrontmatterDocument {
    fn from_iter<T: IntoIterator<Item = (String, FieldValue)>>(iter: T) -> Self {
        Self {
            fields: iter.into_iter().collect(),
            ..Self::default()
        }
    }
}

impl IntoIterator for FrontmatterDocument {
    type Item = (String, FieldValue);
    type IntoIter = indexmap::map::IntoIter<String, FieldValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}
