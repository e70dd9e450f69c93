//! Deterministic frontmatter serialization.

use crate::quoting::{date_prefix, quote_scalar};
use crate::value::{format_number, FieldValue, FrontmatterDocument};
use std::collections::HashSet;
use std::fmt::Write;

/// Controls field ordering and date rendering.
#[derive(Debug, Clone, Default)]
pub struct SerializeOptions {
    /// Fields emitted first, in this order, when present in the document
    pub field_order: Vec<String>,
    /// Fields whose string values are rendered as bare `YYYY-MM-DD`
    pub date_fields: HashSet<String>,
}

impl SerializeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the leading field order (builder pattern).
    pub fn with_field_order<I, S>(mut self, order: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.field_order = order.into_iter().map(Into::into).collect();
        self
    }

    /// Set the date-typed fields (builder pattern).
    pub fn with_date_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.date_fields = fields.into_iter().map(Into::into).collect();
        self
    }
}

/// Render a document as frontmatter lines, without delimiters.
///
/// Fields listed in `field_order` come first, then every other field in the
/// document's own order. Verbatim lines attached to a field are written just
/// before it. Each line ends with `\n`.
pub fn serialize(doc: &FrontmatterDocument, options: &SerializeOptions) -> String {
    let mut out = String::new();
    let mut emitted: HashSet<&str> = HashSet::new();

    for key in &options.field_order {
        if emitted.contains(key.as_str()) {
            continue;
        }
        if let Some(value) = doc.get(key) {
            write_leading(&mut out, doc, key);
            write_field(&mut out, key, value, options);
            emitted.insert(key.as_str());
        }
    }

    for (key, value) in doc.iter() {
        if !emitted.contains(key) {
            write_leading(&mut out, doc, key);
            write_field(&mut out, key, value, options);
        }
    }

    for line in doc.trailing_lines() {
        let _ = writeln!(out, "{}", line);
    }

    out
}

fn write_leading(out: &mut String, doc: &FrontmatterDocument, key: &str) {
    for line in doc.leading_lines(key) {
        let _ = writeln!(out, "{}", line);
    }
}

fn write_field(out: &mut String, key: &str, value: &FieldValue, options: &SerializeOptions) {
    // Writing to a String cannot fail
    let _ = match value {
        FieldValue::Null => writeln!(out, "{}: null", key),
        FieldValue::Boolean(b) => writeln!(out, "{}: {}", key, b),
        FieldValue::Number(n) => writeln!(out, "{}: {}", key, format_number(*n)),
        FieldValue::String(s) => {
            let rendered = if options.date_fields.contains(key) {
                match date_prefix(s) {
                    Some(date) => date.to_string(),
                    None => quote_scalar(s),
                }
            } else {
                quote_scalar(s)
            };
            writeln!(out, "{}: {}", key, rendered)
        }
        FieldValue::StringArray(items) => {
            let _ = writeln!(out, "{}:", key);
            for item in items {
                let _ = writeln!(out, "  - {}", quote_scalar(item));
            }
            Ok(())
        }
        FieldValue::Nested(raw) => writeln!(out, "{}:\n{}", key, raw),
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(fields: Vec<(&str, FieldValue)>) -> FrontmatterDocument {
        fields
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect()
    }

    #[test]
    fn test_field_order_then_document_order() {
        let d = doc(vec![
            ("zeta", FieldValue::string("z")),
            ("title", FieldValue::string("T")),
            ("alpha", FieldValue::string("a")),
        ]);
        let options = SerializeOptions::new().with_field_order(["title", "missing"]);

        assert_eq!(serialize(&d, &options), "title: T\nzeta: z\nalpha: a\n");
    }

    #[test]
    fn test_array_rendering() {
        let d = doc(vec![
            ("tags", FieldValue::array(["A", "B", "C"])),
            ("aliases", FieldValue::StringArray(vec![])),
        ]);
        assert_eq!(
            serialize(&d, &SerializeOptions::default()),
            "tags:\n  - A\n  - B\n  - C\naliases:\n"
        );
    }

    #[test]
    fn test_scalar_types() {
        let d = doc(vec![
            ("n", FieldValue::Null),
            ("b", FieldValue::Boolean(true)),
            ("i", FieldValue::Number(3.0)),
            ("f", FieldValue::Number(0.25)),
            ("url", FieldValue::string("https://example.com")),
        ]);
        assert_eq!(
            serialize(&d, &SerializeOptions::default()),
            "n: null\nb: true\ni: 3\nf: 0.25\nurl: 'https://example.com'\n"
        );
    }

    #[test]
    fn test_date_fields_collapse_to_day() {
        let d = doc(vec![
            ("date_created", FieldValue::string("2024-02-03T04:05:06Z")),
            ("other", FieldValue::string("2024-02-03T04:05:06Z")),
            ("date_modified", FieldValue::string("sometime")),
        ]);
        let options = SerializeOptions::new().with_date_fields(["date_created", "date_modified"]);

        assert_eq!(
            serialize(&d, &options),
            "date_created: 2024-02-03\nother: '2024-02-03T04:05:06Z'\ndate_modified: sometime\n"
        );
    }
}
