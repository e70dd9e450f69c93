//! Provider response normalization.
//!
//! Providers disagree on shapes: an image may be a string, an object with a
//! `url`, or a list of either. Everything is reduced to trimmed, dequoted
//! strings, and anything that resolves to nothing is dropped instead of being
//! written as an empty value.

use crate::fields::{
    OG_DESCRIPTION, OG_FAVICON, OG_IMAGE, OG_SCREENSHOT_URL, OG_SITE_NAME, OG_TITLE, OG_URL,
    OG_VIDEOS, URL_FIELD,
};
use reqwest::Url;
use serde_json::Value;
use vellum_parser::{dequote, FieldValue, FrontmatterDocument};

/// A document's link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    /// Normalized form, used only to deduplicate in-flight fetches
    pub key: String,
    /// The link as written (dequoted and trimmed), sent to providers
    pub url: String,
}

/// The document's link, if it has a usable one.
pub fn resource(doc: &FrontmatterDocument) -> Option<Resource> {
    let raw = doc.get(URL_FIELD)?.as_str()?;
    let url = dequote(raw).trim().to_string();
    let key = normalize_url(&url)?;
    Some(Resource { key, url })
}

/// Normalized resource identifier for a document, if it has a usable link.
pub fn resource_key(doc: &FrontmatterDocument) -> Option<String> {
    resource(doc).map(|resource| resource.key)
}

/// Normalize a URL string for deduplication.
///
/// The URL is dequoted, trimmed and parsed; the fragment is removed, and so
/// are trailing slashes of the path when there is no query string, so that
/// trivially different spellings share one in-flight entry.
pub fn normalize_url(raw: &str) -> Option<String> {
    let cleaned = dequote(raw);
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return None;
    }

    let mut url = Url::parse(cleaned).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    url.set_fragment(None);

    let mut key = url.to_string();
    if url.query().is_none() {
        while key.ends_with('/') {
            key.pop();
        }
    }
    Some(key)
}

/// Preview fields resolved from a metadata record, in field order.
pub fn preview_fields(record: &Value) -> Vec<(&'static str, FieldValue)> {
    let record = unwrap_data(record);
    let mut out = Vec::new();

    let mut push = |field: &'static str, value: Option<String>| {
        if let Some(value) = value {
            out.push((field, FieldValue::String(value)));
        }
    };

    push(OG_TITLE, text(record.get("title")));
    push(OG_DESCRIPTION, text(record.get("description")));
    push(OG_URL, text(record.get("url")));
    push(OG_IMAGE, first_reference(record.get("image")));
    push(
        OG_SITE_NAME,
        text(record.get("site_name")).or_else(|| name_or_text(record.get("publisher"))),
    );
    push(
        OG_FAVICON,
        first_reference(record.get("favicon")).or_else(|| first_reference(record.get("logo"))),
    );

    let videos = references(record.get("video").or_else(|| record.get("videos")));
    if !videos.is_empty() {
        out.push((OG_VIDEOS, FieldValue::StringArray(videos)));
    }

    out
}

/// Screenshot fields resolved from a screenshot record.
pub fn screenshot_fields(record: &Value) -> Vec<(&'static str, FieldValue)> {
    let record = unwrap_data(record);
    first_reference(record.get("screenshot"))
        .or_else(|| first_reference(record.get("image")))
        .or_else(|| first_reference(record.get("url")))
        .map(|url| vec![(OG_SCREENSHOT_URL, FieldValue::String(url))])
        .unwrap_or_default()
}

/// `{ "data": {...} }` envelopes are unwrapped; anything else is used as is.
fn unwrap_data(record: &Value) -> &Value {
    match record.get("data") {
        Some(inner) if inner.is_object() => inner,
        _ => record,
    }
}

fn text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => clean(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn name_or_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Object(map) => text(map.get("name")),
        other => text(Some(other)),
    }
}

/// A string, or an object carrying the reference under `url`.
fn reference(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => clean(s),
        Value::Object(map) => map.get("url").and_then(|u| u.as_str()).and_then(clean),
        _ => None,
    }
}

fn first_reference(value: Option<&Value>) -> Option<String> {
    references(value).into_iter().next()
}

/// Every reference in a single value or a list of values.
fn references(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items.iter().filter_map(reference).collect(),
        Some(single) => reference(single).into_iter().collect(),
        None => Vec::new(),
    }
}

fn clean(raw: &str) -> Option<String> {
    let value = dequote(raw.trim());
    let value = value.trim();
    if value.is_empty() || value == "null" || value == "undefined" {
        None
    } else {
        Some(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_resource_key_normalization() {
        let doc: FrontmatterDocument = [(
            "url".to_string(),
            FieldValue::string(" 'https://Example.com/post/#comments' "),
        )]
        .into_iter()
        .collect();
        assert_eq!(resource_key(&doc).as_deref(), Some("https://example.com/post"));

        assert_eq!(
            normalize_url("https://example.com/").as_deref(),
            Some("https://example.com")
        );
        assert_eq!(
            normalize_url("https://example.com/login?next=/").as_deref(),
            Some("https://example.com/login?next=/")
        );
        assert_eq!(normalize_url("not a url"), None);
        assert_eq!(normalize_url("mailto:me@example.com"), None);
        assert_eq!(normalize_url("''"), None);
    }

    #[test]
    fn test_resource_keeps_link_as_written() {
        let doc: FrontmatterDocument = [(
            "url".to_string(),
            FieldValue::string(" https://Example.com/docs/ "),
        )]
        .into_iter()
        .collect();
        assert_eq!(
            resource(&doc),
            Some(Resource {
                key: "https://example.com/docs".to_string(),
                url: "https://Example.com/docs/".to_string(),
            })
        );
    }

    #[test]
    fn test_resource_key_requires_string_url() {
        let doc: FrontmatterDocument = [("url".to_string(), FieldValue::array(["https://a.b"]))]
            .into_iter()
            .collect();
        assert_eq!(resource_key(&doc), None);
        assert_eq!(resource_key(&FrontmatterDocument::new()), None);
    }

    #[test]
    fn test_preview_fields_from_varied_shapes() {
        let record = json!({
            "data": {
                "title": "  \"A Title\" ",
                "description": "",
                "url": "https://example.com/a",
                "image": [{ "url": "https://img.example.com/1.png" }, "https://img.example.com/2.png"],
                "publisher": { "name": "Example" },
                "logo": { "url": "https://example.com/logo.png" },
                "video": [{ "url": "https://v.example.com/1.mp4" }, { "type": "none" }]
            }
        });

        let fields = preview_fields(&record);
        assert_eq!(
            fields,
            vec![
                ("og_title", FieldValue::string("A Title")),
                ("og_url", FieldValue::string("https://example.com/a")),
                ("og_image", FieldValue::string("https://img.example.com/1.png")),
                ("og_site_name", FieldValue::string("Example")),
                ("og_favicon", FieldValue::string("https://example.com/logo.png")),
                ("og_videos", FieldValue::array(["https://v.example.com/1.mp4"])),
            ]
        );
    }

    #[test]
    fn test_null_and_empty_values_dropped() {
        let record = json!({ "title": null, "image": { "url": "" }, "site_name": "undefined" });
        assert!(preview_fields(&record).is_empty());
    }

    #[test]
    fn test_screenshot_shapes() {
        assert_eq!(
            screenshot_fields(&json!({ "screenshot": { "url": "https://s.example.com/x.png" } })),
            vec![("og_screenshot_url", FieldValue::string("https://s.example.com/x.png"))]
        );
        assert_eq!(
            screenshot_fields(&json!({ "data": { "image": "https://s.example.com/y.png" } })),
            vec![("og_screenshot_url", FieldValue::string("https://s.example.com/y.png"))]
        );
        assert!(screenshot_fields(&json!({})).is_empty());
    }
}
