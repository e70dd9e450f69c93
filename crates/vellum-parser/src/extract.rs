//! Frontmatter block location and extraction.
//!
//! Parsing is line-oriented and deliberately shallow. Supported per line:
//!
//! - `key: value` scalars with type coercion
//! - `key:` followed by `- item` lines (block list)
//! - `key: [a, b]` (flow list)
//! - `key: |` / `key: >` block scalars, folded into a single plain string
//!
//! A bare `key:` followed by indented non-list lines (a nested mapping) is
//! kept verbatim as [`FieldValue::Nested`]. Comments and other lines without
//! a `key:` prefix are kept verbatim and attached to the next key.

use crate::value::{FieldValue, FrontmatterDocument};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

/// Opening and closing delimiter token.
pub const DELIMITER: &str = "---";

const BOM: char = '\u{feff}';

static KEY_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([^\s#:\-][^:]*?)\s*:(?:\s+(.*?))?\s*$").expect("valid regex"));

/// Unquoted numeric token. A lone `0` may precede the decimal point; any
/// other leading zero (`02134`) keeps the token a string.
pub(crate) const NUMBER_PATTERN: &str = r"-?(?:0|[1-9][0-9]{0,14})(?:\.[0-9]+)?";

static NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!("^{NUMBER_PATTERN}$")).expect("valid regex"));

const BLOCK_SCALAR_INDICATORS: &[&str] = &["|", ">", "|-", ">-", "|+", ">+"];

/// Byte offsets of a frontmatter block inside a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BlockSpan {
    /// First byte of the first line after the opening delimiter
    pub inner_start: usize,
    /// First byte of the closing delimiter line
    pub inner_end: usize,
    /// First byte after the closing delimiter line (including its newline)
    pub end: usize,
}

fn line_content(line: &str) -> &str {
    line.trim_end_matches(['\n', '\r'])
}

/// Find the leading delimited block, if any.
pub(crate) fn locate_block(text: &str) -> Option<BlockSpan> {
    let mut offset = 0;
    let mut lines = text.split_inclusive('\n');

    let first = lines.next()?;
    if line_content(first).trim_start_matches(BOM).trim_end() != DELIMITER {
        return None;
    }
    offset += first.len();
    let inner_start = offset;

    for line in lines {
        if line_content(line).trim_end() == DELIMITER {
            return Some(BlockSpan {
                inner_start,
                inner_end: offset,
                end: offset + line.len(),
            });
        }
        offset += line.len();
    }

    None
}

/// Parse the leading frontmatter block.
///
/// Returns `None` when the document does not open with the delimiter on its
/// own line or the block is never closed. An empty block yields an empty
/// document.
pub fn extract(text: &str) -> Option<FrontmatterDocument> {
    let span = locate_block(text)?;
    Some(parse_block(&text[span.inner_start..span.inner_end]))
}

/// Split a document into its frontmatter and body.
pub fn split(text: &str) -> Option<(FrontmatterDocument, &str)> {
    let span = locate_block(text)?;
    Some((
        parse_block(&text[span.inner_start..span.inner_end]),
        &text[span.end..],
    ))
}

/// The document body, i.e. everything after the frontmatter block (or the
/// whole text when there is none).
pub fn body(text: &str) -> &str {
    match locate_block(text) {
        Some(span) => &text[span.end..],
        None => text,
    }
}

enum Pending {
    None,
    List { key: String, items: Vec<String> },
    BlockScalar { key: String, parts: Vec<String> },
    Nested { key: String, lines: Vec<String> },
}

impl Pending {
    fn flush(self, doc: &mut FrontmatterDocument) {
        match self {
            Pending::None => {}
            Pending::List { key, items } => {
                doc.insert(key, FieldValue::StringArray(items));
            }
            Pending::BlockScalar { key, parts } => {
                doc.insert(key, FieldValue::String(parts.join(" ")));
            }
            Pending::Nested { key, lines } => {
                doc.insert(key, FieldValue::Nested(lines.join("\n")));
            }
        }
    }
}

fn list_item(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    let rest = trimmed.strip_prefix('-')?;
    if rest.is_empty() || rest.starts_with(char::is_whitespace) {
        Some(rest.trim())
    } else {
        None
    }
}

fn is_indented(line: &str) -> bool {
    line.starts_with([' ', '\t']) && !line.trim().is_empty()
}

fn parse_block(block: &str) -> FrontmatterDocument {
    let mut doc = FrontmatterDocument::new();
    let mut pending = Pending::None;
    // Lines kept verbatim until the next key claims them
    let mut loose: Vec<String> = Vec::new();

    for raw in block.lines() {
        let line = raw.trim_end_matches('\r');

        match &mut pending {
            Pending::BlockScalar { parts, .. } if is_indented(line) => {
                parts.push(line.trim().to_string());
                continue;
            }
            Pending::Nested { lines, .. } if is_indented(line) => {
                lines.push(line.to_string());
                continue;
            }
            Pending::List { key, items } => {
                if let Some(item) = list_item(line) {
                    if !item.is_empty() {
                        items.push(dequote(item));
                    }
                    continue;
                }
                if items.is_empty() && is_indented(line) {
                    pending = Pending::Nested {
                        key: std::mem::take(key),
                        lines: vec![line.to_string()],
                    };
                    continue;
                }
            }
            _ => {}
        }

        if line.trim().is_empty() {
            continue;
        }
        if line.trim_start().starts_with('#') {
            loose.push(line.to_string());
            continue;
        }

        // Any non-continuation line closes the pending construct
        std::mem::replace(&mut pending, Pending::None).flush(&mut doc);

        if line.starts_with([' ', '\t']) {
            trace!(line = %line, "Keeping stray indented frontmatter line verbatim");
            loose.push(line.to_string());
            continue;
        }

        let Some(caps) = KEY_LINE.captures(line) else {
            trace!(line = %line, "Keeping frontmatter line without key verbatim");
            loose.push(line.to_string());
            continue;
        };

        let key = caps[1].trim().to_string();
        let value = caps.get(2).map(|m| m.as_str().trim()).unwrap_or("");
        doc.push_leading_lines(&key, loose.drain(..));

        if value.is_empty() {
            pending = Pending::List {
                key,
                items: Vec::new(),
            };
        } else if BLOCK_SCALAR_INDICATORS.contains(&value) {
            pending = Pending::BlockScalar {
                key,
                parts: Vec::new(),
            };
        } else {
            doc.insert(key, coerce_scalar(value));
        }
    }

    pending.flush(&mut doc);
    doc.set_trailing_lines(loose);
    doc
}

/// Coerce a raw scalar token into a typed value.
pub fn coerce_scalar(raw: &str) -> FieldValue {
    let raw = raw.trim();

    if is_quoted(raw) {
        return FieldValue::String(dequote(raw));
    }

    let raw = strip_inline_comment(raw);

    match raw {
        "" | "null" | "~" => FieldValue::Null,
        "true" => FieldValue::Boolean(true),
        "false" => FieldValue::Boolean(false),
        _ if raw.starts_with('[') && raw.ends_with(']') => {
            FieldValue::StringArray(parse_flow_list(&raw[1..raw.len() - 1]))
        }
        _ if NUMBER.is_match(raw) => raw
            .parse::<f64>()
            .map(FieldValue::Number)
            .unwrap_or_else(|_| FieldValue::String(raw.to_string())),
        _ => FieldValue::String(raw.to_string()),
    }
}

fn is_quoted(raw: &str) -> bool {
    raw.len() >= 2
        && ((raw.starts_with('\'') && raw.ends_with('\''))
            || (raw.starts_with('"') && raw.ends_with('"')))
}

/// `value # comment` loses the comment; `#` without a preceding space is
/// content (URL fragments, hashtags).
fn strip_inline_comment(raw: &str) -> &str {
    match raw.find(" #") {
        Some(idx) => raw[..idx].trim_end(),
        None => raw,
    }
}

/// Remove one level of quoting, undoing the serializer's escapes.
pub fn dequote(raw: &str) -> String {
    let raw = raw.trim();
    if !is_quoted(raw) {
        return raw.to_string();
    }

    let inner = &raw[1..raw.len() - 1];
    if raw.starts_with('\'') {
        inner.replace("''", "'")
    } else {
        let mut out = String::with_capacity(inner.len());
        let mut chars = inner.chars();
        while let Some(c) = chars.next() {
            if c == '\\' {
                match chars.next() {
                    Some('n') => out.push(' '),
                    Some('t') => out.push('\t'),
                    Some(other) => out.push(other),
                    None => out.push('\\'),
                }
            } else {
                out.push(c);
            }
        }
        out
    }
}

fn parse_flow_list(inner: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;

    for c in inner.chars() {
        match (quote, c) {
            (None, '\'' | '"') => {
                quote = Some(c);
                current.push(c);
            }
            (Some(q), c) if c == q => {
                quote = None;
                current.push(c);
            }
            (None, ',') => {
                items.push(std::mem::take(&mut current));
            }
            _ => current.push(c),
        }
    }
    items.push(current);

    items
        .into_iter()
        .map(|item| dequote(item.trim()))
        .filter(|item| !item.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_opening_delimiter() {
        assert!(extract("# Title\n\nBody").is_none());
        assert!(extract("").is_none());
        assert!(extract("----\ntitle: x\n----\n").is_none());
    }

    #[test]
    fn test_unclosed_block() {
        assert!(extract("---\ntitle: x\nstill going\n").is_none());
    }

    #[test]
    fn test_empty_block() {
        let doc = extract("---\n---\nBody").unwrap();
        assert!(doc.is_empty());
    }

    #[test]
    fn test_scalar_coercion() {
        let text = "---\n\
                    title: Plain words\n\
                    draft: true\n\
                    published: false\n\
                    count: 42\n\
                    ratio: 2.5\n\
                    fraction: 0.25\n\
                    zero: 0\n\
                    zip: 02134\n\
                    padded: 00.5\n\
                    nothing: null\n\
                    tilde: ~\n\
                    single: 'quoted: value'\n\
                    double: \"it's\"\n\
                    ---\n";
        let doc = extract(text).unwrap();

        assert_eq!(doc.get("title"), Some(&FieldValue::string("Plain words")));
        assert_eq!(doc.get("draft"), Some(&FieldValue::Boolean(true)));
        assert_eq!(doc.get("published"), Some(&FieldValue::Boolean(false)));
        assert_eq!(doc.get("count"), Some(&FieldValue::Number(42.0)));
        assert_eq!(doc.get("ratio"), Some(&FieldValue::Number(2.5)));
        assert_eq!(doc.get("fraction"), Some(&FieldValue::Number(0.25)));
        assert_eq!(doc.get("zero"), Some(&FieldValue::Number(0.0)));
        assert_eq!(doc.get("zip"), Some(&FieldValue::string("02134")));
        assert_eq!(doc.get("padded"), Some(&FieldValue::string("00.5")));
        assert_eq!(doc.get("nothing"), Some(&FieldValue::Null));
        assert_eq!(doc.get("tilde"), Some(&FieldValue::Null));
        assert_eq!(doc.get("single"), Some(&FieldValue::string("quoted: value")));
        assert_eq!(doc.get("double"), Some(&FieldValue::string("it's")));
    }

    #[test]
    fn test_block_list() {
        let text = "---\ntags:\n  - rust\n  - 'yaml: lite'\n- unindented\ntitle: After\n---\n";
        let doc = extract(text).unwrap();
        assert_eq!(
            doc.get("tags"),
            Some(&FieldValue::array(["rust", "yaml: lite", "unindented"]))
        );
        assert_eq!(doc.get("title"), Some(&FieldValue::string("After")));
    }

    #[test]
    fn test_empty_list_key() {
        let doc = extract("---\naliases:\ntitle: x\n---\n").unwrap();
        assert_eq!(doc.get("aliases"), Some(&FieldValue::StringArray(vec![])));
    }

    #[test]
    fn test_flow_list() {
        let doc = extract("---\ntags: [A, B, C]\nempty: []\nq: ['a, b', \"c\"]\n---\n").unwrap();
        assert_eq!(doc.get("tags"), Some(&FieldValue::array(["A", "B", "C"])));
        assert_eq!(doc.get("empty"), Some(&FieldValue::StringArray(vec![])));
        assert_eq!(doc.get("q"), Some(&FieldValue::array(["a, b", "c"])));
    }

    #[test]
    fn test_url_value_keeps_colons() {
        let doc = extract("---\nurl: https://example.com/a?b=c#frag\n---\n").unwrap();
        assert_eq!(
            doc.get("url"),
            Some(&FieldValue::string("https://example.com/a?b=c#frag"))
        );
    }

    #[test]
    fn test_unparsed_lines_kept_with_next_key() {
        let text = "---\ntitle: ok\njust some words\n# comment\n  stray: line\nafter: yes\n# tail\n---\n";
        let doc = extract(text).unwrap();
        let keys: Vec<_> = doc.keys().collect();
        assert_eq!(keys, vec!["title", "after"]);
        assert_eq!(
            doc.leading_lines("after"),
            ["just some words", "# comment", "  stray: line"]
        );
        assert!(doc.leading_lines("title").is_empty());
        assert_eq!(doc.trailing_lines(), ["# tail"]);
    }

    #[test]
    fn test_nested_mapping_kept_verbatim() {
        let text = "---\nauthor:\n  name: Ada\n  links:\n    - https://a.example\ntitle: x\n---\n";
        let doc = extract(text).unwrap();
        assert_eq!(
            doc.get("author"),
            Some(&FieldValue::Nested(
                "  name: Ada\n  links:\n    - https://a.example".to_string()
            ))
        );
        assert_eq!(doc.get("title"), Some(&FieldValue::string("x")));
    }

    #[test]
    fn test_block_scalar_folded() {
        let text = "---\ndescription: >-\n  first line\n  second line\ntitle: x\n---\n";
        let doc = extract(text).unwrap();
        assert_eq!(
            doc.get("description"),
            Some(&FieldValue::string("first line second line"))
        );
        assert_eq!(doc.get("title"), Some(&FieldValue::string("x")));
    }

    #[test]
    fn test_crlf_and_bom() {
        let text = "\u{feff}---\r\ntitle: Windows\r\ntags:\r\n  - a\r\n---\r\nBody";
        let (doc, body) = split(text).unwrap();
        assert_eq!(doc.get("title"), Some(&FieldValue::string("Windows")));
        assert_eq!(doc.get("tags"), Some(&FieldValue::array(["a"])));
        assert_eq!(body, "Body");
    }

    #[test]
    fn test_inline_comment_stripped() {
        let doc = extract("---\nstatus: draft # todo\n---\n").unwrap();
        assert_eq!(doc.get("status"), Some(&FieldValue::string("draft")));
    }

    #[test]
    fn test_duplicate_key_last_wins() {
        let doc = extract("---\na: 1\nb: 2\na: 3\n---\n").unwrap();
        let keys: Vec<_> = doc.keys().collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(doc.get("a"), Some(&FieldValue::Number(3.0)));
    }

    #[test]
    fn test_body_without_block() {
        assert_eq!(body("plain"), "plain");
        assert_eq!(body("---\na: 1\n---\nrest\n"), "rest\n");
    }
}
