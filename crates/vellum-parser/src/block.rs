//! Splicing a rendered block back into a document.

use crate::extract::{locate_block, DELIMITER};
use crate::serialize::{serialize, SerializeOptions};
use crate::value::FrontmatterDocument;

/// Wrap serialized fields in opening and closing delimiters.
pub fn render_block(fields: &str) -> String {
    let mut block = String::with_capacity(fields.len() + 2 * (DELIMITER.len() + 1));
    block.push_str(DELIMITER);
    block.push('\n');
    block.push_str(fields);
    if !fields.is_empty() && !fields.ends_with('\n') {
        block.push('\n');
    }
    block.push_str(DELIMITER);
    block.push('\n');
    block
}

/// Replace the document's frontmatter block with `fields`.
///
/// An existing block is replaced including both delimiter lines and the body
/// is kept byte-for-byte. Without an existing block a new one is prepended,
/// separated from the body by exactly one blank line.
pub fn replace_block(text: &str, fields: &str) -> String {
    let block = render_block(fields);

    match locate_block(text) {
        Some(span) => {
            let body = &text[span.end..];
            let mut out = String::with_capacity(block.len() + body.len());
            out.push_str(&block);
            out.push_str(body);
            out
        }
        None => {
            let body = text.trim_start_matches(['\n', '\r']);
            if body.is_empty() {
                block
            } else {
                format!("{}\n{}", block, body)
            }
        }
    }
}

/// Serialize `doc` and splice it into `text` in one step.
pub fn update_document(text: &str, doc: &FrontmatterDocument, options: &SerializeOptions) -> String {
    replace_block(text, &serialize(doc, options))
}
