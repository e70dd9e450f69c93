//! # Vellum Parser
//!
//! Frontmatter codec for the Vellum metadata engine.
//!
//! The codec reads and writes a restricted YAML-like dialect: scalar strings,
//! numbers, booleans, null and flat string arrays. It does not aim for YAML
//! compliance. Anchors, nested maps, multi-document streams and multi-line
//! block scalars are unsupported and handled fail-soft (the line is skipped,
//! or block scalars are folded into a single plain string).
//!
//! ## Round trip
//!
//! For any document produced by [`serialize`], extracting it again yields the
//! same fields and values, except for deliberate coercions: date fields
//! collapse to `YYYY-MM-DD` and embedded line breaks fold to spaces.
//!
//! ```rust
//! use vellum_parser::{extract, serialize, replace_block, SerializeOptions};
//!
//! let text = "---\ntags: [A, B]\n---\nBody";
//! let doc = extract(text).unwrap();
//! let fields = serialize(&doc, &SerializeOptions::default());
//! assert_eq!(replace_block(text, &fields), "---\ntags:\n  - A\n  - B\n---\nBody");
//! ```

pub mod block;
pub mod extract;
pub mod quoting;
pub mod serialize;
pub mod value;

pub use block::{render_block, replace_block, update_document};
pub use extract::{body, coerce_scalar, dequote, extract, split, DELIMITER};
pub use quoting::{date_prefix, needs_quoting, quote_scalar};
pub use serialize::{serialize, SerializeOptions};
pub use value::{format_number, FieldValue, FrontmatterDocument};
