//! Codec round-trip tests
//!
//! Property tests over synthesized documents plus the concrete scenarios the
//! codec must keep stable across repeated runs.

use proptest::prelude::*;
use vellum_parser::{
    extract, replace_block, serialize, update_document, FieldValue, FrontmatterDocument,
    SerializeOptions,
};

// ============================================================================
// Strategies
// ============================================================================

fn key_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,12}"
}

fn string_strategy() -> impl Strategy<Value = String> {
    // Printable ASCII, no line breaks
    "[ -~]{0,24}"
}

fn number_strategy() -> impl Strategy<Value = f64> {
    prop_oneof![
        (-4000i64..4000).prop_map(|n| n as f64 / 4000.0),
        (4i64..4_000_000).prop_map(|n| n as f64 / 4.0),
        (4i64..4_000_000).prop_map(|n| -(n as f64) / 4.0),
    ]
}

fn value_strategy() -> impl Strategy<Value = FieldValue> {
    prop_oneof![
        Just(FieldValue::Null),
        any::<bool>().prop_map(FieldValue::Boolean),
        number_strategy().prop_map(FieldValue::Number),
        string_strategy().prop_map(FieldValue::String),
        prop::collection::vec(string_strategy(), 0..5).prop_map(FieldValue::StringArray),
    ]
}

fn document_strategy() -> impl Strategy<Value = FrontmatterDocument> {
    prop::collection::vec((key_strategy(), value_strategy()), 0..10).prop_map(|fields| {
        let mut doc = FrontmatterDocument::new();
        for (key, value) in fields {
            if !doc.contains_key(&key) {
                doc.insert(key, value);
            }
        }
        doc
    })
}

proptest! {
    #[test]
    fn extract_reproduces_serialized_document(doc in document_strategy()) {
        let fields = serialize(&doc, &SerializeOptions::default());
        let text = replace_block("Body\n", &fields);
        let parsed = extract(&text).expect("serialized block must be extractable");

        prop_assert_eq!(parsed, doc);
    }

    #[test]
    fn serialization_is_stable(doc in document_strategy()) {
        let options = SerializeOptions::default();
        let first = update_document("Body\n", &doc, &options);
        let reparsed = extract(&first).expect("block present");
        let second = update_document(&first, &reparsed, &options);

        prop_assert_eq!(first, second);
    }

    #[test]
    fn colon_strings_are_never_bare(prefix in "[a-zA-Z ]{0,8}", suffix in "[a-zA-Z ]{0,8}") {
        let value = format!("{}:{}", prefix, suffix);
        let mut doc = FrontmatterDocument::new();
        doc.insert("k", FieldValue::String(value.clone()));

        let line = serialize(&doc, &SerializeOptions::default());
        let rendered = line.trim_end().strip_prefix("k: ").unwrap();
        prop_assert!(rendered.starts_with('\'') || rendered.starts_with('"'));
    }
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_flow_tags_normalize_to_block_list() {
    let text = "---\ntags: [A, B, C]\n---\nBody\n";
    let doc = extract(text).unwrap();
    assert_eq!(doc.get("tags"), Some(&FieldValue::array(["A", "B", "C"])));

    let options = SerializeOptions::default();
    let fields = serialize(&doc, &options);
    assert_eq!(fields, "tags:\n  - A\n  - B\n  - C\n");

    // Stable across repeated runs
    let once = update_document(text, &doc, &options);
    let twice = update_document(&once, &extract(&once).unwrap(), &options);
    assert_eq!(once, "---\ntags:\n  - A\n  - B\n  - C\n---\nBody\n");
    assert_eq!(once, twice);
}

#[test]
fn test_url_always_quoted() {
    let mut doc = FrontmatterDocument::new();
    doc.insert("url", FieldValue::string("https://example.com/a/b"));
    doc.insert("topic", FieldValue::string("Open-Source"));

    let fields = serialize(&doc, &SerializeOptions::default());
    assert_eq!(fields, "url: 'https://example.com/a/b'\ntopic: Open-Source\n");
}

#[test]
fn test_single_element_array_stays_array() {
    let text = "---\ntags:\n  - only\n---\n";
    let doc = extract(text).unwrap();
    let out = update_document(text, &doc, &SerializeOptions::default());
    assert_eq!(out, text);
    assert_eq!(extract(&out).unwrap().get("tags"), Some(&FieldValue::array(["only"])));
}

#[test]
fn test_date_field_collapses_on_round_trip() {
    let text = "---\ndate_created: '2023-09-14T08:30:00.000Z'\ntitle: Notes\n---\n";
    let options = SerializeOptions::new().with_date_fields(["date_created"]);

    let doc = extract(text).unwrap();
    let out = update_document(text, &doc, &options);
    assert_eq!(out, "---\ndate_created: 2023-09-14\ntitle: Notes\n---\n");

    let again = extract(&out).unwrap();
    assert_eq!(again.get("date_created"), Some(&FieldValue::string("2023-09-14")));
}

#[test]
fn test_block_scalar_becomes_quoted_plain_scalar() {
    let text = "---\nsummary: |\n  Line one:\n  line two\n---\n";
    let doc = extract(text).unwrap();
    let fields = serialize(&doc, &SerializeOptions::default());

    assert_eq!(fields, "summary: 'Line one: line two'\n");
    assert!(!fields.contains('|'));
}

#[test]
fn test_quote_heavy_values_survive() {
    let mut doc = FrontmatterDocument::new();
    doc.insert("a", FieldValue::string("it's a \"test\""));
    doc.insert("b", FieldValue::string("back\\slash: 'x'"));
    doc.insert("c", FieldValue::string("#hashtag"));

    let text = update_document("", &doc, &SerializeOptions::default());
    assert_eq!(extract(&text).unwrap(), doc);
}

#[test]
fn test_fractional_numbers_below_one_stay_numbers() {
    let mut doc = FrontmatterDocument::new();
    doc.insert("ratio", FieldValue::Number(0.25));
    doc.insert("zero", FieldValue::Number(0.0));
    doc.insert("delta", FieldValue::Number(-0.5));
    doc.insert("label", FieldValue::string("0.75"));

    let fields = serialize(&doc, &SerializeOptions::default());
    assert_eq!(fields, "ratio: 0.25\nzero: 0\ndelta: -0.5\nlabel: '0.75'\n");

    let text = update_document("", &doc, &SerializeOptions::default());
    assert_eq!(extract(&text).unwrap(), doc);
}

#[test]
fn test_comments_and_nested_mappings_survive_rewrite() {
    let text = "---\n\
                # reading notes\n\
                tags: [a]\n\
                author:\n  name: Ada\n  site: https://ada.example\n\
                title: Notes\n\
                # end of block\n\
                ---\nBody\n";
    let options = SerializeOptions::new().with_field_order(["title", "tags"]);

    let doc = extract(text).unwrap();
    let out = update_document(text, &doc, &options);
    assert_eq!(
        out,
        "---\n\
         title: Notes\n\
         # reading notes\n\
         tags:\n  - a\n\
         author:\n  name: Ada\n  site: https://ada.example\n\
         # end of block\n\
         ---\nBody\n"
    );

    let again = update_document(&out, &extract(&out).unwrap(), &options);
    assert_eq!(again, out);
}
