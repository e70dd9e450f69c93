//! # Vellum Core
//!
//! Template model, reconciliation engine and change reporting.
//!
//! ## Architecture
//!
//! - **template**: runtime [`Template`]s built from configuration, with
//!   per-field inspectors and default generators
//! - **registry**: resolves the template governing a file path
//! - **reconcile**: pure inspection plus default injection
//! - **report**: [`ChangeReporter`] and the narrow [`ChangeSink`] interface
//!
//! ```rust
//! use std::path::Path;
//! use vellum_config::FieldType;
//! use vellum_core::{reconcile, ReconcileOptions, Template, TemplateField};
//! use vellum_parser::{extract, FieldValue};
//!
//! let template = Template::new("essays", "essays")
//!     .with_field(TemplateField::required("title", FieldType::String));
//! let doc = extract("---\ntitle: \n---\nBody text").unwrap();
//!
//! let outcome = reconcile(&doc, &template, Path::new("essays/my-note.md"), ReconcileOptions::patch());
//! assert!(outcome.changed);
//! assert_eq!(outcome.patched.get("title"), Some(&FieldValue::string("My Note")));
//! ```

pub mod error;
pub mod reconcile;
pub mod registry;
pub mod report;
pub mod template;

pub use error::{Result, TemplateError};
pub use reconcile::{
    field_order, inspect, normalize_aliases, reconcile, reconcile_with_sink, serialize_options,
    FieldInspection, InspectionReport, ReconcileOptions, ReconcileOutcome,
};
pub use registry::TemplateRegistry;
pub use report::{ChangeEvent, ChangeReporter, ChangeSink, NullSink, ReportCounts};
pub use template::{
    file_birth_date, title_from_path, today, DefaultGenerator, FieldKind, InspectStatus,
    Inspection, Inspector, Template, TemplateField, TITLE_FIELD,
};
