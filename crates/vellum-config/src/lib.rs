//! # Vellum Configuration
//!
//! Typed configuration for the Vellum metadata engine: content root, report
//! location, reconciliation switches, enrichment providers with their retry
//! policy, and per-category templates.
//!
//! ```rust,no_run
//! use vellum_config::ConfigLoader;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConfigLoader::load(None).await?;
//!     println!("reports go to {}", config.reports_dir().display());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod config;
mod error;
pub mod fields;
mod loader;
pub mod templates;

pub use config::*;
pub use error::*;
pub use loader::*;
pub use templates::{builtin_templates, DefaultFn, FieldSpec, FieldType, TemplateSpec};
