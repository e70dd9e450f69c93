//! # Vellum Enrichment
//!
//! Augments frontmatter with data fetched from external providers: link
//! preview metadata (`og_*` fields) and page screenshots.
//!
//! ## Guarantees
//!
//! - **Presence-based triggering**: a group is fetched only while one of its
//!   fields is absent. Empty strings mark "attempted" and stop refetch loops.
//! - **Deduplication**: at most one outstanding call per `(group, resource)`
//!   per coordinator; concurrent callers skip and log.
//! - **Bounded retries**: exponential backoff from [`RetryPolicy`], then the
//!   failure is written to `og_error` and left for a later run.
//! - **Additive merge**: only enrichment-owned keys are written, and the
//!   outcome carries the patch so it can be replayed onto a fresh read of the
//!   file.
//!
//! ## Modules
//!
//! - **coordinator**: [`EnrichmentCoordinator`] and [`EnrichmentOutcome`]
//! - **provider** / **http**: provider traits and their `reqwest` implementations
//! - **normalize**: response and URL normalization
//! - **inflight**: per-coordinator in-flight registry
//! - **retry**: backoff policy

pub mod coordinator;
pub mod error;
pub mod fields;
pub mod http;
pub mod inflight;
pub mod normalize;
pub mod provider;
pub mod retry;

pub use coordinator::{EnrichmentCoordinator, EnrichmentOutcome, PatchOp};
pub use error::{EnrichmentError, Result};
pub use fields::{
    is_enrichment_field, FieldGroup, ERROR_FIELD, LAST_FETCH_FIELD, PREVIEW_FIELDS,
    SCREENSHOT_FIELDS, URL_FIELD,
};
pub use http::{HttpMetadataProvider, HttpScreenshotProvider};
pub use inflight::{InFlightGuard, InFlightRegistry};
pub use normalize::{
    normalize_url, preview_fields, resource, resource_key, screenshot_fields, Resource,
};
pub use provider::{MetadataProvider, ScreenshotProvider};
pub use retry::RetryPolicy;
