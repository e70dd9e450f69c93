//! Enrichment-owned frontmatter fields.

use std::fmt;

pub use vellum_config::fields::{
    is_enrichment_field, ERROR_FIELD, LAST_FETCH_FIELD, OG_DESCRIPTION, OG_FAVICON, OG_IMAGE,
    OG_SCREENSHOT_URL, OG_SITE_NAME, OG_TITLE, OG_URL, OG_VIDEOS, PREVIEW_FIELDS,
    SCREENSHOT_FIELDS, URL_FIELD,
};

/// Independently fetched field groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldGroup {
    Preview,
    Screenshot,
}

impl FieldGroup {
    pub const ALL: [FieldGroup; 2] = [FieldGroup::Preview, FieldGroup::Screenshot];

    pub fn fields(&self) -> &'static [&'static str] {
        match self {
            FieldGroup::Preview => PREVIEW_FIELDS,
            FieldGroup::Screenshot => SCREENSHOT_FIELDS,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldGroup::Preview => "preview",
            FieldGroup::Screenshot => "screenshot",
        }
    }
}

impl fmt::Display for FieldGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
