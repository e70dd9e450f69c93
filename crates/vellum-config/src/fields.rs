//! Names of the enrichment-owned frontmatter fields.
//!
//! Shared by the built-in `resources` template, which accepts these fields as
//! optional, and by the enrichment coordinator, which writes them.

/// Frontmatter field holding the link to enrich.
pub const URL_FIELD: &str = "url";

/// Page title from the link preview.
pub const OG_TITLE: &str = "og_title";
/// Page description from the link preview.
pub const OG_DESCRIPTION: &str = "og_description";
/// Canonical URL from the link preview.
pub const OG_URL: &str = "og_url";
/// First preview image.
pub const OG_IMAGE: &str = "og_image";
/// Site or publisher name.
pub const OG_SITE_NAME: &str = "og_site_name";
/// Favicon or logo.
pub const OG_FAVICON: &str = "og_favicon";
/// Video references; the only array-typed enrichment field.
pub const OG_VIDEOS: &str = "og_videos";
/// Screenshot image of the page.
pub const OG_SCREENSHOT_URL: &str = "og_screenshot_url";

/// Link-preview fields, filled from the metadata provider.
pub const PREVIEW_FIELDS: &[&str] = &[
    OG_TITLE,
    OG_DESCRIPTION,
    OG_URL,
    OG_IMAGE,
    OG_SITE_NAME,
    OG_FAVICON,
    OG_VIDEOS,
];

/// Screenshot fields, filled from the screenshot provider.
pub const SCREENSHOT_FIELDS: &[&str] = &[OG_SCREENSHOT_URL];

/// RFC 3339 timestamp of the last merge that changed a field.
pub const LAST_FETCH_FIELD: &str = "og_last_fetch";

/// Reason of the last terminal fetch failure; cleared on success.
pub const ERROR_FIELD: &str = "og_error";

/// Every field enrichment may write, in output order.
pub fn enrichment_fields() -> impl Iterator<Item = &'static str> {
    PREVIEW_FIELDS
        .iter()
        .chain(SCREENSHOT_FIELDS)
        .copied()
        .chain([LAST_FETCH_FIELD, ERROR_FIELD])
}

/// Whether `field` is written by enrichment.
pub fn is_enrichment_field(field: &str) -> bool {
    enrichment_fields().any(|name| name == field)
}
