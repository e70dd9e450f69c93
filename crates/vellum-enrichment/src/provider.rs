//! Provider traits.
//!
//! Providers return the raw JSON record for a URL. Interpretation of the
//! record is left to [`crate::normalize`], so mock providers in tests only
//! have to produce JSON.

use crate::error::Result;
use async_trait::async_trait;

/// Source of link-preview metadata (title, description, images, ...)
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Fetch the metadata record for `url`
    async fn fetch_metadata(&self, url: &str) -> Result<serde_json::Value>;
}

/// Source of page screenshots
#[async_trait]
pub trait ScreenshotProvider: Send + Sync {
    /// Fetch the screenshot record for `url`
    async fn fetch_screenshot(&self, url: &str) -> Result<serde_json::Value>;
}
