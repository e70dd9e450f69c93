//! HTTP providers backed by `reqwest`.
//!
//! Both providers issue `GET {endpoint}?url=<encoded>` and return the JSON
//! body. Non-success statuses surface as [`EnrichmentError::HttpStatus`] so
//! the retry policy treats them like transport failures.

use crate::error::{EnrichmentError, Result};
use crate::provider::{MetadataProvider, ScreenshotProvider};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde_json::Value;
use tracing::debug;
use vellum_config::ProviderEndpoint;

/// Longest error body kept in an error message.
const MAX_ERROR_BODY: usize = 200;

/// Shared request plumbing for the JSON providers.
#[derive(Debug, Clone)]
struct JsonEndpoint {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl JsonEndpoint {
    fn from_config(config: &ProviderEndpoint) -> Result<Self> {
        let endpoint = config
            .endpoint
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .ok_or_else(|| EnrichmentError::InvalidConfig("endpoint is not set".to_string()))?;

        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("vellum/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            api_key: config.api_key.clone(),
        })
    }

    fn request_url(&self, url: &str) -> String {
        let separator = if self.endpoint.contains('?') { '&' } else { '?' };
        format!(
            "{}{}url={}",
            self.endpoint,
            separator,
            urlencoding::encode(url)
        )
    }

    async fn get_json(&self, url: &str) -> Result<Value> {
        let request_url = self.request_url(url);
        debug!(endpoint = %self.endpoint, url, "Provider request");

        let mut request = self.client.get(&request_url);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(map_transport)?;
        handle_response(response).await
    }
}

fn map_transport(error: reqwest::Error) -> EnrichmentError {
    if error.is_timeout() {
        EnrichmentError::Timeout
    } else {
        EnrichmentError::Request(error)
    }
}

async fn handle_response(response: Response) -> Result<Value> {
    let status = response.status();

    if status.is_success() {
        let body: Value = response
            .json()
            .await
            .map_err(|e| EnrichmentError::InvalidPayload(format!("invalid JSON: {}", e)))?;
        if body.is_object() {
            Ok(body)
        } else {
            Err(EnrichmentError::InvalidPayload(
                "expected a JSON object".to_string(),
            ))
        }
    } else {
        let mut message = response.text().await.unwrap_or_default();
        if message.len() > MAX_ERROR_BODY {
            let mut cut = MAX_ERROR_BODY;
            while !message.is_char_boundary(cut) {
                cut -= 1;
            }
            message.truncate(cut);
        }
        if message.trim().is_empty() {
            message = status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string();
        }
        Err(EnrichmentError::HttpStatus {
            status: status.as_u16(),
            message,
        })
    }
}

/// Link-preview provider over HTTP
#[derive(Debug, Clone)]
pub struct HttpMetadataProvider {
    inner: JsonEndpoint,
}

impl HttpMetadataProvider {
    pub fn from_config(config: &ProviderEndpoint) -> Result<Self> {
        Ok(Self {
            inner: JsonEndpoint::from_config(config)?,
        })
    }
}

#[async_trait]
impl MetadataProvider for HttpMetadataProvider {
    async fn fetch_metadata(&self, url: &str) -> Result<Value> {
        self.inner.get_json(url).await
    }
}

/// Screenshot provider over HTTP
#[derive(Debug, Clone)]
pub struct HttpScreenshotProvider {
    inner: JsonEndpoint,
}

impl HttpScreenshotProvider {
    pub fn from_config(config: &ProviderEndpoint) -> Result<Self> {
        Ok(Self {
            inner: JsonEndpoint::from_config(config)?,
        })
    }
}

#[async_trait]
impl ScreenshotProvider for HttpScreenshotProvider {
    async fn fetch_screenshot(&self, url: &str) -> Result<Value> {
        self.inner.get_json(url).await
    }
}
