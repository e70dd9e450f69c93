//! Configuration schema.

use crate::error::{ConfigError, ConfigResult};
use crate::templates::{builtin_templates, TemplateSpec};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;
use std::time::Duration;

/// Top-level Vellum configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VellumConfig {
    /// Root of the content tree
    pub content_root: PathBuf,
    /// Where batch reports are written (defaults to `<content_root>/.reports`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reports_dir: Option<PathBuf>,
    /// Reconciliation behaviour
    pub reconcile: ReconcileConfig,
    /// External enrichment
    pub enrichment: EnrichmentConfig,
    /// Logging defaults (CLI flags take precedence)
    pub logging: LoggingConfig,
    /// Templates by category name
    pub templates: BTreeMap<String, TemplateSpec>,
}

/// Reconciliation behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileConfig {
    /// Inject defaults and rewrite files instead of only reporting
    pub auto_patch: bool,
    /// Rename legacy field aliases to their canonical names before reconciling
    pub normalize_aliases: bool,
}

/// External enrichment configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrichmentConfig {
    /// Whether enrichment runs at all
    pub enabled: bool,
    /// Upper bound on files processed concurrently in a batch
    pub max_concurrent_files: usize,
    /// Retry policy shared by all providers
    pub retry: RetryConfig,
    /// Link-preview metadata provider
    pub metadata: ProviderEndpoint,
    /// Screenshot provider
    pub screenshot: ProviderEndpoint,
}

/// Retry behaviour for outbound provider calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts, including the first one
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles for every further attempt
    pub base_delay_ms: u64,
    /// Upper bound on a single delay
    pub max_delay_ms: u64,
}

/// Remote provider endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderEndpoint {
    /// Base URL; the provider is disabled when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// Sent as a bearer token when set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Per-request timeout
    pub timeout_secs: u64,
}

/// Logging defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `off`, `error`, `warn`, `info`, `debug` or `trace`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
}

impl Default for VellumConfig {
    fn default() -> Self {
        Self {
            content_root: PathBuf::from("."),
            reports_dir: None,
            reconcile: ReconcileConfig::default(),
            enrichment: EnrichmentConfig::default(),
            logging: LoggingConfig::default(),
            templates: BTreeMap::new(),
        }
    }
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            auto_patch: false,
            normalize_aliases: true,
        }
    }
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            max_concurrent_files: 8,
            retry: RetryConfig::default(),
            metadata: ProviderEndpoint::default(),
            screenshot: ProviderEndpoint::default(),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 500,
            max_delay_ms: 8_000,
        }
    }
}

impl Default for ProviderEndpoint {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            timeout_secs: 30,
        }
    }
}

impl RetryConfig {
    /// Delay before the second attempt.
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    /// Cap on any single delay.
    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }
}

impl ProviderEndpoint {
    /// Request timeout as a `Duration`.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Whether an endpoint is configured.
    pub fn is_configured(&self) -> bool {
        self.endpoint
            .as_deref()
            .map(|e| !e.trim().is_empty())
            .unwrap_or(false)
    }
}

impl VellumConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: None,
            source: e,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reports directory, resolved against the content root.
    pub fn reports_dir(&self) -> PathBuf {
        match &self.reports_dir {
            Some(dir) if dir.is_absolute() => dir.clone(),
            Some(dir) => self.content_root.join(dir),
            None => self.content_root.join(".reports"),
        }
    }

    /// Configured templates, or the built-in set when none are configured.
    pub fn effective_templates(&self) -> Vec<(String, TemplateSpec)> {
        if self.templates.is_empty() {
            builtin_templates()
        } else {
            self.templates
                .iter()
                .map(|(name, spec)| (name.clone(), spec.clone()))
                .collect()
        }
    }

    /// Apply environment variable overrides.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Apply overrides from an arbitrary variable source.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(root) = lookup("VELLUM_CONTENT_ROOT") {
            self.content_root = PathBuf::from(root);
        }
        if let Some(dir) = lookup("VELLUM_REPORTS_DIR") {
            self.reports_dir = Some(PathBuf::from(dir));
        }
        if let Some(flag) = lookup("VELLUM_AUTO_PATCH") {
            match parse_bool(&flag) {
                Some(value) => self.reconcile.auto_patch = value,
                None => tracing::warn!(value = %flag, "Ignoring invalid VELLUM_AUTO_PATCH"),
            }
        }
        if let Some(endpoint) = lookup("VELLUM_METADATA_ENDPOINT") {
            self.enrichment.metadata.endpoint = Some(endpoint);
        }
        if let Some(endpoint) = lookup("VELLUM_SCREENSHOT_ENDPOINT") {
            self.enrichment.screenshot.endpoint = Some(endpoint);
        }
        if let Some(key) = lookup("VELLUM_PROVIDER_API_KEY") {
            self.enrichment.metadata.api_key = Some(key.clone());
            self.enrichment.screenshot.api_key = Some(key);
        }
    }

    /// Check cross-field constraints serde cannot express.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.enrichment.retry.max_attempts == 0 {
            return Err(ConfigError::invalid(
                "enrichment.retry.max_attempts must be at least 1",
            ));
        }
        if self.enrichment.retry.max_delay_ms < self.enrichment.retry.base_delay_ms {
            return Err(ConfigError::invalid(
                "enrichment.retry.max_delay_ms must not be smaller than base_delay_ms",
            ));
        }
        if self.enrichment.max_concurrent_files == 0 {
            return Err(ConfigError::invalid(
                "enrichment.max_concurrent_files must be at least 1",
            ));
        }

        for (label, endpoint) in [
            ("metadata", &self.enrichment.metadata),
            ("screenshot", &self.enrichment.screenshot),
        ] {
            if let Some(url) = &endpoint.endpoint {
                if !(url.starts_with("http://") || url.starts_with("https://")) {
                    return Err(ConfigError::invalid(format!(
                        "enrichment.{}.endpoint must be an http(s) URL, got '{}'",
                        label, url
                    )));
                }
            }
        }

        let mut directories = HashSet::new();
        for (name, template) in &self.templates {
            if template.directory.trim().is_empty() {
                return Err(ConfigError::invalid(format!(
                    "template '{}' has an empty directory",
                    name
                )));
            }
            if !directories.insert(template.directory.as_str()) {
                return Err(ConfigError::invalid(format!(
                    "directory '{}' is claimed by more than one template",
                    template.directory
                )));
            }

            let mut seen = HashSet::new();
            for field in &template.fields {
                for name_or_alias in std::iter::once(&field.name).chain(field.aliases.iter()) {
                    if !seen.insert(name_or_alias.as_str()) {
                        return Err(ConfigError::invalid(format!(
                            "template '{}' defines field or alias '{}' more than once",
                            name, name_or_alias
                        )));
                    }
                }
            }
        }

        Ok(())
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::{DefaultFn, FieldType};
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = VellumConfig::default();
        assert!(!config.reconcile.auto_patch);
        assert!(config.reconcile.normalize_aliases);
        assert_eq!(config.enrichment.retry.max_attempts, 3);
        assert_eq!(config.reports_dir(), PathBuf::from("./.reports"));
        assert_eq!(config.effective_templates().len(), 3);
    }

    #[test]
    fn test_parse_full_config() {
        let config = VellumConfig::from_toml_str(
            r#"
content_root = "/notes"
reports_dir = "reports"

[reconcile]
auto_patch = true

[enrichment]
enabled = true
max_concurrent_files = 2

[enrichment.retry]
max_attempts = 5
base_delay_ms = 100
max_delay_ms = 1000

[enrichment.metadata]
endpoint = "https://meta.example.com/api"
timeout_secs = 10

[templates.essays]
directory = "essays"

[[templates.essays.fields]]
name = "title"
default_fn = "file_stem_title"

[[templates.essays.fields]]
name = "tags"
type = "array"
"#,
        )
        .unwrap();

        assert_eq!(config.content_root, PathBuf::from("/notes"));
        assert_eq!(config.reports_dir(), PathBuf::from("/notes/reports"));
        assert!(config.reconcile.auto_patch);
        assert!(config.reconcile.normalize_aliases);
        assert_eq!(config.enrichment.retry.max_attempts, 5);
        assert_eq!(config.enrichment.retry.base_delay(), Duration::from_millis(100));
        assert!(config.enrichment.metadata.is_configured());
        assert!(!config.enrichment.screenshot.is_configured());

        let essays = &config.templates["essays"];
        assert_eq!(essays.fields.len(), 2);
        assert_eq!(essays.fields[0].default_fn, Some(DefaultFn::FileStemTitle));
        assert_eq!(essays.fields[1].field_type, FieldType::Array);
        assert_eq!(config.effective_templates().len(), 1);
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let err = VellumConfig::from_toml_str("[enrichment.retry]\nmax_attempts = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let err = VellumConfig::from_toml_str(
            r#"
[templates.notes]
directory = "notes"

[[templates.notes.fields]]
name = "title"

[[templates.notes.fields]]
name = "heading"
aliases = ["title"]
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn test_non_http_endpoint_rejected() {
        let err = VellumConfig::from_toml_str("[enrichment.screenshot]\nendpoint = \"ftp://x\"\n")
            .unwrap_err();
        assert!(err.to_string().contains("http(s)"));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("VELLUM_CONTENT_ROOT", "/content"),
            ("VELLUM_AUTO_PATCH", "yes"),
            ("VELLUM_PROVIDER_API_KEY", "secret"),
        ]
        .into_iter()
        .collect();

        let mut config = VellumConfig::default();
        config.apply_overrides(|name| vars.get(name).map(|v| v.to_string()));

        assert_eq!(config.content_root, PathBuf::from("/content"));
        assert!(config.reconcile.auto_patch);
        assert_eq!(config.enrichment.metadata.api_key.as_deref(), Some("secret"));
        assert_eq!(config.enrichment.screenshot.api_key.as_deref(), Some("secret"));
    }
}
