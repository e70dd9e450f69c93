//! Template lookup by content directory.

use crate::error::Result;
use crate::template::Template;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tracing::debug;
use vellum_config::TemplateSpec;

/// Maps the first directory under the content root to its template.
#[derive(Debug, Clone)]
pub struct TemplateRegistry {
    content_root: PathBuf,
    templates: Vec<Arc<Template>>,
}

impl TemplateRegistry {
    pub fn new(content_root: impl Into<PathBuf>) -> Self {
        Self {
            content_root: content_root.into(),
            templates: Vec::new(),
        }
    }

    /// Build every template from its declarative definition.
    pub fn from_specs<'a, I>(content_root: impl Into<PathBuf>, specs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a String, &'a TemplateSpec)>,
    {
        let mut registry = Self::new(content_root);
        for (name, spec) in specs {
            registry.register(Template::from_spec(name, spec)?);
        }
        Ok(registry)
    }

    pub fn register(&mut self, template: Template) {
        self.templates.push(Arc::new(template));
    }

    pub fn content_root(&self) -> &Path {
        &self.content_root
    }

    pub fn templates(&self) -> impl Iterator<Item = &Arc<Template>> {
        self.templates.iter()
    }

    pub fn get(&self, name: &str) -> Option<Arc<Template>> {
        self.templates.iter().find(|t| t.name == name).cloned()
    }

    /// Template governing `path`, if any.
    ///
    /// Only the first component below the content root is considered, so
    /// `essays/drafts/a.md` belongs to the `essays` template.
    pub fn resolve(&self, path: &Path) -> Option<Arc<Template>> {
        let relative = self.relative(path)?;
        let category = relative.parent()?.components().find_map(|c| match c {
            Component::Normal(name) => name.to_str(),
            _ => None,
        })?;

        let template = self
            .templates
            .iter()
            .find(|t| t.directory == category)
            .cloned();
        if template.is_none() {
            debug!(path = %path.display(), category, "No template for directory");
        }
        template
    }

    fn relative<'p>(&self, path: &'p Path) -> Option<&'p Path> {
        if self.root_is_current_dir() && path.is_relative() {
            return Some(path);
        }
        path.strip_prefix(&self.content_root).ok()
    }

    fn root_is_current_dir(&self) -> bool {
        self.content_root
            .components()
            .all(|c| matches!(c, Component::CurDir))
    }
}
