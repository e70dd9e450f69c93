//! Template errors.
//!
//! Both variants that occur during reconciliation are caught at field level by
//! the engine; they never abort a file.

use thiserror::Error;

/// Errors raised by template inspectors and default generators.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TemplateError {
    /// An inspector could not classify a value.
    #[error("Inspection of '{field}' failed: {message}")]
    Inspection { field: String, message: String },

    /// A default generator failed or produced an unusable value.
    #[error("Default generation for '{field}' failed: {message}")]
    DefaultGeneration { field: String, message: String },

    /// A template definition cannot be turned into a runtime template.
    #[error("Invalid template '{template}': {message}")]
    InvalidTemplate { template: String, message: String },
}

impl TemplateError {
    pub fn inspection(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Inspection {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn default_generation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DefaultGeneration {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn invalid_template(template: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidTemplate {
            template: template.into(),
            message: message.into(),
        }
    }
}

/// Result type for template operations.
pub type Result<T> = std::result::Result<T, TemplateError>;
