//! Error types for document rendering

use std::path::PathBuf;

/// Template could not be turned into a document
///
/// Nothing is retried; the caller shows the cause and offers no partial
/// document.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// Template file could not be read
    #[error("cannot read template {path}: {source}")]
    TemplateIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Template is not a word-processing package
    #[error("malformed template: {0}")]
    Malformed(String),

    /// Template tags are unbalanced or unsupported
    #[error("template syntax error in {part}: {message}")]
    Syntax { part: String, message: String },

    /// Value shape does not fit the placeholder
    #[error("placeholder '{placeholder}' expects {expected}, got {actual}")]
    TypeMismatch {
        placeholder: String,
        expected: &'static str,
        actual: &'static str,
    },

    /// Output package could not be written
    #[error("cannot write document: {0}")]
    Output(String),
}

impl RenderError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::TemplateIo {
            path: path.into(),
            source,
        }
    }

    /// Create syntax error for a package part
    pub fn syntax(part: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Syntax {
            part: part.into(),
            message: message.into(),
        }
    }

    /// Create type mismatch error
    pub fn type_mismatch(
        placeholder: impl Into<String>,
        expected: &'static str,
        actual: &'static str,
    ) -> Self {
        Self::TypeMismatch {
            placeholder: placeholder.into(),
            expected,
            actual,
        }
    }
}
