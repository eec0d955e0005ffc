//! Error types for form handling
//!
//! Form errors are shown inline next to the form; the session state that
//! produced them is kept as it was.

use crate::workflow::WorkflowState;
use act_docx::RenderError;

/// Required input is missing at submit time
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Object name is blank
    #[error("Введіть назву об'єкта!")]
    MissingObjectName,
}

/// Form update or submit failure
#[derive(Debug, thiserror::Error)]
pub enum FormError {
    /// Submit rejected by validation
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// More oversight-body entries than allowed
    #[error("at most {max} oversight-body entries may be selected, got {attempted}")]
    OversightLimit { max: usize, attempted: usize },

    /// Event names a system the snapshot does not know
    #[error("unknown system code: {0}")]
    UnknownSystem(String),

    /// Workflow step out of order
    #[error("illegal workflow transition {from:?} -> {to:?}")]
    IllegalTransition {
        from: WorkflowState,
        to: WorkflowState,
    },

    /// Document generation failed
    #[error("document generation failed: {0}")]
    Render(#[from] RenderError),
}

impl FormError {
    /// Check if the error should be shown next to the form instead of as a
    /// blocking message
    #[inline]
    #[must_use]
    pub fn is_inline(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::OversightLimit { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_message_is_user_facing() {
        let err = FormError::from(ValidationError::MissingObjectName);
        assert_eq!(err.to_string(), "Введіть назву об'єкта!");
        assert!(err.is_inline());
    }

    #[test]
    fn render_failure_is_blocking() {
        let err = FormError::from(RenderError::Malformed("missing word/document.xml".into()));
        assert!(!err.is_inline());
        assert!(err.to_string().contains("missing word/document.xml"));
    }
}
