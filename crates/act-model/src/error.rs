//! Error types for reference record validation

/// Errors raised while turning spreadsheet rows into typed records
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// System code is empty
    #[error("system code is empty")]
    EmptySystemCode,

    /// Required column has no value
    #[error("missing value in column '{0}'")]
    MissingColumn(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_error_display() {
        assert_eq!(ModelError::EmptySystemCode.to_string(), "system code is empty");
        assert_eq!(
            ModelError::MissingColumn("Full Text").to_string(),
            "missing value in column 'Full Text'"
        );
    }
}
