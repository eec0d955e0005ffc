//! HTTP error mapping

use crate::page::render_error_page;
use act_form::FormError;
use act_sheets::ConnectionError;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use std::sync::Arc;

/// Failure that replaces the form with a blocking message
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Reference data could not be loaded
    #[error("Помилка з'єднання: {0}")]
    Connection(Arc<ConnectionError>),

    /// Session workflow broke
    #[error("Помилка: {0}")]
    Form(#[from] FormError),
}

impl ServerError {
    /// HTTP status of the error page
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Connection(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Form(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<Arc<ConnectionError>> for ServerError {
    fn from(err: Arc<ConnectionError>) -> Self {
        Self::Connection(err)
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        tracing::warn!("Request failed: {}", self);
        (self.status(), Html(render_error_page(&self.to_string()))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_error_is_unavailable() {
        let err = ServerError::from(Arc::new(ConnectionError::MissingWorksheet(
            "загальні дані".into(),
        )));
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(err.to_string().starts_with("Помилка з'єднання"));
        assert!(err.to_string().contains("загальні дані"));
    }
}
