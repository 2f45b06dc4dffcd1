//! Mapping from core errors to HTTP responses.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use registry_core::RegistryError;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("invalid request body: {0}")]
    Body(#[from] JsonRejection),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Registry(e) => StatusCode::from_u16(e.http_status())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            AppError::Body(rejection) => rejection.status(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let body = match &self {
            AppError::Registry(RegistryError::Validation(violations)) => json!({
                "error": self.to_string(),
                "violations": violations,
            }),
            _ => json!({ "error": self.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}
