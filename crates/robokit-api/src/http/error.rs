//! Application error type mapping to HTTP status codes and envelope format.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use robokit_types::error::{PackageError, PipelineError};

use crate::http::response::ApiResponse;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Request validation error.
    Validation(String),
    /// A fatal generator failure aborted the pipeline.
    Pipeline(PipelineError),
    /// Archive assembly failure.
    Package(PackageError),
}

impl From<PipelineError> for AppError {
    fn from(e: PipelineError) -> Self {
        AppError::Pipeline(e)
    }
}

impl From<PackageError> for AppError {
    fn from(e: PackageError) -> Self {
        AppError::Package(e)
    }
}

impl AppError {
    fn status_code_message(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            // One flattened message per failed request; the step name is in
            // the PipelineError display.
            AppError::Pipeline(e) => {
                (StatusCode::BAD_GATEWAY, "GENERATION_FAILED", e.to_string())
            }
            AppError::Package(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "PACKAGING_FAILED",
                e.to_string(),
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.status_code_message();
        let envelope = ApiResponse::<()>::error(code, message);
        (status, Json(envelope)).into_response()
    }
}
