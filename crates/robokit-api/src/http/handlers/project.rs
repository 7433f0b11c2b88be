//! REST API handlers for project generation and archive download.
//!
//! `POST /projects` runs the full generation pipeline synchronously and
//! returns the assembled result; `POST /projects/archive` turns a result
//! back into a downloadable ZIP. Keeping the two separate means the
//! front-end can show the result before the user decides to download.

use std::time::Instant;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use robokit_core::package::{package_result, ARCHIVE_NAME};
use robokit_types::error::PackageError;
use robokit_types::image::EncodedImage;
use robokit_types::project::{Platform, ProjectRequest, ProjectResult};

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// Request body for generating a project.
#[derive(Debug, Deserialize)]
pub struct GenerateProjectRequest {
    /// Free-text robot description (10-500 characters).
    pub description: String,
    /// Target platform tag ("raspberry_pi", "arduino", "micro_bit").
    pub platform: String,
    /// Optional sketch image.
    pub image: Option<EncodedImage>,
}

impl GenerateProjectRequest {
    fn into_validated(self) -> Result<ProjectRequest, AppError> {
        let platform: Platform = self.platform.parse().map_err(AppError::Validation)?;
        let request = ProjectRequest {
            description: self.description,
            image: self.image,
            platform,
        };
        request.validate().map_err(AppError::Validation)?;
        Ok(request)
    }
}

/// POST /api/v1/projects -- Run the generation pipeline for one submission.
pub async fn generate_project(
    State(state): State<AppState>,
    Json(body): Json<GenerateProjectRequest>,
) -> Result<Json<ApiResponse<ProjectResult>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let request = body.into_validated()?;

    tracing::info!(platform = %request.platform, "project generation requested");
    let result = state.pipeline.run(&request).await?;

    let elapsed = start.elapsed().as_millis() as u64;
    let resp = ApiResponse::success(result, request_id, elapsed)
        .with_link("archive", "/api/v1/projects/archive");

    Ok(Json(resp))
}

/// POST /api/v1/projects/archive -- Package a generated result as a ZIP.
///
/// Body: the `ProjectResult` returned by `POST /projects`. Responds with
/// raw `application/zip` bytes rather than the JSON envelope.
pub async fn download_archive(
    State(_state): State<AppState>,
    Json(result): Json<ProjectResult>,
) -> Result<Response, AppError> {
    let bytes = package_result(&result).map_err(archive_error)?;

    tracing::debug!(size = bytes.len(), "archive assembled");

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{ARCHIVE_NAME}\""),
            ),
        ],
        bytes,
    )
        .into_response())
}

/// The archive body is client-supplied, so a bad embedded image is the
/// caller's input error, not a packaging failure.
fn archive_error(e: PackageError) -> AppError {
    match e {
        PackageError::InvalidImage(msg) => AppError::Validation(msg),
        other => AppError::Package(other),
    }
}
