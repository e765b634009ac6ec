//! Axum route handlers for the cover-letter upload API.

use axum::{
    extract::{Request, State},
    Json,
};
use serde::Serialize;
use tracing::info;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::state::AppState;
use crate::uploads::payload::{read_upload, UploadEndpoint};

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub filename: String,
    pub size: usize,
    pub path: String,
}

/// POST /coverletter/upload
///
/// Accepts multipart (`file` field), raw octet-stream (`?filename=`) or
/// JSON `{filename, data}` with base64 data.
pub async fn handle_upload(
    State(state): State<AppState>,
    user: AuthUser,
    request: Request,
) -> Result<Json<UploadResponse>, AppError> {
    receive(UploadEndpoint::Upload, &state, user, request).await
}

/// POST /coverletter/file
///
/// Same as `/coverletter/upload` without multipart support.
pub async fn handle_file(
    State(state): State<AppState>,
    user: AuthUser,
    request: Request,
) -> Result<Json<UploadResponse>, AppError> {
    receive(UploadEndpoint::File, &state, user, request).await
}

async fn receive(
    endpoint: UploadEndpoint,
    state: &AppState,
    AuthUser(claims): AuthUser,
    request: Request,
) -> Result<Json<UploadResponse>, AppError> {
    let incoming = read_upload(endpoint, request).await?;
    let stored = state
        .uploads
        .store(&incoming.filename, &incoming.bytes)
        .await?;

    info!(
        user = %claims.username,
        filename = %stored.filename,
        size = stored.size,
        "Stored upload"
    );

    Ok(Json(UploadResponse {
        message: endpoint.message(incoming.format),
        filename: stored.filename,
        size: stored.size,
        path: stored.path.display().to_string(),
    }))
}
