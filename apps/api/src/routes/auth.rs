use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::{AuthUser, Claims};
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct ProtectedResponse {
    pub message: &'static str,
    pub user: Claims,
}

/// POST /login
///
/// Demo login: any non-empty username gets a one-hour token.
pub async fn handle_login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, AppError> {
    let username = body
        .ok()
        .and_then(|Json(req)| req.username)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| AppError::Validation("username required in JSON body".to_string()))?;

    let token = state.tokens.issue(&username)?;
    info!(user = %username, "Issued session token");
    Ok(Json(LoginResponse { token }))
}

/// GET /protected
pub async fn handle_protected(AuthUser(claims): AuthUser) -> Json<ProtectedResponse> {
    Json(ProtectedResponse {
        message: "Protected data",
        user: claims,
    })
}
