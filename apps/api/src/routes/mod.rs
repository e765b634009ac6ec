pub mod auth;
pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::state::AppState;
use crate::uploads::{handlers as uploads, MAX_UPLOAD_BYTES};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::health_handler))
        .route("/login", post(auth::handle_login))
        .route("/protected", get(auth::handle_protected))
        .route("/coverletter/upload", post(uploads::handle_upload))
        .route("/coverletter/file", post(uploads::handle_file))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}
