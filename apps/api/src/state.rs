use std::sync::Arc;

use axum::extract::FromRef;

use crate::auth::TokenService;
use crate::uploads::UploadStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub tokens: Arc<TokenService>,
    pub uploads: Arc<UploadStore>,
}

impl AppState {
    pub fn new(tokens: TokenService, uploads: UploadStore) -> Self {
        Self {
            tokens: Arc::new(tokens),
            uploads: Arc::new(uploads),
        }
    }
}

impl FromRef<AppState> for Arc<TokenService> {
    fn from_ref(state: &AppState) -> Self {
        state.tokens.clone()
    }
}
