mod auth;
mod config;
mod errors;
mod routes;
mod state;
mod uploads;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::auth::TokenService;
use crate::config::Config;
use crate::routes::build_router;
use crate::state::AppState;
use crate::uploads::UploadStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on a missing signing secret)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={level},tower_http={level}",
                env!("CARGO_CRATE_NAME"),
                level = &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting ResumeService API v{}", env!("CARGO_PKG_VERSION"));

    let uploads = UploadStore::new(&config.uploads_dir).init().await?;

    let tokens = TokenService::new(&config.jwt_secret);
    let state = AppState::new(tokens, uploads);

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Server running on port {}", config.port);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
