mod config;
mod db;
mod errors;
mod extraction;
mod matching;
mod models;
mod routes;
mod screening;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::{create_pool, run_migrations};
use crate::matching::similarity::SimilarityEngine;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Screener API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;
    run_migrations(&db).await?;

    // Scoring weights are caller configuration; mismatched sums are clamped, not rejected
    let weights = config.weights;
    if !weights.is_normalized() {
        warn!(
            hard = weights.hard,
            soft = weights.soft,
            "Scoring weights do not sum to 1; final scores will be clamped"
        );
    }

    // Initialize similarity engine and load the embedding model before taking traffic
    let similarity = Arc::new(SimilarityEngine::from_settings(
        config.embeddings_enabled,
        config.embedding_cache_dir.clone(),
    ));
    let engine = Arc::clone(&similarity);
    let backend = tokio::task::spawn_blocking(move || engine.warm_up()).await?;
    info!(backend = backend.as_str(), "Similarity engine ready");

    // Build app state
    let state = AppState {
        db,
        config: config.clone(),
        similarity,
        weights,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
