use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::matching::scorer::ScoreWeights;
use crate::matching::similarity::SimilarityEngine;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
    /// Process-wide similarity service. The embedding model inside loads once.
    pub similarity: Arc<SimilarityEngine>,
    /// Default weights for evaluations that do not supply their own.
    pub weights: ScoreWeights,
}
