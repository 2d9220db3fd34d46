//! Axum route handlers for the stateless matching API.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::matching::jd_parser::{parse_jd, JobRequirement};
use crate::matching::pipeline::{evaluate, Evaluation};
use crate::matching::scorer::ScoreWeights;
use crate::matching::similarity::SimilarityBackend;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ParseJdRequest {
    pub jd_text: String,
}

#[derive(Debug, Deserialize)]
pub struct MatchRequest {
    pub resume_text: String,
    pub jd_text: String,
    /// Overrides the configured default weights for this call only.
    pub weights: Option<ScoreWeights>,
}

#[derive(Debug, Serialize)]
pub struct SimilarityStatusResponse {
    pub backend: SimilarityBackend,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/jd/parse
///
/// Previews the structured requirements extracted from a JD. Sparse text is not an error.
pub async fn handle_parse_jd(Json(request): Json<ParseJdRequest>) -> Json<JobRequirement> {
    Json(parse_jd(&request.jd_text))
}

/// POST /api/v1/match
///
/// Scores résumé text against JD text without persisting anything.
pub async fn handle_match(
    State(state): State<AppState>,
    Json(request): Json<MatchRequest>,
) -> Result<Json<Evaluation>, AppError> {
    let weights = request.weights.unwrap_or(state.weights);
    let evaluation = run_pipeline(&state, request.resume_text, request.jd_text, weights).await?;
    Ok(Json(evaluation))
}

/// POST /api/v1/admin/similarity/reset
///
/// Drops the cached embedding model state and tries to load the model again, e.g. after
/// model files have been restored. Responds with the backend that will serve new calls.
pub async fn handle_reset_similarity(
    State(state): State<AppState>,
) -> Result<Json<SimilarityStatusResponse>, AppError> {
    let engine = state.similarity.clone();
    let backend = tokio::task::spawn_blocking(move || {
        engine.reset();
        engine.warm_up()
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("similarity reset task failed: {e}")))?;

    info!(backend = backend.as_str(), "Similarity engine reset by operator");
    Ok(Json(SimilarityStatusResponse { backend }))
}

/// Runs the pipeline on the blocking pool; embedding inference is CPU-bound.
pub async fn run_pipeline(
    state: &AppState,
    resume_text: String,
    jd_text: String,
    weights: ScoreWeights,
) -> Result<Evaluation, AppError> {
    let engine = state.similarity.clone();
    tokio::task::spawn_blocking(move || evaluate(&resume_text, &jd_text, &engine, &weights))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("evaluation task failed: {e}")))
}
