pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::matching::handlers as matching;
use crate::screening::handlers as screening;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = DefaultBodyLimit::max(state.config.max_upload_bytes);

    Router::new()
        .route("/health", get(health::health_handler))
        // Stateless matching
        .route("/api/v1/jd/parse", post(matching::handle_parse_jd))
        .route("/api/v1/match", post(matching::handle_match))
        .route(
            "/api/v1/admin/similarity/reset",
            post(matching::handle_reset_similarity),
        )
        // Screening workflow (persisted)
        .route(
            "/api/v1/jds",
            get(screening::handle_list_jds).post(screening::handle_upload_jd),
        )
        .route("/api/v1/jds/:id", get(screening::handle_get_jd))
        .route(
            "/api/v1/evaluations",
            get(screening::handle_list_evaluations).post(screening::handle_evaluate),
        )
        .layer(body_limit)
        .with_state(state)
}
