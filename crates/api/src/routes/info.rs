use axum::routing::get;
use axum::Router;

use crate::handlers::info;
use crate::state::AppState;

/// Informational routes mounted under `/api`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/test", get(info::test))
        .route("/debug", get(info::debug))
}

/// Service banner at the root level (not under `/api`).
pub fn root_router() -> Router<AppState> {
    Router::new().route("/", get(info::index))
}
