use axum::routing::get;
use axum::Router;

use crate::handlers::diagnostics;
use crate::state::AppState;

/// Diagnostics routes mounted under `/api`.
///
/// ```text
/// GET /health           -> health
/// GET /config           -> config
/// GET /test-connection  -> test_connection
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(diagnostics::health))
        .route("/config", get(diagnostics::config))
        .route("/test-connection", get(diagnostics::test_connection))
}
