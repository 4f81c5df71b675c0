pub mod diagnostics;
pub mod forms;
pub mod info;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /booking                                         POST, OPTIONS
/// /contact                                         POST, OPTIONS
///
/// /health                                          health check
/// /config                                          configuration report
/// /test-connection                                 live spreadsheet check
///
/// /test                                            endpoint listing
/// /debug                                           settings presence
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(forms::router())
        .merge(diagnostics::router())
        .merge(info::router())
}
