use axum::routing::post;
use axum::Router;

use crate::handlers::forms;
use crate::state::AppState;

/// Form submission routes mounted under `/api`.
///
/// ```text
/// POST    /booking  -> submit_booking
/// OPTIONS /booking  -> preflight
/// POST    /contact  -> submit_contact
/// OPTIONS /contact  -> preflight
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/booking",
            post(forms::submit_booking).options(forms::preflight),
        )
        .route(
            "/contact",
            post(forms::submit_contact).options(forms::preflight),
        )
}
