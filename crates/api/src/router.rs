//! HTTP surface of the intake service.
//!
//! The server binary and the integration tests both go through
//! [`build_app_router`], so a form submission in a test crosses the same
//! CORS, request-ID, tracing and timeout handling as one in production.

use std::time::Duration;

use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderName, Method, StatusCode};
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::config::ServerConfig;
use crate::routes;
use crate::state::AppState;

/// Assemble the form, diagnostic and banner routes behind the service's
/// middleware.
///
/// Layers wrap outward, so a request meets them in this order: CORS, request
/// ID assignment, tracing, request ID echo, timeout, panic guard.
pub fn build_app_router(state: AppState, config: &ServerConfig) -> Router {
    let cors = build_cors_layer(config);
    let request_id_header = HeaderName::from_static("x-request-id");

    Router::new()
        // `/` lives outside the API prefix.
        .merge(routes::info::root_router())
        .nest("/api", routes::api_routes())
        // A panicking handler becomes a 500 instead of a dropped connection.
        .layer(CatchPanicLayer::new())
        // Slow upstream calls end in 408.
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(config.request_timeout_secs),
        ))
        // Echo x-request-id so callers can quote it when reporting a failed submission.
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Requests without an ID get a fresh UUID.
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(cors)
        .with_state(state)
}

/// CORS for the embedding sites.
///
/// `*` anywhere in `cors_origins` opens the API to every origin. Otherwise
/// only the listed origins are allowed, and an origin that is not a valid
/// header value stops startup.
pub fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(3600));

    if config.cors_origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let origins: Vec<_> = config
        .cors_origins
        .iter()
        .map(|o| {
            o.parse()
                .unwrap_or_else(|e| panic!("Invalid CORS origin '{o}': {e}"))
        })
        .collect();

    layer.allow_origin(origins)
}
