//! Integration tests for the diagnostics and informational endpoints.

mod common;

use std::io::Write;

use axum::http::StatusCode;
use common::{body_json, get, SERVICE_EMAIL, SPREADSHEET_ID};
use intake_sheets::memory::OpenFailure;
use tempfile::NamedTempFile;

// ---------------------------------------------------------------------------
// Test: health reports a reachable spreadsheet as healthy
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_is_healthy_when_spreadsheet_is_reachable() {
    let app = common::build_test_app(common::ready(common::sheets()));
    let response = get(app, "/api/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["environment"], "test");
    assert!(json["version"].is_string());
    assert!(json["timestamp"].is_string());
    assert_eq!(json["config"]["google_sheets_status"], "connected");
    assert_eq!(json["config"]["spreadsheet_id_set"], true);
    assert_eq!(json["config"]["credential_source"], "inline_json");
    assert_eq!(json["config"]["service_account_email"], SERVICE_EMAIL);
    assert_eq!(json["config"]["secret_file_exists"], false);
}

// ---------------------------------------------------------------------------
// Test: health is degraded, not failing, without credentials
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_is_degraded_without_credentials() {
    let app = common::build_test_app(common::unavailable());
    let response = get(app, "/api/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["config"]["google_sheets_status"], "not_configured");
    assert!(json["config"]["credential_source"].is_null());
    assert!(json["config"]["service_account_email"].is_null());
}

// ---------------------------------------------------------------------------
// Test: health echoes a shortened upstream error
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_reports_truncated_error() {
    let sheets = common::sheets();
    sheets.fail_open(Some(OpenFailure::PermissionDenied));
    let app = common::build_test_app(common::ready(sheets));

    let response = get(app, "/api/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "degraded");
    let sheets_status = json["config"]["google_sheets_status"].as_str().unwrap();
    assert!(sheets_status.starts_with("error: Permission denied"));
    assert!(sheets_status.chars().count() <= "error: ".len() + 100);
}

// ---------------------------------------------------------------------------
// Test: config report inspects files without touching the network
// ---------------------------------------------------------------------------

#[tokio::test]
async fn config_reports_sources_and_cleaned_id() {
    let mut secret = NamedTempFile::new().unwrap();
    secret
        .write_all(
            serde_json::json!({
                "client_email": SERVICE_EMAIL,
                "private_key": include_str!("fixtures/service_account_key.pem"),
            })
            .to_string()
            .as_bytes(),
        )
        .unwrap();

    let mut config = common::test_config();
    config.google.secret_file_path = secret.path().to_path_buf();
    config.google.credentials_json = Some("{}".to_string());
    let app = common::build_test_app_with(config, common::unavailable());

    let response = get(app, "/api/config").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["secret_file"]["exists"], true);
    assert_eq!(json["secret_file"]["valid"], true);
    assert_eq!(json["secret_file"]["service_email"], SERVICE_EMAIL);
    assert_eq!(json["inline_credentials_set"], true);
    assert_eq!(json["local_credentials"]["exists"], false);
    assert_eq!(json["spreadsheet_id"], SPREADSHEET_ID);
    assert_eq!(json["port"], 0);
}

// ---------------------------------------------------------------------------
// Test: a key file whose private key cannot be parsed is reported invalid
// ---------------------------------------------------------------------------

#[tokio::test]
async fn config_flags_secret_file_with_unusable_key() {
    let mut secret = NamedTempFile::new().unwrap();
    secret
        .write_all(
            serde_json::json!({
                "client_email": SERVICE_EMAIL,
                "private_key": "garbage not a pem",
            })
            .to_string()
            .as_bytes(),
        )
        .unwrap();

    let mut config = common::test_config();
    config.google.secret_file_path = secret.path().to_path_buf();
    let app = common::build_test_app_with(config, common::unavailable());

    let response = get(app, "/api/config").await;

    let json = body_json(response).await;
    assert_eq!(json["secret_file"]["exists"], true);
    assert_eq!(json["secret_file"]["valid"], false);
    assert!(json["secret_file"]["service_email"].is_null());
}

// ---------------------------------------------------------------------------
// Test: connection test lists worksheets on success
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_connection_lists_worksheets() {
    let sheets = common::sheets();
    sheets.add_spreadsheet(SPREADSHEET_ID, "Website Forms", &["Bookings", "Contact"]);
    let app = common::build_test_app(common::ready(sheets));

    let response = get(app, "/api/test-connection").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["service_account"], SERVICE_EMAIL);
    assert_eq!(json["spreadsheet_title"], "Website Forms");
    assert_eq!(json["spreadsheet_id"], SPREADSHEET_ID);
    assert_eq!(json["sheets"], serde_json::json!(["Bookings", "Contact"]));
}

// ---------------------------------------------------------------------------
// Test: connection test status codes for each failure
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_connection_without_spreadsheet_id_is_400() {
    let mut config = common::test_config();
    config.google.spreadsheet_id = None;
    let app = common::build_test_app_with(config, common::ready(common::sheets()));

    let response = get(app, "/api/test-connection").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_connection_without_credentials_is_500() {
    let app = common::build_test_app(common::unavailable());

    let response = get(app, "/api/test-connection").await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["code"], "CONFIGURATION_MISSING");
    assert!(json["error"]
        .as_str()
        .unwrap()
        .starts_with("Google credentials not found"));
}

#[tokio::test]
async fn test_connection_classifies_failures() {
    for (failure, status) in [
        (OpenFailure::NotFound, StatusCode::NOT_FOUND),
        (OpenFailure::PermissionDenied, StatusCode::FORBIDDEN),
        (OpenFailure::ServiceDisabled, StatusCode::FORBIDDEN),
    ] {
        let sheets = common::sheets();
        sheets.fail_open(Some(failure));
        let app = common::build_test_app(common::ready(sheets));

        let response = get(app, "/api/test-connection").await;

        assert_eq!(response.status(), status, "failure: {failure:?}");
    }
}

// ---------------------------------------------------------------------------
// Test: informational endpoints
// ---------------------------------------------------------------------------

#[tokio::test]
async fn root_describes_the_service() {
    let app = common::build_test_app(common::unavailable());
    let response = get(app, "/").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["health"], "/api/health");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn test_endpoint_lists_routes() {
    let app = common::build_test_app(common::unavailable());
    let response = get(app, "/api/test").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["endpoints"]["booking"], "POST /api/booking");
}

#[tokio::test]
async fn debug_reports_presence_only() {
    let mut config = common::test_config();
    config.google.credentials_json = Some(r#"{"private_key":"do-not-print"}"#.to_string());
    let app = common::build_test_app_with(config, common::unavailable());

    let response = get(app, "/api/debug").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["credentials"]["inline_json_set"], true);
    assert_eq!(json["worker_threads"], 2);
    assert!(!json.to_string().contains("do-not-print"));
}

// ---------------------------------------------------------------------------
// Test: general HTTP behaviour
// ---------------------------------------------------------------------------

#[tokio::test]
async fn response_contains_x_request_id_header() {
    let app = common::build_test_app(common::unavailable());
    let response = get(app, "/api/health").await;

    let request_id = response.headers().get("x-request-id");
    assert!(
        request_id.is_some(),
        "Response must contain an x-request-id header"
    );
    let id_str = request_id.unwrap().to_str().unwrap();
    assert_eq!(id_str.len(), 36, "x-request-id should be a UUID string");
}

#[tokio::test]
async fn unknown_route_returns_404() {
    let app = common::build_test_app(common::unavailable());
    let response = get(app, "/this-route-does-not-exist").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
