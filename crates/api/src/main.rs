use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use intake_api::config::{ServerConfig, WORKER_THREADS};
use intake_api::router::build_app_router;
use intake_api::state::{AppState, SheetsConnection};
use intake_sheets::credentials::inspect_file;

fn main() {
    dotenvy::dotenv().ok();

    init_tracing();

    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(WORKER_THREADS)
        .enable_all()
        .build()
        .expect("Failed to build Tokio runtime")
        .block_on(run());
}

/// Install the global subscriber. `LOG_FORMAT=json` switches to JSON lines.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "intake_api=debug,intake_sheets=debug,tower_http=debug".into());
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn run() {
    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = %config.port,
        environment = %config.environment,
        worker_threads = WORKER_THREADS,
        "Loaded server configuration"
    );
    report_google_config(&config);

    // --- Google Sheets ---
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .build()
        .expect("Failed to build HTTP client");
    let sheets = SheetsConnection::from_config(&config.google, http);
    if let SheetsConnection::Ready { origin, .. } = &sheets {
        tracing::info!(%origin, "Google Sheets client ready");
    }

    // --- App state ---
    let state = AppState {
        config: Arc::new(config.clone()),
        sheets,
    };

    // --- Router ---
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}

/// Log what the Google side of the configuration looks like. Never aborts:
/// diagnostics must stay reachable on a misconfigured deployment.
fn report_google_config(config: &ServerConfig) {
    let google = &config.google;

    let secret = inspect_file(&google.secret_file_path);
    if secret.valid {
        tracing::info!(
            path = %secret.path,
            service_account = secret.service_email.as_deref().unwrap_or_default(),
            "Secret credential file found"
        );
    } else if secret.exists {
        tracing::warn!(path = %secret.path, "Secret credential file is not a valid service-account key");
    } else {
        tracing::info!(path = %secret.path, "No secret credential file");
    }

    match google.spreadsheet_id() {
        Some(id) => {
            let preview: String = id.chars().take(10).collect();
            tracing::info!(spreadsheet_id = %format!("{preview}..."), "Spreadsheet configured");
        }
        None => tracing::warn!("GOOGLE_SPREADSHEET_ID not set; submissions will fail"),
    }
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
