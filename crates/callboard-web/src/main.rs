//! Web server for the callboard dashboard
#![forbid(unsafe_code)]

use callboard_core::{Config, init_logging};
use callboard_web::{AppState, build_app};
use std::net::{IpAddr, SocketAddr};
use tokio::net::TcpListener;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if it exists (for development convenience)
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("Note: .env file not loaded: {e}");
    }

    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("Failed to load config ({e}), using defaults");
        Config::default()
    });

    init_logging(&config.logging.level, &config.logging.format)?;

    let state = AppState::new(config.clone())?;
    info!(source = %state.source.describe(), "Calls backend configured");

    if config.webserver.load_on_start {
        let loader = state.clone();
        tokio::spawn(async move {
            if let Err(e) = loader.load().await {
                warn!(error = %e, "Initial load failed");
            }
        });
    }

    let app = build_app(state);

    let host: IpAddr = config.webserver.host.parse().map_err(|e| {
        format!("Invalid web server host '{}': {e}", config.webserver.host)
    })?;
    let addr = SocketAddr::new(host, config.webserver.port);

    let listener = TcpListener::bind(&addr).await?;
    info!("Starting callboard web server on http://{addr}");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Handle graceful shutdown signals
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C, shutting down gracefully...");
        },
        () = terminate => {
            info!("Received terminate signal, shutting down gracefully...");
        },
    }
}
