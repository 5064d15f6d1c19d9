use std::net::SocketAddr;
use std::sync::Arc;

use certgen_core::generator::DesignGenerator;
use certgen_gemini::GeminiClient;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use certgen_api::config::ServerConfig;
use certgen_api::router::build_app_router;
use certgen_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "certgen_api=debug,certgen_core=debug,certgen_gemini=debug,tower_http=debug"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = %config.port,
        model = %config.gemini.model_name,
        "Loaded server configuration",
    );

    // --- Design generator ---
    let gemini = GeminiClient::new(config.gemini.clone()).expect("Failed to build Gemini client");
    let generator =
        DesignGenerator::new(Arc::new(gemini)).with_throttle(config.generation_throttle);

    // --- Router ---
    let app = build_app_router(AppState::new(config.clone(), generator), &config);

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

/// Wait for SIGINT (Ctrl-C) or, on Unix, SIGTERM.
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
