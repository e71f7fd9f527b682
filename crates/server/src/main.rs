//! Aegis-rs server entry point.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use aegis_classifier::PerspectiveClient;
use aegis_common::Config;
use aegis_core::{GuildChannels, Platform, TriageCoordinator};
use aegis_gateway::{AppState, HttpPlatform, router};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "aegis=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting aegis-rs server...");

    // Load configuration
    let config = Config::load()?;
    info!(
        guilds = config.platform.guilds.len(),
        "Configuration loaded"
    );

    // Classifier collaborator
    let evaluator = Arc::new(PerspectiveClient::new(&config.classifier)?);

    // Chat-platform collaborator
    let platform: Arc<dyn Platform> = Arc::new(HttpPlatform::new(&config.platform)?);

    // Per-guild channel wiring, resolved once at startup
    let guilds: HashMap<u64, GuildChannels> = config
        .platform
        .guilds
        .iter()
        .map(|guild| (guild.guild_id, GuildChannels::from(guild)))
        .collect();

    let coordinator = TriageCoordinator::new(
        evaluator,
        platform,
        guilds,
        config.triage.clone(),
        config.platform.bot_user_id,
    );

    let app = router()
        .with_state(AppState::new(coordinator))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!(%addr, "Listening for platform events");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutdown complete");
    Ok(())
}
