//! ydisk_web - minimal web front-end for a Yandex Disk account

use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use ydisk_web::api::{self, handlers::AppState};
use ydisk_web::config::{BackendConfig, Config};
use ydisk_web::session::SessionStore;
use ydisk_web::storage;

/// How often expired sessions are swept.
const SESSION_CLEANUP_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// ydisk_web - browse and manage files on Yandex Disk
#[derive(Parser, Debug)]
#[command(name = "ydisk_web")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<String>,

    /// Listen address (overrides config)
    #[arg(short, long, value_name = "ADDR")]
    listen: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = if let Some(ref path) = cli.config {
        Config::from_file(path)?
    } else {
        Config::load()
    };

    if let Some(ref addr) = cli.listen {
        config.listen_addr = addr.parse()?;
    }

    // Initialize tracing
    let log_level = if cli.verbose {
        "ydisk_web=trace,tower_http=trace".to_string()
    } else {
        config.log_level.clone()
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting ydisk_web");
    info!("  Listen address: {}", config.listen_addr);

    match &config.backend {
        BackendConfig::Yandex {
            api_base,
            overwrite_uploads,
            ..
        } => {
            info!("  Backend: Yandex Disk");
            info!("  API base: {}", api_base);
            info!("  Overwrite on upload: {}", overwrite_uploads);
        }
        BackendConfig::Filesystem { path } => {
            info!("  Backend: Filesystem");
            info!("  Data directory: {:?}", path);
            warn!("  Serving a local directory; set YDW_TOKEN to use Yandex Disk");
        }
    }
    info!(
        "  Max upload size: {} MB",
        config.max_upload_size / 1024 / 1024
    );

    let disk = storage::from_config(&config).await?;
    let sessions = Arc::new(SessionStore::new());

    let sweeper = sessions.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SESSION_CLEANUP_INTERVAL);
        loop {
            interval.tick().await;
            sweeper.cleanup_expired();
        }
    });

    let state = Arc::new(AppState { disk, sessions });
    let app = api::router(state, config.max_upload_size);

    // Start server with graceful shutdown
    let listener = TcpListener::bind(&config.listen_addr).await?;
    info!("ydisk_web listening on http://{}", config.listen_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Handle shutdown signals (SIGINT, SIGTERM)
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
        _ = ctrl_c => {
            warn!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            warn!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}
