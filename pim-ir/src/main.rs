//! pim-ir - Image Reconciliation Microservice
//!
//! **Module Identity:**
//! - Name: pim-ir (Image Reconciliation)
//! - Port: 5731
//!
//! Matches scanned product photo directories against the product catalog so
//! operators can attach images to products without hand-sorting folders.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pim_ir::AppState;

/// Command-line arguments for pim-ir
#[derive(Parser, Debug)]
#[command(name = "pim-ir")]
#[command(about = "Image Reconciliation microservice for PIM")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "5731", env = "PIM_IR_PORT")]
    port: u16,

    /// Root folder holding the service database
    #[arg(short, long)]
    root_folder: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pim_ir=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    info!("Starting pim-ir (Image Reconciliation) microservice");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    // Resolve root folder: CLI > env > config file > platform default
    let root_folder =
        pim_common::config::resolve_root_folder(args.root_folder.as_deref(), "PIM_ROOT_FOLDER")
            .context("Failed to resolve root folder")?;
    info!("Root folder: {}", root_folder.display());

    let db_path = pim_common::config::ensure_root_folder(&root_folder)
        .context("Failed to initialize root folder")?;
    info!("Database: {}", db_path.display());

    let db_pool = pim_ir::db::init_database_pool(&db_path).await?;
    info!("Database connection established");

    let state = AppState::new(db_pool);
    let app = pim_ir::build_router(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], args.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
