//! hymnal-server - favorites service
//!
//! Resolves its root folder, opens (or creates) the database inside it and
//! serves the favorites API until Ctrl+C or SIGTERM.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use hymnal_common::config::{RootFolderInitializer, RootFolderResolver, TomlConfig, DEFAULT_PORT};
use hymnal_common::db::init_database;
use hymnal_server::{build_router, db, AppState};
use tokio::signal;
use tracing::info;

/// Command-line arguments for hymnal-server
#[derive(Parser, Debug)]
#[command(name = "hymnal-server")]
#[command(about = "Hymnal favorites service")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "HYMNAL_PORT")]
    port: Option<u16>,

    /// Address to bind
    #[arg(long, default_value = "127.0.0.1", env = "HYMNAL_BIND")]
    bind: std::net::IpAddr,

    /// Root folder holding hymnal.db
    #[arg(short, long, env = "HYMNAL_ROOT_FOLDER")]
    root_folder: Option<PathBuf>,

    /// JSON file of hymns to import before serving
    #[arg(long)]
    import_hymns: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let toml_config = TomlConfig::load_or_default();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("{},tower_http=debug", toml_config.logging.level).into()
            }),
        )
        .init();

    // Build identification first, before any database work
    info!(
        "Starting hymnal-server v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let root_folder = RootFolderResolver::new("hymnal-server")
        .with_cli_arg(args.root_folder.clone())
        .with_toml(toml_config.clone())
        .resolve();

    let initializer = RootFolderInitializer::new(root_folder);
    initializer
        .ensure_directory_exists()
        .context("Failed to create root folder")?;

    let db_path = initializer.database_path();
    info!("Database path: {}", db_path.display());

    let pool = init_database(&db_path)
        .await
        .context("Failed to initialize database")?;

    if let Some(path) = &args.import_hymns {
        db::import_hymns(&pool, path)
            .await
            .with_context(|| format!("Failed to import hymns from {}", path.display()))?;
    }

    let app = build_router(AppState::new(pool));

    let port = args.port.or(toml_config.port).unwrap_or(DEFAULT_PORT);
    let addr = SocketAddr::new(args.bind, port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("hymnal-server listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
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
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received terminate signal, shutting down"),
    }
}
