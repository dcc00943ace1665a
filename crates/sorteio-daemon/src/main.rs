//! sorteio-daemon binary.
//!
//! Loads configuration, opens the `SQLite` store, and serves the drawing
//! engine over HTTP until SIGINT/SIGTERM.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use sorteio_core::{RaffleStore, SorteioConfig, SqliteRaffleStore};
use sorteio_daemon::{router, AppState};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// sorteio daemon - raffle drawing service
#[derive(Parser, Debug)]
#[command(name = "sorteio-daemon")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "sorteio.toml")]
    config: PathBuf,

    /// Override the database path
    #[arg(long)]
    db: Option<PathBuf>,

    /// Override the bind address
    #[arg(long)]
    bind: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = if args.config.exists() {
        SorteioConfig::from_file(&args.config)
            .with_context(|| format!("failed to load config from {}", args.config.display()))?
    } else {
        SorteioConfig::default()
    };
    if let Some(db) = args.db {
        config.database.path = db;
    }
    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log.filter.clone())),
        )
        .init();

    let store = SqliteRaffleStore::open(&config.database.path).with_context(|| {
        format!(
            "failed to open database at {}",
            config.database.path.display()
        )
    })?;
    let state = AppState::new(Arc::new(store) as Arc<dyn RaffleStore>);
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(config.server.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.server.bind))?;
    info!(
        bind = %config.server.bind,
        db = %config.database.path.display(),
        "sorteio daemon listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;
    info!("sorteio daemon stopped");
    Ok(())
}

async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(sigterm) => sigterm,
        Err(err) => {
            tracing::error!(error = %err, "failed to install SIGTERM handler");
            return std::future::pending::<()>().await;
        },
    };
    tokio::select! {
        _ = tokio::signal::ctrl_c() => info!("received SIGINT, shutting down"),
        _ = sigterm.recv() => info!("received SIGTERM, shutting down"),
    }
}
