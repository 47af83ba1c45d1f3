//! pymk-rec - "People you may know" recommendation service
//!
//! Serves ranked follow suggestions over HTTP, computed on demand from the
//! social store.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use pymk_common::config::{database_path, load_toml_config, resolve_root_folder};
use pymk_common::db::init_database;
use pymk_rec::{build_router, AppState, SERVICE_NAME};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for pymk-rec
#[derive(Parser, Debug)]
#[command(name = "pymk-rec")]
#[command(about = "People-you-may-know recommendation service")]
#[command(version)]
struct Args {
    /// Root folder containing pymk.db
    #[arg(short, long)]
    root_folder: Option<PathBuf>,

    /// Address to bind (overrides config file)
    #[arg(long, env = "PYMK_HOST")]
    host: Option<String>,

    /// Port to listen on (overrides config file)
    #[arg(short, long, env = "PYMK_PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pymk_rec=info,pymk_common=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Log build identification immediately, before any database delays
    info!(
        "Starting {} v{} [{}] built {} ({})",
        SERVICE_NAME,
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();

    // Missing or malformed config file falls back to defaults
    let toml_config = load_toml_config();
    let mut service_config = toml_config.service.clone();
    if let Some(host) = args.host {
        service_config.host = host;
    }
    if let Some(port) = args.port {
        service_config.port = port;
    }

    let root_folder = resolve_root_folder(args.root_folder.as_deref(), &toml_config);
    let db_path = database_path(&root_folder);
    info!("Database path: {}", db_path.display());

    let pool = match init_database(&db_path).await {
        Ok(pool) => {
            info!("Connected to database");
            pool
        }
        Err(e) => {
            error!("Failed to open database: {}", e);
            return Err(e).context("Failed to initialize database");
        }
    };

    let addr: SocketAddr = format!("{}:{}", service_config.host, service_config.port)
        .parse()
        .context("Invalid listen address")?;

    info!(
        "Recommendation limits: default {}, max {}",
        service_config.default_limit, service_config.max_limit
    );

    let state = AppState::new(pool, service_config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("{} listening on http://{}", SERVICE_NAME, addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
