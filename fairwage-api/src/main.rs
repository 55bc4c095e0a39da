//! fairwage-api - Fair wage prediction service
//!
//! Loads bootstrap config and rules, opens the benchmark database and
//! serves the prediction and assessment API.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::Parser;
use fairwage_common::config::{ensure_root_folder, resolve_root_folder, TomlConfig};
use fairwage_common::db::{active_model_version, count_benchmarks, import_benchmarks_json, init_database, SqliteBenchmarkStore};
use fairwage_common::{Rules, WagePredictor};
use fairwage_api::{build_router, AppState};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "fairwage-api")]
#[command(about = "Fair wage prediction and assessment service")]
#[command(version)]
struct Args {
    /// Bootstrap config file (defaults to <config dir>/fairwage/config.toml)
    #[arg(short, long, env = "FAIRWAGE_CONFIG")]
    config: Option<PathBuf>,

    /// Port to listen on (overrides the config file)
    #[arg(short, long, env = "FAIRWAGE_PORT")]
    port: Option<u16>,

    /// Root folder holding the database and rules file
    #[arg(short, long)]
    root_folder: Option<PathBuf>,

    /// Import benchmark rows from a JSON array before serving
    #[arg(long)]
    import_benchmarks: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let (config, config_source) =
        TomlConfig::load_or_default(args.config.as_deref()).context("Failed to load configuration")?;
    init_tracing(&config)?;

    info!("Starting FairWage API (fairwage-api) v{}", env!("CARGO_PKG_VERSION"));
    config_source.log();

    let root_folder = resolve_root_folder(args.root_folder.as_deref(), &config);
    ensure_root_folder(&root_folder)?;
    info!("Root folder: {}", root_folder.display());

    let db_path = config.database_path(&root_folder);
    let pool = init_database(&db_path).await.context("Failed to open benchmark database")?;

    if let Some(path) = &args.import_benchmarks {
        let summary = import_benchmarks_json(&pool, path)
            .await
            .with_context(|| format!("Failed to import benchmarks from {}", path.display()))?;
        info!("✓ Imported {} benchmarks ({} skipped)", summary.imported, summary.skipped);
    }

    let benchmark_count = count_benchmarks(&pool).await?;
    if benchmark_count == 0 {
        warn!("Benchmark table is empty; every prediction will use the global fallback");
    } else {
        info!("✓ {} benchmark rows available", benchmark_count);
    }

    let rules = match config.rules_path(&root_folder) {
        Some(path) => Rules::load(&path).context("Failed to load rules file")?,
        None => {
            info!("No rules file configured, using built-in tables");
            Rules::default()
        }
    };

    let model_type = rules.profile.model_type.clone();
    let mut predictor = WagePredictor::new(Arc::new(rules));
    if let Some(version) = active_model_version(&pool, &model_type).await? {
        info!("Active model version from database: {}", version);
        predictor = predictor.with_model_version(version);
    }
    info!("Model version: {}", predictor.model_version());

    let state = AppState::new(predictor, SqliteBenchmarkStore::new(pool), config.max_batch_size);
    let app = build_router(state);

    let port = args.port.unwrap_or(config.port);
    let addr = format!("{}:{}", config.host, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("fairwage-api listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Console logging always; a plain-text file copy when `logging.file` is set.
/// `RUST_LOG` takes precedence over `logging.level`.
fn init_tracing(config: &TomlConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .context("Invalid logging level")?;

    let file_layer = match &config.logging.file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(file_layer)
        .init();

    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to install terminate handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
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
