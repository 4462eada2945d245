use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cinefind_core::{
    create_analytics_system, load_config_or_default, validate_config, AnalyticsSink,
    DisabledRemoteCatalog, KeyValueStore, MemoryStore, OmdbClient, RemoteCatalog, SqliteStore,
    StorageBackend, TmdbTrendingClient, TracingAnalyticsSink, TrendingSource,
};
use cinefind_server::api::create_router;
use cinefind_server::state::AppState;

/// Buffer size for the analytics event channel
const ANALYTICS_BUFFER_SIZE: usize = 1000;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config_path = std::env::var("CINEFIND_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    info!("Loading configuration from {:?}", config_path);
    let config = load_config_or_default(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;
    validate_config(&config).context("Configuration validation failed")?;
    info!("Configuration loaded successfully");

    let store: Arc<dyn KeyValueStore> = match config.storage.backend {
        StorageBackend::Sqlite => {
            info!("Storage path: {:?}", config.storage.path);
            Arc::new(
                SqliteStore::new(&config.storage.path)
                    .context("Failed to open key-value store")?,
            )
        }
        StorageBackend::Memory => {
            warn!("Using in-memory storage; cache, quota and history are lost on exit");
            Arc::new(MemoryStore::new())
        }
    };

    let remote: Arc<dyn RemoteCatalog> = match &config.omdb {
        Some(omdb_config) => {
            info!("Initializing OMDb client");
            Arc::new(OmdbClient::new(omdb_config.clone()).context("Failed to create OMDb client")?)
        }
        None => {
            warn!("OMDb not configured; searches are answered from the local cache only");
            Arc::new(DisabledRemoteCatalog)
        }
    };

    let trending_source: Option<Arc<dyn TrendingSource>> = config
        .tmdb
        .as_ref()
        .map(|tmdb_config| {
            info!("Initializing TMDB trending client");
            TmdbTrendingClient::new(tmdb_config.clone())
        })
        .transpose()
        .map_err(|e| error!("Failed to create TMDB client: {}", e))
        .ok()
        .flatten()
        .map(|client| Arc::new(client) as Arc<dyn TrendingSource>);

    let sink: Arc<dyn AnalyticsSink> = Arc::new(TracingAnalyticsSink);
    let (analytics_handle, analytics_writer) = create_analytics_system(sink, ANALYTICS_BUFFER_SIZE);
    let writer_handle = tokio::spawn(analytics_writer.run());

    let state = Arc::new(
        AppState::assemble(
            config.clone(),
            store,
            remote,
            trending_source,
            Some(analytics_handle.clone()),
        )
        .await,
    );

    // Trending keywords load in the background; the fallback list serves until then
    {
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            let origin = state.suggestions().refresh_trending().await;
            info!("Trending keywords ready ({:?})", origin);
        });
    }

    let app = create_router(state);

    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutting down...");

    // The router (and with it the orchestrator's handle clone) is gone; the
    // writer drains once the last handle is dropped.
    drop(analytics_handle);
    let _ = writer_handle.await;
    info!("Analytics writer stopped");

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
