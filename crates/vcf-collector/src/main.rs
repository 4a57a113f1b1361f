//! VCF Collector - Entry point.

use anyhow::{Context, Result};
use contact_store::ContactStore;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use vcf_collector::{
    api::{create_router_with_rate_limit, with_static_files, AppState, RateLimitState},
    config::{Config, StorageBackend, StorageConfig},
};

#[tokio::main]
async fn main() {
    // Load configuration
    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {:#}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config.log.level);

    if let Err(e) = run(config).await {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run(config: Config) -> Result<()> {
    info!("Starting VCF Collector");

    // Nothing can proceed without storage, so a failure here is fatal.
    let store = open_store(&config.storage).await?;
    info!(backend = store.backend(), "Contact store ready");

    let state = AppState::new(store, config.export.password.clone());
    let rate_limit = RateLimitState::new(config.rate_limit.global_per_minute);

    let mut app = create_router_with_rate_limit(state, rate_limit);
    if config.server.static_dir.is_dir() {
        info!("Serving static files from {:?}", config.server.static_dir);
        app = with_static_files(app, &config.server.static_dir);
    } else {
        warn!(
            "Static directory {:?} not found, serving API only",
            config.server.static_dir
        );
    }

    let addr = config.server.socket_addr()?;

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("Server running at http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shutting down...");
    Ok(())
}

async fn open_store(storage: &StorageConfig) -> Result<ContactStore> {
    match storage.backend {
        StorageBackend::File => ContactStore::file(&storage.path)
            .await
            .with_context(|| format!("Failed to open contacts file {:?}", storage.path)),
        StorageBackend::Postgres => {
            ContactStore::postgres(&storage.database_url, storage.max_connections)
                .await
                .context("Database setup failed")
        }
        StorageBackend::Memory => {
            warn!("Using in-memory storage (contacts will be lost on restart)");
            Ok(ContactStore::memory())
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
