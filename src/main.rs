//! Campus Storefront - storefront form and document server

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use campus_storefront::config::AppConfig;
use campus_storefront::domain::aggregates::Product;
use campus_storefront::routes;
use campus_storefront::services::Storefront;
use campus_storefront::storage::{DocumentStore, SqliteStorage};
use campus_storefront::sync::{ApiClient, SyncBridge};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load()?;
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.log_level))?;
    tracing_subscriber::registry().with(filter).with(tracing_subscriber::fmt::layer()).init();
    tracing::debug!(?config, "configuration loaded");

    let backend = SqliteStorage::connect(&config.database_url, config.db_max_connections).await.context("failed to open storage")?;
    let sync = match &config.api_base {
        Some(base) => SyncBridge::new(ApiClient::new(base, config.api_timeout_secs)?),
        None => {
            tracing::info!("STOREFRONT_API_BASE not set, remote mirroring disabled");
            SyncBridge::disabled()
        }
    };
    let remote_sync = sync.is_enabled();
    let storefront = Arc::new(Storefront::open(DocumentStore::new(Arc::new(backend)), sync).await?);

    if let Some(path) = &config.product_seed {
        seed_catalog(&storefront, path).await?;
    }

    let app = routes::router(storefront);
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!(remote_sync, "🚀 Campus Storefront listening on {}", addr);
    axum::serve(tokio::net::TcpListener::bind(&addr).await?, app).with_graceful_shutdown(shutdown_signal()).await?;
    Ok(())
}

/// Loads seed products into an empty catalog. A missing or malformed file is logged and skipped.
async fn seed_catalog(storefront: &Storefront, path: &Path) -> Result<()> {
    let raw = match tokio::fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "product seed file unreadable, skipping");
            return Ok(());
        }
    };
    let products: Vec<Product> = match serde_json::from_str(&raw) {
        Ok(products) => products,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "product seed file is not a product array, skipping");
            return Ok(());
        }
    };
    let stored = storefront.seed_products(products).await?;
    if stored == 0 {
        tracing::debug!("catalog already populated, seed not applied");
    }
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => { signal.recv().await; }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
