//! Showroom entry-point: loads settings, wires storage, and runs the server.

mod server;

use std::io;
use std::sync::Arc;

use actix_web::web;
use cap_std::ambient_authority;
use cap_std::fs::Dir;
use ortho_config::OrthoConfig;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use showroom::config::AppSettings;
use showroom::domain::CollectionStores;
use showroom::domain::ports::ProductRepository;
use showroom::inbound::http::health::HealthState;
use showroom::outbound::file_store::JsonFileMessageRepository;
use showroom::outbound::memory::InMemoryProductRepository;
use showroom::outbound::persistence::{
    DbPool, DieselProductRepository, PoolConfig, apply_migrations,
};

use server::{ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load().map_err(|e| {
        error!(error = %e, "failed to load settings");
        io::Error::other(e.to_string())
    })?;
    let config = build_server_config(&settings).await.inspect_err(|e| {
        error!(error = %e, "startup configuration failed");
    })?;

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config).inspect_err(|e| {
        error!(error = %e, "failed to bind listener");
    })?;
    server.await
}

async fn build_server_config(settings: &AppSettings) -> io::Result<ServerConfig> {
    let bind_addr = settings.bind_addr().map_err(io::Error::other)?;
    let allowed_origins = settings.allowed_origins().map_err(io::Error::other)?;
    let messages_dir = settings.messages_dir().map_err(io::Error::other)?;

    let products = build_product_repository(settings.database_url()).await?;
    let messages = JsonFileMessageRepository::open(&messages_dir, settings.messages_file())
        .map_err(io::Error::other)?;
    info!(dir = %messages_dir, file = settings.messages_file(), "message log ready");

    let public_path = settings.public_dir();
    let public_dir = Dir::open_ambient_dir(&public_path, ambient_authority()).map_err(|e| {
        io::Error::other(format!("public dir {}: {e}", public_path.display()))
    })?;

    let stores = CollectionStores {
        products,
        messages: Arc::new(messages),
    };
    Ok(ServerConfig::new(bind_addr, stores, public_dir)
        .with_allowed_origins(allowed_origins)
        .with_products_test_count(settings.products_test_count()))
}

async fn build_product_repository(
    database_url: Option<&str>,
) -> io::Result<Arc<dyn ProductRepository>> {
    let Some(database_url) = database_url else {
        warn!("no database configured; products are kept in memory");
        return Ok(Arc::new(InMemoryProductRepository::new()));
    };

    apply_migrations(database_url)
        .await
        .map_err(io::Error::other)?;
    let pool = DbPool::new(PoolConfig::new(database_url))
        .await
        .map_err(io::Error::other)?;
    info!("product catalogue backed by PostgreSQL");
    Ok(Arc::new(DieselProductRepository::new(pool)))
}
