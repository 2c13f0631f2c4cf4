//! Backend entry-point: loads settings, prepares the market store and serves
//! the REST API.

mod server;

use std::sync::Arc;

use actix_web::web;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use market_backend::inbound::http::health::HealthState;
use market_backend::inbound::http::state::HttpState;
use market_backend::outbound::persistence::{
    DbPool, DieselMarketRepository, PoolConfig, run_migrations,
};
use server::{ServerConfig, ServerSettings, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = ServerSettings::load_from_iter(std::env::args_os())
        .map_err(|e| std::io::Error::other(format!("failed to load settings: {e}")))?;
    let bind_addr = settings
        .bind_addr()
        .map_err(|e| std::io::Error::other(format!("invalid bind address: {e}")))?;
    let database_url = settings.database_url.clone().ok_or_else(|| {
        std::io::Error::other("MARKETS_DATABASE_URL must be set to reach the market store")
    })?;

    if settings.run_migrations {
        run_migrations(&database_url)
            .await
            .map_err(|e| std::io::Error::other(format!("migrations failed: {e}")))?;
    }

    let pool = DbPool::new(
        PoolConfig::new(database_url)
            .with_max_size(settings.pool_max_size())
            .with_connection_timeout(settings.pool_timeout()),
    )
    .await
    .map_err(|e| std::io::Error::other(format!("failed to build pool: {e}")))?;

    let repository = Arc::new(DieselMarketRepository::new(pool));
    let http_state =
        HttpState::from_repository(repository).with_command_timeout(settings.command_timeout());
    let config = ServerConfig::new(bind_addr, http_state);
    #[cfg(feature = "metrics")]
    let config = config.with_metrics(Some(server::build_metrics()?));

    let health_state = web::Data::new(HealthState::new());
    info!(addr = %config.bind_addr(), "starting market API");
    let server = create_server(health_state.clone(), config)?;
    health_state.mark_ready();
    let result = server.await;
    health_state.mark_unhealthy();
    result
}
