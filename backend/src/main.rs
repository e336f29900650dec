//! Backend entry-point: loads settings, prepares storage, and serves the
//! REST endpoints.

mod server;

use actix_web::web;
use color_eyre::eyre::{WrapErr, eyre};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use karma_backend::inbound::http::health::HealthState;
use karma_backend::outbound::persistence::{DbPool, run_migrations};
use server::{AppSettings, ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load_from_iter(std::env::args_os())
        .map_err(|err| eyre!("failed to load settings: {err}"))?;
    let mut config = ServerConfig::try_from(settings).wrap_err("invalid settings")?;

    if let Some(pool_config) = config.pool_config() {
        run_migrations(pool_config.database_url())
            .await
            .wrap_err("failed to apply identity store migrations")?;
        let pool = DbPool::new(pool_config)
            .await
            .wrap_err("failed to build database pool")?;
        config = config.with_db_pool(pool);
    }

    let health_state = web::Data::new(HealthState::new());
    let bind_addr = config.bind_addr();
    let server = create_server(health_state.clone(), config)?;
    info!(%bind_addr, "karma backend listening");

    let result = server.await;
    health_state.mark_unhealthy();
    result.wrap_err("server terminated")
}
