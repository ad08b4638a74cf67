//! Backend entry-point: loads settings, applies migrations, and serves the
//! order API.

use std::io;

use ortho_config::OrthoConfig as _;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use orders_backend::outbound::persistence::{DbPool, run_pending_migrations};
use orders_backend::server::{ServerSettings, create_server, http_state_for};

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

    let settings = ServerSettings::load().map_err(|e| io::Error::other(e.to_string()))?;
    let bind_addr = settings.bind_addr().map_err(io::Error::other)?;
    let pool_config = settings.pool_config().map_err(io::Error::other)?;

    if settings.run_migrations() {
        let url = pool_config.database_url().to_owned();
        let applied = tokio::task::spawn_blocking(move || run_pending_migrations(&url))
            .await
            .map_err(io::Error::other)?
            .map_err(io::Error::other)?;
        info!(count = applied.len(), "migrations up to date");
    }

    let pool = DbPool::new(pool_config)
        .await
        .map_err(io::Error::other)?;

    create_server(http_state_for(pool), bind_addr)?.await
}
