//! Embedded schema migrations.
//!
//! The migration set under `backend/migrations` is compiled into the binary
//! and applied over a blocking `PgConnection`; call [`run_pending`] from a
//! blocking context such as `tokio::task::spawn_blocking`.

use diesel::{Connection, PgConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::info;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Errors raised while applying migrations.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    /// The database could not be reached.
    #[error("failed to connect for migrations: {0}")]
    Connect(#[from] diesel::ConnectionError),
    /// A migration failed to apply.
    #[error("failed to apply migrations: {message}")]
    Apply { message: String },
}

/// Apply every migration not yet recorded in `__diesel_schema_migrations`.
///
/// Returns the versions applied by this call.
///
/// # Errors
///
/// Returns [`MigrationError`] when the connection or any migration fails.
pub fn run_pending(database_url: &str) -> Result<Vec<String>, MigrationError> {
    let mut conn = PgConnection::establish(database_url)?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|err| MigrationError::Apply {
            message: err.to_string(),
        })?
        .into_iter()
        .map(|version| version.to_string())
        .collect::<Vec<_>>();
    info!(count = applied.len(), versions = ?applied, "database migrations applied");
    Ok(applied)
}
