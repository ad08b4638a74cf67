//! Template-cloned databases for integration tests.
//!
//! The first suite to ask creates a template database named after a hash of
//! `backend/migrations` and applies the embedded migrations to it. Every test
//! then gets its own clone, so schema setup runs once per migration set.

use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};
use std::time::Duration;

use orders_backend::domain::ports::OrderRepositoryError;
use orders_backend::outbound::persistence::run_pending_migrations;
use pg_embedded_setup_unpriv::test_support::hash_directory;
use pg_embedded_setup_unpriv::{ClusterHandle, TemporaryDatabase};
use uuid::Uuid;

static TEMPLATE_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

const TEMPLATE_NAME_PREFIX: &str = "orders_template";
const TEMPLATE_PROVISION_RETRIES: usize = 5;
const TEMPLATE_PROVISION_RETRY_DELAY: Duration = Duration::from_millis(500);

fn migrations_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("migrations")
}

fn template_database_name() -> Result<String, OrderRepositoryError> {
    let hash = hash_directory(migrations_dir())
        .map_err(|err| OrderRepositoryError::query(format!("hash migrations: {err}")))?;
    let short_hash = hash.get(..8).unwrap_or(&hash);
    Ok(format!("{TEMPLATE_NAME_PREFIX}_{short_hash}"))
}

/// Creates or reuses the template database with every migration applied.
fn ensure_template_database(cluster: &ClusterHandle) -> Result<String, OrderRepositoryError> {
    let template_name = template_database_name()?;
    let _lock = TEMPLATE_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|err| err.into_inner());

    let exists = cluster
        .database_exists(template_name.as_str())
        .map_err(|err| OrderRepositoryError::query(format!("template check: {err:?}")))?;

    if !exists {
        cluster
            .create_database(template_name.as_str())
            .map_err(|err| OrderRepositoryError::query(format!("create template: {err:?}")))?;

        let url = cluster.connection().database_url(&template_name);
        run_pending_migrations(&url)
            .map_err(|err| OrderRepositoryError::query(format!("migration: {err}")))?;
    }

    Ok(template_name)
}

fn provision_template_database_attempt(
    cluster: &ClusterHandle,
    attempt: usize,
) -> Result<TemporaryDatabase, OrderRepositoryError> {
    let template_name = ensure_template_database(cluster).map_err(|error| {
        OrderRepositoryError::query(format!(
            "template check: attempt {attempt}/{TEMPLATE_PROVISION_RETRIES}: {error}"
        ))
    })?;
    let db_name = format!("test_{}", Uuid::new_v4());
    cluster
        .temporary_database_from_template(db_name.as_str(), template_name.as_str())
        .map_err(|error| {
            OrderRepositoryError::query(format!(
                "create database from template: attempt {attempt}/{TEMPLATE_PROVISION_RETRIES}: {error:?}"
            ))
        })
}

/// Provisions a temporary database cloned from the migration template.
pub fn provision_template_database(
    cluster: &ClusterHandle,
) -> Result<TemporaryDatabase, OrderRepositoryError> {
    let mut last_error = None;
    for attempt in 1..=TEMPLATE_PROVISION_RETRIES {
        match provision_template_database_attempt(cluster, attempt) {
            Ok(database) => return Ok(database),
            Err(error) => last_error = Some(error),
        }
        if attempt < TEMPLATE_PROVISION_RETRIES {
            std::thread::sleep(TEMPLATE_PROVISION_RETRY_DELAY);
        }
    }

    Err(last_error.unwrap_or_else(|| {
        OrderRepositoryError::query("create database from template: exhausted retries")
    }))
}
