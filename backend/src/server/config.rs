//! Server settings loaded via OrthoConfig.
//!
//! Values come from CLI flags, `ORDERS_*` environment variables, or a
//! configuration file, in the usual OrthoConfig precedence.

use std::net::SocketAddr;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::outbound::persistence::PoolConfig;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Settings controlling the HTTP listener and the database pool.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "ORDERS")]
pub struct ServerSettings {
    /// Socket address the HTTP server binds to.
    pub bind_addr: Option<String>,
    /// PostgreSQL connection URL.
    pub database_url: Option<String>,
    /// Upper bound on pooled connections.
    pub pool_max_size: Option<u32>,
    /// Apply pending migrations before serving. Unset means yes.
    pub run_migrations: Option<bool>,
}

/// Problems found while interpreting loaded settings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("database URL is not configured (set ORDERS_DATABASE_URL)")]
    MissingDatabaseUrl,
    #[error("invalid bind address {value}: {message}")]
    InvalidBindAddr { value: String, message: String },
}

impl ServerSettings {
    /// Return the configured bind address, falling back to `0.0.0.0:8080`.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidBindAddr`] when the value does not
    /// parse as a socket address.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let value = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        value
            .parse()
            .map_err(|err: std::net::AddrParseError| SettingsError::InvalidBindAddr {
                value: value.to_owned(),
                message: err.to_string(),
            })
    }

    /// Whether pending migrations run at start-up; defaults to `true`.
    pub fn run_migrations(&self) -> bool {
        self.run_migrations.unwrap_or(true)
    }

    /// Pool configuration derived from the database settings.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::MissingDatabaseUrl`] when no URL is set.
    pub fn pool_config(&self) -> Result<PoolConfig, SettingsError> {
        let url = self
            .database_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .ok_or(SettingsError::MissingDatabaseUrl)?;
        let config = PoolConfig::new(url);
        Ok(match self.pool_max_size {
            Some(max_size) => config.with_max_size(max_size),
            None => config,
        })
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for server settings parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 4] = [
        "ORDERS_BIND_ADDR",
        "ORDERS_DATABASE_URL",
        "ORDERS_POOL_MAX_SIZE",
        "ORDERS_RUN_MIGRATIONS",
    ];

    fn load_from_empty_args() -> ServerSettings {
        ServerSettings::load_from_iter([OsString::from("orders-backend")])
            .expect("config should load")
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = load_from_empty_args();
        assert!(settings.run_migrations());
        assert_eq!(
            settings.bind_addr(),
            Ok(SocketAddr::from(([0, 0, 0, 0], 8080)))
        );
        assert_eq!(
            settings.pool_config().map(|_| ()),
            Err(SettingsError::MissingDatabaseUrl)
        );
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("ORDERS_BIND_ADDR", Some("127.0.0.1:9000".to_owned())),
            (
                "ORDERS_DATABASE_URL",
                Some("postgres://orders@localhost/orders".to_owned()),
            ),
            ("ORDERS_POOL_MAX_SIZE", Some("4".to_owned())),
            ("ORDERS_RUN_MIGRATIONS", Some("false".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert!(!settings.run_migrations());
        assert_eq!(
            settings.bind_addr(),
            Ok(SocketAddr::from(([127, 0, 0, 1], 9000)))
        );
        let pool = settings.pool_config().expect("database url configured");
        assert_eq!(pool.database_url(), "postgres://orders@localhost/orders");
        assert_eq!(pool.max_size(), 4);
    }

    #[rstest]
    fn malformed_bind_address_is_reported() {
        let _guard = lock_env([
            ("ORDERS_BIND_ADDR", Some("localhost".to_owned())),
            ("ORDERS_DATABASE_URL", None::<String>),
            ("ORDERS_POOL_MAX_SIZE", None::<String>),
            ("ORDERS_RUN_MIGRATIONS", None::<String>),
        ]);

        let settings = load_from_empty_args();
        assert!(settings.run_migrations());
        assert!(matches!(
            settings.bind_addr(),
            Err(SettingsError::InvalidBindAddr { ref value, .. }) if value == "localhost"
        ));
    }
}
