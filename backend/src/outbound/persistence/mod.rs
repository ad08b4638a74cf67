//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of domain repository ports backed by PostgreSQL
//! through `diesel-async` connections pooled by `bb8`.
//!
//! - **Thin adapters**: repositories only translate between Diesel rows and
//!   domain types.
//! - **Internal models**: row structs (`models.rs`) and table definitions
//!   (`schema.rs`) never leave this module.
//! - **Strongly typed errors**: Diesel and pool failures map into the port's
//!   error enum.
//!
//! # Example
//!
//! ```ignore
//! use orders_backend::outbound::persistence::{DbPool, DieselOrderRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/orders")).await?;
//! let repo = DieselOrderRepository::new(pool);
//! ```

mod diesel_basic_error_mapping;
mod diesel_order_repository;
pub mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_order_repository::DieselOrderRepository;
pub use migrations::{MigrationError, run_pending as run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
