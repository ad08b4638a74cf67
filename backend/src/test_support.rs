//! Test utilities for the backend crate.
//!
//! Shared by unit tests (in `src/`) and integration tests (in `tests/`).
//! Compiled under `cfg(test)` or the `test-support` feature.

pub mod orders;

pub use orders::{InMemoryOrderRepository, OrderBuilder, sample_product, sample_user};
