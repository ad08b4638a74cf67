//! Port abstraction for order persistence adapters and their errors.
//!
//! Reads return [`OrderDetails`]: the order row joined with its owner's
//! [`crate::domain::UserSummary`] projection and the products behind its
//! items. Updates return the bare row.

use async_trait::async_trait;

use crate::domain::{Order, OrderDetails, OrderId, OrderListQuery, OrderPatch};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by order repository adapters.
    pub enum OrderRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "order repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "order repository query failed: {message}",
    }
}

/// Storage operations over `orders` and the rows it relates to.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Orders matching every predicate of `query`, newest first, restricted
    /// to the query's page window.
    async fn list(&self, query: &OrderListQuery)
    -> Result<Vec<OrderDetails>, OrderRepositoryError>;

    /// Fetch one order with its relations.
    async fn find_by_id(&self, id: OrderId) -> Result<Option<OrderDetails>, OrderRepositoryError>;

    /// Merge `patch` into the stored row.
    ///
    /// Returns `None` when no row was affected.
    async fn update(
        &self,
        id: OrderId,
        patch: &OrderPatch,
    ) -> Result<Option<Order>, OrderRepositoryError>;

    /// Load the order with its relations and delete it in one transaction.
    ///
    /// Returns the snapshot taken before the delete, or `None` when the order
    /// does not exist (nothing is deleted then).
    async fn delete_returning_snapshot(
        &self,
        id: OrderId,
    ) -> Result<Option<OrderDetails>, OrderRepositoryError>;
}

/// Fixture implementation holding no orders.
///
/// Lookups come back empty and writes affect nothing. Use it where order
/// storage is not under test.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureOrderRepository;

#[async_trait]
impl OrderRepository for FixtureOrderRepository {
    async fn list(
        &self,
        _query: &OrderListQuery,
    ) -> Result<Vec<OrderDetails>, OrderRepositoryError> {
        Ok(Vec::new())
    }

    async fn find_by_id(
        &self,
        _id: OrderId,
    ) -> Result<Option<OrderDetails>, OrderRepositoryError> {
        Ok(None)
    }

    async fn update(
        &self,
        _id: OrderId,
        _patch: &OrderPatch,
    ) -> Result<Option<Order>, OrderRepositoryError> {
        Ok(None)
    }

    async fn delete_returning_snapshot(
        &self,
        _id: OrderId,
    ) -> Result<Option<OrderDetails>, OrderRepositoryError> {
        Ok(None)
    }
}
