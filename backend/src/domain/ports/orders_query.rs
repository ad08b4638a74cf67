//! Driving port for order reads.
//!
//! HTTP handlers use this port to list and fetch orders without importing
//! persistence concerns. Production backs it with
//! [`crate::domain::OrdersService`]; tests can substitute a mock.

use async_trait::async_trait;

use crate::domain::{Error, OrderEnvelope, OrderId, OrdersData, OrdersEnvelope, QueryFilter, UserId};

/// Domain use-case port for reading orders.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrdersQuery: Send + Sync {
    /// List orders matching `filter`.
    ///
    /// With a `requester`, only that user's shipping or finished orders are
    /// visible.
    async fn find_all(
        &self,
        filter: &QueryFilter,
        requester: Option<UserId>,
    ) -> Result<OrdersEnvelope, Error>;

    /// Fetch a single order.
    ///
    /// With a `requester`, an order owned by someone else is reported as
    /// missing.
    async fn find_one(
        &self,
        id: OrderId,
        requester: Option<UserId>,
    ) -> Result<OrderEnvelope, Error>;
}

/// Fixture query with an empty order book.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureOrdersQuery;

#[async_trait]
impl OrdersQuery for FixtureOrdersQuery {
    async fn find_all(
        &self,
        _filter: &QueryFilter,
        _requester: Option<UserId>,
    ) -> Result<OrdersEnvelope, Error> {
        Ok(OrdersEnvelope::ok(
            "Got the orders successfully",
            OrdersData { orders: Vec::new() },
        ))
    }

    async fn find_one(
        &self,
        _id: OrderId,
        _requester: Option<UserId>,
    ) -> Result<OrderEnvelope, Error> {
        Err(Error::not_found("Order is not found"))
    }
}
