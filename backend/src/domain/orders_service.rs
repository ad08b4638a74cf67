//! Order domain service.
//!
//! Implements the [`OrdersQuery`] and [`OrdersCommand`] driving ports over an
//! [`OrderRepository`], wrapping each success in an [`Envelope`] and mapping
//! storage failures into domain [`Error`]s.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::domain::ports::{OrderRepository, OrderRepositoryError, OrdersCommand, OrdersQuery};
use crate::domain::{
    Envelope, Error, OrderData, OrderEnvelope, OrderId, OrderPatch, OrdersData, OrdersEnvelope,
    QueryFilter, UpdatedOrderData, UpdatedOrderEnvelope, UserId, build_list_query,
};

const ORDERS_FOUND: &str = "Got the orders successfully";
const ORDER_FOUND: &str = "Got the order successfully";
const ORDER_UPDATED: &str = "Order updated successfully";
const ORDER_DELETED: &str = "Order deleted successfully";
const ORDER_NOT_FOUND: &str = "Order is not found";
const ORDER_MISSING_ON_DELETE: &str = "Order does not exist";
const ORDER_UPDATE_FAILED: &str = "Error happened during updating the order";

/// Order service implementing the driving ports.
#[derive(Clone)]
pub struct OrdersService<R> {
    repo: Arc<R>,
}

impl<R> OrdersService<R> {
    /// Create a new service over `repo`.
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }
}

impl<R> OrdersService<R>
where
    R: OrderRepository,
{
    fn map_repository_error(error: OrderRepositoryError) -> Error {
        match error {
            OrderRepositoryError::Connection { message } => {
                Error::service_unavailable(format!("order repository unavailable: {message}"))
            }
            OrderRepositoryError::Query { message } => {
                Error::internal(format!("order repository error: {message}"))
            }
        }
    }
}

#[async_trait]
impl<R> OrdersQuery for OrdersService<R>
where
    R: OrderRepository,
{
    async fn find_all(
        &self,
        filter: &QueryFilter,
        requester: Option<UserId>,
    ) -> Result<OrdersEnvelope, Error> {
        let query = build_list_query(filter, requester.as_ref())?;
        let orders = self
            .repo
            .list(&query)
            .await
            .map_err(Self::map_repository_error)?;
        Ok(Envelope::ok(ORDERS_FOUND, OrdersData { orders }))
    }

    async fn find_one(
        &self,
        id: OrderId,
        requester: Option<UserId>,
    ) -> Result<OrderEnvelope, Error> {
        let order = self
            .repo
            .find_by_id(id)
            .await
            .map_err(Self::map_repository_error)?
            .filter(|details| requester.is_none_or(|owner| details.order.user_id == owner))
            .ok_or_else(|| Error::not_found(ORDER_NOT_FOUND))?;
        Ok(Envelope::ok(ORDER_FOUND, OrderData { order }))
    }
}

#[async_trait]
impl<R> OrdersCommand for OrdersService<R>
where
    R: OrderRepository,
{
    async fn update(
        &self,
        id: OrderId,
        patch: &OrderPatch,
    ) -> Result<UpdatedOrderEnvelope, Error> {
        // Every write failure collapses into the same internal error.
        let failed = || Error::internal(ORDER_UPDATE_FAILED);
        if patch.is_empty() {
            warn!(order_id = %id, "order update rejected: empty patch");
            return Err(failed());
        }
        let order = match self.repo.update(id, patch).await {
            Ok(Some(order)) => order,
            Ok(None) => {
                warn!(order_id = %id, "order update affected no rows");
                return Err(failed());
            }
            Err(error) => {
                warn!(order_id = %id, %error, "order update failed");
                return Err(failed());
            }
        };
        Ok(Envelope::ok(ORDER_UPDATED, UpdatedOrderData { order }))
    }

    async fn remove(&self, id: OrderId) -> Result<OrderEnvelope, Error> {
        let order = self
            .repo
            .delete_returning_snapshot(id)
            .await
            .map_err(Self::map_repository_error)?
            .ok_or_else(|| Error::bad_request(ORDER_MISSING_ON_DELETE))?;
        Ok(Envelope::ok(ORDER_DELETED, OrderData { order }))
    }
}

#[cfg(test)]
#[path = "orders_service_tests.rs"]
mod tests;
