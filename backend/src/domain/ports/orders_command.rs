//! Driving port for order mutations.

use async_trait::async_trait;

use crate::domain::{Error, OrderEnvelope, OrderId, OrderPatch, UpdatedOrderEnvelope};

/// Domain use-case port for changing and deleting orders.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrdersCommand: Send + Sync {
    /// Merge `patch` into the order and return the updated row.
    ///
    /// # Errors
    ///
    /// Any failure to write, including an unknown id or an empty patch, is
    /// reported as an internal error.
    async fn update(&self, id: OrderId, patch: &OrderPatch)
    -> Result<UpdatedOrderEnvelope, Error>;

    /// Delete the order and return what it looked like beforehand.
    ///
    /// # Errors
    ///
    /// A missing order is reported as a bad request.
    async fn remove(&self, id: OrderId) -> Result<OrderEnvelope, Error>;
}

/// Fixture command with an empty order book.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureOrdersCommand;

#[async_trait]
impl OrdersCommand for FixtureOrdersCommand {
    async fn update(
        &self,
        _id: OrderId,
        _patch: &OrderPatch,
    ) -> Result<UpdatedOrderEnvelope, Error> {
        Err(Error::internal("Error happened during updating the order"))
    }

    async fn remove(&self, _id: OrderId) -> Result<OrderEnvelope, Error> {
        Err(Error::bad_request("Order does not exist"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn fixture_rejects_every_mutation() {
        let command = FixtureOrdersCommand;
        let id = OrderId::random();

        let update = command
            .update(id, &OrderPatch::default())
            .await
            .expect_err("nothing to update");
        assert_eq!(update.code(), ErrorCode::InternalError);

        let remove = command.remove(id).await.expect_err("nothing to remove");
        assert_eq!(remove.code(), ErrorCode::BadRequest);
    }
}
