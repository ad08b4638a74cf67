//! Uniform success envelope returned by every order operation.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{Order, OrderDetails};

/// `{ success, message, data }` wrapper.
///
/// # Examples
/// ```
/// use orders_backend::domain::{Envelope, OrdersData};
///
/// let envelope = Envelope::ok("Got the orders successfully", OrdersData { orders: vec![] });
/// assert!(envelope.success);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Envelope<T> {
    pub success: bool,
    pub message: String,
    pub data: T,
}

impl<T> Envelope<T> {
    /// Successful envelope carrying `data`.
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
        }
    }
}

/// `data` payload of a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct OrdersData {
    pub orders: Vec<OrderDetails>,
}

/// `data` payload of a single-order read or delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct OrderData {
    pub order: OrderDetails,
}

/// `data` payload of an update: the bare post-update row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UpdatedOrderData {
    pub order: Order,
}

/// `data` payload for operations with nothing to return.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct EmptyData {}

/// Envelope for listings.
pub type OrdersEnvelope = Envelope<OrdersData>;
/// Envelope for single-order reads and deletes.
pub type OrderEnvelope = Envelope<OrderData>;
/// Envelope for updates.
pub type UpdatedOrderEnvelope = Envelope<UpdatedOrderData>;
