//! Order aggregate and the shapes returned by order reads.
//!
//! An [`OrderDetails`] is the read model for every order operation: the
//! order's own columns, the owning user's [`UserSummary`], and the order's
//! items resolved to their products. Item join rows never surface their own
//! columns.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{UserId, UserSummary};

/// Validation errors raised by order primitives.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrderValidationError {
    /// The identifier was not a canonical UUID.
    #[error("order id must be a valid UUID")]
    InvalidId,
    /// Status text outside the known lifecycle.
    #[error("unknown order status: {0}")]
    UnknownStatus(String),
}

/// Order identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(Uuid);

impl OrderId {
    /// Validate and construct an [`OrderId`] from text.
    pub fn new(id: impl AsRef<str>) -> Result<Self, OrderValidationError> {
        let id = id.as_ref();
        if id.trim() != id {
            return Err(OrderValidationError::InvalidId);
        }
        Uuid::parse_str(id)
            .map(Self)
            .map_err(|_| OrderValidationError::InvalidId)
    }

    /// Wrap a UUID loaded from storage.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Generate a new random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Order lifecycle state, stored as lowercase text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Placed but not yet dispatched. Hidden from the owner's listing.
    Pending,
    /// Dispatched to the carrier.
    Shipping,
    /// Delivered.
    Finished,
    /// Cancelled before dispatch.
    Cancelled,
}

impl OrderStatus {
    /// Statuses an owner sees when listing their own orders.
    pub const OWNER_VISIBLE: [Self; 2] = [Self::Shipping, Self::Finished];

    /// Storage representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Shipping => "shipping",
            Self::Finished => "finished",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = OrderValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "shipping" => Ok(Self::Shipping),
            "finished" => Ok(Self::Finished),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(OrderValidationError::UnknownStatus(other.to_owned())),
        }
    }
}

/// A row of the `orders` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Order {
    #[schema(value_type = String, example = "9b2f1c3e-0d4a-4a55-8f0e-2f1b7b0c6d11")]
    pub id: OrderId,
    #[schema(value_type = String, example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub user_id: UserId,
    /// Total price in whole currency units.
    #[schema(example = 120)]
    pub price: i32,
    pub status: OrderStatus,
    #[schema(example = "221B Baker Street, London")]
    pub address: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A row of the `products` table, returned whole.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: Uuid,
    #[schema(example = "Espresso beans")]
    pub name: String,
    pub description: Option<String>,
    #[schema(example = 24)]
    pub price: i32,
    pub image_url: Option<String>,
    pub stock: i32,
    pub created_at: DateTime<Utc>,
}

/// An order item reduced to its product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct OrderItemProduct {
    pub product: Product,
}

/// Order read model: order columns with the owner and items attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct OrderDetails {
    #[serde(flatten)]
    pub order: Order,
    /// Owning user, absent only if the foreign key dangles.
    pub user: Option<UserSummary>,
    pub order_items: Vec<OrderItemProduct>,
}

/// Partial update applied to an order. `None` leaves the column untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderPatch {
    pub price: Option<i32>,
    pub status: Option<OrderStatus>,
    pub address: Option<String>,
}

impl OrderPatch {
    /// True when no column would change.
    pub fn is_empty(&self) -> bool {
        self.price.is_none() && self.status.is_none() && self.address.is_none()
    }

    /// Merge the patch into an existing order, leaving absent fields as-is.
    pub fn apply_to(&self, order: &mut Order) {
        if let Some(price) = self.price {
            order.price = price;
        }
        if let Some(status) = self.status {
            order.status = status;
        }
        if let Some(address) = &self.address {
            order.address.clone_from(address);
        }
    }
}
