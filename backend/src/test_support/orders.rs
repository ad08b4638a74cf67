//! In-memory order storage and builders for order fixtures.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

use crate::domain::ports::{OrderRepository, OrderRepositoryError};
use crate::domain::{
    Order, OrderDetails, OrderId, OrderItemProduct, OrderListQuery, OrderPatch, OrderStatus,
    Product, UserId, UserRole, UserSummary,
};

/// [`OrderRepository`] over a vector, evaluating listing predicates with
/// [`OrderListQuery::matches`].
///
/// Listings are ordered by `created_at` then `id`, both descending.
#[derive(Debug, Default)]
pub struct InMemoryOrderRepository {
    orders: Mutex<Vec<OrderDetails>>,
    failure: Mutex<Option<OrderRepositoryError>>,
}

impl InMemoryOrderRepository {
    /// Empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository pre-loaded with `orders`.
    pub fn with_orders(orders: impl IntoIterator<Item = OrderDetails>) -> Self {
        Self {
            orders: Mutex::new(orders.into_iter().collect()),
            failure: Mutex::new(None),
        }
    }

    /// Make every subsequent call fail with `error`.
    pub fn fail_with(&self, error: OrderRepositoryError) {
        if let Ok(mut failure) = self.failure.lock() {
            *failure = Some(error);
        }
    }

    /// Copy of the stored order, if present.
    pub fn get(&self, id: OrderId) -> Option<OrderDetails> {
        self.orders
            .lock()
            .ok()?
            .iter()
            .find(|details| details.order.id == id)
            .cloned()
    }

    /// Number of stored orders.
    pub fn len(&self) -> usize {
        self.orders.lock().map(|orders| orders.len()).unwrap_or_default()
    }

    /// True when nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<OrderDetails>>, OrderRepositoryError> {
        if let Some(error) = self
            .failure
            .lock()
            .map_err(|_| OrderRepositoryError::query("failure mutex poisoned"))?
            .clone()
        {
            return Err(error);
        }
        self.orders
            .lock()
            .map_err(|_| OrderRepositoryError::query("order store mutex poisoned"))
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn list(
        &self,
        query: &OrderListQuery,
    ) -> Result<Vec<OrderDetails>, OrderRepositoryError> {
        let orders = self.lock()?;
        let mut matching: Vec<OrderDetails> = orders
            .iter()
            .filter(|details| query.matches(&details.order))
            .cloned()
            .collect();
        matching.sort_by(|a, b| {
            b.order
                .created_at
                .cmp(&a.order.created_at)
                .then_with(|| b.order.id.as_uuid().cmp(a.order.id.as_uuid()))
        });

        let offset = usize::try_from(query.offset)
            .map_err(|_| OrderRepositoryError::query("OFFSET must not be negative"))?;
        let limit = usize::try_from(query.limit)
            .map_err(|_| OrderRepositoryError::query("LIMIT must not be negative"))?;
        Ok(matching.into_iter().skip(offset).take(limit).collect())
    }

    async fn find_by_id(&self, id: OrderId) -> Result<Option<OrderDetails>, OrderRepositoryError> {
        let orders = self.lock()?;
        Ok(orders.iter().find(|details| details.order.id == id).cloned())
    }

    async fn update(
        &self,
        id: OrderId,
        patch: &OrderPatch,
    ) -> Result<Option<Order>, OrderRepositoryError> {
        if patch.is_empty() {
            return Err(OrderRepositoryError::query("no columns to update"));
        }
        let mut orders = self.lock()?;
        let Some(details) = orders.iter_mut().find(|details| details.order.id == id) else {
            return Ok(None);
        };
        patch.apply_to(&mut details.order);
        details.order.updated_at = Utc::now();
        Ok(Some(details.order.clone()))
    }

    async fn delete_returning_snapshot(
        &self,
        id: OrderId,
    ) -> Result<Option<OrderDetails>, OrderRepositoryError> {
        let mut orders = self.lock()?;
        let Some(index) = orders.iter().position(|details| details.order.id == id) else {
            return Ok(None);
        };
        Ok(Some(orders.remove(index)))
    }
}

/// Fixed point in time used as the default creation timestamp.
fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0)
        .single()
        .unwrap_or_default()
}

/// User projection with a deterministic handle derived from `id`.
pub fn sample_user(id: UserId) -> UserSummary {
    let handle = format!("user-{}", &id.to_string()[..8]);
    UserSummary {
        id,
        email: format!("{handle}@example.com"),
        username: handle,
        avatar_url: None,
        cover_url: None,
        phone: None,
        role: UserRole::User,
    }
}

/// Product row named `name` priced at `price`.
pub fn sample_product(name: &str, price: i32) -> Product {
    Product {
        id: Uuid::new_v4(),
        name: name.to_owned(),
        description: None,
        price,
        image_url: None,
        stock: 5,
        created_at: epoch(),
    }
}

/// Builder for [`OrderDetails`] fixtures.
///
/// # Examples
/// ```
/// use orders_backend::domain::{OrderStatus, UserId};
/// use orders_backend::test_support::OrderBuilder;
///
/// let details = OrderBuilder::new(UserId::random())
///     .status(OrderStatus::Shipping)
///     .price(120)
///     .build();
/// assert_eq!(details.order.price, 120);
/// assert!(details.user.is_some());
/// ```
#[derive(Debug, Clone)]
pub struct OrderBuilder {
    order: Order,
    user: Option<UserSummary>,
    items: Vec<OrderItemProduct>,
}

impl OrderBuilder {
    /// Pending order owned by `owner`, created at a fixed timestamp.
    pub fn new(owner: UserId) -> Self {
        let created_at = epoch();
        Self {
            order: Order {
                id: OrderId::random(),
                user_id: owner,
                price: 100,
                status: OrderStatus::Pending,
                address: "1 Main St".to_owned(),
                created_at,
                updated_at: created_at,
            },
            user: Some(sample_user(owner)),
            items: Vec::new(),
        }
    }

    pub fn id(mut self, id: OrderId) -> Self {
        self.order.id = id;
        self
    }

    pub fn price(mut self, price: i32) -> Self {
        self.order.price = price;
        self
    }

    pub fn status(mut self, status: OrderStatus) -> Self {
        self.order.status = status;
        self
    }

    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.order.address = address.into();
        self
    }

    /// Set both timestamps.
    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.order.created_at = created_at;
        self.order.updated_at = created_at;
        self
    }

    /// Drop the owner projection, as when the foreign key dangles.
    pub fn without_user(mut self) -> Self {
        self.user = None;
        self
    }

    pub fn item(mut self, product: Product) -> Self {
        self.items.push(OrderItemProduct { product });
        self
    }

    pub fn build(self) -> OrderDetails {
        OrderDetails {
            order: self.order,
            user: self.user,
            order_items: self.items,
        }
    }
}
