//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{orders, products, users};

/// Row struct for reading from the orders table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct OrderRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub price: i32,
    pub status: String,
    pub address: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Projection of the users table returned with an order.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserSummaryRow {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub avatar_url: Option<String>,
    pub cover_url: Option<String>,
    pub phone: Option<String>,
    pub role: String,
}

/// Row struct for reading from the products table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = products)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ProductRow {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: i32,
    pub image_url: Option<String>,
    pub stock: i32,
    pub created_at: DateTime<Utc>,
}

/// Changeset struct for partial order updates. `None` columns are skipped.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = orders)]
pub(crate) struct OrderChangeset<'a> {
    pub price: Option<i32>,
    pub status: Option<&'a str>,
    pub address: Option<&'a str>,
    pub updated_at: DateTime<Utc>,
}
