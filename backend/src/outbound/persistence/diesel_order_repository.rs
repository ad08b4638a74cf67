//! PostgreSQL-backed `OrderRepository` implementation using Diesel ORM.
//!
//! Listing predicates are translated into a boxed Diesel query with bound
//! parameters. Relations are fetched with two follow-up queries per batch of
//! orders: the owners' user projections and the products behind each order's
//! items.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use diesel::dsl::sql;
use diesel::expression::SqlLiteral;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::sql_types::{Bool, Text};
use diesel_async::AsyncConnection as _;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{OrderRepository, OrderRepositoryError};
use crate::domain::{
    Order, OrderDetails, OrderId, OrderItemProduct, OrderListQuery, OrderPatch, OrderPredicate,
    OrderStatus, Product, SearchColumn, UserId, UserSummary,
};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{OrderChangeset, OrderRow, ProductRow, UserSummaryRow};
use super::pool::{DbPool, PoolError};
use super::schema::{order_items, orders, products, users};

type OrderCondition = Box<dyn BoxableExpression<orders::table, Pg, SqlType = Bool>>;

/// Diesel-backed implementation of the order repository port.
#[derive(Clone)]
pub struct DieselOrderRepository {
    pool: DbPool,
}

impl DieselOrderRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> OrderRepositoryError {
    map_basic_pool_error(error, OrderRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> OrderRepositoryError {
    map_basic_diesel_error(
        error,
        OrderRepositoryError::query,
        OrderRepositoryError::connection,
    )
}

// ---------------------------------------------------------------------------
// Query construction
// ---------------------------------------------------------------------------

/// `CAST(column AS TEXT)` for a searchable column.
fn column_text(column: SearchColumn) -> SqlLiteral<Text> {
    match column {
        SearchColumn::Price => sql::<Text>("CAST(orders.price AS TEXT)"),
        SearchColumn::CreatedAt => sql::<Text>("CAST(orders.created_at AS TEXT)"),
    }
}

/// `col1 ILIKE $p OR col2 ILIKE $p ...`; an empty column list matches nothing.
fn text_condition(columns: &[SearchColumn], pattern: &str) -> OrderCondition {
    columns
        .iter()
        .map(|column| -> OrderCondition { Box::new(column_text(*column).ilike(pattern.to_owned())) })
        .reduce(|acc, next| Box::new(acc.or(next)))
        .unwrap_or_else(|| Box::new(sql::<Bool>("FALSE")))
}

fn predicate_condition(predicate: &OrderPredicate) -> OrderCondition {
    match predicate {
        OrderPredicate::OwnedBy(owner) => Box::new(orders::user_id.eq(*owner.as_uuid())),
        OrderPredicate::StatusIn(statuses) => {
            let statuses: Vec<&'static str> = statuses.iter().map(|s| s.as_str()).collect();
            Box::new(orders::status.eq_any(statuses))
        }
        OrderPredicate::TextMatches { columns, pattern } => text_condition(columns, pattern),
    }
}

/// Page of orders matching every predicate, newest first.
fn listing_query(list: &OrderListQuery) -> orders::BoxedQuery<'static, Pg> {
    list.predicates.iter().fold(
        orders::table
            .order((orders::created_at.desc(), orders::id.desc()))
            .limit(list.limit)
            .offset(list.offset)
            .into_boxed(),
        |query, predicate| query.filter(predicate_condition(predicate)),
    )
}

// ---------------------------------------------------------------------------
// Row-to-domain converters
// ---------------------------------------------------------------------------

// Stored text outside the domain's closed sets is reported the same way as
// any other undecodable column.
fn corrupt(error: impl std::error::Error + Send + Sync + 'static) -> diesel::result::Error {
    diesel::result::Error::DeserializationError(Box::new(error))
}

fn row_to_order(row: OrderRow) -> Result<Order, diesel::result::Error> {
    let status = row.status.parse::<OrderStatus>().map_err(corrupt)?;
    Ok(Order {
        id: OrderId::from_uuid(row.id),
        user_id: UserId::from_uuid(row.user_id),
        price: row.price,
        status,
        address: row.address,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

fn row_to_user(row: UserSummaryRow) -> Result<UserSummary, diesel::result::Error> {
    Ok(UserSummary {
        id: UserId::from_uuid(row.id),
        username: row.username,
        email: row.email,
        avatar_url: row.avatar_url,
        cover_url: row.cover_url,
        phone: row.phone,
        role: row.role.parse().map_err(corrupt)?,
    })
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            price: row.price,
            image_url: row.image_url,
            stock: row.stock,
            created_at: row.created_at,
        }
    }
}

/// Attach owners and item products to `rows`, preserving their order.
async fn load_details(
    conn: &mut AsyncPgConnection,
    rows: Vec<OrderRow>,
) -> Result<Vec<OrderDetails>, diesel::result::Error> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let order_ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
    let mut user_ids: Vec<Uuid> = rows.iter().map(|row| row.user_id).collect();
    user_ids.sort_unstable();
    user_ids.dedup();

    let mut owners: HashMap<Uuid, UserSummary> = HashMap::new();
    for row in users::table
        .filter(users::id.eq_any(user_ids))
        .select(UserSummaryRow::as_select())
        .load::<UserSummaryRow>(conn)
        .await?
    {
        owners.insert(row.id, row_to_user(row)?);
    }

    let mut items: HashMap<Uuid, Vec<OrderItemProduct>> = HashMap::new();
    let item_rows: Vec<(Uuid, ProductRow)> = order_items::table
        .inner_join(products::table)
        .filter(order_items::order_id.eq_any(order_ids))
        .order(order_items::id.asc())
        .select((order_items::order_id, ProductRow::as_select()))
        .load(conn)
        .await?;
    for (order_id, product) in item_rows {
        items.entry(order_id).or_default().push(OrderItemProduct {
            product: product.into(),
        });
    }

    rows.into_iter()
        .map(|row| {
            let user = owners.get(&row.user_id).cloned();
            let order_items = items.remove(&row.id).unwrap_or_default();
            Ok(OrderDetails {
                order: row_to_order(row)?,
                user,
                order_items,
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Trait implementation
// ---------------------------------------------------------------------------

#[async_trait]
impl OrderRepository for DieselOrderRepository {
    async fn list(
        &self,
        query: &OrderListQuery,
    ) -> Result<Vec<OrderDetails>, OrderRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<OrderRow> = listing_query(query)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        load_details(&mut conn, rows)
            .await
            .map_err(map_diesel_error)
    }

    async fn find_by_id(&self, id: OrderId) -> Result<Option<OrderDetails>, OrderRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<OrderRow> = orders::table
            .find(*id.as_uuid())
            .select(OrderRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        let Some(row) = row else {
            return Ok(None);
        };

        let mut details = load_details(&mut conn, vec![row])
            .await
            .map_err(map_diesel_error)?;
        Ok(details.pop())
    }

    async fn update(
        &self,
        id: OrderId,
        patch: &OrderPatch,
    ) -> Result<Option<Order>, OrderRepositoryError> {
        if patch.is_empty() {
            return Err(OrderRepositoryError::query("no columns to update"));
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let changeset = OrderChangeset {
            price: patch.price,
            status: patch.status.map(OrderStatus::as_str),
            address: patch.address.as_deref(),
            updated_at: Utc::now(),
        };
        let row: Option<OrderRow> = diesel::update(orders::table.find(*id.as_uuid()))
            .set(&changeset)
            .returning(OrderRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_order)
            .transpose()
            .map_err(map_diesel_error)
    }

    async fn delete_returning_snapshot(
        &self,
        id: OrderId,
    ) -> Result<Option<OrderDetails>, OrderRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let order_id = *id.as_uuid();

        conn.transaction(|conn| {
            async move {
                let mut locked: Vec<OrderRow> = orders::table
                    .find(order_id)
                    .select(OrderRow::as_select())
                    .for_update()
                    .load(conn)
                    .await?;
                let Some(row) = locked.pop() else {
                    return Ok(None);
                };

                let mut snapshot = load_details(conn, vec![row]).await?;
                // order_items rows go with the order via ON DELETE CASCADE.
                diesel::delete(orders::table.find(order_id))
                    .execute(conn)
                    .await?;
                Ok(snapshot.pop())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }
}

#[cfg(test)]
mod tests {
    //! Query shape and row conversion coverage; no database required.

    use chrono::TimeZone;
    use diesel::debug_query;
    use rstest::{fixture, rstest};

    use super::*;
    use crate::domain::{QueryFilter, build_list_query};
    use pagination::PageRequest;

    #[fixture]
    fn order_row() -> OrderRow {
        let at = Utc
            .with_ymd_and_hms(2024, 3, 1, 9, 30, 0)
            .single()
            .expect("valid time");
        OrderRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            price: 120,
            status: "shipping".to_owned(),
            address: "1 Main St".to_owned(),
            created_at: at,
            updated_at: at,
        }
    }

    fn sql_for(filter: &QueryFilter, requester: Option<&UserId>) -> String {
        let list = build_list_query(filter, requester).expect("valid query");
        debug_query::<Pg, _>(&listing_query(&list)).to_string()
    }

    #[rstest]
    fn unfiltered_listing_orders_newest_first_and_pages() {
        let filter = QueryFilter {
            query: None,
            page: PageRequest::new(5, 3),
        };
        let sql = sql_for(&filter, None);

        assert!(!sql.contains("WHERE"), "{sql}");
        assert!(
            sql.contains(r#"ORDER BY "orders"."created_at" DESC, "orders"."id" DESC"#),
            "{sql}"
        );
        assert!(sql.contains("LIMIT $1 OFFSET $2"), "{sql}");
        assert!(sql.contains("binds: [5, 10]"), "{sql}");
    }

    #[rstest]
    fn owner_listing_filters_user_and_statuses() {
        let owner = UserId::random();
        let sql = sql_for(&QueryFilter::default(), Some(&owner));

        assert!(sql.contains(r#""orders"."user_id" = $1"#), "{sql}");
        assert!(sql.contains(r#""orders"."status" = ANY($2)"#), "{sql}");
        assert!(sql.contains(r#"["shipping", "finished"]"#), "{sql}");
    }

    #[rstest]
    fn search_text_is_bound_not_interpolated() {
        let filter = QueryFilter {
            query: Some("12'; DROP TABLE orders; --".to_owned()),
            page: PageRequest::default(),
        };
        let sql = sql_for(&filter, None);

        assert!(sql.contains("CAST(orders.price AS TEXT) ILIKE $1"), "{sql}");
        assert!(sql.contains("CAST(orders.created_at AS TEXT) ILIKE $2"), "{sql}");
        assert!(sql.contains(" OR "), "{sql}");
        let (statement, binds) = sql.split_once("--").map_or((sql.as_str(), ""), |parts| parts);
        assert!(!statement.contains("DROP TABLE"), "{statement}");
        assert!(binds.contains("DROP TABLE"), "{sql}");
    }

    #[rstest]
    fn row_conversion_parses_status(order_row: OrderRow) {
        let order = row_to_order(order_row).expect("valid row");
        assert_eq!(order.status, OrderStatus::Shipping);
    }

    #[rstest]
    fn unknown_status_is_a_query_error(mut order_row: OrderRow) {
        order_row.status = "lost".to_owned();

        let error = map_diesel_error(row_to_order(order_row).expect_err("corrupt status"));
        assert!(matches!(error, OrderRepositoryError::Query { .. }));
    }

    #[rstest]
    fn pool_error_maps_to_connection_error() {
        let error = map_pool_error(PoolError::checkout("connection refused"));

        assert!(matches!(error, OrderRepositoryError::Connection { .. }));
        assert!(error.to_string().contains("connection refused"));
    }
}
