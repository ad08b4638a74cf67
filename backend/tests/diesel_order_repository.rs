//! Integration tests for `DieselOrderRepository` against embedded PostgreSQL.
//!
//! Each test runs on its own database cloned from the migration template and
//! seeded with two users, two products, and three orders. The database
//! default time zone is moved off UTC so the text search over `created_at`
//! only matches when pooled sessions pin their own zone.

use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Text};
use orders_backend::domain::ports::OrderRepository;
use orders_backend::domain::{
    OrderId, OrderPatch, OrderStatus, QueryFilter, UserId, UserRole, build_list_query,
};
use orders_backend::outbound::persistence::{DbPool, DieselOrderRepository, PoolConfig};
use pagination::PageRequest;
use pg_embedded_setup_unpriv::TemporaryDatabase;
use rstest::{fixture, rstest};
use tokio::runtime::Runtime;

#[path = "support/pg_embed.rs"]
mod pg_embed;

mod support;

use pg_embed::shared_cluster;
use support::{handle_cluster_setup_failure, provision_template_database};

const ALICE: &str = "a1a1a1a1-0000-4000-8000-000000000001";
const BOB: &str = "b2b2b2b2-0000-4000-8000-000000000002";
const SHIPPING_ORDER: &str = "d0000000-0000-4000-8000-000000000001";
const PENDING_ORDER: &str = "d0000000-0000-4000-8000-000000000002";
const FINISHED_ORDER: &str = "d0000000-0000-4000-8000-000000000003";

const SEED_SQL: &str = r"
INSERT INTO users (id, username, email, password_hash, role) VALUES
    ('a1a1a1a1-0000-4000-8000-000000000001', 'alice', 'alice@example.com', 'x', 'user'),
    ('b2b2b2b2-0000-4000-8000-000000000002', 'bob', 'bob@example.com', 'x', 'admin');

INSERT INTO products (id, name, price, stock) VALUES
    ('c0000000-0000-4000-8000-000000000001', 'Lamp', 40, 5),
    ('c0000000-0000-4000-8000-000000000002', 'Desk', 80, 2);

INSERT INTO orders (id, user_id, price, status, address, created_at, updated_at) VALUES
    ('d0000000-0000-4000-8000-000000000001', 'a1a1a1a1-0000-4000-8000-000000000001',
     120, 'shipping', '1 Main St', '2024-03-01 09:30:00+00', '2024-03-01 09:30:00+00'),
    ('d0000000-0000-4000-8000-000000000002', 'a1a1a1a1-0000-4000-8000-000000000001',
     75, 'pending', '1 Main St', '2024-03-02 10:00:00+00', '2024-03-02 10:00:00+00'),
    ('d0000000-0000-4000-8000-000000000003', 'b2b2b2b2-0000-4000-8000-000000000002',
     1200, 'finished', '9 Dock Rd', '2024-03-03 08:00:00+00', '2024-03-03 08:00:00+00');

INSERT INTO order_items (id, order_id, product_id, quantity) VALUES
    ('e0000000-0000-4000-8000-000000000001', 'd0000000-0000-4000-8000-000000000001',
     'c0000000-0000-4000-8000-000000000001', 1),
    ('e0000000-0000-4000-8000-000000000002', 'd0000000-0000-4000-8000-000000000001',
     'c0000000-0000-4000-8000-000000000002', 2),
    ('e0000000-0000-4000-8000-000000000003', 'd0000000-0000-4000-8000-000000000003',
     'c0000000-0000-4000-8000-000000000002', 1);

DO $$
BEGIN
    EXECUTE format('ALTER DATABASE %I SET TIME ZONE %L', current_database(), 'Asia/Tokyo');
END
$$;
";

// -----------------------------------------------------------------------------
// Fixtures
// -----------------------------------------------------------------------------

fn order_id(id: &str) -> OrderId {
    OrderId::new(id).expect("fixture order id is valid")
}

fn user_id(id: &str) -> UserId {
    UserId::new(id).expect("fixture user id is valid")
}

struct OrdersDb {
    /// Tokio runtime reused for all async operations in this test.
    runtime: Runtime,
    pool: DbPool,
    repository: DieselOrderRepository,
    database_url: String,
    _database: TemporaryDatabase,
}

impl OrdersDb {
    fn block_on<F: std::future::Future>(&self, future: F) -> F::Output {
        assert!(
            tokio::runtime::Handle::try_current().is_err(),
            "do not call block_on from inside a Tokio runtime"
        );
        self.runtime.block_on(future)
    }

    fn listed_ids(&self, filter: &QueryFilter, requester: Option<&UserId>) -> Vec<OrderId> {
        let query = build_list_query(filter, requester).expect("valid listing query");
        self.block_on(self.repository.list(&query))
            .expect("list succeeds")
            .into_iter()
            .map(|details| details.order.id)
            .collect()
    }

    fn item_count(&self, order: OrderId) -> i64 {
        #[derive(QueryableByName)]
        struct ItemCount {
            #[diesel(sql_type = BigInt)]
            count: i64,
        }

        let mut conn = PgConnection::establish(&self.database_url).expect("connect");
        diesel::sql_query("SELECT COUNT(*) AS count FROM order_items WHERE order_id = $1")
            .bind::<diesel::sql_types::Uuid, _>(*order.as_uuid())
            .get_result::<ItemCount>(&mut conn)
            .expect("count order items")
            .count
    }
}

fn seed(database_url: &str) -> Result<(), String> {
    let mut conn = PgConnection::establish(database_url).map_err(|err| err.to_string())?;
    conn.batch_execute(SEED_SQL).map_err(|err| err.to_string())
}

fn setup_orders_db() -> Result<OrdersDb, String> {
    let cluster = shared_cluster()?;
    let database = provision_template_database(cluster).map_err(|err| err.to_string())?;
    let database_url = database.url().to_string();
    seed(&database_url)?;

    let runtime = Runtime::new().map_err(|err| err.to_string())?;
    let config = PoolConfig::new(&database_url)
        .with_max_size(2)
        .with_min_idle(Some(1));
    let pool = runtime
        .block_on(DbPool::new(config))
        .map_err(|err| err.to_string())?;

    Ok(OrdersDb {
        runtime,
        repository: DieselOrderRepository::new(pool.clone()),
        pool,
        database_url,
        _database: database,
    })
}

#[fixture]
fn orders_db() -> Option<OrdersDb> {
    match setup_orders_db() {
        Ok(db) => Some(db),
        Err(reason) => handle_cluster_setup_failure(reason),
    }
}

// -----------------------------------------------------------------------------
// Listing
// -----------------------------------------------------------------------------

#[rstest]
fn owner_listing_hides_pending_orders_and_loads_relations(orders_db: Option<OrdersDb>) {
    let Some(db) = orders_db else {
        eprintln!("SKIP-TEST-CLUSTER: owner_listing_hides_pending_orders_and_loads_relations skipped");
        return;
    };

    let query =
        build_list_query(&QueryFilter::default(), Some(&user_id(ALICE))).expect("owner query");
    let listed = db.block_on(db.repository.list(&query)).expect("list succeeds");

    assert_eq!(listed.len(), 1, "{listed:?}");
    let details = &listed[0];
    assert_eq!(details.order.id, order_id(SHIPPING_ORDER));
    assert_eq!(details.order.status, OrderStatus::Shipping);
    let owner = details.user.as_ref().expect("owner is loaded");
    assert_eq!(owner.username, "alice");
    assert_eq!(owner.role, UserRole::User);
    let products: Vec<&str> = details
        .order_items
        .iter()
        .map(|item| item.product.name.as_str())
        .collect();
    assert_eq!(products, ["Lamp", "Desk"]);
}

#[rstest]
#[case(PageRequest::new(10, 1), &[FINISHED_ORDER, PENDING_ORDER, SHIPPING_ORDER])]
#[case(PageRequest::new(1, 2), &[PENDING_ORDER])]
#[case(PageRequest::new(10, 2), &[])]
fn unscoped_listing_is_newest_first_and_paged(
    orders_db: Option<OrdersDb>,
    #[case] page: PageRequest,
    #[case] expected: &[&str],
) {
    let Some(db) = orders_db else {
        eprintln!("SKIP-TEST-CLUSTER: unscoped_listing_is_newest_first_and_paged skipped");
        return;
    };

    let filter = QueryFilter { query: None, page };
    let expected: Vec<OrderId> = expected.iter().map(|id| order_id(id)).collect();
    assert_eq!(db.listed_ids(&filter, None), expected);
}

#[rstest]
#[case("12", &[FINISHED_ORDER, SHIPPING_ORDER])]
#[case("2024-03-01 09:30:00+00", &[SHIPPING_ORDER])]
#[case("10:00:00+00", &[PENDING_ORDER])]
#[case("+09", &[])]
#[case(r"1\%", &[])]
fn search_matches_price_and_utc_created_at_text(
    orders_db: Option<OrdersDb>,
    #[case] text: &str,
    #[case] expected: &[&str],
) {
    let Some(db) = orders_db else {
        eprintln!("SKIP-TEST-CLUSTER: search_matches_price_and_utc_created_at_text skipped");
        return;
    };

    let filter = QueryFilter {
        query: Some(text.to_owned()),
        page: PageRequest::default(),
    };
    let expected: Vec<OrderId> = expected.iter().map(|id| order_id(id)).collect();
    assert_eq!(db.listed_ids(&filter, None), expected);
}

#[rstest]
fn pooled_sessions_run_in_utc(orders_db: Option<OrdersDb>) {
    let Some(db) = orders_db else {
        eprintln!("SKIP-TEST-CLUSTER: pooled_sessions_run_in_utc skipped");
        return;
    };

    #[derive(QueryableByName)]
    struct SessionZone {
        #[diesel(sql_type = Text)]
        zone: String,
    }

    let zone: SessionZone = db.block_on(async {
        let mut conn = db.pool.get().await.expect("checkout");
        diesel_async::RunQueryDsl::get_result(
            diesel::sql_query("SELECT current_setting('TimeZone') AS zone"),
            &mut conn,
        )
        .await
        .expect("read session zone")
    });
    assert_eq!(zone.zone, "UTC");
}

// -----------------------------------------------------------------------------
// Single-order operations
// -----------------------------------------------------------------------------

#[rstest]
fn find_by_id_loads_owner_and_items(orders_db: Option<OrdersDb>) {
    let Some(db) = orders_db else {
        eprintln!("SKIP-TEST-CLUSTER: find_by_id_loads_owner_and_items skipped");
        return;
    };

    let details = db
        .block_on(db.repository.find_by_id(order_id(FINISHED_ORDER)))
        .expect("lookup succeeds")
        .expect("order exists");
    assert_eq!(details.order.price, 1200);
    assert_eq!(details.order.user_id, user_id(BOB));
    let owner = details.user.expect("owner is loaded");
    assert_eq!(owner.email, "bob@example.com");
    assert_eq!(owner.role, UserRole::Admin);
    assert_eq!(details.order_items.len(), 1);
    assert_eq!(details.order_items[0].product.name, "Desk");

    let missing = db
        .block_on(db.repository.find_by_id(OrderId::random()))
        .expect("lookup succeeds");
    assert!(missing.is_none());
}

#[rstest]
fn update_returns_merged_row_and_none_for_missing_order(orders_db: Option<OrdersDb>) {
    let Some(db) = orders_db else {
        eprintln!("SKIP-TEST-CLUSTER: update_returns_merged_row_and_none_for_missing_order skipped");
        return;
    };

    let patch = OrderPatch {
        status: Some(OrderStatus::Finished),
        address: Some("2 High St".to_owned()),
        ..OrderPatch::default()
    };

    let missing = db
        .block_on(db.repository.update(OrderId::random(), &patch))
        .expect("update succeeds");
    assert!(missing.is_none(), "no row should be affected");

    let updated = db
        .block_on(db.repository.update(order_id(SHIPPING_ORDER), &patch))
        .expect("update succeeds")
        .expect("row is returned");
    assert_eq!(updated.id, order_id(SHIPPING_ORDER));
    assert_eq!(updated.price, 120, "untouched columns keep their value");
    assert_eq!(updated.status, OrderStatus::Finished);
    assert_eq!(updated.address, "2 High St");
    assert!(updated.updated_at > updated.created_at);

    let reloaded = db
        .block_on(db.repository.find_by_id(order_id(SHIPPING_ORDER)))
        .expect("lookup succeeds")
        .expect("order exists");
    assert_eq!(reloaded.order, updated);
}

#[rstest]
fn delete_returns_snapshot_and_removes_order_with_items(orders_db: Option<OrdersDb>) {
    let Some(db) = orders_db else {
        eprintln!("SKIP-TEST-CLUSTER: delete_returns_snapshot_and_removes_order_with_items skipped");
        return;
    };
    let id = order_id(SHIPPING_ORDER);
    let before = db
        .block_on(db.repository.find_by_id(id))
        .expect("lookup succeeds")
        .expect("order exists");

    let snapshot = db
        .block_on(db.repository.delete_returning_snapshot(id))
        .expect("delete succeeds")
        .expect("snapshot is returned");

    assert_eq!(snapshot, before);
    assert!(
        db.block_on(db.repository.find_by_id(id))
            .expect("lookup succeeds")
            .is_none()
    );
    assert_eq!(db.item_count(id), 0);
    assert_eq!(
        db.listed_ids(&QueryFilter::default(), None),
        vec![order_id(FINISHED_ORDER), order_id(PENDING_ORDER)]
    );
}

#[rstest]
fn delete_of_missing_order_changes_nothing(orders_db: Option<OrdersDb>) {
    let Some(db) = orders_db else {
        eprintln!("SKIP-TEST-CLUSTER: delete_of_missing_order_changes_nothing skipped");
        return;
    };

    let snapshot = db
        .block_on(db.repository.delete_returning_snapshot(OrderId::random()))
        .expect("delete succeeds");

    assert!(snapshot.is_none());
    assert_eq!(db.listed_ids(&QueryFilter::default(), None).len(), 3);
    assert_eq!(db.item_count(order_id(SHIPPING_ORDER)), 2);
}
