//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the migrations under `backend/migrations`
//! exactly. The `diesel print-schema` command can regenerate them from a
//! live database.

diesel::table! {
    /// Registered users. Only the columns projected alongside orders are
    /// declared; the password hash stays invisible to this service.
    users (id) {
        id -> Uuid,
        username -> Varchar,
        email -> Varchar,
        avatar_url -> Nullable<Varchar>,
        cover_url -> Nullable<Varchar>,
        phone -> Nullable<Varchar>,
        /// `user` or `admin`.
        role -> Varchar,
    }
}

diesel::table! {
    /// Purchasable products.
    products (id) {
        id -> Uuid,
        name -> Varchar,
        description -> Nullable<Text>,
        price -> Int4,
        image_url -> Nullable<Varchar>,
        stock -> Int4,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Customer orders.
    orders (id) {
        id -> Uuid,
        /// Owning user (FK to `users.id`).
        user_id -> Uuid,
        price -> Int4,
        /// `pending`, `shipping`, `finished`, or `cancelled`.
        status -> Varchar,
        address -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Order lines joining orders to products.
    order_items (id) {
        id -> Uuid,
        order_id -> Uuid,
        product_id -> Uuid,
        quantity -> Int4,
    }
}

diesel::joinable!(orders -> users (user_id));
diesel::joinable!(order_items -> orders (order_id));
diesel::joinable!(order_items -> products (product_id));

diesel::allow_tables_to_appear_in_same_query!(users, products, orders, order_items);
