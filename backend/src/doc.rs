//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] gathers every `#[utoipa::path]` handler under
//! `crate::inbound::http`. Schemas referenced by those paths, including the
//! generic response envelopes, are collected automatically. The document is
//! exported via `cargo run --bin openapi-dump`.

use utoipa::OpenApi;

use crate::domain::{Error, ErrorCode, FieldError};

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Orders backend API",
        description = "Order administration, per-user order views, and password-reset validation."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::orders::list_orders,
        crate::inbound::http::orders::list_user_orders,
        crate::inbound::http::orders::get_order,
        crate::inbound::http::orders::get_user_order,
        crate::inbound::http::orders::update_order,
        crate::inbound::http::orders::delete_order,
        crate::inbound::http::auth::validate_password_reset,
    ),
    components(schemas(Error, ErrorCode, FieldError)),
    tags(
        (name = "orders", description = "Order listing, lookup, update and removal"),
        (name = "auth", description = "Password-reset payload checks")
    )
)]
pub struct ApiDoc;
