//! Order HTTP handlers.
//!
//! ```text
//! GET    /api/v1/orders
//! GET    /api/v1/users/{user_id}/orders
//! GET    /api/v1/orders/{order_id}
//! GET    /api/v1/users/{user_id}/orders/{order_id}
//! PATCH  /api/v1/orders/{order_id}
//! DELETE /api/v1/orders/{order_id}
//! ```
//!
//! The `/users/{user_id}` routes act on behalf of that user: listings only
//! show their shipping and finished orders, and other users' orders read as
//! missing.

use actix_web::{delete, get, patch, web};
use pagination::{DEFAULT_LIMIT, DEFAULT_PAGE, PageRequest};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{
    Envelope, Error, OrderData, OrderEnvelope, OrderPatch, OrdersData, OrdersEnvelope,
    QueryFilter, UpdatedOrderData, UpdatedOrderEnvelope, UserId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, parse_optional_i64, parse_order_id, parse_status, parse_user_id,
};

/// Listing query string.
///
/// `limit` and `page` arrive as text so malformed numbers are reported
/// through the usual error payload.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListOrdersParams {
    /// Case-insensitive text matched against price and creation time.
    pub query: Option<String>,
    /// Rows per page, default 10.
    #[param(value_type = Option<i64>, example = 10)]
    pub limit: Option<String>,
    /// 1-indexed page, default 1.
    #[param(value_type = Option<i64>, example = 1)]
    pub page: Option<String>,
}

impl ListOrdersParams {
    fn into_filter(self) -> Result<QueryFilter, Error> {
        let limit = parse_optional_i64(
            self.limit.as_deref(),
            FieldName::new("limit"),
            DEFAULT_LIMIT,
        )?;
        let page = parse_optional_i64(self.page.as_deref(), FieldName::new("page"), DEFAULT_PAGE)?;
        Ok(QueryFilter {
            query: self.query,
            page: PageRequest::new(limit, page),
        })
    }
}

/// Partial order update. Absent fields are left untouched.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct UpdateOrderRequestBody {
    #[schema(example = 150)]
    pub price: Option<i32>,
    /// One of `pending`, `shipping`, `finished`, `cancelled`.
    #[schema(example = "shipping")]
    pub status: Option<String>,
    #[schema(example = "221B Baker Street, London")]
    pub address: Option<String>,
}

impl TryFrom<UpdateOrderRequestBody> for OrderPatch {
    type Error = Error;

    fn try_from(body: UpdateOrderRequestBody) -> Result<Self, Self::Error> {
        let status = body
            .status
            .as_deref()
            .map(|status| parse_status(status, FieldName::new("status")))
            .transpose()?;
        Ok(Self {
            price: body.price,
            status,
            address: body.address,
        })
    }
}

async fn list(
    state: &HttpState,
    params: ListOrdersParams,
    requester: Option<UserId>,
) -> ApiResult<web::Json<OrdersEnvelope>> {
    let filter = params.into_filter()?;
    let envelope = state.orders_query.find_all(&filter, requester).await?;
    Ok(web::Json(envelope))
}

/// List every order, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/orders",
    params(ListOrdersParams),
    responses(
        (status = 200, description = "Orders page", body = Envelope<OrdersData>),
        (status = 400, description = "Invalid query", body = Error),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["orders"],
    operation_id = "listOrders"
)]
#[get("/orders")]
pub async fn list_orders(
    state: web::Data<HttpState>,
    params: web::Query<ListOrdersParams>,
) -> ApiResult<web::Json<OrdersEnvelope>> {
    list(&state, params.into_inner(), None).await
}

/// List the shipping and finished orders of one user.
#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}/orders",
    params(
        ("user_id" = uuid::Uuid, Path, description = "Owning user"),
        ListOrdersParams
    ),
    responses(
        (status = 200, description = "Orders page", body = Envelope<OrdersData>),
        (status = 400, description = "Invalid path or query", body = Error),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["orders"],
    operation_id = "listUserOrders"
)]
#[get("/users/{user_id}/orders")]
pub async fn list_user_orders(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    params: web::Query<ListOrdersParams>,
) -> ApiResult<web::Json<OrdersEnvelope>> {
    let user_id = parse_user_id(&path, FieldName::new("userId"))?;
    list(&state, params.into_inner(), Some(user_id)).await
}

/// Fetch any order by id.
#[utoipa::path(
    get,
    path = "/api/v1/orders/{order_id}",
    params(("order_id" = uuid::Uuid, Path, description = "Order identifier")),
    responses(
        (status = 200, description = "Order found", body = Envelope<OrderData>),
        (status = 400, description = "Invalid order id", body = Error),
        (status = 404, description = "Order is not found", body = Error),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["orders"],
    operation_id = "getOrder"
)]
#[get("/orders/{order_id}")]
pub async fn get_order(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<OrderEnvelope>> {
    let order_id = parse_order_id(&path, FieldName::new("orderId"))?;
    let envelope = state.orders_query.find_one(order_id, None).await?;
    Ok(web::Json(envelope))
}

/// Fetch an order owned by the given user.
///
/// Orders owned by anyone else answer exactly like missing ones.
#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}/orders/{order_id}",
    params(
        ("user_id" = uuid::Uuid, Path, description = "Owning user"),
        ("order_id" = uuid::Uuid, Path, description = "Order identifier")
    ),
    responses(
        (status = 200, description = "Order found", body = Envelope<OrderData>),
        (status = 400, description = "Invalid path", body = Error),
        (status = 404, description = "Order is not found", body = Error),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["orders"],
    operation_id = "getUserOrder"
)]
#[get("/users/{user_id}/orders/{order_id}")]
pub async fn get_user_order(
    state: web::Data<HttpState>,
    path: web::Path<(String, String)>,
) -> ApiResult<web::Json<OrderEnvelope>> {
    let (user_id, order_id) = path.into_inner();
    let user_id = parse_user_id(&user_id, FieldName::new("userId"))?;
    let order_id = parse_order_id(&order_id, FieldName::new("orderId"))?;
    let envelope = state.orders_query.find_one(order_id, Some(user_id)).await?;
    Ok(web::Json(envelope))
}

/// Apply a partial update and return the stored row.
#[utoipa::path(
    patch,
    path = "/api/v1/orders/{order_id}",
    params(("order_id" = uuid::Uuid, Path, description = "Order identifier")),
    request_body = UpdateOrderRequestBody,
    responses(
        (status = 200, description = "Order updated", body = Envelope<UpdatedOrderData>),
        (status = 400, description = "Invalid request", body = Error),
        (status = 500, description = "Update failed", body = Error)
    ),
    tags = ["orders"],
    operation_id = "updateOrder"
)]
#[patch("/orders/{order_id}")]
pub async fn update_order(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<UpdateOrderRequestBody>,
) -> ApiResult<web::Json<UpdatedOrderEnvelope>> {
    let order_id = parse_order_id(&path, FieldName::new("orderId"))?;
    let patch = OrderPatch::try_from(payload.into_inner())?;
    let envelope = state.orders_command.update(order_id, &patch).await?;
    Ok(web::Json(envelope))
}

/// Delete an order and return what it looked like beforehand.
#[utoipa::path(
    delete,
    path = "/api/v1/orders/{order_id}",
    params(("order_id" = uuid::Uuid, Path, description = "Order identifier")),
    responses(
        (status = 200, description = "Order deleted", body = Envelope<OrderData>),
        (status = 400, description = "Order does not exist", body = Error),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["orders"],
    operation_id = "deleteOrder"
)]
#[delete("/orders/{order_id}")]
pub async fn delete_order(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<OrderEnvelope>> {
    let order_id = parse_order_id(&path, FieldName::new("orderId"))?;
    let envelope = state.orders_command.remove(order_id).await?;
    Ok(web::Json(envelope))
}

#[cfg(test)]
#[path = "orders_tests.rs"]
mod tests;
