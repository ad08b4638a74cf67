//! Domain primitives, aggregates, and services.
//!
//! Purpose: Define strongly typed domain entities used by the API and
//! persistence layers, and the services behind the driving ports. Keep types
//! immutable and document serialisation contracts (serde) in each type's
//! Rustdoc.
//!
//! Public surface:
//! - Error (alias to `error::Error`): API error response payload.
//! - Order, OrderDetails, OrderPatch: order row, read model, and partial update.
//! - OrdersService: implementation of the `OrdersQuery` and `OrdersCommand`
//!   ports.
//! - PasswordResetRequest: validated password-reset payload.

pub mod envelope;
pub mod error;
pub mod order;
pub mod order_query;
pub mod orders_service;
pub mod password_policy;
pub mod ports;
pub mod trace_id;
pub mod user;

pub use self::envelope::{
    EmptyData, Envelope, OrderData, OrderEnvelope, OrdersData, OrdersEnvelope, UpdatedOrderData,
    UpdatedOrderEnvelope,
};
pub use self::error::{Error, ErrorCode};
pub use self::order::{
    Order, OrderDetails, OrderId, OrderItemProduct, OrderPatch, OrderStatus, OrderValidationError,
    Product,
};
pub use self::order_query::{
    OrderListQuery, OrderPredicate, QueryFilter, SearchColumn, build_list_query, ilike,
};
pub use self::orders_service::OrdersService;
pub use self::password_policy::{
    Constraint, FieldError, PasswordResetRequest, StrengthRule, ValidationErrors,
};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{UserId, UserRole, UserSummary, UserValidationError};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use orders_backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::not_found("Order is not found"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
