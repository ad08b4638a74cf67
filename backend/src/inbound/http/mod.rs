//! HTTP inbound adapter exposing REST endpoints.

pub mod auth;
pub mod error;
pub mod orders;
pub mod state;
pub mod validation;

use actix_web::web;

pub use error::ApiResult;

/// Register every `/api/v1` endpoint on `cfg`.
///
/// Callers mount it inside the versioned scope and supply
/// [`state::HttpState`] as app data. Rejected JSON bodies are answered with
/// the domain error payload.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| error::json_payload_error(err).into()),
    )
    .service(orders::list_orders)
    .service(orders::list_user_orders)
    .service(orders::get_order)
    .service(orders::get_user_order)
    .service(orders::update_order)
    .service(orders::delete_order)
    .service(auth::validate_password_reset);
}
