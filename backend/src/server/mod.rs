//! Server construction and middleware wiring.

mod config;

pub use config::{ServerSettings, SettingsError};

use std::sync::Arc;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use tracing::info;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

use crate::Trace;
use crate::domain::OrdersService;
use crate::inbound::http::configure_api;
use crate::inbound::http::state::HttpState;
use crate::outbound::persistence::{DbPool, DieselOrderRepository};

/// Build the application around `http_state`.
///
/// Every request runs inside the [`Trace`] middleware; all endpoints live
/// under `/api/v1`. Debug builds also serve Swagger UI at `/docs`.
pub fn build_app(
    http_state: web::Data<HttpState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let app = App::new()
        .app_data(http_state)
        .wrap(Trace)
        .service(web::scope("/api/v1").configure(configure_api));

    #[cfg(debug_assertions)]
    let app = app.service(
        SwaggerUi::new("/docs/{_:.*}").url("/api-docs/openapi.json", crate::ApiDoc::openapi()),
    );

    app
}

/// Wire the Diesel-backed order service into handler state.
pub fn http_state_for(pool: DbPool) -> HttpState {
    let service = Arc::new(OrdersService::new(Arc::new(DieselOrderRepository::new(
        pool,
    ))));
    HttpState::new(service.clone(), service)
}

/// Construct an Actix HTTP server bound to `bind_addr`.
///
/// # Returns
/// A spawned [`Server`] that must be awaited to drive the listener.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    http_state: HttpState,
    bind_addr: std::net::SocketAddr,
) -> std::io::Result<Server> {
    let http_state = web::Data::new(http_state);
    let server = HttpServer::new(move || build_app(http_state.clone()))
        .bind(bind_addr)?
        .run();

    info!(%bind_addr, "http server listening");
    Ok(server)
}
