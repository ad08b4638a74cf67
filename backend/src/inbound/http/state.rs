//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{FixtureOrdersCommand, FixtureOrdersQuery, OrdersCommand, OrdersQuery};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub orders_query: Arc<dyn OrdersQuery>,
    pub orders_command: Arc<dyn OrdersCommand>,
}

impl HttpState {
    /// Construct state from the order read and write ports.
    ///
    /// A single [`crate::domain::OrdersService`] usually backs both.
    ///
    /// # Examples
    /// ```no_run
    /// use std::sync::Arc;
    ///
    /// use orders_backend::domain::OrdersService;
    /// use orders_backend::domain::ports::FixtureOrderRepository;
    /// use orders_backend::inbound::http::state::HttpState;
    ///
    /// let service = Arc::new(OrdersService::new(Arc::new(FixtureOrderRepository)));
    /// let state = HttpState::new(service.clone(), service);
    /// let _query = state.orders_query.clone();
    /// ```
    pub fn new(
        orders_query: Arc<dyn OrdersQuery>,
        orders_command: Arc<dyn OrdersCommand>,
    ) -> Self {
        Self {
            orders_query,
            orders_command,
        }
    }
}

impl Default for HttpState {
    /// State backed by fixture ports with an empty order book.
    fn default() -> Self {
        Self::new(Arc::new(FixtureOrdersQuery), Arc::new(FixtureOrdersCommand))
    }
}
