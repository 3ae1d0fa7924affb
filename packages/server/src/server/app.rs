//! Application setup and router configuration.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::Extension,
    middleware,
    response::Redirect,
    routing::get,
    Router,
};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::domains::circuits::CIRCUIT_LIST_URL;
use crate::kernel::ServerDeps;
use crate::server::middleware::jwt_auth_middleware;
use crate::server::routes::{circuit_routes, health_handler};
use crate::server::static_files::serve_static;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub deps: Arc<ServerDeps>,
}

impl AppState {
    pub fn new(deps: ServerDeps) -> Self {
        Self {
            deps: Arc::new(deps),
        }
    }
}

/// Build the Axum application router
///
/// Every circuits page lives under `/circuits`; `/` forwards to the circuit
/// list.
pub fn build_app(deps: ServerDeps, request_timeout: Duration) -> Router {
    let state = AppState::new(deps);

    // Clone jwt_service for middleware closure
    let jwt_service = state.deps.jwt_service.clone();

    Router::new()
        .route("/", get(|| async { Redirect::permanent(CIRCUIT_LIST_URL) }))
        .nest("/circuits", circuit_routes())
        .route("/health", get(health_handler))
        .route("/static/*path", get(serve_static))
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(middleware::from_fn(move |req, next| {
            jwt_auth_middleware(jwt_service.clone(), req, next)
        }))
        .layer(Extension(state))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
}
