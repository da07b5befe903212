//! HTTP route definitions and handlers.
//!
//! Routes are grouped into authentication (login/logout/me), guarded views,
//! and health checks.

mod auth_routes;
mod health_routes;
mod view_routes;

use crate::state::AppState;
use axum::Router;

/// Creates the application router with all configured routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(auth_routes::routes())
        .merge(view_routes::routes(state.clone()))
        .merge(health_routes::routes())
        .with_state(state)
}
