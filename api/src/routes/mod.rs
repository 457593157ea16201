//! HTTP route entry point for `/api/...`.
//!
//! Route groups:
//! - `/health` → Health check endpoint (public)
//! - `/attendance` → Student check-in endpoint (authenticated users)
//! - `/groups` → Group-scoped attendance sessions and grades (authenticated
//!   users; per-group roles enforced by nested guards)

use crate::auth::guards::allow_authenticated;
use crate::routes::{attendance::check_in_routes, groups::group_routes, health::health_routes};
use axum::{Router, middleware::from_fn};
use util::state::AppState;

pub mod attendance;
pub mod groups;
pub mod health;

/// Builds the complete application router for all HTTP endpoints.
///
/// The returned router is fully stateful and ready to be nested under
/// `/api` by the server entry point.
pub fn routes(app_state: AppState) -> Router {
    Router::new()
        .nest("/health", health_routes())
        .nest(
            "/attendance",
            check_in_routes().route_layer(from_fn(allow_authenticated)),
        )
        .nest(
            "/groups",
            group_routes(app_state.clone()).route_layer(from_fn(allow_authenticated)),
        )
        .with_state(app_state)
}
