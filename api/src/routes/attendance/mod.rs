use axum::{Router, routing::post};
use util::state::AppState;

mod common;
mod post;

pub use common::CheckInResponse;
pub use post::check_in;

/// The token-based check-in endpoint. Authentication is layered on by the
/// caller; no group role is required here, the scanned token is the
/// capability.
pub fn check_in_routes() -> Router<AppState> {
    Router::new().route("/check-in", post(check_in))
}
