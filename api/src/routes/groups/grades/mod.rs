use axum::{Router, middleware::from_fn_with_state, routing::get};
use util::state::AppState;

mod get;

pub use get::get_group_grades;

use crate::auth::guards::require_group_member;

pub fn grades_routes(app_state: AppState) -> Router<AppState> {
    Router::new().route(
        "/",
        get(get_group_grades).route_layer(from_fn_with_state(app_state, require_group_member)),
    )
}
