use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use util::state::AppState;

mod common;
mod get;
mod post;

pub use get::{export_session_records_csv, get_session, list_session_records, list_sessions};
pub use post::create_session;

use crate::auth::guards::require_faculty;

pub fn session_routes(app_state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/sessions",
            post(create_session)
                .route_layer(from_fn_with_state(app_state.clone(), require_faculty)),
        )
        .route(
            "/sessions",
            get(list_sessions).route_layer(from_fn_with_state(app_state.clone(), require_faculty)),
        )
        .route(
            "/sessions/{session_id}",
            get(get_session).route_layer(from_fn_with_state(app_state.clone(), require_faculty)),
        )
        .route(
            "/sessions/{session_id}/records",
            get(list_session_records)
                .route_layer(from_fn_with_state(app_state.clone(), require_faculty)),
        )
        .route(
            "/sessions/{session_id}/records/export",
            get(export_session_records_csv)
                .route_layer(from_fn_with_state(app_state.clone(), require_faculty)),
        )
}
