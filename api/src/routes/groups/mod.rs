//! Group-scoped routes: attendance session management and grades.

use axum::Router;
use util::state::AppState;

pub mod attendance;
pub mod grades;

use attendance::session_routes;
use grades::grades_routes;

pub fn group_routes(app_state: AppState) -> Router<AppState> {
    Router::new()
        .nest("/{group_id}/attendance", session_routes(app_state.clone()))
        .nest("/{group_id}/grades", grades_routes(app_state))
}
