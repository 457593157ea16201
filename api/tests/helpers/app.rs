use api::routes::routes;
use axum::Router;
use db::test_utils::setup_test_db;
use util::{config::AppConfig, state::AppState};

/// Builds an app over a fresh in-memory database, returning the router and
/// the state so tests can seed and inspect rows directly.
pub async fn make_test_app() -> (Router, AppState) {
    AppConfig::set_jwt_secret("test-secret-key");

    let db = setup_test_db().await;
    let app_state = AppState::new(db);
    let app = Router::new().nest("/api", routes(app_state.clone()));
    (app, app_state)
}
