//! Thin Axum control/observability surface over an `Engine`.

pub mod error;
pub mod handlers;
pub mod state;

use axum::routing::{get, post};
use axum::Router;

pub use state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/sessions", post(handlers::create_session).get(handlers::list_sessions))
        .route("/sessions/:id", get(handlers::get_session))
        .route("/sessions/:id/stop", post(handlers::stop_session))
        .route("/sessions/:id/results", get(handlers::get_session_results))
        .route("/stats", get(handlers::get_stats))
        .route("/proxies/stats", get(handlers::get_proxy_stats))
        .route("/proxies/test", post(handlers::test_proxy))
        .with_state(state)
}
