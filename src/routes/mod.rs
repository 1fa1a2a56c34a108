pub mod auth;
pub mod posts;
pub mod users;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// The full application router with request tracing.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(auth::router())
        .merge(posts::router())
        .merge(users::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
