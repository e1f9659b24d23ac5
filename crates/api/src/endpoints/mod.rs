//! HTTP endpoints.

mod admin;
mod auth;
mod home;
mod polls;

use axum::Router;

use crate::middleware::AppState;

/// Create the application router.
///
/// Every page path ends in a slash; `/polls/1` and `/polls/1/` are
/// different routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(home::router())
        .merge(auth::router())
        .merge(polls::router())
        .merge(admin::router())
}
