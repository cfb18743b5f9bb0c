//! API endpoints.

mod auth;
mod complains;
mod index;
mod profile;
mod votings;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(index::router())
        .merge(auth::router())
        .nest("/votings", votings::router())
        .nest("/complains", complains::router())
        .nest("/profile", profile::router())
}
