//! API endpoints.

mod auth;
mod comments;
mod posts;
mod profiles;
mod users;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/users", users::router())
        .nest("/profiles", profiles::router())
        .nest("/posts", posts::router())
        .nest("/comments", comments::router())
}
