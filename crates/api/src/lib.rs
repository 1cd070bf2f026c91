//! HTTP API layer for ripple.
//!
//! - **Endpoints**: REST resources for accounts, profiles, posts, comments
//! - **Extractors**: bearer-token authentication
//! - **Middleware**: application state, auth resolution
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use middleware::AppState;
