//! API middleware.

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use ripple_core::{
    CommentService, FollowingService, PostService, ProfileService, ReactionService, UserService,
};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub profile_service: ProfileService,
    pub following_service: FollowingService,
    pub post_service: PostService,
    pub comment_service: CommentService,
    pub reaction_service: ReactionService,
}

/// Authentication middleware.
///
/// Resolves a `Bearer` token to its account and stores the user model in the
/// request extensions. Requests without a valid token pass through anonymous;
/// handlers that need authentication reject via [`crate::extractors::AuthUser`].
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(auth_header) = req.headers().get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
        && let Ok(user) = state.user_service.authenticate_by_token(token).await
    {
        req.extensions_mut().insert(user);
    }

    next.run(req).await
}
