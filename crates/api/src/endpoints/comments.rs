//! Comment endpoints, including likes.

use axum::{
    Router,
    extract::{Path, State},
    routing::{get, post},
};
use ripple_common::{AppError, AppResult};
use ripple_core::Fan;
use ripple_db::entities::{comment, reaction::LikeTarget};
use serde::Serialize;

use crate::{
    extractors::{AuthUser, MaybeAuthUser},
    middleware::AppState,
    response::ApiResponse,
};

/// Comment response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: String,
    pub post_id: String,
    pub author_id: String,
    /// Author's profile username, or the email local part without one
    pub author_username: String,
    /// Title of the post the comment belongs to
    pub post_title: String,
    pub content: String,
    pub created_at: String,
    /// Live count, computed per read
    pub total_likes: u64,
    /// Whether the viewer liked this comment; false for anonymous viewers
    pub is_fan: bool,
}

/// Build a comment response with its like summary, author name and post title.
pub(crate) async fn comment_response(
    state: &AppState,
    viewer_id: Option<&str>,
    comment: comment::Model,
) -> AppResult<CommentResponse> {
    let summary = state
        .reaction_service
        .summary(viewer_id, LikeTarget::Comment(&comment.id))
        .await?;

    let author = state.user_service.get(&comment.author_id).await?;
    let author_username = match state.profile_service.get_by_user(&author.id).await {
        Ok(profile) => profile.username,
        Err(AppError::NotFound(_)) => author
            .email
            .split('@')
            .next()
            .unwrap_or(&author.email)
            .to_owned(),
        Err(e) => return Err(e),
    };
    let post = state.post_service.get(&comment.post_id).await?;

    Ok(CommentResponse {
        id: comment.id,
        post_id: comment.post_id,
        author_id: comment.author_id,
        author_username,
        post_title: post.title,
        content: comment.content,
        created_at: comment.created_at.to_rfc3339(),
        total_likes: summary.total_likes,
        is_fan: summary.is_fan,
    })
}

/// Get a comment.
async fn detail(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<CommentResponse>> {
    let comment = state.comment_service.get(&id).await?;
    let response = comment_response(&state, viewer.viewer_id(), comment).await?;
    Ok(ApiResponse::ok(response))
}

/// Delete a comment (author or staff).
async fn delete(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    state.comment_service.delete(&user, &id).await?;
    Ok(ApiResponse::ok(()))
}

/// Like a comment. Liking twice is a no-op.
async fn like(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    state
        .reaction_service
        .add_like(&user.id, LikeTarget::Comment(&id))
        .await?;
    Ok(ApiResponse::ok(()))
}

/// Remove a like from a comment. Unliking when not a fan is a no-op.
async fn unlike(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    state
        .reaction_service
        .remove_like(&user.id, LikeTarget::Comment(&id))
        .await?;
    Ok(ApiResponse::ok(()))
}

/// The users who liked a comment.
async fn fans(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<Vec<Fan>>> {
    let fans = state
        .reaction_service
        .get_fans(LikeTarget::Comment(&id))
        .await?;
    Ok(ApiResponse::ok(fans))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}", get(detail).delete(delete))
        .route("/{id}/like", post(like))
        .route("/{id}/unlike", post(unlike))
        .route("/{id}/fans", get(fans))
}
