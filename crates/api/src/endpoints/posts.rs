//! Post endpoints, including likes and nested comments.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use ripple_common::AppResult;
use ripple_core::{CreateCommentInput, CreatePostInput, Fan, ListPostsInput, UpdatePostInput};
use ripple_db::entities::{post, reaction::LikeTarget};
use serde::{Deserialize, Serialize};

use crate::{
    endpoints::comments::CommentResponse,
    extractors::{AuthUser, MaybeAuthUser},
    middleware::AppState,
    response::ApiResponse,
};

/// Post response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: String,
    pub author_id: String,
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
    pub created_at: String,
    pub updated_at: Option<String>,
    /// Live count, computed per read
    pub total_likes: u64,
    /// Whether the viewer liked this post; false for anonymous viewers
    pub is_fan: bool,
    pub comments_count: u64,
}

/// Build a post response with its like summary and comment count.
pub(crate) async fn post_response(
    state: &AppState,
    viewer_id: Option<&str>,
    post: post::Model,
) -> AppResult<PostResponse> {
    let summary = state
        .reaction_service
        .summary(viewer_id, LikeTarget::Post(&post.id))
        .await?;
    let comments_count = state.comment_service.count_for_post(&post.id).await?;

    Ok(PostResponse {
        id: post.id,
        author_id: post.author_id,
        title: post.title,
        content: post.content,
        image_url: post.image_url,
        created_at: post.created_at.to_rfc3339(),
        updated_at: post.updated_at.map(|t| t.to_rfc3339()),
        total_likes: summary.total_likes,
        is_fan: summary.is_fan,
        comments_count,
    })
}

/// List posts query parameters.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPostsQuery {
    /// Title fragment
    pub title: Option<String>,
    /// Comma-separated author IDs
    pub author: Option<String>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

/// List posts, newest first.
async fn list(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    Query(query): Query<ListPostsQuery>,
) -> AppResult<ApiResponse<Vec<PostResponse>>> {
    let author_ids = query.author.map(|authors| {
        authors
            .split(',')
            .filter(|id| !id.is_empty())
            .map(str::to_owned)
            .collect::<Vec<_>>()
    });

    let posts = state
        .post_service
        .list(&ListPostsInput {
            title: query.title,
            author_ids,
            limit: query.limit,
            offset: query.offset,
        })
        .await?;

    let mut responses = Vec::with_capacity(posts.len());
    for post in posts {
        responses.push(post_response(&state, viewer.viewer_id(), post).await?);
    }

    Ok(ApiResponse::ok(responses))
}

/// Create a post.
async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreatePostInput>,
) -> AppResult<ApiResponse<PostResponse>> {
    let post = state.post_service.create(&user.id, req).await?;
    let response = post_response(&state, Some(&user.id), post).await?;
    Ok(ApiResponse::ok(response))
}

/// Get a post.
async fn detail(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<PostResponse>> {
    let post = state.post_service.get(&id).await?;
    let response = post_response(&state, viewer.viewer_id(), post).await?;
    Ok(ApiResponse::ok(response))
}

/// Update a post (author or staff).
async fn update(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdatePostInput>,
) -> AppResult<ApiResponse<PostResponse>> {
    let post = state.post_service.update(&user, &id, req).await?;
    let response = post_response(&state, Some(&user.id), post).await?;
    Ok(ApiResponse::ok(response))
}

/// Delete a post (author or staff).
async fn delete(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    state.post_service.delete(&user, &id).await?;
    Ok(ApiResponse::ok(()))
}

/// Like a post. Liking twice is a no-op.
async fn like(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    state
        .reaction_service
        .add_like(&user.id, LikeTarget::Post(&id))
        .await?;
    Ok(ApiResponse::ok(()))
}

/// Remove a like from a post. Unliking when not a fan is a no-op.
async fn unlike(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    state
        .reaction_service
        .remove_like(&user.id, LikeTarget::Post(&id))
        .await?;
    Ok(ApiResponse::ok(()))
}

/// The users who liked a post.
async fn fans(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<Vec<Fan>>> {
    let fans = state.reaction_service.get_fans(LikeTarget::Post(&id)).await?;
    Ok(ApiResponse::ok(fans))
}

/// List a post's comments, newest first.
async fn list_comments(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<Vec<CommentResponse>>> {
    let comments = state.comment_service.list_for_post(&id).await?;

    let mut responses = Vec::with_capacity(comments.len());
    for comment in comments {
        responses.push(
            crate::endpoints::comments::comment_response(&state, viewer.viewer_id(), comment)
                .await?,
        );
    }

    Ok(ApiResponse::ok(responses))
}

/// Comment on a post.
async fn create_comment(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<CreateCommentInput>,
) -> AppResult<ApiResponse<CommentResponse>> {
    let comment = state.comment_service.create(&user.id, &id, req).await?;
    let response =
        crate::endpoints::comments::comment_response(&state, Some(&user.id), comment).await?;
    Ok(ApiResponse::ok(response))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(detail).put(update).delete(delete))
        .route("/{id}/like", post(like))
        .route("/{id}/unlike", post(unlike))
        .route("/{id}/fans", get(fans))
        .route("/{id}/comments", get(list_comments).post(create_comment))
}
