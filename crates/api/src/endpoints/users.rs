//! Account endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use ripple_common::AppResult;
use ripple_core::UpdateUserInput;
use ripple_db::entities::user;
use serde::Serialize;

use crate::{
    endpoints::posts::{PostResponse, post_response},
    extractors::{AuthUser, MaybeAuthUser},
    middleware::AppState,
    response::ApiResponse,
};

/// User response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub full_name: String,
    pub created_at: String,
}

impl From<user::Model> for UserResponse {
    fn from(u: user::Model) -> Self {
        let full_name = u.full_name();
        Self {
            id: u.id,
            email: u.email,
            first_name: u.first_name,
            last_name: u.last_name,
            full_name,
            created_at: u.created_at.to_rfc3339(),
        }
    }
}

/// Get the authenticated account.
async fn me(AuthUser(user): AuthUser) -> AppResult<ApiResponse<UserResponse>> {
    Ok(ApiResponse::ok(user.into()))
}

/// Update the authenticated account.
async fn update_me(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<UpdateUserInput>,
) -> AppResult<ApiResponse<UserResponse>> {
    let updated = state.user_service.update(&user.id, req).await?;
    Ok(ApiResponse::ok(updated.into()))
}

/// Delete the authenticated account.
async fn delete_me(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<()>> {
    state.user_service.delete(&user.id).await?;
    Ok(ApiResponse::ok(()))
}

/// List a user's posts, newest first.
async fn posts(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<Vec<PostResponse>>> {
    state.user_service.get(&id).await?;
    let posts = state.post_service.list_by_author(&id).await?;

    let mut responses = Vec::with_capacity(posts.len());
    for post in posts {
        responses.push(post_response(&state, viewer.viewer_id(), post).await?);
    }

    Ok(ApiResponse::ok(responses))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/me", get(me).put(update_me).delete(delete_me))
        .route("/{id}/posts", get(posts))
}
