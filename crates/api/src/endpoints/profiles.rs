//! Profile endpoints, including the follower graph.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use ripple_common::AppResult;
use ripple_core::{CreateProfileInput, SearchProfilesInput, UpdateProfileInput};
use ripple_db::entities::user_profile;
use serde::Serialize;

use crate::{
    endpoints::users::UserResponse,
    extractors::AuthUser,
    middleware::AppState,
    response::ApiResponse,
};

/// Profile response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub id: String,
    pub user_id: String,
    pub username: String,
    pub bio: Option<String>,
    pub image_url: Option<String>,
    pub created_at: String,
}

impl From<user_profile::Model> for ProfileResponse {
    fn from(p: user_profile::Model) -> Self {
        Self {
            id: p.id,
            user_id: p.user_id,
            username: p.username,
            bio: p.bio,
            image_url: p.image_url,
            created_at: p.created_at.to_rfc3339(),
        }
    }
}

/// Profile detail response, enriched with the owner's graph and post count.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDetailResponse {
    #[serde(flatten)]
    pub profile: ProfileResponse,
    /// Emails of the users following the owner
    pub followers: Vec<String>,
    /// Emails of the users the owner follows
    pub following: Vec<String>,
    pub posts_count: usize,
}

/// List profiles, optionally filtered by email or username fragment.
async fn list(
    State(state): State<AppState>,
    Query(query): Query<SearchProfilesInput>,
) -> AppResult<ApiResponse<Vec<ProfileResponse>>> {
    let profiles = state.profile_service.list(&query).await?;
    Ok(ApiResponse::ok(
        profiles.into_iter().map(Into::into).collect(),
    ))
}

/// Create a profile for the authenticated user.
async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreateProfileInput>,
) -> AppResult<ApiResponse<ProfileResponse>> {
    let profile = state.profile_service.create(&user.id, req).await?;
    Ok(ApiResponse::ok(profile.into()))
}

/// Get a profile with follower and following emails and the owner's post count.
async fn detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<ProfileDetailResponse>> {
    let profile = state.profile_service.get(&id).await?;
    let followers = state.following_service.followers(&profile.user_id).await?;
    let following = state.following_service.following(&profile.user_id).await?;
    let posts = state.post_service.list_by_author(&profile.user_id).await?;

    Ok(ApiResponse::ok(ProfileDetailResponse {
        followers: followers.into_iter().map(|u| u.email).collect(),
        following: following.into_iter().map(|u| u.email).collect(),
        posts_count: posts.len(),
        profile: profile.into(),
    }))
}

/// Update a profile (owner or staff).
async fn update(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateProfileInput>,
) -> AppResult<ApiResponse<ProfileResponse>> {
    let profile = state.profile_service.update(&user, &id, req).await?;
    Ok(ApiResponse::ok(profile.into()))
}

/// Delete a profile (owner or staff).
async fn delete(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    state.profile_service.delete(&user, &id).await?;
    Ok(ApiResponse::ok(()))
}

/// Follow the profile's owner. Following twice is a no-op.
async fn follow(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    let profile = state.profile_service.get(&id).await?;
    state
        .following_service
        .follow(&user.id, &profile.user_id)
        .await?;
    Ok(ApiResponse::ok(()))
}

/// Unfollow the profile's owner. Unfollowing when not following is a no-op.
async fn unfollow(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    let profile = state.profile_service.get(&id).await?;
    state
        .following_service
        .unfollow(&user.id, &profile.user_id)
        .await?;
    Ok(ApiResponse::ok(()))
}

/// The users who follow the profile's owner.
async fn followers(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<Vec<UserResponse>>> {
    let profile = state.profile_service.get(&id).await?;
    let users = state.following_service.followers(&profile.user_id).await?;
    Ok(ApiResponse::ok(users.into_iter().map(Into::into).collect()))
}

/// The users the profile's owner follows.
async fn following(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<Vec<UserResponse>>> {
    let profile = state.profile_service.get(&id).await?;
    let users = state.following_service.following(&profile.user_id).await?;
    Ok(ApiResponse::ok(users.into_iter().map(Into::into).collect()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(detail).put(update).delete(delete))
        .route("/{id}/follow", post(follow))
        .route("/{id}/unfollow", post(unfollow))
        .route("/{id}/followers", get(followers))
        .route("/{id}/following", get(following))
}
