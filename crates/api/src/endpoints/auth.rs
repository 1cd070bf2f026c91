//! Authentication endpoints.

use axum::{Json, Router, extract::State, routing::post};
use ripple_common::AppResult;
use ripple_core::{RegisterInput, SigninInput};
use serde::Serialize;

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Session response: the account plus its bearer token.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub id: String,
    pub email: String,
    pub token: String,
}

/// Register a new account.
async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterInput>,
) -> AppResult<ApiResponse<SessionResponse>> {
    let (user, token) = state.user_service.register(req).await?;

    Ok(ApiResponse::ok(SessionResponse {
        id: user.id,
        email: user.email,
        token,
    }))
}

/// Sign in with email and password.
async fn signin(
    State(state): State<AppState>,
    Json(req): Json<SigninInput>,
) -> AppResult<ApiResponse<SessionResponse>> {
    let (user, token) = state.user_service.signin(req).await?;

    Ok(ApiResponse::ok(SessionResponse {
        id: user.id,
        email: user.email,
        token,
    }))
}

/// Invalidate the current token.
async fn signout(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<()>> {
    state.user_service.signout(&user.id).await?;
    Ok(ApiResponse::ok(()))
}

/// Token response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub token: String,
}

/// Rotate the current token.
async fn regenerate_token(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<TokenResponse>> {
    let token = state.user_service.regenerate_token(&user.id).await?;
    Ok(ApiResponse::ok(TokenResponse { token }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/signin", post(signin))
        .route("/signout", post(signout))
        .route("/regenerate-token", post(regenerate_token))
}
