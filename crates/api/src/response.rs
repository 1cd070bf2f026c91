//! API response types.

use axum::{
    Json,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Standard API response wrapper.
///
/// Errors never pass through here; they render through
/// `AppError::into_response` with their own envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a success response.
    pub const fn ok(data: T) -> Self {
        Self { data }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_envelope() {
        let response = ApiResponse::ok(serde_json::json!({"id": "x"}));
        let body = serde_json::to_value(&response).unwrap();

        assert_eq!(body, serde_json::json!({"data": {"id": "x"}}));
    }
}
