//! Public endpoints.

use axum::{http::StatusCode, Json};

use crate::response::{ErrorResponse, MessageResponse};

/// GET /
pub async fn root_handler() -> Json<MessageResponse> {
    Json(MessageResponse::new("Welcome to PoliQ Backend API"))
}

/// GET /api/test
pub async fn test_handler() -> Json<MessageResponse> {
    Json(MessageResponse::new("API is working!"))
}

/// Unmatched paths; still logged by the connection middleware.
pub async fn not_found_handler() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::new("Not found", "NOT_FOUND")),
    )
}
