use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::{error, warn};

use crate::{adapters::response::ApiResponse, application::error::ApplicationError};

impl IntoResponse for ApplicationError {
    fn into_response(self) -> Response {
        let response = match self {
            ApplicationError::NotFound(message) => {
                warn!("Not found: {}", message);
                ApiResponse::json(StatusCode::NOT_FOUND, &json!({ "error": message }))
            }
            ApplicationError::BadRequest(message) => {
                warn!("Bad request: {}", message);
                ApiResponse::json(StatusCode::BAD_REQUEST, &json!({ "error": message }))
            }
            ApplicationError::InternalError(details) => {
                error!("Internal server error: {}", details);
                internal_error(details)
            }
            ApplicationError::DatabaseError(details) => {
                error!("Database error: {}", details);
                internal_error(details)
            }
        };

        response.into_response()
    }
}

fn internal_error(details: String) -> ApiResponse {
    ApiResponse::json(
        StatusCode::INTERNAL_SERVER_ERROR,
        &json!({
            "error": "Internal server error",
            "details": details,
        }),
    )
}
