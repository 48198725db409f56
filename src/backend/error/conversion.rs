/**
 * Error Conversion
 *
 * This module converts backend errors into HTTP responses so handlers can
 * return `Result<_, BackendError>` directly.
 *
 * # Response Format
 *
 * Error responses use the same envelope as successful ones:
 * ```json
 * {
 *   "success": false,
 *   "message": "Only admins can delete tasks",
 *   "data": null
 * }
 * ```
 *
 * Validation errors add an `errors` array. Server errors are logged with
 * their full detail and answered with a generic message.
 */

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::backend::error::types::BackendError;
use crate::shared::response::ApiResponse;

impl IntoResponse for BackendError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("Request failed: {}", self);
        }

        let body = ApiResponse::failure(self.message(), self.errors());
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::store::StoreError;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_forbidden_response() {
        let response = BackendError::forbidden("Only admins can delete tasks").into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let json = body_json(response).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "Only admins can delete tasks");
        assert!(json.get("errors").is_none());
    }

    #[tokio::test]
    async fn test_validation_response_lists_errors() {
        let response = BackendError::validation("Team ID is required").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["message"], "Validation Error");
        assert_eq!(json["errors"][0], "Team ID is required");
    }

    #[tokio::test]
    async fn test_server_error_hides_details() {
        let err: BackendError = StoreError::Corrupt("row 42".to_string()).into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["message"], "Internal Server Error");
    }
}
