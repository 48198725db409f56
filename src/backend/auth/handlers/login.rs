/**
 * Login Handler
 *
 * This module implements the user authentication handler for POST /api/auth/login.
 *
 * # Authentication Process
 *
 * 1. Look up user by email
 * 2. Verify password using bcrypt
 * 3. Generate JWT token
 * 4. Return token and user info
 *
 * # Security
 *
 * - Unknown emails and wrong passwords both return 401 "Invalid credentials"
 * - User passwords are never returned in responses
 */

use axum::{extract::State, response::Json};

use crate::backend::auth::handlers::types::AuthResponse;
use crate::backend::auth::users::authenticate;
use crate::backend::error::BackendError;
use crate::backend::middleware::ValidJson;
use crate::backend::server::state::AppState;
use crate::shared::model::UserResponse;
use crate::shared::requests::LoginRequest;
use crate::shared::response::ApiResponse;

/// Login handler
///
/// # Example Request
///
/// ```http
/// POST /api/auth/login HTTP/1.1
/// Content-Type: application/json
///
/// {
///   "email": "user@example.com",
///   "password": "securepassword123"
/// }
/// ```
///
/// # Example Response
///
/// ```json
/// {
///   "success": true,
///   "message": "Login successful",
///   "data": {
///     "token": "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...",
///     "user": { "id": "...", "email": "user@example.com", "name": "Ada", "role": "MEMBER", "teamId": null }
///   }
/// }
/// ```
pub async fn login(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<LoginRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>, BackendError> {
    let user = authenticate(state.store.as_ref(), request).await?;
    let token = state.tokens.create_token(user.id)?;

    Ok(Json(ApiResponse::ok(
        "Login successful",
        AuthResponse {
            token,
            user: UserResponse::from(&user),
        },
    )))
}
