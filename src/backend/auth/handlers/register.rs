/**
 * Register Handler
 *
 * This module implements the user registration handler for
 * POST /api/auth/register.
 *
 * # Registration Process
 *
 * 1. Validate the payload (email, name, password length)
 * 2. Reject an email that is already registered
 * 3. Check that an optional `teamId` references an existing team
 * 4. Hash the password with bcrypt and store the user
 * 5. Return a JWT token and the user's profile
 */

use axum::{extract::State, http::StatusCode, response::Json};

use crate::backend::auth::handlers::types::AuthResponse;
use crate::backend::auth::users::register_user;
use crate::backend::error::BackendError;
use crate::backend::middleware::ValidJson;
use crate::backend::server::state::AppState;
use crate::shared::model::UserResponse;
use crate::shared::requests::RegisterRequest;
use crate::shared::response::ApiResponse;

/// Register handler
///
/// # Errors
///
/// * `400 Bad Request` - Validation failed
/// * `404 Not Found` - `teamId` does not exist
/// * `409 Conflict` - Email already registered
///
/// # Example Request
///
/// ```http
/// POST /api/auth/register HTTP/1.1
/// Content-Type: application/json
///
/// {
///   "email": "user@example.com",
///   "name": "Ada Lovelace",
///   "password": "securepassword123",
///   "role": "MANAGER"
/// }
/// ```
pub async fn register(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AuthResponse>>), BackendError> {
    let user = register_user(state.store.as_ref(), request, state.config.bcrypt_cost).await?;
    let token = state.tokens.create_token(user.id)?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(
            "User registered successfully",
            AuthResponse {
                token,
                user: UserResponse::from(&user),
            },
        )),
    ))
}
