/**
 * Authentication Handler Types
 *
 * Response payloads shared by the register, login and me handlers. Request
 * bodies live in `shared::requests` next to their validation rules.
 */

use serde::Serialize;

use crate::shared::model::UserResponse;

/// Auth response
///
/// Returned by register and login. Contains the JWT token and the user's
/// public profile for immediate authentication.
#[derive(Serialize, Debug)]
pub struct AuthResponse {
    /// JWT token for authentication
    pub token: String,
    /// User information (without sensitive data)
    pub user: UserResponse,
}

/// Payload of `GET /api/auth/me`
#[derive(Serialize, Debug)]
pub struct MeResponse {
    pub user: UserResponse,
}
