/**
 * Authentication Middleware
 *
 * This module provides middleware for protecting routes that require
 * user authentication. It extracts and verifies the JWT from the
 * Authorization header, loads the user, and attaches the resulting
 * `Identity` to the request for handlers to pick up with `AuthUser`.
 *
 * The user is re-read from the store on every request, so a role or team
 * change applies to the very next call.
 */

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::backend::auth::sessions::TokenService;
use crate::backend::error::BackendError;
use crate::backend::server::state::AppState;
use crate::backend::store::Repository;
use crate::shared::access::Identity;

/// Extract the token from an `Authorization: Bearer <token>` header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Verify a token and load the identity of its user
///
/// # Errors
///
/// * `Unauthorized` - the token is invalid or expired, or its user is gone
/// * Store errors propagate unchanged
pub async fn resolve_identity(
    tokens: &TokenService,
    store: &dyn Repository,
    token: &str,
) -> Result<Identity, BackendError> {
    let user_id = tokens.user_id_from_token(token).ok_or_else(|| {
        tracing::warn!("Invalid or expired token");
        BackendError::unauthorized("Not authorized, token failed")
    })?;

    let user = store.find_user_by_id(user_id).await?.ok_or_else(|| {
        tracing::warn!(%user_id, "Token refers to a missing user");
        BackendError::unauthorized("User no longer exists")
    })?;

    Ok(Identity::from_user(&user))
}

/// Authentication middleware
///
/// This middleware:
/// 1. Extracts JWT token from Authorization header
/// 2. Verifies the token and loads the user
/// 3. Attaches the caller's `Identity` to request extensions
///
/// Returns 401 Unauthorized if the token is missing or invalid.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, BackendError> {
    let token = bearer_token(request.headers()).ok_or_else(|| {
        tracing::warn!("Missing Authorization header");
        BackendError::unauthorized("Not authorized, no token")
    })?;

    let identity = resolve_identity(&state.tokens, state.store.as_ref(), token).await?;
    request.extensions_mut().insert(identity);

    Ok(next.run(request).await)
}

/// Axum extractor for the authenticated caller
///
/// Only valid on routes wrapped by `auth_middleware`.
#[derive(Clone, Copy, Debug)]
pub struct AuthUser(pub Identity);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = BackendError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .copied()
            .map(AuthUser)
            .ok_or_else(|| {
                tracing::warn!("Identity not found in request extensions");
                BackendError::unauthorized("Not authorized, no token")
            })
    }
}
