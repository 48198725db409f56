/**
 * User Accounts
 *
 * Registration, credential checks and profile lookup on top of the
 * repository. Passwords are hashed with bcrypt; the hash never leaves
 * this module except through the store.
 */

use crate::backend::error::BackendError;
use crate::backend::store::{NewUser, Repository};
use crate::shared::access::Identity;
use crate::shared::model::User;
use crate::shared::requests::{LoginRequest, RegisterRequest};

/// Hash a password with bcrypt
///
/// # Arguments
/// * `password` - Plain-text password
/// * `cost` - bcrypt work factor
pub fn hash_password(password: &str, cost: u32) -> Result<String, BackendError> {
    Ok(bcrypt::hash(password, cost)?)
}

/// Check a plain-text password against a stored bcrypt hash
pub fn verify_password(password: &str, hash: &str) -> Result<bool, BackendError> {
    Ok(bcrypt::verify(password, hash)?)
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Register a new user
///
/// # Arguments
/// * `store` - Repository
/// * `request` - Validated registration payload
/// * `cost` - bcrypt work factor
///
/// # Returns
/// The created user, or:
/// * `Conflict` if the email is already registered
/// * `NotFound` if `teamId` does not reference an existing team
pub async fn register_user(
    store: &dyn Repository,
    request: RegisterRequest,
    cost: u32,
) -> Result<User, BackendError> {
    let email = normalize_email(&request.email);

    if store.find_user_by_email(&email).await?.is_some() {
        tracing::warn!("Registration rejected, email already in use: {}", email);
        return Err(BackendError::conflict("User already exists with this email"));
    }

    if let Some(team_id) = request.team_id {
        if store.find_team_by_id(team_id).await?.is_none() {
            return Err(BackendError::not_found("Team not found"));
        }
    }

    let password_hash = hash_password(&request.password, cost)?;
    let user = store
        .create_user(NewUser {
            email,
            name: request.name.trim().to_string(),
            password_hash,
            role: request.role.unwrap_or_default(),
            team_id: request.team_id,
        })
        .await?;

    tracing::info!("User registered: {} ({}, {})", user.email, user.id, user.role);
    Ok(user)
}

/// Check credentials and return the matching user
///
/// Unknown emails and wrong passwords produce the same `Unauthorized`
/// error.
pub async fn authenticate(
    store: &dyn Repository,
    request: LoginRequest,
) -> Result<User, BackendError> {
    let email = normalize_email(&request.email);

    let user = match store.find_user_by_email(&email).await? {
        Some(user) => user,
        None => {
            tracing::warn!("Login failed, unknown email: {}", email);
            return Err(BackendError::unauthorized("Invalid credentials"));
        }
    };

    if !verify_password(&request.password, &user.password_hash)? {
        tracing::warn!("Login failed, wrong password for: {}", email);
        return Err(BackendError::unauthorized("Invalid credentials"));
    }

    tracing::info!("User logged in: {} ({})", user.email, user.id);
    Ok(user)
}

/// Load the stored user behind an identity
pub async fn current_user(store: &dyn Repository, identity: &Identity) -> Result<User, BackendError> {
    store
        .find_user_by_id(identity.user_id)
        .await?
        .ok_or_else(|| BackendError::unauthorized("User no longer exists"))
}
