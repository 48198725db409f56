/**
 * Session Management and JWT Tokens
 *
 * This module handles JWT token generation and validation for user sessions.
 * Tokens are HS256-signed and carry only the user id; role and team are
 * always re-read from the store so changes take effect immediately.
 */

use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// User ID
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
    /// Issued at time (Unix timestamp)
    pub iat: u64,
}

/// Signs and verifies session tokens with a shared secret
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_secs: u64,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("ttl_secs", &self.ttl_secs)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// Create a token service
    ///
    /// # Arguments
    /// * `secret` - HMAC secret shared by signing and verification
    /// * `ttl_secs` - Lifetime of issued tokens in seconds
    pub fn new(secret: &str, ttl_secs: u64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl_secs,
        }
    }

    /// Create a JWT token for a user
    ///
    /// # Arguments
    /// * `user_id` - User ID (UUID)
    ///
    /// # Returns
    /// JWT token string
    pub fn create_token(&self, user_id: Uuid) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now().timestamp().max(0) as u64;
        let claims = Claims {
            sub: user_id.to_string(),
            exp: now.saturating_add(self.ttl_secs),
            iat: now,
        };
        encode(&Header::default(), &claims, &self.encoding)
    }

    /// Verify and decode a JWT token
    ///
    /// Fails on a bad signature, a malformed token or an expired `exp`.
    pub fn verify_token(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let token_data = decode::<Claims>(token, &self.decoding, &Validation::default())?;
        Ok(token_data.claims)
    }

    /// Extract user ID from token
    ///
    /// # Returns
    /// User ID, or `None` if the token is invalid or its subject is not a UUID
    pub fn user_id_from_token(&self, token: &str) -> Option<Uuid> {
        let claims = self
            .verify_token(token)
            .map_err(|e| tracing::debug!("Token verification failed: {}", e))
            .ok()?;
        Uuid::parse_str(&claims.sub).ok()
    }
}
