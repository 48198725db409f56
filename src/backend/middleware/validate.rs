/**
 * Validating Extractors
 *
 * Drop-in replacements for `Json`, `Query` and `Path` that run request
 * validation before the handler is called. Malformed bodies and failing
 * field rules both produce a 400 with the standard error envelope.
 */

use axum::{
    extract::{FromRequest, FromRequestParts, Path, Query, Request},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::backend::error::BackendError;
use crate::shared::requests::Validate;

/// JSON body that has passed `Validate`
#[derive(Debug, Clone)]
pub struct ValidJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = BackendError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|rejection| {
            tracing::warn!("Rejected request body: {}", rejection.body_text());
            BackendError::validation(rejection.body_text())
        })?;
        value.validate()?;
        Ok(ValidJson(value))
    }
}

/// Query string that has passed `Validate`
#[derive(Debug, Clone)]
pub struct ValidQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ValidQuery<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = BackendError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| BackendError::validation(rejection.body_text()))?;
        value.validate()?;
        Ok(ValidQuery(value))
    }
}

/// A record id taken from the path
#[derive(Debug, Clone, Copy)]
pub struct PathId(pub Uuid);

impl<S> FromRequestParts<S> for PathId
where
    S: Send + Sync,
{
    type Rejection = BackendError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| BackendError::validation("Invalid id"))?;
        Uuid::parse_str(&raw)
            .map(PathId)
            .map_err(|_| BackendError::validation("Invalid id"))
    }
}
