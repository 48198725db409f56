/**
 * Team Handlers
 *
 * - `POST /api/teams` - create a team (ADMIN only)
 */

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::backend::error::BackendError;
use crate::backend::middleware::{AuthUser, ValidJson};
use crate::backend::server::state::SharedStore;
use crate::backend::teams::commands;
use crate::shared::model::Team;
use crate::shared::requests::CreateTeamRequest;
use crate::shared::response::ApiResponse;

#[derive(Debug, Serialize)]
pub struct TeamPayload {
    pub team: Team,
}

/// Create team handler
///
/// # Example Request
///
/// ```http
/// POST /api/teams HTTP/1.1
/// Authorization: Bearer <token>
/// Content-Type: application/json
///
/// { "name": "Platform", "description": "Core services" }
/// ```
pub async fn create_team(
    State(store): State<SharedStore>,
    AuthUser(identity): AuthUser,
    ValidJson(request): ValidJson<CreateTeamRequest>,
) -> Result<(StatusCode, Json<ApiResponse<TeamPayload>>), BackendError> {
    let team = commands::create_team(store.as_ref(), &identity, request).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok("Team created successfully", TeamPayload { team })),
    ))
}
