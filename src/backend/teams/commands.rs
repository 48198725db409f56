/**
 * Team Commands
 */

use crate::backend::auth::guard::authorize;
use crate::backend::error::BackendError;
use crate::backend::store::{NewTeam, Repository};
use crate::shared::access::{Action, Identity};
use crate::shared::model::Team;
use crate::shared::requests::CreateTeamRequest;

/// Create a team administered by the caller
///
/// The caller becomes a member of the new team.
///
/// # Errors
/// * `Forbidden` - the caller is not an ADMIN
pub async fn create_team(
    store: &dyn Repository,
    identity: &Identity,
    request: CreateTeamRequest,
) -> Result<Team, BackendError> {
    authorize(identity, &Action::CreateTeam)?;

    let team = store
        .create_team(NewTeam {
            name: request.name.trim().to_string(),
            description: request.description.unwrap_or_default().trim().to_string(),
            admin_id: identity.user_id,
        })
        .await?;

    if store.set_user_team(identity.user_id, team.id).await?.is_none() {
        tracing::warn!(user_id = %identity.user_id, "Team creator vanished before joining team");
    }

    tracing::info!(team_id = %team.id, admin_id = %identity.user_id, "Team created: {}", team.name);
    Ok(team)
}
