/**
 * Project Commands
 *
 * Every command loads its target first (a missing project or team is a
 * 404), then asks the access engine, then touches the store.
 */

use uuid::Uuid;

use crate::backend::auth::guard::authorize;
use crate::backend::error::BackendError;
use crate::backend::store::{NewProject, ProjectFilter, ProjectPatch, Repository};
use crate::shared::access::{Action, Identity};
use crate::shared::model::{Project, ProjectView, TeamRef};
use crate::shared::requests::{CreateProjectRequest, ProjectQuery, UpdateProjectRequest};

async fn load_project(store: &dyn Repository, id: Uuid) -> Result<Project, BackendError> {
    store
        .find_project_by_id(id)
        .await?
        .ok_or_else(|| BackendError::not_found("Project not found"))
}

async fn populate(store: &dyn Repository, project: Project) -> Result<ProjectView, BackendError> {
    let team = store.find_team_by_id(project.team_id).await?;
    Ok(ProjectView {
        project,
        team: team.as_ref().map(TeamRef::from),
    })
}

/// List the projects of a team
///
/// Without an explicit `teamId` the caller's own team is used; a caller
/// with no team gets an empty list.
pub async fn list_projects(
    store: &dyn Repository,
    identity: &Identity,
    query: ProjectQuery,
) -> Result<Vec<ProjectView>, BackendError> {
    let Some(team_id) = query.team_id.or(identity.team_id) else {
        return Ok(Vec::new());
    };
    authorize(identity, &Action::ReadProjects { team_id })?;

    let team = store.find_team_by_id(team_id).await?;
    let team_ref = team.as_ref().map(TeamRef::from);
    let projects = store.find_projects(ProjectFilter::by_team(team_id)).await?;

    Ok(projects
        .into_iter()
        .map(|project| ProjectView {
            project,
            team: team_ref.clone(),
        })
        .collect())
}

pub async fn create_project(
    store: &dyn Repository,
    identity: &Identity,
    request: CreateProjectRequest,
) -> Result<ProjectView, BackendError> {
    let team = store
        .find_team_by_id(request.team_id)
        .await?
        .ok_or_else(|| BackendError::not_found("Team not found"))?;
    authorize(identity, &Action::CreateProject { team_id: team.id })?;

    let project = store
        .create_project(NewProject {
            name: request.name.trim().to_string(),
            description: request.description.unwrap_or_default().trim().to_string(),
            team_id: team.id,
        })
        .await?;

    tracing::info!(project_id = %project.id, team_id = %team.id, "Project created: {}", project.name);
    Ok(ProjectView {
        project,
        team: Some(TeamRef::from(&team)),
    })
}

/// Rename or re-describe a project. Projects never change team.
pub async fn update_project(
    store: &dyn Repository,
    identity: &Identity,
    id: Uuid,
    request: UpdateProjectRequest,
) -> Result<ProjectView, BackendError> {
    let project = load_project(store, id).await?;
    authorize(identity, &Action::UpdateProject { project: &project })?;

    let patch = ProjectPatch {
        name: request.name.map(|n| n.trim().to_string()),
        description: request.description.map(|d| d.trim().to_string()),
    };
    let updated = store
        .update_project(id, patch)
        .await?
        .ok_or_else(|| BackendError::not_found("Project not found"))?;

    tracing::info!(project_id = %id, "Project updated");
    populate(store, updated).await
}

/// Delete a project. Its tasks are left in place.
pub async fn delete_project(
    store: &dyn Repository,
    identity: &Identity,
    id: Uuid,
) -> Result<(), BackendError> {
    let project = load_project(store, id).await?;
    authorize(identity, &Action::DeleteProject { project: &project })?;

    if !store.delete_project(id).await? {
        return Err(BackendError::not_found("Project not found"));
    }

    tracing::info!(project_id = %id, "Project deleted");
    Ok(())
}
