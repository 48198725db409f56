/**
 * Project Handlers
 *
 * - `GET /api/projects?teamId=` - list a team's projects
 * - `POST /api/projects` - create a project (ADMIN/MANAGER)
 * - `PUT /api/projects/{id}` - update a project (ADMIN/MANAGER)
 * - `DELETE /api/projects/{id}` - delete a project (ADMIN/MANAGER)
 */

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::backend::error::BackendError;
use crate::backend::middleware::{AuthUser, PathId, ValidJson, ValidQuery};
use crate::backend::projects::commands;
use crate::backend::server::state::SharedStore;
use crate::shared::model::ProjectView;
use crate::shared::requests::{CreateProjectRequest, ProjectQuery, UpdateProjectRequest};
use crate::shared::response::ApiResponse;

#[derive(Debug, Serialize)]
pub struct ProjectPayload {
    pub project: ProjectView,
}

#[derive(Debug, Serialize)]
pub struct ProjectListPayload {
    pub projects: Vec<ProjectView>,
}

pub async fn list_projects(
    State(store): State<SharedStore>,
    AuthUser(identity): AuthUser,
    ValidQuery(query): ValidQuery<ProjectQuery>,
) -> Result<Json<ApiResponse<ProjectListPayload>>, BackendError> {
    let projects = commands::list_projects(store.as_ref(), &identity, query).await?;
    Ok(Json(ApiResponse::ok(
        "Projects retrieved successfully",
        ProjectListPayload { projects },
    )))
}

pub async fn create_project(
    State(store): State<SharedStore>,
    AuthUser(identity): AuthUser,
    ValidJson(request): ValidJson<CreateProjectRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ProjectPayload>>), BackendError> {
    let project = commands::create_project(store.as_ref(), &identity, request).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok("Project created successfully", ProjectPayload { project })),
    ))
}

pub async fn update_project(
    State(store): State<SharedStore>,
    AuthUser(identity): AuthUser,
    PathId(id): PathId,
    ValidJson(request): ValidJson<UpdateProjectRequest>,
) -> Result<Json<ApiResponse<ProjectPayload>>, BackendError> {
    let project = commands::update_project(store.as_ref(), &identity, id, request).await?;
    Ok(Json(ApiResponse::ok("Project updated successfully", ProjectPayload { project })))
}

pub async fn delete_project(
    State(store): State<SharedStore>,
    AuthUser(identity): AuthUser,
    PathId(id): PathId,
) -> Result<Json<ApiResponse<()>>, BackendError> {
    commands::delete_project(store.as_ref(), &identity, id).await?;
    Ok(Json(ApiResponse::done("Project deleted successfully")))
}
