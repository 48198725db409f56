/**
 * Task Handlers
 *
 * - `GET /api/tasks?projectId=` - list visible tasks
 * - `POST /api/tasks` - create a task, emits `task-updated`
 * - `PUT /api/tasks/{id}` - update a task, emits `task-updated`
 * - `DELETE /api/tasks/{id}` - delete a task, emits `task-deleted`
 */

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::backend::error::BackendError;
use crate::backend::middleware::{AuthUser, PathId, ValidJson, ValidQuery};
use crate::backend::server::state::AppState;
use crate::backend::tasks::commands;
use crate::shared::model::TaskView;
use crate::shared::requests::{CreateTaskRequest, TaskQuery, UpdateTaskRequest};
use crate::shared::response::ApiResponse;

#[derive(Debug, Serialize)]
pub struct TaskPayload {
    pub task: TaskView,
}

#[derive(Debug, Serialize)]
pub struct TaskListPayload {
    pub tasks: Vec<TaskView>,
}

pub async fn list_tasks(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    ValidQuery(query): ValidQuery<TaskQuery>,
) -> Result<Json<ApiResponse<TaskListPayload>>, BackendError> {
    let tasks = commands::list_tasks(state.store.as_ref(), &identity, query).await?;
    Ok(Json(ApiResponse::ok("Tasks retrieved successfully", TaskListPayload { tasks })))
}

/// Create task handler
///
/// # Example Request
///
/// ```http
/// POST /api/tasks HTTP/1.1
/// Authorization: Bearer <token>
/// Content-Type: application/json
///
/// {
///   "title": "Write release notes",
///   "projectId": "9f1c...",
///   "assignedTo": "41ab..."
/// }
/// ```
pub async fn create_task(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    ValidJson(request): ValidJson<CreateTaskRequest>,
) -> Result<(StatusCode, Json<ApiResponse<TaskPayload>>), BackendError> {
    let task =
        commands::create_task(state.store.as_ref(), &state.fanout, &identity, request).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok("Task created successfully", TaskPayload { task })),
    ))
}

pub async fn update_task(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    PathId(id): PathId,
    ValidJson(request): ValidJson<UpdateTaskRequest>,
) -> Result<Json<ApiResponse<TaskPayload>>, BackendError> {
    let task =
        commands::update_task(state.store.as_ref(), &state.fanout, &identity, id, request).await?;
    Ok(Json(ApiResponse::ok("Task updated successfully", TaskPayload { task })))
}

pub async fn delete_task(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    PathId(id): PathId,
) -> Result<Json<ApiResponse<()>>, BackendError> {
    commands::delete_task(state.store.as_ref(), &state.fanout, &identity, id).await?;
    Ok(Json(ApiResponse::done("Task deleted successfully")))
}
