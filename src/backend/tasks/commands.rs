/**
 * Task Commands
 *
 * Each command follows the same shape:
 *
 * 1. Load the task, its project and any assignee; a missing record is a 404.
 * 2. Ask the access engine; a denial is a 403.
 * 3. For updates, keep only the fields the caller's role may change.
 *    MEMBERs may change `status` and nothing else; other fields in their
 *    payload are dropped without error.
 * 4. Persist.
 * 5. Publish the result to the task's team room.
 *
 * A task whose project has been deleted has no team. Events about such a
 * task go to every connection, with a warning in the log.
 */

use std::collections::HashMap;

use uuid::Uuid;

use crate::backend::auth::guard::authorize;
use crate::backend::error::BackendError;
use crate::backend::realtime::broadcast::FanoutHub;
use crate::backend::store::{NewTask, ProjectFilter, Repository, TaskFilter, TaskPatch};
use crate::shared::access::{Action, Identity};
use crate::shared::event::RealtimeEvent;
use crate::shared::model::{Project, ProjectRef, Role, Task, TaskView, User, UserRef};
use crate::shared::requests::{CreateTaskRequest, TaskQuery, UpdateTaskRequest};
use crate::shared::visibility::visible_tasks;

/// Select the part of an update payload a role may apply
pub fn allowed_patch(role: Role, request: UpdateTaskRequest) -> TaskPatch {
    match role {
        Role::Member => TaskPatch {
            status: request.status,
            ..TaskPatch::default()
        },
        Role::Admin | Role::Manager => TaskPatch {
            title: request.title.map(|t| t.trim().to_string()),
            description: request.description.map(|d| d.trim().to_string()),
            status: request.status,
            assigned_to: request.assigned_to,
        },
    }
}

async fn load_task(store: &dyn Repository, id: Uuid) -> Result<Task, BackendError> {
    store
        .find_task_by_id(id)
        .await?
        .ok_or_else(|| BackendError::not_found("Task not found"))
}

async fn load_assignee(store: &dyn Repository, id: Uuid) -> Result<User, BackendError> {
    store
        .find_user_by_id(id)
        .await?
        .ok_or_else(|| BackendError::not_found("Assignee not found"))
}

/// Builds `TaskView`s, loading each project and assignee at most once
struct ViewBuilder<'a> {
    store: &'a dyn Repository,
    projects: HashMap<Uuid, Option<ProjectRef>>,
    users: HashMap<Uuid, Option<UserRef>>,
}

impl<'a> ViewBuilder<'a> {
    fn new(store: &'a dyn Repository) -> Self {
        Self {
            store,
            projects: HashMap::new(),
            users: HashMap::new(),
        }
    }

    fn with_project(mut self, project: &Project) -> Self {
        self.projects.insert(project.id, Some(ProjectRef::from(project)));
        self
    }

    async fn view(&mut self, task: Task) -> Result<TaskView, BackendError> {
        let project = match self.projects.get(&task.project_id) {
            Some(cached) => cached.clone(),
            None => {
                let loaded = self
                    .store
                    .find_project_by_id(task.project_id)
                    .await?
                    .as_ref()
                    .map(ProjectRef::from);
                self.projects.insert(task.project_id, loaded.clone());
                loaded
            }
        };

        let assignee = match task.assigned_to {
            None => None,
            Some(user_id) => match self.users.get(&user_id) {
                Some(cached) => cached.clone(),
                None => {
                    let loaded = self
                        .store
                        .find_user_by_id(user_id)
                        .await?
                        .as_ref()
                        .map(UserRef::from);
                    self.users.insert(user_id, loaded.clone());
                    loaded
                }
            },
        };

        Ok(TaskView {
            task,
            project,
            assignee,
        })
    }

    async fn views(&mut self, tasks: Vec<Task>) -> Result<Vec<TaskView>, BackendError> {
        let mut views = Vec::with_capacity(tasks.len());
        for task in tasks {
            views.push(self.view(task).await?);
        }
        Ok(views)
    }
}

/// Deliver a task event to the team room, or to everyone if the task has
/// no team.
fn publish(hub: &FanoutHub, team_id: Option<Uuid>, event: RealtimeEvent) {
    match team_id {
        Some(team_id) => {
            hub.broadcast(team_id, &event);
        }
        None => {
            tracing::warn!(
                event = event.event.as_str(),
                "Task has no resolvable team, broadcasting to all connections"
            );
            hub.broadcast_all(&event);
        }
    }
}

fn publish_task_updated(hub: &FanoutHub, team_id: Option<Uuid>, view: &TaskView) {
    match RealtimeEvent::task_updated(view) {
        Ok(event) => publish(hub, team_id, event),
        Err(e) => tracing::error!(task_id = %view.task.id, "Failed to encode task event: {}", e),
    }
}

/// List tasks visible to the caller
///
/// With a `projectId`, the project must exist and belong to the caller's
/// team. Without one, MEMBERs get the tasks assigned to them and
/// ADMINs/MANAGERs get every task in their team's projects.
pub async fn list_tasks(
    store: &dyn Repository,
    identity: &Identity,
    query: TaskQuery,
) -> Result<Vec<TaskView>, BackendError> {
    let mut builder = ViewBuilder::new(store);

    let tasks = match query.project_id {
        Some(project_id) => {
            let project = store
                .find_project_by_id(project_id)
                .await?
                .ok_or_else(|| BackendError::not_found("Project not found"))?;
            authorize(identity, &Action::ReadTasks { project: &project })?;
            builder = builder.with_project(&project);
            store.find_tasks(TaskFilter::by_project(project_id)).await?
        }
        None => match (identity.role, identity.team_id) {
            (Role::Member, _) => store.find_tasks(TaskFilter::assigned_to(identity.user_id)).await?,
            (_, None) => Vec::new(),
            (_, Some(team_id)) => {
                let projects = store.find_projects(ProjectFilter::by_team(team_id)).await?;
                for project in &projects {
                    builder = builder.with_project(project);
                }
                let ids = projects.iter().map(|p| p.id).collect();
                store.find_tasks(TaskFilter::by_projects(ids)).await?
            }
        },
    };

    let visible = visible_tasks(identity, tasks);
    builder.views(visible).await
}

/// Create a task in a project of the caller's team
pub async fn create_task(
    store: &dyn Repository,
    hub: &FanoutHub,
    identity: &Identity,
    request: CreateTaskRequest,
) -> Result<TaskView, BackendError> {
    let project = store
        .find_project_by_id(request.project_id)
        .await?
        .ok_or_else(|| BackendError::not_found("Project not found"))?;
    let assignee = match request.assigned_to {
        Some(user_id) => Some(load_assignee(store, user_id).await?),
        None => None,
    };

    authorize(
        identity,
        &Action::CreateTask {
            project: &project,
            assignee: assignee.as_ref(),
        },
    )?;

    let task = store
        .create_task(NewTask {
            title: request.title.trim().to_string(),
            description: request.description.unwrap_or_default().trim().to_string(),
            status: request.status.unwrap_or_default(),
            project_id: project.id,
            assigned_to: assignee.as_ref().map(|u| u.id),
        })
        .await?;

    tracing::info!(task_id = %task.id, project_id = %project.id, "Task created: {}", task.title);

    let view = ViewBuilder::new(store).with_project(&project).view(task).await?;
    publish_task_updated(hub, Some(project.team_id), &view);
    Ok(view)
}

/// Update a task
///
/// MEMBERs may only update the status of tasks assigned to them; any other
/// field in their payload is ignored. An `assignedTo` equal to the current
/// assignee is not a reassignment and is dropped from the patch.
pub async fn update_task(
    store: &dyn Repository,
    hub: &FanoutHub,
    identity: &Identity,
    id: Uuid,
    request: UpdateTaskRequest,
) -> Result<TaskView, BackendError> {
    let task = load_task(store, id).await?;
    let project = store.find_project_by_id(task.project_id).await?;
    let team_id = project.as_ref().map(|p| p.team_id);

    let mut patch = allowed_patch(identity.role, request);
    if patch.assigned_to == Some(task.assigned_to) {
        patch.assigned_to = None;
    }
    let assignee = match patch.assigned_to {
        Some(Some(user_id)) => Some(load_assignee(store, user_id).await?),
        _ => None,
    };
    let reassignment = patch.assigned_to.map(|_| assignee.as_ref());

    authorize(
        identity,
        &Action::UpdateTask {
            task: &task,
            team_id,
            reassignment,
        },
    )?;

    if patch.is_empty() {
        tracing::debug!(task_id = %id, "Update carried no fields the caller may change");
    }

    let updated = store
        .update_task(id, patch)
        .await?
        .ok_or_else(|| BackendError::not_found("Task not found"))?;

    tracing::info!(task_id = %id, user_id = %identity.user_id, "Task updated");

    let mut builder = ViewBuilder::new(store);
    if let Some(project) = &project {
        builder = builder.with_project(project);
    }
    let view = builder.view(updated).await?;
    publish_task_updated(hub, team_id, &view);
    Ok(view)
}

/// Delete a task (ADMIN of the task's team only)
pub async fn delete_task(
    store: &dyn Repository,
    hub: &FanoutHub,
    identity: &Identity,
    id: Uuid,
) -> Result<(), BackendError> {
    let task = load_task(store, id).await?;
    let team_id = store
        .find_project_by_id(task.project_id)
        .await?
        .map(|p| p.team_id);

    authorize(identity, &Action::DeleteTask { task: &task, team_id })?;

    if !store.delete_task(id).await? {
        return Err(BackendError::not_found("Task not found"));
    }

    tracing::info!(task_id = %id, user_id = %identity.user_id, "Task deleted");
    publish(hub, team_id, RealtimeEvent::task_deleted(task.id, task.project_id));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::model::TaskStatus;

    #[test]
    fn test_member_patch_keeps_status_only() {
        let request = UpdateTaskRequest {
            title: Some("Renamed".to_string()),
            description: Some("New".to_string()),
            status: Some(TaskStatus::Done),
            assigned_to: Some(None),
        };
        let patch = allowed_patch(Role::Member, request);
        assert_eq!(
            patch,
            TaskPatch {
                status: Some(TaskStatus::Done),
                ..TaskPatch::default()
            }
        );
    }

    #[test]
    fn test_manager_patch_keeps_everything() {
        let assignee = Uuid::new_v4();
        let request = UpdateTaskRequest {
            title: Some("  Renamed ".to_string()),
            description: None,
            status: Some(TaskStatus::InProgress),
            assigned_to: Some(Some(assignee)),
        };
        let patch = allowed_patch(Role::Manager, request);
        assert_eq!(patch.title.as_deref(), Some("Renamed"));
        assert_eq!(patch.status, Some(TaskStatus::InProgress));
        assert_eq!(patch.assigned_to, Some(Some(assignee)));
    }

    #[test]
    fn test_member_title_only_patch_is_empty() {
        let request = UpdateTaskRequest {
            title: Some("Sneaky".to_string()),
            ..UpdateTaskRequest::default()
        };
        assert!(allowed_patch(Role::Member, request).is_empty());
    }
}
