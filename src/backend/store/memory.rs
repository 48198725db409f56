/**
 * In-Memory Store
 *
 * A `Repository` that keeps every table in process memory. Used when no
 * `DATABASE_URL` is configured and by the test suites.
 *
 * Tables are plain vectors in insertion order behind one `tokio::sync::RwLock`,
 * so every operation is atomic with respect to the others. Lists are
 * returned newest first by walking a table backwards.
 */
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    NewMessage, NewProject, NewTask, NewTeam, NewUser, ProjectFilter, ProjectPatch, Repository,
    StoreError, StoreResult, TaskFilter, TaskPatch,
};
use crate::shared::model::{Message, Project, Task, Team, User};

#[derive(Debug, Default)]
struct Tables {
    users: Vec<User>,
    teams: Vec<Team>,
    projects: Vec<Project>,
    tasks: Vec<Task>,
    messages: Vec<Message>,
}

/// Process-local repository. Cloning shares the same tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Repository for MemoryStore {
    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }

    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        let mut tables = self.tables.write().await;
        if tables.users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::Duplicate {
                field: "email".to_string(),
            });
        }
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: user.email,
            name: user.name,
            password_hash: user.password_hash,
            role: user.role,
            team_id: user.team_id,
            created_at: now,
            updated_at: now,
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn set_user_team(&self, user_id: Uuid, team_id: Uuid) -> StoreResult<Option<User>> {
        let mut tables = self.tables.write().await;
        Ok(tables.users.iter_mut().find(|u| u.id == user_id).map(|user| {
            user.team_id = Some(team_id);
            user.updated_at = Utc::now();
            user.clone()
        }))
    }

    async fn find_team_by_id(&self, id: Uuid) -> StoreResult<Option<Team>> {
        let tables = self.tables.read().await;
        Ok(tables.teams.iter().find(|t| t.id == id).cloned())
    }

    async fn create_team(&self, team: NewTeam) -> StoreResult<Team> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let team = Team {
            id: Uuid::new_v4(),
            name: team.name,
            description: team.description,
            admin_id: team.admin_id,
            created_at: now,
            updated_at: now,
        };
        tables.teams.push(team.clone());
        Ok(team)
    }

    async fn find_project_by_id(&self, id: Uuid) -> StoreResult<Option<Project>> {
        let tables = self.tables.read().await;
        Ok(tables.projects.iter().find(|p| p.id == id).cloned())
    }

    async fn find_projects(&self, filter: ProjectFilter) -> StoreResult<Vec<Project>> {
        let tables = self.tables.read().await;
        Ok(tables
            .projects
            .iter()
            .rev()
            .filter(|p| filter.team_id.map(|team| p.team_id == team).unwrap_or(true))
            .cloned()
            .collect())
    }

    async fn create_project(&self, project: NewProject) -> StoreResult<Project> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let project = Project {
            id: Uuid::new_v4(),
            name: project.name,
            description: project.description,
            team_id: project.team_id,
            created_at: now,
            updated_at: now,
        };
        tables.projects.push(project.clone());
        Ok(project)
    }

    async fn update_project(&self, id: Uuid, patch: ProjectPatch) -> StoreResult<Option<Project>> {
        let mut tables = self.tables.write().await;
        Ok(tables.projects.iter_mut().find(|p| p.id == id).map(|project| {
            patch.apply(project, Utc::now());
            project.clone()
        }))
    }

    async fn delete_project(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.projects.len();
        tables.projects.retain(|p| p.id != id);
        Ok(tables.projects.len() != before)
    }

    async fn find_task_by_id(&self, id: Uuid) -> StoreResult<Option<Task>> {
        let tables = self.tables.read().await;
        Ok(tables.tasks.iter().find(|t| t.id == id).cloned())
    }

    async fn find_tasks(&self, filter: TaskFilter) -> StoreResult<Vec<Task>> {
        let tables = self.tables.read().await;
        Ok(tables
            .tasks
            .iter()
            .rev()
            .filter(|t| filter.matches(t))
            .cloned()
            .collect())
    }

    async fn create_task(&self, task: NewTask) -> StoreResult<Task> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let task = Task {
            id: Uuid::new_v4(),
            title: task.title,
            description: task.description,
            status: task.status,
            project_id: task.project_id,
            assigned_to: task.assigned_to,
            created_at: now,
            updated_at: now,
        };
        tables.tasks.push(task.clone());
        Ok(task)
    }

    async fn update_task(&self, id: Uuid, patch: TaskPatch) -> StoreResult<Option<Task>> {
        let mut tables = self.tables.write().await;
        Ok(tables.tasks.iter_mut().find(|t| t.id == id).map(|task| {
            patch.apply(task, Utc::now());
            task.clone()
        }))
    }

    async fn delete_task(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.tasks.len();
        tables.tasks.retain(|t| t.id != id);
        Ok(tables.tasks.len() != before)
    }

    async fn create_message(&self, message: NewMessage) -> StoreResult<Message> {
        let mut tables = self.tables.write().await;
        let message = Message {
            id: Uuid::new_v4(),
            content: message.content,
            sender_id: message.sender_id,
            team_id: message.team_id,
            timestamp: Utc::now(),
        };
        tables.messages.push(message.clone());
        Ok(message)
    }

    async fn find_messages(&self, team_id: Uuid, limit: u32) -> StoreResult<Vec<Message>> {
        let tables = self.tables.read().await;
        let mut newest: Vec<Message> = tables
            .messages
            .iter()
            .rev()
            .filter(|m| m.team_id == team_id)
            .take(limit as usize)
            .cloned()
            .collect();
        newest.reverse();
        Ok(newest)
    }
}
