//! Store Module
//!
//! Persistence for users, teams, projects, tasks and messages behind a
//! single `Repository` trait. Handlers only ever see `&dyn Repository`, so
//! the same command code runs against PostgreSQL in production and against
//! the in-memory store in tests or when no database is configured.
//!
//! # Implementations
//!
//! - **`postgres`** - `PgStore`, backed by a `sqlx::PgPool`
//! - **`memory`** - `MemoryStore`, process-local tables behind an async lock
//!
//! # Contract
//!
//! - Creation assigns the id and both timestamps; callers pass `New*` values.
//! - Updates bump `updated_at` and return `None` when the record is missing.
//! - Deletes return whether a record was removed.
//! - Deleting a project does not cascade to its tasks.
//! - `find_messages` returns the newest `limit` messages, oldest first.

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::shared::model::{Message, Project, Role, Task, TaskStatus, Team, User};

/// Errors raised by a repository implementation
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A unique constraint was violated
    #[error("Duplicate value for {field}")]
    Duplicate { field: String },

    /// A stored row could not be mapped back to a domain record
    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub role: Role,
    pub team_id: Option<Uuid>,
}

#[derive(Debug, Clone)]
pub struct NewTeam {
    pub name: String,
    pub description: String,
    pub admin_id: Uuid,
}

#[derive(Debug, Clone)]
pub struct NewProject {
    pub name: String,
    pub description: String,
    pub team_id: Uuid,
}

#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub project_id: Uuid,
    pub assigned_to: Option<Uuid>,
}

#[derive(Debug, Clone)]
pub struct NewMessage {
    pub content: String,
    pub sender_id: Uuid,
    pub team_id: Uuid,
}

/// Fields to change on a project; `None` leaves a field untouched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectPatch {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl ProjectPatch {
    pub fn apply(&self, project: &mut Project, now: DateTime<Utc>) {
        if let Some(name) = &self.name {
            project.name = name.clone();
        }
        if let Some(description) = &self.description {
            project.description = description.clone();
        }
        project.updated_at = now;
    }
}

/// Fields to change on a task
///
/// `assigned_to` is tri-state: `None` leaves the assignee alone,
/// `Some(None)` clears it and `Some(Some(id))` reassigns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub assigned_to: Option<Option<Uuid>>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.assigned_to.is_none()
    }

    pub fn apply(&self, task: &mut Task, now: DateTime<Utc>) {
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(description) = &self.description {
            task.description = description.clone();
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(assigned_to) = self.assigned_to {
            task.assigned_to = assigned_to;
        }
        task.updated_at = now;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectFilter {
    pub team_id: Option<Uuid>,
}

impl ProjectFilter {
    pub fn by_team(team_id: Uuid) -> Self {
        Self { team_id: Some(team_id) }
    }
}

/// Task query. Both conditions apply when set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub project_ids: Option<Vec<Uuid>>,
    pub assigned_to: Option<Uuid>,
}

impl TaskFilter {
    pub fn by_project(project_id: Uuid) -> Self {
        Self {
            project_ids: Some(vec![project_id]),
            assigned_to: None,
        }
    }

    pub fn by_projects(project_ids: Vec<Uuid>) -> Self {
        Self {
            project_ids: Some(project_ids),
            assigned_to: None,
        }
    }

    pub fn assigned_to(user_id: Uuid) -> Self {
        Self {
            project_ids: None,
            assigned_to: Some(user_id),
        }
    }

    pub fn matches(&self, task: &Task) -> bool {
        let in_projects = self
            .project_ids
            .as_ref()
            .map(|ids| ids.contains(&task.project_id))
            .unwrap_or(true);
        let assigned = self
            .assigned_to
            .map(|user_id| task.assigned_to == Some(user_id))
            .unwrap_or(true);
        in_projects && assigned
    }
}

/// Persistence boundary for every domain record
#[async_trait]
pub trait Repository: Send + Sync + 'static {
    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    /// Fails with `StoreError::Duplicate` if the email is taken.
    async fn create_user(&self, user: NewUser) -> StoreResult<User>;
    async fn set_user_team(&self, user_id: Uuid, team_id: Uuid) -> StoreResult<Option<User>>;

    async fn find_team_by_id(&self, id: Uuid) -> StoreResult<Option<Team>>;
    async fn create_team(&self, team: NewTeam) -> StoreResult<Team>;

    async fn find_project_by_id(&self, id: Uuid) -> StoreResult<Option<Project>>;
    /// Projects matching `filter`, newest first.
    async fn find_projects(&self, filter: ProjectFilter) -> StoreResult<Vec<Project>>;
    async fn create_project(&self, project: NewProject) -> StoreResult<Project>;
    async fn update_project(&self, id: Uuid, patch: ProjectPatch) -> StoreResult<Option<Project>>;
    async fn delete_project(&self, id: Uuid) -> StoreResult<bool>;

    async fn find_task_by_id(&self, id: Uuid) -> StoreResult<Option<Task>>;
    /// Tasks matching `filter`, newest first.
    async fn find_tasks(&self, filter: TaskFilter) -> StoreResult<Vec<Task>>;
    async fn create_task(&self, task: NewTask) -> StoreResult<Task>;
    async fn update_task(&self, id: Uuid, patch: TaskPatch) -> StoreResult<Option<Task>>;
    async fn delete_task(&self, id: Uuid) -> StoreResult<bool>;

    async fn create_message(&self, message: NewMessage) -> StoreResult<Message>;
    async fn find_messages(&self, team_id: Uuid, limit: u32) -> StoreResult<Vec<Message>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(project_id: Uuid, assigned_to: Option<Uuid>) -> Task {
        let now = Utc::now();
        Task {
            id: Uuid::new_v4(),
            title: "Task".to_string(),
            description: String::new(),
            status: TaskStatus::Todo,
            project_id,
            assigned_to,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_task_filter_combines_conditions() {
        let project = Uuid::new_v4();
        let user = Uuid::new_v4();
        let filter = TaskFilter {
            project_ids: Some(vec![project]),
            assigned_to: Some(user),
        };
        assert!(filter.matches(&task(project, Some(user))));
        assert!(!filter.matches(&task(project, None)));
        assert!(!filter.matches(&task(Uuid::new_v4(), Some(user))));
        assert!(TaskFilter::default().matches(&task(Uuid::new_v4(), None)));
    }

    #[test]
    fn test_empty_project_list_matches_nothing() {
        let filter = TaskFilter::by_projects(Vec::new());
        assert!(!filter.matches(&task(Uuid::new_v4(), None)));
    }

    #[test]
    fn test_task_patch_clears_assignee() {
        let mut t = task(Uuid::new_v4(), Some(Uuid::new_v4()));
        let patch = TaskPatch {
            assigned_to: Some(None),
            ..TaskPatch::default()
        };
        assert!(!patch.is_empty());
        patch.apply(&mut t, Utc::now());
        assert_eq!(t.assigned_to, None);
    }

    #[test]
    fn test_task_patch_keeps_untouched_fields() {
        let assignee = Some(Uuid::new_v4());
        let mut t = task(Uuid::new_v4(), assignee);
        let patch = TaskPatch {
            status: Some(TaskStatus::Done),
            ..TaskPatch::default()
        };
        patch.apply(&mut t, Utc::now());
        assert_eq!(t.status, TaskStatus::Done);
        assert_eq!(t.assigned_to, assignee);
        assert_eq!(t.title, "Task");
    }
}
