/**
 * PostgreSQL Store
 *
 * `Repository` implementation over a `sqlx::PgPool`. The schema lives in
 * `migrations/` and is applied at startup by `server::config::load_database`.
 *
 * Rows are read into `*Row` structs with `sqlx::FromRow` and converted to
 * domain records; role and status columns are stored as their wire names
 * and parsed back on the way out.
 */
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{
    NewMessage, NewProject, NewTask, NewTeam, NewUser, ProjectFilter, ProjectPatch, Repository,
    StoreError, StoreResult, TaskFilter, TaskPatch,
};
use crate::shared::model::{Message, Project, Task, Team, User};

const USER_COLUMNS: &str = "id, email, name, password_hash, role, team_id, created_at, updated_at";
const TEAM_COLUMNS: &str = "id, name, description, admin_id, created_at, updated_at";
const PROJECT_COLUMNS: &str = "id, name, description, team_id, created_at, updated_at";
const TASK_COLUMNS: &str =
    "id, title, description, status, project_id, assigned_to, created_at, updated_at";
const MESSAGE_COLUMNS: &str = "id, content, sender_id, team_id, timestamp";

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    name: String,
    password_hash: String,
    role: String,
    team_id: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = row
            .role
            .parse()
            .map_err(|_| StoreError::Corrupt(format!("user {} has role {:?}", row.id, row.role)))?;
        Ok(User {
            id: row.id,
            email: row.email,
            name: row.name,
            password_hash: row.password_hash,
            role,
            team_id: row.team_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct TeamRow {
    id: Uuid,
    name: String,
    description: String,
    admin_id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<TeamRow> for Team {
    fn from(row: TeamRow) -> Self {
        Team {
            id: row.id,
            name: row.name,
            description: row.description,
            admin_id: row.admin_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ProjectRow {
    id: Uuid,
    name: String,
    description: String,
    team_id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProjectRow> for Project {
    fn from(row: ProjectRow) -> Self {
        Project {
            id: row.id,
            name: row.name,
            description: row.description,
            team_id: row.team_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct TaskRow {
    id: Uuid,
    title: String,
    description: String,
    status: String,
    project_id: Uuid,
    assigned_to: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<TaskRow> for Task {
    type Error = StoreError;

    fn try_from(row: TaskRow) -> Result<Self, Self::Error> {
        let status = row.status.parse().map_err(|_| {
            StoreError::Corrupt(format!("task {} has status {:?}", row.id, row.status))
        })?;
        Ok(Task {
            id: row.id,
            title: row.title,
            description: row.description,
            status,
            project_id: row.project_id,
            assigned_to: row.assigned_to,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct MessageRow {
    id: Uuid,
    content: String,
    sender_id: Uuid,
    team_id: Uuid,
    timestamp: DateTime<Utc>,
}

impl From<MessageRow> for Message {
    fn from(row: MessageRow) -> Self {
        Message {
            id: row.id,
            content: row.content,
            sender_id: row.sender_id,
            team_id: row.team_id,
            timestamp: row.timestamp,
        }
    }
}

/// Map a unique-constraint violation to `StoreError::Duplicate`
fn unique_violation(err: sqlx::Error, field: &str) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::Duplicate {
            field: field.to_string(),
        },
        _ => StoreError::Database(err),
    }
}

/// PostgreSQL-backed repository
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Repository for PgStore {
    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(User::try_from).transpose()
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        row.map(User::try_from).transpose()
    }

    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        let now = Utc::now();
        let sql = format!(
            r#"
            INSERT INTO users (id, email, name, password_hash, role, team_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
            RETURNING {}
            "#,
            USER_COLUMNS
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(&user.email)
            .bind(&user.name)
            .bind(&user.password_hash)
            .bind(user.role.as_str())
            .bind(user.team_id)
            .bind(now)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| unique_violation(e, "email"))?;
        User::try_from(row)
    }

    async fn set_user_team(&self, user_id: Uuid, team_id: Uuid) -> StoreResult<Option<User>> {
        let sql = format!(
            "UPDATE users SET team_id = $1, updated_at = $2 WHERE id = $3 RETURNING {}",
            USER_COLUMNS
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(team_id)
            .bind(Utc::now())
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(User::try_from).transpose()
    }

    async fn find_team_by_id(&self, id: Uuid) -> StoreResult<Option<Team>> {
        let sql = format!("SELECT {} FROM teams WHERE id = $1", TEAM_COLUMNS);
        let row = sqlx::query_as::<_, TeamRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Team::from))
    }

    async fn create_team(&self, team: NewTeam) -> StoreResult<Team> {
        let sql = format!(
            r#"
            INSERT INTO teams (id, name, description, admin_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $5)
            RETURNING {}
            "#,
            TEAM_COLUMNS
        );
        let row = sqlx::query_as::<_, TeamRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(&team.name)
            .bind(&team.description)
            .bind(team.admin_id)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await?;
        Ok(row.into())
    }

    async fn find_project_by_id(&self, id: Uuid) -> StoreResult<Option<Project>> {
        let sql = format!("SELECT {} FROM projects WHERE id = $1", PROJECT_COLUMNS);
        let row = sqlx::query_as::<_, ProjectRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Project::from))
    }

    async fn find_projects(&self, filter: ProjectFilter) -> StoreResult<Vec<Project>> {
        let sql = format!(
            r#"
            SELECT {}
            FROM projects
            WHERE ($1::uuid IS NULL OR team_id = $1)
            ORDER BY created_at DESC
            "#,
            PROJECT_COLUMNS
        );
        let rows = sqlx::query_as::<_, ProjectRow>(&sql)
            .bind(filter.team_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Project::from).collect())
    }

    async fn create_project(&self, project: NewProject) -> StoreResult<Project> {
        let sql = format!(
            r#"
            INSERT INTO projects (id, name, description, team_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $5)
            RETURNING {}
            "#,
            PROJECT_COLUMNS
        );
        let row = sqlx::query_as::<_, ProjectRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(&project.name)
            .bind(&project.description)
            .bind(project.team_id)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await?;
        Ok(row.into())
    }

    async fn update_project(&self, id: Uuid, patch: ProjectPatch) -> StoreResult<Option<Project>> {
        let sql = format!(
            r#"
            UPDATE projects
            SET name = COALESCE($1, name),
                description = COALESCE($2, description),
                updated_at = $3
            WHERE id = $4
            RETURNING {}
            "#,
            PROJECT_COLUMNS
        );
        let row = sqlx::query_as::<_, ProjectRow>(&sql)
            .bind(patch.name)
            .bind(patch.description)
            .bind(Utc::now())
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Project::from))
    }

    async fn delete_project(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_task_by_id(&self, id: Uuid) -> StoreResult<Option<Task>> {
        let sql = format!("SELECT {} FROM tasks WHERE id = $1", TASK_COLUMNS);
        let row = sqlx::query_as::<_, TaskRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Task::try_from).transpose()
    }

    async fn find_tasks(&self, filter: TaskFilter) -> StoreResult<Vec<Task>> {
        let sql = format!(
            r#"
            SELECT {}
            FROM tasks
            WHERE ($1::uuid[] IS NULL OR project_id = ANY($1))
              AND ($2::uuid IS NULL OR assigned_to = $2)
            ORDER BY created_at DESC
            "#,
            TASK_COLUMNS
        );
        let rows = sqlx::query_as::<_, TaskRow>(&sql)
            .bind(filter.project_ids)
            .bind(filter.assigned_to)
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(Task::try_from).collect()
    }

    async fn create_task(&self, task: NewTask) -> StoreResult<Task> {
        let sql = format!(
            r#"
            INSERT INTO tasks (id, title, description, status, project_id, assigned_to, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
            RETURNING {}
            "#,
            TASK_COLUMNS
        );
        let row = sqlx::query_as::<_, TaskRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(&task.title)
            .bind(&task.description)
            .bind(task.status.as_str())
            .bind(task.project_id)
            .bind(task.assigned_to)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await?;
        Task::try_from(row)
    }

    async fn update_task(&self, id: Uuid, patch: TaskPatch) -> StoreResult<Option<Task>> {
        let sql = format!(
            r#"
            UPDATE tasks
            SET title = COALESCE($1, title),
                description = COALESCE($2, description),
                status = COALESCE($3, status),
                assigned_to = CASE WHEN $4 THEN $5 ELSE assigned_to END,
                updated_at = $6
            WHERE id = $7
            RETURNING {}
            "#,
            TASK_COLUMNS
        );
        let row = sqlx::query_as::<_, TaskRow>(&sql)
            .bind(patch.title)
            .bind(patch.description)
            .bind(patch.status.map(|s| s.as_str()))
            .bind(patch.assigned_to.is_some())
            .bind(patch.assigned_to.flatten())
            .bind(Utc::now())
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Task::try_from).transpose()
    }

    async fn delete_task(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn create_message(&self, message: NewMessage) -> StoreResult<Message> {
        let sql = format!(
            r#"
            INSERT INTO messages (id, content, sender_id, team_id, timestamp)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            MESSAGE_COLUMNS
        );
        let row = sqlx::query_as::<_, MessageRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(&message.content)
            .bind(message.sender_id)
            .bind(message.team_id)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await?;
        Ok(row.into())
    }

    async fn find_messages(&self, team_id: Uuid, limit: u32) -> StoreResult<Vec<Message>> {
        let sql = format!(
            r#"
            SELECT {cols}
            FROM (
                SELECT {cols}
                FROM messages
                WHERE team_id = $1
                ORDER BY timestamp DESC
                LIMIT $2
            ) AS newest
            ORDER BY timestamp ASC
            "#,
            cols = MESSAGE_COLUMNS
        );
        let rows = sqlx::query_as::<_, MessageRow>(&sql)
            .bind(team_id)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Message::from).collect())
    }
}
