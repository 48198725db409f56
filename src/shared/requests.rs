/**
 * Request Payloads
 *
 * Typed request bodies and query strings for every API operation, together
 * with their field-level validation rules.
 *
 * # Validation
 *
 * Each payload implements `Validate`. Validation runs before any handler
 * logic and collects every failing field rather than stopping at the
 * first one, so a client gets the full list in a single 400 response.
 *
 * # Optional vs. Nullable
 *
 * On task updates `assignedTo` distinguishes three states:
 * - absent: leave the assignee unchanged (`None`)
 * - `null`: clear the assignee (`Some(None)`)
 * - an id: reassign (`Some(Some(id))`)
 */
use serde::{Deserialize, Deserializer};
use uuid::Uuid;

use crate::shared::error::SharedError;
use crate::shared::model::{Role, TaskStatus};

/// Field-level validation for request payloads
pub trait Validate {
    /// Check every field, returning all failures at once.
    fn validate(&self) -> Result<(), Vec<SharedError>>;
}

/// Accumulates validation failures for a single payload
#[derive(Debug, Default)]
struct Checks {
    errors: Vec<SharedError>,
}

impl Checks {
    fn fail(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(SharedError::validation(field, message));
    }

    fn length(&mut self, field: &str, value: &str, min: usize, max: usize, label: &str) {
        let len = value.trim().chars().count();
        if len == 0 && min > 0 {
            self.fail(field, format!("{} is required", label));
        } else if len < min {
            self.fail(field, format!("{} must be at least {} characters", label, min));
        } else if len > max {
            self.fail(field, format!("{} cannot exceed {} characters", label, max));
        }
    }

    fn max_length(&mut self, field: &str, value: &str, max: usize, label: &str) {
        if value.trim().chars().count() > max {
            self.fail(field, format!("{} cannot exceed {} characters", label, max));
        }
    }

    fn finish(self) -> Result<(), Vec<SharedError>> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}

fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain
                    .split_once('.')
                    .map(|(host, tld)| !host.is_empty() && !tld.is_empty())
                    .unwrap_or(false)
        }
        None => false,
    }
}

/// Deserialize a present field (including `null`) as `Some(value)`.
///
/// Combined with `#[serde(default)]`, an absent field stays `None`.
fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub name: String,
    pub password: String,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub team_id: Option<Uuid>,
}

impl Validate for RegisterRequest {
    fn validate(&self) -> Result<(), Vec<SharedError>> {
        let mut checks = Checks::default();
        if !is_valid_email(&self.email) {
            checks.fail("email", "Please provide a valid email");
        }
        checks.length("name", &self.name, 2, 50, "Name");
        if self.password.chars().count() < 6 {
            checks.fail("password", "Password must be at least 6 characters");
        }
        checks.finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl Validate for LoginRequest {
    fn validate(&self) -> Result<(), Vec<SharedError>> {
        let mut checks = Checks::default();
        if !is_valid_email(&self.email) {
            checks.fail("email", "Please provide a valid email");
        }
        if self.password.is_empty() {
            checks.fail("password", "Password is required");
        }
        checks.finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTeamRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl Validate for CreateTeamRequest {
    fn validate(&self) -> Result<(), Vec<SharedError>> {
        let mut checks = Checks::default();
        checks.length("name", &self.name, 2, 100, "Team name");
        if let Some(description) = &self.description {
            checks.max_length("description", description, 500, "Description");
        }
        checks.finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub team_id: Uuid,
}

impl Validate for CreateProjectRequest {
    fn validate(&self) -> Result<(), Vec<SharedError>> {
        let mut checks = Checks::default();
        checks.length("name", &self.name, 3, 100, "Project name");
        if let Some(description) = &self.description {
            checks.max_length("description", description, 500, "Description");
        }
        checks.finish()
    }
}

/// Partial project update. A project never moves between teams, so any
/// `teamId` in the body is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl Validate for UpdateProjectRequest {
    fn validate(&self) -> Result<(), Vec<SharedError>> {
        let mut checks = Checks::default();
        if self.name.is_none() && self.description.is_none() {
            checks.fail("body", "At least one field must be provided");
        }
        if let Some(name) = &self.name {
            checks.length("name", name, 3, 100, "Project name");
        }
        if let Some(description) = &self.description {
            checks.max_length("description", description, 500, "Description");
        }
        checks.finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<TaskStatus>,
    pub project_id: Uuid,
    #[serde(default)]
    pub assigned_to: Option<Uuid>,
}

impl Validate for CreateTaskRequest {
    fn validate(&self) -> Result<(), Vec<SharedError>> {
        let mut checks = Checks::default();
        checks.length("title", &self.title, 3, 200, "Task title");
        if let Some(description) = &self.description {
            checks.max_length("description", description, 1000, "Description");
        }
        checks.finish()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<TaskStatus>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub assigned_to: Option<Option<Uuid>>,
}

impl Validate for UpdateTaskRequest {
    fn validate(&self) -> Result<(), Vec<SharedError>> {
        let mut checks = Checks::default();
        if self.title.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.assigned_to.is_none()
        {
            checks.fail("body", "At least one field must be provided");
        }
        if let Some(title) = &self.title {
            checks.length("title", title, 3, 200, "Task title");
        }
        if let Some(description) = &self.description {
            checks.max_length("description", description, 1000, "Description");
        }
        checks.finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub content: String,
    #[serde(default)]
    pub team_id: Option<Uuid>,
}

impl Validate for SendMessageRequest {
    fn validate(&self) -> Result<(), Vec<SharedError>> {
        let mut checks = Checks::default();
        let len = self.content.trim().chars().count();
        if len == 0 {
            checks.fail("content", "Message cannot be empty");
        } else if len > 2000 {
            checks.fail("content", "Message cannot exceed 2000 characters");
        }
        checks.finish()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectQuery {
    #[serde(default)]
    pub team_id: Option<Uuid>,
}

impl Validate for ProjectQuery {
    fn validate(&self) -> Result<(), Vec<SharedError>> {
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskQuery {
    #[serde(default)]
    pub project_id: Option<Uuid>,
}

impl Validate for TaskQuery {
    fn validate(&self) -> Result<(), Vec<SharedError>> {
        Ok(())
    }
}

/// Default page size for message history
pub const DEFAULT_MESSAGE_LIMIT: u32 = 50;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageQuery {
    #[serde(default)]
    pub team_id: Option<Uuid>,
    #[serde(default)]
    pub limit: Option<u32>,
}

impl MessageQuery {
    pub fn limit(&self) -> u32 {
        self.limit.unwrap_or(DEFAULT_MESSAGE_LIMIT)
    }
}

impl Validate for MessageQuery {
    fn validate(&self) -> Result<(), Vec<SharedError>> {
        let mut checks = Checks::default();
        if let Some(limit) = self.limit {
            if !(1..=100).contains(&limit) {
                checks.fail("limit", "Limit must be between 1 and 100");
            }
        }
        checks.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn messages(result: Result<(), Vec<SharedError>>) -> Vec<String> {
        result
            .err()
            .unwrap_or_default()
            .iter()
            .map(|e| e.field_message().to_string())
            .collect()
    }

    #[test]
    fn test_email_rules() {
        assert!(is_valid_email("ada@example.com"));
        assert!(!is_valid_email("ada@example"));
        assert!(!is_valid_email("ada.example.com"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("ada @example.com"));
    }

    #[test]
    fn test_register_collects_every_failure() {
        let request = RegisterRequest {
            email: "nope".to_string(),
            name: "A".to_string(),
            password: "123".to_string(),
            role: None,
            team_id: None,
        };
        assert_eq!(
            messages(request.validate()),
            vec![
                "Please provide a valid email".to_string(),
                "Name must be at least 2 characters".to_string(),
                "Password must be at least 6 characters".to_string(),
            ]
        );
    }

    #[test]
    fn test_task_title_bounds() {
        let mut request = CreateTaskRequest {
            title: "ab".to_string(),
            description: None,
            status: None,
            project_id: Uuid::new_v4(),
            assigned_to: None,
        };
        assert_eq!(
            messages(request.validate()),
            vec!["Task title must be at least 3 characters".to_string()]
        );
        request.title = "x".repeat(201);
        assert_eq!(
            messages(request.validate()),
            vec!["Task title cannot exceed 200 characters".to_string()]
        );
        request.title = "abc".to_string();
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_assigned_to_tri_state() {
        let absent: UpdateTaskRequest = serde_json::from_str(r#"{"status":"done"}"#).unwrap();
        assert_eq!(absent.assigned_to, None);

        let cleared: UpdateTaskRequest = serde_json::from_str(r#"{"assignedTo":null}"#).unwrap();
        assert_eq!(cleared.assigned_to, Some(None));

        let id = Uuid::new_v4();
        let set: UpdateTaskRequest =
            serde_json::from_str(&format!(r#"{{"assignedTo":"{}"}}"#, id)).unwrap();
        assert_eq!(set.assigned_to, Some(Some(id)));
    }

    #[test]
    fn test_empty_update_rejected() {
        let request = UpdateTaskRequest::default();
        assert_eq!(
            messages(request.validate()),
            vec!["At least one field must be provided".to_string()]
        );
        assert!(UpdateProjectRequest::default().validate().is_err());
    }

    #[test]
    fn test_project_update_ignores_team_id() {
        let request: UpdateProjectRequest =
            serde_json::from_str(r#"{"name":"Renamed","teamId":"00000000-0000-0000-0000-000000000000"}"#)
                .unwrap();
        assert_eq!(request.name.as_deref(), Some("Renamed"));
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_message_content_trimmed() {
        let request = SendMessageRequest { content: "   ".to_string(), team_id: None };
        assert_eq!(messages(request.validate()), vec!["Message cannot be empty".to_string()]);
    }

    #[test]
    fn test_message_limit_bounds() {
        let query = MessageQuery { team_id: None, limit: Some(0) };
        assert!(query.validate().is_err());
        let query = MessageQuery { team_id: None, limit: Some(100) };
        assert!(query.validate().is_ok());
        assert_eq!(MessageQuery::default().limit(), 50);
    }
}
