/**
 * Access Decisions
 *
 * This module answers "may this identity perform this action on this
 * entity?" for every team, project, task and message operation.
 *
 * # Decision Table
 *
 * `decide` is a single `match` over `(role, action)`. Handlers never branch
 * on roles themselves; they build an `Action` describing the target (with
 * every related record already loaded) and act on the returned `Decision`.
 *
 * | Action               | Allowed when                                                  |
 * |----------------------|---------------------------------------------------------------|
 * | `CreateTeam`         | role is ADMIN                                                 |
 * | `CreateProject`      | ADMIN/MANAGER of the target team                              |
 * | `UpdateProject`      | ADMIN/MANAGER of the project's team                           |
 * | `DeleteProject`      | ADMIN/MANAGER of the project's team                           |
 * | `ReadProjects`       | member of the queried team                                    |
 * | `ReadTasks`          | member of the project's team                                  |
 * | `CreateTask`         | ADMIN/MANAGER of the project's team; only a MANAGER assigns   |
 * | `UpdateTask`         | MEMBER: task assigned to them. ADMIN/MANAGER: same team, and  |
 * |                      | only a MANAGER reassigns                                      |
 * | `DeleteTask`         | ADMIN of the task's team                                      |
 * | `SendMessage`        | member of the message's team                                  |
 * | `ReadMessages`       | member of the queried team                                    |
 * | `JoinTeamRoom`       | member of the room's team                                     |
 *
 * Checks run in order role, then team, then assignment; the first failing
 * check produces the denial reason.
 *
 * Missing records are not this module's concern: callers resolve them to a
 * not-found error before building an `Action`.
 */
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::model::{Project, Role, Task, User};

/// The acting principal, resolved from a verified credential plus the
/// stored user record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub user_id: Uuid,
    pub role: Role,
    pub team_id: Option<Uuid>,
}

impl Identity {
    pub fn from_user(user: &User) -> Self {
        Self {
            user_id: user.id,
            role: user.role,
            team_id: user.team_id,
        }
    }

    /// True when the identity belongs to `team_id`. A missing team on
    /// either side never matches.
    pub fn belongs_to(&self, team_id: Option<Uuid>) -> bool {
        matches!((self.team_id, team_id), (Some(mine), Some(theirs)) if mine == theirs)
    }
}

/// An operation to be authorized, with its target already loaded
#[derive(Debug, Clone, Copy)]
pub enum Action<'a> {
    CreateTeam,
    CreateProject {
        team_id: Uuid,
    },
    UpdateProject {
        project: &'a Project,
    },
    DeleteProject {
        project: &'a Project,
    },
    ReadProjects {
        team_id: Uuid,
    },
    ReadTasks {
        project: &'a Project,
    },
    CreateTask {
        project: &'a Project,
        assignee: Option<&'a User>,
    },
    UpdateTask {
        task: &'a Task,
        /// Team of the task's project, `None` if the project is gone
        team_id: Option<Uuid>,
        /// `None` leaves the assignee untouched, `Some(None)` clears it
        reassignment: Option<Option<&'a User>>,
    },
    DeleteTask {
        task: &'a Task,
        team_id: Option<Uuid>,
    },
    SendMessage {
        team_id: Uuid,
    },
    ReadMessages {
        team_id: Uuid,
    },
    JoinTeamRoom {
        team_id: Uuid,
    },
}

/// Outcome of an access check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(String),
}

impl Decision {
    pub fn deny(reason: impl Into<String>) -> Self {
        Decision::Deny(reason.into())
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    /// Evaluate `next` only if this decision allows.
    pub fn and_then(self, next: impl FnOnce() -> Decision) -> Decision {
        match self {
            Decision::Allow => next(),
            denied => denied,
        }
    }

    /// Convert into a `Result` carrying the denial reason.
    pub fn into_result(self) -> Result<(), String> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Deny(reason) => Err(reason),
        }
    }
}

/// Decide whether `identity` may perform `action`.
///
/// Pure and synchronous: neither argument is mutated and no I/O happens.
pub fn decide(identity: &Identity, action: &Action<'_>) -> Decision {
    match (identity.role, *action) {
        (Role::Admin, Action::CreateTeam) => Decision::Allow,
        (_, Action::CreateTeam) => Decision::deny("Only admins can create teams"),

        (Role::Member, Action::CreateProject { .. })
        | (Role::Member, Action::UpdateProject { .. })
        | (Role::Member, Action::DeleteProject { .. }) => {
            Decision::deny("Only admins and managers can manage projects")
        }
        (_, Action::CreateProject { team_id }) => same_team(
            identity,
            Some(team_id),
            "You can only create projects for your own team",
        ),
        (_, Action::UpdateProject { project }) => same_team(
            identity,
            Some(project.team_id),
            "You can only update projects in your own team",
        ),
        (_, Action::DeleteProject { project }) => same_team(
            identity,
            Some(project.team_id),
            "You can only delete projects in your own team",
        ),
        (_, Action::ReadProjects { team_id }) => same_team(
            identity,
            Some(team_id),
            "You do not have access to this team's projects",
        ),

        (_, Action::ReadTasks { project }) => same_team(
            identity,
            Some(project.team_id),
            "You do not have access to this project's tasks",
        ),
        (Role::Member, Action::CreateTask { .. }) => {
            Decision::deny("Only admins and managers can create tasks")
        }
        (role, Action::CreateTask { project, assignee }) => same_team(
            identity,
            Some(project.team_id),
            "You can only create tasks in your team's projects",
        )
        .and_then(|| match assignee {
            None => Decision::Allow,
            Some(user) => assignment(role, user, Some(project.team_id)),
        }),
        (Role::Member, Action::UpdateTask { task, .. }) => {
            if task.assigned_to == Some(identity.user_id) {
                Decision::Allow
            } else {
                Decision::deny("You can only update tasks assigned to you")
            }
        }
        (role, Action::UpdateTask { team_id, reassignment, .. }) => same_team(
            identity,
            team_id,
            "You can only update tasks in your team's projects",
        )
        .and_then(|| match reassignment {
            None => Decision::Allow,
            Some(None) => only_manager_assigns(role),
            Some(Some(user)) => assignment(role, user, team_id),
        }),
        (Role::Admin, Action::DeleteTask { team_id, .. }) => same_team(
            identity,
            team_id,
            "You can only delete tasks in your team's projects",
        ),
        (_, Action::DeleteTask { .. }) => Decision::deny("Only admins can delete tasks"),

        (_, Action::SendMessage { team_id }) => same_team(
            identity,
            Some(team_id),
            "You can only send messages to your own team",
        ),
        (_, Action::ReadMessages { team_id }) => same_team(
            identity,
            Some(team_id),
            "You can only view messages from your own team",
        ),
        (_, Action::JoinTeamRoom { team_id }) => same_team(
            identity,
            Some(team_id),
            "You can only join your own team's room",
        ),
    }
}

fn same_team(identity: &Identity, team_id: Option<Uuid>, reason: &str) -> Decision {
    if identity.belongs_to(team_id) {
        Decision::Allow
    } else {
        Decision::deny(reason)
    }
}

fn only_manager_assigns(role: Role) -> Decision {
    match role {
        Role::Manager => Decision::Allow,
        _ => Decision::deny("Only managers can assign tasks"),
    }
}

fn assignment(role: Role, assignee: &User, team_id: Option<Uuid>) -> Decision {
    only_manager_assigns(role).and_then(|| {
        if assignee.role != Role::Member {
            Decision::deny("Tasks can only be assigned to members")
        } else if assignee.team_id.is_none() || assignee.team_id != team_id {
            Decision::deny("Cannot assign task to user outside the team")
        } else {
            Decision::Allow
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::model::TaskStatus;
    use chrono::Utc;

    fn user(role: Role, team_id: Option<Uuid>) -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            email: format!("{}@example.com", Uuid::new_v4()),
            name: "Test".to_string(),
            password_hash: String::new(),
            role,
            team_id,
            created_at: now,
            updated_at: now,
        }
    }

    fn project(team_id: Uuid) -> Project {
        let now = Utc::now();
        Project {
            id: Uuid::new_v4(),
            name: "Roadmap".to_string(),
            description: String::new(),
            team_id,
            created_at: now,
            updated_at: now,
        }
    }

    fn task(project_id: Uuid, assigned_to: Option<Uuid>) -> Task {
        let now = Utc::now();
        Task {
            id: Uuid::new_v4(),
            title: "Ship it".to_string(),
            description: String::new(),
            status: TaskStatus::Todo,
            project_id,
            assigned_to,
            created_at: now,
            updated_at: now,
        }
    }

    fn identity(user: &User) -> Identity {
        Identity::from_user(user)
    }

    #[test]
    fn test_only_admin_creates_teams() {
        let admin = user(Role::Admin, None);
        let manager = user(Role::Manager, None);
        assert_eq!(decide(&identity(&admin), &Action::CreateTeam), Decision::Allow);
        assert!(!decide(&identity(&manager), &Action::CreateTeam).is_allowed());
    }

    #[test]
    fn test_project_management_requires_role_and_team() {
        let team = Uuid::new_v4();
        let p = project(team);
        let manager = user(Role::Manager, Some(team));
        let outsider = user(Role::Manager, Some(Uuid::new_v4()));
        let member = user(Role::Member, Some(team));

        assert!(decide(&identity(&manager), &Action::CreateProject { team_id: team }).is_allowed());
        assert!(decide(&identity(&manager), &Action::DeleteProject { project: &p }).is_allowed());
        assert_eq!(
            decide(&identity(&outsider), &Action::UpdateProject { project: &p }),
            Decision::deny("You can only update projects in your own team")
        );
        assert_eq!(
            decide(&identity(&member), &Action::CreateProject { team_id: team }),
            Decision::deny("Only admins and managers can manage projects")
        );
    }

    #[test]
    fn test_manager_cannot_assign_non_member() {
        let team = Uuid::new_v4();
        let p = project(team);
        let manager = user(Role::Manager, Some(team));
        let other_manager = user(Role::Manager, Some(team));

        let decision = decide(
            &identity(&manager),
            &Action::CreateTask { project: &p, assignee: Some(&other_manager) },
        );
        assert_eq!(decision, Decision::deny("Tasks can only be assigned to members"));
    }

    #[test]
    fn test_admin_cannot_assign_on_create() {
        let team = Uuid::new_v4();
        let p = project(team);
        let admin = user(Role::Admin, Some(team));
        let member = user(Role::Member, Some(team));

        let decision = decide(
            &identity(&admin),
            &Action::CreateTask { project: &p, assignee: Some(&member) },
        );
        assert_eq!(decision, Decision::deny("Only managers can assign tasks"));

        let unassigned = decide(&identity(&admin), &Action::CreateTask { project: &p, assignee: None });
        assert!(unassigned.is_allowed());
    }

    #[test]
    fn test_manager_assigns_member_of_same_team_only() {
        let team = Uuid::new_v4();
        let p = project(team);
        let manager = user(Role::Manager, Some(team));
        let member = user(Role::Member, Some(team));
        let foreign_member = user(Role::Member, Some(Uuid::new_v4()));

        assert!(decide(
            &identity(&manager),
            &Action::CreateTask { project: &p, assignee: Some(&member) }
        )
        .is_allowed());
        assert_eq!(
            decide(
                &identity(&manager),
                &Action::CreateTask { project: &p, assignee: Some(&foreign_member) }
            ),
            Decision::deny("Cannot assign task to user outside the team")
        );
    }

    #[test]
    fn test_member_updates_only_own_task() {
        let team = Uuid::new_v4();
        let member = user(Role::Member, Some(team));
        let mine = task(Uuid::new_v4(), Some(member.id));
        let theirs = task(Uuid::new_v4(), Some(Uuid::new_v4()));
        let unassigned = task(Uuid::new_v4(), None);

        let allowed = decide(
            &identity(&member),
            &Action::UpdateTask { task: &mine, team_id: Some(team), reassignment: None },
        );
        assert!(allowed.is_allowed());

        for other in [&theirs, &unassigned] {
            let denied = decide(
                &identity(&member),
                &Action::UpdateTask { task: other, team_id: Some(team), reassignment: None },
            );
            assert_eq!(denied, Decision::deny("You can only update tasks assigned to you"));
        }
    }

    #[test]
    fn test_reassignment_is_manager_only() {
        let team = Uuid::new_v4();
        let admin = user(Role::Admin, Some(team));
        let manager = user(Role::Manager, Some(team));
        let member = user(Role::Member, Some(team));
        let t = task(Uuid::new_v4(), None);

        let by_admin = decide(
            &identity(&admin),
            &Action::UpdateTask { task: &t, team_id: Some(team), reassignment: Some(Some(&member)) },
        );
        assert_eq!(by_admin, Decision::deny("Only managers can assign tasks"));

        let clear_by_admin = decide(
            &identity(&admin),
            &Action::UpdateTask { task: &t, team_id: Some(team), reassignment: Some(None) },
        );
        assert!(!clear_by_admin.is_allowed());

        let by_manager = decide(
            &identity(&manager),
            &Action::UpdateTask { task: &t, team_id: Some(team), reassignment: Some(Some(&member)) },
        );
        assert!(by_manager.is_allowed());

        let plain_admin_edit = decide(
            &identity(&admin),
            &Action::UpdateTask { task: &t, team_id: Some(team), reassignment: None },
        );
        assert!(plain_admin_edit.is_allowed());
    }

    #[test]
    fn test_update_denied_for_teamless_task_unless_member_assignee() {
        let team = Uuid::new_v4();
        let manager = user(Role::Manager, Some(team));
        let member = user(Role::Member, Some(team));
        let orphan = task(Uuid::new_v4(), Some(member.id));

        let manager_decision = decide(
            &identity(&manager),
            &Action::UpdateTask { task: &orphan, team_id: None, reassignment: None },
        );
        assert!(!manager_decision.is_allowed());

        let member_decision = decide(
            &identity(&member),
            &Action::UpdateTask { task: &orphan, team_id: None, reassignment: None },
        );
        assert!(member_decision.is_allowed());
    }

    #[test]
    fn test_delete_task_is_admin_only() {
        let team = Uuid::new_v4();
        let admin = user(Role::Admin, Some(team));
        let manager = user(Role::Manager, Some(team));
        let foreign_admin = user(Role::Admin, Some(Uuid::new_v4()));
        let t = task(Uuid::new_v4(), None);

        assert!(decide(&identity(&admin), &Action::DeleteTask { task: &t, team_id: Some(team) })
            .is_allowed());
        assert_eq!(
            decide(&identity(&manager), &Action::DeleteTask { task: &t, team_id: Some(team) }),
            Decision::deny("Only admins can delete tasks")
        );
        assert!(!decide(&identity(&foreign_admin), &Action::DeleteTask { task: &t, team_id: Some(team) })
            .is_allowed());
    }

    #[test]
    fn test_messages_are_team_scoped() {
        let team = Uuid::new_v4();
        let member = user(Role::Member, Some(team));
        let teamless = user(Role::Member, None);

        assert!(decide(&identity(&member), &Action::SendMessage { team_id: team }).is_allowed());
        assert_eq!(
            decide(&identity(&member), &Action::SendMessage { team_id: Uuid::new_v4() }),
            Decision::deny("You can only send messages to your own team")
        );
        assert!(!decide(&identity(&teamless), &Action::ReadMessages { team_id: team }).is_allowed());
    }

    #[test]
    fn test_decision_into_result() {
        assert_eq!(Decision::Allow.into_result(), Ok(()));
        assert_eq!(Decision::deny("nope").into_result(), Err("nope".to_string()));
    }
}
