//! Common test utilities and helpers
//!
//! Builds an in-memory world of teams, projects and users so command and
//! route tests run without a database.

#![allow(dead_code)]

use std::sync::Arc;

use teamcollab::backend::realtime::FanoutHub;
use teamcollab::backend::server::SharedStore;
use teamcollab::backend::store::{MemoryStore, NewProject, NewTask, NewTeam, NewUser, Repository};
use teamcollab::shared::access::Identity;
use teamcollab::shared::model::{Project, Role, Task, Team, User};
use uuid::Uuid;

/// Test fixture
pub struct World {
    pub store: MemoryStore,
    pub hub: FanoutHub,
}

impl World {
    pub fn new() -> Self {
        Self {
            store: MemoryStore::new(),
            hub: FanoutHub::new(),
        }
    }

    pub fn shared_store(&self) -> SharedStore {
        Arc::new(self.store.clone())
    }

    pub async fn user(&self, name: &str, role: Role, team_id: Option<Uuid>) -> User {
        self.store
            .create_user(NewUser {
                email: format!("{}_{}@example.com", name.to_lowercase(), Uuid::new_v4()),
                name: name.to_string(),
                password_hash: "not-a-real-hash".to_string(),
                role,
                team_id,
            })
            .await
            .expect("create user")
    }

    pub async fn team(&self, name: &str) -> Team {
        self.store
            .create_team(NewTeam {
                name: name.to_string(),
                description: String::new(),
                admin_id: Uuid::new_v4(),
            })
            .await
            .expect("create team")
    }

    pub async fn project(&self, team_id: Uuid) -> Project {
        self.store
            .create_project(NewProject {
                name: "Launch".to_string(),
                description: String::new(),
                team_id,
            })
            .await
            .expect("create project")
    }

    pub async fn task(&self, project_id: Uuid, assigned_to: Option<Uuid>) -> Task {
        self.store
            .create_task(NewTask {
                title: "Write docs".to_string(),
                description: String::new(),
                status: Default::default(),
                project_id,
                assigned_to,
            })
            .await
            .expect("create task")
    }
}

/// A team with one user of each role and one project
pub struct Team3 {
    pub team: Team,
    pub project: Project,
    pub admin: User,
    pub manager: User,
    pub member: User,
}

impl Team3 {
    pub async fn build(world: &World, name: &str) -> Self {
        let team = world.team(name).await;
        let project = world.project(team.id).await;
        let admin = world.user("Admin", Role::Admin, Some(team.id)).await;
        let manager = world.user("Manager", Role::Manager, Some(team.id)).await;
        let member = world.user("Member", Role::Member, Some(team.id)).await;
        Self {
            team,
            project,
            admin,
            manager,
            member,
        }
    }
}

pub fn id(user: &User) -> Identity {
    Identity::from_user(user)
}

/// Create authorization header value
pub fn auth_header(token: &str) -> String {
    format!("Bearer {}", token)
}
