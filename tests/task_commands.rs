//! Task command integration tests
//!
//! Runs the task commands against the in-memory store with a live fan-out
//! hub, checking access rules, field filtering and published events.

#![cfg(feature = "ssr")]

mod common;

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use teamcollab::backend::tasks::commands::{create_task, delete_task, list_tasks, update_task};
use teamcollab::backend::store::Repository;
use teamcollab::shared::model::{Role, TaskStatus};
use teamcollab::shared::requests::{CreateTaskRequest, TaskQuery, UpdateTaskRequest};
use teamcollab::shared::EventType;

use common::{id, Team3, World};

fn new_task(project_id: uuid::Uuid, assigned_to: Option<uuid::Uuid>) -> CreateTaskRequest {
    CreateTaskRequest {
        title: "Prepare demo".to_string(),
        description: Some("Slides and script".to_string()),
        status: None,
        project_id,
        assigned_to,
    }
}

#[tokio::test]
async fn test_manager_creates_and_assigns_member() {
    let world = World::new();
    let t = Team3::build(&world, "Core").await;
    let (conn, mut rx) = world.hub.connect(t.member.id);
    world.hub.join(conn, t.team.id);

    let view = create_task(
        &world.store,
        &world.hub,
        &id(&t.manager),
        new_task(t.project.id, Some(t.member.id)),
    )
    .await
    .unwrap();

    assert_eq!(view.task.assigned_to, Some(t.member.id));
    assert_eq!(view.task.status, TaskStatus::Todo);
    assert_eq!(view.project.as_ref().map(|p| p.id), Some(t.project.id));
    assert_eq!(view.assignee.as_ref().map(|u| u.id), Some(t.member.id));

    let event = rx.try_recv().unwrap();
    assert_eq!(event.event, EventType::TaskUpdated);
    assert_eq!(event.data["id"], view.task.id.to_string());
}

#[tokio::test]
async fn test_manager_cannot_assign_non_member() {
    let world = World::new();
    let t = Team3::build(&world, "Core").await;

    for assignee in [&t.admin, &t.manager] {
        let err = create_task(
            &world.store,
            &world.hub,
            &id(&t.manager),
            new_task(t.project.id, Some(assignee.id)),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(err.message(), "Tasks can only be assigned to members");
    }
}

#[tokio::test]
async fn test_admin_cannot_assign_on_create() {
    let world = World::new();
    let t = Team3::build(&world, "Core").await;

    let err = create_task(
        &world.store,
        &world.hub,
        &id(&t.admin),
        new_task(t.project.id, Some(t.member.id)),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
    assert_eq!(err.message(), "Only managers can assign tasks");

    // Unassigned creation is fine
    let view = create_task(&world.store, &world.hub, &id(&t.admin), new_task(t.project.id, None))
        .await
        .unwrap();
    assert_eq!(view.task.assigned_to, None);
}

#[tokio::test]
async fn test_member_cannot_create_task() {
    let world = World::new();
    let t = Team3::build(&world, "Core").await;

    let err = create_task(&world.store, &world.hub, &id(&t.member), new_task(t.project.id, None))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_create_in_foreign_project_is_forbidden() {
    let world = World::new();
    let ours = Team3::build(&world, "Ours").await;
    let theirs = Team3::build(&world, "Theirs").await;

    let err = create_task(
        &world.store,
        &world.hub,
        &id(&ours.manager),
        new_task(theirs.project.id, None),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
    assert_eq!(err.message(), "You can only create tasks in your team's projects");
}

#[tokio::test]
async fn test_missing_project_and_assignee_are_not_found() {
    let world = World::new();
    let t = Team3::build(&world, "Core").await;

    let err = create_task(
        &world.store,
        &world.hub,
        &id(&t.manager),
        new_task(uuid::Uuid::new_v4(), None),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(err.message(), "Project not found");

    let err = create_task(
        &world.store,
        &world.hub,
        &id(&t.manager),
        new_task(t.project.id, Some(uuid::Uuid::new_v4())),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(err.message(), "Assignee not found");
}

#[tokio::test]
async fn test_member_update_persists_status_only() {
    let world = World::new();
    let t = Team3::build(&world, "Core").await;
    let task = world.task(t.project.id, Some(t.member.id)).await;

    let view = update_task(
        &world.store,
        &world.hub,
        &id(&t.member),
        task.id,
        UpdateTaskRequest {
            title: Some("x".to_string()),
            status: Some(TaskStatus::Done),
            ..UpdateTaskRequest::default()
        },
    )
    .await
    .unwrap();

    assert_eq!(view.task.status, TaskStatus::Done);
    assert_eq!(view.task.title, task.title);

    let stored = world.store.find_task_by_id(task.id).await.unwrap().unwrap();
    assert_eq!(stored.status, TaskStatus::Done);
    assert_eq!(stored.title, "Write docs");
}

#[tokio::test]
async fn test_member_cannot_update_unassigned_task() {
    let world = World::new();
    let t = Team3::build(&world, "Core").await;
    let other = world.user("Other", Role::Member, Some(t.team.id)).await;
    let task = world.task(t.project.id, Some(other.id)).await;

    let err = update_task(
        &world.store,
        &world.hub,
        &id(&t.member),
        task.id,
        UpdateTaskRequest {
            status: Some(TaskStatus::Done),
            ..UpdateTaskRequest::default()
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
    assert_eq!(err.message(), "You can only update tasks assigned to you");
}

#[tokio::test]
async fn test_member_cannot_reassign_by_payload() {
    let world = World::new();
    let t = Team3::build(&world, "Core").await;
    let task = world.task(t.project.id, Some(t.member.id)).await;

    let view = update_task(
        &world.store,
        &world.hub,
        &id(&t.member),
        task.id,
        UpdateTaskRequest {
            assigned_to: Some(None),
            status: Some(TaskStatus::InProgress),
            ..UpdateTaskRequest::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(view.task.assigned_to, Some(t.member.id));
    assert_eq!(view.task.status, TaskStatus::InProgress);
}

#[tokio::test]
async fn test_manager_reassigns_and_unassigns() {
    let world = World::new();
    let t = Team3::build(&world, "Core").await;
    let task = world.task(t.project.id, None).await;

    let assigned = update_task(
        &world.store,
        &world.hub,
        &id(&t.manager),
        task.id,
        UpdateTaskRequest {
            assigned_to: Some(Some(t.member.id)),
            ..UpdateTaskRequest::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(assigned.task.assigned_to, Some(t.member.id));

    let cleared = update_task(
        &world.store,
        &world.hub,
        &id(&t.manager),
        task.id,
        UpdateTaskRequest {
            assigned_to: Some(None),
            ..UpdateTaskRequest::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(cleared.task.assigned_to, None);

    let err = update_task(
        &world.store,
        &world.hub,
        &id(&t.admin),
        task.id,
        UpdateTaskRequest {
            assigned_to: Some(Some(t.member.id)),
            ..UpdateTaskRequest::default()
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_edit_echoing_current_assignee_is_allowed() {
    let world = World::new();
    let t = Team3::build(&world, "Core").await;
    let task = world.task(t.project.id, Some(t.member.id)).await;

    let view = update_task(
        &world.store,
        &world.hub,
        &id(&t.admin),
        task.id,
        UpdateTaskRequest {
            title: Some("Renamed title".to_string()),
            assigned_to: Some(Some(t.member.id)),
            ..UpdateTaskRequest::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(view.task.title, "Renamed title");
    assert_eq!(view.task.assigned_to, Some(t.member.id));

    let unassigned = world.task(t.project.id, None).await;
    let view = update_task(
        &world.store,
        &world.hub,
        &id(&t.admin),
        unassigned.id,
        UpdateTaskRequest {
            status: Some(TaskStatus::Done),
            assigned_to: Some(None),
            ..UpdateTaskRequest::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(view.task.status, TaskStatus::Done);
    assert_eq!(view.task.assigned_to, None);
}

#[tokio::test]
async fn test_update_missing_task_is_not_found() {
    let world = World::new();
    let t = Team3::build(&world, "Core").await;

    let err = update_task(
        &world.store,
        &world.hub,
        &id(&t.manager),
        uuid::Uuid::new_v4(),
        UpdateTaskRequest::default(),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(err.message(), "Task not found");
}

#[tokio::test]
async fn test_delete_is_admin_only() {
    let world = World::new();
    let t = Team3::build(&world, "Core").await;
    let task = world.task(t.project.id, None).await;
    let (conn, mut rx) = world.hub.connect(t.admin.id);
    world.hub.join(conn, t.team.id);

    let err = delete_task(&world.store, &world.hub, &id(&t.manager), task.id)
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
    assert_eq!(err.message(), "Only admins can delete tasks");

    delete_task(&world.store, &world.hub, &id(&t.admin), task.id)
        .await
        .unwrap();
    assert!(world.store.find_task_by_id(task.id).await.unwrap().is_none());

    let event = rx.try_recv().unwrap();
    assert_eq!(event.event, EventType::TaskDeleted);
    assert_eq!(event.data["id"], task.id.to_string());
    assert_eq!(event.data["projectId"], t.project.id.to_string());
}

#[tokio::test]
async fn test_admin_of_other_team_cannot_delete() {
    let world = World::new();
    let ours = Team3::build(&world, "Ours").await;
    let theirs = Team3::build(&world, "Theirs").await;
    let task = world.task(theirs.project.id, None).await;

    let err = delete_task(&world.store, &world.hub, &id(&ours.admin), task.id)
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
    assert!(world.store.find_task_by_id(task.id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_events_stay_in_team_room() {
    let world = World::new();
    let ours = Team3::build(&world, "Ours").await;
    let theirs = Team3::build(&world, "Theirs").await;

    let (our_conn, mut our_rx) = world.hub.connect(ours.member.id);
    world.hub.join(our_conn, ours.team.id);
    let (their_conn, mut their_rx) = world.hub.connect(theirs.member.id);
    world.hub.join(their_conn, theirs.team.id);

    create_task(&world.store, &world.hub, &id(&ours.admin), new_task(ours.project.id, None))
        .await
        .unwrap();

    assert!(our_rx.try_recv().is_ok());
    assert!(their_rx.try_recv().is_err());
}

#[tokio::test]
async fn test_orphan_task_update_broadcasts_to_everyone() {
    let world = World::new();
    let t = Team3::build(&world, "Core").await;
    let task = world.task(t.project.id, Some(t.member.id)).await;
    world.store.delete_project(t.project.id).await.unwrap();

    let (_conn, mut rx) = world.hub.connect(uuid::Uuid::new_v4());

    let view = update_task(
        &world.store,
        &world.hub,
        &id(&t.member),
        task.id,
        UpdateTaskRequest {
            status: Some(TaskStatus::Done),
            ..UpdateTaskRequest::default()
        },
    )
    .await
    .unwrap();
    assert!(view.project.is_none());

    let event = rx.try_recv().unwrap();
    assert_eq!(event.event, EventType::TaskUpdated);
}

#[tokio::test]
async fn test_list_tasks_by_role() {
    let world = World::new();
    let t = Team3::build(&world, "Core").await;
    let other = world.user("Other", Role::Member, Some(t.team.id)).await;
    let mine = world.task(t.project.id, Some(t.member.id)).await;
    world.task(t.project.id, Some(other.id)).await;
    world.task(t.project.id, None).await;

    let member_view = list_tasks(&world.store, &id(&t.member), TaskQuery::default())
        .await
        .unwrap();
    assert_eq!(member_view.len(), 1);
    assert_eq!(member_view[0].task.id, mine.id);

    let scoped = list_tasks(
        &world.store,
        &id(&t.member),
        TaskQuery {
            project_id: Some(t.project.id),
        },
    )
    .await
    .unwrap();
    assert_eq!(scoped.len(), 1);

    let manager_view = list_tasks(&world.store, &id(&t.manager), TaskQuery::default())
        .await
        .unwrap();
    assert_eq!(manager_view.len(), 3);
}

#[tokio::test]
async fn test_list_tasks_of_foreign_project_is_forbidden() {
    let world = World::new();
    let ours = Team3::build(&world, "Ours").await;
    let theirs = Team3::build(&world, "Theirs").await;

    let err = list_tasks(
        &world.store,
        &id(&ours.admin),
        TaskQuery {
            project_id: Some(theirs.project.id),
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.status_code(), StatusCode::FORBIDDEN);

    let err = list_tasks(
        &world.store,
        &id(&ours.admin),
        TaskQuery {
            project_id: Some(uuid::Uuid::new_v4()),
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
}
