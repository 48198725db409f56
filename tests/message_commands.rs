//! Team chat command integration tests

#![cfg(feature = "ssr")]

mod common;

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use teamcollab::backend::messages::commands::{list_messages, send_message};
use teamcollab::shared::model::Role;
use teamcollab::shared::requests::{MessageQuery, SendMessageRequest};
use teamcollab::shared::EventType;

use common::{id, Team3, World};

fn say(content: &str, team_id: Option<uuid::Uuid>) -> SendMessageRequest {
    SendMessageRequest {
        content: content.to_string(),
        team_id,
    }
}

#[tokio::test]
async fn test_send_defaults_to_own_team_and_broadcasts() {
    let world = World::new();
    let t = Team3::build(&world, "Core").await;
    let (conn, mut rx) = world.hub.connect(t.manager.id);
    world.hub.join(conn, t.team.id);

    let view = send_message(&world.store, &world.hub, &id(&t.member), say("  hello  ", None))
        .await
        .unwrap();
    assert_eq!(view.message.content, "hello");
    assert_eq!(view.message.team_id, t.team.id);
    assert_eq!(view.sender.as_ref().map(|s| s.id), Some(t.member.id));
    assert_eq!(view.team.as_ref().map(|team| team.id), Some(t.team.id));

    let event = rx.try_recv().unwrap();
    assert_eq!(event.event, EventType::NewMessage);
    assert_eq!(event.data["content"], "hello");
}

#[tokio::test]
async fn test_send_to_foreign_team_is_forbidden() {
    let world = World::new();
    let ours = Team3::build(&world, "Ours").await;
    let theirs = Team3::build(&world, "Theirs").await;
    let (conn, mut rx) = world.hub.connect(theirs.member.id);
    world.hub.join(conn, theirs.team.id);

    let err = send_message(
        &world.store,
        &world.hub,
        &id(&ours.admin),
        say("psst", Some(theirs.team.id)),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
    assert_eq!(err.message(), "You can only send messages to your own team");
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_send_without_any_team() {
    let world = World::new();
    let loner = world.user("Loner", Role::Member, None).await;

    let err = send_message(&world.store, &world.hub, &id(&loner), say("hi", None))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(err.errors(), vec!["Team ID is required".to_string()]);

    let err = send_message(
        &world.store,
        &world.hub,
        &id(&loner),
        say("hi", Some(uuid::Uuid::new_v4())),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_history_is_newest_window_oldest_first() {
    let world = World::new();
    let t = Team3::build(&world, "Core").await;
    for n in 0..5 {
        send_message(&world.store, &world.hub, &id(&t.member), say(&format!("msg {}", n), None))
            .await
            .unwrap();
    }

    let recent = list_messages(
        &world.store,
        &id(&t.admin),
        MessageQuery {
            team_id: None,
            limit: Some(3),
        },
    )
    .await
    .unwrap();
    let contents: Vec<_> = recent.iter().map(|m| m.message.content.as_str()).collect();
    assert_eq!(contents, vec!["msg 2", "msg 3", "msg 4"]);
    assert!(recent.iter().all(|m| m.sender.as_ref().map(|s| s.id) == Some(t.member.id)));
}

#[tokio::test]
async fn test_history_of_foreign_team_is_forbidden() {
    let world = World::new();
    let ours = Team3::build(&world, "Ours").await;
    let theirs = Team3::build(&world, "Theirs").await;

    let err = list_messages(
        &world.store,
        &id(&ours.member),
        MessageQuery {
            team_id: Some(theirs.team.id),
            limit: None,
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
}
