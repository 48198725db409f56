/**
 * Team Chat Commands
 *
 * Messages are scoped to one team. When a request omits `teamId`, the
 * caller's own team is used.
 */

use std::collections::HashMap;

use uuid::Uuid;

use crate::backend::auth::guard::authorize;
use crate::backend::error::BackendError;
use crate::backend::realtime::broadcast::FanoutHub;
use crate::backend::store::{NewMessage, Repository};
use crate::shared::access::{Action, Identity};
use crate::shared::event::RealtimeEvent;
use crate::shared::model::{MessageView, Team, TeamRef, UserRef};
use crate::shared::requests::{MessageQuery, SendMessageRequest};

fn resolve_team_id(requested: Option<Uuid>, identity: &Identity) -> Result<Uuid, BackendError> {
    requested
        .or(identity.team_id)
        .ok_or_else(|| BackendError::validation("Team ID is required"))
}

async fn load_team(store: &dyn Repository, id: Uuid) -> Result<Team, BackendError> {
    store
        .find_team_by_id(id)
        .await?
        .ok_or_else(|| BackendError::not_found("Team not found"))
}

/// Post a message to a team's chat and publish it to the team room
pub async fn send_message(
    store: &dyn Repository,
    hub: &FanoutHub,
    identity: &Identity,
    request: SendMessageRequest,
) -> Result<MessageView, BackendError> {
    let team_id = resolve_team_id(request.team_id, identity)?;
    let team = load_team(store, team_id).await?;
    authorize(identity, &Action::SendMessage { team_id })?;

    let message = store
        .create_message(NewMessage {
            content: request.content.trim().to_string(),
            sender_id: identity.user_id,
            team_id,
        })
        .await?;

    let sender = store.find_user_by_id(identity.user_id).await?;
    let view = MessageView {
        message,
        sender: sender.as_ref().map(UserRef::from),
        team: Some(TeamRef::from(&team)),
    };

    tracing::info!(message_id = %view.message.id, %team_id, "Message sent");

    match RealtimeEvent::new_message(&view) {
        Ok(event) => {
            hub.broadcast(team_id, &event);
        }
        Err(e) => tracing::error!(message_id = %view.message.id, "Failed to encode message event: {}", e),
    }

    Ok(view)
}

/// Most recent messages of a team, oldest first
pub async fn list_messages(
    store: &dyn Repository,
    identity: &Identity,
    query: MessageQuery,
) -> Result<Vec<MessageView>, BackendError> {
    let team_id = resolve_team_id(query.team_id, identity)?;
    let team = load_team(store, team_id).await?;
    authorize(identity, &Action::ReadMessages { team_id })?;

    let messages = store.find_messages(team_id, query.limit()).await?;
    let team_ref = TeamRef::from(&team);

    let mut senders: HashMap<Uuid, Option<UserRef>> = HashMap::new();
    let mut views = Vec::with_capacity(messages.len());
    for message in messages {
        let sender = match senders.get(&message.sender_id) {
            Some(cached) => cached.clone(),
            None => {
                let loaded = store
                    .find_user_by_id(message.sender_id)
                    .await?
                    .as_ref()
                    .map(UserRef::from);
                senders.insert(message.sender_id, loaded.clone());
                loaded
            }
        };
        views.push(MessageView {
            message,
            sender,
            team: Some(team_ref.clone()),
        });
    }
    Ok(views)
}
