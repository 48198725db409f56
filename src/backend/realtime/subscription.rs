/**
 * Real-time Socket Handler
 *
 * This module implements the WebSocket endpoint `GET /ws`. A client
 * authenticates during the handshake, then asks to join or leave team
 * rooms; events broadcast to a room are written to every joined socket.
 *
 * # Handshake
 *
 * The token is read from `Authorization: Bearer <token>` or, for browser
 * clients that cannot set headers, from `?token=<token>`. A missing or
 * invalid token is rejected with 401 before the upgrade.
 *
 * # Client Frames
 *
 * ```json
 * {"type": "join-team", "teamId": "<uuid>"}
 * {"type": "leave-team", "teamId": "<uuid>"}
 * ```
 *
 * Every frame is answered with a `joined`, `left` or `error` event.
 *
 * # Connection Management
 *
 * - One writer task per socket drains the hub's outbound queue
 * - Replies and broadcasts share that queue, so frames never interleave
 * - Closing the socket disconnects it from every room
 * - If the hub evicts the connection for a full queue, the writer ends
 *   and the read loop stops with it
 */

use axum::{
    extract::{
        ws::{rejection::WebSocketUpgradeRejection, Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::backend::error::BackendError;
use crate::backend::middleware::{bearer_token, resolve_identity};
use crate::backend::realtime::broadcast::{ConnectionId, EventReceiver};
use crate::backend::server::state::AppState;
use crate::shared::access::{decide, Action, Decision, Identity};
use crate::shared::RealtimeEvent;

/// Query parameters accepted on the handshake
#[derive(Debug, Default, Deserialize)]
pub struct SocketQuery {
    pub token: Option<String>,
}

/// Frames a client may send after the upgrade
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientFrame {
    JoinTeam {
        #[serde(rename = "teamId")]
        team_id: Uuid,
    },
    LeaveTeam {
        #[serde(rename = "teamId")]
        team_id: Uuid,
    },
}

/// Handle socket upgrade (GET /ws)
///
/// # Errors
///
/// * `401 Unauthorized` - no token, an invalid token, or a deleted user
/// * The upgrade rejection (e.g. `426 Upgrade Required`) for a plain HTTP
///   request carrying a valid token
pub async fn handle_socket_upgrade(
    State(state): State<AppState>,
    Query(query): Query<SocketQuery>,
    headers: HeaderMap,
    upgrade: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Result<Response, BackendError> {
    let token = bearer_token(&headers)
        .or_else(|| query.token.as_deref().filter(|t| !t.is_empty()))
        .ok_or_else(|| {
            warn!("Socket handshake without token");
            BackendError::unauthorized("Not authorized, no token")
        })?;

    let identity = resolve_identity(&state.tokens, state.store.as_ref(), token).await?;

    let upgrade = match upgrade {
        Ok(upgrade) => upgrade,
        Err(rejection) => return Ok(rejection.into_response()),
    };

    info!(user_id = %identity.user_id, "Socket connected");
    Ok(upgrade.on_upgrade(move |socket| run_socket(socket, state, identity)))
}

async fn run_socket(socket: WebSocket, state: AppState, identity: Identity) {
    let (connection_id, events) = state.fanout.connect(identity.user_id);
    let (sink, mut stream) = socket.split();
    let mut writer = tokio::spawn(write_events(sink, events, connection_id));

    loop {
        let frame = tokio::select! {
            frame = stream.next() => frame,
            _ = &mut writer => {
                debug!(%connection_id, "Outbound queue closed");
                break;
            }
        };
        let Some(frame) = frame else {
            break;
        };
        match frame {
            Ok(Message::Text(text)) => {
                let reply = handle_text(&state, connection_id, identity.user_id, text.as_str()).await;
                state.fanout.send_to(connection_id, reply);
            }
            Ok(Message::Binary(data)) => {
                warn!(%connection_id, bytes = data.len(), "Ignoring binary frame");
            }
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {
                debug!(%connection_id, "Heartbeat");
            }
            Ok(Message::Close(frame)) => {
                debug!(%connection_id, ?frame, "Client closed socket");
                break;
            }
            Err(e) => {
                warn!(%connection_id, "Socket error: {}", e);
                break;
            }
        }
    }

    state.fanout.disconnect(connection_id);
    writer.abort();
    info!(%connection_id, user_id = %identity.user_id, "Socket disconnected");
}

async fn write_events<S>(mut sink: S, mut events: EventReceiver, connection_id: ConnectionId)
where
    S: futures_util::Sink<Message> + Unpin,
{
    while let Some(event) = events.recv().await {
        let json = match serde_json::to_string(&event) {
            Ok(json) => json,
            Err(e) => {
                warn!(%connection_id, "Failed to serialize event: {}", e);
                continue;
            }
        };
        if sink.send(Message::Text(json.into())).await.is_err() {
            break;
        }
    }
}

/// Parse a text frame and apply it, returning the event to send back
pub async fn handle_text(
    state: &AppState,
    connection_id: ConnectionId,
    user_id: Uuid,
    text: &str,
) -> RealtimeEvent {
    match serde_json::from_str::<ClientFrame>(text) {
        Ok(frame) => apply_frame(state, connection_id, user_id, frame).await,
        Err(e) => {
            debug!(%connection_id, "Unparseable frame: {}", e);
            RealtimeEvent::error("Invalid message format")
        }
    }
}

/// Apply a room request for one connection
///
/// Joining re-reads the user so a team change made over HTTP is honored
/// without reconnecting.
pub async fn apply_frame(
    state: &AppState,
    connection_id: ConnectionId,
    user_id: Uuid,
    frame: ClientFrame,
) -> RealtimeEvent {
    match frame {
        ClientFrame::JoinTeam { team_id } => {
            let user = match state.store.find_user_by_id(user_id).await {
                Ok(Some(user)) => user,
                Ok(None) => return RealtimeEvent::error("User no longer exists"),
                Err(e) => {
                    warn!(%connection_id, "Failed to load user for join: {}", e);
                    return RealtimeEvent::error("Internal Server Error");
                }
            };

            match decide(&Identity::from_user(&user), &Action::JoinTeamRoom { team_id }) {
                Decision::Allow => {
                    state.fanout.join(connection_id, team_id);
                    debug!(%connection_id, %team_id, "Joined team room");
                    RealtimeEvent::joined(team_id)
                }
                Decision::Deny(reason) => {
                    warn!(%connection_id, %team_id, "Room join denied: {}", reason);
                    RealtimeEvent::error(reason)
                }
            }
        }
        ClientFrame::LeaveTeam { team_id } => {
            state.fanout.leave(connection_id, team_id);
            RealtimeEvent::left(team_id)
        }
    }
}
