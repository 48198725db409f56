/**
 * Team Chat Handlers
 *
 * - `POST /api/messages` - send a message, emits `new-message`
 * - `GET /api/messages?teamId=&limit=` - recent history, oldest first
 */

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::backend::error::BackendError;
use crate::backend::messages::commands;
use crate::backend::middleware::{AuthUser, ValidJson, ValidQuery};
use crate::backend::server::state::AppState;
use crate::shared::model::MessageView;
use crate::shared::requests::{MessageQuery, SendMessageRequest};
use crate::shared::response::ApiResponse;

#[derive(Debug, Serialize)]
pub struct MessagePayload {
    pub message: MessageView,
}

#[derive(Debug, Serialize)]
pub struct MessageListPayload {
    pub messages: Vec<MessageView>,
    pub count: usize,
}

pub async fn send_message(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    ValidJson(request): ValidJson<SendMessageRequest>,
) -> Result<(StatusCode, Json<ApiResponse<MessagePayload>>), BackendError> {
    let message =
        commands::send_message(state.store.as_ref(), &state.fanout, &identity, request).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok("Message sent successfully", MessagePayload { message })),
    ))
}

pub async fn list_messages(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    ValidQuery(query): ValidQuery<MessageQuery>,
) -> Result<Json<ApiResponse<MessageListPayload>>, BackendError> {
    let messages = commands::list_messages(state.store.as_ref(), &identity, query).await?;
    let count = messages.len();
    Ok(Json(ApiResponse::ok(
        "Messages retrieved successfully",
        MessageListPayload { messages, count },
    )))
}
