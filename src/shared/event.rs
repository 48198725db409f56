/**
 * Real-time Event System
 *
 * This module defines the events pushed to connected clients over the
 * realtime channel. Every event is a JSON object of the form
 * `{"event": "<name>", "data": <payload>, "timestamp": "<rfc3339>"}`.
 *
 * # Event Names
 *
 * - `task-updated` - a task was updated; payload is the populated task
 * - `task-deleted` - a task was deleted; payload is `{id, projectId}`
 * - `new-message` - a chat message was sent; payload is the populated message
 * - `joined` / `left` - acknowledgements of room membership changes
 * - `error` - a client request on the socket was rejected
 */
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::SharedError;

/// Type of real-time event
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum EventType {
    TaskUpdated,
    TaskDeleted,
    NewMessage,
    Joined,
    Left,
    Error,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::TaskUpdated => "task-updated",
            EventType::TaskDeleted => "task-deleted",
            EventType::NewMessage => "new-message",
            EventType::Joined => "joined",
            EventType::Left => "left",
            EventType::Error => "error",
        }
    }
}

/// Real-time event delivered to every connection in a team room
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RealtimeEvent {
    /// Type of event
    pub event: EventType,
    /// Event payload (JSON-serializable data)
    pub data: serde_json::Value,
    /// Timestamp when event occurred
    pub timestamp: String,
}

impl RealtimeEvent {
    /// Create a new real-time event
    pub fn new(event: EventType, data: serde_json::Value) -> Self {
        Self {
            event,
            data,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Create an event from any serializable payload
    ///
    /// # Returns
    ///
    /// A `SharedError::SerializationError` if the payload cannot be
    /// converted to JSON.
    pub fn from_payload<T: Serialize>(event: EventType, payload: &T) -> Result<Self, SharedError> {
        let data = serde_json::to_value(payload)?;
        Ok(Self::new(event, data))
    }

    /// `task-updated` carrying the populated task
    pub fn task_updated<T: Serialize>(task: &T) -> Result<Self, SharedError> {
        Self::from_payload(EventType::TaskUpdated, task)
    }

    /// `task-deleted` carrying the ids of the removed task and its project
    pub fn task_deleted(task_id: Uuid, project_id: Uuid) -> Self {
        Self::new(
            EventType::TaskDeleted,
            serde_json::json!({
                "id": task_id,
                "projectId": project_id,
            }),
        )
    }

    /// `new-message` carrying the populated message
    pub fn new_message<T: Serialize>(message: &T) -> Result<Self, SharedError> {
        Self::from_payload(EventType::NewMessage, message)
    }

    pub fn joined(team_id: Uuid) -> Self {
        Self::new(EventType::Joined, serde_json::json!({ "teamId": team_id }))
    }

    pub fn left(team_id: Uuid) -> Self {
        Self::new(EventType::Left, serde_json::json!({ "teamId": team_id }))
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(
            EventType::Error,
            serde_json::json!({ "message": message.into() }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_wire_shape() {
        let event = RealtimeEvent::new(EventType::NewMessage, serde_json::json!({"content": "hi"}));
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "new-message");
        assert_eq!(json["data"]["content"], "hi");
        assert!(!json["timestamp"].as_str().unwrap().is_empty());
    }

    #[test]
    fn test_event_names_match_serde() {
        for event in [
            EventType::TaskUpdated,
            EventType::TaskDeleted,
            EventType::NewMessage,
            EventType::Joined,
            EventType::Left,
            EventType::Error,
        ] {
            let json = serde_json::to_string(&event).unwrap();
            assert_eq!(json, format!("\"{}\"", event.as_str()));
        }
    }

    #[test]
    fn test_task_deleted_payload() {
        let task_id = Uuid::new_v4();
        let project_id = Uuid::new_v4();
        let event = RealtimeEvent::task_deleted(task_id, project_id);
        assert_eq!(event.event, EventType::TaskDeleted);
        assert_eq!(event.data["id"], task_id.to_string());
        assert_eq!(event.data["projectId"], project_id.to_string());
    }

    #[test]
    fn test_from_payload() {
        #[derive(Serialize)]
        struct Payload {
            id: u32,
        }
        let event = RealtimeEvent::task_updated(&Payload { id: 7 }).unwrap();
        assert_eq!(event.event, EventType::TaskUpdated);
        assert_eq!(event.data["id"], 7);
    }

    #[test]
    fn test_event_roundtrip() {
        let event = RealtimeEvent::error("You can only join your own team's room");
        let json = serde_json::to_string(&event).unwrap();
        let back: RealtimeEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}
