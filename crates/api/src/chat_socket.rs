//! WebSocket chat sessions.
//!
//! A connection is bound to one room. Events are fanned out through a
//! per-room broadcast channel; errors go back to the initiating socket only.

#![allow(missing_docs)]

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{
        Path, State,
        ws::{Message, WebSocket, WebSocketUpgrade, rejection::WebSocketUpgradeRejection},
    },
    response::{IntoResponse, Response},
};
use chrono::{DateTime, FixedOffset, Utc};
use futures::{SinkExt, StreamExt};
use sangam_common::{AppError, AppResult, LocalTimeFormatter};
use sangam_core::{SendMessageInput, SentMessage, chat::AnswerOption};
use sangam_db::entities::{
    chat_message::{self, MessageKind},
    chat_room,
};
use serde::{Deserialize, Serialize};
use tokio::sync::{RwLock, broadcast};
use tracing::{debug, info, warn};

use crate::extractors::MaybeAuthUser;
use crate::middleware::AppState;

/// Buffered events per room before slow sockets start lagging.
const ROOM_CHANNEL_CAPACITY: usize = 256;

/// An event published to a room.
#[derive(Debug, Clone)]
pub struct RoomEvent {
    /// Deliver only to this user, or to everyone in the room.
    pub only_for: Option<String>,
    /// Serialized [`ServerEvent`].
    pub payload: Arc<str>,
}

impl RoomEvent {
    fn visible_to(&self, user_id: &str) -> bool {
        self.only_for.as_deref().is_none_or(|target| target == user_id)
    }
}

/// Room-scoped broadcast groups.
#[derive(Clone, Default)]
pub struct ChatHub {
    rooms: Arc<RwLock<HashMap<String, broadcast::Sender<RoomEvent>>>>,
}

impl ChatHub {
    /// Create an empty hub.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Join a room's group.
    pub async fn join(&self, room_id: &str) -> broadcast::Receiver<RoomEvent> {
        let mut rooms = self.rooms.write().await;
        rooms
            .entry(room_id.to_string())
            .or_insert_with(|| broadcast::channel(ROOM_CHANNEL_CAPACITY).0)
            .subscribe()
    }

    /// Leave a room's group, dropping the group once empty.
    pub async fn leave(&self, room_id: &str, receiver: broadcast::Receiver<RoomEvent>) {
        drop(receiver);
        let mut rooms = self.rooms.write().await;
        if rooms
            .get(room_id)
            .is_some_and(|tx| tx.receiver_count() == 0)
        {
            rooms.remove(room_id);
        }
    }

    /// Publish to everyone in a room. Returns how many sockets got it.
    pub async fn publish(&self, room_id: &str, event: RoomEvent) -> usize {
        let rooms = self.rooms.read().await;
        rooms
            .get(room_id)
            .and_then(|tx| tx.send(event).ok())
            .unwrap_or(0)
    }

    /// Number of rooms with at least one socket.
    pub async fn active_rooms(&self) -> usize {
        self.rooms.read().await.len()
    }
}

/// Client-to-server action.
#[derive(Debug, Deserialize)]
pub struct ClientAction {
    pub action: String,
    #[serde(flatten)]
    pub message: SendMessageInput,
    pub message_id: Option<String>,
}

/// Server-to-client event.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    Message {
        id: String,
        sender: String,
        receiver: String,
        text: String,
        message_type: MessageKind,
        question_id: Option<i32>,
        answer_index: Option<i32>,
        created_at: DateTime<FixedOffset>,
        created_at_local: String,
    },
    SuggestedAnswers {
        receiver_id: String,
        question_id: i64,
        answers: Vec<AnswerOption>,
    },
    MessageDeleted {
        message_id: String,
    },
    Error {
        message: String,
        code: &'static str,
    },
}

impl ServerEvent {
    fn message(message: chat_message::Model, formatter: &LocalTimeFormatter) -> Self {
        Self::Message {
            created_at_local: formatter.format(message.created_at.with_timezone(&Utc)),
            id: message.id,
            sender: message.sender_id,
            receiver: message.receiver_id,
            text: message.message_text,
            message_type: message.message_type,
            question_id: message.question_id,
            answer_index: message.answer_index,
            created_at: message.created_at,
        }
    }

    fn error(err: &AppError) -> Self {
        Self::Error {
            message: err.public_message(),
            code: err.error_code(),
        }
    }

    fn to_json(&self) -> AppResult<Arc<str>> {
        serde_json::to_string(self)
            .map(Arc::from)
            .map_err(|e| AppError::Internal(format!("Failed to serialize event: {e}")))
    }
}

/// Text frame for a reply to the initiator. Encoding failures are logged and skipped.
fn reply_frame(reply: &ServerEvent, room_id: &str) -> Option<Message> {
    match reply.to_json() {
        Ok(json) => Some(Message::Text(json.as_ref().into())),
        Err(e) => {
            warn!(room_id = %room_id, error = %e, "Dropping undeliverable chat reply");
            None
        }
    }
}

/// Parse an inbound frame.
pub fn parse_action(text: &str) -> AppResult<ClientAction> {
    serde_json::from_str(text).map_err(|e| AppError::Validation(format!("Invalid payload: {e}")))
}

/// WebSocket handler for a chat room.
///
/// Authentication and room membership are checked before the upgrade, so a
/// refused caller never gets a socket.
pub async fn chat_socket_handler(
    Path(room_id): Path<String>,
    State(state): State<AppState>,
    MaybeAuthUser(user): MaybeAuthUser,
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Response {
    let Some(user) = user else {
        return AppError::Unauthorized.into_response();
    };

    let room = match state.chat_service.open_session(&user.id, &room_id).await {
        Ok(room) => room,
        Err(e) => return e.into_response(),
    };

    match ws {
        Ok(ws) => ws
            .on_upgrade(move |socket| handle_socket(socket, state, user.id, room))
            .into_response(),
        Err(rejection) => rejection.into_response(),
    }
}

/// Handle a WebSocket connection.
async fn handle_socket(socket: WebSocket, state: AppState, user_id: String, room: chat_room::Model) {
    let (mut sender, mut receiver) = socket.split();
    let mut room_rx = state.chat_hub.join(&room.id).await;

    info!(user_id = %user_id, room_id = %room.id, "Chat session opened");

    loop {
        tokio::select! {
            incoming = receiver.next() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => {
                        if let Some(reply) = handle_client_message(&state, &room, &user_id, &text).await {
                            let Some(frame) = reply_frame(&reply, &room.id) else { continue };
                            if sender.send(frame).await.is_err() {
                                break;
                            }
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if sender.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        warn!(room_id = %room.id, error = %e, "WebSocket error");
                        break;
                    }
                }
            }

            event = room_rx.recv() => {
                match event {
                    Ok(event) => {
                        if event.visible_to(&user_id)
                            && sender.send(Message::Text(event.payload.as_ref().into())).await.is_err()
                        {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(room_id = %room.id, skipped, "Chat socket lagging");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    state.chat_hub.leave(&room.id, room_rx).await;
    info!(user_id = %user_id, room_id = %room.id, "Chat session closed");
}

/// Run one inbound action. Returns the error event for the initiator, if any.
async fn handle_client_message(
    state: &AppState,
    room: &chat_room::Model,
    user_id: &str,
    text: &str,
) -> Option<ServerEvent> {
    let result = match parse_action(text) {
        Ok(action) => match action.action.as_str() {
            "send" => send(state, room, user_id, &action.message).await,
            "delete" => delete(state, room, user_id, action.message_id.as_deref()).await,
            _ => Err(AppError::Validation("Invalid action".to_string())),
        },
        Err(e) => Err(e),
    };

    result.err().map(|e| {
        debug!(room_id = %room.id, user_id = %user_id, error = %e, "Chat action rejected");
        ServerEvent::error(&e)
    })
}

async fn send(
    state: &AppState,
    room: &chat_room::Model,
    user_id: &str,
    input: &SendMessageInput,
) -> AppResult<()> {
    let SentMessage {
        message,
        suggested_answers,
    } = state.chat_service.send_message(room, user_id, input).await?;

    let event = ServerEvent::message(message, &state.time_formatter);
    state
        .chat_hub
        .publish(
            &room.id,
            RoomEvent {
                only_for: None,
                payload: event.to_json()?,
            },
        )
        .await;

    if let Some(suggested) = suggested_answers {
        let receiver_id = suggested.receiver_id.clone();
        let event = ServerEvent::SuggestedAnswers {
            receiver_id: suggested.receiver_id,
            question_id: suggested.question_id,
            answers: suggested.answers,
        };
        state
            .chat_hub
            .publish(
                &room.id,
                RoomEvent {
                    only_for: Some(receiver_id),
                    payload: event.to_json()?,
                },
            )
            .await;
    }
    Ok(())
}

async fn delete(
    state: &AppState,
    room: &chat_room::Model,
    user_id: &str,
    message_id: Option<&str>,
) -> AppResult<()> {
    let message_id = message_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::Validation("message_id is required".to_string()))?;

    let deleted = state
        .chat_service
        .delete_message(room, user_id, message_id)
        .await?;

    let event = ServerEvent::MessageDeleted {
        message_id: deleted.id,
    };
    state
        .chat_hub
        .publish(
            &room.id,
            RoomEvent {
                only_for: None,
                payload: event.to_json()?,
            },
        )
        .await;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(only_for: Option<&str>, payload: &str) -> RoomEvent {
        RoomEvent {
            only_for: only_for.map(String::from),
            payload: Arc::from(payload),
        }
    }

    #[test]
    fn test_reply_frame_carries_error_event() {
        let reply = ServerEvent::error(&AppError::Forbidden("Upgrade your plan".to_string()));

        let Some(Message::Text(text)) = reply_frame(&reply, "room1") else {
            panic!("expected a text frame");
        };
        let value: serde_json::Value = serde_json::from_str(text.as_str()).unwrap();
        assert_eq!(value["type"], "error");
        assert_eq!(value["code"], "FORBIDDEN");
    }

    #[tokio::test]
    async fn test_hub_fans_out_to_room_members() {
        let hub = ChatHub::new();
        let mut a = hub.join("room1").await;
        let mut b = hub.join("room1").await;
        let mut other = hub.join("room2").await;

        assert_eq!(hub.publish("room1", event(None, "hi")).await, 2);

        assert_eq!(a.recv().await.unwrap().payload.as_ref(), "hi");
        assert_eq!(b.recv().await.unwrap().payload.as_ref(), "hi");
        assert!(other.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_hub_drops_empty_rooms() {
        let hub = ChatHub::new();
        let a = hub.join("room1").await;
        let b = hub.join("room1").await;
        assert_eq!(hub.active_rooms().await, 1);

        hub.leave("room1", a).await;
        assert_eq!(hub.active_rooms().await, 1);
        hub.leave("room1", b).await;
        assert_eq!(hub.active_rooms().await, 0);

        assert_eq!(hub.publish("room1", event(None, "late")).await, 0);
    }

    #[test]
    fn test_targeted_event_visibility() {
        assert!(event(None, "x").visible_to("u1"));
        assert!(event(Some("u1"), "x").visible_to("u1"));
        assert!(!event(Some("u1"), "x").visible_to("u2"));
    }

    #[test]
    fn test_parse_send_action() {
        let action = parse_action(
            r#"{"action": "send", "message_type": "predefined", "question_id": 2, "answer_index": 1}"#,
        )
        .unwrap();
        assert_eq!(action.action, "send");
        assert_eq!(action.message.message_type.as_deref(), Some("predefined"));
        assert_eq!(action.message.question_id, Some(2));
        assert_eq!(action.message.answer_index, Some(1));
    }

    #[test]
    fn test_parse_delete_action() {
        let action = parse_action(r#"{"action": "delete", "message_id": "m1"}"#).unwrap();
        assert_eq!(action.action, "delete");
        assert_eq!(action.message_id.as_deref(), Some("m1"));
    }

    #[test]
    fn test_parse_garbage_is_validation_error() {
        assert!(matches!(parse_action("not json"), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_error_event_shape() {
        let err = AppError::Forbidden("Only predefined messages are allowed".to_string());
        let value = serde_json::to_value(ServerEvent::error(&err)).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "error",
                "message": "Only predefined messages are allowed",
                "code": "FORBIDDEN",
            })
        );
    }

    #[test]
    fn test_deleted_event_shape() {
        let value = serde_json::to_value(ServerEvent::MessageDeleted {
            message_id: "m1".to_string(),
        })
        .unwrap();
        assert_eq!(value, json!({"type": "message_deleted", "message_id": "m1"}));
    }
}
