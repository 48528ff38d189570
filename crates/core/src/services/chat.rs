//! Chat sessions between matched members.
//!
//! Every send goes through the subscription gate before anything is stored:
//!
//! | sender | receiver | allowed                  |
//! |--------|----------|--------------------------|
//! | no     | yes      | nothing                  |
//! | yes    | no       | nothing                  |
//! | no     | no       | predefined messages only |
//! | yes    | yes      | everything               |

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Utc};
use sangam_common::{AppError, AppResult};
use sangam_db::{
    entities::{
        chat_message::{self, MessageKind},
        chat_room,
    },
    repositories::{ChatRepository, UserRepository},
};
use sea_orm::Set;
use serde::{Deserialize, Serialize};

use crate::services::chat_catalog::PredefinedCatalog;
use crate::services::notification::NotificationDispatcher;
use crate::services::subscription::SubscriptionService;

/// Push previews are cut to this many characters.
const PUSH_PREVIEW_CHARS: usize = 100;

/// A message as submitted by a client.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SendMessageInput {
    pub message_type: Option<String>,
    pub message_text: Option<String>,
    pub question_id: Option<i64>,
    pub answer_index: Option<i64>,
}

/// One selectable answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnswerOption {
    pub index: usize,
    pub text: String,
}

/// Answers offered to the receiver of a predefined question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuggestedAnswers {
    pub receiver_id: String,
    pub question_id: i64,
    pub answers: Vec<AnswerOption>,
}

/// Text and catalog references of a message about to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedContent {
    pub text: String,
    pub question_id: Option<i64>,
    pub answer_index: Option<i64>,
    /// Set when the message asks a question and the receiver should pick an answer.
    pub answers: Option<Vec<AnswerOption>>,
}

/// Result of a successful send.
#[derive(Debug, Clone)]
pub struct SentMessage {
    pub message: chat_message::Model,
    pub suggested_answers: Option<SuggestedAnswers>,
}

/// A room as listed for one of its participants.
#[derive(Debug, Clone, Serialize)]
pub struct RoomSummary {
    pub chat_room_id: String,
    pub user_id: String,
    pub unique_id: Option<String>,
    pub name: Option<String>,
    pub profile_image: Option<String>,
    pub is_subscribed: bool,
    pub last_message: Option<String>,
    pub last_message_time: Option<DateTime<FixedOffset>>,
    pub unread_count: u64,
    pub created_at: DateTime<FixedOffset>,
}

/// A stored message as seen by one participant.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryMessage {
    #[serde(flatten)]
    pub message: chat_message::Model,
    pub is_mine: bool,
}

/// Chat service.
#[derive(Clone)]
pub struct ChatService {
    chat_repo: ChatRepository,
    user_repo: UserRepository,
    subscriptions: SubscriptionService,
    catalog: Arc<PredefinedCatalog>,
    dispatcher: NotificationDispatcher,
}

impl ChatService {
    /// Create a new chat service.
    #[must_use]
    pub const fn new(
        chat_repo: ChatRepository,
        user_repo: UserRepository,
        subscriptions: SubscriptionService,
        catalog: Arc<PredefinedCatalog>,
        dispatcher: NotificationDispatcher,
    ) -> Self {
        Self {
            chat_repo,
            user_repo,
            subscriptions,
            catalog,
            dispatcher,
        }
    }

    /// Room `room_id`, provided `user_id` takes part in it.
    pub async fn open_session(&self, user_id: &str, room_id: &str) -> AppResult<chat_room::Model> {
        let room = self
            .chat_repo
            .find_room(room_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Chat room not found".to_string()))?;

        if !room.has_participant(user_id) {
            return Err(AppError::Forbidden(
                "You are not a participant of this chat".to_string(),
            ));
        }
        Ok(room)
    }

    /// Gate, resolve and store a message from `sender_id`, then push it to the receiver.
    pub async fn send_message(
        &self,
        room: &chat_room::Model,
        sender_id: &str,
        input: &SendMessageInput,
    ) -> AppResult<SentMessage> {
        let kind = parse_kind(input.message_type.as_deref())?;
        let receiver_id = room.other_participant(sender_id).to_string();

        let sender_subscribed = self.subscriptions.is_entitled(sender_id).await?;
        let receiver_subscribed = self.subscriptions.is_entitled(&receiver_id).await?;
        evaluate_permission(sender_subscribed, receiver_subscribed, kind)?;

        let content = resolve_content(&self.catalog, kind, input)?;

        let message = self
            .chat_repo
            .create_message(chat_message::ActiveModel {
                id: Set(crate::generate_id()),
                room_id: Set(room.id.clone()),
                sender_id: Set(sender_id.to_string()),
                receiver_id: Set(receiver_id.clone()),
                message_type: Set(kind),
                message_text: Set(content.text),
                question_id: Set(content.question_id.and_then(|q| i32::try_from(q).ok())),
                answer_index: Set(content.answer_index.and_then(|a| i32::try_from(a).ok())),
                is_read: Set(false),
                created_at: Set(Utc::now().into()),
            })
            .await?;

        tracing::debug!(
            room_id = %room.id,
            message_id = %message.id,
            kind = ?kind,
            "Message stored"
        );

        self.push_to_receiver(&message).await;

        let suggested_answers = match (content.question_id, content.answers) {
            (Some(question_id), Some(answers)) => Some(SuggestedAnswers {
                receiver_id,
                question_id,
                answers,
            }),
            _ => None,
        };

        Ok(SentMessage {
            message,
            suggested_answers,
        })
    }

    /// Delete one of `user_id`'s own messages in `room`.
    pub async fn delete_message(
        &self,
        room: &chat_room::Model,
        user_id: &str,
        message_id: &str,
    ) -> AppResult<chat_message::Model> {
        let message = self
            .chat_repo
            .find_message(message_id)
            .await?
            .filter(|m| m.room_id == room.id)
            .ok_or_else(|| AppError::NotFound("Message not found".to_string()))?;

        if message.sender_id != user_id {
            return Err(AppError::Forbidden(
                "You can only delete your own messages".to_string(),
            ));
        }

        self.chat_repo.delete_message(&message.id).await?;
        tracing::debug!(room_id = %room.id, message_id = %message.id, "Message deleted");
        Ok(message)
    }

    /// Rooms of `user_id`, most recent activity first.
    pub async fn list_rooms(&self, user_id: &str) -> AppResult<Vec<RoomSummary>> {
        let rooms = self.chat_repo.find_rooms_for_user(user_id).await?;
        let others: Vec<String> = rooms
            .iter()
            .map(|r| r.other_participant(user_id).to_string())
            .collect();
        let users: BTreeMap<String, _> = self
            .user_repo
            .find_by_ids(&others)
            .await?
            .into_iter()
            .map(|u| (u.id.clone(), u))
            .collect();

        let mut summaries = Vec::with_capacity(rooms.len());
        for (room, other_id) in rooms.into_iter().zip(others) {
            let last = self.chat_repo.find_last_message(&room.id).await?;
            let unread_count = self.chat_repo.count_unread(&room.id, user_id).await?;
            let is_subscribed = self.subscriptions.is_entitled(&other_id).await?;
            let other = users.get(&other_id);

            summaries.push(RoomSummary {
                chat_room_id: room.id,
                unique_id: other.map(|u| u.member_code.clone()),
                name: other.and_then(|u| u.name.clone()),
                profile_image: other.and_then(|u| u.profile_image_url.clone()),
                user_id: other_id,
                is_subscribed,
                last_message_time: last.as_ref().map(|m| m.created_at),
                last_message: last.map(|m| m.message_text),
                unread_count,
                created_at: room.created_at,
            });
        }

        summaries.sort_by(|a, b| {
            b.last_message_time
                .cmp(&a.last_message_time)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        Ok(summaries)
    }

    /// Messages of a room, oldest first. Participants only.
    pub async fn history(&self, user_id: &str, room_id: &str) -> AppResult<Vec<HistoryMessage>> {
        let room = self.participant_room(user_id, room_id).await?;
        let messages = self.chat_repo.find_messages(&room.id).await?;

        Ok(messages
            .into_iter()
            .map(|message| HistoryMessage {
                is_mine: message.sender_id == user_id,
                message,
            })
            .collect())
    }

    /// Mark messages addressed to `user_id` in a room as read.
    pub async fn mark_read(&self, user_id: &str, room_id: &str) -> AppResult<u64> {
        let room = self.participant_room(user_id, room_id).await?;
        self.chat_repo.mark_read(&room.id, user_id).await
    }

    async fn participant_room(&self, user_id: &str, room_id: &str) -> AppResult<chat_room::Model> {
        let room = self
            .chat_repo
            .find_room(room_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Chat room not found".to_string()))?;

        if !room.has_participant(user_id) {
            return Err(AppError::Forbidden(
                "You are not allowed to view this chat".to_string(),
            ));
        }
        Ok(room)
    }

    async fn push_to_receiver(&self, message: &chat_message::Model) {
        let users = match self
            .user_repo
            .find_by_ids(&[message.sender_id.clone(), message.receiver_id.clone()])
            .await
        {
            Ok(users) => users,
            Err(e) => {
                tracing::warn!(message_id = %message.id, error = %e, "Skipping chat push");
                return;
            }
        };

        let Some(token) = users
            .iter()
            .find(|u| u.id == message.receiver_id)
            .and_then(|u| u.fcm_token.as_deref())
        else {
            return;
        };
        let sender_name = users
            .iter()
            .find(|u| u.id == message.sender_id)
            .and_then(|u| u.name.as_deref())
            .unwrap_or("a match");

        let data = BTreeMap::from([
            ("type".to_string(), "chat_message".to_string()),
            ("room_id".to_string(), message.room_id.clone()),
            ("sender_id".to_string(), message.sender_id.clone()),
        ]);
        self.dispatcher.push(
            token,
            format!("New message from {sender_name}"),
            preview(&message.message_text),
            data,
        );
    }
}

/// Parse a client supplied message type.
pub fn parse_kind(message_type: Option<&str>) -> AppResult<MessageKind> {
    match message_type.map(str::trim) {
        Some("predefined") => Ok(MessageKind::Predefined),
        Some("custom") => Ok(MessageKind::Custom),
        _ => Err(AppError::Validation("Invalid message type".to_string())),
    }
}

/// Whether a message of `kind` may be sent given both participants' subscriptions.
pub fn evaluate_permission(
    sender_subscribed: bool,
    receiver_subscribed: bool,
    kind: MessageKind,
) -> AppResult<()> {
    match (sender_subscribed, receiver_subscribed, kind) {
        (false, true, _) => Err(AppError::Forbidden(
            "Upgrade your plan to start conversation".to_string(),
        )),
        (true, false, _) => Err(AppError::Forbidden(
            "User has not upgraded their plan".to_string(),
        )),
        (false, false, MessageKind::Custom) => Err(AppError::Forbidden(
            "Only predefined messages are allowed".to_string(),
        )),
        _ => Ok(()),
    }
}

/// Turn a submitted message into the text that gets stored.
///
/// A predefined message without an answer index asks the catalog question and
/// offers its answers; with an index it answers that question.
pub fn resolve_content(
    catalog: &PredefinedCatalog,
    kind: MessageKind,
    input: &SendMessageInput,
) -> AppResult<ResolvedContent> {
    match kind {
        MessageKind::Predefined => {
            let question = input
                .question_id
                .and_then(|id| catalog.question(id))
                .ok_or_else(|| AppError::Validation("Invalid predefined question".to_string()))?;

            match input.answer_index {
                None => Ok(ResolvedContent {
                    text: question.question.clone(),
                    question_id: Some(question.id),
                    answer_index: None,
                    answers: Some(
                        question
                            .answers
                            .iter()
                            .enumerate()
                            .map(|(index, text)| AnswerOption {
                                index,
                                text: text.clone(),
                            })
                            .collect(),
                    ),
                }),
                Some(index) => {
                    let text = question.answer(index).ok_or_else(|| {
                        AppError::Validation("Invalid answer index".to_string())
                    })?;
                    Ok(ResolvedContent {
                        text: text.to_string(),
                        question_id: Some(question.id),
                        answer_index: Some(index),
                        answers: None,
                    })
                }
            }
        }
        MessageKind::Custom => {
            let text = input.message_text.as_deref().map(str::trim).unwrap_or_default();
            if text.is_empty() {
                return Err(AppError::Validation(
                    "Message text cannot be empty".to_string(),
                ));
            }
            Ok(ResolvedContent {
                text: text.to_string(),
                question_id: None,
                answer_index: None,
                answers: None,
            })
        }
    }
}

fn preview(text: &str) -> String {
    text.chars().take(PUSH_PREVIEW_CHARS).collect()
}
