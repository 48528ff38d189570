//! Chat room and message repository.

use std::sync::Arc;

use crate::entities::{ChatMessage, ChatRoom, chat_message, chat_room};
use sangam_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, prelude::DateTimeWithTimeZone, sea_query::OnConflict,
};

/// Chat repository for database operations.
#[derive(Clone)]
pub struct ChatRepository {
    db: Arc<DatabaseConnection>,
}

impl ChatRepository {
    /// Create a new chat repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    // === Rooms ===

    /// Find a room by ID.
    pub async fn find_room(&self, id: &str) -> AppResult<Option<chat_room::Model>> {
        ChatRoom::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find the room of a user pair, in any argument order.
    pub async fn find_room_by_pair(&self, a: &str, b: &str) -> AppResult<Option<chat_room::Model>> {
        let (low, high) = chat_room::canonical_pair(a, b);
        ChatRoom::find()
            .filter(chat_room::Column::UserLowId.eq(low))
            .filter(chat_room::Column::UserHighId.eq(high))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get or create the room of a user pair.
    pub async fn get_or_create_room(
        &self,
        a: &str,
        b: &str,
        room_id: String,
        match_request_id: Option<String>,
        at: DateTimeWithTimeZone,
    ) -> AppResult<chat_room::Model> {
        let (low, high) = chat_room::canonical_pair(a, b);
        let room = chat_room::ActiveModel {
            id: Set(room_id),
            user_low_id: Set(low.to_string()),
            user_high_id: Set(high.to_string()),
            match_request_id: Set(match_request_id),
            created_at: Set(at),
        };

        ChatRoom::insert(room)
            .on_conflict(
                OnConflict::columns([
                    chat_room::Column::UserLowId,
                    chat_room::Column::UserHighId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_room_by_pair(low, high)
            .await?
            .ok_or_else(|| AppError::Internal("Chat room missing after insert".to_string()))
    }

    /// Rooms a user takes part in.
    pub async fn find_rooms_for_user(&self, user_id: &str) -> AppResult<Vec<chat_room::Model>> {
        ChatRoom::find()
            .filter(
                Condition::any()
                    .add(chat_room::Column::UserLowId.eq(user_id))
                    .add(chat_room::Column::UserHighId.eq(user_id)),
            )
            .order_by_desc(chat_room::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // === Messages ===

    /// Find a message by ID.
    pub async fn find_message(&self, id: &str) -> AppResult<Option<chat_message::Model>> {
        ChatMessage::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Persist a message.
    pub async fn create_message(
        &self,
        model: chat_message::ActiveModel,
    ) -> AppResult<chat_message::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Hard-delete a message.
    pub async fn delete_message(&self, id: &str) -> AppResult<()> {
        ChatMessage::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Messages of a room, oldest first.
    pub async fn find_messages(&self, room_id: &str) -> AppResult<Vec<chat_message::Model>> {
        ChatMessage::find()
            .filter(chat_message::Column::RoomId.eq(room_id))
            .order_by_asc(chat_message::Column::CreatedAt)
            .order_by_asc(chat_message::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Latest message of a room.
    pub async fn find_last_message(
        &self,
        room_id: &str,
    ) -> AppResult<Option<chat_message::Model>> {
        ChatMessage::find()
            .filter(chat_message::Column::RoomId.eq(room_id))
            .order_by_desc(chat_message::Column::CreatedAt)
            .order_by_desc(chat_message::Column::Id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Mark every message addressed to `receiver_id` in a room as read.
    pub async fn mark_read(&self, room_id: &str, receiver_id: &str) -> AppResult<u64> {
        let result = ChatMessage::update_many()
            .set(chat_message::ActiveModel {
                is_read: Set(true),
                ..Default::default()
            })
            .filter(chat_message::Column::RoomId.eq(room_id))
            .filter(chat_message::Column::ReceiverId.eq(receiver_id))
            .filter(chat_message::Column::IsRead.eq(false))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected)
    }

    /// Unread messages addressed to `receiver_id` in a room.
    pub async fn count_unread(&self, room_id: &str, receiver_id: &str) -> AppResult<u64> {
        ChatMessage::find()
            .filter(chat_message::Column::RoomId.eq(room_id))
            .filter(chat_message::Column::ReceiverId.eq(receiver_id))
            .filter(chat_message::Column::IsRead.eq(false))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
