//! Match request repository.

use std::sync::Arc;

use crate::entities::{
    ChatRoom, MatchRequest, chat_room, match_request, match_request::MatchStatus,
};
use sangam_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait, prelude::DateTimeWithTimeZone, sea_query::OnConflict,
};

use super::insert_error;

/// Match request repository for database operations.
#[derive(Clone)]
pub struct MatchRequestRepository {
    db: Arc<DatabaseConnection>,
}

fn between(a: &str, b: &str) -> Condition {
    Condition::any()
        .add(
            Condition::all()
                .add(match_request::Column::FromUserId.eq(a))
                .add(match_request::Column::ToUserId.eq(b)),
        )
        .add(
            Condition::all()
                .add(match_request::Column::FromUserId.eq(b))
                .add(match_request::Column::ToUserId.eq(a)),
        )
}

impl MatchRequestRepository {
    /// Create a new match request repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a match request by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<match_request::Model>> {
        MatchRequest::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a request between two users in either direction.
    pub async fn find_between(
        &self,
        a: &str,
        b: &str,
    ) -> AppResult<Option<match_request::Model>> {
        MatchRequest::find()
            .filter(between(a, b))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new match request.
    ///
    /// A second request for the same two users fails with `Conflict`:
    /// `idx_match_request_from_to` covers the same direction and the
    /// `LEAST`/`GREATEST` expression index `idx_match_request_pair` the reverse.
    pub async fn create(&self, model: match_request::ActiveModel) -> AppResult<match_request::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| insert_error(e, "Interest already exists between these users"))
    }

    /// Requests sent by a user, any status, newest first.
    pub async fn find_sent(&self, user_id: &str) -> AppResult<Vec<match_request::Model>> {
        MatchRequest::find()
            .filter(match_request::Column::FromUserId.eq(user_id))
            .order_by_desc(match_request::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Pending requests addressed to a user, newest first.
    pub async fn find_received_pending(
        &self,
        user_id: &str,
    ) -> AppResult<Vec<match_request::Model>> {
        MatchRequest::find()
            .filter(match_request::Column::ToUserId.eq(user_id))
            .filter(match_request::Column::Status.eq(MatchStatus::Pending))
            .order_by_desc(match_request::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Users linked to `user_id` by a request in either direction, any status.
    pub async fn find_linked_user_ids(&self, user_id: &str) -> AppResult<Vec<String>> {
        let requests = MatchRequest::find()
            .filter(
                Condition::any()
                    .add(match_request::Column::FromUserId.eq(user_id))
                    .add(match_request::Column::ToUserId.eq(user_id)),
            )
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(requests
            .into_iter()
            .map(|r| {
                if r.from_user_id == user_id {
                    r.to_user_id
                } else {
                    r.from_user_id
                }
            })
            .collect())
    }

    /// Move a pending request to `rejected`. Returns `false` if it was not pending.
    pub async fn reject(&self, id: &str, at: DateTimeWithTimeZone) -> AppResult<bool> {
        let result = MatchRequest::update_many()
            .set(match_request::ActiveModel {
                status: Set(MatchStatus::Rejected),
                updated_at: Set(Some(at)),
                ..Default::default()
            })
            .filter(match_request::Column::Id.eq(id))
            .filter(match_request::Column::Status.eq(MatchStatus::Pending))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected == 1)
    }

    /// Accept a pending request and get-or-create the pair's chat room in
    /// one transaction.
    ///
    /// Returns `None` (and changes nothing) if the request was not pending.
    /// The room insert is `ON CONFLICT DO NOTHING` on the canonical pair, so
    /// the pair never ends up with two rooms.
    pub async fn accept_and_open_room(
        &self,
        request: &match_request::Model,
        room_id: String,
        at: DateTimeWithTimeZone,
    ) -> AppResult<Option<chat_room::Model>> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let updated = MatchRequest::update_many()
            .set(match_request::ActiveModel {
                status: Set(MatchStatus::Accepted),
                updated_at: Set(Some(at)),
                ..Default::default()
            })
            .filter(match_request::Column::Id.eq(&request.id))
            .filter(match_request::Column::Status.eq(MatchStatus::Pending))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if updated.rows_affected != 1 {
            txn.rollback()
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
            return Ok(None);
        }

        let (low, high) = chat_room::canonical_pair(&request.from_user_id, &request.to_user_id);
        let room = chat_room::ActiveModel {
            id: Set(room_id),
            user_low_id: Set(low.to_string()),
            user_high_id: Set(high.to_string()),
            match_request_id: Set(Some(request.id.clone())),
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
            .exec_without_returning(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let room = ChatRoom::find()
            .filter(chat_room::Column::UserLowId.eq(low))
            .filter(chat_room::Column::UserHighId.eq(high))
            .one(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .ok_or_else(|| AppError::Internal("Chat room missing after insert".to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(Some(room))
    }
}
