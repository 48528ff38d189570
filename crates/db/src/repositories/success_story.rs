//! Success story repository.

use std::sync::Arc;

use crate::entities::{SuccessStory, success_story};
use sangam_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect,
};

/// Success story repository for database operations.
#[derive(Clone)]
pub struct SuccessStoryRepository {
    db: Arc<DatabaseConnection>,
}

impl SuccessStoryRepository {
    /// Create a new success story repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Create a story.
    pub async fn create(
        &self,
        model: success_story::ActiveModel,
    ) -> AppResult<success_story::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Stories by everyone except `exclude_user_id`, newest first.
    pub async fn find_public(
        &self,
        exclude_user_id: Option<&str>,
        limit: u64,
    ) -> AppResult<Vec<success_story::Model>> {
        let mut query = SuccessStory::find().order_by_desc(success_story::Column::CreatedAt);
        if let Some(user_id) = exclude_user_id {
            query = query.filter(success_story::Column::UserId.ne(user_id));
        }

        query
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Stories written by a user, newest first.
    pub async fn find_by_user(&self, user_id: &str) -> AppResult<Vec<success_story::Model>> {
        SuccessStory::find()
            .filter(success_story::Column::UserId.eq(user_id))
            .order_by_desc(success_story::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete one of the user's stories. Returns `false` if it is not theirs.
    pub async fn delete_owned(&self, id: &str, user_id: &str) -> AppResult<bool> {
        let result = SuccessStory::delete_many()
            .filter(success_story::Column::Id.eq(id))
            .filter(success_story::Column::UserId.eq(user_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected == 1)
    }
}
