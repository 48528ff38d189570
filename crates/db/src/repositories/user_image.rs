//! User image repository.

use std::sync::Arc;

use crate::entities::{UserImage, user_image};
use sangam_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};

/// User image repository for database operations.
#[derive(Clone)]
pub struct UserImageRepository {
    db: Arc<DatabaseConnection>,
}

impl UserImageRepository {
    /// Create a new user image repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Images of a user, oldest first.
    pub async fn find_by_user(&self, user_id: &str) -> AppResult<Vec<user_image::Model>> {
        UserImage::find()
            .filter(user_image::Column::UserId.eq(user_id))
            .order_by_asc(user_image::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Add an image.
    pub async fn create(&self, model: user_image::ActiveModel) -> AppResult<user_image::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete one of the user's images. Returns `false` if no such image
    /// belongs to the user.
    pub async fn delete_owned(&self, id: &str, user_id: &str) -> AppResult<bool> {
        let result = UserImage::delete_many()
            .filter(user_image::Column::Id.eq(id))
            .filter(user_image::Column::UserId.eq(user_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected == 1)
    }
}
