//! Lifestyle repository.

use std::sync::Arc;

use crate::entities::{Lifestyle, lifestyle};
use sangam_common::{AppError, AppResult};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

/// Lifestyle repository for database operations.
#[derive(Clone)]
pub struct LifestyleRepository {
    db: Arc<DatabaseConnection>,
}

impl LifestyleRepository {
    /// Create a new lifestyle repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find the lifestyle row of a profile.
    pub async fn find_by_profile_id(
        &self,
        profile_id: &str,
    ) -> AppResult<Option<lifestyle::Model>> {
        Lifestyle::find()
            .filter(lifestyle::Column::ProfileId.eq(profile_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a lifestyle row.
    pub async fn create(&self, model: lifestyle::ActiveModel) -> AppResult<lifestyle::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| super::insert_error(e, "Lifestyle already exists for this profile"))
    }

    /// Update a lifestyle row.
    pub async fn update(&self, model: lifestyle::ActiveModel) -> AppResult<lifestyle::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
