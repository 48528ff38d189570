//! Religion and caste taxonomy repository.

use std::sync::Arc;

use crate::entities::{Caste, caste, caste::CasteLevel};
use sangam_common::{AppError, AppResult};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};

/// Caste repository for database operations.
#[derive(Clone)]
pub struct CasteRepository {
    db: Arc<DatabaseConnection>,
}

impl CasteRepository {
    /// Create a new caste repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a node by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<caste::Model>> {
        Caste::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find nodes by IDs.
    pub async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<caste::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        Caste::find()
            .filter(caste::Column::Id.is_in(ids.to_vec()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Active religions, by name.
    pub async fn find_religions(&self) -> AppResult<Vec<caste::Model>> {
        Caste::find()
            .filter(caste::Column::Level.eq(CasteLevel::Religion))
            .filter(caste::Column::IsActive.eq(true))
            .order_by_asc(caste::Column::Name)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Active castes under a religion, by name.
    pub async fn find_castes(&self, religion_id: &str) -> AppResult<Vec<caste::Model>> {
        Caste::find()
            .filter(caste::Column::Level.eq(CasteLevel::Caste))
            .filter(caste::Column::ParentId.eq(religion_id))
            .filter(caste::Column::IsActive.eq(true))
            .order_by_asc(caste::Column::Name)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
