//! Contact reveal counter repository.

use std::sync::Arc;

use crate::entities::{ContactInfoView, contact_info_view};
use sangam_common::{AppError, AppResult};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, Set,
    prelude::DateTimeWithTimeZone,
    sea_query::{Expr, OnConflict},
};

/// Contact reveal repository for database operations.
#[derive(Clone)]
pub struct ContactInfoViewRepository {
    db: Arc<DatabaseConnection>,
}

impl ContactInfoViewRepository {
    /// Create a new contact reveal repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Counter row for a (viewer, viewed user) pair.
    pub async fn find_by_pair(
        &self,
        viewer_id: &str,
        viewed_user_id: &str,
    ) -> AppResult<Option<contact_info_view::Model>> {
        ContactInfoView::find()
            .filter(contact_info_view::Column::ViewerId.eq(viewer_id))
            .filter(contact_info_view::Column::ViewedUserId.eq(viewed_user_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Number of distinct profiles a viewer has revealed.
    pub async fn count_distinct_targets(&self, viewer_id: &str) -> AppResult<u64> {
        ContactInfoView::find()
            .filter(contact_info_view::Column::ViewerId.eq(viewer_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Record a reveal: insert the pair with a count of one, or bump the
    /// existing row's count and `last_viewed_at`.
    pub async fn record(
        &self,
        id: String,
        viewer_id: &str,
        viewed_user_id: &str,
        at: DateTimeWithTimeZone,
    ) -> AppResult<()> {
        let model = contact_info_view::ActiveModel {
            id: Set(id),
            viewer_id: Set(viewer_id.to_string()),
            viewed_user_id: Set(viewed_user_id.to_string()),
            view_count: Set(1),
            first_viewed_at: Set(at),
            last_viewed_at: Set(at),
        };

        ContactInfoView::insert(model)
            .on_conflict(
                OnConflict::columns([
                    contact_info_view::Column::ViewerId,
                    contact_info_view::Column::ViewedUserId,
                ])
                .value(
                    contact_info_view::Column::ViewCount,
                    Expr::col((ContactInfoView, contact_info_view::Column::ViewCount)).add(1),
                )
                .update_column(contact_info_view::Column::LastViewedAt)
                .to_owned(),
            )
            .exec_without_returning(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}
