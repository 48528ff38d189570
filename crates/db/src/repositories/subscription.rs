//! Subscription plan and payment repository.

use std::sync::Arc;

use crate::entities::{
    SubscriptionPayment, SubscriptionPlan, subscription_payment,
    subscription_payment::PaymentStatus, subscription_plan,
};
use sangam_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    prelude::DateTimeWithTimeZone,
};

/// Subscription repository for database operations.
#[derive(Clone)]
pub struct SubscriptionRepository {
    db: Arc<DatabaseConnection>,
}

impl SubscriptionRepository {
    /// Create a new subscription repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Active plans, cheapest first.
    pub async fn find_active_plans(&self) -> AppResult<Vec<subscription_plan::Model>> {
        SubscriptionPlan::find()
            .filter(subscription_plan::Column::IsActive.eq(true))
            .order_by_asc(subscription_plan::Column::Price)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a plan by ID.
    pub async fn find_plan(&self, id: &str) -> AppResult<Option<subscription_plan::Model>> {
        SubscriptionPlan::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// The user's most recent successful payment.
    pub async fn find_latest_success(
        &self,
        user_id: &str,
    ) -> AppResult<Option<subscription_payment::Model>> {
        SubscriptionPayment::find()
            .filter(subscription_payment::Column::UserId.eq(user_id))
            .filter(subscription_payment::Column::Status.eq(PaymentStatus::Success))
            .filter(subscription_payment::Column::PaidAt.is_not_null())
            .order_by_desc(subscription_payment::Column::PaidAt)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a payment by ID.
    pub async fn find_payment(&self, id: &str) -> AppResult<Option<subscription_payment::Model>> {
        SubscriptionPayment::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Record a new payment attempt.
    pub async fn create_payment(
        &self,
        model: subscription_payment::ActiveModel,
    ) -> AppResult<subscription_payment::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| super::insert_error(e, "Transaction already recorded"))
    }

    /// Move a pending payment to `status`.
    ///
    /// Returns `false` when the payment was no longer pending, so exactly
    /// one writer wins.
    pub async fn resolve_pending(
        &self,
        id: &str,
        status: PaymentStatus,
        paid_at: Option<DateTimeWithTimeZone>,
    ) -> AppResult<bool> {
        let result = SubscriptionPayment::update_many()
            .set(subscription_payment::ActiveModel {
                status: Set(status),
                paid_at: Set(paid_at),
                ..Default::default()
            })
            .filter(subscription_payment::Column::Id.eq(id))
            .filter(subscription_payment::Column::Status.eq(PaymentStatus::Pending))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected == 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    #[tokio::test]
    async fn test_resolve_pending_only_once() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 1,
                    },
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 0,
                    },
                ])
                .into_connection(),
        );

        let repo = SubscriptionRepository::new(db);
        let first = repo
            .resolve_pending("pay1", PaymentStatus::Success, Some(chrono::Utc::now().into()))
            .await
            .unwrap();
        let second = repo
            .resolve_pending("pay1", PaymentStatus::Failed, None)
            .await
            .unwrap();

        assert!(first);
        assert!(!second);
    }
}
