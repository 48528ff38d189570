//! Subscription ledger: entitlement, tiers and reveal counters.

use chrono::{DateTime, Duration, Utc};
use sangam_common::{AppError, AppResult, config::TierRule};
use sangam_db::{
    entities::{subscription_payment, subscription_payment::PaymentStatus, subscription_plan},
    repositories::{ContactInfoViewRepository, SubscriptionRepository},
};
use serde::{Deserialize, Serialize};

/// A currently valid subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entitlement {
    pub plan: subscription_plan::Model,
    pub payment_id: String,
    pub paid_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    /// Tier matched from the plan name, if any.
    pub tier: Option<TierRule>,
}

impl Entitlement {
    /// Reveal quota of the tier. Plans matching no tier get none.
    #[must_use]
    pub fn reveal_quota(&self) -> u32 {
        self.tier.as_ref().map_or(0, |t| t.quota)
    }
}

/// Subscription summary shown to the member.
#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionStatus {
    pub entitled: bool,
    pub plan_name: Option<String>,
    pub tier: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub reveal_limit: u32,
    pub reveals_used: u64,
}

/// Final state of a payment attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentOutcome {
    Success,
    Failed,
}

/// Subscription service.
#[derive(Clone)]
pub struct SubscriptionService {
    repo: SubscriptionRepository,
    views: ContactInfoViewRepository,
    tiers: Vec<TierRule>,
}

impl SubscriptionService {
    /// Create a new subscription service.
    #[must_use]
    pub const fn new(
        repo: SubscriptionRepository,
        views: ContactInfoViewRepository,
        tiers: Vec<TierRule>,
    ) -> Self {
        Self { repo, views, tiers }
    }

    /// Active plans, cheapest first.
    pub async fn list_plans(&self) -> AppResult<Vec<subscription_plan::Model>> {
        self.repo.find_active_plans().await
    }

    /// The user's valid subscription at `now`, if any.
    pub async fn entitlement_at(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<Entitlement>> {
        let Some(payment) = self.repo.find_latest_success(user_id).await? else {
            return Ok(None);
        };
        let Some(paid_at) = payment.paid_at else {
            return Ok(None);
        };
        let Some(plan) = self.repo.find_plan(&payment.plan_id).await? else {
            return Ok(None);
        };

        let paid_at = paid_at.with_timezone(&Utc);
        if !is_current(&plan, paid_at, now) {
            return Ok(None);
        }

        Ok(Some(Entitlement {
            expires_at: expires_at(paid_at, plan.validity_days),
            tier: tier_for_plan(&plan.plan_name, &self.tiers).cloned(),
            payment_id: payment.id,
            paid_at,
            plan,
        }))
    }

    /// The user's valid subscription right now, if any.
    pub async fn entitlement(&self, user_id: &str) -> AppResult<Option<Entitlement>> {
        self.entitlement_at(user_id, Utc::now()).await
    }

    /// Whether the user holds a valid subscription right now.
    pub async fn is_entitled(&self, user_id: &str) -> AppResult<bool> {
        Ok(self.entitlement(user_id).await?.is_some())
    }

    /// Tier of the user's current plan. `None` when not entitled or no tier matches.
    pub async fn entitlement_tier(&self, user_id: &str) -> AppResult<Option<TierRule>> {
        Ok(self.entitlement(user_id).await?.and_then(|e| e.tier))
    }

    /// How often `viewer_id` has revealed `target_id`.
    pub async fn reveal_count(&self, viewer_id: &str, target_id: &str) -> AppResult<i32> {
        Ok(self
            .views
            .find_by_pair(viewer_id, target_id)
            .await?
            .map_or(0, |v| v.view_count))
    }

    /// Number of distinct profiles `viewer_id` has revealed.
    pub async fn distinct_reveals(&self, viewer_id: &str) -> AppResult<u64> {
        self.views.count_distinct_targets(viewer_id).await
    }

    /// Count a reveal. The pair counts once toward the quota however often it repeats.
    pub async fn record_reveal(&self, viewer_id: &str, target_id: &str) -> AppResult<()> {
        self.views
            .record(crate::generate_id(), viewer_id, target_id, Utc::now().into())
            .await
    }

    /// Subscription summary for the member.
    pub async fn status(&self, user_id: &str) -> AppResult<SubscriptionStatus> {
        let entitlement = self.entitlement(user_id).await?;
        let reveals_used = self.distinct_reveals(user_id).await?;

        Ok(match entitlement {
            Some(e) => SubscriptionStatus {
                entitled: true,
                reveal_limit: e.reveal_quota(),
                tier: e.tier.map(|t| t.tier),
                plan_name: Some(e.plan.plan_name),
                expires_at: Some(e.expires_at),
                reveals_used,
            },
            None => SubscriptionStatus {
                entitled: false,
                plan_name: None,
                tier: None,
                expires_at: None,
                reveal_limit: 0,
                reveals_used,
            },
        })
    }

    /// Resolve a pending payment. Only the first writer succeeds; later
    /// attempts get `Conflict` and change nothing.
    pub async fn record_payment_outcome(
        &self,
        payment_id: &str,
        outcome: PaymentOutcome,
    ) -> AppResult<subscription_payment::Model> {
        let payment = self
            .repo
            .find_payment(payment_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Payment not found".to_string()))?;

        if payment.status != PaymentStatus::Pending {
            return Err(AppError::Conflict("Payment is already resolved".to_string()));
        }

        let (status, paid_at) = match outcome {
            PaymentOutcome::Success => (PaymentStatus::Success, Some(Utc::now().into())),
            PaymentOutcome::Failed => (PaymentStatus::Failed, None),
        };

        if !self.repo.resolve_pending(payment_id, status, paid_at).await? {
            return Err(AppError::Conflict("Payment is already resolved".to_string()));
        }

        tracing::info!(payment_id = %payment_id, user_id = %payment.user_id, ?outcome, "Payment resolved");
        Ok(subscription_payment::Model {
            status,
            paid_at,
            ..payment
        })
    }
}

/// Expiry instant of a plan paid at `paid_at`.
#[must_use]
pub fn expires_at(paid_at: DateTime<Utc>, validity_days: i32) -> DateTime<Utc> {
    paid_at + Duration::days(i64::from(validity_days))
}

/// Whether a plan paid at `paid_at` is still valid at `now`.
#[must_use]
pub fn is_current(plan: &subscription_plan::Model, paid_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    plan.is_active && now < expires_at(paid_at, plan.validity_days)
}

/// First tier whose keyword occurs in the plan name, ignoring case.
#[must_use]
pub fn tier_for_plan<'a>(plan_name: &str, tiers: &'a [TierRule]) -> Option<&'a TierRule> {
    let name = plan_name.to_lowercase();
    tiers
        .iter()
        .find(|t| !t.keyword.is_empty() && name.contains(&t.keyword.to_lowercase()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::fixtures;
    use chrono::TimeZone;
    use sangam_common::config::SubscriptionConfig;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn tiers() -> Vec<TierRule> {
        SubscriptionConfig::default().tiers
    }

    fn service(db: MockDatabase) -> SubscriptionService {
        SubscriptionService::new(
            SubscriptionRepository::new(Arc::new(db.into_connection())),
            ContactInfoViewRepository::new(fixtures::empty_db()),
            tiers(),
        )
    }

    #[test]
    fn test_tier_for_plan_matches_keyword_case_insensitively() {
        let tiers = tiers();
        assert_eq!(tier_for_plan("GOLD Annual", &tiers).unwrap().quota, 45);
        assert_eq!(tier_for_plan("silver-3m", &tiers).unwrap().quota, 27);
        assert_eq!(tier_for_plan("Platinum Plus", &tiers).unwrap().quota, 120);
        assert!(tier_for_plan("Basic", &tiers).is_none());
    }

    #[test]
    fn test_is_current_boundaries() {
        let plan = fixtures::plan("p1", "Gold", 30);
        let paid = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();

        assert!(is_current(&plan, paid, paid + Duration::days(29)));
        assert!(!is_current(&plan, paid, paid + Duration::days(30)));

        let mut inactive = plan;
        inactive.is_active = false;
        assert!(!is_current(&inactive, paid, paid + Duration::days(1)));
    }

    #[tokio::test]
    async fn test_entitlement_with_current_payment() {
        let now = Utc::now();
        let paid = now - Duration::days(3);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[fixtures::payment(
                "pay1",
                "u1",
                "p1",
                PaymentStatus::Success,
                Some(paid),
            )]])
            .append_query_results([[fixtures::plan("p1", "Gold Quarterly", 90)]]);

        let entitlement = service(db).entitlement_at("u1", now).await.unwrap().unwrap();
        assert_eq!(entitlement.payment_id, "pay1");
        assert_eq!(entitlement.reveal_quota(), 45);
        assert_eq!(entitlement.tier.unwrap().tier, "gold");
    }

    #[tokio::test]
    async fn test_expired_payment_is_not_entitled() {
        let now = Utc::now();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[fixtures::payment(
                "pay1",
                "u1",
                "p1",
                PaymentStatus::Success,
                Some(now - Duration::days(31)),
            )]])
            .append_query_results([[fixtures::plan("p1", "Silver", 30)]]);

        assert!(service(db).entitlement_at("u1", now).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_no_payment_is_not_entitled() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<subscription_payment::Model>::new()]);

        assert!(!service(db).is_entitled("u1").await.unwrap());
    }

    #[tokio::test]
    async fn test_record_payment_outcome_on_resolved_payment_is_conflict() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[
            fixtures::payment("pay1", "u1", "p1", PaymentStatus::Failed, None),
        ]]);

        let result = service(db)
            .record_payment_outcome("pay1", PaymentOutcome::Success)
            .await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_record_payment_outcome_loses_race() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[fixtures::payment(
                "pay1",
                "u1",
                "p1",
                PaymentStatus::Pending,
                None,
            )]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }]);

        let result = service(db)
            .record_payment_outcome("pay1", PaymentOutcome::Success)
            .await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_record_payment_success_sets_paid_at() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[fixtures::payment(
                "pay1",
                "u1",
                "p1",
                PaymentStatus::Pending,
                None,
            )]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }]);

        let payment = service(db)
            .record_payment_outcome("pay1", PaymentOutcome::Success)
            .await
            .unwrap();
        assert_eq!(payment.status, PaymentStatus::Success);
        assert!(payment.paid_at.is_some());
    }
}
