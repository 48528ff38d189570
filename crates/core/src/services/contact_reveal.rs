//! Contact reveal gated by subscription tier.

use sangam_common::{AppError, AppResult};
use sangam_db::repositories::{
    LifestyleRepository, ProfileRepository, UserImageRepository, UserRepository,
};
use serde::Serialize;

use crate::services::subscription::SubscriptionService;

/// Birth details kept out of public profiles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Astrology {
    pub time_of_birth: Option<String>,
    pub place_of_birth: Option<String>,
    pub nakshatra: Option<String>,
    pub rashi: Option<String>,
}

/// Reveal quota usage after this reveal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RevealQuota {
    pub tier: Option<String>,
    pub limit: u32,
    pub used: u64,
    /// Distinct revealed profiles have reached the tier limit.
    pub reached: bool,
}

/// Private contact fields of a member.
#[derive(Debug, Clone, Serialize)]
pub struct ContactDetails {
    pub user_id: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub images: Vec<String>,
    pub astrology: Option<Astrology>,
    pub quota: RevealQuota,
}

/// Contact reveal service.
#[derive(Clone)]
pub struct ContactRevealService {
    user_repo: UserRepository,
    profile_repo: ProfileRepository,
    lifestyle_repo: LifestyleRepository,
    image_repo: UserImageRepository,
    subscriptions: SubscriptionService,
    enforce_quota: bool,
}

impl ContactRevealService {
    /// Create a new contact reveal service.
    #[must_use]
    pub const fn new(
        user_repo: UserRepository,
        profile_repo: ProfileRepository,
        lifestyle_repo: LifestyleRepository,
        image_repo: UserImageRepository,
        subscriptions: SubscriptionService,
        enforce_quota: bool,
    ) -> Self {
        Self {
            user_repo,
            profile_repo,
            lifestyle_repo,
            image_repo,
            subscriptions,
            enforce_quota,
        }
    }

    /// Reveal `target_id`'s contact details to `viewer_id`.
    pub async fn reveal(&self, viewer_id: &str, target_id: &str) -> AppResult<ContactDetails> {
        if viewer_id == target_id {
            return Err(AppError::BadRequest(
                "You already have your own contact details".to_string(),
            ));
        }

        let target = self.user_repo.get_by_id(target_id).await?;

        let entitlement = self.subscriptions.entitlement(viewer_id).await?.ok_or_else(|| {
            AppError::Forbidden("Upgrade your plan to view contact details".to_string())
        })?;
        let limit = entitlement.reveal_quota();

        let already_revealed = self.subscriptions.reveal_count(viewer_id, target_id).await? > 0;
        let used = self.subscriptions.distinct_reveals(viewer_id).await?;
        reveal_decision(already_revealed, used, limit, self.enforce_quota)?;

        self.subscriptions.record_reveal(viewer_id, target_id).await?;
        let used = if already_revealed { used } else { used + 1 };

        tracing::info!(
            viewer_id = %viewer_id,
            target_id = %target_id,
            used,
            limit,
            "Contact details revealed"
        );

        let images = self
            .image_repo
            .find_by_user(target_id)
            .await?
            .into_iter()
            .map(|i| i.image_url)
            .collect();

        let astrology = match self.profile_repo.find_by_user_id(target_id).await? {
            Some(profile) => self
                .lifestyle_repo
                .find_by_profile_id(&profile.id)
                .await?
                .map(|l| Astrology {
                    time_of_birth: l.time_of_birth,
                    place_of_birth: l.place_of_birth,
                    nakshatra: l.nakshatra,
                    rashi: l.rashi,
                }),
            None => None,
        };

        Ok(ContactDetails {
            user_id: target.id,
            email: target.email,
            phone_number: target.phone_number,
            address: target.address,
            images,
            astrology,
            quota: RevealQuota {
                tier: entitlement.tier.map(|t| t.tier),
                limit,
                used,
                reached: used >= u64::from(limit),
            },
        })
    }
}

/// Whether a reveal may proceed.
///
/// Repeat reveals of a known target never consume quota. A new target is
/// refused once `used` reaches `limit`, but only when the quota is enforced.
pub fn reveal_decision(
    already_revealed: bool,
    used: u64,
    limit: u32,
    enforce: bool,
) -> AppResult<()> {
    if enforce && !already_revealed && used >= u64::from(limit) {
        return Err(AppError::Forbidden(
            "Contact reveal limit reached for your plan".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::fixtures;
    use chrono::{Duration, Utc};
    use sangam_common::config::SubscriptionConfig;
    use sangam_db::entities::{
        contact_info_view, subscription_payment::PaymentStatus, user, user_image,
    };
    use sangam_db::repositories::{ContactInfoViewRepository, SubscriptionRepository};
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn mock() -> MockDatabase {
        MockDatabase::new(DatabaseBackend::Postgres)
    }

    fn conn(db: MockDatabase) -> Arc<sea_orm::DatabaseConnection> {
        Arc::new(db.into_connection())
    }

    fn gold_subscription() -> MockDatabase {
        mock()
            .append_query_results([[fixtures::payment(
                "pay1",
                "x",
                "p1",
                PaymentStatus::Success,
                Some(Utc::now() - Duration::days(1)),
            )]])
            .append_query_results([[fixtures::plan("p1", "Gold", 90)]])
    }

    fn view(viewer: &str, viewed: &str) -> contact_info_view::Model {
        let now = Utc::now();
        contact_info_view::Model {
            id: "v1".to_string(),
            viewer_id: viewer.to_string(),
            viewed_user_id: viewed.to_string(),
            view_count: 3,
            first_viewed_at: now.into(),
            last_viewed_at: now.into(),
        }
    }

    fn count(n: i64) -> std::collections::BTreeMap<&'static str, sea_orm::Value> {
        maplit::btreemap! { "num_items" => sea_orm::Value::BigInt(Some(n)) }
    }

    fn service(
        user_db: MockDatabase,
        subscription_db: MockDatabase,
        views_db: MockDatabase,
        enforce: bool,
    ) -> ContactRevealService {
        let subscriptions = SubscriptionService::new(
            SubscriptionRepository::new(conn(subscription_db)),
            ContactInfoViewRepository::new(conn(views_db)),
            SubscriptionConfig::default().tiers,
        );
        ContactRevealService::new(
            UserRepository::new(conn(user_db)),
            ProfileRepository::new(conn(
                mock().append_query_results([Vec::<sangam_db::entities::profile::Model>::new()]),
            )),
            LifestyleRepository::new(fixtures::empty_db()),
            UserImageRepository::new(conn(
                mock().append_query_results([Vec::<user_image::Model>::new()]),
            )),
            subscriptions,
            enforce,
        )
    }

    #[test]
    fn test_reveal_decision_advisory_never_blocks() {
        assert!(reveal_decision(false, 45, 45, false).is_ok());
        assert!(reveal_decision(false, 100, 45, false).is_ok());
    }

    #[test]
    fn test_reveal_decision_enforced_blocks_new_targets_only() {
        assert!(reveal_decision(false, 44, 45, true).is_ok());
        assert!(matches!(
            reveal_decision(false, 45, 45, true),
            Err(AppError::Forbidden(_))
        ));
        assert!(reveal_decision(true, 45, 45, true).is_ok());
    }

    #[tokio::test]
    async fn test_reveal_self_is_bad_request() {
        let service = service(mock(), mock(), mock(), false);
        let result = service.reveal("x", "x").await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_reveal_without_subscription_is_forbidden() {
        let service = service(
            mock().append_query_results([[fixtures::user("y", "Priya")]]),
            mock().append_query_results([Vec::<
                sangam_db::entities::subscription_payment::Model,
            >::new()]),
            mock(),
            false,
        );

        let result = service.reveal("x", "y").await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_reveal_missing_target_is_not_found() {
        let service = service(
            mock().append_query_results([Vec::<user::Model>::new()]),
            mock(),
            mock(),
            false,
        );

        let result = service.reveal("x", "ghost").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_reveal_new_target_counts_toward_quota() {
        let service = service(
            mock().append_query_results([[fixtures::user("y", "Priya")]]),
            gold_subscription(),
            mock()
                .append_query_results([Vec::<contact_info_view::Model>::new()])
                .append_query_results([[count(44)]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }]),
            false,
        );

        let details = service.reveal("x", "y").await.unwrap();
        assert_eq!(details.email, "y@example.com");
        assert_eq!(details.phone_number.as_deref(), Some("9876543210"));
        assert_eq!(details.quota.tier.as_deref(), Some("gold"));
        assert_eq!(details.quota.limit, 45);
        assert_eq!(details.quota.used, 45);
        assert!(details.quota.reached);
    }

    #[tokio::test]
    async fn test_repeat_reveal_does_not_consume_quota() {
        let service = service(
            mock().append_query_results([[fixtures::user("y", "Priya")]]),
            gold_subscription(),
            mock()
                .append_query_results([[view("x", "y")]])
                .append_query_results([[count(10)]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }]),
            true,
        );

        let details = service.reveal("x", "y").await.unwrap();
        assert_eq!(details.quota.used, 10);
        assert!(!details.quota.reached);
    }

    #[tokio::test]
    async fn test_enforced_quota_refuses_new_target() {
        let service = service(
            mock().append_query_results([[fixtures::user("y", "Priya")]]),
            gold_subscription(),
            mock()
                .append_query_results([Vec::<contact_info_view::Model>::new()])
                .append_query_results([[count(45)]]),
            true,
        );

        let result = service.reveal("x", "y").await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }
}
