//! Profile repository, including the candidate query used for matching.

use std::sync::Arc;

use crate::entities::{Lifestyle, Profile, User, lifestyle, profile, profile::Gender, user};
use sangam_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, IdenStatic,
    QueryFilter, QueryOrder,
    sea_query::{Expr, Func, SimpleExpr},
};
use serde::Deserialize;

use super::{contains_pattern, insert_error};

/// Optional narrowing of the candidate list. Every set field must match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CandidateFilters {
    pub education: Option<String>,
    pub annual_income: Option<String>,
    pub country: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
    pub family_status: Option<String>,
    pub marital_status: Option<String>,
    pub occupation: Option<String>,
    pub eating_habits: Option<String>,
    pub smoking: Option<String>,
    pub drinking: Option<String>,
}

impl CandidateFilters {
    fn uses_lifestyle(&self) -> bool {
        [&self.eating_habits, &self.smoking, &self.drinking]
            .into_iter()
            .any(|v| non_blank(v).is_some())
    }
}

/// A filter value that constrains the query; blank counts as unset.
fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

/// Inputs to [`ProfileRepository::find_candidates`].
#[derive(Debug, Clone)]
pub struct CandidateQuery<'a> {
    pub requester_id: &'a str,
    /// Gender to show; `None` shows everyone.
    pub gender: Option<Gender>,
    pub religion_id: Option<&'a str>,
    /// Caste to require in addition to religion.
    pub caste_id: Option<&'a str>,
    /// Users already linked to the requester by a match request.
    pub excluded_user_ids: &'a [String],
    pub filters: &'a CandidateFilters,
}

/// Lowercased, table-qualified column.
fn lower_col<E, C>(entity: E, column: C) -> SimpleExpr
where
    E: IdenStatic,
    C: IdenStatic,
{
    Func::lower(Expr::col((entity, column))).into()
}

fn matches_text<E, C>(entity: E, column: C, value: &str) -> SimpleExpr
where
    E: IdenStatic,
    C: IdenStatic,
{
    Expr::expr(lower_col(entity, column)).like(contains_pattern(value.trim()))
}

fn equals_text<E, C>(entity: E, column: C, value: &str) -> SimpleExpr
where
    E: IdenStatic,
    C: IdenStatic,
{
    Expr::expr(lower_col(entity, column)).eq(value.trim().to_lowercase())
}

/// Profile repository for database operations.
#[derive(Clone)]
pub struct ProfileRepository {
    db: Arc<DatabaseConnection>,
}

impl ProfileRepository {
    /// Create a new profile repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a profile by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<profile::Model>> {
        Profile::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find the profile of a user.
    pub async fn find_by_user_id(&self, user_id: &str) -> AppResult<Option<profile::Model>> {
        Profile::find()
            .filter(profile::Column::UserId.eq(user_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find the profile of a user, returning an error if it does not exist.
    pub async fn get_by_user_id(&self, user_id: &str) -> AppResult<profile::Model> {
        self.find_by_user_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Profile for user {user_id}")))
    }

    /// Find profiles for several users.
    pub async fn find_by_user_ids(&self, user_ids: &[String]) -> AppResult<Vec<profile::Model>> {
        if user_ids.is_empty() {
            return Ok(vec![]);
        }

        Profile::find()
            .filter(profile::Column::UserId.is_in(user_ids.to_vec()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new profile.
    pub async fn create(&self, model: profile::ActiveModel) -> AppResult<profile::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| insert_error(e, "Profile already exists"))
    }

    /// Update a profile.
    pub async fn update(&self, model: profile::ActiveModel) -> AppResult<profile::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Profiles compatible with the requester, newest first.
    pub async fn find_candidates(&self, q: &CandidateQuery<'_>) -> AppResult<Vec<profile::Model>> {
        let mut condition = Condition::all()
            .add(profile::Column::UserId.ne(q.requester_id))
            .add(user::Column::IsDeleted.eq(false))
            .add(user::Column::IsActive.eq(true));

        if let Some(gender) = q.gender {
            condition = condition.add(profile::Column::Gender.eq(gender));
        }
        if let Some(religion_id) = q.religion_id {
            condition = condition.add(profile::Column::ReligionId.eq(religion_id));
        }
        if let Some(caste_id) = q.caste_id {
            condition = condition.add(profile::Column::CasteId.eq(caste_id));
        }
        if !q.excluded_user_ids.is_empty() {
            condition =
                condition.add(profile::Column::UserId.is_not_in(q.excluded_user_ids.to_vec()));
        }

        let f = q.filters;
        let substring = [
            (profile::Column::Education, &f.education),
            (profile::Column::Occupation, &f.occupation),
            (profile::Column::Country, &f.country),
            (profile::Column::State, &f.state),
            (profile::Column::City, &f.city),
        ];
        for (column, value) in substring {
            if let Some(v) = non_blank(value) {
                condition = condition.add(matches_text(profile::Entity, column, v));
            }
        }

        let exact = [
            (profile::Column::AnnualIncome, &f.annual_income),
            (profile::Column::FamilyStatus, &f.family_status),
            (profile::Column::MaritalStatus, &f.marital_status),
        ];
        for (column, value) in exact {
            if let Some(v) = non_blank(value) {
                condition = condition.add(equals_text(profile::Entity, column, v));
            }
        }

        let habits = [
            (lifestyle::Column::EatingHabits, &f.eating_habits),
            (lifestyle::Column::Smoking, &f.smoking),
            (lifestyle::Column::Drinking, &f.drinking),
        ];
        for (column, value) in habits {
            if let Some(v) = non_blank(value) {
                condition = condition.add(equals_text(lifestyle::Entity, column, v));
            }
        }

        let mut query = Profile::find().inner_join(User);
        if f.uses_lifestyle() {
            query = query.inner_join(Lifestyle);
        }

        query
            .filter(condition)
            .order_by_desc(profile::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use sea_orm::{DatabaseBackend, MockDatabase};

    pub(crate) fn create_test_profile(id: &str, user_id: &str, gender: Gender) -> profile::Model {
        profile::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            this_account_for: Some("self".to_string()),
            mother_tongue: Some("Tamil".to_string()),
            gender: Some(gender),
            date_of_birth: NaiveDate::from_ymd_opt(1995, 6, 15),
            height: Some("170".to_string()),
            physical_status: None,
            marital_status: Some("never_married".to_string()),
            children_count: None,
            children_with_me: None,
            religion_id: Some("rel_hindu".to_string()),
            caste_id: Some("caste_iyer".to_string()),
            sub_caste: None,
            willing_inter_caste: false,
            education: Some("B.Tech".to_string()),
            field_of_study: None,
            occupation: Some("Engineer".to_string()),
            annual_income: Some("10-15L".to_string()),
            country: Some("India".to_string()),
            state: Some("Tamil Nadu".to_string()),
            city: Some("Chennai".to_string()),
            family_status: None,
            family_worth: None,
            description: None,
            terms_accepted: true,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_get_by_user_id_missing() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<profile::Model>::new()])
                .into_connection(),
        );

        let repo = ProfileRepository::new(db);
        let result = repo.get_by_user_id("u1").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    /// SQL of every statement the mock connection received.
    fn logged_sql(db: Arc<DatabaseConnection>) -> String {
        let db = Arc::try_unwrap(db).ok().unwrap();
        db.into_transaction_log()
            .iter()
            .flat_map(|t| t.statements())
            .map(|stmt| stmt.sql.clone())
            .collect::<Vec<_>>()
            .join("\n")
    }

    async fn candidate_sql(filters: &CandidateFilters, excluded: &[String]) -> String {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<profile::Model>::new()])
                .into_connection(),
        );

        let repo = ProfileRepository::new(Arc::clone(&db));
        let query = CandidateQuery {
            requester_id: "u1",
            gender: Some(Gender::Female),
            religion_id: Some("rel_hindu"),
            caste_id: Some("caste_iyer"),
            excluded_user_ids: excluded,
            filters,
        };
        repo.find_candidates(&query).await.unwrap();
        drop(repo);

        logged_sql(db)
    }

    #[tokio::test]
    async fn test_find_candidates_sql_predicates() {
        let excluded = vec!["u9".to_string()];
        let sql = candidate_sql(&CandidateFilters::default(), &excluded).await;

        assert!(sql.contains(r#"INNER JOIN "user""#), "{sql}");
        assert!(sql.contains(r#""profile"."user_id" <> $"#), "{sql}");
        assert!(sql.contains(r#""user"."is_deleted" = $"#), "{sql}");
        assert!(sql.contains(r#""profile"."gender" = "#), "{sql}");
        assert!(sql.contains(r#""profile"."religion_id" = $"#), "{sql}");
        assert!(sql.contains(r#""profile"."caste_id" = $"#), "{sql}");
        assert!(sql.contains(r#""profile"."user_id" NOT IN ($"#), "{sql}");
        assert!(sql.contains(r#"ORDER BY "profile"."created_at" DESC"#), "{sql}");
        assert!(!sql.contains(r#""lifestyle""#), "{sql}");
    }

    #[tokio::test]
    async fn test_find_candidates_habit_filter_joins_lifestyle() {
        let filters = CandidateFilters {
            smoking: Some("no".to_string()),
            ..Default::default()
        };
        let sql = candidate_sql(&filters, &[]).await;

        assert!(sql.contains(r#"INNER JOIN "lifestyle""#), "{sql}");
        assert!(!sql.contains("NOT IN"), "{sql}");
    }

    #[tokio::test]
    async fn test_find_candidates_blank_habit_filter_skips_lifestyle() {
        let filters = CandidateFilters {
            smoking: Some(String::new()),
            drinking: Some("  ".to_string()),
            ..Default::default()
        };
        let sql = candidate_sql(&filters, &[]).await;

        assert!(!sql.contains(r#""lifestyle""#), "{sql}");
    }

    #[tokio::test]
    async fn test_find_candidates_returns_rows() {
        let rows = vec![
            create_test_profile("p2", "u2", Gender::Female),
            create_test_profile("p3", "u3", Gender::Female),
        ];

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([rows])
                .into_connection(),
        );

        let repo = ProfileRepository::new(db);
        let filters = CandidateFilters {
            city: Some("chen".to_string()),
            smoking: Some("no".to_string()),
            ..Default::default()
        };
        let excluded = vec!["u9".to_string()];
        let query = CandidateQuery {
            requester_id: "u1",
            gender: Some(Gender::Female),
            religion_id: Some("rel_hindu"),
            caste_id: Some("caste_iyer"),
            excluded_user_ids: &excluded,
            filters: &filters,
        };

        let result = repo.find_candidates(&query).await.unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].id, "p2");
    }

    #[test]
    fn test_lifestyle_join_only_when_needed() {
        assert!(!CandidateFilters::default().uses_lifestyle());
        let f = CandidateFilters {
            drinking: Some("no".into()),
            ..Default::default()
        };
        assert!(f.uses_lifestyle());

        let blank = CandidateFilters {
            smoking: Some(String::new()),
            eating_habits: Some(" ".into()),
            ..Default::default()
        };
        assert!(!blank.uses_lifestyle());
    }
}
