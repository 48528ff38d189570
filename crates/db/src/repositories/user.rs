//! User repository.

use std::sync::Arc;

use crate::entities::{User, profile, user};
use sangam_common::{AppError, AppResult, id::member_code_serial};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, SqlErr, TransactionTrait,
    prelude::DateTimeWithTimeZone,
    sea_query::{Expr, Func},
};

use super::{contains_pattern, insert_error};

/// Conflict message when a concurrent registration took the member code.
pub const MEMBER_CODE_TAKEN: &str = "Member code is already taken";

/// Conflict message for a unique violation on the user table.
fn unique_violation_message(detail: &str) -> &'static str {
    if detail.contains("member_code") {
        MEMBER_CODE_TAKEN
    } else {
        "Email is already registered"
    }
}

fn user_insert_error(err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => {
            AppError::Conflict(unique_violation_message(&detail).to_string())
        }
        _ => AppError::Database(err.to_string()),
    }
}

/// User repository for database operations.
#[derive(Clone)]
pub struct UserRepository {
    db: Arc<DatabaseConnection>,
}

impl UserRepository {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a user by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<user::Model>> {
        User::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a live (not soft-deleted) user by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<user::Model> {
        self.find_by_id(id)
            .await?
            .filter(|u| !u.is_deleted)
            .ok_or_else(|| AppError::NotFound(format!("User {id}")))
    }

    /// Find users by IDs.
    pub async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<user::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        User::find()
            .filter(user::Column::Id.is_in(ids.to_vec()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a user by email (case-insensitive).
    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<user::Model>> {
        User::find()
            .filter(
                Expr::expr(Func::lower(Expr::col(user::Column::Email)))
                    .eq(email.trim().to_lowercase()),
            )
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a live user by access token.
    pub async fn find_by_token(&self, token: &str) -> AppResult<Option<user::Model>> {
        User::find()
            .filter(user::Column::Token.eq(token))
            .filter(user::Column::IsDeleted.eq(false))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new user.
    pub async fn create(&self, model: user::ActiveModel) -> AppResult<user::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(user_insert_error)
    }

    /// Insert a user and their profile in one transaction.
    pub async fn create_with_profile(
        &self,
        user: user::ActiveModel,
        profile: profile::ActiveModel,
    ) -> AppResult<user::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let user = match user.insert(&txn).await {
            Ok(user) => user,
            Err(e) => {
                txn.rollback()
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;
                return Err(user_insert_error(e));
            }
        };

        if let Err(e) = profile.insert(&txn).await {
            txn.rollback()
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
            return Err(insert_error(e, "Profile already exists"));
        }

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(user)
    }

    /// Update a user.
    pub async fn update(&self, model: user::ActiveModel) -> AppResult<user::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Next free serial for member codes starting with `stem`.
    pub async fn next_member_serial(&self, stem: &str) -> AppResult<u32> {
        let codes: Vec<String> = User::find()
            .select_only()
            .column(user::Column::MemberCode)
            .filter(user::Column::MemberCode.starts_with(stem))
            .into_tuple::<String>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let last = codes
            .iter()
            .filter_map(|c| member_code_serial(c))
            .max()
            .unwrap_or(0);
        Ok(last + 1)
    }

    /// Case-insensitive substring search over email, phone, name and member code.
    ///
    /// Soft-deleted and disabled accounts never match.
    pub async fn search(
        &self,
        query: &str,
        exclude_id: &str,
        limit: u64,
    ) -> AppResult<Vec<user::Model>> {
        let pattern = contains_pattern(query.trim());
        let lower = |col: user::Column| Expr::expr(Func::lower(Expr::col(col)));

        let condition = Condition::all()
            .add(user::Column::IsDeleted.eq(false))
            .add(user::Column::IsActive.eq(true))
            .add(user::Column::Id.ne(exclude_id))
            .add(
                Condition::any()
                    .add(lower(user::Column::Email).like(&pattern))
                    .add(lower(user::Column::PhoneNumber).like(&pattern))
                    .add(lower(user::Column::Name).like(&pattern))
                    .add(lower(user::Column::MemberCode).like(&pattern)),
            );

        User::find()
            .filter(condition)
            .order_by_desc(user::Column::CreatedAt)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Set or clear the push token.
    pub async fn set_fcm_token(&self, user_id: &str, token: Option<String>) -> AppResult<()> {
        User::update_many()
            .set(user::ActiveModel {
                fcm_token: Set(token),
                ..Default::default()
            })
            .filter(user::Column::Id.eq(user_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Flag an account as deleted and revoke its token.
    pub async fn soft_delete(&self, user_id: &str, at: DateTimeWithTimeZone) -> AppResult<()> {
        User::update_many()
            .set(user::ActiveModel {
                is_deleted: Set(true),
                deleted_at: Set(Some(at)),
                token: Set(None),
                fcm_token: Set(None),
                ..Default::default()
            })
            .filter(user::Column::Id.eq(user_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Hard-delete accounts soft-deleted before `cutoff`.
    ///
    /// Dependent rows go through the `ON DELETE CASCADE` foreign keys.
    pub async fn purge_deleted_before(&self, cutoff: DateTimeWithTimeZone) -> AppResult<u64> {
        let result = User::delete_many()
            .filter(user::Column::IsDeleted.eq(true))
            .filter(user::Column::DeletedAt.lt(cutoff))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::Utc;
    use crate::entities::profile::Gender;
    use crate::repositories::profile::tests::create_test_profile;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    pub(crate) fn create_test_user(id: &str, name: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            email: format!("{id}@example.com"),
            phone_number: Some("9876543210".to_string()),
            password_hash: "hash".to_string(),
            role: user::UserRole::User,
            name: Some(name.to_string()),
            address: None,
            member_code: format!("USR-{}-12345-001", &name.to_uppercase()[..3]),
            token: Some(format!("token_{id}")),
            is_active: true,
            is_email_verified: false,
            is_verified: false,
            profile_image_url: None,
            fcm_token: None,
            is_deleted: false,
            deleted_at: None,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_get_by_id_hides_soft_deleted() {
        let mut user = create_test_user("u1", "Priya");
        user.is_deleted = true;

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[user]])
                .into_connection(),
        );

        let repo = UserRepository::new(db);
        let result = repo.get_by_id("u1").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_find_by_token() {
        let user = create_test_user("u1", "Priya");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[user.clone()]])
                .into_connection(),
        );

        let repo = UserRepository::new(db);
        let found = repo.find_by_token("token_u1").await.unwrap();

        assert_eq!(found.map(|u| u.id), Some("u1".to_string()));
    }

    #[tokio::test]
    async fn test_find_by_ids_empty_skips_query() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let repo = UserRepository::new(db);
        let result = repo.find_by_ids(&[]).await.unwrap();

        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_search_returns_matches() {
        let users = vec![
            create_test_user("u2", "Priya"),
            create_test_user("u3", "Priyanka"),
        ];

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([users])
                .into_connection(),
        );

        let repo = UserRepository::new(db);
        let result = repo.search("PRIYA", "u1", 50).await.unwrap();

        assert_eq!(result.len(), 2);
    }

    /// SQL of every statement the mock connection received, in order.
    fn logged_sql(db: Arc<DatabaseConnection>) -> Vec<String> {
        let db = Arc::try_unwrap(db).ok().unwrap();
        db.into_transaction_log()
            .iter()
            .flat_map(|t| t.statements())
            .map(|stmt| stmt.sql.clone())
            .collect()
    }

    #[test]
    fn test_unique_violation_message_tells_constraints_apart() {
        assert_eq!(
            unique_violation_message(
                r#"duplicate key value violates unique constraint "user_member_code_key""#
            ),
            MEMBER_CODE_TAKEN
        );
        assert_eq!(
            unique_violation_message(
                r#"duplicate key value violates unique constraint "user_email_key""#
            ),
            "Email is already registered"
        );
    }

    #[tokio::test]
    async fn test_create_with_profile_commits_both_rows() {
        let user = create_test_user("u1", "Priya");
        let profile = create_test_profile("p1", "u1", Gender::Female);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[user.clone()]])
                .append_query_results([[profile.clone()]])
                .into_connection(),
        );

        let repo = UserRepository::new(Arc::clone(&db));
        let created = repo
            .create_with_profile(user.into(), profile.into())
            .await
            .unwrap();
        drop(repo);

        assert_eq!(created.id, "u1");
        let sql = logged_sql(db);
        assert_eq!(sql.first().map(String::as_str), Some("BEGIN"));
        assert!(sql[1].starts_with(r#"INSERT INTO "user""#), "{sql:?}");
        assert!(sql[2].starts_with(r#"INSERT INTO "profile""#), "{sql:?}");
        assert_eq!(sql.last().map(String::as_str), Some("COMMIT"));
    }

    #[tokio::test]
    async fn test_create_with_profile_rolls_back_when_profile_fails() {
        let user = create_test_user("u1", "Priya");
        let profile = create_test_profile("p1", "u1", Gender::Female);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[user.clone()]])
                .append_query_errors([DbErr::Custom("profile insert failed".to_string())])
                .into_connection(),
        );

        let repo = UserRepository::new(Arc::clone(&db));
        let result = repo.create_with_profile(user.into(), profile.into()).await;
        drop(repo);

        assert!(matches!(result, Err(AppError::Database(_))));
        let sql = logged_sql(db);
        assert_eq!(sql.last().map(String::as_str), Some("ROLLBACK"));
        assert!(!sql.iter().any(|s| s == "COMMIT"), "{sql:?}");
    }

    #[tokio::test]
    async fn test_purge_reports_rows() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 3,
                }])
                .into_connection(),
        );

        let repo = UserRepository::new(db);
        let purged = repo.purge_deleted_before(Utc::now().into()).await.unwrap();

        assert_eq!(purged, 3);
    }
}
