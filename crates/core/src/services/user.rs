//! User service: registration, login, token auth and account lifecycle.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use sangam_common::{AppError, AppResult, IdGenerator};
use sangam_db::{
    entities::{
        profile::{self, Gender},
        user::{self, UserRole},
    },
    repositories::{MEMBER_CODE_TAKEN, UserRepository},
};
use sea_orm::{NotSet, Set};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// User service for business logic.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

/// Registrations retried after losing a member code race.
const MEMBER_CODE_ATTEMPTS: u32 = 3;

/// Input for registering a new member.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterInput {
    #[validate(email)]
    pub email: String,

    #[validate(length(min = 7, max = 20))]
    pub phone_number: Option<String>,

    #[validate(length(min = 8, max = 128))]
    pub password: String,

    #[validate(length(min = 1, max = 128))]
    pub name: Option<String>,

    pub gender: Option<Gender>,

    pub date_of_birth: Option<NaiveDate>,

    /// Who the account is for ("self", "son", "daughter", ...).
    #[validate(length(max = 32))]
    pub this_account_for: Option<String>,

    #[serde(default)]
    pub terms_accepted: bool,
}

/// Input for logging in.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginInput {
    #[validate(email)]
    pub email: String,

    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

/// An authenticated session: the bearer token and its owner.
#[derive(Debug, Clone, Serialize)]
pub struct AuthSession {
    pub token: String,
    pub user: user::Model,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub const fn new(user_repo: UserRepository) -> Self {
        Self {
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Register a member and create their empty profile.
    pub async fn register(&self, input: RegisterInput) -> AppResult<AuthSession> {
        input.validate()?;

        let email = input.email.trim().to_lowercase();
        if self.user_repo.find_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict("Email is already registered".to_string()));
        }

        let name = input
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty());
        let phone = input
            .phone_number
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty());

        let stem = self.id_gen.member_code_stem(name);
        let password_hash = hash_password(&input.password)?;
        let user_id = self.id_gen.generate();
        let token = self.id_gen.generate_token();
        let now = Utc::now();

        let user_model = user::ActiveModel {
            id: Set(user_id.clone()),
            email: Set(email),
            phone_number: Set(phone.map(String::from)),
            password_hash: Set(password_hash),
            role: Set(UserRole::User),
            name: Set(name.map(String::from)),
            address: Set(None),
            member_code: NotSet,
            token: Set(Some(token.clone())),
            is_active: Set(true),
            is_email_verified: Set(false),
            is_verified: Set(false),
            profile_image_url: Set(None),
            fcm_token: Set(None),
            is_deleted: Set(false),
            deleted_at: Set(None),
            created_at: Set(now.into()),
            updated_at: Set(None),
        };
        let profile_model = profile::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(user_id),
            this_account_for: Set(input.this_account_for),
            gender: Set(input.gender),
            date_of_birth: Set(input.date_of_birth),
            willing_inter_caste: Set(false),
            terms_accepted: Set(input.terms_accepted),
            created_at: Set(now.into()),
            ..Default::default()
        };

        let mut attempt = 1;
        let user = loop {
            let serial = self.user_repo.next_member_serial(&stem).await?;
            let mut candidate = user_model.clone();
            candidate.member_code = Set(self.id_gen.generate_member_code(name, phone, serial));

            match self
                .user_repo
                .create_with_profile(candidate, profile_model.clone())
                .await
            {
                Ok(user) => break user,
                Err(e) if is_member_code_taken(&e) && attempt < MEMBER_CODE_ATTEMPTS => {
                    tracing::warn!(stem = %stem, attempt, "Member code taken, retrying");
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        };

        tracing::info!(user_id = %user.id, member_code = %user.member_code, "Member registered");
        Ok(AuthSession { token, user })
    }

    /// Exchange email and password for a bearer token.
    pub async fn login(&self, input: LoginInput) -> AppResult<AuthSession> {
        input.validate()?;

        let user = self
            .user_repo
            .find_by_email(&input.email)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !verify_password(&input.password, &user.password_hash)? {
            return Err(AppError::Unauthorized);
        }
        ensure_usable(&user)?;

        if let Some(token) = user.token.clone() {
            return Ok(AuthSession { token, user });
        }

        let token = self.id_gen.generate_token();
        let mut active: user::ActiveModel = user.into();
        active.token = Set(Some(token.clone()));
        active.updated_at = Set(Some(Utc::now().into()));
        let user = self.user_repo.update(active).await?;

        Ok(AuthSession { token, user })
    }

    /// Resolve a bearer token to its live account.
    pub async fn authenticate_by_token(&self, token: &str) -> AppResult<user::Model> {
        if token.is_empty() {
            return Err(AppError::Unauthorized);
        }

        let user = self
            .user_repo
            .find_by_token(token)
            .await?
            .ok_or(AppError::Unauthorized)?;
        ensure_usable(&user)?;
        Ok(user)
    }

    /// Get a live user by ID.
    pub async fn get(&self, user_id: &str) -> AppResult<user::Model> {
        self.user_repo.get_by_id(user_id).await
    }

    /// Register or clear the device push token.
    pub async fn set_push_token(&self, user_id: &str, token: Option<String>) -> AppResult<()> {
        let token = token
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        self.user_repo.set_fcm_token(user_id, token).await
    }

    /// Soft-delete the account. The token stops working immediately.
    pub async fn request_deletion(&self, user_id: &str) -> AppResult<()> {
        let user = self.user_repo.get_by_id(user_id).await?;
        self.user_repo.soft_delete(&user.id, Utc::now().into()).await?;
        tracing::info!(user_id = %user.id, "Account scheduled for deletion");
        Ok(())
    }

    /// Hard-delete accounts soft-deleted more than `retention_days` before `now`.
    pub async fn purge_deleted_accounts(
        &self,
        now: DateTime<Utc>,
        retention_days: i64,
    ) -> AppResult<u64> {
        let cutoff = purge_cutoff(now, retention_days);
        let purged = self.user_repo.purge_deleted_before(cutoff.into()).await?;
        if purged > 0 {
            tracing::info!(purged, cutoff = %cutoff, "Purged deleted accounts");
        }
        Ok(purged)
    }
}

/// Instant before which soft-deleted accounts are purged.
fn purge_cutoff(now: DateTime<Utc>, retention_days: i64) -> DateTime<Utc> {
    now - Duration::days(retention_days.max(0))
}

fn is_member_code_taken(err: &AppError) -> bool {
    matches!(err, AppError::Conflict(msg) if msg == MEMBER_CODE_TAKEN)
}

fn ensure_usable(user: &user::Model) -> AppResult<()> {
    if user.is_deleted {
        return Err(AppError::Forbidden("Account has been deleted".to_string()));
    }
    if !user.is_active {
        return Err(AppError::Forbidden("Account is disabled".to_string()));
    }
    Ok(())
}

/// Hash a password using Argon2.
fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("Invalid hash: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::fixtures;
    use chrono::TimeZone;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn service_with_users(users: Vec<user::Model>) -> UserService {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([users])
                .into_connection(),
        );
        UserService::new(UserRepository::new(db))
    }

    #[test]
    fn test_hash_and_verify_password() {
        let hash = hash_password("correct horse").unwrap();

        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("correct horse", &hash).unwrap());
        assert!(!verify_password("battery staple", &hash).unwrap());
    }

    #[test]
    fn test_verify_password_rejects_malformed_hash() {
        assert!(matches!(
            verify_password("pw", "not-a-hash"),
            Err(AppError::Internal(_))
        ));
    }

    #[test]
    fn test_purge_cutoff() {
        let now = Utc.with_ymd_and_hms(2025, 3, 31, 12, 0, 0).unwrap();
        assert_eq!(
            purge_cutoff(now, 30),
            Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
        );
        assert_eq!(purge_cutoff(now, -5), now);
    }

    #[tokio::test]
    async fn test_register_rejects_invalid_email() {
        let service = service_with_users(vec![]);
        let result = service
            .register(RegisterInput {
                email: "not-an-email".to_string(),
                phone_number: None,
                password: "long enough".to_string(),
                name: Some("Priya".to_string()),
                gender: Some(Gender::Female),
                date_of_birth: None,
                this_account_for: None,
                terms_accepted: true,
            })
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_register_duplicate_email_is_conflict() {
        let service = service_with_users(vec![fixtures::user("u1", "Priya")]);
        let result = service
            .register(RegisterInput {
                email: "U1@example.com".to_string(),
                phone_number: None,
                password: "long enough".to_string(),
                name: Some("Priya".to_string()),
                gender: None,
                date_of_birth: None,
                this_account_for: None,
                terms_accepted: true,
            })
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_register_inserts_user_and_profile_in_one_transaction() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .append_query_results([Vec::<user::Model>::new()])
                .append_query_results([[fixtures::user("u1", "Priya")]])
                .append_query_results([[fixtures::profile("p1", "u1", Some(Gender::Female))]])
                .into_connection(),
        );
        let service = UserService::new(UserRepository::new(Arc::clone(&db)));

        let session = service
            .register(RegisterInput {
                email: "priya@example.com".to_string(),
                phone_number: Some("9876543210".to_string()),
                password: "long enough".to_string(),
                name: Some("Priya".to_string()),
                gender: Some(Gender::Female),
                date_of_birth: None,
                this_account_for: None,
                terms_accepted: true,
            })
            .await
            .unwrap();
        drop(service);

        assert_eq!(session.user.id, "u1");
        assert!(!session.token.is_empty());

        let log = Arc::try_unwrap(db).ok().unwrap().into_transaction_log();
        let txn = log.last().unwrap().statements();
        assert_eq!(txn.first().unwrap().sql, "BEGIN");
        assert!(txn[1].sql.starts_with(r#"INSERT INTO "user""#));
        assert!(txn[2].sql.starts_with(r#"INSERT INTO "profile""#));
        assert_eq!(txn.last().unwrap().sql, "COMMIT");
    }

    #[test]
    fn test_member_code_race_is_retryable() {
        assert!(is_member_code_taken(&AppError::Conflict(
            MEMBER_CODE_TAKEN.to_string()
        )));
        assert!(!is_member_code_taken(&AppError::Conflict(
            "Email is already registered".to_string()
        )));
        assert!(!is_member_code_taken(&AppError::Unauthorized));
    }

    #[tokio::test]
    async fn test_login_returns_existing_token() {
        let mut user = fixtures::user("u1", "Priya");
        user.password_hash = hash_password("secret-pass").unwrap();
        let service = service_with_users(vec![user]);

        let session = service
            .login(LoginInput {
                email: "u1@example.com".to_string(),
                password: "secret-pass".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(session.token, "token_u1");
        assert_eq!(session.user.id, "u1");
    }

    #[tokio::test]
    async fn test_login_wrong_password_is_unauthorized() {
        let mut user = fixtures::user("u1", "Priya");
        user.password_hash = hash_password("secret-pass").unwrap();
        let service = service_with_users(vec![user]);

        let result = service
            .login(LoginInput {
                email: "u1@example.com".to_string(),
                password: "guess".to_string(),
            })
            .await;

        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_login_disabled_account_is_forbidden() {
        let mut user = fixtures::user("u1", "Priya");
        user.password_hash = hash_password("secret-pass").unwrap();
        user.is_active = false;
        let service = service_with_users(vec![user]);

        let result = service
            .login(LoginInput {
                email: "u1@example.com".to_string(),
                password: "secret-pass".to_string(),
            })
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_authenticate_unknown_token_is_unauthorized() {
        let service = service_with_users(vec![]);
        let result = service.authenticate_by_token("nope").await;
        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_authenticate_empty_token_skips_lookup() {
        let service = UserService::new(UserRepository::new(fixtures::empty_db()));
        let result = service.authenticate_by_token("").await;
        assert!(matches!(result, Err(AppError::Unauthorized)));
    }
}
