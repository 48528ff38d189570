//! Repository layer over the sea-orm entities.

mod caste;
mod chat;
mod contact_info_view;
mod lifestyle;
mod match_request;
mod notification;
mod profile;
mod subscription;
mod success_story;
mod user;
mod user_image;

pub use caste::CasteRepository;
pub use chat::ChatRepository;
pub use contact_info_view::ContactInfoViewRepository;
pub use lifestyle::LifestyleRepository;
pub use match_request::MatchRequestRepository;
pub use notification::NotificationRepository;
pub use profile::{CandidateFilters, CandidateQuery, ProfileRepository};
pub use subscription::SubscriptionRepository;
pub use success_story::SuccessStoryRepository;
pub use user::{MEMBER_CODE_TAKEN, UserRepository};
pub use user_image::UserImageRepository;

use sangam_common::AppError;
use sea_orm::{DbErr, SqlErr};

/// Map an insert failure, turning unique violations into `Conflict`.
pub(crate) fn insert_error(err: DbErr, conflict: &str) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => AppError::Conflict(conflict.to_string()),
        _ => AppError::Database(err.to_string()),
    }
}

/// Escape `LIKE` wildcards in user input and wrap it for substring matching.
pub(crate) fn contains_pattern(input: &str) -> String {
    let escaped = input
        .to_lowercase()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("Priya"), "%priya%");
        assert_eq!(contains_pattern("50%_off"), "%50\\%\\_off%");
    }

    #[test]
    fn test_insert_error_without_sql_cause_is_database() {
        let err = insert_error(DbErr::Custom("boom".into()), "dup");
        assert!(matches!(err, AppError::Database(_)));
    }
}
