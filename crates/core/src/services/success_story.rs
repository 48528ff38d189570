//! Success stories shared by married couples.

use chrono::{NaiveDate, Utc};
use sangam_common::{AppError, AppResult};
use sangam_db::{entities::success_story, repositories::SuccessStoryRepository};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

/// Page size for the public story list.
const PUBLIC_LIMIT: u64 = 50;

/// Input for a new story.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateStoryInput {
    #[validate(length(min = 1, max = 128))]
    pub groom_name: String,
    #[validate(length(min = 1, max = 128))]
    pub bride_name: String,
    pub wedding_date: Option<NaiveDate>,
    #[validate(length(max = 256))]
    pub venue: Option<String>,
    #[validate(length(min = 1, max = 5000))]
    pub description: String,
    #[validate(length(max = 10))]
    #[serde(default)]
    pub image_urls: Vec<String>,
}

/// Success story service.
#[derive(Clone)]
pub struct SuccessStoryService {
    story_repo: SuccessStoryRepository,
}

impl SuccessStoryService {
    /// Create a new success story service.
    #[must_use]
    pub const fn new(story_repo: SuccessStoryRepository) -> Self {
        Self { story_repo }
    }

    /// Publish a story written by `user_id`.
    pub async fn create(
        &self,
        user_id: &str,
        input: CreateStoryInput,
    ) -> AppResult<success_story::Model> {
        input.validate()?;

        let story = self
            .story_repo
            .create(success_story::ActiveModel {
                id: Set(crate::generate_id()),
                user_id: Set(user_id.to_string()),
                groom_name: Set(input.groom_name.trim().to_string()),
                bride_name: Set(input.bride_name.trim().to_string()),
                wedding_date: Set(input.wedding_date),
                venue: Set(input.venue),
                description: Set(input.description),
                image_urls: Set(serde_json::json!(input.image_urls)),
                created_at: Set(Utc::now().into()),
            })
            .await?;

        tracing::info!(story_id = %story.id, user_id = %user_id, "Success story published");
        Ok(story)
    }

    /// Newest stories, leaving out the viewer's own.
    pub async fn list_public(&self, viewer_id: Option<&str>) -> AppResult<Vec<success_story::Model>> {
        self.story_repo.find_public(viewer_id, PUBLIC_LIMIT).await
    }

    /// Stories written by `user_id`.
    pub async fn list_mine(&self, user_id: &str) -> AppResult<Vec<success_story::Model>> {
        self.story_repo.find_by_user(user_id).await
    }

    /// Delete one of `user_id`'s stories.
    pub async fn delete(&self, user_id: &str, story_id: &str) -> AppResult<()> {
        if !self.story_repo.delete_owned(story_id, user_id).await? {
            return Err(AppError::NotFound("Success story not found".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::fixtures;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn input() -> CreateStoryInput {
        CreateStoryInput {
            groom_name: " Arjun ".to_string(),
            bride_name: "Priya".to_string(),
            wedding_date: NaiveDate::from_ymd_opt(2025, 2, 14),
            venue: Some("Kochi".to_string()),
            description: "We met here.".to_string(),
            image_urls: vec![],
        }
    }

    #[tokio::test]
    async fn test_create_rejects_blank_description() {
        let service = SuccessStoryService::new(SuccessStoryRepository::new(fixtures::empty_db()));
        let result = service
            .create(
                "u1",
                CreateStoryInput {
                    description: String::new(),
                    ..input()
                },
            )
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_story() {
        let stored = success_story::Model {
            id: "s1".to_string(),
            user_id: "u1".to_string(),
            groom_name: "Arjun".to_string(),
            bride_name: "Priya".to_string(),
            wedding_date: NaiveDate::from_ymd_opt(2025, 2, 14),
            venue: Some("Kochi".to_string()),
            description: "We met here.".to_string(),
            image_urls: serde_json::json!([]),
            created_at: Utc::now().into(),
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[stored.clone()]]);
        let service = SuccessStoryService::new(SuccessStoryRepository::new(Arc::new(
            db.into_connection(),
        )));

        assert_eq!(service.create("u1", input()).await.unwrap(), stored);
    }

    #[tokio::test]
    async fn test_delete_foreign_story_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).append_exec_results([
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            },
        ]);
        let service = SuccessStoryService::new(SuccessStoryRepository::new(Arc::new(
            db.into_connection(),
        )));

        let result = service.delete("u1", "s1").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
