//! Religion and caste lookups.

use sangam_common::{AppError, AppResult};
use sangam_db::{
    entities::caste::{self, CasteLevel},
    repositories::CasteRepository,
};

/// Taxonomy service.
#[derive(Clone)]
pub struct TaxonomyService {
    caste_repo: CasteRepository,
}

impl TaxonomyService {
    /// Create a new taxonomy service.
    #[must_use]
    pub const fn new(caste_repo: CasteRepository) -> Self {
        Self { caste_repo }
    }

    /// Active religions by name.
    pub async fn list_religions(&self) -> AppResult<Vec<caste::Model>> {
        self.caste_repo.find_religions().await
    }

    /// Active castes of a religion by name.
    pub async fn list_castes(&self, religion_id: &str) -> AppResult<Vec<caste::Model>> {
        match self.caste_repo.find_by_id(religion_id).await? {
            Some(religion) if religion.level == CasteLevel::Religion => {
                self.caste_repo.find_castes(&religion.id).await
            }
            _ => Err(AppError::NotFound("Religion not found".to_string())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn node(id: &str, name: &str, parent: Option<&str>, level: CasteLevel) -> caste::Model {
        caste::Model {
            id: id.to_string(),
            name: name.to_string(),
            parent_id: parent.map(str::to_string),
            level,
            is_active: true,
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_list_castes_of_religion() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[node("r1", "Hindu", None, CasteLevel::Religion)]])
            .append_query_results([vec![
                node("c1", "Ezhava", Some("r1"), CasteLevel::Caste),
                node("c2", "Nair", Some("r1"), CasteLevel::Caste),
            ]]);
        let service = TaxonomyService::new(CasteRepository::new(Arc::new(db.into_connection())));

        let castes = service.list_castes("r1").await.unwrap();
        assert_eq!(castes.len(), 2);
        assert_eq!(castes[0].name, "Ezhava");
    }

    #[tokio::test]
    async fn test_list_castes_of_a_caste_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[node("c1", "Nair", Some("r1"), CasteLevel::Caste)]]);
        let service = TaxonomyService::new(CasteRepository::new(Arc::new(db.into_connection())));

        let result = service.list_castes("c1").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
