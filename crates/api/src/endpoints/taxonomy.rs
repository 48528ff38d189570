//! Religion and caste lookup endpoints.

use axum::{
    Router,
    extract::{Query, State},
    routing::get,
};
use sangam_common::{AppError, AppResult};
use sangam_db::entities::caste;
use serde::Deserialize;

use crate::{middleware::AppState, response::ApiResponse};

async fn religions(State(state): State<AppState>) -> AppResult<ApiResponse<Vec<caste::Model>>> {
    let religions = state.taxonomy_service.list_religions().await?;
    Ok(ApiResponse::ok(religions))
}

#[derive(Debug, Deserialize)]
pub struct CastesQuery {
    pub religion_id: Option<String>,
}

async fn castes(
    State(state): State<AppState>,
    Query(query): Query<CastesQuery>,
) -> AppResult<ApiResponse<Vec<caste::Model>>> {
    let religion_id = query
        .religion_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::BadRequest("religion_id is required".to_string()))?;

    let castes = state.taxonomy_service.list_castes(&religion_id).await?;
    Ok(ApiResponse::ok(castes))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/religions", get(religions))
        .route("/castes", get(castes))
}
