//! Success story endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get},
};
use sangam_common::AppResult;
use sangam_core::CreateStoryInput;
use serde_json::Value;

use crate::{
    extractors::{AuthUser, MaybeAuthUser},
    middleware::AppState,
    response::{ApiResponse, done},
};

/// Public stories. Signed-in members do not see their own here.
async fn list_public(
    MaybeAuthUser(user): MaybeAuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Value>> {
    let viewer = user.as_ref().map(|u| u.id.as_str());
    let stories = state.success_story_service.list_public(viewer).await?;
    ApiResponse::localized(&stories, &state.time_formatter)
}

async fn list_mine(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Value>> {
    let stories = state.success_story_service.list_mine(&user.id).await?;
    ApiResponse::localized(&stories, &state.time_formatter)
}

async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreateStoryInput>,
) -> AppResult<ApiResponse<Value>> {
    let story = state.success_story_service.create(&user.id, req).await?;
    let mut response = ApiResponse::localized(&story, &state.time_formatter)?;
    response.message = "Success story published".to_string();
    Ok(response.created())
}

async fn remove(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(story_id): Path<String>,
) -> AppResult<ApiResponse<Value>> {
    state.success_story_service.delete(&user.id, &story_id).await?;
    Ok(done("Success story deleted"))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_public).post(create))
        .route("/mine", get(list_mine))
        .route("/{id}", delete(remove))
}
