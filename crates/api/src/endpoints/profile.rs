//! Profile endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get, put},
};
use sangam_common::AppResult;
use sangam_core::{AddImageInput, LifestyleInput, PublicProfile, UpdateProfileInput};
use sangam_db::entities::{lifestyle, user_image};
use serde_json::Value;

use crate::{
    extractors::AuthUser,
    middleware::AppState,
    response::{ApiResponse, done},
};

/// The caller's own profile, including private fields.
async fn get_own(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Value>> {
    let own = state.profile_service.get_own(&user.id).await?;
    ApiResponse::localized(&own, &state.time_formatter)
}

/// Partially update the caller's profile.
async fn update(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<UpdateProfileInput>,
) -> AppResult<ApiResponse<Value>> {
    let own = state.profile_service.update(&user.id, req).await?;
    let mut response = ApiResponse::localized(&own, &state.time_formatter)?;
    response.message = "Profile updated".to_string();
    Ok(response)
}

async fn upsert_lifestyle(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<LifestyleInput>,
) -> AppResult<ApiResponse<lifestyle::Model>> {
    let lifestyle = state.profile_service.upsert_lifestyle(&user.id, req).await?;
    Ok(ApiResponse::with_message("Lifestyle saved", lifestyle))
}

async fn list_images(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<user_image::Model>>> {
    let images = state.profile_service.list_images(&user.id).await?;
    Ok(ApiResponse::ok(images))
}

async fn add_image(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<AddImageInput>,
) -> AppResult<ApiResponse<user_image::Model>> {
    let image = state.profile_service.add_image(&user.id, req).await?;
    Ok(ApiResponse::with_message("Image added", image).created())
}

async fn delete_image(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(image_id): Path<String>,
) -> AppResult<ApiResponse<Value>> {
    state.profile_service.delete_image(&user.id, &image_id).await?;
    Ok(done("Image deleted"))
}

/// Another member's public profile.
async fn show_user(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<ApiResponse<PublicProfile>> {
    let profile = state.profile_service.public_profile(&user_id).await?;
    Ok(ApiResponse::ok(profile))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_own).patch(update))
        .route("/lifestyle", put(upsert_lifestyle))
        .route("/images", get(list_images).post(add_image))
        .route("/images/{id}", delete(delete_image))
}

pub fn users_router() -> Router<AppState> {
    Router::new().route("/{id}", get(show_user))
}
