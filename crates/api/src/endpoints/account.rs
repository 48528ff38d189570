//! Account endpoints.

use axum::{Json, Router, extract::State, routing::put};
use sangam_common::AppResult;
use serde::Deserialize;
use serde_json::Value;

use crate::{
    extractors::AuthUser,
    middleware::AppState,
    response::{ApiResponse, done},
};

/// Device token update. `null` unregisters the device.
#[derive(Debug, Deserialize)]
pub struct PushTokenRequest {
    pub fcm_token: Option<String>,
}

async fn set_push_token(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<PushTokenRequest>,
) -> AppResult<ApiResponse<Value>> {
    state
        .user_service
        .set_push_token(&user.id, req.fcm_token)
        .await?;
    Ok(done("Push token updated"))
}

/// Request deletion of the caller's account.
///
/// The account is hidden and logged out at once and purged after the
/// retention window.
async fn delete_account(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Value>> {
    state.user_service.request_deletion(&user.id).await?;
    Ok(done("Account scheduled for deletion"))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/push-token", put(set_push_token))
        .route("/", axum::routing::delete(delete_account))
}
