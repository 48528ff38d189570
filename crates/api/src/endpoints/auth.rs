//! Registration and login endpoints.

use axum::{Json, Router, extract::State, routing::post};
use sangam_common::AppResult;
use sangam_core::{AuthSession, LoginInput, RegisterInput};

use crate::{middleware::AppState, response::ApiResponse};

/// Create a new member account.
async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterInput>,
) -> AppResult<ApiResponse<AuthSession>> {
    let session = state.user_service.register(req).await?;
    Ok(ApiResponse::with_message("Registration successful", session).created())
}

/// Log in with email and password.
async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginInput>,
) -> AppResult<ApiResponse<AuthSession>> {
    let session = state.user_service.login(req).await?;
    Ok(ApiResponse::with_message("Login successful", session))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}
