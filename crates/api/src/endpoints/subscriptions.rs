//! Subscription endpoints.

use axum::{Router, extract::State, routing::get};
use sangam_common::AppResult;
use sangam_db::entities::subscription_plan;
use serde_json::Value;

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Active plans, cheapest first.
async fn plans(
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<subscription_plan::Model>>> {
    let plans = state.subscription_service.list_plans().await?;
    Ok(ApiResponse::ok(plans))
}

/// The caller's entitlement and reveal usage.
async fn me(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Value>> {
    let status = state.subscription_service.status(&user.id).await?;
    ApiResponse::localized(&status, &state.time_formatter)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/plans", get(plans))
        .route("/me", get(me))
}
