//! Notification endpoints.

use axum::{
    Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use sangam_common::AppResult;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    extractors::AuthUser,
    middleware::AppState,
    response::{ApiResponse, done},
};

/// List notifications request.
#[derive(Debug, Deserialize)]
pub struct ListNotificationsQuery {
    /// Maximum results (default: 50, max: 100)
    pub limit: Option<u64>,
    #[serde(default)]
    pub unread_only: bool,
}

#[derive(Serialize)]
pub struct NotificationsListResponse<T: Serialize> {
    pub notifications: T,
    pub unread_count: u64,
}

async fn list(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ListNotificationsQuery>,
) -> AppResult<ApiResponse<Value>> {
    let notifications = state
        .notification_service
        .list(&user.id, query.limit, query.unread_only)
        .await?;
    let unread_count = state.notification_service.unread_count(&user.id).await?;

    ApiResponse::localized(
        &NotificationsListResponse {
            notifications,
            unread_count,
        },
        &state.time_formatter,
    )
}

async fn mark_read(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(notification_id): Path<String>,
) -> AppResult<ApiResponse<Value>> {
    state
        .notification_service
        .mark_read(&user.id, &notification_id)
        .await?;
    Ok(done("Notification marked as read"))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/{id}/read", post(mark_read))
}
