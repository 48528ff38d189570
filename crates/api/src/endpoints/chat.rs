//! Chat endpoints. Live messaging goes through the room WebSocket.

use axum::{
    Router,
    extract::{Path, State},
    routing::{get, post},
};
use sangam_common::AppResult;
use serde::Serialize;
use serde_json::Value;

use crate::{
    chat_socket::chat_socket_handler, extractors::AuthUser, middleware::AppState,
    response::ApiResponse,
};

/// Rooms of the caller, most recent activity first.
async fn rooms(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Value>> {
    let rooms = state.chat_service.list_rooms(&user.id).await?;
    ApiResponse::localized(&rooms, &state.time_formatter)
}

async fn messages(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> AppResult<ApiResponse<Value>> {
    let history = state.chat_service.history(&user.id, &room_id).await?;
    ApiResponse::localized(&history, &state.time_formatter)
}

#[derive(Serialize)]
pub struct MarkReadResponse {
    pub updated: u64,
}

async fn mark_read(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> AppResult<ApiResponse<MarkReadResponse>> {
    let updated = state.chat_service.mark_read(&user.id, &room_id).await?;
    Ok(ApiResponse::ok(MarkReadResponse { updated }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/rooms", get(rooms))
        .route("/rooms/{id}/messages", get(messages))
        .route("/rooms/{id}/read", post(mark_read))
        .route("/ws/{room_id}", get(chat_socket_handler))
}
