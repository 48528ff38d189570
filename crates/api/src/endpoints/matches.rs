//! Match engine endpoints: candidates, search, interests and contact reveal.

use axum::{
    Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use sangam_common::AppResult;
use sangam_core::{ContactDetails, ProfileSummary};
use sangam_db::repositories::CandidateFilters;
use serde::Deserialize;
use serde_json::Value;

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Candidates for the caller, newest profiles first.
async fn candidates(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Query(filters): Query<CandidateFilters>,
) -> AppResult<ApiResponse<Vec<ProfileSummary>>> {
    let candidates = state
        .matching_service
        .list_candidates(&user.id, &filters)
        .await?;
    Ok(ApiResponse::ok(candidates))
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

async fn search(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<ApiResponse<Vec<ProfileSummary>>> {
    let results = state.matching_service.search(&user.id, &query.q).await?;
    Ok(ApiResponse::ok(results))
}

/// Send an interest to a profile.
async fn send_interest(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(profile_id): Path<String>,
) -> AppResult<ApiResponse<Value>> {
    let request = state
        .matching_service
        .send_interest(&user.id, &profile_id)
        .await?;
    let mut response = ApiResponse::localized(&request, &state.time_formatter)?;
    response.message = "Interest sent".to_string();
    Ok(response.created())
}

async fn sent(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Value>> {
    let requests = state.matching_service.list_sent(&user.id).await?;
    ApiResponse::localized(&requests, &state.time_formatter)
}

async fn received(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Value>> {
    let requests = state.matching_service.list_received(&user.id).await?;
    ApiResponse::localized(&requests, &state.time_formatter)
}

/// Accept a request; the response carries the pair's chat room.
async fn accept(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(request_id): Path<String>,
) -> AppResult<ApiResponse<Value>> {
    let accepted = state.matching_service.accept(&user.id, &request_id).await?;
    let mut response = ApiResponse::localized(&accepted, &state.time_formatter)?;
    response.message = "Interest accepted".to_string();
    Ok(response)
}

async fn reject(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(request_id): Path<String>,
) -> AppResult<ApiResponse<Value>> {
    let rejected = state.matching_service.reject(&user.id, &request_id).await?;
    let mut response = ApiResponse::localized(&rejected, &state.time_formatter)?;
    response.message = "Interest rejected".to_string();
    Ok(response)
}

/// Reveal another member's contact details.
async fn reveal(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(target_id): Path<String>,
) -> AppResult<ApiResponse<ContactDetails>> {
    let details = state
        .contact_reveal_service
        .reveal(&user.id, &target_id)
        .await?;

    let message = if details.quota.reached {
        "Contact details revealed. You have reached your plan's reveal limit"
    } else {
        "Contact details revealed"
    };
    Ok(ApiResponse::with_message(message, details))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/candidates", get(candidates))
        .route("/search", get(search))
        .route("/interests/{profile_id}", post(send_interest))
        .route("/requests/sent", get(sent))
        .route("/requests/received", get(received))
        .route("/requests/{id}/accept", post(accept))
        .route("/requests/{id}/reject", post(reject))
        .route("/reveal/{user_id}", post(reveal))
}
