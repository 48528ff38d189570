//! API middleware.

#![allow(missing_docs)]

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Query, State},
    http::Request,
    middleware::Next,
    response::Response,
};
use sangam_common::{AppResult, Config, LocalTimeFormatter};
use sangam_core::{
    ChatService, ContactRevealService, MatchingService, NotificationDispatcher,
    NotificationService, PredefinedCatalog, ProfileService, SubscriptionService,
    SuccessStoryService, TaxonomyService, UserService,
};
use sangam_db::repositories::{
    CasteRepository, ChatRepository, ContactInfoViewRepository, LifestyleRepository,
    MatchRequestRepository, NotificationRepository, ProfileRepository, SubscriptionRepository,
    SuccessStoryRepository, UserImageRepository, UserRepository,
};
use sea_orm::DatabaseConnection;
use serde::Deserialize;

use crate::chat_socket::ChatHub;

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub profile_service: ProfileService,
    pub subscription_service: SubscriptionService,
    pub matching_service: MatchingService,
    pub contact_reveal_service: ContactRevealService,
    pub chat_service: ChatService,
    pub notification_service: NotificationService,
    pub success_story_service: SuccessStoryService,
    pub taxonomy_service: TaxonomyService,
    pub chat_hub: ChatHub,
    pub time_formatter: Arc<LocalTimeFormatter>,
}

impl AppState {
    /// Wire repositories and services over one connection pool.
    pub fn new(
        db: Arc<DatabaseConnection>,
        config: &Config,
        dispatcher: NotificationDispatcher,
        catalog: Arc<PredefinedCatalog>,
    ) -> AppResult<Self> {
        let user_repo = UserRepository::new(Arc::clone(&db));
        let profile_repo = ProfileRepository::new(Arc::clone(&db));
        let lifestyle_repo = LifestyleRepository::new(Arc::clone(&db));
        let image_repo = UserImageRepository::new(Arc::clone(&db));
        let caste_repo = CasteRepository::new(Arc::clone(&db));
        let subscription_repo = SubscriptionRepository::new(Arc::clone(&db));
        let view_repo = ContactInfoViewRepository::new(Arc::clone(&db));
        let request_repo = MatchRequestRepository::new(Arc::clone(&db));
        let chat_repo = ChatRepository::new(Arc::clone(&db));
        let notification_repo = NotificationRepository::new(Arc::clone(&db));
        let story_repo = SuccessStoryRepository::new(db);

        let user_service = UserService::new(user_repo.clone());
        let profile_service = ProfileService::new(
            user_repo.clone(),
            profile_repo.clone(),
            lifestyle_repo.clone(),
            image_repo.clone(),
            caste_repo.clone(),
        );
        let subscription_service = SubscriptionService::new(
            subscription_repo,
            view_repo,
            config.subscription.tiers.clone(),
        );
        let notification_service =
            NotificationService::new(notification_repo, dispatcher.clone());
        let matching_service = MatchingService::new(
            profile_repo.clone(),
            user_repo.clone(),
            request_repo,
            profile_service.clone(),
            notification_service.clone(),
        );
        let contact_reveal_service = ContactRevealService::new(
            user_repo.clone(),
            profile_repo,
            lifestyle_repo,
            image_repo,
            subscription_service.clone(),
            config.subscription.enforce_reveal_quota,
        );
        let chat_service = ChatService::new(
            chat_repo,
            user_repo,
            subscription_service.clone(),
            catalog,
            dispatcher,
        );

        let time_formatter =
            LocalTimeFormatter::new(&config.display.timezone, config.display.datetime_format.clone())?;

        Ok(Self {
            user_service,
            profile_service,
            subscription_service,
            matching_service,
            contact_reveal_service,
            chat_service,
            notification_service,
            success_story_service: SuccessStoryService::new(story_repo),
            taxonomy_service: TaxonomyService::new(caste_repo),
            chat_hub: ChatHub::new(),
            time_formatter: Arc::new(time_formatter),
        })
    }
}

/// Token passed as a query parameter, for clients that cannot set headers.
#[derive(Debug, Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

/// Authentication middleware.
///
/// Attaches the user owning the bearer token, when valid, to the request.
/// Handlers decide whether a user is required.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(token) = request_token(&req)
        && let Ok(user) = state.user_service.authenticate_by_token(&token).await
    {
        req.extensions_mut().insert(user);
    }

    next.run(req).await
}

/// Token from `Authorization: Bearer`, falling back to `?token=`.
fn request_token(req: &Request<Body>) -> Option<String> {
    let from_header = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from);

    from_header.or_else(|| {
        Query::<TokenQuery>::try_from_uri(req.uri())
            .ok()
            .and_then(|Query(q)| q.token)
            .filter(|t| !t.is_empty())
    })
}
