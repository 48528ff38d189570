//! API endpoints.

mod account;
mod auth;
mod chat;
mod matches;
mod notifications;
mod profile;
mod subscriptions;
mod success_stories;
mod taxonomy;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/profile", profile::router())
        .nest("/users", profile::users_router())
        .nest("/account", account::router())
        .nest("/taxonomy", taxonomy::router())
        .nest("/subscriptions", subscriptions::router())
        .nest("/matches", matches::router())
        .nest("/chat", chat::router())
        .nest("/notifications", notifications::router())
        .nest("/success-stories", success_stories::router())
}
