//! API integration tests.
//!
//! These tests drive the full router, auth middleware included, over a mock database.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::redundant_clone)]

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
    middleware,
    response::Response,
};
use chrono::Utc;
use sangam_api::{AppState, middleware::auth_middleware, router as api_router};
use sangam_common::config::{
    AccountConfig, ChatConfig, Config, DatabaseConfig, DisplayConfig, LoggingConfig, PushConfig,
    ServerConfig, SubscriptionConfig,
};
use sangam_core::{NotificationDispatcher, PredefinedCatalog};
use sangam_db::entities::{
    caste::{self, CasteLevel},
    chat_room,
    user::{self, UserRole},
};
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
use serde_json::Value;
use tower::ServiceExt;

/// Create a test configuration.
fn create_test_config() -> Config {
    Config {
        server: ServerConfig::default(),
        database: DatabaseConfig {
            url: "postgres://localhost/test".to_string(),
            max_connections: 10,
            min_connections: 1,
        },
        logging: LoggingConfig::default(),
        chat: ChatConfig::default(),
        subscription: SubscriptionConfig::default(),
        account: AccountConfig::default(),
        push: PushConfig::default(),
        display: DisplayConfig::default(),
    }
}

fn create_router(db: DatabaseConnection) -> Router {
    let state = AppState::new(
        Arc::new(db),
        &create_test_config(),
        NotificationDispatcher::disabled(),
        Arc::new(PredefinedCatalog::builtin()),
    )
    .unwrap();

    Router::new()
        .nest("/api", api_router())
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}

fn empty_db() -> DatabaseConnection {
    MockDatabase::new(DatabaseBackend::Postgres).into_connection()
}

fn member(id: &str, token: &str) -> user::Model {
    user::Model {
        id: id.to_string(),
        email: format!("{id}@example.com"),
        phone_number: None,
        password_hash: String::new(),
        role: UserRole::User,
        name: Some("Priya".to_string()),
        address: None,
        member_code: "USR-PRI-12345-001".to_string(),
        token: Some(token.to_string()),
        is_active: true,
        is_email_verified: true,
        is_verified: false,
        profile_image_url: None,
        fcm_token: None,
        is_deleted: false,
        deleted_at: None,
        created_at: Utc::now().into(),
        updated_at: None,
    }
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

async fn body_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_unknown_endpoint_returns_404() {
    let response = create_router(empty_db())
        .oneshot(get("/api/nonexistent", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_profile_requires_auth() {
    let response = create_router(empty_db())
        .oneshot(get("/api/profile", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["status"], false);
    assert_eq!(body["code"], "UNAUTHORIZED");
    assert_eq!(body["response"], Value::Array(vec![]));
}

#[tokio::test]
async fn test_unknown_token_is_rejected() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<user::Model>::new()])
        .into_connection();

    let response = create_router(db)
        .oneshot(get("/api/profile", Some("stale-token")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_chat_socket_requires_auth() {
    let response = create_router(empty_db())
        .oneshot(get("/api/chat/ws/room1", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_chat_socket_unknown_room() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![member("u1", "tok1")]])
        .append_query_results([Vec::<chat_room::Model>::new()])
        .into_connection();

    let response = create_router(db)
        .oneshot(get("/api/chat/ws/missing?token=tok1", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Chat room not found");
}

#[tokio::test]
async fn test_chat_socket_rejects_outsider() {
    let room = chat_room::Model {
        id: "room1".to_string(),
        user_low_id: "a".to_string(),
        user_high_id: "b".to_string(),
        match_request_id: None,
        created_at: Utc::now().into(),
    };
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![member("u1", "tok1")]])
        .append_query_results([vec![room]])
        .into_connection();

    let response = create_router(db)
        .oneshot(get("/api/chat/ws/room1", Some("tok1")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_castes_require_religion_id() {
    let response = create_router(empty_db())
        .oneshot(get("/api/taxonomy/castes", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_religions_use_envelope() {
    let religion = caste::Model {
        id: "rel1".to_string(),
        name: "Hindu".to_string(),
        parent_id: None,
        level: CasteLevel::Religion,
        is_active: true,
        created_at: Utc::now().into(),
    };
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![religion]])
        .into_connection();

    let response = create_router(db)
        .oneshot(get("/api/taxonomy/religions", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], true);
    assert_eq!(body["response"][0]["name"], "Hindu");
}

#[tokio::test]
async fn test_login_with_unknown_email() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<user::Model>::new()])
        .into_connection();

    let response = create_router(db)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    r#"{"email":"nobody@example.com","password":"secret123"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_with_invalid_email_fails_validation() {
    let response = create_router(empty_db())
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"email":"not-an-email","password":"x"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["code"], "VALIDATION_ERROR");
}
