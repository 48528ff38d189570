//! HTTP API layer for sangam.
//!
//! This crate provides the REST API and the chat WebSocket:
//!
//! - **Endpoints**: accounts, profiles, matching, subscriptions, chat, stories
//! - **Extractors**: Authentication
//! - **Middleware**: Bearer token authentication and the shared [`AppState`]
//! - **Chat**: room-scoped WebSocket sessions
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod chat_socket;
pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use chat_socket::ChatHub;
pub use endpoints::router;
pub use middleware::AppState;
pub use response::ApiResponse;
