//! Push delivery through Firebase Cloud Messaging.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use sangam_common::{AppError, AppResult, config::PushConfig};
use serde::Serialize;
use serde_json::json;

/// A push message addressed to one device token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PushMessage {
    /// Device registration token.
    pub token: String,
    pub title: String,
    pub body: String,
    /// String key/value payload delivered alongside the notification.
    pub data: BTreeMap<String, String>,
}

/// Delivers push messages to devices.
#[async_trait]
pub trait PushSender: Send + Sync {
    /// Deliver one message.
    async fn send(&self, message: &PushMessage) -> AppResult<()>;
}

/// Sender posting to the FCM HTTP endpoint with a server key.
#[derive(Clone)]
pub struct FcmPushSender {
    http_client: reqwest::Client,
    endpoint: String,
    server_key: String,
}

impl FcmPushSender {
    /// Create a new FCM sender.
    #[must_use]
    pub fn new(endpoint: impl Into<String>, server_key: impl Into<String>) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            server_key: server_key.into(),
        }
    }

    fn payload(message: &PushMessage) -> serde_json::Value {
        json!({
            "to": message.token,
            "notification": {
                "title": message.title,
                "body": message.body,
            },
            "data": message.data,
        })
    }
}

#[async_trait]
impl PushSender for FcmPushSender {
    async fn send(&self, message: &PushMessage) -> AppResult<()> {
        let response = self
            .http_client
            .post(&self.endpoint)
            .header("Authorization", format!("key={}", self.server_key))
            .json(&Self::payload(message))
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("FCM request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalService(format!(
                "FCM returned {status}: {body}"
            )));
        }

        tracing::debug!(token_prefix = %token_prefix(&message.token), "Push notification sent");
        Ok(())
    }
}

/// Sender used when push delivery is disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopPushSender;

#[async_trait]
impl PushSender for NoopPushSender {
    async fn send(&self, message: &PushMessage) -> AppResult<()> {
        tracing::debug!(
            token_prefix = %token_prefix(&message.token),
            title = %message.title,
            "Push disabled, dropping notification"
        );
        Ok(())
    }
}

/// Pick the sender for the configured push settings.
#[must_use]
pub fn sender_from_config(config: &PushConfig) -> Arc<dyn PushSender> {
    match (config.enabled, config.server_key.as_deref()) {
        (true, Some(key)) if !key.is_empty() => {
            Arc::new(FcmPushSender::new(config.endpoint.clone(), key))
        }
        (true, _) => {
            tracing::warn!("Push is enabled but no server key is configured; push disabled");
            Arc::new(NoopPushSender)
        }
        (false, _) => Arc::new(NoopPushSender),
    }
}

/// First characters of a token, safe to log.
fn token_prefix(token: &str) -> &str {
    token.get(..10).unwrap_or(token)
}
