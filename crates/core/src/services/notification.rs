//! In-app notifications and the push dispatcher.

use std::collections::BTreeMap;

use chrono::Utc;
use sangam_common::{AppError, AppResult};
use sangam_db::{
    entities::{notification, notification::NotificationKind, user},
    repositories::NotificationRepository,
};
use sea_orm::Set;

use crate::services::jobs::{Job, JobSender};
use crate::services::push_notification::PushMessage;

/// Default page size for the notification list.
const DEFAULT_LIMIT: u64 = 50;

/// Hands push payloads to the job queue.
///
/// `push` is fire-and-forget: a full or closed queue is logged and the
/// caller carries on.
#[derive(Clone)]
pub struct NotificationDispatcher {
    job_sender: Option<JobSender>,
}

impl NotificationDispatcher {
    /// Create a dispatcher feeding the given job queue.
    #[must_use]
    pub const fn new(job_sender: JobSender) -> Self {
        Self {
            job_sender: Some(job_sender),
        }
    }

    /// Dispatcher that drops everything.
    #[must_use]
    pub const fn disabled() -> Self {
        Self { job_sender: None }
    }

    /// Queue a push to `token`. Never fails.
    pub fn push(&self, token: &str, title: String, body: String, data: BTreeMap<String, String>) {
        let Some(ref job_sender) = self.job_sender else {
            tracing::debug!("Push dispatcher disabled, skipping");
            return;
        };
        if token.is_empty() {
            return;
        }

        let message = PushMessage {
            token: token.to_string(),
            title,
            body,
            data,
        };
        if let Err(e) = job_sender.try_enqueue(Job::Push(message)) {
            tracing::warn!(error = %e, "Failed to enqueue push notification job");
        }
    }
}

/// Notification service for business logic.
#[derive(Clone)]
pub struct NotificationService {
    notification_repo: NotificationRepository,
    dispatcher: NotificationDispatcher,
}

impl NotificationService {
    /// Create a new notification service.
    #[must_use]
    pub const fn new(
        notification_repo: NotificationRepository,
        dispatcher: NotificationDispatcher,
    ) -> Self {
        Self {
            notification_repo,
            dispatcher,
        }
    }

    /// Record an interest event for `recipient` and push it to their device.
    ///
    /// Best effort: failures are logged, never returned.
    pub async fn notify_interest(
        &self,
        recipient: &user::Model,
        actor: &user::Model,
        kind: NotificationKind,
        match_request_id: &str,
    ) {
        let message = interest_message(kind, actor.name.as_deref());
        let model = notification::ActiveModel {
            id: Set(crate::generate_id()),
            user_id: Set(recipient.id.clone()),
            actor_id: Set(Some(actor.id.clone())),
            kind: Set(kind),
            match_request_id: Set(Some(match_request_id.to_string())),
            message: Set(message.clone()),
            is_read: Set(false),
            created_at: Set(Utc::now().into()),
        };

        if let Err(e) = self.notification_repo.create(model).await {
            tracing::warn!(
                user_id = %recipient.id,
                error = %e,
                "Failed to store notification"
            );
        }

        if let Some(ref token) = recipient.fcm_token {
            let data = BTreeMap::from([
                ("type".to_string(), kind_label(kind).to_string()),
                ("match_request_id".to_string(), match_request_id.to_string()),
                ("actor_id".to_string(), actor.id.clone()),
            ]);
            self.dispatcher.push(token, "Sangam".to_string(), message, data);
        }
    }

    /// Notifications for a user, newest first.
    pub async fn list(
        &self,
        user_id: &str,
        limit: Option<u64>,
        unread_only: bool,
    ) -> AppResult<Vec<notification::Model>> {
        let limit = limit.unwrap_or(DEFAULT_LIMIT).clamp(1, 100);
        self.notification_repo
            .find_by_user(user_id, limit, unread_only)
            .await
    }

    /// Mark one of the user's notifications as read.
    pub async fn mark_read(&self, user_id: &str, notification_id: &str) -> AppResult<()> {
        if self.notification_repo.mark_read(notification_id, user_id).await? {
            Ok(())
        } else {
            Err(AppError::NotFound("Notification not found".to_string()))
        }
    }

    /// Count unread notifications.
    pub async fn unread_count(&self, user_id: &str) -> AppResult<u64> {
        self.notification_repo.count_unread(user_id).await
    }
}

const fn kind_label(kind: NotificationKind) -> &'static str {
    match kind {
        NotificationKind::InterestReceived => "interest_received",
        NotificationKind::InterestAccepted => "interest_accepted",
        NotificationKind::InterestRejected => "interest_rejected",
        NotificationKind::ChatMessage => "chat_message",
    }
}

fn interest_message(kind: NotificationKind, actor_name: Option<&str>) -> String {
    let who = actor_name.filter(|n| !n.trim().is_empty()).unwrap_or("Someone");
    match kind {
        NotificationKind::InterestReceived => format!("{who} has shown interest in your profile"),
        NotificationKind::InterestAccepted => format!("{who} accepted your interest"),
        NotificationKind::InterestRejected => format!("{who} declined your interest"),
        NotificationKind::ChatMessage => format!("New message from {who}"),
    }
}
