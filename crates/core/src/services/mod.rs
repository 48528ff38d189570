//! Business logic services.

#![allow(missing_docs)]

pub mod chat;
pub mod chat_catalog;
pub mod contact_reveal;
pub mod jobs;
pub mod matching;
pub mod notification;
pub mod profile;
pub mod push_notification;
pub mod subscription;
pub mod success_story;
pub mod taxonomy;
pub mod user;

#[cfg(test)]
pub(crate) mod fixtures;

pub use chat::{
    ChatService, HistoryMessage, RoomSummary, SendMessageInput, SentMessage, SuggestedAnswers,
};
pub use chat_catalog::{PredefinedCatalog, PredefinedQuestion};
pub use contact_reveal::{ContactDetails, ContactRevealService, RevealQuota};
pub use jobs::{
    CleanupTask, Job, JobSender, JobService, JobWorkerContext, spawn_purge_scheduler,
};
pub use matching::{AcceptedRequest, MatchingService, RequestView};
pub use notification::{NotificationDispatcher, NotificationService};
pub use profile::{
    AddImageInput, LifestyleInput, OwnProfile, ProfileService, ProfileSummary, PublicProfile,
    UpdateProfileInput,
};
pub use push_notification::{
    FcmPushSender, NoopPushSender, PushMessage, PushSender, sender_from_config,
};
pub use subscription::{Entitlement, PaymentOutcome, SubscriptionService, SubscriptionStatus};
pub use success_story::{CreateStoryInput, SuccessStoryService};
pub use taxonomy::TaxonomyService;
pub use user::{AuthSession, LoginInput, RegisterInput, UserService};
