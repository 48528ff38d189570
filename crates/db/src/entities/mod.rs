//! Database entities.

#![allow(missing_docs)]

pub mod caste;
pub mod chat_message;
pub mod chat_room;
pub mod contact_info_view;
pub mod lifestyle;
pub mod match_request;
pub mod notification;
pub mod profile;
pub mod subscription_payment;
pub mod subscription_plan;
pub mod success_story;
pub mod user;
pub mod user_image;

pub use caste::Entity as Caste;
pub use chat_message::Entity as ChatMessage;
pub use chat_room::Entity as ChatRoom;
pub use contact_info_view::Entity as ContactInfoView;
pub use lifestyle::Entity as Lifestyle;
pub use match_request::Entity as MatchRequest;
pub use notification::Entity as Notification;
pub use profile::Entity as Profile;
pub use subscription_payment::Entity as SubscriptionPayment;
pub use subscription_plan::Entity as SubscriptionPlan;
pub use success_story::Entity as SuccessStory;
pub use user::Entity as User;
pub use user_image::Entity as UserImage;
