//! In-app notification entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Notification types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    #[sea_orm(string_value = "interest_received")]
    InterestReceived,
    #[sea_orm(string_value = "interest_accepted")]
    InterestAccepted,
    #[sea_orm(string_value = "interest_rejected")]
    InterestRejected,
    #[sea_orm(string_value = "chat_message")]
    ChatMessage,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "notification")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// The user receiving the notification
    pub user_id: String,

    /// The user who triggered the notification
    #[sea_orm(nullable)]
    pub actor_id: Option<String>,

    pub kind: NotificationKind,

    /// Related match request
    #[sea_orm(nullable)]
    pub match_request_id: Option<String>,

    #[sea_orm(column_type = "Text")]
    pub message: String,

    /// Has this notification been read?
    #[sea_orm(default_value = false)]
    pub is_read: bool,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,

    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::ActorId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Actor,

    #[sea_orm(
        belongs_to = "super::match_request::Entity",
        from = "Column::MatchRequestId",
        to = "super::match_request::Column::Id",
        on_delete = "Cascade"
    )]
    MatchRequest,
}

impl ActiveModelBehavior for ActiveModel {}
