//! Chat room entity (one per matched pair).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "chat_room")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Smaller of the two user ids
    pub user_low_id: String,

    /// Larger of the two user ids
    pub user_high_id: String,

    /// The accepted request that opened the room
    #[sea_orm(nullable)]
    pub match_request_id: Option<String>,

    pub created_at: DateTimeWithTimeZone,
}

impl Model {
    /// Whether `user_id` is one of the two participants.
    #[must_use]
    pub fn has_participant(&self, user_id: &str) -> bool {
        self.user_low_id == user_id || self.user_high_id == user_id
    }

    /// The participant that is not `user_id`.
    #[must_use]
    pub fn other_participant(&self, user_id: &str) -> &str {
        if self.user_low_id == user_id {
            &self.user_high_id
        } else {
            &self.user_low_id
        }
    }
}

/// Order a user pair so that the same two users always map to one key.
#[must_use]
pub fn canonical_pair<'a>(a: &'a str, b: &'a str) -> (&'a str, &'a str) {
    if a <= b { (a, b) } else { (b, a) }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserLowId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    UserLow,

    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserHighId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    UserHigh,

    #[sea_orm(
        belongs_to = "super::match_request::Entity",
        from = "Column::MatchRequestId",
        to = "super::match_request::Column::Id",
        on_delete = "SetNull"
    )]
    MatchRequest,

    #[sea_orm(has_many = "super::chat_message::Entity")]
    Messages,
}

impl Related<super::chat_message::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Messages.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_pair_is_order_independent() {
        assert_eq!(canonical_pair("b", "a"), ("a", "b"));
        assert_eq!(canonical_pair("a", "b"), ("a", "b"));
    }
}
