//! Contact reveal counter, one row per (viewer, viewed user).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "contact_info_view")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub viewer_id: String,

    pub viewed_user_id: String,

    /// Total reveals of this pair; only the row itself counts toward the quota
    #[sea_orm(default_value = 1)]
    pub view_count: i32,

    pub first_viewed_at: DateTimeWithTimeZone,

    pub last_viewed_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::ViewerId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Viewer,

    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::ViewedUserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    ViewedUser,
}

impl ActiveModelBehavior for ActiveModel {}
