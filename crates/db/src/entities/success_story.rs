//! Success story entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "success_story")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Author
    pub user_id: String,

    pub groom_name: String,

    pub bride_name: String,

    #[sea_orm(nullable)]
    pub wedding_date: Option<Date>,

    #[sea_orm(nullable)]
    pub venue: Option<String>,

    #[sea_orm(column_type = "Text")]
    pub description: String,

    /// JSON array of image URLs
    #[sea_orm(column_type = "JsonBinary")]
    pub image_urls: Json,

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
}

impl ActiveModelBehavior for ActiveModel {}
