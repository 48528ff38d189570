//! Matrimony profile entity (1:1 with user).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    #[sea_orm(string_value = "male")]
    Male,
    #[sea_orm(string_value = "female")]
    Female,
}

impl Gender {
    /// Gender shown in candidate lists.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Male => Self::Female,
            Self::Female => Self::Male,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "profile")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(unique)]
    pub user_id: String,

    /// Who the account was created for (self, son, daughter, ...)
    #[sea_orm(nullable)]
    pub this_account_for: Option<String>,

    #[sea_orm(nullable)]
    pub mother_tongue: Option<String>,

    #[sea_orm(nullable)]
    pub gender: Option<Gender>,

    #[sea_orm(nullable)]
    pub date_of_birth: Option<Date>,

    #[sea_orm(nullable)]
    pub height: Option<String>,

    #[sea_orm(nullable)]
    pub physical_status: Option<String>,

    #[sea_orm(nullable)]
    pub marital_status: Option<String>,

    #[sea_orm(nullable)]
    pub children_count: Option<i32>,

    #[sea_orm(nullable)]
    pub children_with_me: Option<bool>,

    /// Religion node of the caste taxonomy
    #[sea_orm(nullable)]
    pub religion_id: Option<String>,

    /// Caste node of the caste taxonomy
    #[sea_orm(nullable)]
    pub caste_id: Option<String>,

    #[sea_orm(nullable)]
    pub sub_caste: Option<String>,

    #[sea_orm(default_value = false)]
    pub willing_inter_caste: bool,

    #[sea_orm(nullable)]
    pub education: Option<String>,

    #[sea_orm(nullable)]
    pub field_of_study: Option<String>,

    #[sea_orm(nullable)]
    pub occupation: Option<String>,

    /// Income bracket label
    #[sea_orm(nullable)]
    pub annual_income: Option<String>,

    #[sea_orm(nullable)]
    pub country: Option<String>,

    #[sea_orm(nullable)]
    pub state: Option<String>,

    #[sea_orm(nullable)]
    pub city: Option<String>,

    #[sea_orm(nullable)]
    pub family_status: Option<String>,

    #[sea_orm(nullable)]
    pub family_worth: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    #[sea_orm(default_value = false)]
    pub terms_accepted: bool,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
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

    #[sea_orm(has_one = "super::lifestyle::Entity")]
    Lifestyle,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::lifestyle::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Lifestyle.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
