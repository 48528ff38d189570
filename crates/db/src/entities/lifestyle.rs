//! Lifestyle entity (1:1 with profile).
//!
//! Astrology fields are private and only leave the service through a
//! contact reveal.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "lifestyle")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(unique)]
    pub profile_id: String,

    /// JSON array of strings
    #[sea_orm(column_type = "JsonBinary")]
    pub music_genres: Json,

    /// JSON array of strings
    #[sea_orm(column_type = "JsonBinary")]
    pub music_activities: Json,

    /// JSON array of strings
    #[sea_orm(column_type = "JsonBinary")]
    pub reading_preferences: Json,

    /// JSON array of strings
    #[sea_orm(column_type = "JsonBinary")]
    pub movie_tv_genres: Json,

    #[sea_orm(nullable)]
    pub reading_language: Option<String>,

    #[sea_orm(nullable)]
    pub favorite_sports: Option<String>,

    #[sea_orm(nullable)]
    pub fitness_activity: Option<String>,

    #[sea_orm(nullable)]
    pub spoken_languages: Option<String>,

    #[sea_orm(nullable)]
    pub cooking: Option<String>,

    #[sea_orm(nullable)]
    pub time_of_birth: Option<String>,

    #[sea_orm(nullable)]
    pub place_of_birth: Option<String>,

    #[sea_orm(nullable)]
    pub nakshatra: Option<String>,

    #[sea_orm(nullable)]
    pub rashi: Option<String>,

    #[sea_orm(nullable)]
    pub eating_habits: Option<String>,

    #[sea_orm(nullable)]
    pub smoking: Option<String>,

    #[sea_orm(nullable)]
    pub drinking: Option<String>,

    #[sea_orm(nullable)]
    pub college: Option<String>,

    #[sea_orm(nullable)]
    pub course_degree: Option<String>,

    #[sea_orm(nullable)]
    pub passing_year: Option<i32>,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::profile::Entity",
        from = "Column::ProfileId",
        to = "super::profile::Column::Id",
        on_delete = "Cascade"
    )]
    Profile,
}

impl Related<super::profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Profile.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
