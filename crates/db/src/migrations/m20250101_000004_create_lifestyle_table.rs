//! Create `lifestyle` table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Lifestyle::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Lifestyle::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Lifestyle::ProfileId)
                            .string_len(32)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Lifestyle::MusicGenres)
                            .json_binary()
                            .not_null()
                            .default(Expr::cust("'[]'::jsonb")),
                    )
                    .col(
                        ColumnDef::new(Lifestyle::MusicActivities)
                            .json_binary()
                            .not_null()
                            .default(Expr::cust("'[]'::jsonb")),
                    )
                    .col(
                        ColumnDef::new(Lifestyle::ReadingPreferences)
                            .json_binary()
                            .not_null()
                            .default(Expr::cust("'[]'::jsonb")),
                    )
                    .col(
                        ColumnDef::new(Lifestyle::MovieTvGenres)
                            .json_binary()
                            .not_null()
                            .default(Expr::cust("'[]'::jsonb")),
                    )
                    .col(ColumnDef::new(Lifestyle::ReadingLanguage).string_len(64))
                    .col(ColumnDef::new(Lifestyle::FavoriteSports).string_len(128))
                    .col(ColumnDef::new(Lifestyle::FitnessActivity).string_len(128))
                    .col(ColumnDef::new(Lifestyle::SpokenLanguages).string_len(256))
                    .col(ColumnDef::new(Lifestyle::Cooking).string_len(64))
                    .col(ColumnDef::new(Lifestyle::TimeOfBirth).string_len(32))
                    .col(ColumnDef::new(Lifestyle::PlaceOfBirth).string_len(128))
                    .col(ColumnDef::new(Lifestyle::Nakshatra).string_len(64))
                    .col(ColumnDef::new(Lifestyle::Rashi).string_len(64))
                    .col(ColumnDef::new(Lifestyle::EatingHabits).string_len(64))
                    .col(ColumnDef::new(Lifestyle::Smoking).string_len(32))
                    .col(ColumnDef::new(Lifestyle::Drinking).string_len(32))
                    .col(ColumnDef::new(Lifestyle::College).string_len(256))
                    .col(ColumnDef::new(Lifestyle::CourseDegree).string_len(128))
                    .col(ColumnDef::new(Lifestyle::PassingYear).integer())
                    .col(
                        ColumnDef::new(Lifestyle::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Lifestyle::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_lifestyle_profile")
                            .from(Lifestyle::Table, Lifestyle::ProfileId)
                            .to(Profile::Table, Profile::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Lifestyle::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Lifestyle {
    Table,
    Id,
    ProfileId,
    MusicGenres,
    MusicActivities,
    ReadingPreferences,
    MovieTvGenres,
    ReadingLanguage,
    FavoriteSports,
    FitnessActivity,
    SpokenLanguages,
    Cooking,
    TimeOfBirth,
    PlaceOfBirth,
    Nakshatra,
    Rashi,
    EatingHabits,
    Smoking,
    Drinking,
    College,
    CourseDegree,
    PassingYear,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Profile {
    Table,
    Id,
}
