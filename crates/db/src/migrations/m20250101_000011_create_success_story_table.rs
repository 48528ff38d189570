//! Create `success_story` table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SuccessStory::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SuccessStory::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SuccessStory::UserId).string_len(32).not_null())
                    .col(ColumnDef::new(SuccessStory::GroomName).string_len(150).not_null())
                    .col(ColumnDef::new(SuccessStory::BrideName).string_len(150).not_null())
                    .col(ColumnDef::new(SuccessStory::WeddingDate).date())
                    .col(ColumnDef::new(SuccessStory::Venue).string_len(256))
                    .col(ColumnDef::new(SuccessStory::Description).text().not_null())
                    .col(
                        ColumnDef::new(SuccessStory::ImageUrls)
                            .json_binary()
                            .not_null()
                            .default(Expr::cust("'[]'::jsonb")),
                    )
                    .col(
                        ColumnDef::new(SuccessStory::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_success_story_user")
                            .from(SuccessStory::Table, SuccessStory::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SuccessStory::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum SuccessStory {
    Table,
    Id,
    UserId,
    GroomName,
    BrideName,
    WeddingDate,
    Venue,
    Description,
    ImageUrls,
    CreatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
