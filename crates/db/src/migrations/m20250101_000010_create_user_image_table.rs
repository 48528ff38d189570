//! Create `user_image` table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UserImage::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserImage::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(UserImage::UserId).string_len(32).not_null())
                    .col(ColumnDef::new(UserImage::ImageUrl).string_len(1024).not_null())
                    .col(
                        ColumnDef::new(UserImage::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_image_user")
                            .from(UserImage::Table, UserImage::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_user_image_user_id")
                    .table(UserImage::Table)
                    .col(UserImage::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserImage::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum UserImage {
    Table,
    Id,
    UserId,
    ImageUrl,
    CreatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
