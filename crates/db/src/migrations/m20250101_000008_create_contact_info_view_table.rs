//! Create `contact_info_view` table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ContactInfoView::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ContactInfoView::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ContactInfoView::ViewerId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ContactInfoView::ViewedUserId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ContactInfoView::ViewCount)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(ContactInfoView::FirstViewedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(ContactInfoView::LastViewedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_contact_info_view_viewer")
                            .from(ContactInfoView::Table, ContactInfoView::ViewerId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_contact_info_view_viewed_user")
                            .from(ContactInfoView::Table, ContactInfoView::ViewedUserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (viewer_id, viewed_user_id) - one counter per pair
        manager
            .create_index(
                Index::create()
                    .name("idx_contact_info_view_pair")
                    .table(ContactInfoView::Table)
                    .col(ContactInfoView::ViewerId)
                    .col(ContactInfoView::ViewedUserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ContactInfoView::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum ContactInfoView {
    Table,
    Id,
    ViewerId,
    ViewedUserId,
    ViewCount,
    FirstViewedAt,
    LastViewedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
