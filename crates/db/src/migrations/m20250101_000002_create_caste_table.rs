//! Create `caste` table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Caste::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Caste::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Caste::Name).string_len(100).not_null())
                    .col(ColumnDef::new(Caste::ParentId).string_len(32))
                    .col(ColumnDef::new(Caste::Level).string_len(16).not_null())
                    .col(
                        ColumnDef::new(Caste::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Caste::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_caste_parent")
                            .from(Caste::Table, Caste::ParentId)
                            .to(Caste::Table, Caste::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (name, parent_id)
        manager
            .create_index(
                Index::create()
                    .name("idx_caste_name_parent")
                    .table(Caste::Table)
                    .col(Caste::Name)
                    .col(Caste::ParentId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Caste::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Caste {
    Table,
    Id,
    Name,
    ParentId,
    Level,
    IsActive,
    CreatedAt,
}
