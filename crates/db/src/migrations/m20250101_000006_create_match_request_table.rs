//! Create `match_request` table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MatchRequest::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MatchRequest::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(MatchRequest::FromUserId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MatchRequest::ToUserId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MatchRequest::Status)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(MatchRequest::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(MatchRequest::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_match_request_from_user")
                            .from(MatchRequest::Table, MatchRequest::FromUserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_match_request_to_user")
                            .from(MatchRequest::Table, MatchRequest::ToUserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (from_user_id, to_user_id)
        manager
            .create_index(
                Index::create()
                    .name("idx_match_request_from_to")
                    .table(MatchRequest::Table)
                    .col(MatchRequest::FromUserId)
                    .col(MatchRequest::ToUserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // One request per unordered pair, so A->B and B->A cannot both exist
        manager
            .get_connection()
            .execute_unprepared(
                r"
                CREATE UNIQUE INDEX IF NOT EXISTS idx_match_request_pair
                ON match_request (LEAST(from_user_id, to_user_id), GREATEST(from_user_id, to_user_id));
                ",
            )
            .await?;

        // Index: (to_user_id, status) for the inbox
        manager
            .create_index(
                Index::create()
                    .name("idx_match_request_to_status")
                    .table(MatchRequest::Table)
                    .col(MatchRequest::ToUserId)
                    .col(MatchRequest::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MatchRequest::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum MatchRequest {
    Table,
    Id,
    FromUserId,
    ToUserId,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
