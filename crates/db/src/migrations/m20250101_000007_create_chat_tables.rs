//! Create `chat_room` and `chat_message` tables migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ChatRoom::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ChatRoom::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ChatRoom::UserLowId).string_len(32).not_null())
                    .col(ColumnDef::new(ChatRoom::UserHighId).string_len(32).not_null())
                    .col(ColumnDef::new(ChatRoom::MatchRequestId).string_len(32))
                    .col(
                        ColumnDef::new(ChatRoom::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_chat_room_user_low")
                            .from(ChatRoom::Table, ChatRoom::UserLowId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_chat_room_user_high")
                            .from(ChatRoom::Table, ChatRoom::UserHighId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_chat_room_match_request")
                            .from(ChatRoom::Table, ChatRoom::MatchRequestId)
                            .to(MatchRequest::Table, MatchRequest::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (user_low_id, user_high_id) - one room per pair
        manager
            .create_index(
                Index::create()
                    .name("idx_chat_room_pair")
                    .table(ChatRoom::Table)
                    .col(ChatRoom::UserLowId)
                    .col(ChatRoom::UserHighId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_chat_room_user_high")
                    .table(ChatRoom::Table)
                    .col(ChatRoom::UserHighId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ChatMessage::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ChatMessage::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ChatMessage::RoomId).string_len(32).not_null())
                    .col(ColumnDef::new(ChatMessage::SenderId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(ChatMessage::ReceiverId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ChatMessage::MessageType)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(ColumnDef::new(ChatMessage::MessageText).text().not_null())
                    .col(ColumnDef::new(ChatMessage::QuestionId).integer())
                    .col(ColumnDef::new(ChatMessage::AnswerIndex).integer())
                    .col(
                        ColumnDef::new(ChatMessage::IsRead)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(ChatMessage::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_chat_message_room")
                            .from(ChatMessage::Table, ChatMessage::RoomId)
                            .to(ChatRoom::Table, ChatRoom::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_chat_message_sender")
                            .from(ChatMessage::Table, ChatMessage::SenderId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_chat_message_receiver")
                            .from(ChatMessage::Table, ChatMessage::ReceiverId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: (room_id, created_at) for history
        manager
            .create_index(
                Index::create()
                    .name("idx_chat_message_room_created")
                    .table(ChatMessage::Table)
                    .col(ChatMessage::RoomId)
                    .col(ChatMessage::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ChatMessage::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ChatRoom::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum ChatRoom {
    Table,
    Id,
    UserLowId,
    UserHighId,
    MatchRequestId,
    CreatedAt,
}

#[derive(Iden)]
enum ChatMessage {
    Table,
    Id,
    RoomId,
    SenderId,
    ReceiverId,
    MessageType,
    MessageText,
    QuestionId,
    AnswerIndex,
    IsRead,
    CreatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}

#[derive(Iden)]
enum MatchRequest {
    Table,
    Id,
}
