//! Create `subscription_plan` and `subscription_payment` tables migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SubscriptionPlan::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SubscriptionPlan::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(SubscriptionPlan::PlanName)
                            .string_len(100)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(SubscriptionPlan::Price).big_integer().not_null())
                    .col(
                        ColumnDef::new(SubscriptionPlan::ValidityDays)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(SubscriptionPlan::Description).text())
                    .col(
                        ColumnDef::new(SubscriptionPlan::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(SubscriptionPlan::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SubscriptionPayment::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SubscriptionPayment::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(SubscriptionPayment::UserId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SubscriptionPayment::PlanId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SubscriptionPayment::Amount)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(SubscriptionPayment::PaymentMethod).string_len(32))
                    .col(
                        ColumnDef::new(SubscriptionPayment::TransactionId)
                            .string_len(128)
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(SubscriptionPayment::Status)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(SubscriptionPayment::PaidAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(SubscriptionPayment::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_subscription_payment_user")
                            .from(SubscriptionPayment::Table, SubscriptionPayment::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_subscription_payment_plan")
                            .from(SubscriptionPayment::Table, SubscriptionPayment::PlanId)
                            .to(SubscriptionPlan::Table, SubscriptionPlan::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: (user_id, status, paid_at) for entitlement lookups
        manager
            .create_index(
                Index::create()
                    .name("idx_subscription_payment_user_status_paid")
                    .table(SubscriptionPayment::Table)
                    .col(SubscriptionPayment::UserId)
                    .col(SubscriptionPayment::Status)
                    .col(SubscriptionPayment::PaidAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SubscriptionPayment::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SubscriptionPlan::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum SubscriptionPlan {
    Table,
    Id,
    PlanName,
    Price,
    ValidityDays,
    Description,
    IsActive,
    CreatedAt,
}

#[derive(Iden)]
enum SubscriptionPayment {
    Table,
    Id,
    UserId,
    PlanId,
    Amount,
    PaymentMethod,
    TransactionId,
    Status,
    PaidAt,
    CreatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
