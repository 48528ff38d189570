//! Create `profile` table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Profile::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Profile::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Profile::UserId)
                            .string_len(32)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Profile::ThisAccountFor).string_len(32))
                    .col(ColumnDef::new(Profile::MotherTongue).string_len(64))
                    .col(ColumnDef::new(Profile::Gender).string_len(16))
                    .col(ColumnDef::new(Profile::DateOfBirth).date())
                    .col(ColumnDef::new(Profile::Height).string_len(16))
                    .col(ColumnDef::new(Profile::PhysicalStatus).string_len(64))
                    .col(ColumnDef::new(Profile::MaritalStatus).string_len(64))
                    .col(ColumnDef::new(Profile::ChildrenCount).integer())
                    .col(ColumnDef::new(Profile::ChildrenWithMe).boolean())
                    .col(ColumnDef::new(Profile::ReligionId).string_len(32))
                    .col(ColumnDef::new(Profile::CasteId).string_len(32))
                    .col(ColumnDef::new(Profile::SubCaste).string_len(100))
                    .col(
                        ColumnDef::new(Profile::WillingInterCaste)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Profile::Education).string_len(128))
                    .col(ColumnDef::new(Profile::FieldOfStudy).string_len(128))
                    .col(ColumnDef::new(Profile::Occupation).string_len(128))
                    .col(ColumnDef::new(Profile::AnnualIncome).string_len(64))
                    .col(ColumnDef::new(Profile::Country).string_len(64))
                    .col(ColumnDef::new(Profile::State).string_len(64))
                    .col(ColumnDef::new(Profile::City).string_len(64))
                    .col(ColumnDef::new(Profile::FamilyStatus).string_len(64))
                    .col(ColumnDef::new(Profile::FamilyWorth).string_len(64))
                    .col(ColumnDef::new(Profile::Description).text())
                    .col(
                        ColumnDef::new(Profile::TermsAccepted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Profile::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Profile::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_profile_user")
                            .from(Profile::Table, Profile::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_profile_religion")
                            .from(Profile::Table, Profile::ReligionId)
                            .to(Caste::Table, Caste::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_profile_caste")
                            .from(Profile::Table, Profile::CasteId)
                            .to(Caste::Table, Caste::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: (gender, religion_id, caste_id) for candidate listing
        manager
            .create_index(
                Index::create()
                    .name("idx_profile_gender_religion_caste")
                    .table(Profile::Table)
                    .col(Profile::Gender)
                    .col(Profile::ReligionId)
                    .col(Profile::CasteId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Profile::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Profile {
    Table,
    Id,
    UserId,
    ThisAccountFor,
    MotherTongue,
    Gender,
    DateOfBirth,
    Height,
    PhysicalStatus,
    MaritalStatus,
    ChildrenCount,
    ChildrenWithMe,
    ReligionId,
    CasteId,
    SubCaste,
    WillingInterCaste,
    Education,
    FieldOfStudy,
    Occupation,
    AnnualIncome,
    Country,
    State,
    City,
    FamilyStatus,
    FamilyWorth,
    Description,
    TermsAccepted,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}

#[derive(Iden)]
enum Caste {
    Table,
    Id,
}
