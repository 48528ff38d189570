//! Database migrations.
//!
//! Schema migrations for the database. Every table that hangs off `user`
//! declares `ON DELETE CASCADE`, so purging an account removes its rows.

#![allow(missing_docs)]

use sea_orm_migration::prelude::*;

mod m20250101_000001_create_user_table;
mod m20250101_000002_create_caste_table;
mod m20250101_000003_create_profile_table;
mod m20250101_000004_create_lifestyle_table;
mod m20250101_000005_create_subscription_tables;
mod m20250101_000006_create_match_request_table;
mod m20250101_000007_create_chat_tables;
mod m20250101_000008_create_contact_info_view_table;
mod m20250101_000009_create_notification_table;
mod m20250101_000010_create_user_image_table;
mod m20250101_000011_create_success_story_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_user_table::Migration),
            Box::new(m20250101_000002_create_caste_table::Migration),
            Box::new(m20250101_000003_create_profile_table::Migration),
            Box::new(m20250101_000004_create_lifestyle_table::Migration),
            Box::new(m20250101_000005_create_subscription_tables::Migration),
            Box::new(m20250101_000006_create_match_request_table::Migration),
            Box::new(m20250101_000007_create_chat_tables::Migration),
            Box::new(m20250101_000008_create_contact_info_view_table::Migration),
            Box::new(m20250101_000009_create_notification_table::Migration),
            Box::new(m20250101_000010_create_user_image_table::Migration),
            Box::new(m20250101_000011_create_success_story_table::Migration),
        ]
    }
}
