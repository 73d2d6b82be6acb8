//! Create `users` table.
//!
//! One row per principal, keyed by unique email. Allowances are whole days.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(uuid(Users::Id).primary_key())
                    .col(string_len(Users::Email, 255).unique_key().not_null())
                    .col(string_len(Users::Role, 16).not_null().default("user"))
                    .col(integer(Users::SickAllowance).not_null().default(15))
                    .col(integer(Users::AnnualAllowance).not_null().default(10))
                    .col(integer(Users::CasualAllowance).not_null().default(5))
                    .col(string_len_null(Users::Department, 128))
                    .col(string_len_null(Users::Avatar, 512))
                    .col(timestamp_with_time_zone(Users::CreatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Users::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Users { Table, Id, Email, Role, SickAllowance, AnnualAllowance, CasualAllowance, Department, Avatar, CreatedAt }
