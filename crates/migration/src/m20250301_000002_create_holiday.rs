//! Create `holidays` table. At most one named holiday per calendar day.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Holidays::Table)
                    .if_not_exists()
                    .col(uuid(Holidays::Id).primary_key())
                    .col(date(Holidays::Date).unique_key().not_null())
                    .col(string_len(Holidays::Name, 255).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Holidays::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Holidays { Table, Id, Date, Name }
