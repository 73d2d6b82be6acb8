//! Create `leaves` table with FK to `users`.
//!
//! `total_days` is fractional so a half-day leave can store 0.5.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Leaves::Table)
                    .if_not_exists()
                    .col(uuid(Leaves::Id).primary_key())
                    .col(uuid(Leaves::UserId).not_null())
                    .col(string_len(Leaves::Type, 16).not_null())
                    .col(date(Leaves::StartDate).not_null())
                    .col(date(Leaves::EndDate).not_null())
                    .col(double(Leaves::TotalDays).not_null())
                    .col(text(Leaves::Reason).not_null())
                    .col(string_len(Leaves::Status, 16).not_null().default("pending"))
                    .col(text_null(Leaves::ApproverComment))
                    .col(timestamp_with_time_zone(Leaves::CreatedAt).not_null())
                    .check(Expr::col(Leaves::EndDate).gte(Expr::col(Leaves::StartDate)))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_leaves_user")
                            .from(Leaves::Table, Leaves::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Leaves::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Leaves { Table, Id, UserId, Type, StartDate, EndDate, TotalDays, Reason, Status, ApproverComment, CreatedAt }

#[derive(DeriveIden)]
enum Users { Table, Id }
