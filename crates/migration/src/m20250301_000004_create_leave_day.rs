//! Create `leave_days` table. Rows are owned by their leave and removed with it.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(LeaveDays::Table)
                    .if_not_exists()
                    .col(uuid(LeaveDays::Id).primary_key())
                    .col(uuid(LeaveDays::LeaveId).not_null())
                    .col(date(LeaveDays::Date).not_null())
                    .col(boolean(LeaveDays::IsHalfDay).not_null().default(false))
                    .col(string_len_null(LeaveDays::HalfDayPeriod, 16))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_leave_days_leave")
                            .from(LeaveDays::Table, LeaveDays::LeaveId)
                            .to(Leaves::Table, Leaves::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(LeaveDays::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum LeaveDays { Table, Id, LeaveId, Date, IsHalfDay, HalfDayPeriod }

#[derive(DeriveIden)]
enum Leaves { Table, Id }
