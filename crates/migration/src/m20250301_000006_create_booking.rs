//! Create `bookings` table with FKs to `resources` and `users`.
//!
//! Interval is half-open `[start_time, end_time)`; the check constraint keeps it non-empty.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Bookings::Table)
                    .if_not_exists()
                    .col(uuid(Bookings::Id).primary_key())
                    .col(uuid(Bookings::ResourceId).not_null())
                    .col(uuid(Bookings::UserId).not_null())
                    .col(timestamp_with_time_zone(Bookings::StartTime).not_null())
                    .col(timestamp_with_time_zone(Bookings::EndTime).not_null())
                    .col(string_len(Bookings::Status, 16).not_null())
                    .col(text_null(Bookings::RejectionReason))
                    .col(text_null(Bookings::Details))
                    .col(timestamp_with_time_zone(Bookings::CreatedAt).not_null())
                    .check(Expr::col(Bookings::EndTime).gt(Expr::col(Bookings::StartTime)))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_bookings_resource")
                            .from(Bookings::Table, Bookings::ResourceId)
                            .to(Resources::Table, Resources::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_bookings_user")
                            .from(Bookings::Table, Bookings::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Bookings::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Bookings { Table, Id, ResourceId, UserId, StartTime, EndTime, Status, RejectionReason, Details, CreatedAt }

#[derive(DeriveIden)]
enum Resources { Table, Id }

#[derive(DeriveIden)]
enum Users { Table, Id }
